use std::cmp::Ordering;

pub type TermId = u32;
pub type Weight = f64;

/// Sparse term-weight vector keyed by vocabulary id.
///
/// Entries are kept sorted by term id with no zero weights. Vectors built with
/// [`SparseVector::from_weights`] have unit Euclidean norm, or are empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(TermId, Weight)>,
}

impl SparseVector {
    pub fn zero() -> Self {
        Self::default()
    }

    /// L2-normalize raw weights. Duplicate ids are not merged; callers pass
    /// one entry per term.
    pub fn from_weights(mut entries: Vec<(TermId, Weight)>) -> Self {
        entries.retain(|&(_, w)| w > 0.0);
        entries.sort_by_key(|&(t, _)| t);
        // sum in term order so repeated builds give identical bits
        let norm = entries.iter().map(|&(_, w)| w * w).sum::<Weight>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Self::zero();
        }
        for (_, w) in entries.iter_mut() {
            *w /= norm;
        }
        Self { entries }
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of non-zero coordinates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> Weight {
        self.entries.iter().map(|&(_, w)| w * w).sum::<Weight>().sqrt()
    }

    pub fn get(&self, term: TermId) -> Option<Weight> {
        self.entries
            .binary_search_by_key(&term, |&(t, _)| t)
            .ok()
            .map(|i| self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, Weight)> + '_ {
        self.entries.iter().copied()
    }

    /// Dot product by merge join over the two sorted entry lists.
    pub fn dot(&self, other: &SparseVector) -> Weight {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}
