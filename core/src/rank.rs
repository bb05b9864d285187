use serde::Serialize;

use crate::error::{Result, SearchError};
use crate::index::CorpusIndex;
use crate::vector::{SparseVector, Weight};

pub const DEFAULT_THRESHOLD: Weight = 0.1;

/// A corpus position with its similarity, rounded for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredPosition {
    pub position: usize,
    pub score: Weight,
}

/// Round to three decimal places.
///
/// Midpoints of the scaled binary value round away from zero, so an exact
/// `0.0625` becomes `0.063` rather than the banker's `0.062`.
pub fn round_score(score: Weight) -> Weight {
    (score * 1000.0).round() / 1000.0
}

/// Scores live in `[0, 1]`, so a usable cutoff lies in `[0, 1)`. A negative
/// cutoff would let zero-score documents through for some queries only.
pub fn validate_threshold(threshold: Weight) -> Result<()> {
    if threshold.is_finite() && (0.0..1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(SearchError::InvalidConfig(format!("threshold must be in [0, 1), got {threshold}")))
    }
}

/// Score every document against `query`, keep those strictly above
/// `threshold`, and order them by descending similarity.
///
/// Equal scores keep corpus order. The threshold is compared against the
/// unrounded score; rounding only happens on the way out. Callers are
/// expected to pass a threshold accepted by [`validate_threshold`].
pub fn rank(index: &CorpusIndex, query: &SparseVector, threshold: Weight) -> Vec<ScoredPosition> {
    if query.is_zero() {
        return Vec::new();
    }
    let mut scored: Vec<(usize, Weight)> = index
        .documents()
        .iter()
        .enumerate()
        .map(|(pos, doc)| (pos, query.dot(doc).clamp(0.0, 1.0)))
        .filter(|&(_, score)| score > threshold)
        .collect();
    // stable: ties stay in corpus order
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
        .into_iter()
        .map(|(position, score)| ScoredPosition { position, score: round_score(score) })
        .collect()
}
