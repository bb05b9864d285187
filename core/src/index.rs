use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Result, SearchError};
use crate::record::CorpusRecord;
use crate::tokenizer::Tokenizer;
use crate::vector::{SparseVector, TermId, Weight};

/// Term → dense id mapping. Ids follow sorted term order, so the same corpus
/// always yields the same ids regardless of record order within hash maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    ids: HashMap<String, TermId>,
}

impl Vocabulary {
    fn from_sorted(terms: BTreeSet<String>) -> Self {
        let terms: Vec<String> = terms.into_iter().collect();
        let ids = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as TermId))
            .collect();
        Self { terms, ids }
    }

    pub fn id_of(&self, term: &str) -> Option<TermId> {
        self.ids.get(term).copied()
    }

    pub fn term(&self, id: TermId) -> Option<&str> {
        self.terms.get(id as usize).map(String::as_str)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Smoothed inverse document frequency: `ln((1 + n) / (1 + df)) + 1`.
pub fn smoothed_idf(num_docs: usize, df: u32) -> Weight {
    ((1.0 + num_docs as Weight) / (1.0 + df as Weight)).ln() + 1.0
}

/// Immutable TF-IDF model over a fixed corpus.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    records: Arc<[CorpusRecord]>,
    tokenizer: Tokenizer,
    vocabulary: Vocabulary,
    df: Vec<u32>,
    idf: Vec<Weight>,
    documents: Vec<SparseVector>,
}

impl CorpusIndex {
    pub fn build(records: impl Into<Arc<[CorpusRecord]>>, tokenizer: Tokenizer) -> Result<Self> {
        let start = Instant::now();
        let records: Arc<[CorpusRecord]> = records.into();
        if records.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }
        let n = records.len();

        let tokenized: Vec<Vec<String>> = records.iter().map(|r| tokenizer.tokenize(&r.description)).collect();
        let vocabulary = Vocabulary::from_sorted(tokenized.iter().flatten().cloned().collect());
        if vocabulary.is_empty() {
            return Err(SearchError::EmptyVocabulary { documents: n });
        }

        let term_counts: Vec<HashMap<TermId, u32>> = tokenized
            .iter()
            .map(|tokens| count_terms(&vocabulary, tokens))
            .collect();

        let mut df = vec![0u32; vocabulary.len()];
        for counts in &term_counts {
            for tid in counts.keys() {
                df[*tid as usize] += 1;
            }
        }
        let idf: Vec<Weight> = df.iter().map(|&d| smoothed_idf(n, d)).collect();

        let documents: Vec<SparseVector> = term_counts
            .into_iter()
            .map(|counts| weigh(counts, &idf))
            .collect();

        tracing::info!(
            num_docs = n,
            num_terms = vocabulary.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built corpus index"
        );
        Ok(Self { records, tokenizer, vocabulary, df, idf, documents })
    }

    pub fn records(&self) -> &[CorpusRecord] {
        &self.records
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[Weight] {
        &self.idf
    }

    pub fn document_frequency(&self, term: TermId) -> Option<u32> {
        self.df.get(term as usize).copied()
    }

    pub fn document(&self, position: usize) -> Option<&SparseVector> {
        self.documents.get(position)
    }

    pub fn documents(&self) -> &[SparseVector] {
        &self.documents
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Raw term frequencies, restricted to terms the vocabulary knows.
pub(crate) fn count_terms(vocabulary: &Vocabulary, tokens: &[String]) -> HashMap<TermId, u32> {
    let mut counts = HashMap::new();
    for t in tokens {
        if let Some(tid) = vocabulary.id_of(t) {
            *counts.entry(tid).or_insert(0) += 1;
        }
    }
    counts
}

/// `tf * idf` per term, then unit-normalized.
pub(crate) fn weigh(counts: HashMap<TermId, u32>, idf: &[Weight]) -> SparseVector {
    SparseVector::from_weights(
        counts
            .into_iter()
            .map(|(tid, tf)| (tid, tf as Weight * idf[tid as usize]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(descs: &[&str]) -> Vec<CorpusRecord> {
        descs
            .iter()
            .enumerate()
            .map(|(i, d)| CorpusRecord::new(i.to_string(), format!("T{i}"), *d))
            .collect()
    }

    #[test]
    fn vocabulary_is_sorted_and_dense() {
        let idx = CorpusIndex::build(corpus(&["zeta alpha", "mid alpha"]), Tokenizer::default()).unwrap();
        assert_eq!(idx.vocabulary().terms(), &["alpha", "mid", "zeta"]);
        assert_eq!(idx.vocabulary().id_of("mid"), Some(1));
        assert_eq!(idx.vocabulary().term(2), Some("zeta"));
        assert_eq!(idx.vocabulary().id_of("missing"), None);
    }

    #[test]
    fn idf_is_smoothed() {
        let idx = CorpusIndex::build(corpus(&["buffer overflow attack", "overflow in buffer"]), Tokenizer::default()).unwrap();
        let v = idx.vocabulary();
        let buffer = v.id_of("buffer").unwrap();
        let attack = v.id_of("attack").unwrap();
        // present everywhere: ln(3/3) + 1
        assert_eq!(idx.idf()[buffer as usize], 1.0);
        assert!((idx.idf()[attack as usize] - (1.5f64.ln() + 1.0)).abs() < 1e-12);
        assert_eq!(idx.document_frequency(buffer), Some(2));
        assert_eq!(idx.document_frequency(attack), Some(1));
    }

    #[test]
    fn document_without_terms_is_zero_vector() {
        let idx = CorpusIndex::build(corpus(&["the of and", "exploit"]), Tokenizer::default()).unwrap();
        assert!(idx.document(0).unwrap().is_zero());
        assert!((idx.document(1).unwrap().norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_inputs_fail() {
        assert!(matches!(
            CorpusIndex::build(Vec::<CorpusRecord>::new(), Tokenizer::default()),
            Err(SearchError::EmptyCorpus)
        ));
        assert!(matches!(
            CorpusIndex::build(corpus(&["the", ""]), Tokenizer::default()),
            Err(SearchError::EmptyVocabulary { documents: 2 })
        ));
    }
}
