use crate::index::{count_terms, weigh, CorpusIndex};
use crate::vector::SparseVector;

/// Project a free-text query into the index's vector space.
///
/// Terms the corpus never contained are dropped; an empty or fully unknown
/// query becomes the zero vector, which matches nothing.
pub fn encode(index: &CorpusIndex, query: &str) -> SparseVector {
    let tokens = index.tokenizer().tokenize(query);
    let counts = count_terms(index.vocabulary(), &tokens);
    if counts.is_empty() {
        tracing::debug!(tokens = tokens.len(), "query has no in-vocabulary terms");
        return SparseVector::zero();
    }
    weigh(counts, index.idf())
}

impl CorpusIndex {
    pub fn encode(&self, query: &str) -> SparseVector {
        encode(self, query)
    }
}
