use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::format::{ResultFormatter, SearchHit};
use crate::index::CorpusIndex;
use crate::rank::{rank, validate_threshold};
use crate::record::CorpusRecord;

/// A built index together with when it was published.
#[derive(Debug)]
pub struct IndexSnapshot {
    pub index: CorpusIndex,
    pub generation: u64,
    pub built_at: OffsetDateTime,
}

impl IndexSnapshot {
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            num_docs: self.index.len(),
            num_terms: self.index.vocabulary().len(),
            generation: self.generation,
            built_at: self.built_at.format(&Rfc3339).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub num_docs: usize,
    pub num_terms: usize,
    pub generation: u64,
    pub built_at: String,
}

/// Results of one query, tagged with the snapshot that answered it.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub generation: u64,
    pub hits: Vec<SearchHit>,
}

/// Serves queries from the current published index.
///
/// Queries clone the current `Arc<IndexSnapshot>` and run without holding any
/// lock. A rebuild constructs the new index off to the side and only takes the
/// write lock to swap the pointer, so readers see either the old index or the
/// new one, never a partial build.
pub struct SearchEngine {
    config: SearchConfig,
    formatter: ResultFormatter,
    current: RwLock<Arc<IndexSnapshot>>,
    rebuild_lock: Mutex<()>,
}

impl SearchEngine {
    pub fn new(config: SearchConfig, records: Vec<CorpusRecord>) -> Result<Self> {
        config.validate()?;
        let index = CorpusIndex::build(records, config.tokenizer())?;
        let snapshot = IndexSnapshot { index, generation: 1, built_at: OffsetDateTime::now_utc() };
        Ok(Self {
            formatter: ResultFormatter::new(config.url_template.clone()),
            config,
            current: RwLock::new(Arc::new(snapshot)),
            rebuild_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.current.read().clone()
    }

    pub fn stats(&self) -> IndexStats {
        self.snapshot().stats()
    }

    pub fn search(&self, query: &str) -> Result<SearchOutcome> {
        self.search_with_threshold(query, self.config.threshold)
    }

    pub fn search_with_threshold(&self, query: &str, threshold: f64) -> Result<SearchOutcome> {
        validate_threshold(threshold)?;
        let snapshot = self.snapshot();
        let index = &snapshot.index;
        let q = index.encode(query);
        let mut ranked = rank(index, &q, threshold);
        if let Some(max) = self.config.max_results {
            ranked.truncate(max);
        }
        let hits = self.formatter.format(index.records(), &ranked)?;
        tracing::debug!(query, threshold, hits = hits.len(), generation = snapshot.generation, "search");
        Ok(SearchOutcome { generation: snapshot.generation, hits })
    }

    /// Build a new index from `records` and publish it. On failure the
    /// previous index keeps serving and the error is returned.
    pub fn rebuild(&self, records: Vec<CorpusRecord>) -> Result<IndexStats> {
        let _writer = self.rebuild_lock.lock();
        let index = match CorpusIndex::build(records, self.config.tokenizer()) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!(error = %e, generation = self.snapshot().generation, "rebuild failed, keeping current index");
                return Err(e);
            }
        };
        let stats = {
            let mut guard = self.current.write();
            let next = IndexSnapshot {
                index,
                generation: guard.generation + 1,
                built_at: OffsetDateTime::now_utc(),
            };
            let stats = next.stats();
            *guard = Arc::new(next);
            stats
        };
        tracing::info!(generation = stats.generation, num_docs = stats.num_docs, "published new index");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;

    fn records(descs: &[&str]) -> Vec<CorpusRecord> {
        descs
            .iter()
            .enumerate()
            .map(|(i, d)| CorpusRecord::new((i + 1).to_string(), format!("T{}", i + 1), *d))
            .collect()
    }

    #[test]
    fn failed_rebuild_keeps_previous_index() {
        let engine = SearchEngine::new(SearchConfig::default(), records(&["sql injection", "buffer overflow"])).unwrap();
        let before = engine.search("injection").unwrap();
        assert_eq!(before.hits.len(), 1);

        let err = engine.rebuild(Vec::new()).unwrap_err();
        assert!(matches!(err, SearchError::EmptyCorpus));
        assert_eq!(engine.stats().generation, 1);
        assert_eq!(engine.search("injection").unwrap().hits, before.hits);
    }

    #[test]
    fn rebuild_publishes_next_generation() {
        let engine = SearchEngine::new(SearchConfig::default(), records(&["sql injection"])).unwrap();
        let held = engine.snapshot();
        let stats = engine.rebuild(records(&["cross site scripting", "sql injection"])).unwrap();
        assert_eq!(stats.generation, 2);
        assert_eq!(stats.num_docs, 2);
        // readers holding the old snapshot are unaffected
        assert_eq!(held.index.len(), 1);
        assert_eq!(engine.search("scripting").unwrap().hits[0].title, "T1");
    }

    #[test]
    fn max_results_truncates() {
        let config = SearchConfig { max_results: Some(1), ..SearchConfig::default() };
        let engine = SearchEngine::new(config, records(&["phishing email", "phishing site", "phishing"])).unwrap();
        let out = engine.search("phishing").unwrap();
        assert_eq!(out.hits.len(), 1);
        assert_eq!(out.hits[0].title, "T3");
    }

    #[test]
    fn out_of_range_threshold_is_rejected_for_every_query() {
        let engine = SearchEngine::new(SearchConfig::default(), records(&["alpha", "beta"])).unwrap();
        for query in ["alpha", "gamma"] {
            let err = engine.search_with_threshold(query, -0.5).unwrap_err();
            assert!(matches!(err, SearchError::InvalidConfig(_)), "{query}");
        }
        let out = engine.search_with_threshold("alpha", 0.0).unwrap();
        assert_eq!(out.hits.len(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SearchConfig { threshold: f64::INFINITY, ..SearchConfig::default() };
        assert!(matches!(SearchEngine::new(config, records(&["x y"])), Err(SearchError::InvalidConfig(_))));
    }
}
