//! Lexical similarity search over a fixed corpus.
//!
//! Records are tokenized, weighted with smoothed TF-IDF and stored as unit
//! vectors; queries are projected into the same space and ranked by cosine
//! similarity. [`SearchEngine`] keeps the built index behind an atomically
//! swapped snapshot so it can be rebuilt while queries are served.

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod index;
pub mod loader;
pub mod query;
pub mod rank;
pub mod record;
pub mod tokenizer;
pub mod vector;

pub use config::SearchConfig;
pub use engine::{IndexSnapshot, IndexStats, SearchEngine, SearchOutcome};
pub use error::{Result, SearchError};
pub use format::{ResultFormatter, SearchHit, UrlTemplate};
pub use index::{CorpusIndex, Vocabulary};
pub use loader::{load_corpus, LoaderOptions};
pub use query::encode;
pub use rank::{rank, round_score, ScoredPosition, DEFAULT_THRESHOLD};
pub use record::{CorpusRecord, RawRecord};
pub use tokenizer::{Stopwords, Tokenizer};
pub use vector::{SparseVector, TermId, Weight};
