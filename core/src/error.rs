use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    /// No records were supplied, so no vocabulary or idf can exist.
    #[error("cannot build an index from an empty corpus")]
    EmptyCorpus,

    /// Records exist but none of their descriptions produced a single term.
    #[error("corpus of {documents} records produced an empty vocabulary")]
    EmptyVocabulary { documents: usize },

    #[error("invalid record at position {position} (id {id:?}): {reason}")]
    InvalidRecord {
        position: usize,
        id: Option<String>,
        reason: String,
    },

    #[error("result position {position} is outside the corpus of {len} records")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SearchError {
    pub fn invalid_record(position: usize, id: Option<&str>, reason: impl Into<String>) -> Self {
        SearchError::InvalidRecord {
            position,
            id: id.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// True for failures caused by the corpus content rather than I/O or parsing.
    pub fn is_corpus_error(&self) -> bool {
        matches!(
            self,
            SearchError::EmptyCorpus
                | SearchError::EmptyVocabulary { .. }
                | SearchError::InvalidRecord { .. }
        )
    }
}
