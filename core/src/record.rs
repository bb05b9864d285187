use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// One corpus entry. Owned by whoever loaded the corpus; the index keeps the
/// records it was built from so results can be mapped back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl CorpusRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), description: description.into() }
    }
}

/// A record as a loader sees it, before any field has been checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl RawRecord {
    /// Rejects records with a missing field. Skipping them instead would
    /// quietly shift document frequencies for the rest of the corpus.
    pub fn validate(self, position: usize) -> Result<CorpusRecord> {
        let id = match self.id.map(|s| s.trim().to_string()) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(SearchError::invalid_record(position, None, "missing id")),
        };
        let Some(title) = self.title else {
            return Err(SearchError::invalid_record(position, Some(&id), "missing title"));
        };
        let Some(description) = self.description else {
            return Err(SearchError::invalid_record(position, Some(&id), "missing description"));
        };
        Ok(CorpusRecord { id, title, description })
    }
}
