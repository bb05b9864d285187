//! Runtime configuration for the search core.
//!
//! Deserialized from JSON; every field has a default so a partial file (or
//! no file at all) is valid.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Result, SearchError};
use crate::format::UrlTemplate;
use crate::loader::LoaderOptions;
use crate::rank::{validate_threshold, DEFAULT_THRESHOLD};
use crate::tokenizer::{Stopwords, Tokenizer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results must score strictly above this.
    pub threshold: f64,
    /// Cap on returned hits. `None` returns every hit above the threshold.
    pub max_results: Option<usize>,
    /// Replaces the built-in English stopword list when set.
    pub stopwords: Option<Vec<String>>,
    /// Added on top of whichever list is in effect.
    pub extra_stopwords: Vec<String>,
    pub url_template: UrlTemplate,
    pub loader: LoaderOptions,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_results: None,
            stopwords: None,
            extra_stopwords: Vec::new(),
            url_template: UrlTemplate::default(),
            loader: LoaderOptions::default(),
        }
    }
}

impl SearchConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let config: SearchConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        if self.max_results == Some(0) {
            return Err(SearchError::InvalidConfig("max_results must be at least 1".into()));
        }
        if self.url_template.as_str().trim().is_empty() {
            return Err(SearchError::InvalidConfig("url_template is empty".into()));
        }
        self.loader.validate()
    }

    pub fn stopwords(&self) -> Stopwords {
        let mut set = match &self.stopwords {
            Some(words) => Stopwords::from_words(words),
            None => Stopwords::english(),
        };
        set.extend(&self.extra_stopwords);
        set
    }

    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new(self.stopwords())
    }
}
