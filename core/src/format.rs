use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::rank::ScoredPosition;
use crate::record::CorpusRecord;
use crate::vector::Weight;

pub const DEFAULT_URL_TEMPLATE: &str = "https://capec.mitre.org/data/definitions/{id}.html";

/// Link pattern with an `{id}` placeholder for the record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, id: &str) -> String {
        self.0.replace("{id}", id)
    }
}

impl Default for UrlTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_URL_TEMPLATE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub score: Weight,
}

#[derive(Debug, Clone, Default)]
pub struct ResultFormatter {
    url_template: UrlTemplate,
}

impl ResultFormatter {
    pub fn new(url_template: UrlTemplate) -> Self {
        Self { url_template }
    }

    pub fn format(&self, records: &[CorpusRecord], ranked: &[ScoredPosition]) -> Result<Vec<SearchHit>> {
        ranked
            .iter()
            .map(|s| {
                let rec = records.get(s.position).ok_or(SearchError::PositionOutOfRange {
                    position: s.position,
                    len: records.len(),
                })?;
                Ok(SearchHit {
                    title: rec.title.clone(),
                    url: self.url_template.render(&rec.id),
                    score: s.score,
                })
            })
            .collect()
    }
}
