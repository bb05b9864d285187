//! Corpus loading from CSV, JSON and JSONL files.
//!
//! The default CSV layout matches the attack-pattern export the search was
//! first built around: column 0 is the identifier, column 1 the title and
//! column 4 the free-text description, with a header row on top.

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, SearchError};
use crate::record::{CorpusRecord, RawRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Field delimiter for CSV input.
    pub delimiter: char,
    /// Whether the first CSV row is a header to skip.
    pub has_headers: bool,
    pub id_column: usize,
    pub title_column: usize,
    pub description_column: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_headers: true,
            id_column: 0,
            title_column: 1,
            description_column: 4,
        }
    }
}

impl LoaderOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(SearchError::InvalidConfig(format!(
                "CSV delimiter {:?} must be a single ASCII character",
                self.delimiter
            )));
        }
        let cols = [self.id_column, self.title_column, self.description_column];
        if cols[0] == cols[1] || cols[0] == cols[2] || cols[1] == cols[2] {
            return Err(SearchError::InvalidConfig(format!(
                "id/title/description columns must be distinct, got {cols:?}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "body")]
    description: Option<String>,
}

impl JsonRecord {
    fn into_raw(self) -> RawRecord {
        let id = match self.id {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        RawRecord { id, title: self.title, description: self.description }
    }
}

/// Load every record under `path`, in a stable order.
///
/// A directory is walked recursively and its `.csv`, `.json` and `.jsonl`
/// files are read in file-name order. Any invalid record fails the whole load.
pub fn load_corpus<P: AsRef<Path>>(path: P, options: &LoaderOptions) -> Result<Vec<CorpusRecord>> {
    options.validate()?;
    let path = path.as_ref();
    let mut raw = Vec::new();
    for file in corpus_files(path)? {
        let before = raw.len();
        match extension(&file).as_deref() {
            Some("csv") => read_csv(&file, options, &mut raw)?,
            Some("jsonl") => read_jsonl(&file, &mut raw)?,
            _ => read_json(&file, &mut raw)?,
        }
        tracing::debug!(file = %file.display(), records = raw.len() - before, "read corpus file");
    }
    let records = raw
        .into_iter()
        .enumerate()
        .map(|(position, r)| r.validate(position))
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(path = %path.display(), records = records.len(), "loaded corpus");
    Ok(records)
}

fn extension(p: &Path) -> Option<String> {
    p.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase())
}

fn corpus_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(SearchError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("corpus path {} does not exist", input.display()),
        )));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.map_err(|e| SearchError::Io(e.into()))?;
        let p = entry.path();
        if p.is_file() && matches!(extension(p).as_deref(), Some("csv" | "json" | "jsonl")) {
            files.push(p.to_path_buf());
        }
    }
    Ok(files)
}

fn read_csv(file: &Path, options: &LoaderOptions, out: &mut Vec<RawRecord>) -> Result<()> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter as u8)
        .has_headers(options.has_headers)
        .flexible(true)
        .from_path(file)?;
    for row in reader.records() {
        let row = row?;
        let field = |i: usize| row.get(i).map(str::to_string);
        out.push(RawRecord {
            id: field(options.id_column),
            title: field(options.title_column),
            description: field(options.description_column),
        });
    }
    Ok(())
}

fn read_jsonl(file: &Path, out: &mut Vec<RawRecord>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let rec: JsonRecord = serde_json::from_str(&line)?;
        out.push(rec.into_raw());
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<RawRecord>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let rec: JsonRecord = serde_json::from_value(v)?;
                out.push(rec.into_raw());
            }
        }
        serde_json::Value::Object(_) => {
            let rec: JsonRecord = serde_json::from_value(json)?;
            out.push(rec.into_raw());
        }
        _ => {}
    }
    Ok(())
}
