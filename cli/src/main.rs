use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use simsearch_core::{load_corpus, CorpusIndex, IndexStats, SearchConfig, SearchEngine, SearchHit};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "simsearch")]
#[command(about = "Build a TF-IDF index over a corpus and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and print corpus statistics
    Stats {
        /// Corpus path (CSV/JSON/JSONL file or directory)
        #[arg(long)]
        corpus: PathBuf,
        /// JSON search configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of most widespread terms to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Rank corpus entries against a free-text description
    Query {
        #[arg(long)]
        corpus: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Minimum similarity (exclusive); overrides the config file
        #[arg(long)]
        threshold: Option<f64>,
        /// Maximum number of results; overrides the config file
        #[arg(long)]
        limit: Option<usize>,
        /// Query text
        text: Vec<String>,
    },
}

#[derive(Serialize)]
struct TermCount {
    term: String,
    df: u32,
    idf: f64,
}

#[derive(Serialize)]
struct StatsReport {
    #[serde(flatten)]
    stats: IndexStats,
    top_terms: Vec<TermCount>,
}

#[derive(Serialize)]
struct QueryReport {
    query: String,
    total_hits: usize,
    results: Vec<SearchHit>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { corpus, config, top } => stats(&corpus, config.as_deref(), top),
        Commands::Query { corpus, config, threshold, limit, text } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(t) = threshold { cfg.threshold = t; }
            if limit.is_some() { cfg.max_results = limit; }
            query(&corpus, cfg, &text.join(" "))
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SearchConfig> {
    match path {
        Some(p) => SearchConfig::from_json_file(p).with_context(|| format!("reading config {}", p.display())),
        None => Ok(SearchConfig::default()),
    }
}

fn stats(corpus: &Path, config: Option<&Path>, top: usize) -> Result<()> {
    let cfg = load_config(config)?;
    let records = load_corpus(corpus, &cfg.loader).with_context(|| format!("loading corpus {}", corpus.display()))?;
    let engine = SearchEngine::new(cfg, records)?;
    let snapshot = engine.snapshot();
    let report = StatsReport { stats: snapshot.stats(), top_terms: top_terms(&snapshot.index, top) };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn top_terms(index: &CorpusIndex, top: usize) -> Vec<TermCount> {
    let vocab = index.vocabulary();
    let mut terms: Vec<TermCount> = vocab
        .terms()
        .iter()
        .enumerate()
        .map(|(id, term)| TermCount {
            term: term.clone(),
            df: index.document_frequency(id as u32).unwrap_or(0),
            idf: index.idf()[id],
        })
        .collect();
    // vocabulary order breaks ties, so output is stable
    terms.sort_by(|a, b| b.df.cmp(&a.df));
    terms.truncate(top);
    terms
}

fn query(corpus: &Path, cfg: SearchConfig, text: &str) -> Result<()> {
    let records = load_corpus(corpus, &cfg.loader).with_context(|| format!("loading corpus {}", corpus.display()))?;
    let engine = SearchEngine::new(cfg, records)?;
    let outcome = engine.search(text)?;
    tracing::info!(hits = outcome.hits.len(), "query complete");
    let report = QueryReport { query: text.to_string(), total_hits: outcome.hits.len(), results: outcome.hits };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
