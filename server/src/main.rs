use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use simsearch_core::SearchConfig;
use simsearch_server::{build_app, ServerSettings};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus path (CSV/JSON/JSONL file or directory)
    #[arg(long, env = "SIMSEARCH_CORPUS", default_value = "./3000.csv")]
    corpus: PathBuf,
    /// JSON search configuration
    #[arg(long, env = "SIMSEARCH_CONFIG")]
    config: Option<PathBuf>,
    /// Minimum similarity (exclusive); overrides the config file
    #[arg(long)]
    threshold: Option<f64>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,
    #[arg(long, env = "CORS_ALLOW_ORIGIN")]
    cors_allow_origin: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(p) => SearchConfig::from_json_file(p).with_context(|| format!("reading config {}", p.display()))?,
        None => SearchConfig::default(),
    };
    if let Some(t) = args.threshold {
        config.threshold = t;
    }
    let app: Router = build_app(ServerSettings {
        corpus: args.corpus,
        config,
        admin_token: args.admin_token,
        cors_allow_origin: args.cors_allow_origin,
    })?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
