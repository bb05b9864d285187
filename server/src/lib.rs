use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use simsearch_core::rank::validate_threshold;
use simsearch_core::{load_corpus, IndexStats, SearchConfig, SearchEngine, SearchError, SearchHit};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub corpus: PathBuf,
    pub config: SearchConfig,
    /// Required in `X-ADMIN-TOKEN` for admin routes; admin routes are closed when unset.
    pub admin_token: Option<String>,
    /// Comma-separated allowed origins; any origin when unset.
    pub cors_allow_origin: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub threshold: Option<f64>,
}

/// Body of the HTML form the search page posts.
#[derive(Deserialize)]
pub struct PredictForm {
    pub message: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub generation: u64,
    pub results: Vec<SearchHit>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub corpus: Arc<PathBuf>,
    pub admin_token: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    /// The corpus could not be turned into an index (422).
    Unprocessable(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
            ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Csv(_) | SearchError::Json(_) => ApiError::Unprocessable(e.to_string()),
            e if e.is_corpus_error() => ApiError::Unprocessable(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

/// Load the corpus, build the first index and wire up the routes. Fails if
/// the corpus cannot be indexed, so a broken corpus never starts serving.
pub fn build_app(settings: ServerSettings) -> Result<Router> {
    let records = load_corpus(&settings.corpus, &settings.config.loader)
        .with_context(|| format!("loading corpus {}", settings.corpus.display()))?;
    let engine = SearchEngine::new(settings.config, records)?;
    let stats = engine.stats();
    tracing::info!(num_docs = stats.num_docs, num_terms = stats.num_terms, "index ready");

    let state = AppState {
        engine: Arc::new(engine),
        corpus: Arc::new(settings.corpus),
        admin_token: settings.admin_token,
    };
    Ok(router(state, cors_layer(settings.cors_allow_origin.as_deref())))
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/predict", post(predict_handler))
        .route("/stats", get(stats_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let origins: Vec<_> = allow_origin
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(&state, params.q, params.threshold).map(Json)
}

pub async fn predict_handler(
    State(state): State<AppState>,
    Form(form): Form<PredictForm>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(&state, form.message, None).map(Json)
}

fn run_search(state: &AppState, query: String, threshold: Option<f64>) -> Result<SearchResponse, ApiError> {
    let start = std::time::Instant::now();
    let threshold = threshold.unwrap_or(state.engine.config().threshold);
    validate_threshold(threshold).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let outcome = state.engine.search_with_threshold(&query, threshold)?;
    Ok(SearchResponse {
        query,
        took_s: start.elapsed().as_secs_f64(),
        total_hits: outcome.hits.len(),
        generation: outcome.generation,
        results: outcome.hits,
    })
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.engine.stats())
}

/// Re-read the corpus and publish a fresh index. Queries keep hitting the
/// previous index until the swap, and keep hitting it if the rebuild fails.
pub async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<IndexStats>, ApiError> {
    authorize(&state, &headers)?;
    let engine = state.engine.clone();
    let corpus = state.corpus.clone();
    let stats = tokio::task::spawn_blocking(move || {
        let records = load_corpus(corpus.as_path(), &engine.config().loader)?;
        engine.rebuild(records)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("reload task failed: {e}")))?
    .map_err(|e| {
        tracing::warn!(error = %e, "corpus reload rejected");
        ApiError::from(e)
    })?;
    Ok(Json(stats))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(ApiError::Unauthorized("ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("invalid admin token".into()))
    }
}
