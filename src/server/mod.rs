use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::{
    corpus::{Normalizer, PersianNormalizer, Tokenizer, WordTokenizer},
    errors::{CollocError, Result},
    persistence,
    search::{CollocationEngine, CorpusIndex, Query, ResultRow},
};

/// Shared state for the server. The index is read-only.
#[derive(Clone)]
pub struct AppState {
    index: Arc<CorpusIndex>,
    normalizer: Arc<dyn Normalizer>,
    tokenizer: Arc<dyn Tokenizer>,
    extension: String,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("segments", &self.index.len())
            .field("normalizer", &"<Normalizer>")
            .field("tokenizer", &"<Tokenizer>")
            .field("extension", &self.extension)
            .finish()
    }
}

impl AppState {
    /// State over `index` with the default normalizer and tokenizer.
    pub fn new(index: CorpusIndex, extension: impl Into<String>) -> Self {
        Self {
            index: Arc::new(index),
            normalizer: Arc::new(PersianNormalizer),
            tokenizer: Arc::new(WordTokenizer),
            extension: extension.into(),
        }
    }
}

/// Request payload for the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// The query.
    #[serde(flatten)]
    pub query: Query,
    /// Attach each row's source sentences.
    #[serde(default)]
    pub include_sources: bool,
}

/// Response payload for the search endpoint.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Ranked rows.
    pub results: Vec<SearchHit>,
}

/// A result row, optionally with its sources.
#[derive(Debug, Serialize)]
pub struct SearchHit {
    /// The row.
    #[serde(flatten)]
    pub row: ResultRow,
    /// Distinct sources, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceHit>>,
}

/// A source sentence and where it came from.
#[derive(Debug, Serialize)]
pub struct SourceHit {
    /// Segment text.
    pub sentence: String,
    /// Document identifier, when known.
    pub source_id: Option<String>,
    /// Document path, when the corpus root is known.
    pub path: Option<PathBuf>,
}

/// Response payload for the stats endpoint.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Number of segments.
    pub segments: usize,
    /// Number of distinct documents.
    pub documents: usize,
    /// Corpus root, when known.
    pub root: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Build the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", post(post_search))
        .route("/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start_server(cache: PathBuf, port: u16) -> anyhow::Result<()> {
    tracing::info!("Loading corpus from {}...", cache.display());
    let loaded = persistence::load_corpus(&cache)?;
    let config = persistence::load_metadata(&cache)?
        .map(|m| m.config)
        .unwrap_or_default();
    tracing::info!(
        "Corpus loaded. {} segments, {} documents.",
        loaded.index.len(),
        loaded.index.document_count()
    );

    let app = router(AppState::new(loaded.index, config.extension()));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run one search request synchronously.
pub fn run_search(state: &AppState, request: &SearchRequest) -> Result<SearchResponse> {
    request.query.validate()?;
    if state.index.is_empty() {
        return Err(CollocError::EmptyCorpus);
    }

    let engine = CollocationEngine::new(
        &state.index,
        state.normalizer.clone(),
        state.tokenizer.clone(),
    );
    let outcome = engine.search(&request.query);

    let results = outcome
        .rows
        .iter()
        .map(|row| SearchHit {
            sources: request.include_sources.then(|| {
                outcome
                    .sources_for(row)
                    .into_iter()
                    .map(|s| SourceHit {
                        path: s
                            .source_id
                            .as_deref()
                            .and_then(|id| state.index.resolve_source(id, &state.extension)),
                        sentence: s.sentence,
                        source_id: s.source_id,
                    })
                    .collect()
            }),
            row: row.clone(),
        })
        .collect();

    Ok(SearchResponse { results })
}

/// Handler for POST /search
async fn post_search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> std::result::Result<Json<SearchResponse>, ApiError> {
    let outcome = tokio::task::spawn_blocking(move || run_search(&state, &payload))
        .await
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match outcome {
        Ok(response) => Ok(Json(response)),
        Err(e @ CollocError::InvalidQuery(_)) => Err(error(StatusCode::BAD_REQUEST, e.to_string())),
        Err(e @ CollocError::EmptyCorpus) => Err(error(StatusCode::CONFLICT, e.to_string())),
        Err(e) => Err(error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// Handler for GET /stats
async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        segments: state.index.len(),
        documents: state.index.document_count(),
        root: state.index.root.clone(),
    })
}

fn error(status: StatusCode, message: String) -> ApiError {
    (status, Json(ErrorResponse { error: message }))
}
