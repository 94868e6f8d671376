use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use sieve_core::persist::{load_index, IndexPaths};
use sieve_core::{Analyzer, DocId, Hit, InvertedIndex, QueryEngine};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    /// Maximum hits returned; all matches when absent.
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub terms: Vec<String>,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<Hit>,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub doc_id: DocId,
    pub external_id: String,
}

/// The index is immutable after load, so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<InvertedIndex>,
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(index: InvertedIndex) -> Self {
        let analyzer = Analyzer::new(index.stopwords().iter().cloned());
        Self { index: Arc::new(index), analyzer: Arc::new(analyzer) }
    }
}

/// Load `<prefix>.idx` / `<prefix>.dict` and build the router.
pub fn build_app<P: AsRef<std::path::Path>>(index_prefix: P) -> Result<Router> {
    let index = load_index(&IndexPaths::from_prefix(index_prefix))?;
    Ok(router(AppState::new(index)))
}

pub fn router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let engine = QueryEngine::new(&state.index, state.analyzer.as_ref());
    let internal = |e: sieve_core::IndexError| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    let terms = engine.terms(&params.q).map_err(internal)?;
    let mut results = engine.evaluate(&params.q).map_err(internal)?;
    let total_hits = results.len();
    if let Some(k) = params.k {
        results.truncate(k);
    }
    tracing::debug!(query = %params.q, total_hits, "search");
    Ok(Json(SearchResponse {
        query: params.q,
        terms,
        took_s: start.elapsed().as_secs_f64(),
        total_hits,
        results,
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<DocResponse>, (StatusCode, String)> {
    match state.index.external_id(doc_id) {
        Some(key) => Ok(Json(DocResponse { doc_id, external_id: key.to_string() })),
        None => Err((StatusCode::NOT_FOUND, format!("document {doc_id} not found"))),
    }
}
