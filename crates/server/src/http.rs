//! HTTP Endpoints
//!
//! REST API for the fund query engine.

use std::time::{Duration, Instant};

use axum::{
    extract::{Json, State},
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use finspeak_core::{
    Answer, AnswerData, ErrorKind, FundId, FundRecord, IntentKind, Language, MatchCandidate,
};

use crate::metrics::{metrics_handler, record_answer, record_explanation, record_reload};
use crate::state::{AppState, ReloadSummary};
use crate::ServerError;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let (cors_layer, timeout) = {
        let config = state.get_config();
        (
            build_cors_layer(&config.server.cors_origins, config.server.cors_enabled),
            Duration::from_secs(config.server.timeout_seconds),
        )
    };

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/query", post(query))
        .route("/api/search", post(search))
        .route("/api/explain", post(explain))
        .route("/api/terms", get(list_terms))
        .route("/api/funds", get(list_funds))
        .route("/api/admin/reload", post(reload))
        .route("/metrics", get(metrics_handler))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if parsed_origins.is_empty() {
        if !origins.is_empty() {
            tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        }
        return base.allow_origin(HeaderValue::from_static(DEFAULT_CORS_ORIGIN));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    base.allow_origin(parsed_origins)
}

fn default_query_language() -> String {
    "en".to_string()
}

fn default_explain_language() -> String {
    "hi".to_string()
}

/// Query request
#[derive(Debug, Deserialize)]
struct QueryRequest {
    text: String,
    #[serde(default = "default_query_language")]
    language: String,
}

/// Query response
#[derive(Debug, Serialize)]
struct QueryResponse {
    success: bool,
    intent: IntentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<AnswerData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fund_id: Option<FundId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    computed_value: Option<f64>,
    language: Language,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    candidates: Vec<MatchCandidate>,
}

impl From<Answer> for QueryResponse {
    fn from(answer: Answer) -> Self {
        let (text, message) = if answer.success {
            (Some(answer.formatted_text), None)
        } else {
            (None, Some(answer.formatted_text))
        };
        Self {
            success: answer.success,
            intent: answer.intent,
            answer: text,
            data: answer.data,
            message,
            error_kind: answer.error_kind,
            fund_id: answer.fund_id,
            computed_value: answer.computed_value,
            language: answer.language,
            candidates: answer.candidates,
        }
    }
}

/// Resolve a transcript; failures are ordinary 200 answers
async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    let start = Instant::now();
    let answer = state
        .resolver
        .resolve_with_code(&request.text, &request.language)
        .await;
    record_answer(&answer, start.elapsed());

    Json(QueryResponse::from(answer))
}

/// Search request
#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
}

/// Search response
#[derive(Debug, Serialize)]
struct SearchResponse {
    success: bool,
    count: usize,
    results: Vec<FundRecord>,
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ServerError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ServerError::InvalidRequest("Empty search query".to_string()));
    }

    let limit = request
        .limit
        .unwrap_or_else(|| state.get_config().server.search_limit)
        .max(1);
    let results = state.resolver.search_funds(query, limit);

    Ok(Json(SearchResponse {
        success: !results.is_empty(),
        count: results.len(),
        results,
    }))
}

/// Explain request
#[derive(Debug, Deserialize)]
struct ExplainRequest {
    term: String,
    #[serde(default = "default_explain_language")]
    language: String,
}

/// Explain response
#[derive(Debug, Serialize)]
struct ExplainResponse {
    success: bool,
    term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<finspeak_core::ExplanationSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

async fn explain(
    State(state): State<AppState>,
    Json(request): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, ServerError> {
    let term = request.term.trim();
    if term.is_empty() {
        return Err(ServerError::InvalidRequest("Empty term".to_string()));
    }

    let language = Language::from_str_loose(&request.language).unwrap_or_default();
    let answer = state.resolver.explain(term, language).await;

    let response = match answer.data {
        Some(AnswerData::Explanation { term, source }) => ExplainResponse {
            success: true,
            term,
            answer: Some(answer.formatted_text),
            source: Some(source),
            message: None,
        },
        _ => ExplainResponse {
            success: false,
            term: term.to_string(),
            answer: None,
            source: None,
            message: Some(answer.formatted_text),
        },
    };
    record_explanation(response.source);

    Ok(Json(response))
}

/// Curated glossary keys
async fn list_terms(State(state): State<AppState>) -> impl IntoResponse {
    let terms: Vec<String> = state
        .resolver
        .explanation_service()
        .terms()
        .into_iter()
        .map(str::to_string)
        .collect();

    Json(serde_json::json!({
        "count": terms.len(),
        "terms": terms,
    }))
}

async fn list_funds(State(state): State<AppState>) -> impl IntoResponse {
    let kb = state.knowledge_base().snapshot();
    let funds: Vec<&FundRecord> = kb.funds().collect();

    Json(serde_json::json!({
        "count": funds.len(),
        "funds": funds,
    }))
}

/// Reload request; an empty body reloads only the data files
#[derive(Debug, Deserialize)]
struct ReloadRequest {
    /// Re-read settings first, picking up new data paths
    #[serde(default)]
    config: bool,
}

/// Reload CSV files and swap the snapshot
async fn reload(
    State(state): State<AppState>,
    request: Option<Json<ReloadRequest>>,
) -> Result<Json<ReloadSummary>, ServerError> {
    let reload_config = request.map(|Json(r)| r.config).unwrap_or_default();
    let worker = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        if reload_config {
            worker.reload_config()?;
        }
        let mut summary = worker.reload_knowledge_base()?;
        summary.config_reloaded = reload_config;
        Ok::<_, ServerError>(summary)
    })
    .await
        .map_err(|e| ServerError::Internal(format!("Reload task failed: {}", e)))?;
    record_reload(result.is_ok());

    Ok(Json(result?))
}

/// Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let handle = state.knowledge_base();
    let kb = handle.snapshot();

    Json(serde_json::json!({
        "status": if kb.is_empty() { "degraded" } else { "healthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "funds": kb.fund_count(),
        "nav_points": kb.nav_point_count(),
        "generation": handle.generation(),
        "loaded_at": kb.loaded_at(),
    }))
}
