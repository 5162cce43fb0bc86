//! HTTP API for the SimpliFi dashboard.
//!
//! Routes:
//! - `GET /` and `GET /health`
//! - `GET /api/rugpull/{coin_id}`
//! - `POST /api/rugpull/{coin_id}` with optional `{"coin_data": ...}` body

use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use simplifi::market_data::AssetSnapshot;
use simplifi::risk::{RiskAnalyzer, RiskAssessment};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<RiskAnalyzer>,
}

impl AppState {
    pub fn new(analyzer: Arc<RiskAnalyzer>) -> Self {
        Self { analyzer }
    }
}

/// Errors surfaced by the HTTP layer itself. Analysis never produces one.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "bad_request: {msg}"),
            Self::Internal(msg) => write!(f, "internal_error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Body of `POST /api/rugpull/{coin_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct RugPullRequest {
    /// Market data the dashboard already holds, in any provider shape.
    #[serde(default)]
    pub coin_data: Option<Value>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new().route(
        "/rugpull/{coin_id}",
        get(analyze_rug_pull).post(analyze_rug_pull_with_data),
    );

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to SimpliFi Crypto Dashboard API" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn analyze_rug_pull(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
) -> Result<Json<RiskAssessment>, ApiError> {
    run_analysis(&state, coin_id, None).await.map(Json)
}

async fn analyze_rug_pull_with_data(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
    body: Bytes,
) -> Result<Json<RiskAssessment>, ApiError> {
    let provided = parse_provided_snapshot(&body)?;
    run_analysis(&state, coin_id, provided).await.map(Json)
}

/// Read the optional snapshot from a POST body. Empty bodies and a null
/// `coin_data` mean "no data provided".
pub fn parse_provided_snapshot(body: &[u8]) -> Result<Option<AssetSnapshot>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let request: RugPullRequest = serde_json::from_slice(body)
        .map_err(|err| ApiError::BadRequest(format!("invalid request body: {err}")))?;
    Ok(request
        .coin_data
        .filter(|data| !data.is_null())
        .map(|data| AssetSnapshot::from_provider_json(&data)))
}

/// Runs the analysis on its own task; it completes even if the client disconnects.
async fn run_analysis(
    state: &AppState,
    coin_id: String,
    provided: Option<AssetSnapshot>,
) -> Result<RiskAssessment, ApiError> {
    let analyzer = Arc::clone(&state.analyzer);
    let task_coin_id = coin_id.clone();
    let task = tokio::spawn(async move { analyzer.analyze(&task_coin_id, provided).await });

    task.await.map_err(|err| {
        error!(coin_id = %coin_id, error = %err, "rug pull analysis task failed");
        ApiError::Internal(format!("Error analyzing rug pull risk: {err}"))
    })
}
