//! HTTP routes
//!
//! - `POST /api/analyze` - analyze a batch of queries
//! - `GET /health` - liveness probe
//!
//! Authentication happens in front of this service.

use std::any::Any;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use qlens_session::{AnalysisService, AnalyzeRequest, AnalyzeResponse};
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    service: Arc<AnalysisService>,
}

impl AppState {
    pub fn new(service: AnalysisService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create the router with all middleware
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state.service.analyze(request).await?;
    Ok(Json(response))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "handler panicked");

    ApiError::Internal("internal error".to_string()).into_response()
}
