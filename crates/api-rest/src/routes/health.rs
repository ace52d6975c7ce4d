//! Health check endpoint. Not intercepted.

use crate::{responses::ApiResponse, state::AppState};
use axum::{extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Service version
    pub version: String,
}

/// Health check routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: state.config.telemetry.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    ApiResponse::ok(response)
}
