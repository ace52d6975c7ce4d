//! Application builder.
//!
//! This module assembles routes, middleware and state into an Axum router.
//! Tracing is initialized by the binary, not here, so tests can install
//! their own subscriber.

use crate::{middleware::session_middleware, routes, state::AppState};
use aop_logging_common::AppConfig;
use axum::{http::HeaderValue, middleware, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

/// Create the main application router
pub fn create_app(config: AppConfig) -> Router {
    build_router(AppState::new(config))
}

/// Build the router around an existing state
pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors_allowed_origins);
    let timeout = state.config.request_timeout();

    Router::new()
        // Health check routes (not intercepted)
        .merge(routes::health::routes())
        // API v1 routes
        .nest("/api/v1", routes::v1::routes(&state.chain))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::new(timeout))
                .layer(middleware::from_fn(session_middleware)),
        )
}

/// Build CORS layer from the allowed origins
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
