//! Panic handling.

use crate::error::ErrorResponse;
use aop_logging_interceptor::FailureInfo;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

/// Failure type reported for panicking handlers
pub const PANIC_TYPE: &str = "panic";

/// Convert a caught handler panic into the standard 500 response
pub fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    error!(details = %details, "Handler panicked");

    let body = ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred");

    let mut response = (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
    response
        .extensions_mut()
        .insert(FailureInfo::new(PANIC_TYPE, details.clone(), vec![details]));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_response() {
        let response = handle_panic(Box::new("boom"));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let failure = response.extensions().get::<FailureInfo>().unwrap();
        assert_eq!(failure.type_name(), PANIC_TYPE);
        assert_eq!(failure.message(), "boom");
    }
}
