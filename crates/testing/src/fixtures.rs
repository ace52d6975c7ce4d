//! Test fixtures with sensible defaults.

use crate::builders::RequestMetadataBuilder;
use aop_logging_common::AppConfig;
use aop_logging_interceptor::{JoinPoint, RequestMetadata};

/// Default application configuration
pub fn create_test_config() -> AppConfig {
    AppConfig::default()
}

/// Join point on a request handler method
pub fn create_controller_join_point(method: &'static str) -> JoinPoint {
    JoinPoint::controller("shop::api::OrderController", method)
}

/// Join point on a service method
pub fn create_service_join_point(method: &'static str) -> JoinPoint {
    JoinPoint::service("shop::service::OrderService", method)
}

/// GET request from a known user, behind one proxy, with a session
pub fn create_test_request() -> RequestMetadata {
    RequestMetadataBuilder::get("/orders/7?verbose=true")
        .with_user("u42")
        .with_forwarded_for("203.0.113.7, 10.0.0.1")
        .with_remote_addr("10.0.0.1:48000")
        .with_session("s-123")
        .with_header("accept", "application/json")
        .build()
}

/// GET request with no identifying headers, straight from the client
pub fn create_anonymous_request() -> RequestMetadata {
    RequestMetadataBuilder::get("/orders")
        .with_remote_addr("198.51.100.4:50000")
        .build()
}
