//! Session identification middleware.

use aop_logging_interceptor::SessionId;
use axum::{
    extract::Request,
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Cookie carrying the session identifier
pub const SESSION_COOKIE: &str = "SESSION";

/// Attach the request's session id, if any, as a [`SessionId`] extension
pub async fn session_middleware(mut req: Request, next: Next) -> Response {
    if let Some(session_id) = session_from_cookies(req.headers()) {
        req.extensions_mut().insert(SessionId(session_id));
    }

    next.run(req).await
}

fn session_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
