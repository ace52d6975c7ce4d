//! Inbound request data consumed from the host.
//!
//! The hosting request layer supplies method, URI, headers, the transport
//! remote address and the session id; nothing here owns the request.

use crate::error::InterceptError;
use crate::join_point::JoinPoint;
use aop_logging_common::RequestLoggingConfig;
use http::{HeaderMap, Method, Request, Uri};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;

/// Proxy headers checked for the originating client address, in order.
pub const CLIENT_IP_HEADERS: [&str; 10] = [
    "x-forwarded-for",
    "x-real-ip",
    "proxy-client-ip",
    "wl-proxy-client-ip",
    "http_x_forwarded_for",
    "http_x_forwarded",
    "http_x_cluster_client_ip",
    "http_client_ip",
    "http_forwarded_for",
    "http_forwarded",
];

/// Session identifier attached to a request by the host's session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

/// Snapshot of the inbound request an intercepted call is serving
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub remote_addr: Option<SocketAddr>,
    pub session_id: Option<String>,
}

impl RequestMetadata {
    /// Create metadata for a request without headers or connection info
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            remote_addr: None,
            session_id: None,
        }
    }

    /// Capture metadata from an HTTP request.
    ///
    /// The session id is read from a [`SessionId`] extension; the remote
    /// address must be supplied with [`RequestMetadata::with_remote_addr`]
    /// since it lives in a host-specific extension.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
            remote_addr: None,
            session_id: request
                .extensions()
                .get::<SessionId>()
                .map(|session| session.0.clone()),
        }
    }

    pub fn with_remote_addr(mut self, remote_addr: Option<SocketAddr>) -> Self {
        self.remote_addr = remote_addr;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Originating client address, see [`resolve_client_ip`]
    pub fn client_ip(&self) -> Option<String> {
        resolve_client_ip(&self.headers, self.remote_addr)
    }
}

/// Resolve the originating client address.
///
/// The first proxy header in [`CLIENT_IP_HEADERS`] holding a non-empty value
/// other than `unknown` wins; only the part before its first comma is kept.
/// Without a usable header the transport remote address is returned.
pub fn resolve_client_ip(headers: &HeaderMap, remote_addr: Option<SocketAddr>) -> Option<String> {
    for name in CLIENT_IP_HEADERS {
        let Some(value) = headers.get(name).and_then(|value| value.to_str().ok()) else {
            continue;
        };

        if value.is_empty() || value.eq_ignore_ascii_case("unknown") {
            continue;
        }

        let first = value.split(',').next().unwrap_or(value);
        return Some(first.trim().to_string());
    }

    remote_addr.map(|addr| addr.ip().to_string())
}

/// Resolve the caller's user id from `header`, falling back to `anonymous`.
// TODO: consult an authenticated principal extension once an auth layer is wired in.
pub fn resolve_user_id(
    headers: &HeaderMap,
    header: &str,
    anonymous: &str,
) -> Result<String, InterceptError> {
    match headers.get(header) {
        Some(value) => value
            .to_str()
            .map(str::to_string)
            .map_err(|err| InterceptError::invalid_header(header, err)),
        None => Ok(anonymous.to_string()),
    }
}

/// Request details logged before an intercepted call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub method: String,
    pub uri: String,
    pub query_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl RequestDetails {
    /// Collect the details enabled by `options`.
    ///
    /// Returns `Ok(None)` when neither headers nor arguments are logged.
    pub fn collect(
        request: &RequestMetadata,
        join_point: &JoinPoint,
        options: &RequestLoggingConfig,
    ) -> Result<Option<Self>, InterceptError> {
        if !options.is_enabled() {
            return Ok(None);
        }

        let headers = if options.log_headers {
            let mut headers = BTreeMap::new();
            for name in request.headers.keys() {
                if let Some(value) = request.headers.get(name) {
                    let value = value
                        .to_str()
                        .map_err(|err| InterceptError::invalid_header(name.as_str(), err))?;
                    headers.insert(name.as_str().to_string(), value.to_string());
                }
            }
            Some(headers)
        } else {
            None
        };

        let arguments = if options.log_body && !join_point.args().is_empty() {
            Some(join_point.argument_summary())
        } else {
            None
        };

        Ok(Some(Self {
            method: request.method.to_string(),
            uri: request.uri.path().to_string(),
            query_string: request.uri.query().map(str::to_string),
            headers,
            arguments,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    fn remote() -> Option<SocketAddr> {
        Some("10.0.0.9:52814".parse().unwrap())
    }

    #[test]
    fn test_client_ip_takes_first_forwarded_address() {
        let headers = headers(&[("x-forwarded-for", "1.2.3.4, 5.6.7.8")]);
        assert_eq!(resolve_client_ip(&headers, remote()).as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_client_ip_falls_back_to_remote_address() {
        assert_eq!(
            resolve_client_ip(&HeaderMap::new(), remote()).as_deref(),
            Some("10.0.0.9")
        );
        assert_eq!(resolve_client_ip(&HeaderMap::new(), None), None);
    }

    #[test]
    fn test_client_ip_skips_unknown_and_empty_values() {
        let headers = headers(&[
            ("x-forwarded-for", "UNKNOWN"),
            ("x-real-ip", ""),
            ("proxy-client-ip", " 192.168.1.20 "),
        ]);
        assert_eq!(resolve_client_ip(&headers, remote()).as_deref(), Some("192.168.1.20"));
    }

    #[test]
    fn test_client_ip_respects_header_order() {
        let headers = headers(&[
            ("http_forwarded", "8.8.8.8"),
            ("x-real-ip", "4.4.4.4"),
        ]);
        assert_eq!(resolve_client_ip(&headers, remote()).as_deref(), Some("4.4.4.4"));
    }

    #[test]
    fn test_client_ip_skips_non_ascii_values() {
        let mut map = HeaderMap::new();
        map.insert("x-forwarded-for", HeaderValue::from_bytes(b"\xff1.2.3.4").unwrap());
        assert_eq!(resolve_client_ip(&map, remote()).as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn test_user_id_from_header() {
        let headers = headers(&[("x-user-id", "u42")]);
        assert_eq!(resolve_user_id(&headers, "X-User-Id", "anonymous").unwrap(), "u42");
    }

    #[test]
    fn test_user_id_defaults_to_anonymous() {
        assert_eq!(
            resolve_user_id(&HeaderMap::new(), "X-User-Id", "anonymous").unwrap(),
            "anonymous"
        );
    }

    #[test]
    fn test_user_id_rejects_invalid_header_value() {
        let mut map = HeaderMap::new();
        map.insert("x-user-id", HeaderValue::from_bytes(b"u\xff").unwrap());

        let err = resolve_user_id(&map, "X-User-Id", "anonymous").unwrap_err();
        assert!(matches!(err, InterceptError::InvalidHeaderValue { ref name, .. } if name == "X-User-Id"));
    }

    #[test]
    fn test_request_details_disabled() {
        let request = RequestMetadata::new(Method::GET, Uri::from_static("/orders"));
        let join_point = JoinPoint::controller("OrderController", "list_orders");

        let details =
            RequestDetails::collect(&request, &join_point, &RequestLoggingConfig::default()).unwrap();
        assert!(details.is_none());
    }

    #[test]
    fn test_request_details_gated_fields() {
        let mut request = RequestMetadata::new(Method::GET, Uri::from_static("/orders/7?verbose=true"));
        request.headers = headers(&[("accept", "application/json")]);
        let join_point = JoinPoint::controller("OrderController", "get_order").arg::<u64>();

        let headers_only = RequestLoggingConfig {
            log_headers: true,
            log_body: false,
        };
        let details = RequestDetails::collect(&request, &join_point, &headers_only)
            .unwrap()
            .unwrap();
        assert_eq!(details.method, "GET");
        assert_eq!(details.uri, "/orders/7");
        assert_eq!(details.query_string.as_deref(), Some("verbose=true"));
        assert_eq!(
            details.headers.as_ref().and_then(|h| h.get("accept")).map(String::as_str),
            Some("application/json")
        );
        assert!(details.arguments.is_none());

        let body_only = RequestLoggingConfig {
            log_headers: false,
            log_body: true,
        };
        let details = RequestDetails::collect(&request, &join_point, &body_only)
            .unwrap()
            .unwrap();
        assert!(details.headers.is_none());
        assert_eq!(details.arguments.as_deref(), Some("[u64]"));
    }

    #[test]
    fn test_request_details_skip_empty_arguments() {
        let request = RequestMetadata::new(Method::GET, Uri::from_static("/orders"));
        let join_point = JoinPoint::controller("OrderController", "list_orders");
        let options = RequestLoggingConfig {
            log_headers: false,
            log_body: true,
        };

        let details = RequestDetails::collect(&request, &join_point, &options)
            .unwrap()
            .unwrap();
        assert!(details.arguments.is_none());
        assert!(details.query_string.is_none());
    }

    #[test]
    fn test_request_details_reject_invalid_header() {
        let mut request = RequestMetadata::new(Method::POST, Uri::from_static("/orders"));
        request
            .headers
            .insert("x-note", HeaderValue::from_bytes(b"caf\xe9").unwrap());
        let join_point = JoinPoint::controller("OrderController", "create_order");
        let options = RequestLoggingConfig {
            log_headers: true,
            log_body: false,
        };

        assert!(RequestDetails::collect(&request, &join_point, &options).is_err());
    }

    #[test]
    fn test_metadata_reads_session_extension() {
        let mut request = Request::builder()
            .method(Method::GET)
            .uri("/orders")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(SessionId("s-123".to_string()));

        let metadata = RequestMetadata::from_request(&request).with_remote_addr(remote());
        assert_eq!(metadata.session_id.as_deref(), Some("s-123"));
        assert_eq!(metadata.client_ip().as_deref(), Some("10.0.0.9"));
    }
}
