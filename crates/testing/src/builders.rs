//! Fluent builders for request metadata and configuration.

use aop_logging_common::{AppConfig, InterceptionMode};
use aop_logging_interceptor::RequestMetadata;
use http::header::{HeaderName, HeaderValue};
use http::{Method, Uri};
use std::net::SocketAddr;

/// Builder for [`RequestMetadata`] test instances
#[derive(Clone)]
pub struct RequestMetadataBuilder {
    metadata: RequestMetadata,
}

impl RequestMetadataBuilder {
    pub fn new(method: Method, uri: &'static str) -> Self {
        Self {
            metadata: RequestMetadata::new(method, Uri::from_static(uri)),
        }
    }

    pub fn get(uri: &'static str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &'static str) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.metadata.headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
        self
    }

    /// Set a header to raw bytes, e.g. a value that is not visible ASCII
    pub fn with_raw_header(mut self, name: &'static str, value: &[u8]) -> Self {
        if let Ok(value) = HeaderValue::from_bytes(value) {
            self.metadata
                .headers
                .insert(HeaderName::from_static(name), value);
        }
        self
    }

    pub fn with_user(self, user_id: &'static str) -> Self {
        self.with_header("x-user-id", user_id)
    }

    pub fn with_forwarded_for(self, addresses: &'static str) -> Self {
        self.with_header("x-forwarded-for", addresses)
    }

    pub fn with_remote_addr(mut self, addr: &str) -> Self {
        self.metadata.remote_addr = addr.parse::<SocketAddr>().ok();
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.metadata.session_id = Some(session_id.into());
        self
    }

    pub fn build(self) -> RequestMetadata {
        self.metadata
    }
}

/// Builder for [`AppConfig`] test instances
#[derive(Clone, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn basic(mut self) -> Self {
        self.config.interception.mode = InterceptionMode::Basic;
        self
    }

    pub fn with_service_layer(mut self) -> Self {
        self.config.interception.service_layer = true;
        self
    }

    pub fn with_slow_threshold_ms(mut self, threshold_ms: u64) -> Self {
        self.config.logging.performance.slow_threshold_ms = threshold_ms;
        self
    }

    pub fn with_request_logging(mut self, log_headers: bool, log_body: bool) -> Self {
        self.config.logging.request.log_headers = log_headers;
        self.config.logging.request.log_body = log_body;
        self
    }

    pub fn with_user_id_header(mut self, header: impl Into<String>) -> Self {
        self.config.correlation.user_id_header = header.into();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
