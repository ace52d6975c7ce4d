//! Request correlation context.
//!
//! Each intercepted request owns a [`RequestScope`]; its correlation context
//! is filled when interception starts and emptied when it ends. The scope is
//! passed explicitly through the call chain, so concurrent requests never
//! observe each other's entries.

use crate::error::InterceptError;
use crate::request::{resolve_user_id, RequestMetadata};
use aop_logging_common::CorrelationConfig;
use std::collections::BTreeMap;
use std::fmt;
use tracing::Span;
use uuid::Uuid;

/// Session id recorded when the request carries none
pub const NO_SESSION: &str = "no-session";

/// Length of a generated correlation identifier
const CORRELATION_ID_LEN: usize = 8;

/// Fixed correlation context keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContextKey {
    RequestId,
    UserId,
    SessionId,
    ClientIp,
}

impl ContextKey {
    /// All keys, in serialization order
    pub const ALL: [ContextKey; 4] = [
        ContextKey::RequestId,
        ContextKey::UserId,
        ContextKey::SessionId,
        ContextKey::ClientIp,
    ];

    /// Key name used in log payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestId => "requestId",
            Self::UserId => "userId",
            Self::SessionId => "sessionId",
            Self::ClientIp => "clientIp",
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate a short correlation identifier.
pub fn generate_correlation_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(CORRELATION_ID_LEN);
    id
}

/// Mutable per-request correlation entries
#[derive(Debug, Default)]
pub struct CorrelationContext {
    entries: BTreeMap<ContextKey, String>,
}

impl CorrelationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ContextKey, value: impl Into<String>) {
        self.entries.insert(key, value.into());
    }

    pub fn get(&self, key: ContextKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn remove(&mut self, key: ContextKey) -> Option<String> {
        self.entries.remove(&key)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Read-only copy handed to the intercepted call
    pub fn snapshot(&self) -> CorrelationSnapshot {
        CorrelationSnapshot {
            entries: self.entries.clone(),
        }
    }
}

/// Read-only view of a correlation context.
///
/// HTTP handlers receive it as a request extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationSnapshot {
    entries: BTreeMap<ContextKey, String>,
}

impl CorrelationSnapshot {
    pub fn get(&self, key: ContextKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.get(ContextKey::RequestId)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.get(ContextKey::UserId)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.get(ContextKey::SessionId)
    }

    pub fn client_ip(&self) -> Option<&str> {
        self.get(ContextKey::ClientIp)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Span carrying the correlation entries as fields, so every event
    /// emitted inside the call is tagged with them.
    pub fn span(&self) -> Span {
        if self.is_empty() {
            return Span::none();
        }

        tracing::info_span!(
            "correlation",
            request_id = self.request_id(),
            user_id = self.user_id(),
            session_id = self.session_id(),
            client_ip = self.client_ip(),
        )
    }
}

/// Per-request scope object owning the correlation context
#[derive(Debug, Default)]
pub struct RequestScope {
    correlation: CorrelationContext,
    request: Option<RequestMetadata>,
}

impl RequestScope {
    /// Scope for a call serving an inbound request
    pub fn new(request: RequestMetadata) -> Self {
        Self {
            correlation: CorrelationContext::new(),
            request: Some(request),
        }
    }

    /// Scope for a call with no inbound request attached
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn request(&self) -> Option<&RequestMetadata> {
        self.request.as_ref()
    }

    pub fn correlation(&self) -> &CorrelationContext {
        &self.correlation
    }

    pub fn correlation_mut(&mut self) -> &mut CorrelationContext {
        &mut self.correlation
    }

    /// Record client IP, session id and user id from the inbound request.
    ///
    /// Entries are recorded in that order; a failure leaves the entries
    /// recorded before it in place. Detached scopes are left untouched.
    pub fn populate_from_request(
        &mut self,
        settings: &CorrelationConfig,
    ) -> Result<(), InterceptError> {
        let Some(request) = &self.request else {
            return Ok(());
        };

        if let Some(client_ip) = request.client_ip() {
            self.correlation.insert(ContextKey::ClientIp, client_ip);
        }

        self.correlation.insert(
            ContextKey::SessionId,
            request.session_id.as_deref().unwrap_or(NO_SESSION),
        );

        let user_id = resolve_user_id(
            &request.headers,
            &settings.user_id_header,
            &settings.anonymous_user,
        )?;
        self.correlation.insert(ContextKey::UserId, user_id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderValue, Method, Uri};

    fn request() -> RequestMetadata {
        let mut request = RequestMetadata::new(Method::GET, Uri::from_static("/orders/7"))
            .with_remote_addr(Some("127.0.0.1:40000".parse().unwrap()));
        request
            .headers
            .insert("x-user-id", HeaderValue::from_static("u42"));
        request
    }

    #[test]
    fn test_correlation_ids_are_short_and_distinct() {
        let first = generate_correlation_id();
        let second = generate_correlation_id();

        assert_eq!(first.len(), 8);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_context_insert_and_clear() {
        let mut context = CorrelationContext::new();
        context.insert(ContextKey::RequestId, "abc12345");
        context.insert(ContextKey::UserId, "u42");

        assert_eq!(context.len(), 2);
        assert_eq!(context.get(ContextKey::UserId), Some("u42"));

        context.clear();
        assert!(context.is_empty());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut context = CorrelationContext::new();
        context.insert(ContextKey::RequestId, "abc12345");

        let snapshot = context.snapshot();
        context.clear();

        assert_eq!(snapshot.request_id(), Some("abc12345"));
        assert!(context.is_empty());
    }

    #[test]
    fn test_populate_from_request() {
        let mut scope = RequestScope::new(request());
        scope
            .populate_from_request(&CorrelationConfig::default())
            .unwrap();

        let context = scope.correlation();
        assert_eq!(context.get(ContextKey::ClientIp), Some("127.0.0.1"));
        assert_eq!(context.get(ContextKey::SessionId), Some(NO_SESSION));
        assert_eq!(context.get(ContextKey::UserId), Some("u42"));
    }

    #[test]
    fn test_populate_keeps_entries_recorded_before_failure() {
        let mut request = request().with_session_id("s-1");
        request
            .headers
            .insert("x-user-id", HeaderValue::from_bytes(b"\xfe").unwrap());
        let mut scope = RequestScope::new(request);

        let result = scope.populate_from_request(&CorrelationConfig::default());

        assert!(result.is_err());
        assert_eq!(scope.correlation().get(ContextKey::SessionId), Some("s-1"));
        assert_eq!(scope.correlation().get(ContextKey::UserId), None);
    }

    #[test]
    fn test_populate_detached_scope_is_noop() {
        let mut scope = RequestScope::detached();
        scope
            .populate_from_request(&CorrelationConfig::default())
            .unwrap();
        assert!(scope.correlation().is_empty());
    }

    #[test]
    fn test_context_key_names() {
        let names: Vec<&str> = ContextKey::ALL.iter().map(ContextKey::as_str).collect();
        assert_eq!(names, ["requestId", "userId", "sessionId", "clientIp"]);
    }
}
