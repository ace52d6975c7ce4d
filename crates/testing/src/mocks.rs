//! Mock hooks and errors for exercising the interceptor chain.

use aop_logging_interceptor::{
    ContextKey, FailureInfo, InterceptorHook, InvocationError, JoinPoint, Pointcut, RequestScope,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Hook recording every invocation as `name:phase:Class.method`
pub struct RecordingHook {
    name: &'static str,
    pointcut: Pointcut,
    calls: Arc<RwLock<Vec<String>>>,
}

impl RecordingHook {
    pub fn new(name: &'static str, pointcut: Pointcut) -> Self {
        Self {
            name,
            pointcut,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Hook on request handlers
    pub fn controllers(name: &'static str) -> Self {
        Self::new(name, Pointcut::CONTROLLERS)
    }

    /// Share the call log with another hook so ordering across hooks can be asserted
    pub fn sharing(mut self, other: &RecordingHook) -> Self {
        self.calls = other.calls.clone();
        self
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    pub fn clear(&self) {
        self.calls.write().clear();
    }

    fn record(&self, phase: &str, join_point: &JoinPoint) {
        self.calls
            .write()
            .push(format!("{}:{}:{}", self.name, phase, join_point.qualified_method()));
    }
}

impl Clone for RecordingHook {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            pointcut: self.pointcut,
            calls: self.calls.clone(),
        }
    }
}

impl InterceptorHook for RecordingHook {
    fn name(&self) -> &'static str {
        self.name
    }

    fn pointcut(&self) -> Pointcut {
        self.pointcut
    }

    fn before(&self, join_point: &JoinPoint, _scope: &mut RequestScope) {
        self.record("before", join_point);
    }

    fn after_returning(&self, join_point: &JoinPoint, _scope: &RequestScope, _elapsed: Duration) {
        self.record("after_returning", join_point);
    }

    fn after_throwing(
        &self,
        join_point: &JoinPoint,
        _scope: &RequestScope,
        _elapsed: Duration,
        _failure: &FailureInfo,
    ) {
        self.record("after_throwing", join_point);
    }
}

/// Hook that sets a fixed request id, standing in for correlation setup
#[derive(Debug, Clone)]
pub struct FixedRequestIdHook(pub &'static str);

impl InterceptorHook for FixedRequestIdHook {
    fn name(&self) -> &'static str {
        "fixed-request-id"
    }

    fn pointcut(&self) -> Pointcut {
        Pointcut::CONTROLLERS
    }

    fn before(&self, _join_point: &JoinPoint, scope: &mut RequestScope) {
        scope.correlation_mut().insert(ContextKey::RequestId, self.0);
    }
}

/// Errors returned by mock intercepted calls
#[derive(Debug, Error)]
pub enum MockError {
    #[error("order {0} not found")]
    NotFound(u64),

    #[error("checkout failed")]
    Checkout {
        #[source]
        source: std::io::Error,
    },
}

impl InvocationError for MockError {}

impl MockError {
    /// Failure with a one-level cause chain
    pub fn checkout(cause: &str) -> Self {
        Self::Checkout {
            source: std::io::Error::new(std::io::ErrorKind::Other, cause.to_string()),
        }
    }
}
