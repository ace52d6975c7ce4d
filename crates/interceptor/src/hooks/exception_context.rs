use crate::chain::{FailureInfo, InterceptorHook};
use crate::context::{ContextKey, RequestScope};
use crate::join_point::{JoinPoint, Pointcut};
use aop_logging_common::to_json_string;
use serde::Serialize;
use std::time::Duration;
use tracing::error;

/// Structured record logged when a handler call fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    pub request_id: Option<String>,
    pub method: String,
    pub exception_type: String,
    pub user_id: Option<String>,
    pub client_ip: Option<String>,
}

impl ErrorContext {
    pub fn new(join_point: &JoinPoint, scope: &RequestScope, failure: &FailureInfo) -> Self {
        let context = scope.correlation();
        let entry = |key| context.get(key).map(str::to_string);

        Self {
            request_id: entry(ContextKey::RequestId),
            method: join_point.qualified_method(),
            exception_type: failure.type_name().to_string(),
            user_id: entry(ContextKey::UserId),
            client_ip: entry(ContextKey::ClientIp),
        }
    }
}

/// Logs the error context and diagnostic trace of failed handler calls.
///
/// Registered after [`AdvancedLoggingInterceptor`](super::AdvancedLoggingInterceptor)
/// so it runs first on the way out, while the correlation entries are still set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExceptionContextInterceptor;

impl ExceptionContextInterceptor {
    pub fn new() -> Self {
        Self
    }
}

impl InterceptorHook for ExceptionContextInterceptor {
    fn name(&self) -> &'static str {
        "exception-context"
    }

    fn pointcut(&self) -> Pointcut {
        Pointcut::CONTROLLERS
    }

    fn after_throwing(
        &self,
        join_point: &JoinPoint,
        scope: &RequestScope,
        _elapsed: Duration,
        failure: &FailureInfo,
    ) {
        let context = ErrorContext::new(join_point, scope, failure);
        error!("Exception Context: {}", to_json_string(&context));
        error!("Stack trace:\n{}", failure.render_trace());
    }
}
