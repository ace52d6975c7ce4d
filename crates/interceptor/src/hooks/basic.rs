use crate::chain::{FailureInfo, InterceptorHook};
use crate::context::RequestScope;
use crate::join_point::{JoinPoint, Pointcut};
use std::time::Duration;
use tracing::{error, info};

/// Entry, exit and failure logging around request handlers
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicLoggingInterceptor;

impl BasicLoggingInterceptor {
    pub fn new() -> Self {
        Self
    }
}

impl InterceptorHook for BasicLoggingInterceptor {
    fn name(&self) -> &'static str {
        "basic-logging"
    }

    fn pointcut(&self) -> Pointcut {
        Pointcut::CONTROLLERS
    }

    fn before(&self, join_point: &JoinPoint, _scope: &mut RequestScope) {
        info!(
            "→ Entering: {}.{}()",
            join_point.class_name(),
            join_point.method()
        );
    }

    fn after_returning(&self, join_point: &JoinPoint, _scope: &RequestScope, _elapsed: Duration) {
        info!(
            "← Exiting: {}.{}()",
            join_point.class_name(),
            join_point.method()
        );
    }

    fn after_throwing(
        &self,
        join_point: &JoinPoint,
        _scope: &RequestScope,
        _elapsed: Duration,
        failure: &FailureInfo,
    ) {
        error!(
            "✗ Exception in: {}.{}() - {}",
            join_point.class_name(),
            join_point.method(),
            failure.message()
        );
        error!(
            "Exception thrown in {}.{}(): {} - {}\n{}",
            join_point.class_name(),
            join_point.method(),
            failure.simple_type_name(),
            failure.message(),
            failure.render_trace()
        );
    }
}
