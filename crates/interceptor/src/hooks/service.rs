use crate::chain::{FailureInfo, InterceptorHook};
use crate::context::RequestScope;
use crate::join_point::{JoinPoint, Pointcut};
use crate::performance::elapsed_ms;
use std::time::Duration;
use tracing::{debug, error};

/// Debug-level tracing of service-layer calls
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceLoggingInterceptor;

impl ServiceLoggingInterceptor {
    pub fn new() -> Self {
        Self
    }
}

impl InterceptorHook for ServiceLoggingInterceptor {
    fn name(&self) -> &'static str {
        "service-logging"
    }

    fn pointcut(&self) -> Pointcut {
        Pointcut::SERVICES
    }

    fn before(&self, join_point: &JoinPoint, _scope: &mut RequestScope) {
        debug!(
            "Service → {}.{}()",
            join_point.class_name(),
            join_point.method()
        );
    }

    fn after_returning(&self, join_point: &JoinPoint, _scope: &RequestScope, elapsed: Duration) {
        debug!(
            "Service ← {}.{}() completed in {} ms",
            join_point.class_name(),
            join_point.method(),
            elapsed_ms(elapsed)
        );
    }

    fn after_throwing(
        &self,
        join_point: &JoinPoint,
        _scope: &RequestScope,
        elapsed: Duration,
        failure: &FailureInfo,
    ) {
        error!(
            error = %failure,
            "Service ✗ {}.{}() failed after {} ms",
            join_point.class_name(),
            join_point.method(),
            elapsed_ms(elapsed)
        );
    }
}
