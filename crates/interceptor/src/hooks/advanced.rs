use crate::chain::{FailureInfo, InterceptorHook};
use crate::context::{generate_correlation_id, ContextKey, RequestScope};
use crate::join_point::{JoinPoint, Pointcut};
use crate::performance::{elapsed_ms, PerformanceRecord};
use crate::request::RequestDetails;
use aop_logging_common::{to_json_string, CorrelationConfig, LoggingConfig};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Correlation-aware logging around request handlers.
///
/// Before the call it assigns a request id, records client IP, session and
/// user id, and optionally logs request details. After the call it writes a
/// performance record and a completion or failure line.
#[derive(Debug, Clone)]
pub struct AdvancedLoggingInterceptor {
    logging: LoggingConfig,
    correlation: CorrelationConfig,
}

impl AdvancedLoggingInterceptor {
    pub fn new(logging: &LoggingConfig, correlation: &CorrelationConfig) -> Self {
        Self {
            logging: logging.clone(),
            correlation: correlation.clone(),
        }
    }

    fn log_request_details(&self, join_point: &JoinPoint, scope: &RequestScope) {
        let Some(request) = scope.request() else {
            return;
        };

        match RequestDetails::collect(request, join_point, &self.logging.request) {
            Ok(Some(details)) => debug!("Request Details: {}", to_json_string(&details)),
            Ok(None) => {}
            Err(e) => warn!("Failed to log request details: {}", e),
        }
    }

    fn record_performance(
        &self,
        join_point: &JoinPoint,
        request_id: Option<&str>,
        elapsed: Duration,
        success: bool,
    ) {
        PerformanceRecord::new(
            join_point,
            elapsed,
            success,
            request_id,
            self.logging.performance.slow_threshold_ms,
        )
        .emit();
    }
}

impl InterceptorHook for AdvancedLoggingInterceptor {
    fn name(&self) -> &'static str {
        "advanced-logging"
    }

    fn pointcut(&self) -> Pointcut {
        Pointcut::CONTROLLERS
    }

    fn before(&self, join_point: &JoinPoint, scope: &mut RequestScope) {
        let request_id = generate_correlation_id();
        scope
            .correlation_mut()
            .insert(ContextKey::RequestId, request_id.as_str());

        if let Err(e) = scope.populate_from_request(&self.correlation) {
            warn!(request_id = %request_id, "Failed to setup full correlation context: {}", e);
        }

        self.log_request_details(join_point, scope);

        info!(
            request_id = %request_id,
            "→ [{}] Starting: {}.{}()",
            request_id,
            join_point.class_name(),
            join_point.method()
        );
    }

    fn after_returning(&self, join_point: &JoinPoint, scope: &RequestScope, elapsed: Duration) {
        let request_id = scope.correlation().get(ContextKey::RequestId);
        self.record_performance(join_point, request_id, elapsed, true);

        info!(
            request_id = request_id,
            elapsed_ms = elapsed_ms(elapsed),
            "← [{}] Completed: {}.{}() in {} ms",
            request_id.unwrap_or_default(),
            join_point.class_name(),
            join_point.method(),
            elapsed_ms(elapsed)
        );
    }

    fn after_throwing(
        &self,
        join_point: &JoinPoint,
        scope: &RequestScope,
        elapsed: Duration,
        failure: &FailureInfo,
    ) {
        let request_id = scope.correlation().get(ContextKey::RequestId);
        self.record_performance(join_point, request_id, elapsed, false);

        error!(
            request_id = request_id,
            elapsed_ms = elapsed_ms(elapsed),
            "✗ [{}] Failed: {}.{}() after {} ms - {}",
            request_id.unwrap_or_default(),
            join_point.class_name(),
            join_point.method(),
            elapsed_ms(elapsed),
            failure.message()
        );
    }
}
