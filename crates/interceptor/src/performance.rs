//! Performance records for intercepted calls.

use crate::join_point::JoinPoint;
use aop_logging_common::serialization::{is_false, to_json_string};
use aop_logging_common::PERFORMANCE_TARGET;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Whole milliseconds, saturating
pub(crate) fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Timing of one intercepted call, written to the performance sink
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub class: String,
    pub method: String,
    pub execution_time_ms: u64,
    pub success: bool,
    pub request_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "is_false")]
    pub slow: bool,
}

impl PerformanceRecord {
    /// Build the record for a finished call
    pub fn new(
        join_point: &JoinPoint,
        elapsed: Duration,
        success: bool,
        request_id: Option<&str>,
        slow_threshold_ms: u64,
    ) -> Self {
        let execution_time_ms = elapsed_ms(elapsed);

        Self {
            class: join_point.class_name().to_string(),
            method: join_point.method().to_string(),
            execution_time_ms,
            success,
            request_id: request_id.map(str::to_string),
            timestamp: Utc::now(),
            slow: is_slow(execution_time_ms, slow_threshold_ms),
        }
    }

    /// Write the record to the performance sink: warn when slow, info otherwise
    pub fn emit(&self) {
        let payload = to_json_string(self);

        if self.slow {
            warn!(
                target: PERFORMANCE_TARGET,
                request_id = self.request_id.as_deref(),
                execution_time_ms = self.execution_time_ms,
                slow = true,
                "SLOW METHOD DETECTED: {}",
                payload
            );
        } else {
            info!(
                target: PERFORMANCE_TARGET,
                request_id = self.request_id.as_deref(),
                execution_time_ms = self.execution_time_ms,
                "Performance: {}",
                payload
            );
        }
    }
}

/// A call is slow when it took strictly longer than the threshold
pub fn is_slow(execution_time_ms: u64, slow_threshold_ms: u64) -> bool {
    execution_time_ms > slow_threshold_ms
}
