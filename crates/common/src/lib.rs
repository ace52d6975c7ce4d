//! Common utilities shared by the interceptor and the HTTP service.
//!
//! This crate provides:
//! - Configuration management
//! - Telemetry setup (application and performance log sinks)
//! - Serialization helpers for structured log payloads

pub mod config;
pub mod serialization;
pub mod telemetry;

// Re-export commonly used types
pub use config::{
    AppConfig, CorrelationConfig, InterceptionConfig, InterceptionMode, LoggingConfig,
    PerformanceConfig, RequestLoggingConfig, ServerConfig, TelemetryConfig,
};
pub use serialization::to_json_string;
pub use telemetry::{init_tracing, PERFORMANCE_TARGET};

/// Common error type used throughout the crate
pub type Result<T> = std::result::Result<T, anyhow::Error>;
