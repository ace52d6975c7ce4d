//! Testing utilities for the AOP logging crates
//!
//! This crate provides:
//! - A tracing layer capturing emitted events and their span fields
//! - Test fixtures for configuration, join points and request metadata
//! - Builder patterns for request metadata and configuration
//! - Mock hooks and errors for exercising the interceptor chain
//!
//! # Examples
//!
//! ```
//! use aop_logging_testing::{capture_logs, fixtures::*};
//!
//! let (logs, _guard) = capture_logs();
//! tracing::info!("Completed order lookup");
//!
//! assert!(logs.contains_message("Completed"));
//! let config = create_test_config();
//! assert_eq!(config.logging.performance.slow_threshold_ms, 1000);
//! ```

pub mod builders;
pub mod fixtures;
pub mod log_capture;
pub mod mocks;

// Re-export commonly used types
pub use builders::*;
pub use fixtures::*;
pub use log_capture::*;
pub use mocks::*;

// Re-export testing dependencies for convenience
pub use proptest;
