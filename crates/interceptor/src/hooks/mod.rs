//! Built-in interceptor hooks.
//!
//! - [`AdvancedLoggingInterceptor`]: correlation context, request details and performance records
//! - [`ExceptionContextInterceptor`]: structured error context for failed handler calls
//! - [`BasicLoggingInterceptor`]: entry, exit and failure lines only
//! - [`ServiceLoggingInterceptor`]: debug-level tracing of service-layer calls

mod advanced;
mod basic;
mod exception_context;
mod service;

pub use advanced::AdvancedLoggingInterceptor;
pub use basic::BasicLoggingInterceptor;
pub use exception_context::{ErrorContext, ExceptionContextInterceptor};
pub use service::ServiceLoggingInterceptor;
