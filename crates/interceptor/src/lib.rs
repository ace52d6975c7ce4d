//! Request/response logging interceptors.
//!
//! Interception is an explicit hook chain: the request-handling layer
//! describes each call as a [`JoinPoint`], hands it to
//! [`InterceptorChain::proceed`] together with the per-request
//! [`RequestScope`], and the chain runs the matching hooks around the call.
//!
//! ## Modules
//!
//! - **join_point**: call descriptions, component kinds and pointcuts
//! - **context**: correlation context and the per-request scope
//! - **request**: request metadata, client IP / user id resolution, request details
//! - **performance**: performance records and slow-call classification
//! - **chain**: the hook trait and the chain that runs hooks around a call
//! - **hooks**: the basic, advanced, exception-context and service-layer hooks
//!
//! ## Usage
//!
//! ```rust,no_run
//! use aop_logging_common::AppConfig;
//! use aop_logging_interceptor::{InterceptorChain, JoinPoint, RequestScope};
//!
//! # async fn run() -> Result<u32, std::io::Error> {
//! let chain = InterceptorChain::from_config(&AppConfig::default());
//! let join_point = JoinPoint::service("shop::OrderService", "count_orders");
//! let mut scope = RequestScope::detached();
//!
//! chain
//!     .proceed(&join_point, &mut scope, |_context| async { Ok(42) })
//!     .await
//! # }
//! ```

pub mod chain;
pub mod context;
pub mod error;
pub mod hooks;
pub mod join_point;
pub mod performance;
pub mod request;

// Re-export commonly used types
pub use chain::{FailureInfo, InterceptorChain, InterceptorHook, InvocationError};
pub use context::{
    generate_correlation_id, ContextKey, CorrelationContext, CorrelationSnapshot, RequestScope,
};
pub use error::InterceptError;
pub use hooks::{
    AdvancedLoggingInterceptor, BasicLoggingInterceptor, ErrorContext, ExceptionContextInterceptor,
    ServiceLoggingInterceptor,
};
pub use join_point::{simple_class_name, ComponentKind, JoinPoint, Pointcut};
pub use performance::PerformanceRecord;
pub use request::{resolve_client_ip, resolve_user_id, RequestDetails, RequestMetadata, SessionId};
