//! HTTP middleware components.
//!
//! This module provides middleware for request/response processing including:
//! - Interception of controller endpoints by the logging hook chain
//! - Session identification
//! - Panic handling

pub mod error_handler;
pub mod intercept;
pub mod session;

pub use error_handler::handle_panic;
pub use intercept::{Controller, Endpoint, InterceptLayer, InterceptService};
pub use session::{session_middleware, SESSION_COOKIE};
