//! HTTP service wiring the logging interceptors into axum
//!
//! Controller routes are registered through [`middleware::Controller`], which
//! wraps every endpoint in an [`middleware::InterceptLayer`] so the configured
//! hook chain runs around each handler call.
//!
//! ## Architecture
//!
//! - **app**: Router assembly and the tower-http middleware stack
//! - **routes**: Health check and the order controller
//! - **services**: In-memory order service intercepted as a service component
//! - **middleware**: Interception layer, controller router builder, session and panic handling
//! - **responses**: Standardized response types
//! - **error**: HTTP error handling and conversion
//!
//! ## Usage
//!
//! ```rust,no_run
//! use aop_logging_api_rest::create_app;
//! use aop_logging_common::AppConfig;
//! use std::net::SocketAddr;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let listener = tokio::net::TcpListener::bind(config.server_address()).await?;
//!     let app = create_app(config);
//!
//!     axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod app;
pub mod error;
pub mod middleware;
pub mod responses;
pub mod routes;
pub mod services;
pub mod state;

// Re-export commonly used types
pub use app::{build_router, create_app};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
