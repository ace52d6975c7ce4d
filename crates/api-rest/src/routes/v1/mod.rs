//! API v1 routes.

use crate::state::AppState;
use aop_logging_interceptor::InterceptorChain;
use axum::Router;
use std::sync::Arc;

pub mod orders;

/// Create all v1 API routes, intercepted by `chain`
pub fn routes(chain: &Arc<InterceptorChain>) -> Router<AppState> {
    Router::new().merge(orders::routes(chain))
}
