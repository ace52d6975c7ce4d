//! Application state and dependency injection.
//!
//! This module defines the shared application state that is passed
//! to all route handlers via Axum's state extraction.

use crate::services::OrderService;
use aop_logging_common::AppConfig;
use aop_logging_interceptor::InterceptorChain;
use std::sync::Arc;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Hook chain applied to controllers and services
    pub chain: Arc<InterceptorChain>,

    /// Order service
    pub orders: Arc<OrderService>,
}

impl AppState {
    /// Create the state with the hook chain selected by `config`
    pub fn new(config: AppConfig) -> Self {
        let chain = Arc::new(InterceptorChain::from_config(&config));
        Self::with_chain(config, chain)
    }

    /// Create the state around an explicit hook chain
    pub fn with_chain(config: AppConfig, chain: Arc<InterceptorChain>) -> Self {
        let orders = Arc::new(OrderService::new(chain.clone()));

        Self {
            config: Arc::new(config),
            chain,
            orders,
        }
    }
}
