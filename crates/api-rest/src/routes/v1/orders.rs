//! Order endpoints.

use crate::{
    error::{ApiError, ApiResult},
    middleware::{Controller, Endpoint},
    responses::{ApiResponse, Created},
    services::{NewOrder, Order},
    state::AppState,
};
use aop_logging_interceptor::{CorrelationSnapshot, InterceptorChain};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Longest delay accepted by the latency report
const MAX_REPORT_DELAY_MS: u64 = 10_000;

/// Controller type named in interception logs
pub struct OrderController;

/// Order creation request
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Ordered item
    pub item: String,
    /// Number of items
    pub quantity: u32,
}

/// Latency report query
#[derive(Debug, Deserialize)]
pub struct LatencyQuery {
    /// Simulated processing time
    #[serde(default)]
    pub delay_ms: u64,
}

/// Latency report response
#[derive(Debug, Serialize, Deserialize)]
pub struct LatencyReport {
    /// Simulated processing time
    pub delay_ms: u64,
    /// Orders currently stored
    pub order_count: usize,
}

/// Order routes
pub fn routes(chain: &Arc<InterceptorChain>) -> Router<AppState> {
    Controller::of::<OrderController>(chain.clone())
        .route("/orders", Endpoint::new("list_orders"), get(list_orders))
        .route(
            "/orders",
            Endpoint::new("create_order").arg::<Json<CreateOrderRequest>>(),
            post(create_order),
        )
        .route(
            "/orders/:id",
            Endpoint::new("get_order").arg::<Path<u64>>(),
            get(get_order),
        )
        .route(
            "/reports/latency",
            Endpoint::new("latency_report").arg::<Query<LatencyQuery>>(),
            get(latency_report),
        )
        .into_router()
}

async fn list_orders(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Order>>> {
    let orders = state.orders.list_orders().await?;
    Ok(ApiResponse::ok(orders))
}

async fn create_order(
    State(state): State<AppState>,
    Extension(context): Extension<CorrelationSnapshot>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Created<Order>> {
    // Empty in basic mode, which records no correlation context
    let created_by = context
        .user_id()
        .unwrap_or(state.config.correlation.anonymous_user.as_str());

    let order = state
        .orders
        .create_order(NewOrder {
            item: req.item,
            quantity: req.quantity,
            created_by: created_by.to_string(),
            request_id: context.request_id().map(str::to_string),
        })
        .await?;

    info!(order_id = order.id, "Order created");
    Ok(Created(order))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<ApiResponse<Order>> {
    let order = state.orders.find_order(id).await?;
    Ok(ApiResponse::ok(order))
}

async fn latency_report(
    State(state): State<AppState>,
    Query(query): Query<LatencyQuery>,
) -> ApiResult<ApiResponse<LatencyReport>> {
    if query.delay_ms > MAX_REPORT_DELAY_MS {
        return Err(ApiError::Validation(format!(
            "delay_ms must be at most {}",
            MAX_REPORT_DELAY_MS
        )));
    }

    tokio::time::sleep(Duration::from_millis(query.delay_ms)).await;
    let order_count = state.orders.list_orders().await?.len();

    Ok(ApiResponse::ok(LatencyReport {
        delay_ms: query.delay_ms,
        order_count,
    }))
}
