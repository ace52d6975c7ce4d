//! In-memory order service.

use aop_logging_interceptor::{InterceptorChain, InvocationError, JoinPoint, RequestScope};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Order service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No order with this id
    #[error("Order {0} not found")]
    NotFound(u64),

    /// Order data rejected
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

impl ServiceError {
    /// Get error code for API response
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ORDER_NOT_FOUND",
            Self::InvalidOrder(_) => "INVALID_ORDER",
        }
    }
}

impl InvocationError for ServiceError {}

/// A stored order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order id
    pub id: u64,
    /// Ordered item
    pub item: String,
    /// Number of items
    pub quantity: u32,
    /// User who placed the order
    pub created_by: String,
    /// Correlation id of the request that placed the order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Data for a new order
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Ordered item
    pub item: String,
    /// Number of items
    pub quantity: u32,
    /// User placing the order
    pub created_by: String,
    /// Correlation id of the placing request
    pub request_id: Option<String>,
}

/// In-memory order store
pub struct OrderService {
    orders: RwLock<BTreeMap<u64, Order>>,
    next_id: AtomicU64,
    chain: Arc<InterceptorChain>,
}

impl OrderService {
    /// Create an empty store whose methods run through `chain`
    pub fn new(chain: Arc<InterceptorChain>) -> Self {
        Self {
            orders: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            chain,
        }
    }

    /// All orders, by id
    pub async fn list_orders(&self) -> Result<Vec<Order>, ServiceError> {
        self.intercept("list_orders", || async {
            Ok(self.orders.read().values().cloned().collect())
        })
        .await
    }

    /// Look up one order
    pub async fn find_order(&self, id: u64) -> Result<Order, ServiceError> {
        self.intercept("find_order", || async move {
            self.orders
                .read()
                .get(&id)
                .cloned()
                .ok_or(ServiceError::NotFound(id))
        })
        .await
    }

    /// Store a new order
    pub async fn create_order(&self, new_order: NewOrder) -> Result<Order, ServiceError> {
        self.intercept("create_order", || async move {
            if new_order.item.trim().is_empty() {
                return Err(ServiceError::InvalidOrder("item must not be empty".to_string()));
            }
            if new_order.quantity == 0 {
                return Err(ServiceError::InvalidOrder("quantity must be positive".to_string()));
            }

            let order = Order {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                item: new_order.item,
                quantity: new_order.quantity,
                created_by: new_order.created_by,
                request_id: new_order.request_id,
                created_at: Utc::now(),
            };
            self.orders.write().insert(order.id, order.clone());

            Ok(order)
        })
        .await
    }

    async fn intercept<T, F, Fut>(&self, method: &'static str, call: F) -> Result<T, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let join_point = JoinPoint::service(std::any::type_name::<Self>(), method);
        let mut scope = RequestScope::detached();

        self.chain
            .proceed(&join_point, &mut scope, |_| call())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> OrderService {
        OrderService::new(Arc::new(InterceptorChain::new()))
    }

    fn new_order(item: &str, quantity: u32) -> NewOrder {
        NewOrder {
            item: item.to_string(),
            quantity,
            created_by: "u42".to_string(),
            request_id: Some("abc12345".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let service = service();

        let created = service.create_order(new_order("keyboard", 2)).await.unwrap();
        assert_eq!(created.id, 1);

        let found = service.find_order(1).await.unwrap();
        assert_eq!(found.item, "keyboard");
        assert_eq!(found.created_by, "u42");
        assert_eq!(service.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_missing_order() {
        let err = service().find_order(99).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(99)));
    }

    #[tokio::test]
    async fn test_rejects_invalid_orders() {
        let service = service();

        assert!(matches!(
            service.create_order(new_order(" ", 1)).await,
            Err(ServiceError::InvalidOrder(_))
        ));
        assert!(matches!(
            service.create_order(new_order("mouse", 0)).await,
            Err(ServiceError::InvalidOrder(_))
        ));
        assert!(service.list_orders().await.unwrap().is_empty());
    }
}
