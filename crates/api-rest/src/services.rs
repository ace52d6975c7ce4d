//! Service layer.
//!
//! Service methods run through the hook chain as service join points, so
//! service-layer logging applies when it is enabled.

pub mod orders;

pub use orders::{NewOrder, Order, OrderService, ServiceError};
