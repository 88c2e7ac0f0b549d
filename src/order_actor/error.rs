use std::time::Duration;

use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::OrderStatus;
use crate::product_actor::ProductError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Insufficient stock available: requested {requested}, available {available}")]
    OutOfStock { requested: u32, available: u32 },
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Service temporarily unavailable due to high load, retry after {}s", .retry_after.as_secs())]
    Overloaded { retry_after: Duration },
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order already exists: {0}")]
    Conflict(String),
    #[error("Order database error: {0}")]
    DatabaseError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    /// HTTP-analogous status for a request layer sitting in front of the client.
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::ValidationError(_)
            | OrderError::OutOfStock { .. }
            | OrderError::InvalidTransition { .. } => 400,
            OrderError::NotFound(_) | OrderError::ProductNotFound(_) => 404,
            OrderError::Conflict(_) => 409,
            OrderError::Overloaded { .. } => 503,
            OrderError::DatabaseError(_) | OrderError::ActorCommunicationError(_) => 500,
        }
    }

    /// Message safe to show to an end user. Internal failures carry no detail.
    pub fn public_message(&self) -> String {
        match self {
            OrderError::DatabaseError(_) | OrderError::ActorCommunicationError(_) => {
                "Failed to process order".to_string()
            }
            OrderError::OutOfStock { .. } => "Insufficient stock available".to_string(),
            OrderError::ProductNotFound(_) => "Product not found".to_string(),
            OrderError::NotFound(_) => "Order not found".to_string(),
            other => other.to_string(),
        }
    }

    /// Suggested client back-off, present only for admission rejections.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            OrderError::Overloaded { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::Conflict(id) => OrderError::Conflict(id),
            FrameworkError::Persistence(msg) => OrderError::DatabaseError(msg),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                OrderError::ActorCommunicationError(e.to_string())
            }
        }
    }
}

/// Stock failures as seen from the order flow.
impl From<ProductError> for OrderError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(id) => OrderError::ProductNotFound(id),
            ProductError::InsufficientStock { requested, available } => {
                OrderError::OutOfStock { requested, available }
            }
            ProductError::InvalidQuantity(qty) => {
                OrderError::ValidationError(format!("Invalid quantity: {qty}"))
            }
            ProductError::ValidationError(msg) => OrderError::ValidationError(msg),
            ProductError::Conflict(id) => OrderError::Conflict(id),
            ProductError::DatabaseError(msg) => OrderError::DatabaseError(msg),
            ProductError::ActorCommunicationError(msg) => OrderError::ActorCommunicationError(msg),
        }
    }
}
