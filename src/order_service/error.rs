//! Error types for the order services.

use crate::model::{ProductId, UserId};
use thiserror::Error;

/// Errors that can occur while placing orders.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The user specified in the order does not exist.
    #[error("Invalid user: {0}")]
    InvalidUser(UserId),

    /// The product specified in the order does not exist.
    #[error("Invalid product: {0}")]
    InvalidProduct(ProductId),

    /// There is insufficient stock to fulfill the order.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The coupon presented with a priority order is not recognized.
    #[error("Invalid coupon: {0}")]
    InvalidCoupon(String),
}
