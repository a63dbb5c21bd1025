use crate::model::{ProductId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub total: f64,
    /// Amount taken off `total` by a priority coupon.
    pub discount: f64,
    pub priority: bool,
}

impl Order {
    /// Creates a regular (non-priority) order.
    pub fn new(id: OrderId, user_id: UserId, product_id: ProductId, quantity: u32, total: f64) -> Self {
        Self {
            id,
            user_id,
            product_id,
            quantity,
            total,
            discount: 0.0,
            priority: false,
        }
    }
}

impl From<OrderId> for serde_json::Value {
    fn from(id: OrderId) -> Self {
        Self::from(id.0)
    }
}
