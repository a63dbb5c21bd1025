//! # PlaceOrder
//!
//! Places an order for an existing user and product.
//!
//! The hooks are where the cross-cutting parts live:
//!
//! | Hook | Role |
//! |------|------|
//! | around | measures how long the order took, only for orders that go through |
//! | before | rejects quantities outside `1..=max_quantity` with a declared failure |
//! | after  | appends an entry to the store's audit trail |
//!
//! [`OrderError`]s raised by the store are rescued into a failed context carrying
//! the error message. [`priority`] derives `PlacePriorityOrder` from this service.

mod error;
pub mod priority;

pub use error::OrderError;

use crate::lifecycle::{ShopConfig, Store};
use crate::model::{OrderId, ProductId, UserId};
use service_framework::{context_fields, fail, Flow, Invocation, Next, Service};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

context_fields! {
    pub trait PlaceOrderFields {
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        order_id: Option<OrderId>,
        total: Option<f64>,
        error: Option<String>,
    }
}

/// Builds the `PlaceOrder` service.
pub fn new(store: Arc<Store>, config: &ShopConfig) -> Service {
    let max_quantity = config.max_quantity;
    let audit = store.clone();

    Service::builder("PlaceOrder")
        .input(["user_id", "product_id", "quantity"])
        .output(["order_id", "total", "error"])
        .around(time_order)
        .before(move |svc| {
            let quantity = svc.quantity()?;
            if quantity == 0 || quantity > max_quantity {
                fail!(svc, error: format!("quantity must be between 1 and {max_quantity}, got {quantity}"));
            }
            Ok(())
        })
        .after(move |svc| {
            if let Some(order_id) = svc.order_id()? {
                let (user_id, total) = (svc.user_id()?, svc.total()?.unwrap_or_default());
                audit.record_audit(format!(
                    "{} placed {order_id} ({}) total={total:.2}",
                    user_id,
                    svc.service().name()
                ));
            }
            Ok(())
        })
        .rescue_from(|svc, error: &OrderError| fail!(svc, error: error.to_string()))
        .perform(move |svc| {
            let (user_id, product_id, quantity) = (svc.user_id()?, svc.product_id()?, svc.quantity()?);
            let order = store.place_order(user_id, product_id, quantity)?;
            debug!(order_id = %order.id, total = order.total, "Order placed");

            svc.set_order_id(Some(order.id))?;
            svc.set_total(Some(order.total))?;
            Ok(())
        })
        .build()
}

fn time_order(svc: &mut Invocation, next: Next<'_>) -> Flow {
    let started = Instant::now();
    next.run(svc)?;
    info!(
        service = svc.service().name(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "Order processed"
    );
    Ok(())
}
