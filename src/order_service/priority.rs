//! # PlacePriorityOrder
//!
//! A `PlaceOrder` that also accepts a coupon. It inherits the parent's fields,
//! hooks and rescue handlers, adds a coupon check, and runs the parent's unit of
//! work before applying the configured discount.

use super::{OrderError, PlaceOrderFields};
use crate::lifecycle::{ShopConfig, Store};
use service_framework::{context_fields, Service};
use std::sync::Arc;

/// Coupons are accepted when they carry this prefix.
pub const COUPON_PREFIX: &str = "VIP-";

context_fields! {
    pub trait PlacePriorityOrderFields: PlaceOrderFields {
        coupon: Option<String>,
        discount: Option<f64>,
    }
}

pub fn new(place_order: &Service, store: Arc<Store>, config: &ShopConfig) -> Service {
    let parent = place_order.clone();
    let percent = config.priority_discount;

    place_order
        .derive("PlacePriorityOrder")
        .input("coupon")
        .output("discount")
        .before_if(
            |svc| svc.get("coupon").is_ok_and(|coupon| !coupon.is_null()),
            |svc| {
                let coupon = svc.coupon()?.unwrap_or_default();
                if !coupon.starts_with(COUPON_PREFIX) {
                    return Err(OrderError::InvalidCoupon(coupon).into());
                }
                Ok(())
            },
        )
        .perform(move |svc| {
            parent.perform_on(svc)?;

            let Some(order_id) = svc.order_id()? else {
                return Ok(());
            };
            let percent = if svc.coupon()?.is_some() { percent } else { 0.0 };
            if let Some(order) = store.apply_discount(order_id, percent) {
                svc.set_total(Some(order.total))?;
                svc.set_discount(Some(order.discount))?;
            }
            Ok(())
        })
        .build()
}
