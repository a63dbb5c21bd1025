//! # AddProduct
//!
//! Adds a product to the inventory.

mod error;

pub use error::ProductError;

use crate::lifecycle::Store;
use crate::model::ProductId;
use service_framework::{context_fields, fail, Service};
use std::sync::Arc;

context_fields! {
    pub trait AddProductFields {
        name: String,
        price: f64,
        stock: u32,
        product_id: Option<ProductId>,
        error: Option<String>,
    }
}

pub fn new(store: Arc<Store>) -> Service {
    Service::builder("AddProduct")
        .input(["name", "price", "stock"])
        .output(["product_id", "error"])
        .rescue_from(|svc, error: &ProductError| fail!(svc, error: error.to_string()))
        .perform(move |svc| {
            let (name, price, stock) = (svc.name()?, svc.price()?, svc.stock()?);
            if name.trim().is_empty() {
                return Err(ProductError::ValidationError("name must not be empty".into()).into());
            }
            if !price.is_finite() || price <= 0.0 {
                return Err(ProductError::ValidationError(format!("invalid price: {price}")).into());
            }

            let product = store.insert_product(name.trim(), price, stock);
            svc.set_product_id(Some(product.id))?;
            Ok(())
        })
        .build()
}
