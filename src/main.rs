//! Demo scenario: register a user, stock a product, then place a regular order, a
//! priority order and one that runs out of stock.

use service_framework::attributes;
use service_recipe::lifecycle::{setup_tracing, Shop, ShopConfig};
use service_recipe::order_service::priority::PlacePriorityOrderFields;
use service_recipe::order_service::PlaceOrderFields;
use tracing::{error, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let shop = Shop::with_config(ShopConfig::from_env()?);
    info!(config = ?shop.config(), "Starting shop");

    let user = shop
        .create_user
        .call_strict(attributes! { name: "Alice", email: "Alice@Example.com" })?;
    let user_id: u32 = user.get_as("user_id")?;
    info!(user_id, "User created");

    let product = shop
        .add_product
        .call_strict(attributes! { name: "Test Product", price: 100.0, stock: 10 })?;
    let product_id: u32 = product.get_as("product_id")?;
    info!(product_id, "Product created");

    let order = shop
        .place_order
        .call(attributes! { user_id: user_id, product_id: product_id, quantity: 5 })?;
    info!(%order, "Regular order");

    let priority = shop.place_priority_order.call(attributes! {
        user_id: user_id,
        product_id: product_id,
        quantity: 3,
        coupon: "VIP-2024",
    })?;
    info!(
        order_id = ?priority.order_id()?,
        total = ?priority.total()?,
        discount = ?priority.discount()?,
        "Priority order"
    );

    let rejected = shop
        .place_order
        .call(attributes! { user_id: user_id, product_id: product_id, quantity: 5 })?;
    if rejected.failed() {
        warn!(error = ?rejected.error()?, "Order rejected");
    }

    match shop
        .place_priority_order
        .call_strict(attributes! { user_id: user_id, product_id: product_id, quantity: 1, coupon: "FREE" })
    {
        Ok(context) => info!(%context, "Unexpected success"),
        Err(err) => error!(%err, "Strict call failed"),
    }

    for entry in shop.store().audit_log() {
        info!(%entry, "Audit");
    }
    Ok(())
}
