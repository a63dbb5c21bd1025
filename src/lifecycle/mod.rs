//! # Shop Lifecycle & Wiring
//!
//! Services are built once and then shared; this module is where they get built.
//! The [`Shop`] owns one [`Store`] and hands a clone of it to every service
//! constructor, so all services see the same users, products and orders.
//!
//! ```rust
//! use service_recipe::lifecycle::Shop;
//! use service_framework::attributes;
//!
//! let shop = Shop::new();
//! let context = shop
//!     .create_user
//!     .call(attributes! { name: "Alice", email: "alice@example.com" })
//!     .unwrap();
//! assert!(context.succeeded());
//! ```
//!
//! ## Dependency Injection
//!
//! Service constructors take their dependencies (`Arc<Store>`, [`ShopConfig`]) as
//! arguments and move them into the hook closures. Derived services receive the
//! parent [`Service`](service_framework::Service) they extend:
//!
//! ```rust,ignore
//! let place_order = order_service::new(store.clone(), &config);
//! let place_priority_order = order_service::priority::new(&place_order, store.clone(), &config);
//! ```
//!
//! ## Configuration
//!
//! [`ShopConfig::from_env`] reads `SHOP_MAX_QUANTITY` and `SHOP_PRIORITY_DISCOUNT`
//! on top of the defaults. Logging is configured separately through `RUST_LOG`; see
//! [`service_framework::tracing`].

pub mod config;
pub mod shop;
pub mod store;

pub use config::*;
pub use shop::*;
pub use store::*;
pub use service_framework::tracing::setup_tracing;
