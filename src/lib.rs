//! # Service Recipe
//!
//! A small shop built from command-style services.
//!
//! ## Core Components
//!
//! - **[model]**: Pure data structures ([`User`](model::User), [`Product`](model::Product),
//!   [`Order`](model::Order)).
//! - **[user_service]**, **[product_service]**, **[order_service]**: service
//!   definitions, their typed field accessors and their error types.
//! - **[lifecycle]**: the [`Shop`](lifecycle::Shop) that wires services to the
//!   shared store, plus configuration.
//!
//! ## Quick Start
//!
//! The binary in `main.rs` registers a user, stocks a product and places regular and
//! priority orders. Run it with `RUST_LOG=debug` to see every invocation.
//!
//! ## Testing
//!
//! See [`service_framework::mock`] for recording hook order in tests.

pub mod lifecycle;
pub mod model;
pub mod order_service;
pub mod product_service;
pub mod user_service;
