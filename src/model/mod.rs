//! Domain model types shared by the shop services.
//!
//! These are plain data structures; the services in [`crate::user_service`],
//! [`crate::product_service`] and [`crate::order_service`] create and modify them
//! through the [`Store`](crate::lifecycle::Store).

pub mod order;
pub mod product;
pub mod user;

pub use order::*;
pub use product::*;
pub use user::*;
