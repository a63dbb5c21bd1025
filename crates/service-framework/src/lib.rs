//! # Service Framework
//!
//! This crate provides the building blocks for command-style services: single units
//! of business logic with declared inputs and outputs, executed against a shared,
//! mutable result object called the [`Context`].
//!
//! ## Why Services?
//!
//! A service wraps one operation ("place an order", "register a user") behind a
//! uniform entry point. Callers hand in attributes and always get a context back,
//! carrying the outputs and a success/failure flag:
//!
//! - **Uniform surface** - every operation is called the same way and reports
//!   failure the same way.
//! - **Cross-cutting hooks** - validation, auditing and timing live in before, after
//!   and around hooks instead of being copied into every operation.
//! - **Centralized recovery** - rescue handlers turn expected errors into declared
//!   failures in one place.
//!
//! ## Architecture Overview
//!
//! 1. **Context** ([`Context`]) - dynamically attributed values plus the failed flag.
//! 2. **Schema** ([`schema`]) - declared inputs/outputs and the derived context type.
//! 3. **Callback Chain** ([`CallbackChain`]) - before/after/around hooks.
//! 4. **Rescue Dispatcher** ([`RescueRegistry`]) - error type to handler mapping.
//! 5. **Execution Engine** ([`Service`]) - `call` and `call_strict`.
//!
//! ## Quick Example
//!
//! ```rust
//! use service_framework::{attributes, fail, Service, ServiceError};
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("{0}")]
//! struct InvalidEmail(String);
//!
//! let register = Service::builder("RegisterUser")
//!     .input("email")
//!     .output(["user_id", "error"])
//!     .before(|svc| {
//!         let email: String = svc.get_as("email")?;
//!         svc.set("email", email.trim().to_lowercase())?;
//!         Ok(())
//!     })
//!     .rescue_from(|svc, error: &InvalidEmail| fail!(svc, error: error.to_string()))
//!     .perform(|svc| {
//!         let email: String = svc.get_as("email")?;
//!         if !email.contains('@') {
//!             return Err(InvalidEmail(format!("{email} is not an email address")).into());
//!         }
//!         svc.set("user_id", 1)?;
//!         Ok(())
//!     })
//!     .build();
//!
//! let context = register.call(attributes! { email: "  Ada@Example.com " }).unwrap();
//! assert!(context.succeeded());
//! assert_eq!(context.get_as::<String>("email").unwrap(), "ada@example.com");
//!
//! let context = register.call(attributes! { email: "nope" }).unwrap();
//! assert!(context.failed());
//! assert_eq!(context.get_as::<String>("error").unwrap(), "nope is not an email address");
//!
//! let err = register.call_strict(attributes! { email: "nope" }).unwrap_err();
//! assert!(matches!(err, ServiceError::Failed(ref failure) if failure.context().failed()));
//! ```
//!
//! ## Failure as a Non-local Exit
//!
//! [`fail!`] (or [`Invocation::fail`]) marks the context failed and returns an
//! [`Abort`] signal. Returning it unwinds the entire chain in one step: no remaining
//! before hook, no after hook and no around-hook tail runs. The engine catches the
//! signal once, at the invocation boundary, and hands the failed context back.
//! The failed flag is checked before every hook too, so dropping the signal does not
//! let the chain continue.
//!
//! ## Concurrency Model
//!
//! Execution is synchronous and single-threaded per invocation. A [`Service`] is an
//! immutable descriptor behind an `Arc`; it is `Send + Sync` and can be shared freely.
//! Each call builds its own context and instance, so concurrent calls never share
//! mutable state.
//!
//! ## Testing
//!
//! The [`mock`] module provides a [`Recorder`](mock::Recorder) for asserting on hook
//! order from inside closures.

pub mod callback;
pub mod context;
pub mod error;
pub mod fields;
pub mod flow;
pub mod mock;
pub mod rescue;
pub mod schema;
pub mod service;
pub mod tracing;

// Re-export core types for convenience
pub use callback::{Callback, CallbackChain, CallbackKind, Next};
pub use context::{Attributes, Context};
pub use error::{BoxError, ContextError, Failure, ServiceError};
pub use fields::FieldAccess;
pub use flow::{Abort, Flow};
pub use rescue::RescueRegistry;
pub use schema::{ContextSchema, FieldNames, FieldSet};
pub use service::{Invocation, Service, ServiceBuilder};

#[doc(hidden)]
pub mod __private {
    pub use paste::paste;
    pub use serde_json;
}

/// Builds an [`Attributes`] map: `attributes! { a: 1, name: "Ada" }`.
///
/// Values go through `serde_json::Value::from`, so anything with a `From` conversion
/// (numbers, strings, bools, vectors, options, `Value`) can be used directly.
#[macro_export]
macro_rules! attributes {
    () => {
        $crate::Attributes::new()
    };
    ($($key:ident : $value:expr),+ $(,)?) => {{
        let mut attributes = $crate::Attributes::new();
        $(
            attributes.insert(
                ::std::string::String::from(stringify!($key)),
                $crate::__private::serde_json::Value::from($value),
            );
        )+
        attributes
    }};
}

/// Fails the current invocation and returns from the enclosing hook.
///
/// `fail!(svc, error: "out of stock")` assigns the attributes, marks the context
/// failed and returns the failure signal, so nothing written after it runs.
#[macro_export]
macro_rules! fail {
    ($invocation:expr $(, $key:ident : $value:expr)* $(,)?) => {
        return ::core::result::Result::Err($invocation.fail($crate::attributes!($($key : $value),*)))
    };
}
