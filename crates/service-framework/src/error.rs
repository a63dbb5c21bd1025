//! # Framework Errors
//!
//! This module defines the common error types used throughout the service framework.
//! By centralizing error definitions, we ensure consistent error handling across
//! all services and their callers.
//!
//! There are three families:
//!
//! - [`ContextError`] - misuse of a context (unknown fields, bad values, writes after failure).
//! - [`Failure`] - the raised form of a declared failure, produced by [`Service::call_strict`](crate::Service::call_strict).
//! - [`ServiceError`] - what the invocation entry points hand back to callers.

use crate::context::Context;

/// Boxed error type carried by raised errors, as produced by `?` inside hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised when reading or writing fields on a [`Context`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("Unknown field `{field}` on {schema}")]
    UnknownField { schema: String, field: String },
    #[error("Field `{field}` holds an incompatible value: {message}")]
    Type { field: String, message: String },
    #[error("Context has already failed, refusing to assign `{field}`")]
    Failed { field: String },
}

/// A declared failure turned into an error value.
///
/// Carries the terminal [`Context`], so callers of `call_strict` can still
/// inspect whatever attributes were handed to `fail`.
#[derive(Debug, thiserror::Error)]
#[error("Service failed: {context}")]
pub struct Failure {
    context: Context,
}

impl Failure {
    pub(crate) fn new(context: Context) -> Self {
        Self { context }
    }

    /// The context at the moment the service failed.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn into_context(self) -> Context {
        self.context
    }
}

/// Errors surfaced by [`Service::call`](crate::Service::call) and
/// [`Service::call_strict`](crate::Service::call_strict).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Only produced by `call_strict`.
    #[error("{0}")]
    Failed(#[from] Failure),
    /// The attributes handed to the entry point did not fit the schema.
    #[error("{0}")]
    Context(#[from] ContextError),
    /// An error escaped the callback chain and no rescue handler claimed it.
    #[error("{0}")]
    Raised(BoxError),
}

impl ServiceError {
    /// Returns the terminal context of a declared failure.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ServiceError::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Attempts to view an unrescued error as a concrete type.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            ServiceError::Raised(error) => error.downcast_ref::<E>(),
            _ => None,
        }
    }
}
