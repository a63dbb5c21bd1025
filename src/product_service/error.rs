//! Error types for the AddProduct service.

use thiserror::Error;

/// Errors that can occur while adding products.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    /// The product data provided is invalid.
    #[error("Product validation error: {0}")]
    ValidationError(String),
}
