//! Error types for the CreateUser service.

use thiserror::Error;

/// Errors that can occur while registering users.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    /// A user with the same email already exists.
    #[error("User already exists: {0}")]
    AlreadyExists(String),

    /// The user data provided is invalid.
    #[error("User validation error: {0}")]
    ValidationError(String),
}
