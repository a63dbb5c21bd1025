//! # CreateUser
//!
//! Registers a user. The email is normalized before the unit of work runs, and
//! [`UserError`]s are turned into a failed context with an `error` message.

mod error;

pub use error::UserError;

use crate::lifecycle::Store;
use crate::model::UserId;
use service_framework::{context_fields, fail, Flow, Invocation, Service};
use std::sync::Arc;
use tracing::debug;

context_fields! {
    pub trait CreateUserFields {
        name: String,
        email: String,
        user_id: Option<UserId>,
        error: Option<String>,
    }
}

/// Builds the `CreateUser` service on top of `store`.
pub fn new(store: Arc<Store>) -> Service {
    Service::builder("CreateUser")
        .input(["name", "email"])
        .output(["user_id", "error"])
        .before(normalize_email)
        .rescue_from(|svc, error: &UserError| fail!(svc, error: error.to_string()))
        .perform(move |svc| {
            let (name, email) = (svc.name()?, svc.email()?);
            validate(&name, &email)?;

            let user = store.insert_user(name.trim(), &email)?;
            debug!(user_id = %user.id, "User created");
            svc.set_user_id(Some(user.id))?;
            Ok(())
        })
        .build()
}

fn normalize_email(svc: &mut Invocation) -> Flow {
    let email = svc.email()?;
    svc.set_email(email.trim().to_lowercase())?;
    Ok(())
}

fn validate(name: &str, email: &str) -> Result<(), UserError> {
    if name.trim().is_empty() {
        return Err(UserError::ValidationError("name must not be empty".into()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(UserError::ValidationError(format!("invalid email: {email}"))),
    }
}
