//! # Rescue Dispatcher
//!
//! Maps error categories to handlers. When an error escapes the callback chain the
//! registry is scanned in registration order and the first matching handler runs.
//!
//! A category is a Rust error type. [`RescueRegistry::register`] matches when the
//! escaping error, or any error in its `source()` chain, is of that type; an enum
//! error groups all of its variants under one category.
//! [`RescueRegistry::register_any`] matches everything.

use crate::flow::Flow;
use crate::service::Invocation;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type Handler = Arc<dyn Fn(&mut Invocation, &(dyn Error + 'static)) -> Option<Flow> + Send + Sync>;

#[derive(Clone)]
struct Rescue {
    category: &'static str,
    handler: Handler,
}

/// Ordered list of `(category, handler)` pairs.
#[derive(Clone, Default)]
pub struct RescueRegistry {
    rescues: Vec<Rescue>,
}

impl RescueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for errors of type `E`.
    pub fn register<E, F>(&mut self, handler: F)
    where
        E: Error + 'static,
        F: Fn(&mut Invocation, &E) -> Flow + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(move |invocation: &mut Invocation, error: &(dyn Error + 'static)| {
            find_cause::<E>(error).map(|cause| handler(invocation, cause))
        });
        self.rescues.push(Rescue {
            category: std::any::type_name::<E>(),
            handler,
        });
    }

    /// Registers a handler for every error.
    pub fn register_any<F>(&mut self, handler: F)
    where
        F: Fn(&mut Invocation, &(dyn Error + 'static)) -> Flow + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(move |invocation: &mut Invocation, error: &(dyn Error + 'static)| {
            Some(handler(invocation, error))
        });
        self.rescues.push(Rescue {
            category: "any",
            handler,
        });
    }

    pub fn len(&self) -> usize {
        self.rescues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rescues.is_empty()
    }

    /// Category names in registration order.
    pub fn categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rescues.iter().map(|rescue| rescue.category)
    }

    /// Runs the first matching handler, or returns `None` if nothing matched.
    pub fn dispatch(&self, invocation: &mut Invocation, error: &(dyn Error + 'static)) -> Option<Flow> {
        self.rescues.iter().find_map(|rescue| {
            let flow = (rescue.handler)(invocation, error)?;
            debug!(category = rescue.category, %error, "Rescued");
            Some(flow)
        })
    }
}

impl fmt::Debug for RescueRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.categories()).finish()
    }
}

/// Walks the `source()` chain looking for an `E`.
fn find_cause<'a, E: Error + 'static>(error: &'a (dyn Error + 'static)) -> Option<&'a E> {
    let mut current = Some(error);
    while let Some(error) = current {
        if let Some(cause) = error.downcast_ref::<E>() {
            return Some(cause);
        }
        current = error.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{attributes, fail, Service};

    #[derive(Debug, thiserror::Error)]
    #[error("network down")]
    struct NetworkDown;

    #[derive(Debug, thiserror::Error)]
    enum SyncError {
        #[error("sync failed")]
        Transport(#[source] NetworkDown),
        #[error("conflict on {0}")]
        Conflict(String),
    }

    #[test]
    fn finds_causes_through_the_source_chain() {
        let error = SyncError::Transport(NetworkDown);
        assert!(find_cause::<SyncError>(&error).is_some());
        assert!(find_cause::<NetworkDown>(&error).is_some());
        assert!(find_cause::<std::fmt::Error>(&error).is_none());
    }

    #[test]
    fn first_registered_match_wins() {
        let service = Service::builder("Sync")
            .output("handled_by")
            .rescue_from(|svc, _: &NetworkDown| fail!(svc, handled_by: "network"))
            .rescue_from(|svc, _: &SyncError| fail!(svc, handled_by: "sync"))
            .rescue_any(|svc, _| fail!(svc, handled_by: "any"))
            .perform(|_| Err(SyncError::Transport(NetworkDown).into()))
            .build();

        let context = service.call(attributes!()).unwrap();
        assert!(context.failed());
        assert_eq!(context.get_as::<String>("handled_by").unwrap(), "network");
        assert_eq!(service.rescue_count(), 3);
    }

    #[test]
    fn enum_categories_cover_every_variant() {
        let service = Service::builder("Sync")
            .output("error")
            .rescue_from(|svc, error: &SyncError| fail!(svc, error: error.to_string()))
            .perform(|_| Err(SyncError::Conflict("doc-7".into()).into()))
            .build();

        let context = service.call(attributes!()).unwrap();
        assert_eq!(context.get_as::<String>("error").unwrap(), "conflict on doc-7");
    }

    #[test]
    fn unmatched_errors_propagate() {
        let service = Service::builder("Sync")
            .rescue_from(|svc, _: &NetworkDown| fail!(svc))
            .perform(|_| Err(SyncError::Conflict("doc-7".into()).into()))
            .build();

        let err = service.call(attributes!()).unwrap_err();
        assert!(err.downcast_ref::<SyncError>().is_some());
    }

    #[test]
    fn handler_may_complete_normally() {
        let service = Service::builder("Tolerant")
            .output("warning")
            .rescue_from(|svc, error: &NetworkDown| {
                svc.set("warning", error.to_string())?;
                Ok(())
            })
            .perform(|_| Err(NetworkDown.into()))
            .build();

        let context = service.call(attributes!()).unwrap();
        assert!(context.succeeded());
        assert_eq!(context.get_as::<String>("warning").unwrap(), "network down");
    }
}
