//! # Control Flow Signals
//!
//! Every hook, rescue handler and unit of work returns a [`Flow`]. The error half,
//! [`Abort`], is how execution leaves the callback chain early:
//!
//! - **Declared failure** - produced only by `fail`, after the context has been
//!   marked failed. It unwinds the whole chain in one step: remaining before hooks,
//!   the unit of work, after hooks and the tail of every enclosing around hook are
//!   all skipped, because each of them is reached through `?`.
//! - **Raised error** - any `std::error::Error` converted by `?`, or built with
//!   [`Abort::raise`]. These are offered to the rescue handlers.
//!
//! The engine catches the signal exactly once, at the invocation boundary.

use crate::error::BoxError;
use std::fmt;

/// Result type returned by hooks and units of work.
pub type Flow = Result<(), Abort>;

/// Non-local exit out of a service's callback chain.
#[must_use = "an Abort only unwinds the chain when it is returned"]
pub struct Abort(Signal);

pub(crate) enum Signal {
    Failure,
    Raised(BoxError),
}

impl Abort {
    /// Built by `Context::fail` once the failed flag is set.
    pub(crate) fn failure() -> Self {
        Self(Signal::Failure)
    }

    /// Raises an error out of the chain, to be matched against the rescue handlers.
    pub fn raise<E: Into<BoxError>>(error: E) -> Self {
        Self(Signal::Raised(error.into()))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.0, Signal::Failure)
    }

    /// The raised error, if this is not a declared failure.
    pub fn error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match &self.0 {
            Signal::Failure => None,
            Signal::Raised(error) => Some(&**error),
        }
    }

    pub(crate) fn into_signal(self) -> Signal {
        self.0
    }
}

impl<E> From<E> for Abort
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::raise(error)
    }
}

impl fmt::Debug for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Signal::Failure => f.write_str("Abort::Failure"),
            Signal::Raised(error) => f.debug_tuple("Abort::Raised").field(error).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk full")]
    struct DiskFull;

    fn write_file() -> Flow {
        let written: Result<(), DiskFull> = Err(DiskFull);
        written?;
        Ok(())
    }

    #[test]
    fn question_mark_raises_errors() {
        let abort = write_file().unwrap_err();
        assert!(!abort.is_failure());
        let error = abort.error().expect("raised error");
        assert!(error.downcast_ref::<DiskFull>().is_some());
        assert_eq!(error.to_string(), "disk full");
    }

    #[test]
    fn raise_accepts_plain_messages() {
        let abort = Abort::raise("boom");
        assert_eq!(abort.error().map(|e| e.to_string()), Some("boom".to_string()));
        assert_eq!(format!("{:?}", Abort::failure()), "Abort::Failure");
    }
}
