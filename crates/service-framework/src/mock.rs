//! # Recorder & Testing Guide
//!
//! Hooks are plain closures, so the easiest way to test a callback chain is to let
//! every hook write into a shared log and assert on the log afterwards.
//! [`Recorder`] is that log: cheap to clone into closures, thread-safe, and with a
//! fluent `expect` / `verify` pair.
//!
//! ## Testing Strategies
//!
//! | Strategy | What it covers |
//! |----------|----------------|
//! | **Recorder in hooks** | Hook order, short-circuiting, conditional hooks |
//! | **Context assertions** | Outputs, failure flags and failure attributes |
//! | **`call_strict` + `ServiceError`** | Error surfaces seen by callers |
//!
//! ```rust
//! use service_framework::mock::Recorder;
//! use service_framework::{attributes, Service};
//!
//! let recorder = Recorder::new();
//! let (before, core) = (recorder.clone(), recorder.clone());
//! let service = Service::builder("Audited")
//!     .before(move |_| {
//!         before.record("before");
//!         Ok(())
//!     })
//!     .perform(move |_| {
//!         core.record("call");
//!         Ok(())
//!     })
//!     .build();
//!
//! recorder.expect(["before", "call"]);
//! service.call(attributes!()).unwrap();
//! recorder.verify();
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Log {
    events: Vec<String>,
    expected: Option<Vec<String>>,
}

/// Shared, ordered event log for asserting on hook execution.
#[derive(Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Log>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.lock().events.push(event.into());
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<String> {
        self.lock().events.clone()
    }

    pub fn clear(&self) {
        self.lock().events.clear();
    }

    /// Sets the exact sequence [`Recorder::verify`] will check against.
    pub fn expect<I, S>(&self, events: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().expected = Some(events.into_iter().map(Into::into).collect());
    }

    /// Panics unless the recorded events match the expectation exactly.
    pub fn verify(&self) {
        let log = self.lock();
        match &log.expected {
            Some(expected) => assert_eq!(
                &log.events, expected,
                "recorded events did not match expectation"
            ),
            None => panic!("Recorder::verify called without an expectation"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.lock().events.iter()).finish()
    }
}
