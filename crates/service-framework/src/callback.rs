//! # Callback Chain
//!
//! Before, after and around hooks registered on a service, and the composition that
//! runs them around the unit of work.
//!
//! ## Execution order
//!
//! ```text
//! around #1 ─┐
//!   around #2 ─┐
//!     before #1, before #2, ...
//!     unit of work
//!     after #1, after #2, ...
//!   ◄─ around #2 (post)
//! ◄─ around #1 (post)
//! ```
//!
//! Hooks of the same kind run in the order they were registered. Around hooks nest,
//! the first registered being the outermost; each receives a [`Next`] continuation
//! and decides whether to run it. An around hook that never runs its continuation
//! skips everything inside it, including the unit of work; that is allowed and the
//! invocation still completes with whatever the context holds.
//!
//! A hook returning `Err` stops the chain right there. Everything after it is reached
//! through `?`, so a declared failure or a raised error skips all of it.
//!
//! The failed flag is checked as well before every hook and before the unit of work,
//! so a hook that fails the context but drops the signal still ends the chain.

use crate::flow::{Abort, Flow};
use crate::service::Invocation;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A before or after hook.
pub type Hook = Arc<dyn Fn(&mut Invocation) -> Flow + Send + Sync>;

/// An around hook, handed the continuation for the rest of the chain.
pub type AroundHook = Arc<dyn Fn(&mut Invocation, Next<'_>) -> Flow + Send + Sync>;

/// Predicate deciding whether a hook applies to a given invocation.
pub type Condition = Arc<dyn Fn(&Invocation) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Before,
    After,
    Around,
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackKind::Before => f.write_str("before"),
            CallbackKind::After => f.write_str("after"),
            CallbackKind::Around => f.write_str("around"),
        }
    }
}

#[derive(Clone)]
enum Action {
    Plain(Hook),
    Around(AroundHook),
}

/// One registered hook.
#[derive(Clone)]
pub struct Callback {
    kind: CallbackKind,
    action: Action,
    condition: Option<Condition>,
}

impl Callback {
    pub fn before<F>(hook: F) -> Self
    where
        F: Fn(&mut Invocation) -> Flow + Send + Sync + 'static,
    {
        Self {
            kind: CallbackKind::Before,
            action: Action::Plain(Arc::new(hook)),
            condition: None,
        }
    }

    pub fn after<F>(hook: F) -> Self
    where
        F: Fn(&mut Invocation) -> Flow + Send + Sync + 'static,
    {
        Self {
            kind: CallbackKind::After,
            action: Action::Plain(Arc::new(hook)),
            condition: None,
        }
    }

    pub fn around<F>(hook: F) -> Self
    where
        F: Fn(&mut Invocation, Next<'_>) -> Flow + Send + Sync + 'static,
    {
        Self {
            kind: CallbackKind::Around,
            action: Action::Around(Arc::new(hook)),
            condition: None,
        }
    }

    /// Only run this hook when `condition` holds at the time it is reached.
    pub fn when<C>(mut self, condition: C) -> Self
    where
        C: Fn(&Invocation) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    pub fn kind(&self) -> CallbackKind {
        self.kind
    }

    fn applies(&self, invocation: &Invocation) -> bool {
        self.condition
            .as_ref()
            .map_or(true, |condition| condition(invocation))
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("kind", &self.kind)
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

/// The rest of the chain, as seen from inside an around hook.
///
/// Consumed by [`Next::run`], so the continuation runs at most once.
pub struct Next<'a> {
    inner: &'a mut dyn FnMut(&mut Invocation) -> Flow,
}

impl<'a> Next<'a> {
    fn new(inner: &'a mut dyn FnMut(&mut Invocation) -> Flow) -> Self {
        Self { inner }
    }

    /// Runs everything nested inside the current around hook.
    pub fn run(self, invocation: &mut Invocation) -> Flow {
        let Next { inner } = self;
        inner(invocation)
    }
}

/// Ordered registry of hooks for one service.
#[derive(Clone, Default, Debug)]
pub struct CallbackChain {
    callbacks: Vec<Callback>,
}

impl CallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: Callback) {
        self.callbacks.push(callback);
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Callback> {
        self.callbacks.iter()
    }

    /// Runs the chain around `core`.
    pub fn run(&self, invocation: &mut Invocation, core: &dyn Fn(&mut Invocation) -> Flow) -> Flow {
        let arounds: Vec<&Callback> = self.of_kind(CallbackKind::Around).collect();
        self.run_around(&arounds, invocation, core)
    }

    fn run_around(
        &self,
        arounds: &[&Callback],
        invocation: &mut Invocation,
        core: &dyn Fn(&mut Invocation) -> Flow,
    ) -> Flow {
        let Some((callback, rest)) = arounds.split_first() else {
            return self.run_body(invocation, core);
        };
        let Action::Around(hook) = &callback.action else {
            return self.run_around(rest, invocation, core);
        };
        halt_if_failed(invocation)?;
        if !callback.applies(invocation) {
            return self.run_around(rest, invocation, core);
        }

        trace!(kind = %callback.kind, depth = rest.len(), "Entering callback");
        let mut next = |invocation: &mut Invocation| self.run_around(rest, invocation, core);
        hook(invocation, Next::new(&mut next))
    }

    fn run_body(&self, invocation: &mut Invocation, core: &dyn Fn(&mut Invocation) -> Flow) -> Flow {
        self.run_plain(CallbackKind::Before, invocation)?;
        halt_if_failed(invocation)?;
        core(invocation)?;
        self.run_plain(CallbackKind::After, invocation)
    }

    fn run_plain(&self, kind: CallbackKind, invocation: &mut Invocation) -> Flow {
        for callback in self.of_kind(kind) {
            let Action::Plain(hook) = &callback.action else {
                continue;
            };
            halt_if_failed(invocation)?;
            if callback.applies(invocation) {
                trace!(%kind, "Running callback");
                hook(invocation)?;
            }
        }
        Ok(())
    }

    fn of_kind(&self, kind: CallbackKind) -> impl Iterator<Item = &Callback> {
        self.callbacks.iter().filter(move |c| c.kind == kind)
    }
}

fn halt_if_failed(invocation: &Invocation) -> Flow {
    if invocation.context().failed() {
        return Err(Abort::failure());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::CallbackKind;
    use crate::mock::Recorder;
    use crate::{attributes, fail, Callback, Service};

    fn traced(recorder: &Recorder) -> crate::ServiceBuilder {
        let (r1, r2, r3, r4, r5, r6) = (
            recorder.clone(),
            recorder.clone(),
            recorder.clone(),
            recorder.clone(),
            recorder.clone(),
            recorder.clone(),
        );
        Service::builder("Traced")
            .output("error")
            .before(move |_| {
                r1.record("before 1");
                Ok(())
            })
            .around(move |svc, next| {
                r2.record("around 1 in");
                next.run(svc)?;
                r2.record("around 1 out");
                Ok(())
            })
            .after(move |_| {
                r3.record("after 1");
                Ok(())
            })
            .before(move |_| {
                r4.record("before 2");
                Ok(())
            })
            .around(move |svc, next| {
                r5.record("around 2 in");
                next.run(svc)?;
                r5.record("around 2 out");
                Ok(())
            })
            .after(move |_| {
                r6.record("after 2");
                Ok(())
            })
    }

    #[test]
    fn arounds_nest_outermost_first_around_befores_core_afters() {
        let recorder = Recorder::new();
        let core = recorder.clone();
        let service = traced(&recorder)
            .perform(move |_| {
                core.record("call");
                Ok(())
            })
            .build();

        recorder.expect([
            "around 1 in",
            "around 2 in",
            "before 1",
            "before 2",
            "call",
            "after 1",
            "after 2",
            "around 2 out",
            "around 1 out",
        ]);
        assert!(service.call(attributes!()).unwrap().succeeded());
        recorder.verify();
    }

    #[test]
    fn fail_in_core_skips_afters_and_around_tails() {
        let recorder = Recorder::new();
        let core = recorder.clone();
        let service = traced(&recorder)
            .perform(move |svc| {
                core.record("call");
                fail!(svc, error: "nope")
            })
            .build();

        recorder.expect(["around 1 in", "around 2 in", "before 1", "before 2", "call"]);
        let context = service.call(attributes!()).unwrap();
        assert!(context.failed());
        assert_eq!(context.get_as::<String>("error").unwrap(), "nope");
        recorder.verify();
    }

    #[test]
    fn fail_in_before_skips_remaining_befores_and_core() {
        let recorder = Recorder::new();
        let (first, second, core) = (recorder.clone(), recorder.clone(), recorder.clone());
        let service = Service::builder("Guarded")
            .before(move |svc| {
                first.record("guard");
                fail!(svc)
            })
            .before(move |_| {
                second.record("second before");
                Ok(())
            })
            .perform(move |_| {
                core.record("call");
                Ok(())
            })
            .build();

        let context = service.call(attributes!()).unwrap();
        assert!(context.failed());
        assert_eq!(recorder.events(), vec!["guard"]);
    }

    #[test]
    fn around_without_continuation_skips_everything_inside() {
        let recorder = Recorder::new();
        let (outer, inner, core) = (recorder.clone(), recorder.clone(), recorder.clone());
        let service = Service::builder("Blocked")
            .output("note")
            .around(move |svc, _next| {
                outer.record("short circuit");
                svc.set("note", "skipped")?;
                Ok(())
            })
            .before(move |_| {
                inner.record("before");
                Ok(())
            })
            .perform(move |_| {
                core.record("call");
                Ok(())
            })
            .build();

        let context = service.call(attributes!()).unwrap();
        assert!(context.succeeded());
        assert_eq!(context.get_as::<String>("note").unwrap(), "skipped");
        assert_eq!(recorder.events(), vec!["short circuit"]);
    }

    #[test]
    fn conditional_hooks_consult_the_invocation() {
        let recorder = Recorder::new();
        let (audit, trace) = (recorder.clone(), recorder.clone());
        let service = Service::builder("Conditional")
            .input("verbose")
            .before_if(
                |svc| svc.get_as::<bool>("verbose").unwrap_or(false),
                move |_| {
                    audit.record("verbose before");
                    Ok(())
                },
            )
            .around_if(
                |svc| svc.get_as::<bool>("verbose").unwrap_or(false),
                move |svc, next| {
                    trace.record("verbose around");
                    next.run(svc)
                },
            )
            .build();

        service.call(attributes! { verbose: false }).unwrap();
        assert!(recorder.events().is_empty());

        service.call(attributes! { verbose: true }).unwrap();
        assert_eq!(recorder.events(), vec!["verbose around", "verbose before"]);
    }

    #[test]
    fn dropped_failure_signal_still_stops_the_chain() {
        let recorder = Recorder::new();
        let (second, core, after) = (recorder.clone(), recorder.clone(), recorder.clone());
        let service = Service::builder("Forgetful")
            .output("error")
            .before(|svc| {
                let _ = svc.fail(attributes! { error: "x" });
                Ok(())
            })
            .before(move |_| {
                second.record("second before");
                Ok(())
            })
            .after(move |_| {
                after.record("after");
                Ok(())
            })
            .perform(move |_| {
                core.record("call");
                Ok(())
            })
            .build();

        let context = service.call(attributes!()).unwrap();
        assert!(context.failed());
        assert_eq!(context.get_as::<String>("error").unwrap(), "x");
        assert!(recorder.events().is_empty(), "ran after fail: {:?}", recorder.events());
    }

    #[test]
    fn dropped_failure_signal_in_around_skips_the_inner_chain() {
        let recorder = Recorder::new();
        let (inner, core) = (recorder.clone(), recorder.clone());
        let service = Service::builder("ForgetfulAround")
            .around(|svc, next| {
                let _ = svc.fail(attributes!());
                next.run(svc)
            })
            .around(move |svc, next| {
                inner.record("inner around");
                next.run(svc)
            })
            .perform(move |_| {
                core.record("call");
                Ok(())
            })
            .build();

        assert!(service.call(attributes!()).unwrap().failed());
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn conditional_after_hooks_see_the_core_results() {
        let recorder = Recorder::new();
        let audit = recorder.clone();
        let service = Service::builder("Audited")
            .input("amount")
            .output("large")
            .perform(|svc| {
                let amount: u32 = svc.get_as("amount")?;
                svc.set("large", amount > 100)?;
                Ok(())
            })
            .after_if(
                |svc| svc.get_as::<bool>("large").unwrap_or(false),
                move |_| {
                    audit.record("audited");
                    Ok(())
                },
            )
            .build();

        service.call(attributes! { amount: 5 }).unwrap();
        assert!(recorder.events().is_empty());

        service.call(attributes! { amount: 500 }).unwrap();
        assert_eq!(recorder.events(), vec!["audited"]);
    }

    #[test]
    fn chain_keeps_registration_order_per_kind() {
        let recorder = Recorder::new();
        let service = traced(&recorder).build();

        let kinds: Vec<CallbackKind> = service.callbacks().iter().map(Callback::kind).collect();
        assert_eq!(
            kinds,
            vec![
                CallbackKind::Before,
                CallbackKind::Around,
                CallbackKind::After,
                CallbackKind::Before,
                CallbackKind::Around,
                CallbackKind::After,
            ]
        );
        assert_eq!(service.callbacks().len(), 6);
        assert_eq!(CallbackKind::Around.to_string(), "around");
    }
}
