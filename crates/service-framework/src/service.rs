//! # Services
//!
//! A [`Service`] is the immutable descriptor of one unit of business logic: its
//! declared inputs and outputs, the context type derived from them, its callback
//! chain, its rescue handlers and the unit of work itself. Descriptors are built once
//! with a [`ServiceBuilder`] and then shared; cloning a `Service` is an `Arc` bump.
//!
//! Each call creates a fresh [`Invocation`] (the service instance) owning a fresh
//! [`Context`], so concurrent calls on the same descriptor never share state.
//!
//! ## Derivation
//!
//! [`Service::derive`] starts a builder for a child service. The child receives copies
//! of the parent's inputs, outputs, unit of work, callbacks and rescue handlers, plus
//! a context type extending the parent's. Whatever the child adds afterwards is its
//! own; the parent never sees it.
//!
//! ```rust
//! use service_framework::{attributes, Service};
//!
//! let doubler = Service::builder("Doubler")
//!     .input(["a", "b"])
//!     .output(["x", "y"])
//!     .perform(|svc| {
//!         let (a, b): (i64, i64) = (svc.get_as("a")?, svc.get_as("b")?);
//!         svc.set("x", 2 * a)?;
//!         svc.set("y", 2 * b)?;
//!         Ok(())
//!     })
//!     .build();
//!
//! let parent = doubler.clone();
//! let tripler = doubler
//!     .derive("SubDoubler")
//!     .input("c")
//!     .output("z")
//!     .perform(move |svc| {
//!         parent.perform_on(svc)?;
//!         let c: i64 = svc.get_as("c")?;
//!         svc.set("z", 2 * c)?;
//!         Ok(())
//!     })
//!     .build();
//!
//! let context = tripler.call(attributes! { a: 1, b: 2, c: 3 }).unwrap();
//! assert_eq!(context.get_as::<i64>("y").unwrap(), 4);
//! assert_eq!(context.get_as::<i64>("z").unwrap(), 6);
//! ```

use crate::callback::{Callback, CallbackChain, Next};
use crate::context::{Attributes, Context};
use crate::error::{ContextError, Failure, ServiceError};
use crate::flow::{Flow, Signal};
use crate::rescue::RescueRegistry;
use crate::schema::{ContextSchema, FieldNames, FieldSet, Schema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The unit of work run inside the callback chain.
pub type Perform = Arc<dyn Fn(&mut Invocation) -> Flow + Send + Sync>;

struct Definition {
    name: String,
    parent: Option<Service>,
    schema: Schema,
    context: Arc<ContextSchema>,
    callbacks: CallbackChain,
    rescues: RescueRegistry,
    perform: Option<Perform>,
}

/// Shared, immutable service descriptor. See the [module docs](self).
#[derive(Clone)]
pub struct Service {
    inner: Arc<Definition>,
}

impl Service {
    /// Starts declaring a new root service.
    pub fn builder(name: impl Into<String>) -> ServiceBuilder {
        ServiceBuilder {
            name: name.into(),
            parent: None,
            schema: Schema::new(),
            callbacks: CallbackChain::new(),
            rescues: RescueRegistry::new(),
            perform: None,
        }
    }

    /// Starts declaring a service derived from this one.
    pub fn derive(&self, name: impl Into<String>) -> ServiceBuilder {
        let parent = &self.inner;
        ServiceBuilder {
            name: name.into(),
            parent: Some(self.clone()),
            schema: Schema::derive(parent.schema.inputs(), parent.schema.outputs(), parent.context.clone()),
            callbacks: parent.callbacks.clone(),
            rescues: parent.rescues.clone(),
            perform: parent.perform.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parent(&self) -> Option<&Service> {
        self.inner.parent.as_ref()
    }

    pub fn inputs(&self) -> &FieldSet {
        self.inner.schema.inputs()
    }

    pub fn outputs(&self) -> &FieldSet {
        self.inner.schema.outputs()
    }

    pub fn context_schema(&self) -> &ContextSchema {
        &self.inner.context
    }

    pub fn callbacks(&self) -> &CallbackChain {
        &self.inner.callbacks
    }

    pub fn callback_count(&self) -> usize {
        self.inner.callbacks.len()
    }

    pub fn rescue_count(&self) -> usize {
        self.inner.rescues.len()
    }

    /// Runs the service and returns its context, failed or not.
    ///
    /// Declared failures come back as a context with `failed() == true`. Only
    /// attributes that do not fit the schema, or errors no rescue handler claims,
    /// produce an `Err`.
    #[tracing::instrument(name = "service", skip_all, fields(service = %self.name()))]
    pub fn call(&self, attributes: Attributes) -> Result<Context, ServiceError> {
        debug!(?attributes, "Call");
        let context = Context::new(self.inner.context.clone(), attributes)?;
        let mut invocation = Invocation::new(self.clone(), context);
        self.run(&mut invocation)?;

        let context = invocation.into_context();
        info!(success = context.succeeded(), "Completed");
        Ok(context)
    }

    /// Like [`Service::call`], but a failed context is returned as
    /// [`ServiceError::Failed`].
    pub fn call_strict(&self, attributes: Attributes) -> Result<Context, ServiceError> {
        let context = self.call(attributes)?;
        if context.failed() {
            return Err(Failure::new(context).into());
        }
        Ok(context)
    }

    /// Runs only the unit of work, without callbacks or rescue handling.
    ///
    /// A derived service uses this to build on its parent's unit of work.
    pub fn perform_on(&self, invocation: &mut Invocation) -> Flow {
        match &self.inner.perform {
            Some(perform) => perform(invocation),
            None => Ok(()),
        }
    }

    /// The execution boundary: the only place a declared failure is caught.
    fn run(&self, invocation: &mut Invocation) -> Result<(), ServiceError> {
        let flow = self
            .inner
            .callbacks
            .run(invocation, &|invocation| self.perform_on(invocation));
        let Err(abort) = flow else {
            return Ok(());
        };

        let error = match abort.into_signal() {
            Signal::Failure => {
                debug!("Failed");
                return Ok(());
            }
            Signal::Raised(error) => error,
        };

        match self.inner.rescues.dispatch(invocation, &*error) {
            None => {
                warn!(%error, "Unrescued error");
                Err(ServiceError::Raised(error))
            }
            Some(Ok(())) => Ok(()),
            Some(Err(abort)) => match abort.into_signal() {
                Signal::Failure => Ok(()),
                Signal::Raised(replacement) => {
                    warn!(error = %replacement, "Rescue handler raised");
                    Err(ServiceError::Raised(replacement))
                }
            },
        }
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.inner.name)
            .field("parent", &self.parent().map(Service::name))
            .field("inputs", self.inputs())
            .field("outputs", self.outputs())
            .field("callbacks", &self.inner.callbacks)
            .field("rescues", &self.inner.rescues)
            .finish()
    }
}

/// Declaration DSL for a [`Service`].
///
/// Hooks and rescue handlers are appended in call order; `perform` replaces any
/// unit of work inherited from a parent.
#[must_use = "a ServiceBuilder does nothing until `build` is called"]
pub struct ServiceBuilder {
    name: String,
    parent: Option<Service>,
    schema: Schema,
    callbacks: CallbackChain,
    rescues: RescueRegistry,
    perform: Option<Perform>,
}

impl ServiceBuilder {
    /// Declares input fields. Declaring a name twice has no further effect.
    pub fn input(mut self, names: impl FieldNames) -> Self {
        self.schema.declare_input(names);
        self
    }

    /// Declares output fields. Declaring a name twice has no further effect.
    pub fn output(mut self, names: impl FieldNames) -> Self {
        self.schema.declare_output(names);
        self
    }

    pub fn before<F>(self, hook: F) -> Self
    where
        F: Fn(&mut Invocation) -> Flow + Send + Sync + 'static,
    {
        self.callback(Callback::before(hook))
    }

    pub fn before_if<C, F>(self, condition: C, hook: F) -> Self
    where
        C: Fn(&Invocation) -> bool + Send + Sync + 'static,
        F: Fn(&mut Invocation) -> Flow + Send + Sync + 'static,
    {
        self.callback(Callback::before(hook).when(condition))
    }

    pub fn after<F>(self, hook: F) -> Self
    where
        F: Fn(&mut Invocation) -> Flow + Send + Sync + 'static,
    {
        self.callback(Callback::after(hook))
    }

    pub fn after_if<C, F>(self, condition: C, hook: F) -> Self
    where
        C: Fn(&Invocation) -> bool + Send + Sync + 'static,
        F: Fn(&mut Invocation) -> Flow + Send + Sync + 'static,
    {
        self.callback(Callback::after(hook).when(condition))
    }

    pub fn around<F>(self, hook: F) -> Self
    where
        F: Fn(&mut Invocation, Next<'_>) -> Flow + Send + Sync + 'static,
    {
        self.callback(Callback::around(hook))
    }

    pub fn around_if<C, F>(self, condition: C, hook: F) -> Self
    where
        C: Fn(&Invocation) -> bool + Send + Sync + 'static,
        F: Fn(&mut Invocation, Next<'_>) -> Flow + Send + Sync + 'static,
    {
        self.callback(Callback::around(hook).when(condition))
    }

    /// Appends a prepared [`Callback`].
    pub fn callback(mut self, callback: Callback) -> Self {
        self.callbacks.push(callback);
        self
    }

    /// Handles errors of type `E` (found anywhere in the `source()` chain).
    pub fn rescue_from<E, F>(mut self, handler: F) -> Self
    where
        E: Error + 'static,
        F: Fn(&mut Invocation, &E) -> Flow + Send + Sync + 'static,
    {
        self.rescues.register::<E, F>(handler);
        self
    }

    /// Handles any error not claimed by an earlier handler.
    pub fn rescue_any<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Invocation, &(dyn Error + 'static)) -> Flow + Send + Sync + 'static,
    {
        self.rescues.register_any(handler);
        self
    }

    /// Sets the unit of work.
    pub fn perform<F>(mut self, perform: F) -> Self
    where
        F: Fn(&mut Invocation) -> Flow + Send + Sync + 'static,
    {
        self.perform = Some(Arc::new(perform));
        self
    }

    pub fn build(self) -> Service {
        let context = self.schema.context_schema(&self.name);
        debug!(
            service = %self.name,
            parent = self.parent.as_ref().map(Service::name),
            fields = context.fields().len(),
            "Service defined"
        );
        Service {
            inner: Arc::new(Definition {
                name: self.name,
                parent: self.parent,
                schema: self.schema,
                context,
                callbacks: self.callbacks,
                rescues: self.rescues,
                perform: self.perform,
            }),
        }
    }
}

/// A running service instance: the per-call context plus the descriptor it runs.
///
/// Field access is delegated to the context.
pub struct Invocation {
    service: Service,
    context: Context,
}

impl Invocation {
    fn new(service: Service, context: Context) -> Self {
        Self { service, context }
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn get(&self, field: &str) -> Result<&Value, ContextError> {
        self.context.get(field)
    }

    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Result<T, ContextError> {
        self.context.get_as(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Result<&mut Value, ContextError> {
        self.context.get_mut(field)
    }

    pub fn set<T: Serialize>(&mut self, field: &str, value: T) -> Result<(), ContextError> {
        self.context.set(field, value)
    }

    /// Fails the invocation. Return the result from the hook to unwind the chain:
    ///
    /// ```rust,ignore
    /// return Err(svc.fail(attributes! { error: "out of stock" }));
    /// ```
    ///
    /// or use [`fail!`](crate::fail).
    pub fn fail(&mut self, attributes: Attributes) -> crate::Abort {
        self.context.fail(attributes)
    }

    pub fn into_context(self) -> Context {
        self.context
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("service", &self.service.name())
            .field("context", &self.context)
            .finish()
    }
}
