//! # Schema & Inheritance
//!
//! Tracks the input and output names a service declares and derives the context
//! type that carries them.
//!
//! ## Accumulation across derivation
//!
//! Each service owns a [`Schema`]. Deriving a service clones the parent's input and
//! output sets, so anything the child adds stays with the child. The context type is
//! a chain of [`ContextSchema`] nodes: the child's node points at the parent's node
//! and only lists the fields the parent did not already have. A lookup walks the
//! chain, which means a deeply derived context can read and write every field any
//! ancestor declared while siblings never see each other's fields.

use std::sync::Arc;

/// An insertion-ordered set of field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet(Vec<String>);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name, returning `false` if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    pub fn merge(&mut self, other: &FieldSet) {
        for name in other.iter() {
            self.insert(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Anything that can name one or more fields in a declaration.
///
/// Lets `input("c")` and `input(["a", "b"])` read the same way.
pub trait FieldNames {
    fn field_names(self) -> Vec<String>;
}

impl FieldNames for &str {
    fn field_names(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}

impl FieldNames for String {
    fn field_names(self) -> Vec<String> {
        vec![self]
    }
}

impl<S: Into<String>, const N: usize> FieldNames for [S; N] {
    fn field_names(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String>> FieldNames for Vec<S> {
    fn field_names(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

/// The context type derived for one service definition.
#[derive(Debug)]
pub struct ContextSchema {
    name: String,
    parent: Option<Arc<ContextSchema>>,
    own: FieldSet,
}

impl ContextSchema {
    /// Display name, e.g. `PlaceOrder::Context`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&ContextSchema> {
        self.parent.as_deref()
    }

    /// Fields introduced at this level of the chain.
    pub fn own_fields(&self) -> &FieldSet {
        &self.own
    }

    pub fn declares(&self, field: &str) -> bool {
        self.own.contains(field) || self.parent.as_ref().is_some_and(|p| p.declares(field))
    }

    /// Every field reachable from this context type, ancestors first.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = self.parent.as_ref().map(|p| p.fields()).unwrap_or_default();
        fields.extend(self.own.iter());
        fields
    }

    /// Whether `ancestor` appears anywhere up this chain (including `self`).
    pub fn extends(&self, ancestor: &ContextSchema) -> bool {
        std::ptr::eq(self, ancestor) || self.parent.as_ref().is_some_and(|p| p.extends(ancestor))
    }
}

/// Declaration-time view of a service's inputs and outputs.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    inputs: FieldSet,
    outputs: FieldSet,
    parent: Option<Arc<ContextSchema>>,
    own: FieldSet,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a child schema seeded with copies of the parent's sets.
    pub fn derive(inputs: &FieldSet, outputs: &FieldSet, context: Arc<ContextSchema>) -> Self {
        Self {
            inputs: inputs.clone(),
            outputs: outputs.clone(),
            parent: Some(context),
            own: FieldSet::new(),
        }
    }

    pub fn declare_input(&mut self, names: impl FieldNames) {
        for name in names.field_names() {
            self.register(&name);
            self.inputs.insert(name);
        }
    }

    pub fn declare_output(&mut self, names: impl FieldNames) {
        for name in names.field_names() {
            self.register(&name);
            self.outputs.insert(name);
        }
    }

    pub fn inputs(&self) -> &FieldSet {
        &self.inputs
    }

    pub fn outputs(&self) -> &FieldSet {
        &self.outputs
    }

    fn register(&mut self, name: &str) {
        let inherited = self.parent.as_ref().is_some_and(|p| p.declares(name));
        if !inherited {
            self.own.insert(name);
        }
    }

    /// Freezes the declared fields into a context type.
    pub fn context_schema(&self, service: &str) -> Arc<ContextSchema> {
        Arc::new(ContextSchema {
            name: format!("{service}::Context"),
            parent: self.parent.clone(),
            own: self.own.clone(),
        })
    }
}
