//! # Context
//!
//! The mutable result object threaded through a single invocation.
//!
//! A context is created once per call from the caller's [`Attributes`], mutated by the
//! service and its hooks, and handed back to the caller. It knows its
//! [`ContextSchema`], so every read and write is checked against the fields the
//! service (or one of its ancestors) declared.
//!
//! Values are stored as `serde_json::Value`. Use [`Context::get_as`] and
//! [`Context::set`] for typed access, or the accessors generated by
//! [`context_fields!`](crate::context_fields).
//!
//! ## Failure
//!
//! The `failed` flag starts out `false` and never goes back. After [`Context::fail`]
//! the context refuses further normal-path writes, so code that assumes success cannot
//! quietly keep mutating a failed result.

use crate::error::ContextError;
use crate::flow::Abort;
use crate::schema::ContextSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Field name to value map used to construct, fail and extract contexts.
pub type Attributes = serde_json::Map<String, Value>;

const SUCCESS: &str = "success";
const FAILURE: &str = "failure";

static NULL: Value = Value::Null;

/// Per-invocation result object. See the [module docs](self).
#[derive(Clone)]
pub struct Context {
    schema: Arc<ContextSchema>,
    values: BTreeMap<String, Value>,
    failed: bool,
}

impl Context {
    /// Builds a context, assigning every attribute. Unknown keys are rejected.
    pub fn new(schema: Arc<ContextSchema>, attributes: Attributes) -> Result<Self, ContextError> {
        let mut context = Self {
            schema,
            values: BTreeMap::new(),
            failed: false,
        };
        context.assign(attributes)?;
        Ok(context)
    }

    pub fn schema(&self) -> &ContextSchema {
        &self.schema
    }

    pub fn succeeded(&self) -> bool {
        !self.failed
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Reads a field. Declared fields that were never assigned read as `null`.
    pub fn get(&self, field: &str) -> Result<&Value, ContextError> {
        self.check(field)?;
        Ok(self.values.get(field).unwrap_or(&NULL))
    }

    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Result<T, ContextError> {
        let value = self.get(field)?;
        T::deserialize(value).map_err(|e| ContextError::Type {
            field: field.to_owned(),
            message: e.to_string(),
        })
    }

    /// Mutable access to a field's value, inserting `null` if it was never assigned.
    pub fn get_mut(&mut self, field: &str) -> Result<&mut Value, ContextError> {
        self.check_writable(field)?;
        Ok(self.values.entry(field.to_owned()).or_insert(Value::Null))
    }

    pub fn set<T: Serialize>(&mut self, field: &str, value: T) -> Result<(), ContextError> {
        self.check_writable(field)?;
        let value = serde_json::to_value(value).map_err(|e| ContextError::Type {
            field: field.to_owned(),
            message: e.to_string(),
        })?;
        self.values.insert(field.to_owned(), value);
        Ok(())
    }

    /// Assigns the attributes, marks the context failed and returns the signal that
    /// unwinds the callback chain.
    ///
    /// If an attribute names an unknown field nothing is assigned, the context stays
    /// as it was, and the returned signal carries the [`ContextError`] instead.
    pub fn fail(&mut self, attributes: Attributes) -> Abort {
        if let Err(error) = self.assign(attributes) {
            return Abort::raise(error);
        }
        self.failed = true;
        Abort::failure()
    }

    /// The requested fields plus the synthetic `success` and `failure` flags.
    pub fn extract<I, S>(&self, fields: I) -> Result<Attributes, ContextError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extracted = Attributes::new();
        for field in fields {
            let field = field.as_ref();
            if field == SUCCESS || field == FAILURE {
                continue;
            }
            extracted.insert(field.to_owned(), self.get(field)?.clone());
        }
        extracted.insert(SUCCESS.to_owned(), Value::Bool(self.succeeded()));
        extracted.insert(FAILURE.to_owned(), Value::Bool(self.failed()));
        Ok(extracted)
    }

    /// Every declared field, ancestors first, plus `success` and `failure`.
    pub fn to_attributes(&self) -> Attributes {
        let mut attributes = Attributes::new();
        for field in self.schema.fields() {
            let value = self.values.get(field).unwrap_or(&NULL);
            attributes.insert(field.to_owned(), value.clone());
        }
        attributes.insert(SUCCESS.to_owned(), Value::Bool(self.succeeded()));
        attributes.insert(FAILURE.to_owned(), Value::Bool(self.failed()));
        attributes
    }

    /// Destructures the context into a caller-defined struct.
    ///
    /// ```rust
    /// use service_framework::{attributes, Service};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Outcome {
    ///     user_name: String,
    ///     success: bool,
    /// }
    ///
    /// let service = Service::builder("FindUser")
    ///     .output("user_name")
    ///     .perform(|svc| {
    ///         svc.set("user_name", "John Doe")?;
    ///         Ok(())
    ///     })
    ///     .build();
    ///
    /// let Outcome { user_name, success } = service.call(attributes!()).unwrap().deserialize().unwrap();
    /// assert_eq!(user_name, "John Doe");
    /// assert!(success);
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ContextError> {
        let attributes = Value::Object(self.to_attributes());
        T::deserialize(attributes).map_err(|e| ContextError::Type {
            field: self.schema.name().to_owned(),
            message: e.to_string(),
        })
    }

    fn assign(&mut self, attributes: Attributes) -> Result<(), ContextError> {
        if let Some(field) = attributes.keys().find(|f| !self.schema.declares(f)) {
            return Err(self.unknown(field));
        }
        self.values.extend(attributes);
        Ok(())
    }

    fn check(&self, field: &str) -> Result<(), ContextError> {
        if self.schema.declares(field) {
            Ok(())
        } else {
            Err(self.unknown(field))
        }
    }

    fn check_writable(&self, field: &str) -> Result<(), ContextError> {
        self.check(field)?;
        if self.failed {
            return Err(ContextError::Failed {
                field: field.to_owned(),
            });
        }
        Ok(())
    }

    fn unknown(&self, field: &str) -> ContextError {
        ContextError::UnknownField {
            schema: self.schema.name().to_owned(),
            field: field.to_owned(),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.failed { FAILURE } else { SUCCESS };
        write!(f, "#<{} {}", self.schema.name(), state)?;
        for field in self.schema.fields() {
            let value = self.values.get(field).unwrap_or(&NULL);
            write!(f, " {field}={value}")?;
        }
        f.write_str(">")
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("schema", &self.schema.name())
            .field("failed", &self.failed)
            .field("values", &self.values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes;
    use crate::schema::Schema;
    use serde_json::json;

    fn schema() -> Arc<ContextSchema> {
        let mut schema = Schema::new();
        schema.declare_input(["a", "b"]);
        schema.declare_output("error");
        schema.context_schema("Sample")
    }

    #[test]
    fn starts_successful_with_assigned_attributes() {
        let context = Context::new(schema(), attributes! { a: 1, b: "two" }).unwrap();
        assert!(context.succeeded());
        assert!(!context.failed());
        assert_eq!(context.get("a").unwrap(), &json!(1));
        assert_eq!(context.get_as::<String>("b").unwrap(), "two");
        assert_eq!(context.get("error").unwrap(), &Value::Null);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = Context::new(schema(), attributes! { nope: 1 }).unwrap_err();
        assert_eq!(
            err,
            ContextError::UnknownField {
                schema: "Sample::Context".into(),
                field: "nope".into(),
            }
        );

        let context = Context::new(schema(), attributes!()).unwrap();
        assert!(matches!(context.get("nope"), Err(ContextError::UnknownField { .. })));
    }

    #[test]
    fn reports_type_mismatches() {
        let context = Context::new(schema(), attributes! { a: "not a number" }).unwrap();
        let err = context.get_as::<i64>("a").unwrap_err();
        assert!(matches!(err, ContextError::Type { ref field, .. } if field == "a"));
    }

    #[test]
    fn fail_assigns_marks_and_seals() {
        let mut context = Context::new(schema(), attributes! { a: 1 }).unwrap();
        let abort = context.fail(attributes! { error: "x" });
        assert!(abort.is_failure());
        assert!(context.failed());
        assert!(!context.succeeded());
        assert_eq!(context.get_as::<String>("error").unwrap(), "x");

        assert_eq!(
            context.set("a", 2),
            Err(ContextError::Failed { field: "a".into() })
        );
        assert!(context.get_mut("b").is_err());
        assert_eq!(context.get("a").unwrap(), &json!(1));
    }

    #[test]
    fn fail_with_unknown_field_raises_instead() {
        let mut context = Context::new(schema(), attributes!()).unwrap();
        let abort = context.fail(attributes! { bogus: true });
        assert!(!abort.is_failure());
        assert!(context.succeeded());
    }

    #[test]
    fn extract_adds_success_and_failure() {
        let mut context = Context::new(schema(), attributes! { a: 1 }).unwrap();
        let _ = context.fail(attributes! { error: "x" });

        let extracted = context.extract(["error", "failure"]).unwrap();
        assert_eq!(extracted["error"], json!("x"));
        assert_eq!(extracted["success"], json!(false));
        assert_eq!(extracted["failure"], json!(true));
        assert!(!extracted.contains_key("a"));
    }

    #[test]
    fn display_lists_fields_and_state() {
        let mut context = Context::new(schema(), attributes! { a: 1, b: 2 }).unwrap();
        assert_eq!(
            context.to_string(),
            "#<Sample::Context success a=1 b=2 error=null>"
        );
        let _ = context.fail(attributes! { error: "x" });
        assert_eq!(
            context.to_string(),
            "#<Sample::Context failure a=1 b=2 error=\"x\">"
        );
    }
}
