//! # Typed Field Accessors
//!
//! Contexts store values dynamically, but service code usually wants named, typed
//! accessors. [`context_fields!`](crate::context_fields) generates them as a trait
//! that is implemented for everything with [`FieldAccess`], i.e. both [`Context`]
//! and the [`Invocation`] that delegates to it.
//!
//! A derived service lists its parent's accessor trait as a supertrait, so the
//! accessors accumulate down the derivation chain exactly like the fields do:
//!
//! ```rust
//! use service_framework::{attributes, context_fields, Service};
//!
//! context_fields! {
//!     pub trait DoublerFields {
//!         a: i64,
//!         x: Option<i64>,
//!     }
//! }
//!
//! context_fields! {
//!     pub trait SubDoublerFields: DoublerFields {
//!         c: i64,
//!         z: Option<i64>,
//!     }
//! }
//!
//! let doubler = Service::builder("Doubler")
//!     .input("a")
//!     .output("x")
//!     .perform(|svc| {
//!         let a = svc.a()?;
//!         svc.set_x(Some(2 * a))?;
//!         Ok(())
//!     })
//!     .build();
//!
//! let sub = doubler
//!     .derive("SubDoubler")
//!     .input("c")
//!     .output("z")
//!     .after(|svc| {
//!         let c = svc.c()?;
//!         svc.set_z(Some(2 * c))?;
//!         Ok(())
//!     })
//!     .build();
//!
//! let context = sub.call(attributes! { a: 1, c: 3 }).unwrap();
//! assert_eq!(context.a().unwrap(), 1);
//! assert_eq!(context.x().unwrap(), Some(2));
//! assert_eq!(context.z().unwrap(), Some(6));
//! ```

use crate::context::Context;
use crate::error::ContextError;
use crate::service::Invocation;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Typed read/write access by field name.
pub trait FieldAccess {
    fn read<T: DeserializeOwned>(&self, field: &str) -> Result<T, ContextError>;

    fn write<T: Serialize>(&mut self, field: &str, value: T) -> Result<(), ContextError>;
}

impl FieldAccess for Context {
    fn read<T: DeserializeOwned>(&self, field: &str) -> Result<T, ContextError> {
        self.get_as(field)
    }

    fn write<T: Serialize>(&mut self, field: &str, value: T) -> Result<(), ContextError> {
        self.set(field, value)
    }
}

impl FieldAccess for Invocation {
    fn read<T: DeserializeOwned>(&self, field: &str) -> Result<T, ContextError> {
        self.get_as(field)
    }

    fn write<T: Serialize>(&mut self, field: &str, value: T) -> Result<(), ContextError> {
        self.set(field, value)
    }
}

/// Generates a trait of typed accessors (`field()` and `set_field()`) for context
/// fields. See the [module docs](crate::fields).
#[macro_export]
macro_rules! context_fields {
    (
        $(#[$meta:meta])*
        $vis:vis trait $name:ident $(: $($parent:path),+)? {
            $( $(#[$field_meta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $crate::__private::paste! {
            $(#[$meta])*
            $vis trait $name: $crate::FieldAccess $($(+ $parent)+)? {
                $(
                    $(#[$field_meta])*
                    fn $field(&self) -> ::core::result::Result<$ty, $crate::ContextError> {
                        $crate::FieldAccess::read(self, stringify!($field))
                    }

                    fn [<set_ $field>](
                        &mut self,
                        value: $ty,
                    ) -> ::core::result::Result<(), $crate::ContextError> {
                        $crate::FieldAccess::write(self, stringify!($field), value)
                    }
                )*
            }

            impl<T: $crate::FieldAccess $($(+ $parent)+)?> $name for T {}
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::schema::Schema;
    use crate::{attributes, Context, ContextError};

    context_fields! {
        trait Profile {
            name: String,
            age: u32,
        }
    }

    context_fields! {
        trait Membership: Profile {
            tier: Option<String>,
        }
    }

    #[test]
    fn generated_accessors_read_and_write() {
        let mut schema = Schema::new();
        schema.declare_input(["name", "age", "tier"]);
        let mut context = Context::new(schema.context_schema("Member"), attributes! { name: "Ada", age: 36 }).unwrap();

        assert_eq!(context.name().unwrap(), "Ada");
        assert_eq!(context.tier().unwrap(), None);
        context.set_tier(Some("gold".into())).unwrap();
        context.set_age(37).unwrap();

        assert_eq!(context.tier().unwrap().as_deref(), Some("gold"));
        assert_eq!(context.age().unwrap(), 37);
    }

    #[test]
    fn undeclared_accessor_reports_unknown_field() {
        let mut schema = Schema::new();
        schema.declare_input("name");
        let context = Context::new(schema.context_schema("Anonymous"), attributes!()).unwrap();

        assert!(matches!(context.age(), Err(ContextError::UnknownField { .. })));
        assert!(matches!(context.name(), Err(ContextError::Type { .. })));
    }
}
