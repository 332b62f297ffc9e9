//! Field types: coercion of raw strings into typed values.
//!
//! Each supported type implements [`FieldType`]. The registry only talks to
//! this trait, so new types can be added without touching the engine:
//!
//! ```
//! use propbind::types::FieldType;
//! use propbind::Rejection;
//!
//! struct Port;
//!
//! impl FieldType for Port {
//!     type Value = u16;
//!
//!     fn type_name(&self) -> &'static str {
//!         "port"
//!     }
//!
//!     fn parse(&self, raw: &str) -> Result<u16, Rejection> {
//!         raw.parse().map_err(|e| {
//!             Rejection::new(format!("must be a port number, but was '{}'", raw)).caused_by(e)
//!         })
//!     }
//!
//!     fn render(&self, value: &u16) -> String {
//!         value.to_string()
//!     }
//! }
//! ```

use std::fmt;

use crate::error::Rejection;

mod charset;
mod day;
mod digest;
mod duration;
mod enumeration;
mod path;
mod primitive;
mod service;
mod zone;

pub use charset::{Charset, CharsetType};
pub use day::{Day, DayType};
pub use digest::{DigestAlgorithm, DigestType};
pub use duration::{format_duration, parse_duration, DurationType};
pub use enumeration::{EnumField, EnumType};
pub use path::PathType;
pub use primitive::{BoolType, CharSet, CharSetString, IntType, StringType};
pub use service::{ServiceFactory, ServiceRegistry, ServiceType};
pub use zone::{TimeZone, TimeZoneType};

/// Coercion of raw strings into one typed value.
///
/// `parse` turns a raw string into a value; `check` enforces bounds on a
/// value regardless of where it came from (raw string or declared default).
/// `render` must produce a string that `parse` maps back to an equal value.
pub trait FieldType: Send + Sync {
    /// The resolved value type.
    type Value: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Short name used in reports, e.g. `integer`.
    fn type_name(&self) -> &'static str;

    /// Coerce a raw string.
    fn parse(&self, raw: &str) -> Result<Self::Value, Rejection>;

    /// Check bounds on a value.
    fn check(&self, _value: &Self::Value) -> Result<(), Rejection> {
        Ok(())
    }

    /// Render a value in raw form.
    fn render(&self, value: &Self::Value) -> String;
}

impl<T: FieldType + ?Sized> FieldType for &T {
    type Value = T::Value;

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn parse(&self, raw: &str) -> Result<Self::Value, Rejection> {
        (**self).parse(raw)
    }

    fn check(&self, value: &Self::Value) -> Result<(), Rejection> {
        (**self).check(value)
    }

    fn render(&self, value: &Self::Value) -> String {
        (**self).render(value)
    }
}
