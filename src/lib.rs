//! Propbind: declarative binding of raw key/value sources to typed configuration.
//!
//! A configuration type describes its fields once, in [`Properties::describe`],
//! by registering typed fields with a [`Registry`]. Loading a source runs the
//! description, coerces every raw string, applies defaults and bounds, and
//! records what was bound so the result can be inspected, rendered and
//! checked afterwards.
//!
//! # Core Concepts
//!
//! - **Typed fields**: integers, strings, durations, days, enums, time zones,
//!   charsets, paths, digest algorithms and named services
//! - **Key ownership**: every key belongs to exactly one field; collisions
//!   are programming errors reported at load time
//! - **Nesting**: a sub-configuration is bound under a key prefix and can be
//!   switched off by a boolean gate
//! - **Lists**: `key.count` plus `key.0`, `key.1`, ... with defaults
//! - **Probes**: named diagnostic callbacks declared next to the fields
//! - **Checks**: orphaned keys and equality between two instances, with
//!   error accumulation through stillwater's [`Validation`]
//! - **Reload**: an [`Instance`] swaps in a rebuilt configuration atomically
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use propbind::prelude::*;
//!
//! struct Server {
//!     host: String,
//!     port: i32,
//!     timeout: Duration,
//! }
//!
//! impl Properties for Server {
//!     fn describe(fields: &mut Registry<'_>) -> Result<Self> {
//!         Ok(Self {
//!             host: fields.string("host", Some("localhost"))?,
//!             port: fields.int("port", Some(8080), 1)?,
//!             timeout: fields.duration(
//!                 "timeout",
//!                 Some(Duration::from_secs(30)),
//!                 Duration::from_secs(1),
//!                 Duration::from_secs(3600),
//!             )?,
//!         })
//!     }
//! }
//!
//! let config = Config::<Server>::builder()
//!     .source(MapSource::new("defaults").with("port", "80"))
//!     .source(MapSource::new("overrides").with("port", "8443"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.host, "localhost");
//! assert_eq!(config.port, 8443);
//! assert_eq!(config.timeout, Duration::from_secs(30));
//! assert!(config.ensure_validity(&[]).is_ok());
//! ```
//!
//! # Module Structure
//!
//! - [`prelude`]: Convenient re-exports for common usage
//! - [`config`]: `Properties`, `Config` and `ConfigBuilder`
//! - [`registry`]: field registration
//! - [`types`]: `FieldType` and the built-in field types
//! - [`source`]: `Source` trait and in-memory sources
//! - [`sources`]: `.properties` and TOML file sources
//! - [`mod@env`]: `ConfigEnv` trait and `MockEnv` for testing
//! - [`error`]: error types and `PropertiesValidation`
//! - [`instance`]: atomically replaceable configuration slot
//!
//! # Stillwater Integration
//!
//! | Type | Usage |
//! |------|-------|
//! | `Validation<T, E>` | Accumulating results of explicit checks |
//! | `NonEmptyVec<T>` | Guaranteed non-empty error lists and orphan sets |
//! | `Semigroup` | Combining errors from several checks |

mod check;
pub mod config;
pub mod env;
pub mod error;
pub mod field;
pub mod instance;
mod list;
mod nested;
pub mod prelude;
pub mod probe;
pub mod registry;
pub mod render;
pub mod source;
pub mod sources;
pub mod types;

// Re-exports for convenience
pub use config::{Config, ConfigBuilder, Properties};
pub use env::{ConfigEnv, MockEnv, RealEnv};
pub use error::{
    FieldError, PropertiesError, PropertiesErrors, PropertiesValidation, Rejection, Result,
    SourceError,
};
pub use field::FieldInfo;
pub use instance::Instance;
pub use probe::{Probe, ProbeError};
pub use registry::Registry;
pub use render::{FieldReport, HIDDEN};
pub use source::{check_key, Cascade, MapSource, PrefixSource, Source};
pub use sources::PropertiesFile;
#[cfg(feature = "toml")]
pub use sources::TomlFile;

// Re-export stillwater types that are commonly used
pub use stillwater::{NonEmptyVec, Semigroup, Validation};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        let _: PropertiesValidation<()> = Validation::Success(());
        let errors = PropertiesErrors::single(PropertiesError::NotSet);
        assert_eq!(errors.len(), 1);
    }
}
