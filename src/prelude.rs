//! Convenient re-exports for common propbind usage.
//!
//! ```
//! use propbind::prelude::*;
//!
//! struct Limits {
//!     retries: i32,
//! }
//!
//! impl Properties for Limits {
//!     fn describe(fields: &mut Registry<'_>) -> Result<Self> {
//!         Ok(Self { retries: fields.int("retries", Some(3), 0)? })
//!     }
//! }
//!
//! let config = Config::<Limits>::load(MapSource::new("test")).unwrap();
//! assert_eq!(config.retries, 3);
//! ```

// ============================================================================
// Stillwater re-exports
// ============================================================================

/// Result type with error accumulation. Use `Validation::all_vec()` to
/// combine several checks and collect every failure.
pub use stillwater::Validation;

/// Trait for combining values. `PropertiesErrors` implements this.
pub use stillwater::Semigroup;

/// Guaranteed non-empty collection. Underlying type for `PropertiesErrors`.
pub use stillwater::NonEmptyVec;

// ============================================================================
// Errors
// ============================================================================

pub use crate::error::{
    FieldError, PropertiesError, PropertiesErrors, PropertiesValidation, Rejection, Result,
    SourceError,
};

// ============================================================================
// Describing and loading
// ============================================================================

pub use crate::config::{Config, ConfigBuilder, Properties};
pub use crate::field::FieldInfo;
pub use crate::instance::Instance;
pub use crate::probe::{Probe, ProbeError};
pub use crate::registry::Registry;
pub use crate::render::FieldReport;

// ============================================================================
// Field types
// ============================================================================

pub use crate::types::{
    Charset, Day, DigestAlgorithm, EnumField, FieldType, ServiceFactory, ServiceRegistry,
    TimeZone,
};

// ============================================================================
// Sources and environment
// ============================================================================

pub use crate::env::{ConfigEnv, MockEnv, RealEnv};
pub use crate::source::{Cascade, MapSource, PrefixSource, Source};
pub use crate::sources::PropertiesFile;
#[cfg(feature = "toml")]
pub use crate::sources::TomlFile;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_validation_all_vec_accumulates_errors() {
        let v1: PropertiesValidation<i32> =
            Validation::Failure(PropertiesErrors::single(PropertiesError::NotSet));
        let v2: PropertiesValidation<i32> =
            Validation::Failure(PropertiesErrors::single(PropertiesError::NoSources));

        let result = Validation::all_vec(vec![v1, v2]);
        assert!(result.is_failure());

        if let Validation::Failure(errors) = result {
            assert_eq!(errors.len(), 2);
        }
    }

    #[test]
    fn test_prelude_semigroup_combine() {
        let e1 = PropertiesErrors::single(PropertiesError::NotSet);
        let e2 = PropertiesErrors::single(PropertiesError::NoSources);
        assert_eq!(e1.combine(e2).len(), 2);
    }

    #[test]
    fn test_prelude_nonemptyvec_available() {
        let nev = NonEmptyVec::singleton(42);
        assert_eq!(*nev.head(), 42);
    }
}
