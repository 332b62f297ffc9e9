//! The field registry handed to [`Properties::describe`].
//!
//! Every field registration claims its key in a flat namespace, resolves
//! the raw value from the source, coerces it and checks it. The first
//! failure aborts the whole description.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::Properties;
use crate::error::{FieldError, PropertiesError, Result};
use crate::field::FieldInfo;
use crate::probe::{Probe, ProbeError};
use crate::source::Source;
use crate::types::{
    BoolType, CharSet, CharSetString, Charset, CharsetType, Day, DayType, DigestAlgorithm,
    DigestType, DurationType, EnumField, EnumType, FieldType, IntType, PathType, ServiceFactory,
    ServiceRegistry, ServiceType, StringType, TimeZone, TimeZoneType,
};

/// Registry of fields and probes for one configuration level.
///
/// # Example
///
/// ```
/// use propbind::{Config, MapSource, Properties, Registry, Result};
///
/// struct Server {
///     host: String,
///     port: i32,
/// }
///
/// impl Properties for Server {
///     fn describe(fields: &mut Registry<'_>) -> Result<Self> {
///         Ok(Self {
///             host: fields.string("host", Some("localhost"))?,
///             port: fields.int("port", Some(8080), 1)?,
///         })
///     }
/// }
///
/// let config = Config::<Server>::load(MapSource::new("test").with("port", "9000")).unwrap();
/// assert_eq!(config.host, "localhost");
/// assert_eq!(config.port, 9000);
/// ```
pub struct Registry<'a> {
    pub(crate) source: &'a Arc<dyn Source>,
    pub(crate) fields: Vec<FieldInfo>,
    /// Field keys and nested prefixes, each owning every key below `key.`.
    claims: Vec<String>,
    pub(crate) probes: Vec<Probe>,
    pub(crate) nested_probes: Vec<Probe>,
    probe_names: HashSet<String>,
}

impl<'a> Registry<'a> {
    pub(crate) fn new(source: &'a Arc<dyn Source>) -> Self {
        Self {
            source,
            fields: Vec::new(),
            claims: Vec::new(),
            probes: Vec::new(),
            nested_probes: Vec::new(),
            probe_names: HashSet::new(),
        }
    }

    /// Description of the source this level reads from.
    pub fn source_description(&self) -> String {
        self.source.description()
    }

    // ---------------------------------------------------------------
    // Key namespace
    // ---------------------------------------------------------------

    fn check_collisions(&self, key: &str) -> Result<()> {
        let dotted = format!("{}.", key);
        for claim in &self.claims {
            let claimed = format!("{}.", claim);
            if key.starts_with(&claimed) {
                return Err(PropertiesError::KeyCollision {
                    group: claimed,
                    other: key.to_string(),
                });
            }
            if claim.starts_with(&dotted) {
                return Err(PropertiesError::KeyCollision {
                    group: dotted,
                    other: claim.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_duplicate(&self, key: &str) -> Result<()> {
        if self.claims.iter().any(|c| c == key) {
            return Err(PropertiesError::DuplicateKey {
                key: key.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn claim_key(&mut self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(PropertiesError::EmptyKey);
        }
        self.check_duplicate(key)?;
        self.check_collisions(key)?;
        self.claims.push(key.to_string());
        Ok(())
    }

    // ---------------------------------------------------------------
    // Generic registration
    // ---------------------------------------------------------------

    fn register<F: FieldType>(
        &mut self,
        key: &str,
        default: Option<F::Value>,
        field_type: F,
        hidden: bool,
    ) -> Result<F::Value> {
        self.claim_key(key)?;

        if let Some(default) = &default {
            field_type
                .check(default)
                .map_err(|rejection| PropertiesError::InvalidDefault {
                    key: key.to_string(),
                    detail: rejection.detail().to_string(),
                })?;
        }

        let (value, specified) = match self.source.get(key) {
            Some(raw) => {
                let value = field_type
                    .parse(&raw)
                    .and_then(|v| field_type.check(&v).map(|()| v))
                    .map_err(|rejection| {
                        FieldError::new(key, self.source.description(), rejection)
                    })?;
                (value, true)
            }
            None => match default.clone() {
                Some(default) => (default, false),
                None => {
                    return Err(FieldError::missing(key, self.source.description()).into());
                }
            },
        };

        let rendered = field_type.render(&value);
        if hidden {
            tracing::debug!(
                event = "propbind.field.resolved",
                key = %key,
                specified,
                hidden = true,
                "Resolved hidden field"
            );
        } else {
            tracing::debug!(
                event = "propbind.field.resolved",
                key = %key,
                specified,
                value = %rendered,
                "Resolved field"
            );
        }

        let default_rendered = default.as_ref().map(|d| field_type.render(d));
        self.fields.push(
            FieldInfo::new(key, field_type.type_name(), value.clone(), rendered, default_rendered)
                .specified(specified)
                .hidden(hidden),
        );
        Ok(value)
    }

    /// Register a field of any [`FieldType`].
    ///
    /// A `None` default makes the field mandatory.
    pub fn value<F: FieldType>(
        &mut self,
        key: &str,
        default: Option<F::Value>,
        field_type: F,
    ) -> Result<F::Value> {
        self.register(key, default, field_type, false)
    }

    /// Register a field whose value never appears in rendered output.
    pub fn hidden_value<F: FieldType>(
        &mut self,
        key: &str,
        default: Option<F::Value>,
        field_type: F,
    ) -> Result<F::Value> {
        self.register(key, default, field_type, true)
    }

    // ---------------------------------------------------------------
    // Typed helpers
    // ---------------------------------------------------------------

    /// A boolean field; booleans always have a default.
    pub fn boolean(&mut self, key: &str, default: bool) -> Result<bool> {
        self.value(key, Some(default), BoolType)
    }

    /// An integer field with a lower bound.
    pub fn int(&mut self, key: &str, default: Option<i32>, minimum: i32) -> Result<i32> {
        self.value(key, default, IntType::new(minimum))
    }

    /// A string field.
    pub fn string(&mut self, key: &str, default: Option<&str>) -> Result<String> {
        self.value(key, default.map(str::to_string), StringType)
    }

    /// A string field never rendered, e.g. a password.
    pub fn hidden_string(&mut self, key: &str, default: Option<&str>) -> Result<String> {
        self.hidden_value(key, default.map(str::to_string), StringType)
    }

    /// A string field limited to the characters of `charset`.
    pub fn string_in(
        &mut self,
        key: &str,
        default: Option<&str>,
        charset: CharSet,
    ) -> Result<String> {
        self.value(key, default.map(str::to_string), CharSetString::new(charset))
    }

    /// A duration field bounded by `minimum` and `maximum`, both inclusive.
    pub fn duration(
        &mut self,
        key: &str,
        default: Option<Duration>,
        minimum: Duration,
        maximum: Duration,
    ) -> Result<Duration> {
        self.value(key, default, DurationType::new(minimum, maximum))
    }

    /// A calendar day field.
    pub fn day(&mut self, key: &str, default: Option<Day>) -> Result<Day> {
        self.value(key, default, DayType)
    }

    /// A field holding one variant of `E`.
    pub fn enumeration<E: EnumField>(&mut self, key: &str, default: Option<E>) -> Result<E> {
        self.value(key, default, EnumType::<E>::new())
    }

    /// A time zone field.
    pub fn time_zone(&mut self, key: &str, default: Option<TimeZone>) -> Result<TimeZone> {
        self.value(key, default, TimeZoneType)
    }

    /// A character encoding field.
    pub fn charset(&mut self, key: &str, default: Option<Charset>) -> Result<Charset> {
        self.value(key, default, CharsetType)
    }

    /// A file system path field.
    pub fn path(&mut self, key: &str, default: Option<&str>) -> Result<PathBuf> {
        self.value(key, default.map(PathBuf::from), PathType)
    }

    /// A message digest algorithm field.
    pub fn digest(
        &mut self,
        key: &str,
        default: Option<DigestAlgorithm>,
    ) -> Result<DigestAlgorithm> {
        self.value(key, default, DigestType)
    }

    /// A field selecting one service of `services` by name.
    ///
    /// The default is a service name; an unregistered default is a
    /// programming error.
    pub fn service<S: 'static, P: 'static>(
        &mut self,
        key: &str,
        default: Option<&str>,
        services: &ServiceRegistry<S, P>,
    ) -> Result<ServiceFactory<S, P>> {
        let service_type = ServiceType::new(services);
        let default = match default {
            Some(name) => Some(service_type.parse(name).map_err(|rejection| {
                PropertiesError::InvalidDefault {
                    key: key.to_string(),
                    detail: rejection.detail().to_string(),
                }
            })?),
            None => None,
        };
        self.value(key, default, service_type)
    }

    // ---------------------------------------------------------------
    // Probes
    // ---------------------------------------------------------------

    /// Register a probe.
    ///
    /// Probe names must be unique within one configuration type; a base
    /// type pulled in with [`Registry::inherit`] has its own scope.
    pub fn probe<R, F>(&mut self, name: &str, f: F) -> Result<()>
    where
        R: Serialize,
        F: Fn() -> std::result::Result<R, ProbeError> + Send + Sync + 'static,
    {
        if !self.probe_names.insert(name.to_string()) {
            return Err(PropertiesError::DuplicateProbe {
                name: name.to_string(),
            });
        }
        self.probes.push(Probe::new(name, f));
        Ok(())
    }

    /// Describe a base configuration type on this level.
    ///
    /// The base's fields share this level's namespace. Its probes, declared
    /// and additional, come before the probes registered afterwards.
    pub fn inherit<B: Properties>(&mut self) -> Result<B> {
        let outer = std::mem::take(&mut self.probe_names);
        let base = B::describe(self);
        self.probe_names = outer;

        let base = base?;
        self.probes.extend(base.probe_more());
        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MapSource;

    fn source(pairs: &[(&str, &str)]) -> Arc<dyn Source> {
        Arc::new(MapSource::from_pairs("test", pairs.iter().copied()))
    }

    #[test]
    fn test_default_used_when_absent() {
        let src = source(&[]);
        let mut registry = Registry::new(&src);
        assert_eq!(registry.int("port", Some(80), 1).unwrap(), 80);
        assert!(!registry.fields[0].is_specified());
    }

    #[test]
    fn test_raw_value_wins() {
        let src = source(&[("port", "8080")]);
        let mut registry = Registry::new(&src);
        assert_eq!(registry.int("port", Some(80), 1).unwrap(), 8080);
        assert!(registry.fields[0].is_specified());
    }

    #[test]
    fn test_missing_mandatory() {
        let src = source(&[]);
        let mut registry = Registry::new(&src);
        let err = registry.string("host", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "property host in test must be specified as there is no default"
        );
    }

    #[test]
    fn test_rejected_value() {
        let src = source(&[("n", "4")]);
        let mut registry = Registry::new(&src);
        let err = registry.int("n", None, 5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "property n in test must be an integer greater or equal 5, but was 4"
        );
    }

    #[test]
    fn test_invalid_default_is_programming_error() {
        let src = source(&[("n", "10")]);
        let mut registry = Registry::new(&src);
        let err = registry.int("n", Some(4), 5).unwrap_err();
        assert!(err.is_programming_error());
        assert_eq!(
            err.to_string(),
            "default of n must be an integer greater or equal 5, but was 4"
        );
    }

    #[test]
    fn test_duplicate_key() {
        let src = source(&[]);
        let mut registry = Registry::new(&src);
        registry.boolean("a", true).unwrap();
        let err = registry.boolean("a", false).unwrap_err();
        assert_eq!(err.to_string(), "duplicate key 'a'");
    }

    #[test]
    fn test_empty_key() {
        let src = source(&[]);
        let mut registry = Registry::new(&src);
        assert!(matches!(
            registry.boolean("", true),
            Err(PropertiesError::EmptyKey)
        ));
    }

    #[test]
    fn test_collision_both_orders() {
        let src = source(&[]);

        let mut registry = Registry::new(&src);
        registry.boolean("a", true).unwrap();
        let err = registry.boolean("a.b", true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "properties field 'a.' collides with field 'a.b'"
        );

        let mut registry = Registry::new(&src);
        registry.boolean("a.b", true).unwrap();
        let err = registry.boolean("a", true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "properties field 'a.' collides with field 'a.b'"
        );
    }

    #[test]
    fn test_similar_keys_do_not_collide() {
        let src = source(&[]);
        let mut registry = Registry::new(&src);
        registry.boolean("a", true).unwrap();
        registry.boolean("ab", true).unwrap();
        registry.boolean("b.a", true).unwrap();
    }

    #[test]
    fn test_hidden_value_not_rendered() {
        let src = source(&[("password", "s3cret")]);
        let mut registry = Registry::new(&src);
        assert_eq!(registry.hidden_string("password", None).unwrap(), "s3cret");
        assert_eq!(registry.fields[0].rendered(), None);
        assert!(registry.fields[0].is_hidden());
    }

    #[test]
    fn test_duplicate_probe() {
        let src = source(&[]);
        let mut registry = Registry::new(&src);
        registry.probe("a", || Ok(1)).unwrap();
        let err = registry.probe("a", || Ok(2)).unwrap_err();
        assert_eq!(err.to_string(), "probe a has duplicate name");
    }

    #[test]
    fn test_service_with_unknown_default() {
        let services: ServiceRegistry<String, ()> =
            ServiceRegistry::new().with("plain", |()| "plain".to_string());
        let src = source(&[]);
        let mut registry = Registry::new(&src);
        let err = registry
            .service("greeter", Some("fancy"), &services)
            .unwrap_err();
        assert!(err.is_programming_error());
    }

    #[test]
    fn test_duration_bounds() {
        let src = source(&[("timeout", "PT2H")]);
        let mut registry = Registry::new(&src);
        let err = registry
            .duration(
                "timeout",
                None,
                Duration::from_secs(1),
                Duration::from_secs(3600),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "property timeout in test must be a duration between PT1S and PT1H, but was PT2H"
        );
    }
}
