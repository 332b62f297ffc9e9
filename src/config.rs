//! Core Config type, the Properties trait and ConfigBuilder.
//!
//! This module provides the main entry point for describing and loading
//! configuration using the builder pattern.

use std::fmt;
use std::sync::Arc;

use crate::error::{PropertiesError, Result};
use crate::field::FieldInfo;
use crate::probe::Probe;
use crate::registry::Registry;
use crate::source::{Cascade, Source};

/// A configuration type.
///
/// `describe` is the single construction entry point: it registers every
/// field, nested configuration and probe, and assembles the value from
/// what the registry resolved.
///
/// # Example
///
/// ```
/// use propbind::{Config, MapSource, Properties, Registry, Result};
///
/// struct Database {
///     url: String,
///     pool_size: i32,
/// }
///
/// impl Properties for Database {
///     fn describe(fields: &mut Registry<'_>) -> Result<Self> {
///         Ok(Self {
///             url: fields.string("url", None)?,
///             pool_size: fields.int("pool.size", Some(10), 1)?,
///         })
///     }
/// }
///
/// let source = MapSource::new("db.properties").with("url", "postgres://localhost/app");
/// let config = Config::<Database>::load(source).unwrap();
/// assert_eq!(config.pool_size, 10);
/// ```
pub trait Properties: Sized + Send + Sync + 'static {
    /// Register fields and probes, and build the value.
    fn describe(fields: &mut Registry<'_>) -> Result<Self>;

    /// Additional probes whose names are only known after construction.
    ///
    /// They come after the probes registered in `describe`. Unlike those,
    /// their names need not be unique.
    fn probe_more(&self) -> Vec<Probe> {
        Vec::new()
    }
}

/// Result of describing one configuration level.
pub(crate) struct Described<T> {
    pub(crate) value: T,
    pub(crate) fields: Vec<FieldInfo>,
    pub(crate) probes: Vec<Probe>,
}

/// Describe `T` against `source`.
///
/// Probes are ordered: probes registered in `describe` (base types first),
/// then `probe_more`, then probes of nested configurations.
pub(crate) fn describe_all<T: Properties>(source: &Arc<dyn Source>) -> Result<Described<T>> {
    let mut registry = Registry::new(source);
    let value = T::describe(&mut registry)?;

    let mut probes = std::mem::take(&mut registry.probes);
    probes.extend(value.probe_more());
    probes.append(&mut registry.nested_probes);

    Ok(Described {
        value,
        fields: registry.fields,
        probes,
    })
}

/// A loaded, validated configuration.
///
/// Immutable once built. It implements `Deref` to provide transparent
/// access to the configuration type, and keeps the flattened field
/// descriptors, the probes and the source it was read from.
pub struct Config<T> {
    inner: T,
    fields: Vec<FieldInfo>,
    probes: Vec<Probe>,
    source: Arc<dyn Source>,
}

impl<T: Properties> Config<T> {
    /// Load a configuration from a single source.
    pub fn load<S: Source + 'static>(source: S) -> Result<Self> {
        Self::load_shared(Arc::new(source))
    }

    /// Load a configuration from a shared source.
    pub fn load_shared(source: Arc<dyn Source>) -> Result<Self> {
        let described = describe_all::<T>(&source)?;

        tracing::info!(
            event = "propbind.config.loaded",
            source = %source.description(),
            fields = described.fields.len(),
            probes = described.probes.len(),
            "Configuration loaded"
        );

        Ok(Self {
            inner: described.value,
            fields: described.fields,
            probes: described.probes,
            source,
        })
    }

    /// Create a builder for this configuration type.
    pub fn builder() -> ConfigBuilder<T> {
        ConfigBuilder::new()
    }
}

impl<T> Config<T> {
    /// Get a reference to the inner configuration value.
    pub fn get(&self) -> &T {
        &self.inner
    }

    /// Consume this Config and return the inner value.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// All fields in declaration order, nested fields included.
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Look up a field by its fully qualified key.
    pub fn field(&self, key: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.key() == key)
    }

    /// All probes in order.
    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    /// Look up a probe by name. Returns the first one if names repeat.
    pub fn probe(&self, name: &str) -> Option<&Probe> {
        self.probes.iter().find(|p| p.name() == name)
    }

    /// The source this configuration was read from.
    pub fn source(&self) -> &Arc<dyn Source> {
        &self.source
    }

    /// Description of the source, as used in error messages.
    pub fn source_description(&self) -> String {
        self.source.description()
    }
}

impl<T> std::ops::Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> AsRef<T> for Config<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("inner", &self.inner)
            .field("source", &self.source.description())
            .field("fields", &self.fields)
            .field("probes", &self.probes)
            .finish()
    }
}

/// Builder for loading configuration from several sources.
///
/// # Example
///
/// ```
/// use propbind::{Config, MapSource, Properties, Registry, Result};
///
/// struct App {
///     name: String,
/// }
///
/// impl Properties for App {
///     fn describe(fields: &mut Registry<'_>) -> Result<Self> {
///         Ok(Self { name: fields.string("name", None)? })
///     }
/// }
///
/// let config = Config::<App>::builder()
///     .source(MapSource::new("defaults").with("name", "app"))
///     .source(MapSource::new("overrides").with("name", "prod-app"))
///     .build()
///     .unwrap();
/// assert_eq!(config.name, "prod-app");
/// ```
pub struct ConfigBuilder<T> {
    sources: Vec<Arc<dyn Source>>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> Default for ConfigBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConfigBuilder<T> {
    /// Create a new empty config builder.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Add a configuration source.
    ///
    /// Sources are applied in order, with later sources overriding earlier ones.
    pub fn source<S: Source + 'static>(mut self, source: S) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Add an already shared source.
    pub fn shared_source(mut self, source: Arc<dyn Source>) -> Self {
        self.sources.push(source);
        self
    }
}

impl<T: Properties> ConfigBuilder<T> {
    /// Combine the sources and load the configuration.
    pub fn build(self) -> Result<Config<T>> {
        let mut sources = self.sources;
        let source = match sources.len() {
            0 => return Err(PropertiesError::NoSources),
            1 => sources.remove(0),
            _ => {
                sources.reverse();
                Arc::new(Cascade::new(sources))
            }
        };
        Config::load_shared(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MapSource;

    #[derive(Debug)]
    struct Simple {
        name: String,
        count: i32,
    }

    impl Properties for Simple {
        fn describe(fields: &mut Registry<'_>) -> Result<Self> {
            Ok(Self {
                name: fields.string("name", None)?,
                count: fields.int("count", Some(1), 0)?,
            })
        }
    }

    #[test]
    fn test_load_and_deref() {
        let config = Config::<Simple>::load(MapSource::new("test").with("name", "x")).unwrap();
        assert_eq!(config.name, "x");
        assert_eq!(config.get().count, 1);
        assert_eq!(config.fields().len(), 2);
        assert_eq!(config.source_description(), "test");
        assert!(config.field("count").is_some());
        assert!(config.field("missing").is_none());
    }

    #[test]
    fn test_builder_requires_a_source() {
        let result = Config::<Simple>::builder().build();
        assert!(matches!(result, Err(PropertiesError::NoSources)));
    }

    #[test]
    fn test_builder_later_sources_override() {
        let config = Config::<Simple>::builder()
            .source(MapSource::new("base").with("name", "a").with("count", "5"))
            .source(MapSource::new("override").with("name", "b"))
            .build()
            .unwrap();

        assert_eq!(config.name, "b");
        assert_eq!(config.count, 5);
        assert_eq!(config.source_description(), "override / base");
    }

    #[test]
    fn test_into_inner() {
        let config = Config::<Simple>::load(MapSource::new("test").with("name", "y")).unwrap();
        let inner = config.into_inner();
        assert_eq!(inner.name, "y");
    }

    struct WithProbes;

    impl Properties for WithProbes {
        fn describe(fields: &mut Registry<'_>) -> Result<Self> {
            fields.probe("declared", || Ok(1))?;
            Ok(Self)
        }

        fn probe_more(&self) -> Vec<Probe> {
            vec![Probe::new("more", || Ok(2)), Probe::new("more", || Ok(3))]
        }
    }

    #[test]
    fn test_more_probes_follow_declared_and_may_repeat() {
        let config = Config::<WithProbes>::load(MapSource::new("test")).unwrap();
        let names: Vec<String> = config.probes().iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["declared", "more", "more"]);
        assert_eq!(config.probe("more").unwrap().invoke().unwrap(), 2);
    }
}
