//! The raw key/value `Source` capability and its in-memory implementations.
//!
//! A source only hands out raw strings. Everything typed happens in the
//! [`Registry`](crate::registry::Registry); sources never coerce or validate.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::error::SourceError;

/// Trait for raw configuration sources.
///
/// # Example Implementation
///
/// ```ignore
/// impl Source for MySource {
///     fn get(&self, key: &str) -> Option<String> {
///         check_key(key);
///         self.lookup(key)
///     }
///
///     fn key_set(&self) -> Option<BTreeSet<String>> {
///         None // cannot enumerate
///     }
///
///     fn description(&self) -> String {
///         "my-source".to_string()
///     }
///
///     fn reload(self: Arc<Self>) -> Result<Arc<dyn Source>, SourceError> {
///         Ok(self)
///     }
/// }
/// ```
pub trait Source: Send + Sync {
    /// Raw value for a key, or `None` if the source has no such key.
    ///
    /// # Panics
    ///
    /// Implementations panic on an empty key, see [`check_key`].
    fn get(&self, key: &str) -> Option<String>;

    /// All keys of this source, or `None` if it cannot enumerate them.
    fn key_set(&self) -> Option<BTreeSet<String>>;

    /// Human-readable origin used in every error message.
    fn description(&self) -> String;

    /// Return a source reflecting the current backing data.
    ///
    /// Returns `self` when nothing changed.
    fn reload(self: Arc<Self>) -> Result<Arc<dyn Source>, SourceError>;
}

/// Reject an empty key passed to [`Source::get`].
///
/// # Panics
///
/// Panics if `key` is empty.
pub fn check_key(key: &str) {
    assert!(!key.is_empty(), "key must not be empty");
}

/// In-memory source backed by a map.
///
/// # Example
///
/// ```
/// use propbind::{MapSource, Source};
///
/// let source = MapSource::new("test")
///     .with("host", "localhost")
///     .with("port", "8080");
/// assert_eq!(source.get("port"), Some("8080".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: BTreeMap<String, String>,
    description: String,
}

impl MapSource {
    /// Create an empty source with the given description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            values: BTreeMap::new(),
            description: description.into(),
        }
    }

    /// Create a source from key/value pairs.
    pub fn from_pairs<I, K, V>(description: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values,
            description: description.into(),
        }
    }

    /// Add a key/value pair.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Remove a key.
    pub fn without(mut self, key: &str) -> Self {
        self.values.remove(key);
        self
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Source for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        check_key(key);
        self.values.get(key).cloned()
    }

    fn key_set(&self) -> Option<BTreeSet<String>> {
        Some(self.values.keys().cloned().collect())
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn reload(self: Arc<Self>) -> Result<Arc<dyn Source>, SourceError> {
        Ok(self)
    }
}

/// View of another source with a key prefix stripped.
///
/// `PrefixSource::new(inner, "db").get("host")` reads `db.host` from `inner`.
/// This is how nested configurations see their part of the namespace.
#[derive(Clone)]
pub struct PrefixSource {
    inner: Arc<dyn Source>,
    prefix: String,
}

impl PrefixSource {
    /// Create a view of `inner` below `prefix` (given without trailing dot).
    pub fn new(inner: Arc<dyn Source>, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    /// The prefix, without trailing dot.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn qualify(&self, key: &str) -> String {
        format!("{}.{}", self.prefix, key)
    }
}

impl Source for PrefixSource {
    fn get(&self, key: &str) -> Option<String> {
        check_key(key);
        self.inner.get(&self.qualify(key))
    }

    fn key_set(&self) -> Option<BTreeSet<String>> {
        let dotted = format!("{}.", self.prefix);
        self.inner.key_set().map(|keys| {
            keys.into_iter()
                .filter_map(|k| k.strip_prefix(&dotted).map(str::to_string))
                .filter(|k| !k.is_empty())
                .collect()
        })
    }

    fn description(&self) -> String {
        format!("{} (prefix {}.)", self.inner.description(), self.prefix)
    }

    fn reload(self: Arc<Self>) -> Result<Arc<dyn Source>, SourceError> {
        let reloaded = Arc::clone(&self.inner).reload()?;
        if Arc::ptr_eq(&reloaded, &self.inner) {
            Ok(self)
        } else {
            Ok(Arc::new(PrefixSource::new(reloaded, self.prefix.clone())))
        }
    }
}

/// Ordered list of sources; the first source holding a key wins.
#[derive(Clone)]
pub struct Cascade {
    sources: Vec<Arc<dyn Source>>,
}

impl Cascade {
    /// Create a cascade from sources in priority order (highest first).
    pub fn new(sources: Vec<Arc<dyn Source>>) -> Self {
        Self { sources }
    }

    /// Number of member sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the cascade has no members.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Source for Cascade {
    fn get(&self, key: &str) -> Option<String> {
        check_key(key);
        self.sources.iter().find_map(|s| s.get(key))
    }

    fn key_set(&self) -> Option<BTreeSet<String>> {
        let mut keys = BTreeSet::new();
        for source in &self.sources {
            keys.extend(source.key_set()?);
        }
        Some(keys)
    }

    fn description(&self) -> String {
        self.sources
            .iter()
            .map(|s| s.description())
            .collect::<Vec<_>>()
            .join(" / ")
    }

    fn reload(self: Arc<Self>) -> Result<Arc<dyn Source>, SourceError> {
        let mut changed = false;
        let mut reloaded = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let next = Arc::clone(source).reload()?;
            changed |= !Arc::ptr_eq(&next, source);
            reloaded.push(next);
        }

        if changed {
            Ok(Arc::new(Cascade::new(reloaded)))
        } else {
            Ok(self)
        }
    }
}
