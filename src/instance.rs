//! Publication point for the current configuration.
//!
//! An [`Instance`] holds at most one fully built configuration. Readers
//! always see a complete configuration or [`PropertiesError::NotSet`];
//! a reload builds a new configuration on the side and swaps it in.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::config::{Config, Properties};
use crate::error::{PropertiesError, Result};
use crate::source::Source;

/// Atomically replaceable slot holding the current configuration.
///
/// # Example
///
/// ```
/// use propbind::{Instance, MapSource, Properties, Registry, Result};
///
/// struct App {
///     workers: i32,
/// }
///
/// impl Properties for App {
///     fn describe(fields: &mut Registry<'_>) -> Result<Self> {
///         Ok(Self { workers: fields.int("workers", Some(4), 1)? })
///     }
/// }
///
/// let instance = Instance::<App>::new();
/// assert!(instance.get().is_err());
///
/// instance.create(MapSource::new("test")).unwrap();
/// assert_eq!(instance.get().unwrap().workers, 4);
/// ```
pub struct Instance<T> {
    slot: ArcSwapOption<Config<T>>,
}

impl<T> Default for Instance<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Instance<T> {
    /// Create an empty instance.
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
        }
    }

    /// The current configuration.
    pub fn get(&self) -> Result<Arc<Config<T>>> {
        self.slot.load_full().ok_or(PropertiesError::NotSet)
    }

    /// Whether a configuration is published.
    pub fn is_set(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Publish `config`, returning the one it replaces.
    pub fn set(&self, config: Config<T>) -> Option<Arc<Config<T>>> {
        self.publish(Arc::new(config))
    }

    fn publish(&self, config: Arc<Config<T>>) -> Option<Arc<Config<T>>> {
        tracing::info!(
            event = "propbind.instance.published",
            source = %config.source_description(),
            "Configuration published"
        );
        self.slot.swap(Some(config))
    }

    /// Clear the slot, returning the configuration that was published.
    pub fn remove(&self) -> Option<Arc<Config<T>>> {
        let previous = self.slot.swap(None);
        if previous.is_some() {
            tracing::info!(event = "propbind.instance.removed", "Configuration removed");
        }
        previous
    }
}

impl<T: Properties> Instance<T> {
    /// Build a configuration from `source` and publish it.
    ///
    /// Returns the configuration built here, even if another one has been
    /// published since.
    pub fn create<S: Source + 'static>(&self, source: S) -> Result<Arc<Config<T>>> {
        let config = Arc::new(Config::load(source)?);
        self.publish(Arc::clone(&config));
        Ok(config)
    }

    /// Rebuild the configuration from a reloaded source.
    ///
    /// If the source reports no change, the current configuration stays.
    /// On failure the current configuration stays published and the error
    /// is returned. If another configuration was published while this one
    /// was being built, that one wins and is returned.
    pub fn reload(&self) -> Result<Arc<Config<T>>> {
        let current = self.get()?;

        let source = Arc::clone(current.source()).reload().map_err(|e| {
            tracing::warn!(
                event = "propbind.instance.reload_failed",
                error = %e,
                "Source reload failed, keeping current configuration"
            );
            PropertiesError::from(e)
        })?;

        if Arc::ptr_eq(&source, current.source()) {
            tracing::debug!(event = "propbind.instance.unchanged", "Source unchanged");
            return Ok(current);
        }

        let next = match Config::load_shared(source) {
            Ok(next) => Arc::new(next),
            Err(e) => {
                tracing::warn!(
                    event = "propbind.instance.reload_failed",
                    error = %e,
                    "Rebuild failed, keeping current configuration"
                );
                return Err(e);
            }
        };

        let snapshot = Some(current);
        let previous = self.slot.compare_and_swap(&snapshot, Some(Arc::clone(&next)));
        let swapped = match (&*previous, &snapshot) {
            (Some(previous), Some(snapshot)) => Arc::ptr_eq(previous, snapshot),
            _ => false,
        };

        if swapped {
            tracing::info!(
                event = "propbind.instance.published",
                source = %next.source_description(),
                "Reloaded configuration published"
            );
            Ok(next)
        } else {
            tracing::debug!(
                event = "propbind.instance.superseded",
                "Configuration replaced concurrently, discarding reload"
            );
            self.get()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::source::MapSource;

    struct App {
        workers: i32,
    }

    impl Properties for App {
        fn describe(fields: &mut Registry<'_>) -> Result<Self> {
            Ok(Self {
                workers: fields.int("workers", Some(4), 1)?,
            })
        }
    }

    #[test]
    fn test_get_before_set() {
        let instance = Instance::<App>::new();
        assert!(!instance.is_set());
        assert!(matches!(instance.get(), Err(PropertiesError::NotSet)));
    }

    #[test]
    fn test_set_returns_previous() {
        let instance = Instance::<App>::new();
        let first = Config::load(MapSource::new("one")).unwrap();
        let second = Config::load(MapSource::new("two").with("workers", "8")).unwrap();

        assert!(instance.set(first).is_none());
        let previous = instance.set(second).unwrap();
        assert_eq!(previous.source_description(), "one");
        assert_eq!(instance.get().unwrap().workers, 8);
    }

    #[test]
    fn test_create_returns_what_it_published() {
        let instance = Instance::<App>::new();
        let created = instance.create(MapSource::new("test")).unwrap();
        let published = instance.remove().unwrap();
        assert!(Arc::ptr_eq(&created, &published));
    }

    #[test]
    fn test_concurrent_creates_return_their_own_config() {
        let instance = Instance::<App>::new();
        std::thread::scope(|scope| {
            for n in 1..=8 {
                let instance = &instance;
                scope.spawn(move || {
                    for _ in 0..50 {
                        let source = MapSource::new(format!("source{}", n))
                            .with("workers", n.to_string());
                        let created = instance.create(source).unwrap();
                        assert_eq!(created.workers, n);
                        assert_eq!(created.source_description(), format!("source{}", n));
                    }
                });
            }
        });
        assert!(instance.is_set());
    }

    #[test]
    fn test_remove() {
        let instance = Instance::<App>::new();
        instance.create(MapSource::new("test")).unwrap();
        assert!(instance.remove().is_some());
        assert!(instance.remove().is_none());
        assert!(instance.get().is_err());
    }

    #[test]
    fn test_failed_create_keeps_current() {
        let instance = Instance::<App>::new();
        instance.create(MapSource::new("good")).unwrap();
        assert!(instance
            .create(MapSource::new("bad").with("workers", "0"))
            .is_err());
        assert_eq!(instance.get().unwrap().source_description(), "good");
    }

    #[test]
    fn test_reload_unchanged_source_keeps_instance() {
        let instance = Instance::<App>::new();
        let created = instance.create(MapSource::new("test")).unwrap();
        let reloaded = instance.reload().unwrap();
        assert!(Arc::ptr_eq(&created, &reloaded));
    }

    #[test]
    fn test_reload_without_instance() {
        let instance = Instance::<App>::new();
        assert!(matches!(instance.reload(), Err(PropertiesError::NotSet)));
    }
}
