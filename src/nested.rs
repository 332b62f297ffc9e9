//! Nested configurations.
//!
//! A nested configuration is described against a view of the parent's
//! source that strips `prefix.` from every key. Its fields are spliced into
//! the parent under that prefix, so the flattened key of a child field is
//! always `prefix.child_key`, at any depth.

use std::sync::Arc;

use crate::config::{describe_all, Properties};
use crate::error::{PropertiesError, Result};
use crate::registry::Registry;
use crate::source::{PrefixSource, Source};

impl Registry<'_> {
    /// Register a nested configuration under `prefix`.
    ///
    /// # Example
    ///
    /// ```
    /// use propbind::{Config, MapSource, Properties, Registry, Result};
    ///
    /// struct Pool {
    ///     size: i32,
    /// }
    ///
    /// impl Properties for Pool {
    ///     fn describe(fields: &mut Registry<'_>) -> Result<Self> {
    ///         Ok(Self { size: fields.int("size", Some(4), 1)? })
    ///     }
    /// }
    ///
    /// struct App {
    ///     pool: Pool,
    /// }
    ///
    /// impl Properties for App {
    ///     fn describe(fields: &mut Registry<'_>) -> Result<Self> {
    ///         Ok(Self { pool: fields.nested("pool")? })
    ///     }
    /// }
    ///
    /// let config = Config::<App>::load(MapSource::new("test").with("pool.size", "8")).unwrap();
    /// assert_eq!(config.pool.size, 8);
    /// assert_eq!(config.fields()[0].key(), "pool.size");
    /// ```
    pub fn nested<C: Properties>(&mut self, prefix: &str) -> Result<C> {
        self.claim_key(prefix)?;
        self.bind_child(prefix)
    }

    /// Register a nested configuration enabled by a boolean field at
    /// `prefix` itself.
    ///
    /// When disabled the child is `None` and none of its keys are claimed,
    /// so keys left in the source below `prefix.` show up as orphans.
    pub fn nested_if<C: Properties>(
        &mut self,
        prefix: &str,
        enabled_default: bool,
    ) -> Result<Option<C>> {
        if !self.boolean(prefix, enabled_default)? {
            tracing::debug!(
                event = "propbind.nested.disabled",
                prefix = %prefix,
                "Nested configuration disabled"
            );
            return Ok(None);
        }
        self.bind_child(prefix).map(Some)
    }

    fn bind_child<C: Properties>(&mut self, prefix: &str) -> Result<C> {
        let child_source: Arc<dyn Source> =
            Arc::new(PrefixSource::new(Arc::clone(self.source), prefix));

        let described = describe_all::<C>(&child_source)
            .map_err(|e| reroot(e, prefix, &self.source.description()))?;

        tracing::debug!(
            event = "propbind.nested.bound",
            prefix = %prefix,
            fields = described.fields.len(),
            "Nested configuration bound"
        );

        self.fields
            .extend(described.fields.into_iter().map(|f| f.prefixed(prefix)));
        self.nested_probes
            .extend(described.probes.into_iter().map(|p| p.prefixed(prefix)));
        Ok(described.value)
    }
}

/// Express a child's error in the keys of the parent.
fn reroot(error: PropertiesError, prefix: &str, source_description: &str) -> PropertiesError {
    let under = |key: String| format!("{}.{}", prefix, key);
    match error {
        PropertiesError::Field(field) => field.nest(prefix, source_description).into(),
        PropertiesError::DuplicateKey { key } => PropertiesError::DuplicateKey { key: under(key) },
        PropertiesError::KeyCollision { group, other } => PropertiesError::KeyCollision {
            group: under(group),
            other: under(other),
        },
        PropertiesError::InvalidDefault { key, detail } => PropertiesError::InvalidDefault {
            key: under(key),
            detail,
        },
        PropertiesError::DuplicateProbe { name } => {
            PropertiesError::DuplicateProbe { name: under(name) }
        }
        PropertiesError::ListDefaultsTooShort {
            key,
            min_size,
            defaults,
        } => PropertiesError::ListDefaultsTooShort {
            key: under(key),
            min_size,
            defaults,
        },
        other => other,
    }
}
