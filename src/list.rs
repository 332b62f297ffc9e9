//! Lists of values under a common key.
//!
//! A list at `key` is stored as `key.count` plus one element per index,
//! `key.0` to `key.{count-1}`.

use crate::error::{PropertiesError, Result};
use crate::registry::Registry;
use crate::types::{FieldType, IntType, StringType};

impl Registry<'_> {
    /// Register a list of values of `field_type`.
    ///
    /// The count defaults to the number of `defaults` and must be at least
    /// `min_size`. Each element falls back to the default at its index;
    /// an element without raw value beyond the defaults is missing.
    ///
    /// # Example
    ///
    /// ```
    /// use propbind::types::StringType;
    /// use propbind::{Config, MapSource, Properties, Registry, Result};
    ///
    /// struct Hosts {
    ///     hosts: Vec<String>,
    /// }
    ///
    /// impl Properties for Hosts {
    ///     fn describe(fields: &mut Registry<'_>) -> Result<Self> {
    ///         let defaults = vec!["a".to_string(), "b".to_string()];
    ///         Ok(Self { hosts: fields.list("hosts", 1, defaults, StringType)? })
    ///     }
    /// }
    ///
    /// let source = MapSource::new("test")
    ///     .with("hosts.count", "3")
    ///     .with("hosts.2", "c");
    /// let config = Config::<Hosts>::load(source).unwrap();
    /// assert_eq!(config.hosts, vec!["a", "b", "c"]);
    /// ```
    pub fn list<F: FieldType>(
        &mut self,
        key: &str,
        min_size: usize,
        defaults: Vec<F::Value>,
        field_type: F,
    ) -> Result<Vec<F::Value>> {
        if key.is_empty() {
            return Err(PropertiesError::EmptyKey);
        }
        if defaults.len() < min_size {
            return Err(PropertiesError::ListDefaultsTooShort {
                key: key.to_string(),
                min_size,
                defaults: defaults.len(),
            });
        }
        for (index, default) in defaults.iter().enumerate() {
            field_type
                .check(default)
                .map_err(|rejection| PropertiesError::InvalidDefault {
                    key: format!("{}.{}", key, index),
                    detail: rejection.detail().to_string(),
                })?;
        }

        let count = self.value(
            &format!("{}.count", key),
            Some(saturating_i32(defaults.len())),
            IntType::new(saturating_i32(min_size)),
        )?;

        // The count is untrusted input; elements are only allocated as they resolve.
        let count = usize::try_from(count).unwrap_or_default();
        let mut values = Vec::new();
        for index in 0..count {
            let value = self.value(
                &format!("{}.{}", key, index),
                defaults.get(index).cloned(),
                &field_type,
            )?;
            values.push(value);
        }
        Ok(values)
    }

    /// Register a list of strings.
    pub fn strings(
        &mut self,
        key: &str,
        min_size: usize,
        defaults: &[&str],
    ) -> Result<Vec<String>> {
        let defaults = defaults.iter().map(|s| s.to_string()).collect();
        self.list(key, min_size, defaults, StringType)
    }
}

fn saturating_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
