//! Explicit checks on a loaded configuration: orphaned keys and
//! consistency between two instances.
//!
//! Both come in two shapes: a `Result` returning the first problem, and a
//! [`PropertiesValidation`] that can be accumulated with other checks.

use std::collections::BTreeSet;

use stillwater::{NonEmptyVec, Validation};

use crate::config::Config;
use crate::error::{PropertiesError, PropertiesErrors, PropertiesValidation, Result};

impl<T> Config<T> {
    /// Keys present in the source that no field claimed.
    ///
    /// Keys below a disabled nested configuration count as orphans.
    /// Fails if the source cannot enumerate its keys.
    pub fn orphaned_keys(&self) -> Result<Vec<String>> {
        let keys = self
            .source()
            .key_set()
            .ok_or_else(|| PropertiesError::EnumerationUnsupported {
                source_description: self.source_description(),
            })?;

        let claimed: BTreeSet<&str> = self.fields().iter().map(|f| f.key()).collect();
        Ok(keys
            .into_iter()
            .filter(|k| !claimed.contains(k.as_str()))
            .collect())
    }

    /// Check that every key of the source is claimed by a field or lies
    /// below one of `prefixes`.
    ///
    /// The prefixes name key ranges owned by other components reading the
    /// same source.
    pub fn validate_orphans(&self, prefixes: &[&str]) -> PropertiesValidation<()> {
        let orphans = match self.orphaned_keys() {
            Ok(orphans) => orphans,
            Err(e) => return Validation::Failure(PropertiesErrors::single(e)),
        };

        let orphans: Vec<String> = orphans
            .into_iter()
            .filter(|k| !prefixes.iter().any(|p| k.starts_with(p)))
            .collect();

        match NonEmptyVec::from_vec(orphans) {
            None => Validation::Success(()),
            Some(keys) => {
                tracing::warn!(
                    event = "propbind.check.orphans",
                    source = %self.source_description(),
                    count = keys.len(),
                    "Orphaned keys found"
                );
                let legal = self
                    .fields()
                    .iter()
                    .map(|f| f.key().to_string())
                    .chain(prefixes.iter().map(|p| p.to_string()))
                    .collect();
                Validation::Failure(PropertiesErrors::single(PropertiesError::Orphaned {
                    source_description: self.source_description(),
                    keys,
                    legal,
                }))
            }
        }
    }

    /// Fail if the source holds keys no field claimed, see
    /// [`Config::validate_orphans`].
    pub fn ensure_validity(&self, prefixes: &[&str]) -> Result<()> {
        first_error(self.validate_orphans(prefixes))
    }

    /// Check that `other` declares the same fields and resolved the same
    /// values.
    ///
    /// Both field lists are walked in declaration order and the first entry
    /// whose key or value differs is reported. A list count or nested gate
    /// precedes the fields it expands to, so a differing count or gate is
    /// reported as an inconsistent value rather than as different field
    /// sets. Values are compared by value of their type, not by raw string;
    /// values of hidden fields are left out of the message.
    pub fn validate_equality<U>(&self, other: &Config<U>) -> PropertiesValidation<()> {
        let this_source = self.source_description();
        let other_source = other.source_description();

        for (this, that) in self.fields().iter().zip(other.fields()) {
            if this.key() != that.key() {
                break;
            }
            if this.same_value(that) {
                continue;
            }
            let values = if this.is_hidden() || that.is_hidden() {
                None
            } else {
                Some((
                    this.raw_rendered().to_string(),
                    that.raw_rendered().to_string(),
                ))
            };
            return Validation::Failure(PropertiesErrors::single(PropertiesError::Inconsistent {
                key: this.key().to_string(),
                this_source,
                other_source,
                values,
            }));
        }

        let this_keys: Vec<&str> = self.fields().iter().map(|f| f.key()).collect();
        let other_keys: Vec<&str> = other.fields().iter().map(|f| f.key()).collect();
        if this_keys == other_keys {
            return Validation::Success(());
        }
        Validation::Failure(PropertiesErrors::single(PropertiesError::FieldSetMismatch {
            this_source,
            other_source,
            detail: format!(
                "expected [{}] but got [{}]",
                this_keys.join(", "),
                other_keys.join(", ")
            ),
        }))
    }

    /// Fail on the first difference to `other`, see
    /// [`Config::validate_equality`].
    pub fn ensure_equality<U>(&self, other: &Config<U>) -> Result<()> {
        first_error(self.validate_equality(other))
    }
}

fn first_error(validation: PropertiesValidation<()>) -> Result<()> {
    match validation {
        Validation::Success(()) => Ok(()),
        Validation::Failure(errors) => Err(errors.into_first()),
    }
}
