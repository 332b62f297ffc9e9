//! TOML configuration source.
//!
//! Tables flatten to dotted keys. Arrays, including arrays of tables,
//! become a `key.count` entry plus one `key.<index>` entry per element,
//! which is the layout list fields read. Scalars keep their TOML text:
//! strings unquoted, numbers, booleans and datetimes as written.
//!
//! # Example
//!
//! ```
//! use propbind::sources::TomlFile;
//! use propbind::Source;
//!
//! let source = TomlFile::string("inline", r#"
//!     name = "app"
//!
//!     [server]
//!     port = 8080
//!     hosts = ["a", "b"]
//! "#).unwrap();
//!
//! assert_eq!(source.get("server.port"), Some("8080".to_string()));
//! assert_eq!(source.get("server.hosts.count"), Some("2".to_string()));
//! assert_eq!(source.get("server.hosts.1"), Some("b".to_string()));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use toml_edit::{ImDocument, Item, Value};

use super::{line_from_offset, Backing};
use crate::env::{ConfigEnv, RealEnv};
use crate::error::SourceError;
use crate::source::{check_key, Source};

/// A source read from a TOML file or string.
pub struct TomlFile {
    backing: Backing,
    values: BTreeMap<String, String>,
}

impl TomlFile {
    /// Load a required file through `env`.
    pub fn load(path: impl Into<PathBuf>, env: Arc<dyn ConfigEnv>) -> Result<Self, SourceError> {
        Self::parse(Backing::file(path.into(), env, true)?)
    }

    /// Load a file through `env`; a missing file yields no values.
    pub fn load_optional(
        path: impl Into<PathBuf>,
        env: Arc<dyn ConfigEnv>,
    ) -> Result<Self, SourceError> {
        Self::parse(Backing::file(path.into(), env, false)?)
    }

    /// Load a required file from the real filesystem.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        Self::load(path, Arc::new(RealEnv::new()))
    }

    /// Parse TOML from a string.
    pub fn string(name: impl Into<String>, content: impl Into<String>) -> Result<Self, SourceError> {
        Self::parse(Backing::text(name, content))
    }

    /// Set a custom description for error messages.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.backing = self.backing.named(name);
        self
    }

    fn parse(backing: Backing) -> Result<Self, SourceError> {
        let values = parse_toml(backing.content(), backing.name())?;
        tracing::debug!(
            event = "propbind.source.loaded",
            source = %backing.name(),
            keys = values.len(),
            "TOML loaded"
        );
        Ok(Self { backing, values })
    }
}

impl Source for TomlFile {
    fn get(&self, key: &str) -> Option<String> {
        check_key(key);
        self.values.get(key).cloned()
    }

    fn key_set(&self) -> Option<BTreeSet<String>> {
        Some(self.values.keys().cloned().collect())
    }

    fn description(&self) -> String {
        self.backing.name().to_string()
    }

    fn reload(self: Arc<Self>) -> Result<Arc<dyn Source>, SourceError> {
        match self.backing.reread()? {
            None => Ok(self),
            Some(backing) => Ok(Arc::new(Self::parse(backing)?)),
        }
    }
}

/// Pure function: parse TOML text into flattened key/value pairs.
fn parse_toml(content: &str, source_name: &str) -> Result<BTreeMap<String, String>, SourceError> {
    let document: ImDocument<&str> =
        ImDocument::parse(content).map_err(|e: toml_edit::TomlError| SourceError::Parse {
            source_name: source_name.to_string(),
            message: e.message().trim_end().to_string(),
            line: e.span().map(|s| line_from_offset(content, s.start)),
        })?;

    let mut values = BTreeMap::new();
    flatten_item(document.as_item(), "", &mut values);
    Ok(values)
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn flatten_item(item: &Item, prefix: &str, values: &mut BTreeMap<String, String>) {
    match item {
        Item::Table(table) => {
            for (key, val) in table.iter() {
                flatten_item(val, &join(prefix, key), values);
            }
        }
        Item::ArrayOfTables(arr) => {
            values.insert(join(prefix, "count"), arr.len().to_string());
            for (i, table) in arr.iter().enumerate() {
                let element = join(prefix, &i.to_string());
                for (key, val) in table.iter() {
                    flatten_item(val, &join(&element, key), values);
                }
            }
        }
        Item::Value(v) => flatten_value(v, prefix, values),
        Item::None => {}
    }
}

fn flatten_value(value: &Value, prefix: &str, values: &mut BTreeMap<String, String>) {
    match value {
        Value::Array(arr) => {
            values.insert(join(prefix, "count"), arr.len().to_string());
            for (i, element) in arr.iter().enumerate() {
                flatten_value(element, &join(prefix, &i.to_string()), values);
            }
        }
        Value::InlineTable(table) => {
            for (key, val) in table.iter() {
                flatten_value(val, &join(prefix, key), values);
            }
        }
        Value::String(s) => {
            values.insert(prefix.to_string(), s.value().to_string());
        }
        Value::Integer(i) => {
            values.insert(prefix.to_string(), i.value().to_string());
        }
        Value::Float(f) => {
            values.insert(prefix.to_string(), f.value().to_string());
        }
        Value::Boolean(b) => {
            values.insert(prefix.to_string(), b.value().to_string());
        }
        Value::Datetime(dt) => {
            values.insert(prefix.to_string(), dt.value().to_string());
        }
    }
}
