//! Rendering a loaded configuration for humans and tools.
//!
//! Hidden fields never show their value, only whether they were specified.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Placeholder rendered instead of a hidden value.
pub const HIDDEN: &str = "<hidden>";

/// One field of a configuration report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReport {
    /// Fully qualified key.
    pub key: String,
    /// Field type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Value in raw form; `None` for hidden fields.
    pub value: Option<String>,
    /// Default in raw form; `None` for mandatory and hidden fields.
    pub default: Option<String>,
    /// Whether the source supplied the value.
    pub specified: bool,
    /// Whether the value is hidden.
    pub hidden: bool,
}

impl<T> Config<T> {
    /// One report entry per field, in declaration order.
    pub fn report(&self) -> Vec<FieldReport> {
        self.fields()
            .iter()
            .map(|f| FieldReport {
                key: f.key().to_string(),
                type_name: f.type_name().to_string(),
                value: f.rendered().map(str::to_string),
                default: f.default_rendered().map(str::to_string),
                specified: f.is_specified(),
                hidden: f.is_hidden(),
            })
            .collect()
    }

    /// Render the resolved values as a JSON tree.
    ///
    /// Dotted keys become nested objects. A key that holds a value and has
    /// fields below it, like the enable flag of an optional nested
    /// configuration, keeps its value under the empty key `""`.
    ///
    /// # Example
    ///
    /// ```
    /// use propbind::{Config, MapSource, Properties, Registry, Result};
    ///
    /// struct Db {
    ///     host: String,
    ///     password: String,
    /// }
    ///
    /// impl Properties for Db {
    ///     fn describe(fields: &mut Registry<'_>) -> Result<Self> {
    ///         Ok(Self {
    ///             host: fields.string("db.host", Some("localhost"))?,
    ///             password: fields.hidden_string("db.password", Some(""))?,
    ///         })
    ///     }
    /// }
    ///
    /// let config = Config::<Db>::load(MapSource::new("test")).unwrap();
    /// assert_eq!(
    ///     config.to_json(),
    ///     serde_json::json!({"db": {"host": "localhost", "password": "<hidden>"}})
    /// );
    /// ```
    pub fn to_json(&self) -> serde_json::Value {
        let mut root = serde_json::Value::Object(serde_json::Map::new());
        for field in self.fields() {
            let value = field.rendered().unwrap_or(HIDDEN);
            let segments: Vec<&str> = field.key().split('.').collect();
            insert_value(&mut root, &segments, serde_json::Value::String(value.to_string()));
        }
        root
    }
}

fn insert_value(root: &mut serde_json::Value, segments: &[&str], value: serde_json::Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };

    if !root.is_object() {
        let previous = std::mem::replace(root, serde_json::Value::Object(serde_json::Map::new()));
        if let Some(obj) = root.as_object_mut() {
            obj.insert(String::new(), previous);
        }
    }

    let Some(obj) = root.as_object_mut() else {
        return;
    };

    if rest.is_empty() {
        match obj.get_mut(*first) {
            Some(existing) if existing.is_object() => {
                if let Some(children) = existing.as_object_mut() {
                    children.insert(String::new(), value);
                }
            }
            _ => {
                obj.insert(first.to_string(), value);
            }
        }
    } else {
        let child = obj
            .entry(first.to_string())
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        insert_value(child, rest, value);
    }
}
