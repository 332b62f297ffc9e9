//! Resolved field descriptors.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A resolved value whose type is only known to the code that declared it.
trait ErasedValue: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn same_as(&self, other: &dyn ErasedValue) -> bool;
}

impl<V> ErasedValue for V
where
    V: PartialEq + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn same_as(&self, other: &dyn ErasedValue) -> bool {
        other
            .as_any()
            .downcast_ref::<V>()
            .is_some_and(|other| self == other)
    }
}

/// One resolved configuration field.
///
/// Keys are fully qualified: a field declared as `host` inside a
/// configuration nested at `db` is reported as `db.host`.
#[derive(Clone)]
pub struct FieldInfo {
    key: String,
    type_name: &'static str,
    specified: bool,
    hidden: bool,
    rendered: String,
    default_rendered: Option<String>,
    value: Arc<dyn ErasedValue>,
}

impl FieldInfo {
    pub(crate) fn new<V>(
        key: impl Into<String>,
        type_name: &'static str,
        value: V,
        rendered: String,
        default_rendered: Option<String>,
    ) -> Self
    where
        V: PartialEq + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            type_name,
            specified: false,
            hidden: false,
            rendered,
            default_rendered,
            value: Arc::new(value),
        }
    }

    pub(crate) fn specified(mut self, specified: bool) -> Self {
        self.specified = specified;
        self
    }

    pub(crate) fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub(crate) fn prefixed(mut self, prefix: &str) -> Self {
        self.key = format!("{}.{}", prefix, self.key);
        self
    }

    /// Fully qualified key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Short name of the field type, e.g. `integer`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the source supplied a raw value rather than the default
    /// being used.
    pub fn is_specified(&self) -> bool {
        self.specified
    }

    /// Whether the value must not appear in any output.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The value in raw form, or `None` for hidden fields.
    pub fn rendered(&self) -> Option<&str> {
        if self.hidden {
            None
        } else {
            Some(&self.rendered)
        }
    }

    /// The default in raw form. `None` for mandatory and hidden fields.
    pub fn default_rendered(&self) -> Option<&str> {
        if self.hidden {
            None
        } else {
            self.default_rendered.as_deref()
        }
    }

    /// Whether the field is mandatory, i.e. has no default.
    pub fn is_mandatory(&self) -> bool {
        self.default_rendered.is_none()
    }

    /// The resolved value, if `V` is the field's value type.
    pub fn value<V: 'static>(&self) -> Option<&V> {
        self.value.as_any().downcast_ref::<V>()
    }

    /// Compare resolved values by value equality of the coerced type.
    pub(crate) fn same_value(&self, other: &FieldInfo) -> bool {
        self.value.same_as(other.value.as_ref())
    }

    /// Raw form regardless of hiding.
    pub(crate) fn raw_rendered(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("key", &self.key)
            .field("type_name", &self.type_name)
            .field("specified", &self.specified)
            .field("hidden", &self.hidden)
            .field("value", &self.rendered().unwrap_or("<hidden>"))
            .finish()
    }
}
