//! Closed sets of named constants.

use std::fmt;
use std::marker::PhantomData;

use super::FieldType;
use crate::error::Rejection;

/// A type with a fixed list of named variants.
///
/// # Example
///
/// ```
/// use propbind::types::EnumField;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Mode {
///     Fast,
///     Safe,
/// }
///
/// impl EnumField for Mode {
///     fn variants() -> &'static [Self] {
///         &[Mode::Fast, Mode::Safe]
///     }
///
///     fn name(&self) -> &'static str {
///         match self {
///             Mode::Fast => "fast",
///             Mode::Safe => "safe",
///         }
///     }
/// }
/// ```
pub trait EnumField: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// All variants in declaration order.
    fn variants() -> &'static [Self];

    /// The name used in raw values.
    fn name(&self) -> &'static str;
}

/// Field type for an [`EnumField`]; matches names exactly.
pub struct EnumType<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> EnumType<E> {
    /// Create the field type.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for EnumType<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EnumType<E> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<E> Copy for EnumType<E> {}

impl<E> fmt::Debug for EnumType<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnumType")
    }
}

impl<E: EnumField> FieldType for EnumType<E> {
    type Value = E;

    fn type_name(&self) -> &'static str {
        "enum"
    }

    fn parse(&self, raw: &str) -> Result<E, Rejection> {
        E::variants()
            .iter()
            .find(|v| v.name() == raw)
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = E::variants().iter().map(|v| v.name()).collect();
                Rejection::new(format!(
                    "must be one of [{}], but was '{}'",
                    names.join(", "),
                    raw
                ))
            })
    }

    fn render(&self, value: &E) -> String {
        value.name().to_string()
    }
}
