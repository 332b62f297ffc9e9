//! Error types for the propbind configuration engine.
//!
//! Errors fall into four groups:
//!
//! - **Programming errors** (`EmptyKey`, `DuplicateKey`, `KeyCollision`,
//!   `InvalidDefault`, `DuplicateProbe`, `ListDefaultsTooShort`): the
//!   configuration type itself is wrong. They are detected while the
//!   configuration is being described and abort construction.
//! - **Configuration errors** (`Field`): a raw value is missing, cannot be
//!   coerced, or violates its bounds. Always reported in the uniform
//!   [`FieldError`] shape.
//! - **Consistency errors** (`Inconsistent`, `FieldSetMismatch`,
//!   `Orphaned`, `EnumerationUnsupported`): only raised when explicitly
//!   requested.
//! - **Source errors** ([`SourceError`]): a file-backed source failed to load.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use stillwater::{NonEmptyVec, Semigroup, Validation};

/// A shareable, type-erased error used as the cause of a failure.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Why a field type refused a raw value or a resolved value.
///
/// The detail is phrased to follow the key in a sentence, e.g.
/// `must be an integer greater or equal 5, but was 4`.
#[derive(Debug, Clone)]
pub struct Rejection {
    detail: String,
    cause: Option<SharedError>,
}

impl Rejection {
    /// Create a rejection with a detail message.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            cause: None,
        }
    }

    /// Attach the underlying error that made the coercion fail.
    pub fn caused_by<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// The detail message.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// The underlying error, if any.
    pub fn cause(&self) -> Option<&SharedError> {
        self.cause.as_ref()
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

/// A configuration error for a single key.
///
/// Renders as `property <key> in <source description> <detail>`. For a
/// field of a nested configuration the cause is the same failure seen from
/// the child's point of view (child-relative key, child source description),
/// so a failure three levels deep has a three-link cause chain.
#[derive(Debug, Clone)]
pub struct FieldError {
    key: String,
    source_description: String,
    detail: String,
    cause: Option<SharedError>,
}

impl FieldError {
    /// Create a field error from a rejection.
    pub fn new(
        key: impl Into<String>,
        source_description: impl Into<String>,
        rejection: Rejection,
    ) -> Self {
        Self {
            key: key.into(),
            source_description: source_description.into(),
            detail: rejection.detail,
            cause: rejection.cause,
        }
    }

    /// The error raised when a mandatory key has no raw value.
    pub fn missing(key: impl Into<String>, source_description: impl Into<String>) -> Self {
        Self::new(
            key,
            source_description,
            Rejection::new("must be specified as there is no default"),
        )
    }

    /// Re-root a child-level failure under the parent's prefix and source.
    pub(crate) fn nest(self, prefix: &str, parent_description: &str) -> Self {
        Self {
            key: format!("{}.{}", prefix, self.key),
            source_description: parent_description.to_string(),
            detail: self.detail.clone(),
            cause: Some(Arc::new(self)),
        }
    }

    /// The key, relative to the configuration that reported it.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Description of the source the key was read from.
    pub fn source_description(&self) -> &str {
        &self.source_description
    }

    /// The type-specific detail message.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// The underlying cause, if any.
    pub fn cause(&self) -> Option<&SharedError> {
        self.cause.as_ref()
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "property {} in {} {}",
            self.key, self.source_description, self.detail
        )
    }
}

impl StdError for FieldError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause.as_ref() as &(dyn StdError + 'static))
    }
}

/// Errors raised while loading a file-backed source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// The backing file does not exist.
    #[error("{source_name}: file not found: {path}")]
    NotFound { source_name: String, path: String },

    /// The backing file could not be read.
    #[error("{source_name}: I/O error: {message}")]
    Io {
        source_name: String,
        message: String,
    },

    /// The content could not be parsed.
    #[error("{source_name}: parse error: {message}{}", line_suffix(.line))]
    Parse {
        source_name: String,
        message: String,
        line: Option<u32>,
    },
}

fn line_suffix(line: &Option<u32>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

/// Errors that can occur while describing, loading, or checking properties.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PropertiesError {
    /// A raw value was missing or rejected.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// A field was registered with an empty key.
    #[error("key must not be empty")]
    EmptyKey,

    /// Two fields were registered with the same key.
    #[error("duplicate key '{key}'")]
    DuplicateKey { key: String },

    /// A key lies inside the namespace of another key.
    ///
    /// `group` is the shorter key with its trailing dot.
    #[error("properties field '{group}' collides with field '{other}'")]
    KeyCollision { group: String, other: String },

    /// A declared default violates the field's own bounds.
    #[error("default of {key} {detail}")]
    InvalidDefault { key: String, detail: String },

    /// Two probes declared on the same level share a name.
    #[error("probe {name} has duplicate name")]
    DuplicateProbe { name: String },

    /// A list's defaults cannot cover its minimum size.
    #[error("list {key} requires at least {min_size} elements, but has only {defaults} defaults")]
    ListDefaultsTooShort {
        key: String,
        min_size: usize,
        defaults: usize,
    },

    /// Two configurations do not declare the same fields.
    #[error("inconsistent fields between {this_source} and {other_source}: {detail}")]
    FieldSetMismatch {
        this_source: String,
        other_source: String,
        detail: String,
    },

    /// Two configurations disagree on a value.
    ///
    /// `values` is `None` for hidden fields.
    #[error(
        "inconsistent initialization for {key} between {this_source} and {other_source}{}",
        values_suffix(.values)
    )]
    Inconsistent {
        key: String,
        this_source: String,
        other_source: String,
        values: Option<(String, String)>,
    },

    /// The source cannot list its keys.
    #[error("source {source_description} does not support enumerating its keys")]
    EnumerationUnsupported { source_description: String },

    /// The source holds keys no field claimed.
    #[error(
        "{} in {source_description} {} not allowed, but only {}",
        orphan_subject(.keys),
        orphan_verb(.keys),
        bracketed(.legal)
    )]
    Orphaned {
        source_description: String,
        keys: NonEmptyVec<String>,
        legal: Vec<String>,
    },

    /// A configuration was built without any source.
    #[error("no configuration sources provided")]
    NoSources,

    /// No instance was published yet.
    #[error("no properties instance has been set")]
    NotSet,

    /// A source failed to load.
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl PropertiesError {
    /// The field error, if this is a configuration error.
    pub fn as_field(&self) -> Option<&FieldError> {
        match self {
            PropertiesError::Field(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this error is caused by the configuration type rather than
    /// by the configuration data.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            PropertiesError::EmptyKey
                | PropertiesError::DuplicateKey { .. }
                | PropertiesError::KeyCollision { .. }
                | PropertiesError::InvalidDefault { .. }
                | PropertiesError::DuplicateProbe { .. }
                | PropertiesError::ListDefaultsTooShort { .. }
        )
    }
}

fn values_suffix(values: &Option<(String, String)>) -> String {
    match values {
        Some((expected, got)) => format!(", expected {} but got {}.", expected, got),
        None => ".".to_string(),
    }
}

fn orphan_subject(keys: &NonEmptyVec<String>) -> String {
    if keys.len() == 1 {
        format!("property {}", keys.head())
    } else {
        let keys: Vec<String> = keys.iter().cloned().collect();
        format!("properties {}", bracketed(&keys))
    }
}

fn orphan_verb(keys: &NonEmptyVec<String>) -> &'static str {
    if keys.len() == 1 {
        "is"
    } else {
        "are"
    }
}

fn bracketed(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

/// A non-empty collection of properties errors, accumulated by
/// [`PropertiesValidation`].
#[derive(Debug, Clone)]
pub struct PropertiesErrors(pub NonEmptyVec<PropertiesError>);

impl PropertiesErrors {
    /// Create from a single error.
    pub fn single(error: PropertiesError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Get the first error (always exists).
    pub fn first(&self) -> &PropertiesError {
        self.0.head()
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over errors.
    pub fn iter(&self) -> impl Iterator<Item = &PropertiesError> {
        self.0.iter()
    }

    /// Keep only the first error.
    pub fn into_first(self) -> PropertiesError {
        self.0.head().clone()
    }
}

impl Semigroup for PropertiesErrors {
    fn combine(self, other: Self) -> Self {
        Self(self.0.combine(other.0))
    }
}

impl From<PropertiesError> for PropertiesErrors {
    fn from(error: PropertiesError) -> Self {
        Self::single(error)
    }
}

impl IntoIterator for PropertiesErrors {
    type Item = PropertiesError;
    type IntoIter = std::vec::IntoIter<PropertiesError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl fmt::Display for PropertiesErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Properties errors ({}):", self.len())?;
        for error in self.iter() {
            writeln!(f, "  {}", error)?;
        }
        Ok(())
    }
}

impl StdError for PropertiesErrors {}

/// Accumulating result of the explicit checks on a loaded configuration.
pub type PropertiesValidation<T> = Validation<T, PropertiesErrors>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PropertiesError>;
