//! File-backed source implementations.
//!
//! File I/O goes through [`ConfigEnv`] so loading and reloading can be
//! tested without touching the filesystem. Parsing is pure and happens
//! after the I/O completes.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::env::ConfigEnv;
use crate::error::SourceError;

mod properties_file;
#[cfg(feature = "toml")]
mod toml_source;

pub use properties_file::PropertiesFile;
#[cfg(feature = "toml")]
pub use toml_source::TomlFile;

/// Where the text of a file source comes from.
enum Origin {
    File {
        path: PathBuf,
        env: Arc<dyn ConfigEnv>,
        required: bool,
    },
    Text,
}

/// The raw text behind a file source, plus what is needed to read it again.
pub(crate) struct Backing {
    origin: Origin,
    name: String,
    content: String,
}

impl Backing {
    /// Read `path` through `env`.
    ///
    /// A missing optional file reads as empty text.
    pub(crate) fn file(
        path: PathBuf,
        env: Arc<dyn ConfigEnv>,
        required: bool,
    ) -> Result<Self, SourceError> {
        let name = path.display().to_string();
        let content = read(env.as_ref(), &path, &name, required)?;
        Ok(Self {
            origin: Origin::File {
                path,
                env,
                required,
            },
            name,
            content,
        })
    }

    /// Text given directly; it never changes.
    pub(crate) fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            origin: Origin::Text,
            name: name.into(),
            content: content.into(),
        }
    }

    pub(crate) fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn content(&self) -> &str {
        &self.content
    }

    /// Read the text again. Returns `None` when it did not change.
    pub(crate) fn reread(&self) -> Result<Option<Self>, SourceError> {
        let Origin::File {
            path,
            env,
            required,
        } = &self.origin
        else {
            return Ok(None);
        };

        let content = read(env.as_ref(), path, &self.name, *required)?;
        if content == self.content {
            return Ok(None);
        }

        tracing::debug!(
            event = "propbind.source.changed",
            source = %self.name,
            "Source content changed"
        );
        Ok(Some(Self {
            origin: Origin::File {
                path: path.clone(),
                env: Arc::clone(env),
                required: *required,
            },
            name: self.name.clone(),
            content,
        }))
    }
}

fn read(
    env: &dyn ConfigEnv,
    path: &std::path::Path,
    source_name: &str,
    required: bool,
) -> Result<String, SourceError> {
    match env.read_file(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if required {
                Err(SourceError::NotFound {
                    source_name: source_name.to_string(),
                    path: path.display().to_string(),
                })
            } else {
                // Optional file missing = no values
                Ok(String::new())
            }
        }
        Err(e) => Err(SourceError::Io {
            source_name: source_name.to_string(),
            message: e.to_string(),
        }),
    }
}

/// 1-based line number of a byte offset.
#[cfg_attr(not(feature = "toml"), allow(dead_code))]
pub(crate) fn line_from_offset(content: &str, offset: usize) -> u32 {
    let end = offset.min(content.len());
    let newlines = content.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count();
    u32::try_from(newlines + 1).unwrap_or(u32::MAX)
}
