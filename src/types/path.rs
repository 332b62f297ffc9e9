//! File system paths.

use std::path::PathBuf;

use super::FieldType;
use crate::error::Rejection;

/// A non-empty file system path. The path is not required to exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathType;

impl FieldType for PathType {
    type Value = PathBuf;

    fn type_name(&self) -> &'static str {
        "path"
    }

    fn parse(&self, raw: &str) -> Result<PathBuf, Rejection> {
        let path = PathBuf::from(raw);
        self.check(&path)?;
        Ok(path)
    }

    fn check(&self, value: &PathBuf) -> Result<(), Rejection> {
        if value.as_os_str().is_empty() {
            return Err(Rejection::new("must not be empty"));
        }
        Ok(())
    }

    fn render(&self, value: &PathBuf) -> String {
        value.display().to_string()
    }
}
