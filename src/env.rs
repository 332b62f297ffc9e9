//! ConfigEnv trait for testable I/O.
//!
//! File-backed sources read through `ConfigEnv` so that loading and
//! reloading can be tested without touching the filesystem.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Environment trait for configuration I/O operations.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use propbind::env::MockEnv;
/// use propbind::sources::PropertiesFile;
/// use propbind::Source;
///
/// let env = Arc::new(MockEnv::new().with_file("app.properties", "port=8080"));
/// let source = PropertiesFile::load("app.properties", env).unwrap();
/// assert_eq!(source.get("port"), Some("8080".to_string()));
/// ```
pub trait ConfigEnv: Send + Sync {
    /// Read a file's contents as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if:
    /// - File does not exist (`ErrorKind::NotFound`)
    /// - File is not valid UTF-8
    /// - Permission denied
    /// - Other I/O errors
    fn read_file(&self, path: &Path) -> io::Result<String>;

    /// Check if a file exists.
    fn file_exists(&self, path: &Path) -> bool;
}

/// Production environment using standard library I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealEnv;

impl RealEnv {
    /// Create a new real environment.
    pub fn new() -> Self {
        Self
    }
}

impl ConfigEnv for RealEnv {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Mock file state for testing.
#[derive(Debug, Clone)]
enum MockFile {
    Content(String),
    PermissionDenied,
}

/// Mock environment for testing file-backed sources.
///
/// Files can be changed after creation, which is how reload is tested.
#[derive(Debug, Default)]
pub struct MockEnv {
    files: RwLock<HashMap<PathBuf, MockFile>>,
}

impl MockEnv {
    /// Create a new empty mock environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with content.
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.set_file(path, content);
        self
    }

    /// Add a file that will return "permission denied" error.
    pub fn with_unreadable_file(self, path: impl Into<PathBuf>) -> Self {
        if let Ok(mut files) = self.files.write() {
            files.insert(path.into(), MockFile::PermissionDenied);
        }
        self
    }

    /// Replace the content of a file after creation.
    pub fn set_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        if let Ok(mut files) = self.files.write() {
            files.insert(path.into(), MockFile::Content(content.into()));
        }
    }

    /// Remove a file from the mock environment.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        if let Ok(mut files) = self.files.write() {
            files.remove(path.as_ref());
        }
    }
}

impl ConfigEnv for MockEnv {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        let files = self
            .files
            .read()
            .map_err(|_| io::Error::other("mock environment poisoned"))?;

        match files.get(path) {
            Some(MockFile::Content(content)) => Ok(content.clone()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("mock file not found: {}", path.display()),
            )),
            Some(MockFile::PermissionDenied) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("mock permission denied: {}", path.display()),
            )),
        }
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .map(|files| matches!(files.get(path), Some(MockFile::Content(_))))
            .unwrap_or(false)
    }
}
