//! Java-style `.properties` source.
//!
//! Supports `key=value`, `key: value` and `key value` lines, `#` and `!`
//! comments, trailing-backslash line continuation and the `\t`, `\n`,
//! `\r`, `\f`, `\uXXXX` escapes. A later line for the same key wins.
//!
//! # Example
//!
//! ```
//! use propbind::sources::PropertiesFile;
//! use propbind::Source;
//!
//! let source = PropertiesFile::string("inline", "host = localhost\nport: 8080").unwrap();
//! assert_eq!(source.get("host"), Some("localhost".to_string()));
//! assert_eq!(source.get("port"), Some("8080".to_string()));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use super::Backing;
use crate::env::{ConfigEnv, RealEnv};
use crate::error::SourceError;
use crate::source::{check_key, Source};

/// A source read from a `.properties` file or string.
pub struct PropertiesFile {
    backing: Backing,
    values: BTreeMap<String, String>,
}

impl PropertiesFile {
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

    /// Parse properties from a string.
    pub fn string(name: impl Into<String>, content: impl Into<String>) -> Result<Self, SourceError> {
        Self::parse(Backing::text(name, content))
    }

    /// Set a custom description for error messages.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.backing = self.backing.named(name);
        self
    }

    fn parse(backing: Backing) -> Result<Self, SourceError> {
        let values = parse_properties(backing.content(), backing.name())?;
        tracing::debug!(
            event = "propbind.source.loaded",
            source = %backing.name(),
            keys = values.len(),
            "Properties loaded"
        );
        Ok(Self { backing, values })
    }
}

impl Source for PropertiesFile {
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

/// Pure function: parse properties text into key/value pairs.
fn parse_properties(
    content: &str,
    source_name: &str,
) -> Result<BTreeMap<String, String>, SourceError> {
    let mut values = BTreeMap::new();
    let mut lines = content.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let first_line = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        let parse_error = |message: String| SourceError::Parse {
            source_name: source_name.to_string(),
            message,
            line: Some(first_line),
        };
        let key = unescape(key).map_err(parse_error)?;
        let value = unescape(value).map_err(parse_error)?;
        values.insert(key, value);
    }

    Ok(values)
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line at the first unescaped `=`, `:` or whitespace.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\x0c']);
    }
    (key, rest)
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("malformed \\uxxxx encoding '\\u{}'", hex))?;
                out.push(code);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;

    fn parse(content: &str) -> BTreeMap<String, String> {
        parse_properties(content, "test").unwrap()
    }

    #[test]
    fn test_separators() {
        let values = parse("a=1\nb: 2\nc 3\nd = 4\ne\n");
        assert_eq!(values["a"], "1");
        assert_eq!(values["b"], "2");
        assert_eq!(values["c"], "3");
        assert_eq!(values["d"], "4");
        assert_eq!(values["e"], "");
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let values = parse("# comment\n! other\n\n   \nkey=value\n");
        assert_eq!(values.len(), 1);
        assert_eq!(values["key"], "value");
    }

    #[test]
    fn test_continuation() {
        let values = parse("list=a,\\\n    b,\\\n    c\nnext=x");
        assert_eq!(values["list"], "a,b,c");
        assert_eq!(values["next"], "x");
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let values = parse("path=C:\\\\\nnext=x");
        assert_eq!(values["path"], "C:\\");
        assert_eq!(values["next"], "x");
    }

    #[test]
    fn test_escapes() {
        let values = parse("key\\=with\\:sep=tab\\there\nuni=\\u00e4");
        assert_eq!(values["key=with:sep"], "tab\there");
        assert_eq!(values["uni"], "ä");
    }

    #[test]
    fn test_later_value_wins() {
        let values = parse("a=1\na=2");
        assert_eq!(values["a"], "2");
    }

    #[test]
    fn test_malformed_unicode_escape() {
        let err = parse_properties("ok=1\nbad=\\u12", "app.properties").unwrap_err();
        match err {
            SourceError::Parse { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_through_env() {
        let env = Arc::new(MockEnv::new().with_file("app.properties", "port=8080"));
        let source = PropertiesFile::load("app.properties", env).unwrap();
        assert_eq!(source.get("port"), Some("8080".to_string()));
        assert_eq!(source.description(), "app.properties");
    }

    #[test]
    fn test_reload_tracks_changes() {
        let env = Arc::new(MockEnv::new().with_file("app.properties", "port=8080"));
        let source: Arc<PropertiesFile> =
            Arc::new(PropertiesFile::load("app.properties", env.clone()).unwrap());
        let as_dyn: Arc<dyn Source> = source.clone();

        let same = Arc::clone(&source).reload().unwrap();
        assert!(Arc::ptr_eq(&same, &as_dyn));

        env.set_file("app.properties", "port=9090");
        let changed = source.reload().unwrap();
        assert!(!Arc::ptr_eq(&changed, &as_dyn));
        assert_eq!(changed.get("port"), Some("9090".to_string()));
    }

    #[test]
    fn test_reload_of_removed_file_fails() {
        let env = Arc::new(MockEnv::new().with_file("app.properties", "port=8080"));
        let source = Arc::new(PropertiesFile::load("app.properties", env.clone()).unwrap());
        env.remove_file("app.properties");
        assert!(matches!(
            source.reload(),
            Err(SourceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_named() {
        let source = PropertiesFile::string("inline", "a=1").unwrap().named("defaults");
        assert_eq!(source.description(), "defaults");
    }
}
