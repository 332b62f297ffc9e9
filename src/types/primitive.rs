//! Booleans, integers, and strings.

use std::fmt;

use super::FieldType;
use crate::error::Rejection;

/// `true` or `false`, nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolType;

impl FieldType for BoolType {
    type Value = bool;

    fn type_name(&self) -> &'static str {
        "boolean"
    }

    fn parse(&self, raw: &str) -> Result<bool, Rejection> {
        match raw {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(Rejection::new(format!(
                "must be either 'true' or 'false', but was '{}'",
                raw
            ))),
        }
    }

    fn render(&self, value: &bool) -> String {
        value.to_string()
    }
}

/// A 32-bit integer with a lower bound.
#[derive(Debug, Clone, Copy)]
pub struct IntType {
    /// Smallest accepted value.
    pub minimum: i32,
}

impl IntType {
    /// Create an integer type accepting values `>= minimum`.
    pub fn new(minimum: i32) -> Self {
        Self { minimum }
    }
}

impl Default for IntType {
    fn default() -> Self {
        Self::new(i32::MIN)
    }
}

impl FieldType for IntType {
    type Value = i32;

    fn type_name(&self) -> &'static str {
        "integer"
    }

    fn parse(&self, raw: &str) -> Result<i32, Rejection> {
        raw.parse::<i32>().map_err(|e| {
            Rejection::new(format!(
                "must be an integer greater or equal {}, but was '{}'",
                self.minimum, raw
            ))
            .caused_by(e)
        })
    }

    fn check(&self, value: &i32) -> Result<(), Rejection> {
        if *value < self.minimum {
            return Err(Rejection::new(format!(
                "must be an integer greater or equal {}, but was {}",
                self.minimum, value
            )));
        }
        Ok(())
    }

    fn render(&self, value: &i32) -> String {
        value.to_string()
    }
}

/// Any string, taken verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl FieldType for StringType {
    type Value = String;

    fn type_name(&self) -> &'static str {
        "string"
    }

    fn parse(&self, raw: &str) -> Result<String, Rejection> {
        Ok(raw.to_string())
    }

    fn render(&self, value: &String) -> String {
        value.clone()
    }
}

/// A set of allowed characters given as inclusive ranges.
///
/// # Example
///
/// ```
/// use propbind::types::CharSet;
///
/// let set = CharSet::new(&[('a', 'z'), ('0', '9'), ('_', '_')]);
/// assert!(set.contains('q'));
/// assert!(!set.contains('Q'));
/// assert_eq!(set.to_string(), "[a-z0-9_]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    ranges: Vec<(char, char)>,
}

impl CharSet {
    /// Create a set from inclusive `(from, to)` ranges.
    pub fn new(ranges: &[(char, char)]) -> Self {
        Self {
            ranges: ranges.to_vec(),
        }
    }

    /// Lower-case ASCII letters and digits.
    pub fn alpha_lower_numeric() -> Self {
        Self::new(&[('a', 'z'), ('0', '9')])
    }

    /// ASCII letters and digits.
    pub fn alpha_numeric() -> Self {
        Self::new(&[('A', 'Z'), ('a', 'z'), ('0', '9')])
    }

    /// Check if `c` is in the set.
    pub fn contains(&self, c: char) -> bool {
        self.ranges.iter().any(|(from, to)| (*from..=*to).contains(&c))
    }

    /// Position and value of the first character not in the set.
    pub fn first_illegal(&self, s: &str) -> Option<(usize, char)> {
        s.chars().enumerate().find(|(_, c)| !self.contains(*c))
    }
}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (from, to) in &self.ranges {
            if from == to {
                write!(f, "{}", from)?;
            } else {
                write!(f, "{}-{}", from, to)?;
            }
        }
        f.write_str("]")
    }
}

/// A string restricted to the characters of a [`CharSet`].
#[derive(Debug, Clone)]
pub struct CharSetString {
    charset: CharSet,
}

impl CharSetString {
    /// Create a string type limited to `charset`.
    pub fn new(charset: CharSet) -> Self {
        Self { charset }
    }
}

impl FieldType for CharSetString {
    type Value = String;

    fn type_name(&self) -> &'static str {
        "string"
    }

    fn parse(&self, raw: &str) -> Result<String, Rejection> {
        let value = raw.to_string();
        self.check(&value)?;
        Ok(value)
    }

    fn check(&self, value: &String) -> Result<(), Rejection> {
        match self.charset.first_illegal(value) {
            Some((position, c)) => Err(Rejection::new(format!(
                "must contain only characters from {}, but was '{}' containing illegal character '{}' at position {}",
                self.charset, value, c, position
            ))),
            None => Ok(()),
        }
    }

    fn render(&self, value: &String) -> String {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_parse() {
        assert!(BoolType.parse("true").unwrap());
        assert!(!BoolType.parse("false").unwrap());

        let err = BoolType.parse("TRUE").unwrap_err();
        assert_eq!(err.detail(), "must be either 'true' or 'false', but was 'TRUE'");
    }

    #[test]
    fn test_int_parse_failure_has_cause() {
        let err = IntType::new(5).parse("4x").unwrap_err();
        assert_eq!(
            err.detail(),
            "must be an integer greater or equal 5, but was '4x'"
        );
        assert!(err.cause().is_some());
    }

    #[test]
    fn test_int_minimum() {
        let int = IntType::new(5);
        assert!(int.check(&5).is_ok());
        assert!(int.check(&6).is_ok());

        let err = int.check(&4).unwrap_err();
        assert_eq!(err.detail(), "must be an integer greater or equal 5, but was 4");
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_int_negative() {
        assert_eq!(IntType::default().parse("-17").unwrap(), -17);
    }

    #[test]
    fn test_string_takes_raw_verbatim() {
        assert_eq!(StringType.parse(" a b ").unwrap(), " a b ");
        assert_eq!(StringType.parse("").unwrap(), "");
    }

    #[test]
    fn test_charset_string() {
        let t = CharSetString::new(CharSet::alpha_lower_numeric());
        assert_eq!(t.parse("abc123").unwrap(), "abc123");

        let err = t.parse("abC").unwrap_err();
        assert_eq!(
            err.detail(),
            "must contain only characters from [a-z0-9], but was 'abC' containing illegal character 'C' at position 2"
        );
    }

    #[test]
    fn test_charset_display_single_chars() {
        let set = CharSet::new(&[('-', '-'), ('a', 'c')]);
        assert_eq!(set.to_string(), "[-a-c]");
    }
}
