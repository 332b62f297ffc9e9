//! Character encodings.

use std::fmt;

use super::FieldType;
use crate::error::Rejection;

/// A character encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    Utf8,
    Utf16Be,
    Utf16Le,
    UsAscii,
    Iso8859_1,
}

impl Charset {
    /// All supported encodings.
    pub const ALL: [Charset; 5] = [
        Charset::Utf8,
        Charset::Utf16Be,
        Charset::Utf16Le,
        Charset::UsAscii,
        Charset::Iso8859_1,
    ];

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Utf16Le => "UTF-16LE",
            Charset::UsAscii => "US-ASCII",
            Charset::Iso8859_1 => "ISO-8859-1",
        }
    }

    /// Alternative names accepted by [`Charset::for_name`].
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Charset::Utf8 => &["UTF8"],
            Charset::Utf16Be => &["UTF_16BE"],
            Charset::Utf16Le => &["UTF_16LE"],
            Charset::UsAscii => &["ASCII", "US_ASCII"],
            Charset::Iso8859_1 => &["ISO8859_1", "ISO_8859_1", "LATIN1"],
        }
    }

    /// Look up an encoding by canonical name or alias, ignoring case.
    pub fn for_name(name: &str) -> Option<Charset> {
        Self::ALL.into_iter().find(|c| {
            c.name().eq_ignore_ascii_case(name)
                || c.aliases().iter().any(|a| a.eq_ignore_ascii_case(name))
        })
    }

    /// Encode a string, or `None` if it contains unmappable characters.
    pub fn encode(&self, s: &str) -> Option<Vec<u8>> {
        match self {
            Charset::Utf8 => Some(s.as_bytes().to_vec()),
            Charset::Utf16Be => Some(s.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Charset::Utf16Le => Some(s.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Charset::UsAscii => s.chars().map(|c| narrow(c, 0x7f)).collect(),
            Charset::Iso8859_1 => s.chars().map(|c| narrow(c, 0xff)).collect(),
        }
    }
}

fn narrow(c: char, max: u32) -> Option<u8> {
    let code = u32::from(c);
    if code <= max {
        u8::try_from(code).ok()
    } else {
        None
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encodings by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharsetType;

impl FieldType for CharsetType {
    type Value = Charset;

    fn type_name(&self) -> &'static str {
        "charset"
    }

    fn parse(&self, raw: &str) -> Result<Charset, Rejection> {
        Charset::for_name(raw)
            .ok_or_else(|| Rejection::new(format!("must be a charset, but was '{}'", raw)))
    }

    fn render(&self, value: &Charset) -> String {
        value.name().to_string()
    }
}
