//! Time zone identifiers.
//!
//! Fixed offsets are resolved; region ids (`Europe/Berlin`) must name a
//! zone of the IANA time zone database.

use std::fmt;
use std::sync::LazyLock;

use chrono_tz::Tz;
use regex::Regex;

use super::FieldType;
use crate::error::Rejection;

static OFFSET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(UTC|GMT|UT)?([+-])([0-9]{2}):?([0-9]{2})$").expect("Invalid offset regex")
});

const MAX_OFFSET_SECONDS: i32 = 18 * 3600;

/// A time zone id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimeZone {
    /// A bare offset such as `+01:00`; zero is `Z`.
    Offset(i32),
    /// An offset relative to `UTC`, `GMT` or `UT`, e.g. `UTC+01:00` or `GMT`.
    Prefixed { prefix: String, offset: i32 },
    /// A region id such as `Europe/Berlin`.
    Region(String),
}

impl TimeZone {
    /// The UTC zone.
    pub fn utc() -> Self {
        TimeZone::Prefixed {
            prefix: "UTC".to_string(),
            offset: 0,
        }
    }

    /// Fixed offset from UTC in seconds; `None` for region ids, whose
    /// offset depends on the instant.
    pub fn fixed_offset_seconds(&self) -> Option<i32> {
        match self {
            TimeZone::Offset(offset) => Some(*offset),
            TimeZone::Prefixed { offset, .. } => Some(*offset),
            TimeZone::Region(_) => None,
        }
    }

    /// The database zone of a region id.
    pub fn region(&self) -> Option<Tz> {
        match self {
            TimeZone::Region(id) => id.parse().ok(),
            _ => None,
        }
    }

    /// Canonical id.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

fn format_offset(offset: i32) -> String {
    let sign = if offset < 0 { '-' } else { '+' };
    let abs = offset.abs();
    format!("{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZone::Offset(0) => f.write_str("Z"),
            TimeZone::Offset(offset) => f.write_str(&format_offset(*offset)),
            TimeZone::Prefixed { prefix, offset: 0 } => f.write_str(prefix),
            TimeZone::Prefixed { prefix, offset } => {
                write!(f, "{}{}", prefix, format_offset(*offset))
            }
            TimeZone::Region(id) => f.write_str(id),
        }
    }
}

/// Time zone ids: `Z`, `±hh:mm`, `UTC`, `GMT`, `UT`, `UTC±hh:mm`, or a
/// region id of the time zone database.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeZoneType;

impl TimeZoneType {
    fn rejection(raw: &str) -> Rejection {
        Rejection::new(format!("must be a time zone id, but was '{}'", raw))
    }
}

impl FieldType for TimeZoneType {
    type Value = TimeZone;

    fn type_name(&self) -> &'static str {
        "time zone"
    }

    fn parse(&self, raw: &str) -> Result<TimeZone, Rejection> {
        match raw {
            "Z" => return Ok(TimeZone::Offset(0)),
            "UTC" | "GMT" | "UT" => {
                return Ok(TimeZone::Prefixed {
                    prefix: raw.to_string(),
                    offset: 0,
                })
            }
            _ => {}
        }

        if let Some(caps) = OFFSET_REGEX.captures(raw) {
            let number = |i: usize| {
                caps.get(i)
                    .and_then(|m| m.as_str().parse::<i32>().ok())
                    .unwrap_or_default()
            };
            let hours = number(3);
            let minutes = number(4);
            if minutes >= 60 {
                return Err(Self::rejection(raw));
            }
            let magnitude = hours * 3600 + minutes * 60;
            if magnitude > MAX_OFFSET_SECONDS {
                return Err(Self::rejection(raw));
            }
            let offset = match caps.get(2).map(|m| m.as_str()) {
                Some("-") => -magnitude,
                _ => magnitude,
            };
            return Ok(match caps.get(1) {
                Some(prefix) => TimeZone::Prefixed {
                    prefix: prefix.as_str().to_string(),
                    offset,
                },
                None => TimeZone::Offset(offset),
            });
        }

        match raw.parse::<Tz>() {
            Ok(_) => Ok(TimeZone::Region(raw.to_string())),
            Err(_) => Err(Self::rejection(raw)),
        }
    }

    fn check(&self, value: &TimeZone) -> Result<(), Rejection> {
        let known = match value {
            TimeZone::Region(_) => value.region().is_some(),
            TimeZone::Offset(offset) | TimeZone::Prefixed { offset, .. } => {
                offset.abs() <= MAX_OFFSET_SECONDS
            }
        };
        if known {
            Ok(())
        } else {
            Err(Self::rejection(&value.id()))
        }
    }

    fn render(&self, value: &TimeZone) -> String {
        value.id()
    }
}
