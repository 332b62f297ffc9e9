//! ISO-8601 durations (`PT30S`, `PT1H30M`, `P2DT3H`).

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::FieldType;
use crate::error::Rejection;

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:[.,](\d{1,9}))?S)?)?$")
        .expect("Invalid duration regex")
});

/// Parse an ISO-8601 duration without years or months.
///
/// Returns `None` if the string is malformed or overflows.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    if raw.ends_with(['T', 't']) {
        return None;
    }
    let caps = DURATION_REGEX.captures(raw)?;
    if (1..=4).all(|i| caps.get(i).is_none()) {
        return None;
    }

    let number = |i: usize| -> Option<u64> {
        caps.get(i)
            .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
    };

    let seconds = number(1)?
        .checked_mul(86_400)?
        .checked_add(number(2)?.checked_mul(3_600)?)?
        .checked_add(number(3)?.checked_mul(60)?)?
        .checked_add(number(4)?)?;

    let nanos = match caps.get(5) {
        Some(fraction) => {
            let digits = fraction.as_str();
            let padded = format!("{:0<9}", digits);
            padded.parse::<u32>().ok()?
        }
        None => 0,
    };

    Some(Duration::new(seconds, nanos))
}

/// Render a duration in canonical ISO-8601 form, hours being the largest unit.
///
/// ```
/// use std::time::Duration;
/// use propbind::types::format_duration;
///
/// assert_eq!(format_duration(Duration::ZERO), "PT0S");
/// assert_eq!(format_duration(Duration::from_secs(5400)), "PT1H30M");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "PT1.5S");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let nanos = duration.subsec_nanos();
    if total == 0 && nanos == 0 {
        return "PT0S".to_string();
    }

    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}M", minutes));
    }
    if seconds > 0 || nanos > 0 {
        out.push_str(&seconds.to_string());
        if nanos > 0 {
            let fraction = format!("{:09}", nanos);
            out.push('.');
            out.push_str(fraction.trim_end_matches('0'));
        }
        out.push('S');
    }
    out
}

/// A duration within `[minimum, maximum]`.
#[derive(Debug, Clone, Copy)]
pub struct DurationType {
    /// Smallest accepted duration.
    pub minimum: Duration,
    /// Largest accepted duration; `Duration::MAX` means unbounded.
    pub maximum: Duration,
}

impl DurationType {
    /// Create a duration type with the given bounds.
    pub fn new(minimum: Duration, maximum: Duration) -> Self {
        Self { minimum, maximum }
    }

    /// Create a duration type with only a lower bound.
    pub fn at_least(minimum: Duration) -> Self {
        Self::new(minimum, Duration::MAX)
    }

    fn requirement(&self) -> String {
        if self.maximum == Duration::MAX {
            format!(
                "must be a duration greater or equal {}",
                format_duration(self.minimum)
            )
        } else {
            format!(
                "must be a duration between {} and {}",
                format_duration(self.minimum),
                format_duration(self.maximum)
            )
        }
    }
}

impl Default for DurationType {
    fn default() -> Self {
        Self::at_least(Duration::ZERO)
    }
}

impl FieldType for DurationType {
    type Value = Duration;

    fn type_name(&self) -> &'static str {
        "duration"
    }

    fn parse(&self, raw: &str) -> Result<Duration, Rejection> {
        parse_duration(raw)
            .ok_or_else(|| Rejection::new(format!("{}, but was '{}'", self.requirement(), raw)))
    }

    fn check(&self, value: &Duration) -> Result<(), Rejection> {
        if *value < self.minimum || *value > self.maximum {
            return Err(Rejection::new(format!(
                "{}, but was {}",
                self.requirement(),
                format_duration(*value)
            )));
        }
        Ok(())
    }

    fn render(&self, value: &Duration) -> String {
        format_duration(*value)
    }
}
