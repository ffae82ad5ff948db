//! Time representation for clip-relative positions.
//! All values are nanoseconds since clip start, stored as `i64`.

use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Time constants for conversions
pub mod constants {
    pub const NANOS_PER_SECOND: i64 = 1_000_000_000;
    pub const NANOS_PER_MILLI: i64 = 1_000_000;
    pub const NANOS_PER_MICRO: i64 = 1_000;
    pub const SECONDS_PER_MINUTE: i64 = 60;
    pub const SECONDS_PER_HOUR: i64 = 3_600;

    /// Fraction digits shown when no precision is requested.
    pub const DEFAULT_PRECISION: usize = 3;
    /// Nanosecond resolution caps the fraction at nine digits.
    pub const MAX_PRECISION: usize = 9;
}

use constants::*;

/// Error produced when parsing `hours:minutes:seconds.fraction` text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeFormatError {
    #[error("time text is empty")]
    Empty,
    #[error("'{0}' is not a number")]
    NonNumeric(String),
    #[error("malformed separators in '{0}'")]
    MalformedSeparator(String),
    #[error("{field} value {value} must be below 60")]
    FieldOutOfRange { field: &'static str, value: i64 },
    #[error("time value does not fit in 64-bit nanoseconds")]
    Overflow,
}

/// A signed duration relative to the start of a clip.
///
/// Ordering is total. Values outside `[0, clip duration]` can be represented;
/// range validity is decided by whoever owns the value, not by this type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeValue(i64);

/// Time zero constant
pub const ZERO: TimeValue = TimeValue(0);

impl TimeValue {
    pub const ZERO: TimeValue = ZERO;
    pub const MAX: TimeValue = TimeValue(i64::MAX);

    #[inline]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros * NANOS_PER_MICRO)
    }

    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * NANOS_PER_MILLI)
    }

    /// Convert seconds (f64) to a time value, rounding to the nearest nanosecond.
    #[inline]
    pub fn from_seconds(seconds: f64) -> Self {
        Self((seconds * NANOS_PER_SECOND as f64).round() as i64)
    }

    /// Convert frame index to time given a frame rate
    #[inline]
    pub fn from_frame_index(frame_index: usize, fps: f64) -> Self {
        Self::from_seconds(frame_index as f64 / fps)
    }

    #[inline]
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn as_micros(self) -> i64 {
        self.0 / NANOS_PER_MICRO
    }

    #[inline]
    pub const fn as_millis(self) -> i64 {
        self.0 / NANOS_PER_MILLI
    }

    #[inline]
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / NANOS_PER_SECOND as f64
    }

    /// Convert time to frame index given a frame rate. Negative times map to frame 0.
    #[inline]
    pub fn to_frame_index(self, fps: f64) -> usize {
        (self.as_seconds() * fps).floor().max(0.0) as usize
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Restrict to `[min, max]`. Unlike `Ord::clamp` this never panics: an
    /// empty range (`min > max`) yields `min`.
    pub fn clamp(self, min: TimeValue, max: TimeValue) -> TimeValue {
        if self < min || min > max {
            min
        } else if self > max {
            max
        } else {
            self
        }
    }

    pub fn saturating_add(self, delta: TimeValue) -> TimeValue {
        Self(self.0.saturating_add(delta.0))
    }

    pub fn saturating_sub(self, delta: TimeValue) -> TimeValue {
        Self(self.0.saturating_sub(delta.0))
    }

    pub fn checked_add(self, delta: TimeValue) -> Option<TimeValue> {
        self.0.checked_add(delta.0).map(Self)
    }

    /// Distance between two values, always non-negative.
    pub fn abs_diff(self, other: TimeValue) -> TimeValue {
        Self(self.0.abs_diff(other.0).min(i64::MAX as u64) as i64)
    }

    /// Format as `HH:MM:SS.fff` with `precision` fraction digits (0 to 9).
    /// The fraction is truncated, never rounded up into the next second.
    pub fn format_with_precision(self, precision: usize) -> String {
        let precision = precision.min(MAX_PRECISION);
        let sign = if self.0 < 0 { "-" } else { "" };
        let nanos = self.0.unsigned_abs();
        let per_second = NANOS_PER_SECOND as u64;

        let total_seconds = nanos / per_second;
        let hours = total_seconds / SECONDS_PER_HOUR as u64;
        let minutes = (total_seconds % SECONDS_PER_HOUR as u64) / SECONDS_PER_MINUTE as u64;
        let seconds = total_seconds % SECONDS_PER_MINUTE as u64;

        if precision == 0 {
            return format!("{sign}{hours:02}:{minutes:02}:{seconds:02}");
        }
        let fraction = (nanos % per_second) / 10u64.pow((MAX_PRECISION - precision) as u32);
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{fraction:0precision$}")
    }

    /// Parse `H:MM:SS.fraction`, `MM:SS.fraction` or `SS.fraction`.
    ///
    /// The leading field is unbounded; inner fields must be below 60. Fraction
    /// digits beyond nanosecond resolution are truncated.
    pub fn parse(text: &str) -> Result<TimeValue, TimeFormatError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TimeFormatError::Empty);
        }
        let malformed = || TimeFormatError::MalformedSeparator(trimmed.to_string());

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let fields: Vec<&str> = body.split(':').collect();
        if fields.len() > 3 {
            return Err(malformed());
        }
        let (last, leading) = fields.split_last().ok_or_else(malformed)?;

        let (whole, fraction) = match last.split_once('.') {
            Some((whole, fraction)) => {
                if fraction.is_empty() || fraction.contains('.') {
                    return Err(malformed());
                }
                (whole, Some(fraction))
            }
            None => (*last, None),
        };

        let mut values = Vec::with_capacity(fields.len());
        for field in leading.iter().chain(std::iter::once(&whole)) {
            values.push(parse_field(field, trimmed)?);
        }

        // Inner fields are bounded by the field above them.
        let names: &[&'static str] = match values.len() {
            3 => &["hours", "minutes", "seconds"],
            2 => &["minutes", "seconds"],
            _ => &["seconds"],
        };
        for (index, (&value, &name)) in values.iter().zip(names).enumerate() {
            if index > 0 && value >= SECONDS_PER_MINUTE {
                return Err(TimeFormatError::FieldOutOfRange { field: name, value });
            }
        }

        let mut total_seconds: i64 = 0;
        for value in &values {
            total_seconds = total_seconds
                .checked_mul(SECONDS_PER_MINUTE)
                .and_then(|s| s.checked_add(*value))
                .ok_or(TimeFormatError::Overflow)?;
        }

        let fraction_nanos = match fraction {
            Some(digits) => parse_fraction(digits)?,
            None => 0,
        };

        let nanos = total_seconds
            .checked_mul(NANOS_PER_SECOND)
            .and_then(|n| n.checked_add(fraction_nanos))
            .ok_or(TimeFormatError::Overflow)?;

        Ok(TimeValue(if negative { -nanos } else { nanos }))
    }
}

fn parse_field(field: &str, whole_text: &str) -> Result<i64, TimeFormatError> {
    if field.is_empty() {
        return Err(TimeFormatError::MalformedSeparator(whole_text.to_string()));
    }
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeFormatError::NonNumeric(field.to_string()));
    }
    field.parse::<i64>().map_err(|_| TimeFormatError::Overflow)
}

fn parse_fraction(digits: &str) -> Result<i64, TimeFormatError> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeFormatError::NonNumeric(digits.to_string()));
    }
    let kept = &digits[..digits.len().min(MAX_PRECISION)];
    let value: i64 = kept.parse().map_err(|_| TimeFormatError::Overflow)?;
    Ok(value * 10i64.pow((MAX_PRECISION - kept.len()) as u32))
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(DEFAULT_PRECISION);
        f.write_str(&self.format_with_precision(precision))
    }
}

impl FromStr for TimeValue {
    type Err = TimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeValue::parse(s)
    }
}

impl Add for TimeValue {
    type Output = TimeValue;

    fn add(self, rhs: TimeValue) -> TimeValue {
        TimeValue(self.0 + rhs.0)
    }
}

impl Sub for TimeValue {
    type Output = TimeValue;

    fn sub(self, rhs: TimeValue) -> TimeValue {
        TimeValue(self.0 - rhs.0)
    }
}

impl Neg for TimeValue {
    type Output = TimeValue;

    fn neg(self) -> TimeValue {
        TimeValue(-self.0)
    }
}
