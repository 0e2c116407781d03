//! Reading validator for raw sensor lines
//!
//! Turns a [`RawLine`] into a [`Reading`]:
//! - Strips the terminator and trims `isspace` padding
//! - Skips blank lines without complaint
//! - Requires the trimmed text to be one decimal literal and nothing else
//! - Keeps the trimmed text verbatim as the canonical form

use alloc::string::{String, ToString};
use core::fmt;

use crate::{
    errors::{ReadingError, ReadingResult},
    stream::RawLine,
};

use super::utils;

/// A validated numeric reading
///
/// The canonical text is what the sensor sent, minus padding. It is never
/// re-serialized from `value`, so `"20.50"` stays `"20.50"` in the sink.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    value: f64,
    text: String,
}

impl Reading {
    /// Parsed numeric value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Canonical text form
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Take the canonical text
    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Validator for line-oriented numeric sensor output
///
/// ```rust
/// use telebridge_core::{ReadingValidator, RawLine};
///
/// let validator = ReadingValidator::new();
///
/// let reading = validator.validate(&RawLine::from(&b"  42  \n"[..])).unwrap().unwrap();
/// assert_eq!(reading.text(), "42");
///
/// assert!(validator.validate(&RawLine::from(&b" \t\n"[..])).unwrap().is_none());
/// assert!(validator.validate(&RawLine::from(&b"12.5 extra\n"[..])).is_err());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadingValidator;

impl ReadingValidator {
    /// Create validator
    pub fn new() -> Self {
        Self
    }

    /// Validate one raw line
    ///
    /// Returns:
    /// - `Ok(Some(reading))`: the line is a number
    /// - `Ok(None)`: the line is blank after trimming
    /// - `Err(e)`: the line carries something other than one number
    pub fn validate(&self, line: &RawLine) -> ReadingResult<Option<Reading>> {
        let text = core::str::from_utf8(line.content()).map_err(|_| ReadingError::NotUtf8)?;
        self.validate_text(text)
    }

    /// Validate already-decoded line text (terminator optional)
    pub fn validate_text(&self, text: &str) -> ReadingResult<Option<Reading>> {
        let trimmed = utils::trim_space(text);
        if trimmed.is_empty() {
            return Ok(None);
        }

        let literal_len = utils::decimal_prefix_len(trimmed.as_bytes());
        let (literal, rest) = trimmed.split_at(literal_len);

        if literal.is_empty() || !rest.bytes().all(utils::is_space) {
            return Err(ReadingError::NotNumeric { text: trimmed.to_string() });
        }

        let value = literal
            .parse::<f64>()
            .map_err(|_| ReadingError::NotNumeric { text: trimmed.to_string() })?;

        // Subnormal results and nonzero literals rounded to zero are underflow
        let underflow = (value != 0.0 && !value.is_normal())
            || (value == 0.0 && utils::mantissa_is_nonzero(literal));
        if !value.is_finite() || underflow {
            return Err(ReadingError::OutOfRange { text: trimmed.to_string() });
        }

        Ok(Some(Reading { value, text: trimmed.to_string() }))
    }
}
