//! Change-detection gate
//!
//! Sensors repeat themselves: a temperature probe printing once a second will
//! send the same value for minutes. The gate lets a reading through only when
//! its canonical text differs from the last one forwarded, so the store sees
//! one write per change.

use alloc::string::String;

use crate::validators::Reading;

/// Decision for one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Differs from the last written value, write it
    Forwarded,
    /// Same as the last written value, drop it
    Suppressed,
}

/// Suppresses consecutive duplicate readings
///
/// The last value is advanced *before* the caller attempts the write. A write
/// that fails is therefore not retried when the sensor repeats the value; it
/// is retried only after a different value has been seen in between.
///
/// ```rust
/// use telebridge_core::{Admission, ChangeGate, ReadingValidator};
///
/// let validator = ReadingValidator::new();
/// let mut gate = ChangeGate::new();
/// let mut admit = |text: &str| {
///     let reading = validator.validate_text(text).unwrap().unwrap();
///     gate.admit(&reading)
/// };
///
/// assert_eq!(admit("10"), Admission::Forwarded);
/// assert_eq!(admit("10"), Admission::Suppressed);
/// assert_eq!(admit("20"), Admission::Forwarded);
/// assert_eq!(admit("10"), Admission::Forwarded);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ChangeGate {
    last_written: Option<String>,
}

impl ChangeGate {
    /// Create gate with no prior value
    pub fn new() -> Self {
        Self { last_written: None }
    }

    /// Decide whether `reading` must be written
    pub fn admit(&mut self, reading: &Reading) -> Admission {
        if self.last_written.as_deref() == Some(reading.text()) {
            return Admission::Suppressed;
        }

        match &mut self.last_written {
            Some(last) => {
                last.clear();
                last.push_str(reading.text());
            }
            None => self.last_written = Some(String::from(reading.text())),
        }
        Admission::Forwarded
    }

    /// Canonical text of the last forwarded reading
    pub fn last_written(&self) -> Option<&str> {
        self.last_written.as_deref()
    }

    /// Forget the last value so the next reading is always forwarded
    pub fn reset(&mut self) {
        self.last_written = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::ReadingValidator;

    fn reading(text: &str) -> Reading {
        ReadingValidator::new().validate_text(text).unwrap().unwrap()
    }

    #[test]
    fn first_reading_always_forwarded() {
        let mut gate = ChangeGate::new();
        assert_eq!(gate.last_written(), None);
        assert_eq!(gate.admit(&reading("0")), Admission::Forwarded);
        assert_eq!(gate.last_written(), Some("0"));
    }

    #[test]
    fn compares_text_not_value() {
        let mut gate = ChangeGate::new();
        assert_eq!(gate.admit(&reading("20.5")), Admission::Forwarded);
        // Same number, different text: the sink must show the new text
        assert_eq!(gate.admit(&reading("20.50")), Admission::Forwarded);
        assert_eq!(gate.admit(&reading("20.50")), Admission::Suppressed);
    }

    #[test]
    fn reset_forgets_last_value() {
        let mut gate = ChangeGate::new();
        gate.admit(&reading("7"));
        gate.reset();
        assert_eq!(gate.admit(&reading("7")), Admission::Forwarded);
    }
}
