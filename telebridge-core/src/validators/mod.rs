//! Line Validators
//!
//! A raw line from the sensor is accepted only if, after trimming, it is
//! exactly one decimal number. Everything else is dropped:
//!
//! | Line            | Outcome                     |
//! |-----------------|-----------------------------|
//! | `"  42  \n"`    | Reading `"42"`              |
//! | `"-3.14\r\n"`   | Reading `"-3.14"`           |
//! | `" \t\n"`       | Skipped silently            |
//! | `"12.5 extra\n"`| Rejected, reported          |
//! | `"5 6\n"`       | Rejected, reported          |
//!
//! The canonical text of a reading is the trimmed input, byte for byte. The
//! monitoring side shows exactly what the sensor printed.

pub mod reading;
pub mod utils;

pub use reading::{Reading, ReadingValidator};
