//! Error Types for the Telemetry Bridge
//!
//! ## Error Categories
//!
//! The bridge distinguishes four kinds of failure, and only one of them is
//! allowed to end the process:
//!
//! ### Fatal (startup)
//! - `StartupError::Transport`: the byte source cannot be opened or configured
//! - `StartupError::Sink`: the persistent store location cannot be created
//!
//! ### Transient (read)
//! - Reported by the [`Transport`](crate::traits::Transport) implementation
//!   through `nb::Error::Other`. The driver logs it, backs off and keeps going.
//!
//! ### Transient (write)
//! - `WriteError`: a single store write failed. Logged, never retried for the
//!   same value.
//!
//! ### Data validation
//! - `ReadingError`: a line did not parse as a number. Logged at info level and
//!   dropped.
//!
//! ```rust
//! use telebridge_core::{ReadingValidator, ReadingError, RawLine};
//!
//! let validator = ReadingValidator::new();
//! let line = RawLine::from(&b"12.5 extra\n"[..]);
//!
//! match validator.validate(&line) {
//!     Ok(Some(reading)) => println!("reading {}", reading.text()),
//!     Ok(None) => {} // blank line
//!     Err(ReadingError::NotNumeric { .. }) => {} // dropped
//!     Err(_) => {}
//! }
//! ```

use alloc::string::String;

use thiserror_no_std::Error;

/// Result type for line validation
pub type ReadingResult<T> = Result<T, ReadingError>;

/// Reasons a line is rejected by the validator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadingError {
    /// Line bytes are not valid UTF-8
    #[error("line is not valid UTF-8")]
    NotUtf8,

    /// Trimmed text is not entirely a decimal literal
    #[error("non-numeric line: {text}")]
    NotNumeric {
        /// The trimmed line text
        text: String,
    },

    /// Literal is well formed but does not fit a finite `f64`
    #[error("numeric value out of range: {text}")]
    OutOfRange {
        /// The trimmed line text
        text: String,
    },
}

/// A single failed store write
#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to write {name}: {reason}")]
pub struct WriteError {
    /// Entry name that was being written
    pub name: &'static str,
    /// Human-readable failure from the sink
    pub reason: String,
}

/// Failures that abort startup before the read loop begins
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StartupError {
    /// Transport could not be opened or configured
    #[error("cannot open transport: {0}")]
    Transport(String),

    /// Sink location could not be created or opened
    #[error("cannot create sink location: {0}")]
    Sink(String),
}
