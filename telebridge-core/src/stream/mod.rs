//! Stream processing for raw sensor bytes
//!
//! The transport hands over arbitrary byte chunks; this module turns them
//! into complete lines. See [`LineAssembler`] for the buffering rules.

pub mod lines;

pub use lines::{AssemblerStats, LineAssembler, Lines, RawLine};
