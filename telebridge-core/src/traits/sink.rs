//! Key-Value Sink Trait
//!
//! The sink is the persistent location a monitoring application reads from.
//! It is addressed by a path fixed when the sink is opened, plus an entry name
//! per write. Values are always strings so the monitor shows exactly the text
//! the sensor reported.

use core::fmt;

/// Persistent string-valued store rooted at one path
///
/// ## Implementation Notes
///
/// - Opening a sink creates its path if it does not exist yet
/// - `write_string` must also recreate the path if it vanished since opening
/// - Writes overwrite any previous value under the same name
/// - Releasing the underlying handle happens in `Drop`
pub trait KeyValueSink {
    /// Write failure
    type Error: fmt::Display;

    /// Write or overwrite `name = value` at the sink's path
    fn write_string(&mut self, name: &str, value: &str) -> Result<(), Self::Error>;

    /// Path of the sink, used in logs
    fn location(&self) -> &str;
}

impl<S: KeyValueSink + ?Sized> KeyValueSink for alloc::boxed::Box<S> {
    type Error = S::Error;

    fn write_string(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        (**self).write_string(name, value)
    }

    fn location(&self) -> &str {
        (**self).location()
    }
}
