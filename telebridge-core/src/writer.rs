//! Store writer
//!
//! Owns the sink and knows the two entries the monitoring side reads:
//! `Name` (sensor label, written once) and `Value` (last distinct reading).
//! Every failure here is reported to the caller and never retried.

use alloc::string::ToString;

use crate::{
    constants::store::{NAME_ENTRY, VALUE_ENTRY},
    errors::WriteError,
    traits::KeyValueSink,
};

/// Write counters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriterStats {
    /// Successful writes, metadata included
    pub writes: usize,
    /// Failed writes, metadata included
    pub failures: usize,
}

/// Writes sensor entries to a [`KeyValueSink`]
#[derive(Debug)]
pub struct StoreWriter<S: KeyValueSink> {
    sink: S,
    stats: WriterStats,
}

impl<S: KeyValueSink> StoreWriter<S> {
    /// Wrap an opened sink
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            stats: WriterStats::default(),
        }
    }

    /// Write the sensor label to the `Name` entry
    pub fn initialize(&mut self, label: &str) -> Result<(), WriteError> {
        self.write(NAME_ENTRY, label)
    }

    /// Write a reading's canonical text to the `Value` entry
    pub fn write_value(&mut self, text: &str) -> Result<(), WriteError> {
        self.write(VALUE_ENTRY, text)
    }

    /// Get statistics
    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    /// Borrow the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Give the sink back
    pub fn into_inner(self) -> S {
        self.sink
    }

    fn write(&mut self, name: &'static str, value: &str) -> Result<(), WriteError> {
        match self.sink.write_string(name, value) {
            Ok(()) => {
                self.stats.writes += 1;
                Ok(())
            }
            Err(e) => {
                self.stats.failures += 1;
                Err(WriteError { name, reason: e.to_string() })
            }
        }
    }
}
