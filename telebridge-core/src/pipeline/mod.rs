//! Per-Line Processing Pipeline
//!
//! ## Overview
//!
//! Every complete line from the assembler goes through the same three stages:
//!
//! ```text
//! RawLine → ReadingValidator → ChangeGate → StoreWriter → sink
//!              ↓                   ↓             ↓
//!         Blank / Rejected     Suppressed    Written / WriteFailed
//! ```
//!
//! [`ReadingPipeline`] owns those stages and reports what happened to each
//! line as a [`LineOutcome`]. Nothing in here is fatal: rejected lines and
//! failed writes are logged and counted, and the next line is processed as
//! usual.

use crate::{
    errors::WriteError,
    gate::{Admission, ChangeGate},
    stream::RawLine,
    traits::KeyValueSink,
    validators::ReadingValidator,
    writer::StoreWriter,
};

/// What happened to one line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Blank after trimming, skipped silently
    Blank,
    /// Not a number, dropped
    Rejected,
    /// Same value as the last write, dropped
    Suppressed,
    /// New value written to the sink
    Written,
    /// New value, but the write failed
    WriteFailed(WriteError),
}

/// Per-line counters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineStats {
    /// Lines received from the assembler
    pub lines: usize,
    /// Lines blank after trimming
    pub blank_lines: usize,
    /// Lines rejected by the validator
    pub rejected_lines: usize,
    /// Valid readings
    pub readings: usize,
    /// Readings dropped as repeats
    pub suppressed: usize,
    /// Successful value writes
    pub writes: usize,
    /// Failed value writes
    pub write_failures: usize,
}

/// Validator, gate and writer wired in order
#[derive(Debug)]
pub struct ReadingPipeline<S: KeyValueSink> {
    validator: ReadingValidator,
    gate: ChangeGate,
    writer: StoreWriter<S>,
    stats: PipelineStats,
}

impl<S: KeyValueSink> ReadingPipeline<S> {
    /// Build a pipeline that writes through `writer`
    pub fn new(writer: StoreWriter<S>) -> Self {
        Self {
            validator: ReadingValidator::new(),
            gate: ChangeGate::new(),
            writer,
            stats: PipelineStats::default(),
        }
    }

    /// Write the sensor label; failure is logged and otherwise ignored
    pub fn initialize(&mut self, label: &str) -> Result<(), WriteError> {
        let result = self.writer.initialize(label);
        match &result {
            Ok(()) => log::debug!("Wrote Name: {}", label),
            Err(e) => log::warn!("{}", e),
        }
        result
    }

    /// Push one line through validation, change detection and the writer
    pub fn process_line(&mut self, line: &RawLine) -> LineOutcome {
        self.stats.lines += 1;
        log::trace!("Line: {:?}", line.as_bytes());

        let reading = match self.validator.validate(line) {
            Ok(Some(reading)) => reading,
            Ok(None) => {
                self.stats.blank_lines += 1;
                return LineOutcome::Blank;
            }
            Err(e) => {
                self.stats.rejected_lines += 1;
                log::info!("Ignored line: {}", e);
                return LineOutcome::Rejected;
            }
        };
        self.stats.readings += 1;

        if self.gate.admit(&reading) == Admission::Suppressed {
            self.stats.suppressed += 1;
            log::debug!("Unchanged value {}", reading);
            return LineOutcome::Suppressed;
        }

        match self.writer.write_value(reading.text()) {
            Ok(()) => {
                self.stats.writes += 1;
                log::info!("Wrote Value: {} to {}", reading, self.writer.sink().location());
                LineOutcome::Written
            }
            Err(e) => {
                self.stats.write_failures += 1;
                log::error!("{}", e);
                LineOutcome::WriteFailed(e)
            }
        }
    }

    /// Get statistics
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Canonical text of the last value handed to the writer
    pub fn last_written(&self) -> Option<&str> {
        self.gate.last_written()
    }

    /// Borrow the writer
    pub fn writer(&self) -> &StoreWriter<S> {
        &self.writer
    }

    /// Give the writer (and with it the sink) back
    pub fn into_writer(self) -> StoreWriter<S> {
        self.writer
    }
}

#[cfg(all(test, feature = "memory", feature = "std"))]
mod tests {
    use super::*;
    use crate::memory::MemorySink;
    use crate::memory::SinkProbe;

    fn pipeline() -> (ReadingPipeline<MemorySink>, SinkProbe) {
        let sink = MemorySink::new("Sensors/Temp0");
        let probe = sink.probe();
        (ReadingPipeline::new(StoreWriter::new(sink)), probe)
    }

    fn line(text: &str) -> RawLine {
        RawLine::from(text.as_bytes())
    }

    #[test]
    fn repeats_write_once() {
        let (mut pipeline, probe) = pipeline();

        for text in ["10\n", "10\n", "20\n", "10\n"] {
            pipeline.process_line(&line(text));
        }

        assert_eq!(probe.values(), vec!["10".to_string(), "20".to_string(), "10".to_string()]);
        assert_eq!(pipeline.stats().suppressed, 1);
        assert_eq!(pipeline.stats().writes, 3);
    }

    #[test]
    fn outcomes() {
        let (mut pipeline, _probe) = pipeline();

        assert_eq!(pipeline.process_line(&line("  \n")), LineOutcome::Blank);
        assert_eq!(pipeline.process_line(&line("12.5 extra\n")), LineOutcome::Rejected);
        assert_eq!(pipeline.process_line(&line("  42  \n")), LineOutcome::Written);
        assert_eq!(pipeline.process_line(&line("42\n")), LineOutcome::Suppressed);
        assert_eq!(pipeline.last_written(), Some("42"));
    }

    #[test]
    fn failed_write_is_not_retried_for_same_value() {
        let (mut pipeline, probe) = pipeline();

        probe.fail_next(1);
        assert!(matches!(
            pipeline.process_line(&line("5\n")),
            LineOutcome::WriteFailed(_)
        ));
        assert_eq!(pipeline.process_line(&line("5\n")), LineOutcome::Suppressed);
        assert_eq!(pipeline.process_line(&line("6\n")), LineOutcome::Written);
        assert_eq!(pipeline.process_line(&line("5\n")), LineOutcome::Written);

        assert_eq!(probe.values(), vec!["6".to_string(), "5".to_string()]);
        assert_eq!(pipeline.stats().write_failures, 1);
    }

    #[test]
    fn metadata_failure_is_non_fatal() {
        let (mut pipeline, probe) = pipeline();
        probe.fail_entry("Name");

        assert!(pipeline.initialize("Temperature").is_err());
        assert_eq!(pipeline.process_line(&line("1\n")), LineOutcome::Written);
    }
}
