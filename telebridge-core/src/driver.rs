//! Stream driver: the bridge run loop
//!
//! ## Lifecycle
//!
//! ```text
//! Starting ──start()──→ Running ──signal──→ Stopping ──→ Stopped
//!    │
//!    └── transport/sink open failure → StartupError (no loop iteration)
//! ```
//!
//! - **Starting**: open the transport, open or create the sink, write the
//!   sensor label. Only the two opens can fail the start.
//! - **Running**: one bounded read per iteration. No data → short pause.
//!   Transient error → report, longer pause. Data → every completed line is
//!   validated, gated and written before the run-flag is looked at again.
//! - **Stopping/Stopped**: `run` owns the driver, so both handles are dropped
//!   exactly once when it returns.
//!
//! The run-flag is only polled between iterations. A shutdown request that
//! arrives during a read takes effect once that read returns, so the stop
//! latency is bounded by the transport's read timeout.

use std::fmt;
use std::string::{String, ToString};
use std::thread;
use std::time::Duration;
use std::vec;
use std::vec::Vec;

use crate::{
    constants::{
        DEFAULT_ERROR_BACKOFF_MS, DEFAULT_IDLE_BACKOFF_MS, DEFAULT_MAX_LINE_LEN,
        DEFAULT_READ_BUFFER_LEN, DEFAULT_SENSOR_LABEL,
    },
    errors::StartupError,
    pipeline::{PipelineStats, ReadingPipeline},
    shutdown::ShutdownSignal,
    stream::LineAssembler,
    traits::{KeyValueSink, Transport},
    writer::StoreWriter,
};

/// Driver lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Resources acquired, loop not entered yet
    Starting,
    /// Reading and processing lines
    Running,
    /// Run-flag cleared, releasing resources
    Stopping,
    /// Transport and sink released
    Stopped,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Run loop configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    /// Label written to the `Name` entry at startup
    pub label: String,
    /// Bytes requested per read
    pub read_buffer_len: usize,
    /// Pause after a read without data
    pub idle_backoff: Duration,
    /// Pause after a transient read error
    pub error_backoff: Duration,
    /// Longest partial line kept; `None` disables the limit
    pub max_line_len: Option<usize>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_SENSOR_LABEL.to_string(),
            read_buffer_len: DEFAULT_READ_BUFFER_LEN,
            idle_backoff: Duration::from_millis(DEFAULT_IDLE_BACKOFF_MS),
            error_backoff: Duration::from_millis(DEFAULT_ERROR_BACKOFF_MS),
            max_line_len: Some(DEFAULT_MAX_LINE_LEN),
        }
    }
}

impl DriverConfig {
    /// Set the sensor label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set bytes requested per read (at least 1)
    pub fn with_read_buffer_len(mut self, len: usize) -> Self {
        self.read_buffer_len = len.max(1);
        self
    }

    /// Set pause after a read without data
    pub fn with_idle_backoff(mut self, backoff: Duration) -> Self {
        self.idle_backoff = backoff;
        self
    }

    /// Set pause after a transient read error
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Set or remove the partial line limit
    pub fn with_max_line_len(mut self, max: Option<usize>) -> Self {
        self.max_line_len = max;
        self
    }
}

/// Counters for a whole run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DriverStats {
    /// Read attempts
    pub reads: usize,
    /// Reads that returned no data
    pub idle_polls: usize,
    /// Reads that failed
    pub read_errors: usize,
    /// Bytes received
    pub bytes_read: usize,
    /// Partial lines dropped for exceeding the length limit
    pub overflowed_lines: usize,
    /// Per-line counters
    pub pipeline: PipelineStats,
}

/// Result of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Bytes received and their lines processed
    Data {
        /// Bytes in the chunk
        bytes: usize,
        /// Lines the chunk completed
        lines: usize,
    },
    /// Read returned no data
    Idle,
    /// Read failed
    ReadError,
}

/// The bridge run loop
///
/// ## Example
///
/// ```rust
/// use telebridge_core::memory::{MemorySink, MemoryTransport, ReadStep};
/// use telebridge_core::{BridgeDriver, DriverConfig, ShutdownSignal};
///
/// let signal = ShutdownSignal::new();
/// let transport = MemoryTransport::new(vec![ReadStep::data("10\n10\n20\n10\n")])
///     .stop_when_exhausted(signal.clone());
/// let sink = MemorySink::new("Sensors/Temp0");
/// let probe = sink.probe();
///
/// let driver = BridgeDriver::start(
///     DriverConfig::default(),
///     || Ok::<_, String>(transport),
///     || Ok::<_, String>(sink),
/// )?;
/// let stats = driver.run(&signal);
///
/// assert_eq!(probe.values(), ["10", "20", "10"]);
/// assert_eq!(stats.pipeline.suppressed, 1);
/// # Ok::<(), telebridge_core::StartupError>(())
/// ```
pub struct BridgeDriver<T: Transport, S: KeyValueSink> {
    config: DriverConfig,
    transport: T,
    pipeline: ReadingPipeline<S>,
    assembler: LineAssembler,
    read_buf: Vec<u8>,
    state: DriverState,
    stats: DriverStats,
}

impl<T: Transport, S: KeyValueSink> BridgeDriver<T, S> {
    /// Acquire the transport and sink, then write the sensor label
    ///
    /// The transport is opened first. If the sink cannot be opened the
    /// transport is released before the error is returned.
    pub fn start<FT, FS, ET, ES>(
        config: DriverConfig,
        open_transport: FT,
        open_sink: FS,
    ) -> Result<Self, StartupError>
    where
        FT: FnOnce() -> Result<T, ET>,
        FS: FnOnce() -> Result<S, ES>,
        ET: fmt::Display,
        ES: fmt::Display,
    {
        let transport = open_transport().map_err(|e| {
            log::error!("Cannot open transport: {}", e);
            StartupError::Transport(e.to_string())
        })?;
        log::info!("Opened {}", transport.describe());

        let sink = open_sink().map_err(|e| {
            log::error!("Cannot create sink location: {}", e);
            StartupError::Sink(e.to_string())
        })?;

        let mut pipeline = ReadingPipeline::new(StoreWriter::new(sink));
        // Metadata is a convenience for the monitor; values flow without it
        let _ = pipeline.initialize(&config.label);
        log::info!(
            "Sensor store {} ready. Listening for lines...",
            pipeline.writer().sink().location()
        );

        let mut assembler = LineAssembler::new();
        if let Some(max) = config.max_line_len {
            assembler = assembler.with_max_line_len(max);
        }

        Ok(Self {
            read_buf: vec![0; config.read_buffer_len.max(1)],
            config,
            transport,
            pipeline,
            assembler,
            state: DriverState::Starting,
            stats: DriverStats::default(),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Counters so far
    pub fn stats(&self) -> DriverStats {
        let mut stats = self.stats.clone();
        stats.overflowed_lines = self.assembler.stats().overflowed_lines;
        stats.pipeline = self.pipeline.stats().clone();
        stats
    }

    /// Active configuration
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Loop until `signal` is triggered, then release everything
    pub fn run(mut self, signal: &ShutdownSignal) -> DriverStats {
        self.transition(DriverState::Running);

        while signal.is_running() {
            match self.step() {
                Step::Idle => thread::sleep(self.config.idle_backoff),
                Step::ReadError => thread::sleep(self.config.error_backoff),
                Step::Data { .. } => {}
            }
        }

        self.transition(DriverState::Stopping);
        log::info!("Shutting down...");
        let stats = self.stats();

        let Self { transport, pipeline, state, .. } = self;
        drop(pipeline);
        drop(transport);
        let state = Self::next_state(state, DriverState::Stopped);

        log::info!(
            "Exit complete ({}): {} reads, {} lines, {} values written, {} write failures",
            state,
            stats.reads,
            stats.pipeline.lines,
            stats.pipeline.writes,
            stats.pipeline.write_failures,
        );
        stats
    }

    /// One loop iteration without the backoff pause
    pub fn step(&mut self) -> Step {
        self.stats.reads += 1;

        match self.transport.read_chunk(&mut self.read_buf) {
            Ok(0) | Err(nb::Error::WouldBlock) => {
                self.stats.idle_polls += 1;
                Step::Idle
            }
            Ok(n) => {
                self.stats.bytes_read += n;
                let mut lines = 0;
                for line in self.assembler.feed(&self.read_buf[..n]) {
                    self.pipeline.process_line(&line);
                    lines += 1;
                }
                Step::Data { bytes: n, lines }
            }
            Err(nb::Error::Other(e)) => {
                self.stats.read_errors += 1;
                log::error!("Read from {} failed: {}", self.transport.describe(), e);
                Step::ReadError
            }
        }
    }

    fn transition(&mut self, next: DriverState) {
        self.state = Self::next_state(self.state, next);
    }

    fn next_state(from: DriverState, to: DriverState) -> DriverState {
        debug_assert!(
            matches!(
                (from, to),
                (DriverState::Starting, DriverState::Running)
                    | (DriverState::Running, DriverState::Stopping)
                    | (DriverState::Stopping, DriverState::Stopped)
            ),
            "invalid transition {} -> {}",
            from,
            to
        );
        log::debug!("Driver {} -> {}", from, to);
        to
    }
}

impl<T, S> fmt::Debug for BridgeDriver<T, S>
where
    T: Transport,
    S: KeyValueSink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeDriver")
            .field("transport", &self.transport.describe())
            .field("sink", &self.pipeline.writer().sink().location())
            .field("state", &self.state)
            .field("pending", &self.assembler.pending_len())
            .finish()
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::memory::{MemorySink, MemoryTransport, ReadStep};

    fn quick() -> DriverConfig {
        DriverConfig::default()
            .with_idle_backoff(Duration::ZERO)
            .with_error_backoff(Duration::ZERO)
    }

    #[test]
    fn start_leaves_driver_in_starting_state() {
        let driver = BridgeDriver::start(
            quick(),
            || Ok::<_, String>(MemoryTransport::new(vec![])),
            || Ok::<_, String>(MemorySink::new("k")),
        )
        .unwrap();

        assert_eq!(driver.state(), DriverState::Starting);
        assert_eq!(driver.stats(), DriverStats::default());
    }

    #[test]
    fn step_reports_each_read_kind() {
        let mut driver = BridgeDriver::start(
            quick(),
            || {
                Ok::<_, String>(MemoryTransport::new(vec![
                    ReadStep::Idle,
                    ReadStep::Fail("parity".into()),
                    ReadStep::data("1\n2\n3"),
                    ReadStep::data(""),
                ]))
            },
            || Ok::<_, String>(MemorySink::new("k")),
        )
        .unwrap();

        assert_eq!(driver.step(), Step::Idle);
        assert_eq!(driver.step(), Step::ReadError);
        assert_eq!(driver.step(), Step::Data { bytes: 5, lines: 2 });
        assert_eq!(driver.step(), Step::Idle);

        let stats = driver.stats();
        assert_eq!(stats.reads, 4);
        assert_eq!(stats.idle_polls, 2);
        assert_eq!(stats.read_errors, 1);
        assert_eq!(stats.pipeline.writes, 2);
    }

    #[test]
    fn config_builder() {
        let config = DriverConfig::default()
            .with_label("Coolant")
            .with_read_buffer_len(0)
            .with_max_line_len(None);

        assert_eq!(config.label, "Coolant");
        assert_eq!(config.read_buffer_len, 1);
        assert_eq!(config.max_line_len, None);
        assert_eq!(config.idle_backoff, Duration::from_millis(10));
        assert_eq!(config.error_backoff, Duration::from_millis(50));
    }
}
