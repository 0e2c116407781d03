//! In-memory transport and sink for testing and replay
//!
//! This module provides scripted doubles for both boundaries of the bridge:
//! - [`MemoryTransport`] plays back a fixed list of read results
//! - [`MemorySink`] records every write in a shared map
//!
//! Both hand out probes (cheap clones of their shared state) so a test can
//! keep inspecting them after the driver has taken ownership, and after the
//! driver has dropped them.
//!
//! ## Example
//!
//! ```rust
//! use telebridge_core::memory::{MemorySink, MemoryTransport, ReadStep};
//! use telebridge_core::{BridgeDriver, DriverConfig, ShutdownSignal};
//!
//! let signal = ShutdownSignal::new();
//! let transport = MemoryTransport::new(vec![
//!     ReadStep::data("21."),
//!     ReadStep::data("5\n21.5\n22\n"),
//! ])
//! .stop_when_exhausted(signal.clone());
//! let sink = MemorySink::new("Sensors/Temp0");
//! let probe = sink.probe();
//!
//! let driver = BridgeDriver::start(
//!     DriverConfig::default(),
//!     || Ok::<_, std::io::Error>(transport),
//!     || Ok::<_, std::io::Error>(sink),
//! )
//! .unwrap();
//! driver.run(&signal);
//!
//! assert_eq!(probe.values(), vec!["21.5".to_string(), "22".to_string()]);
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::string::String;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::vec::Vec;

use thiserror_no_std::Error;

use crate::{
    shutdown::ShutdownSignal,
    traits::{KeyValueSink, Transport},
};

/// Failure injected into a memory transport or sink
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct MemoryError(pub String);

/// One scripted result of `read_chunk`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStep {
    /// Bytes delivered by the read
    Data(Vec<u8>),
    /// Read timed out without data
    Idle,
    /// Read failed with a transient error
    Fail(String),
}

impl ReadStep {
    /// Data step from anything byte-like
    pub fn data(bytes: impl AsRef<[u8]>) -> Self {
        Self::Data(bytes.as_ref().to_vec())
    }
}

/// Counters shared between a memory transport and its probe
#[derive(Debug, Default)]
struct TransportCounters {
    reads: AtomicUsize,
    drops: AtomicUsize,
}

/// Observer for a [`MemoryTransport`]
#[derive(Debug, Clone)]
pub struct TransportProbe {
    counters: Arc<TransportCounters>,
}

impl TransportProbe {
    /// Number of `read_chunk` calls so far
    pub fn reads(&self) -> usize {
        self.counters.reads.load(Ordering::SeqCst)
    }

    /// Number of times the transport was dropped (released)
    pub fn drops(&self) -> usize {
        self.counters.drops.load(Ordering::SeqCst)
    }
}

/// Scripted byte source
///
/// Each call to `read_chunk` consumes the next [`ReadStep`]. Data longer than
/// the caller's buffer is split across reads. Once the script is exhausted,
/// every read reports no data.
#[derive(Debug)]
pub struct MemoryTransport {
    name: String,
    steps: VecDeque<ReadStep>,
    counters: Arc<TransportCounters>,
    stop_when_exhausted: Option<ShutdownSignal>,
    stop_on_read: Option<(usize, ShutdownSignal)>,
}

impl MemoryTransport {
    /// Create transport from a script
    pub fn new(steps: impl IntoIterator<Item = ReadStep>) -> Self {
        Self {
            name: String::from("memory"),
            steps: steps.into_iter().collect(),
            counters: Arc::new(TransportCounters::default()),
            stop_when_exhausted: None,
            stop_on_read: None,
        }
    }

    /// Name reported by `describe`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Trigger `signal` on the first read after the script runs out
    pub fn stop_when_exhausted(mut self, signal: ShutdownSignal) -> Self {
        self.stop_when_exhausted = Some(signal);
        self
    }

    /// Trigger `signal` while the `nth` read (1-based) is in flight
    ///
    /// The read still completes with its scripted result, which models a
    /// shutdown request arriving during a blocking read.
    pub fn stop_during_read(mut self, nth: usize, signal: ShutdownSignal) -> Self {
        self.stop_on_read = Some((nth, signal));
        self
    }

    /// Observer sharing this transport's counters
    pub fn probe(&self) -> TransportProbe {
        TransportProbe {
            counters: Arc::clone(&self.counters),
        }
    }

    /// Steps not yet played
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl Transport for MemoryTransport {
    type Error = MemoryError;

    fn read_chunk(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
        let read_no = self.counters.reads.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some((nth, signal)) = &self.stop_on_read {
            if *nth == read_no {
                signal.trigger();
            }
        }

        match self.steps.pop_front() {
            Some(ReadStep::Data(mut bytes)) => {
                let n = buf.len().min(bytes.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    let rest = bytes.split_off(n);
                    self.steps.push_front(ReadStep::Data(rest));
                }
                Ok(n)
            }
            Some(ReadStep::Idle) => Err(nb::Error::WouldBlock),
            Some(ReadStep::Fail(reason)) => Err(nb::Error::Other(MemoryError(reason))),
            None => {
                if let Some(signal) = &self.stop_when_exhausted {
                    signal.trigger();
                }
                Err(nb::Error::WouldBlock)
            }
        }
    }

    fn describe(&self) -> &str {
        &self.name
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.counters.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct SinkState {
    entries: BTreeMap<String, String>,
    history: Vec<(String, String)>,
    fail_next: usize,
    fail_entries: Vec<String>,
    drops: usize,
}

/// Observer and fault injector for a [`MemorySink`]
#[derive(Debug, Clone)]
pub struct SinkProbe {
    state: Arc<Mutex<SinkState>>,
}

impl SinkProbe {
    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value of an entry
    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().entries.get(name).cloned()
    }

    /// Every successful write, in order
    pub fn history(&self) -> Vec<(String, String)> {
        self.lock().history.clone()
    }

    /// Successful writes to the `Value` entry, in order
    pub fn values(&self) -> Vec<String> {
        self.lock()
            .history
            .iter()
            .filter(|(name, _)| name == crate::constants::VALUE_ENTRY)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Fail the next `count` writes
    pub fn fail_next(&self, count: usize) {
        self.lock().fail_next = count;
    }

    /// Fail every write to `name`
    pub fn fail_entry(&self, name: impl Into<String>) {
        self.lock().fail_entries.push(name.into());
    }

    /// Number of times the sink was dropped (released)
    pub fn drops(&self) -> usize {
        self.lock().drops
    }
}

/// Recording key-value sink
#[derive(Debug)]
pub struct MemorySink {
    location: String,
    state: Arc<Mutex<SinkState>>,
}

impl MemorySink {
    /// Create an empty sink at `location`
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            state: Arc::new(Mutex::new(SinkState::default())),
        }
    }

    /// Observer sharing this sink's state
    pub fn probe(&self) -> SinkProbe {
        SinkProbe {
            state: Arc::clone(&self.state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueSink for MemorySink {
    type Error = MemoryError;

    fn write_string(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        let mut state = self.lock();

        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(MemoryError(format!("injected failure writing {}", name)));
        }
        if state.fail_entries.iter().any(|entry| entry == name) {
            return Err(MemoryError(format!("entry {} is read-only", name)));
        }

        state.entries.insert(name.into(), value.into());
        state.history.push((name.into(), value.into()));
        Ok(())
    }

    fn location(&self) -> &str {
        &self.location
    }
}

impl Drop for MemorySink {
    fn drop(&mut self) {
        self.lock().drops += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_splits_long_data() {
        let mut transport = MemoryTransport::new(vec![ReadStep::data("abcdef")]);
        let mut buf = [0u8; 4];

        assert_eq!(transport.read_chunk(&mut buf), Ok(4));
        assert_eq!(&buf, b"abcd");
        assert_eq!(transport.read_chunk(&mut buf), Ok(2));
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(transport.read_chunk(&mut buf), Err(nb::Error::WouldBlock));
        assert_eq!(transport.probe().reads(), 3);
    }

    #[test]
    fn transport_reports_failures_and_drops() {
        let transport = MemoryTransport::new(vec![ReadStep::Fail("framing".into())]);
        let probe = transport.probe();
        let mut transport = transport;
        let mut buf = [0u8; 8];

        assert_eq!(
            transport.read_chunk(&mut buf),
            Err(nb::Error::Other(MemoryError("framing".into())))
        );
        drop(transport);
        assert_eq!(probe.drops(), 1);
    }

    #[test]
    fn exhausted_script_triggers_signal() {
        let signal = ShutdownSignal::new();
        let mut transport = MemoryTransport::new(vec![]).stop_when_exhausted(signal.clone());
        let mut buf = [0u8; 8];

        assert!(signal.is_running());
        let _ = transport.read_chunk(&mut buf);
        assert!(!signal.is_running());
    }

    #[test]
    fn sink_records_and_fails_on_request() {
        let mut sink = MemorySink::new("Sensors/Temp0");
        let probe = sink.probe();

        sink.write_string("Value", "1").unwrap();
        probe.fail_entry("Name");
        assert!(sink.write_string("Name", "Temperature").is_err());
        probe.fail_next(1);
        assert!(sink.write_string("Value", "2").is_err());
        sink.write_string("Value", "3").unwrap();

        assert_eq!(probe.values(), vec!["1".to_string(), "3".to_string()]);
        assert_eq!(probe.get("Name"), None);
        assert_eq!(sink.location(), "Sensors/Temp0");

        drop(sink);
        assert_eq!(probe.drops(), 1);
    }
}
