//! Core pipeline for telebridge
//!
//! Mirrors the latest distinct numeric reading from a line-oriented serial
//! sensor into a key-value store that a monitoring application polls.
//!
//! ```text
//! transport bytes → LineAssembler → RawLine → ReadingValidator → Reading
//!                 → ChangeGate → StoreWriter → KeyValueSink
//! ```
//!
//! Key guarantees:
//! - A line split across any number of reads is reassembled intact
//! - Only text that is exactly one decimal number becomes a reading
//! - The store is written at most once per distinct consecutive value
//! - Shutdown is cooperative and releases transport and sink exactly once
//!
//! Everything except the [`driver`] (which sleeps between reads) builds
//! without `std`.
//!
//! ```no_run
//! use telebridge_core::{BridgeDriver, DriverConfig, ShutdownSignal};
//! # use telebridge_core::memory::{MemorySink, MemoryTransport};
//! # fn open_serial() -> Result<MemoryTransport, String> { Ok(MemoryTransport::new(vec![])) }
//! # fn open_store() -> Result<MemorySink, String> { Ok(MemorySink::new("k")) }
//!
//! let signal = ShutdownSignal::new();
//! let driver = BridgeDriver::start(DriverConfig::default(), open_serial, open_store)?;
//! let stats = driver.run(&signal);
//! # Ok::<(), telebridge_core::StartupError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod constants;
pub mod errors;
pub mod gate;
pub mod pipeline;
pub mod shutdown;
pub mod stream;
pub mod traits;
pub mod validators;
pub mod writer;

#[cfg(feature = "std")]
pub mod driver;

#[cfg(all(feature = "memory", feature = "std"))]
pub mod memory;

// Public API
pub use errors::{ReadingError, ReadingResult, StartupError, WriteError};
pub use gate::{Admission, ChangeGate};
pub use pipeline::{LineOutcome, PipelineStats, ReadingPipeline};
pub use shutdown::ShutdownSignal;
pub use stream::{LineAssembler, Lines, RawLine};
pub use traits::{KeyValueSink, Transport};
pub use validators::{Reading, ReadingValidator};
pub use writer::{StoreWriter, WriterStats};

#[cfg(feature = "std")]
pub use driver::{BridgeDriver, DriverConfig, DriverState, DriverStats, Step};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
