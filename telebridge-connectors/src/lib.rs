//! Transports and Stores for the Telemetry Bridge
//!
//! ## Overview
//!
//! `telebridge-core` only knows the [`Transport`](telebridge_core::Transport)
//! and [`KeyValueSink`](telebridge_core::KeyValueSink) traits. This crate
//! provides the implementations used by the `telebridge` binary.
//!
//! ## Transports
//!
//! ### Serial (`serial` feature, default)
//!
//! **When to use:**
//! - Microcontroller sensors printing one reading per line over USB/UART
//!
//! **Characteristics:**
//! - 9600 baud, 8 data bits, 1 stop bit, no parity by default
//! - Each read blocks for at most `1000 ms + 10 ms × buffer length`
//! - Timeouts and interrupted reads count as "no data", not as errors
//!
//! ### Replay
//!
//! **When to use:**
//! - Running the bridge without hardware, from a captured byte log
//!
//! **Characteristics:**
//! - Bounded chunked reads from a file
//! - At end of file keeps polling, so appended bytes are picked up
//!
//! ## Stores
//!
//! ### Registry (Windows)
//!
//! Writes `REG_SZ` values under `HKEY_CURRENT_USER`. This is where
//! monitoring tools that support custom registry sensors look.
//!
//! ### File tree
//!
//! One directory per sensor path, one file per entry name. Values are
//! replaced atomically so a reader never sees a half-written file.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use telebridge_connectors::store::{open_store, StoreKind};
//! use telebridge_connectors::ReplayTransport;
//! use telebridge_core::{BridgeDriver, DriverConfig, ShutdownSignal};
//!
//! let driver = BridgeDriver::start(
//!     DriverConfig::default(),
//!     || ReplayTransport::open("capture.log"),
//!     || open_store(StoreKind::File, "sensors/temp0"),
//! )?;
//! driver.run(&ShutdownSignal::new());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! With the `serial` feature, open a `serial::SerialTransport` instead of
//! replaying a capture.

pub mod replay;
pub mod store;

#[cfg(feature = "serial")]
pub mod serial;

// Re-export common types
pub use replay::ReplayTransport;
pub use store::{open_store, DynStore, FileStore, StoreKind};

#[cfg(windows)]
pub use store::RegistryStore;

#[cfg(feature = "serial")]
pub use serial::{list_ports, FlowControl, Parity, PortInfo, SerialConfig, SerialTransport, StopBits};

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Serial port error: {0}")]
    Serial(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Registry error {code}: {context}")]
    Registry { code: u32, context: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(feature = "serial")]
impl From<serialport::Error> for ConnectorError {
    fn from(err: serialport::Error) -> Self {
        match err.kind() {
            serialport::ErrorKind::Io(kind) => {
                ConnectorError::Io(std::io::Error::new(kind, err.description))
            }
            _ => ConnectorError::Serial(err.to_string()),
        }
    }
}
