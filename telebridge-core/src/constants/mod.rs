//! Constants for the Telemetry Bridge
//!
//! Centralized defaults used by the core pipeline and the connectors. Values
//! that describe the serial link and the backoff timing mirror the settings
//! the sensor firmware was built against.
//!
//! ## Organization
//!
//! - **Buffers**: read chunk and line length limits
//! - **Time**: backoff intervals and serial timeouts
//! - **Store**: entry names and the default sensor label

/// Buffer sizes and line length limits.
pub mod buffers;

/// Backoff intervals and serial timeouts.
pub mod time;

/// Entry names and default labels written to the sink.
pub mod store;

pub use buffers::{DEFAULT_MAX_LINE_LEN, DEFAULT_READ_BUFFER_LEN};
pub use store::{DEFAULT_SENSOR_LABEL, NAME_ENTRY, VALUE_ENTRY};
pub use time::{DEFAULT_ERROR_BACKOFF_MS, DEFAULT_IDLE_BACKOFF_MS};
