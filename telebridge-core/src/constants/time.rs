//! Backoff Intervals and Serial Timeouts
//!
//! All values are in milliseconds.

/// Pause after a read that returned no data.
pub const DEFAULT_IDLE_BACKOFF_MS: u64 = 10;

/// Pause after a transient read error.
pub const DEFAULT_ERROR_BACKOFF_MS: u64 = 50;

/// Fixed part of the total read timeout.
pub const READ_TOTAL_TIMEOUT_CONSTANT_MS: u64 = 1000;

/// Per-byte part of the total read timeout.
pub const READ_TOTAL_TIMEOUT_MULTIPLIER_MS: u64 = 10;
