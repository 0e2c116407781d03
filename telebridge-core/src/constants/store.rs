//! Sink Entry Names and Labels

/// Metadata entry holding the human-readable sensor label.
pub const NAME_ENTRY: &str = "Name";

/// Data entry holding the last distinct reading.
pub const VALUE_ENTRY: &str = "Value";

/// Label written to [`NAME_ENTRY`] when none is configured.
pub const DEFAULT_SENSOR_LABEL: &str = "Temperature";
