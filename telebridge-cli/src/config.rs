//! Bridge configuration: JSON file merged with command-line flags

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use telebridge_connectors::{FlowControl, Parity, SerialConfig, StopBits, StoreKind};
use telebridge_core::DriverConfig;

use crate::cli::Cli;

/// Port used when none is configured
pub const DEFAULT_PORT: &str = if cfg!(windows) { "COM4" } else { "/dev/ttyUSB0" };

/// On-disk configuration; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub port: Option<String>,
    pub baud: Option<u32>,
    pub data_bits: Option<u8>,
    pub stop_bits: Option<StopBits>,
    pub parity: Option<Parity>,
    pub flow_control: Option<FlowControl>,
    pub store: Option<StoreKind>,
    pub store_path: Option<String>,
    pub label: Option<String>,
    pub replay: Option<PathBuf>,
    /// Read timeout constant in milliseconds
    pub timeout_ms: Option<u64>,
    /// Longest partial line kept in bytes; 0 disables the limit
    pub max_line_len: Option<usize>,
}

/// Where the bridge reads from
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Serial(SerialConfig),
    Replay(PathBuf),
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source: Source,
    pub store: StoreKind,
    pub store_path: String,
    pub driver: DriverConfig,
}

impl BridgeConfig {
    /// Load a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Overlay command-line flags; a flag wins over the file
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        fn overlay<T: Clone>(slot: &mut Option<T>, flag: &Option<T>) {
            if flag.is_some() {
                slot.clone_from(flag);
            }
        }

        overlay(&mut self.port, &cli.port);
        overlay(&mut self.baud, &cli.baud);
        overlay(&mut self.data_bits, &cli.data_bits);
        overlay(&mut self.stop_bits, &cli.stop_bits);
        overlay(&mut self.parity, &cli.parity);
        overlay(&mut self.flow_control, &cli.flow_control);
        overlay(&mut self.store, &cli.store);
        overlay(&mut self.store_path, &cli.store_path);
        overlay(&mut self.label, &cli.label);
        overlay(&mut self.replay, &cli.replay);

        // An explicit port on the command line beats a replay file from config
        if cli.port.is_some() && cli.replay.is_none() {
            self.replay = None;
        }
        self
    }

    /// Fill in defaults
    pub fn resolve(self) -> Settings {
        let source = match self.replay {
            Some(path) => Source::Replay(path),
            None => {
                let mut serial = SerialConfig::new(self.port.unwrap_or_else(|| DEFAULT_PORT.into()))
                    .baud_rate(self.baud.unwrap_or(9600))
                    .data_bits(self.data_bits.unwrap_or(8))
                    .stop_bits(self.stop_bits.unwrap_or(StopBits::One))
                    .parity(self.parity.unwrap_or(Parity::None))
                    .flow_control(self.flow_control.unwrap_or(FlowControl::None));
                if let Some(ms) = self.timeout_ms {
                    let per_byte = serial.timeout_per_byte;
                    serial = serial.timeouts(Duration::from_millis(ms), per_byte);
                }
                Source::Serial(serial)
            }
        };

        let store = self.store.unwrap_or_default();
        let store_path = self.store_path.unwrap_or_else(|| store.default_path().to_string());

        let mut driver = DriverConfig::default();
        if let Some(label) = self.label {
            driver = driver.with_label(label);
        }
        if let Source::Serial(serial) = &source {
            driver = driver.with_read_buffer_len(serial.read_len);
        }
        match self.max_line_len {
            Some(0) => driver = driver.with_max_line_len(None),
            Some(max) => driver = driver.with_max_line_len(Some(max)),
            None => {}
        }

        Settings {
            source,
            store,
            store_path,
            driver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let settings = BridgeConfig::default().resolve();

        match &settings.source {
            Source::Serial(serial) => {
                assert_eq!(serial.port, DEFAULT_PORT);
                assert_eq!(serial.baud_rate, 9600);
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(settings.store, StoreKind::platform_default());
        assert_eq!(settings.store_path, settings.store.default_path());
        assert_eq!(settings.driver.label, "Temperature");
        assert_eq!(settings.driver.max_line_len, Some(4096));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        fs::write(
            &path,
            r#"{ "port": "COM9", "parity": "odd", "store": "file", "label": "Loop" }"#,
        )
        .unwrap();

        let config = BridgeConfig::load(&path).unwrap();
        assert_eq!(config.port.as_deref(), Some("COM9"));
        assert_eq!(config.parity, Some(Parity::Odd));
        assert_eq!(config.store, Some(StoreKind::File));
        assert_eq!(config.baud, None);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        fs::write(&path, r#"{ "prot": "COM9" }"#).unwrap();

        assert!(BridgeConfig::load(&path).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let file = BridgeConfig {
            port: Some("COM9".into()),
            baud: Some(19_200),
            label: Some("From File".into()),
            ..Default::default()
        };
        let cli = Cli::parse_from(["telebridge", "--port", "COM3", "--label", "Loop"]);

        let settings = file.merge_cli(&cli).resolve();
        match settings.source {
            Source::Serial(serial) => {
                assert_eq!(serial.port, "COM3");
                assert_eq!(serial.baud_rate, 19_200);
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(settings.driver.label, "Loop");
    }

    #[test]
    fn test_port_flag_beats_replay_from_file() {
        let file = BridgeConfig {
            replay: Some("capture.log".into()),
            ..Default::default()
        };
        let cli = Cli::parse_from(["telebridge", "--port", "COM3"]);

        let settings = file.merge_cli(&cli).resolve();
        assert!(matches!(settings.source, Source::Serial(_)));
    }

    #[test]
    fn test_replay_and_line_limit() {
        let config = BridgeConfig {
            replay: Some("capture.log".into()),
            max_line_len: Some(0),
            ..Default::default()
        };

        let settings = config.resolve();
        assert_eq!(settings.source, Source::Replay("capture.log".into()));
        assert_eq!(settings.driver.max_line_len, None);
    }
}
