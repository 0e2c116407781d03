//! Command-line argument parsing for telebridge

use clap::Parser;
use std::path::PathBuf;

use telebridge_connectors::{FlowControl, Parity, StopBits, StoreKind};

/// Telebridge - mirror a serial sensor into a store a monitor can poll
#[derive(Parser, Debug, Default)]
#[command(name = "telebridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Serial port (COM4, /dev/ttyUSB0)
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Data bits (5-8)
    #[arg(long)]
    pub data_bits: Option<u8>,

    /// Stop bits (1, 2)
    #[arg(long)]
    pub stop_bits: Option<StopBits>,

    /// Parity (none, odd, even)
    #[arg(long)]
    pub parity: Option<Parity>,

    /// Flow control (none, software, hardware)
    #[arg(long)]
    pub flow_control: Option<FlowControl>,

    /// Store backend (registry, file)
    #[arg(short, long)]
    pub store: Option<StoreKind>,

    /// Registry key under HKEY_CURRENT_USER, or directory for the file store
    #[arg(long, value_name = "PATH")]
    pub store_path: Option<String>,

    /// Sensor label written to the Name entry
    #[arg(short, long)]
    pub label: Option<String>,

    /// Replay a captured byte log instead of opening a serial port
    #[arg(long, value_name = "FILE", conflicts_with = "port")]
    pub replay: Option<PathBuf>,

    /// JSON configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List available serial ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Install the log subscriber; `RUST_LOG` takes precedence over flags
    pub fn init_logging(&self) {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level()));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false))
            .with(filter)
            .init();
    }

    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serial_flags() {
        let cli = Cli::parse_from([
            "telebridge",
            "--port",
            "COM7",
            "--baud",
            "115200",
            "--parity",
            "even",
            "--stop-bits",
            "2",
            "--store",
            "file",
            "--store-path",
            "sensors/loop",
        ]);

        assert_eq!(cli.port.as_deref(), Some("COM7"));
        assert_eq!(cli.baud, Some(115_200));
        assert_eq!(cli.parity, Some(Parity::Even));
        assert_eq!(cli.stop_bits, Some(StopBits::Two));
        assert_eq!(cli.store, Some(StoreKind::File));
        assert_eq!(cli.store_path.as_deref(), Some("sensors/loop"));
    }

    #[test]
    fn test_replay_conflicts_with_port() {
        let result = Cli::try_parse_from(["telebridge", "--port", "COM4", "--replay", "cap.log"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(Cli::parse_from(["telebridge"]).log_level(), "info");
        assert_eq!(Cli::parse_from(["telebridge", "-vv"]).log_level(), "trace");
        assert_eq!(Cli::parse_from(["telebridge", "-q"]).log_level(), "warn");
    }
}
