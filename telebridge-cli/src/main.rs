//! Telebridge - mirror a line-oriented serial sensor into a key-value store

mod cli;
mod config;
mod signals;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use telebridge_connectors::{list_ports, open_store, ReplayTransport, SerialTransport};
use telebridge_core::{BridgeDriver, DriverStats, ShutdownSignal, Transport};

use cli::Cli;
use config::{BridgeConfig, Settings, Source};

type DynTransport = Box<dyn Transport<Error = io::Error> + Send>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.init_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.list_ports {
        return print_ports();
    }

    let file_config = match &cli.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    let settings = file_config.merge_cli(&cli).resolve();

    let signal = ShutdownSignal::new();
    signals::watch(signals::ShutdownListener::register(), &signal)?;

    // Reads block for up to the port timeout, so the loop gets its own thread
    let stats = tokio::task::spawn_blocking(move || bridge(settings, &signal))
        .await
        .context("bridge thread panicked")??;

    tracing::debug!("{:?}", stats);
    Ok(())
}

fn bridge(settings: Settings, signal: &ShutdownSignal) -> Result<DriverStats> {
    let Settings {
        source,
        store,
        store_path,
        driver,
    } = settings;

    let driver = BridgeDriver::start(
        driver,
        || -> Result<DynTransport, telebridge_connectors::ConnectorError> {
            match &source {
                Source::Serial(serial) => Ok(Box::new(SerialTransport::open(serial)?)),
                Source::Replay(path) => Ok(Box::new(ReplayTransport::open(path)?)),
            }
        },
        || open_store(store, &store_path),
    )?;

    Ok(driver.run(signal))
}

fn print_ports() -> Result<()> {
    let ports = list_ports().context("Cannot enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("  {}", port);
    }
    Ok(())
}
