//! Serial Port Transport
//!
//! ## Overview
//!
//! Opens a serial device with fixed framing and a bounded read timeout, and
//! exposes it as a [`Transport`]. The sensor side is expected to print one
//! ASCII reading per line.
//!
//! ## Timeouts
//!
//! A read returns as soon as any bytes are available, or after
//! `timeout_constant + timeout_per_byte × read_len` if none arrive. A
//! timeout is reported as `WouldBlock`; the driver treats it as an idle poll.
//! The same timeout bounds how long a shutdown request waits for the read in
//! flight to finish.
//!
//! ## Port Names
//!
//! On Windows, `COM10` and above only open through the device namespace
//! (`\\.\COM10`). Plain `COMn` names are rewritten to that form.
//!
//! ```rust,no_run
//! use telebridge_connectors::serial::{Parity, SerialConfig, SerialTransport, StopBits};
//!
//! let config = SerialConfig::new("/dev/ttyACM0")
//!     .baud_rate(115_200)
//!     .parity(Parity::None)
//!     .stop_bits(StopBits::One);
//! let transport = SerialTransport::open(&config)?;
//! # Ok::<(), telebridge_connectors::ConnectorError>(())
//! ```

use std::fmt;
use std::io::{ErrorKind, Read};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use telebridge_core::constants::{
    buffers::DEFAULT_READ_BUFFER_LEN,
    time::{READ_TOTAL_TIMEOUT_CONSTANT_MS, READ_TOTAL_TIMEOUT_MULTIPLIER_MS},
};
use telebridge_core::Transport;

use crate::ConnectorError;

/// Parity checking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    /// No parity bit
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
}

impl FromStr for Parity {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "n" => Ok(Parity::None),
            "odd" | "o" => Ok(Parity::Odd),
            "even" | "e" => Ok(Parity::Even),
            other => Err(ConnectorError::Config(format!("unknown parity '{}'", other))),
        }
    }
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopBits {
    /// One stop bit
    One,
    /// Two stop bits
    Two,
}

impl FromStr for StopBits {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1" | "one" => Ok(StopBits::One),
            "2" | "two" => Ok(StopBits::Two),
            other => Err(ConnectorError::Config(format!("unknown stop bits '{}'", other))),
        }
    }
}

/// Flow control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    /// No flow control
    None,
    /// XON/XOFF
    Software,
    /// RTS/CTS
    Hardware,
}

impl FromStr for FlowControl {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(FlowControl::None),
            "software" | "xonxoff" => Ok(FlowControl::Software),
            "hardware" | "rtscts" => Ok(FlowControl::Hardware),
            other => Err(ConnectorError::Config(format!("unknown flow control '{}'", other))),
        }
    }
}

/// Serial link configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SerialConfig {
    /// Device name (`COM4`, `/dev/ttyUSB0`)
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits per character (5-8)
    pub data_bits: u8,
    /// Stop bits
    pub stop_bits: StopBits,
    /// Parity
    pub parity: Parity,
    /// Flow control
    pub flow_control: FlowControl,
    /// Fixed part of the read timeout
    pub timeout_constant: Duration,
    /// Per-byte part of the read timeout
    pub timeout_per_byte: Duration,
    /// Bytes requested per read
    pub read_len: usize,
}

impl SerialConfig {
    /// Create configuration with 9600 8N1 defaults
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: 9600,
            data_bits: 8,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
            timeout_constant: Duration::from_millis(READ_TOTAL_TIMEOUT_CONSTANT_MS),
            timeout_per_byte: Duration::from_millis(READ_TOTAL_TIMEOUT_MULTIPLIER_MS),
            read_len: DEFAULT_READ_BUFFER_LEN,
        }
    }

    /// Set baud rate
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Set data bits
    pub fn data_bits(mut self, bits: u8) -> Self {
        self.data_bits = bits;
        self
    }

    /// Set stop bits
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Set parity
    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Set flow control
    pub fn flow_control(mut self, flow_control: FlowControl) -> Self {
        self.flow_control = flow_control;
        self
    }

    /// Set read timeout components
    pub fn timeouts(mut self, constant: Duration, per_byte: Duration) -> Self {
        self.timeout_constant = constant;
        self.timeout_per_byte = per_byte;
        self
    }

    /// Set bytes requested per read
    pub fn read_len(mut self, len: usize) -> Self {
        self.read_len = len;
        self
    }

    /// Longest a single read may block
    pub fn read_timeout(&self) -> Duration {
        let per_byte = self.timeout_per_byte.saturating_mul(self.read_len as u32);
        self.timeout_constant.saturating_add(per_byte)
    }

    /// Name passed to the operating system
    pub fn device_path(&self) -> String {
        if cfg!(windows) {
            win32_device_path(&self.port)
        } else {
            self.port.clone()
        }
    }

    fn serial_data_bits(&self) -> Result<serialport::DataBits, ConnectorError> {
        match self.data_bits {
            5 => Ok(serialport::DataBits::Five),
            6 => Ok(serialport::DataBits::Six),
            7 => Ok(serialport::DataBits::Seven),
            8 => Ok(serialport::DataBits::Eight),
            other => Err(ConnectorError::Config(format!("unsupported data bits {}", other))),
        }
    }
}

/// Rewrite `COMn` to `\\.\COMn`; other names pass through
pub fn win32_device_path(port: &str) -> String {
    let is_com = port.len() > 3
        && port[..3].eq_ignore_ascii_case("COM")
        && port[3..].bytes().all(|b| b.is_ascii_digit());

    if is_com {
        format!(r"\\.\{}", port)
    } else {
        port.to_string()
    }
}

/// Serial port as a byte-stream transport
pub struct SerialTransport {
    name: String,
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open and configure the port
    pub fn open(config: &SerialConfig) -> Result<Self, ConnectorError> {
        let path = config.device_path();
        log::info!("Opening serial port {} ...", path);

        let port = serialport::new(&path, config.baud_rate)
            .data_bits(config.serial_data_bits()?)
            .stop_bits(match config.stop_bits {
                StopBits::One => serialport::StopBits::One,
                StopBits::Two => serialport::StopBits::Two,
            })
            .parity(match config.parity {
                Parity::None => serialport::Parity::None,
                Parity::Odd => serialport::Parity::Odd,
                Parity::Even => serialport::Parity::Even,
            })
            .flow_control(match config.flow_control {
                FlowControl::None => serialport::FlowControl::None,
                FlowControl::Software => serialport::FlowControl::Software,
                FlowControl::Hardware => serialport::FlowControl::Hardware,
            })
            .timeout(config.read_timeout())
            .open()?;

        log::debug!(
            "{} configured: {} baud, {} data bits, {:?} parity, {:?} stop bits, {:?} read timeout",
            path,
            config.baud_rate,
            config.data_bits,
            config.parity,
            config.stop_bits,
            config.read_timeout()
        );

        Ok(Self { name: path, port })
    }
}

impl Transport for SerialTransport {
    type Error = std::io::Error;

    fn read_chunk(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if is_no_data(&e) => Err(nb::Error::WouldBlock),
            Err(e) => Err(nb::Error::Other(e)),
        }
    }

    fn describe(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialTransport").field("name", &self.name).finish()
    }
}

// Timeouts and cancelled reads are part of normal polling
fn is_no_data(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

/// One available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Device name
    pub name: String,
    /// Human-readable details (USB ids, manufacturer, product)
    pub details: Vec<String>,
}

impl fmt::Display for PortInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for detail in &self.details {
            write!(f, "\n      {}", detail)?;
        }
        Ok(())
    }
}

/// Enumerate serial ports present on this machine
pub fn list_ports() -> Result<Vec<PortInfo>, ConnectorError> {
    let ports = serialport::available_ports()?;

    Ok(ports
        .into_iter()
        .map(|port| {
            let mut details = Vec::new();
            match &port.port_type {
                serialport::SerialPortType::UsbPort(info) => {
                    details.push(format!("USB (VID: 0x{:04x}, PID: 0x{:04x})", info.vid, info.pid));
                    if let Some(manufacturer) = &info.manufacturer {
                        details.push(format!("Manufacturer: {}", manufacturer));
                    }
                    if let Some(product) = &info.product {
                        details.push(format!("Product: {}", product));
                    }
                    if let Some(serial) = &info.serial_number {
                        details.push(format!("Serial: {}", serial));
                    }
                }
                serialport::SerialPortType::BluetoothPort => details.push("Bluetooth".into()),
                serialport::SerialPortType::PciPort => details.push("PCI".into()),
                serialport::SerialPortType::Unknown => {}
            }
            PortInfo {
                name: port.port_name,
                details,
            }
        })
        .collect())
}
