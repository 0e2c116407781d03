//! Replay Transport
//!
//! Feeds the bridge from a file of captured sensor output instead of a live
//! device. Reads are bounded by the caller's buffer, so the same chunking
//! behaviour as a serial port is exercised.
//!
//! At end of file the transport reports `WouldBlock` and keeps polling;
//! bytes appended to the file later (for example by `tee` from a terminal
//! program) are picked up on the next read.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use telebridge_core::Transport;

use crate::ConnectorError;

/// File-backed transport
#[derive(Debug)]
pub struct ReplayTransport {
    name: String,
    file: File,
    bytes_read: u64,
    at_eof: bool,
}

impl ReplayTransport {
    /// Open a capture file for replay
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConnectorError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::info!("Replaying {}", path.display());

        Ok(Self {
            name: path.display().to_string(),
            file,
            bytes_read: 0,
            at_eof: false,
        })
    }

    /// Total bytes delivered so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Whether the last read hit end of file
    pub fn at_eof(&self) -> bool {
        self.at_eof
    }
}

impl Transport for ReplayTransport {
    type Error = std::io::Error;

    fn read_chunk(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
        match self.file.read(buf) {
            Ok(0) => {
                if !self.at_eof {
                    log::info!("End of {} after {} bytes, waiting for more", self.name, self.bytes_read);
                    self.at_eof = true;
                }
                Err(nb::Error::WouldBlock)
            }
            Ok(n) => {
                self.at_eof = false;
                self.bytes_read += n as u64;
                Ok(n)
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => Err(nb::Error::WouldBlock),
            Err(e) => Err(nb::Error::Other(e)),
        }
    }

    fn describe(&self) -> &str {
        &self.name
    }
}
