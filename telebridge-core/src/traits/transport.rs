//! Byte-Stream Transport Trait
//!
//! The transport is the source of raw sensor output. It follows the same
//! pull-based model as the rest of the core, using the `nb` crate to separate
//! "nothing yet" from "something went wrong" without an async runtime.
//!
//! ## Design Philosophy
//!
//! - **Pull-based**: The driver decides when to read
//! - **Bounded**: A read never blocks longer than its configured timeout
//! - **Chunked**: No message boundaries are implied by a read
//!
//! ## Common Patterns
//!
//! ```rust
//! use telebridge_core::traits::Transport;
//!
//! fn read_once<T: Transport>(transport: &mut T, buf: &mut [u8]) -> usize {
//!     match transport.read_chunk(buf) {
//!         Ok(n) => n,
//!         Err(nb::Error::WouldBlock) => 0, // timed out, try again later
//!         Err(nb::Error::Other(_e)) => 0,  // transient, report and retry
//!     }
//! }
//! ```

use core::fmt;

/// Source of raw byte chunks
///
/// ## Contract
///
/// - `Ok(n)` with `n > 0`: `buf[..n]` holds the next bytes of the stream
/// - `Ok(0)` or `Err(nb::Error::WouldBlock)`: no data arrived before the
///   read timeout; this is not an error
/// - `Err(nb::Error::Other(e))`: transient failure, the transport stays
///   usable and the caller may read again
///
/// A read may return any number of bytes; a chunk can end in the middle of a
/// line or carry several lines at once.
///
/// ## Example Implementation
///
/// ```rust
/// use telebridge_core::traits::Transport;
///
/// struct Loopback {
///     pending: Vec<u8>,
/// }
///
/// impl Transport for Loopback {
///     type Error = core::convert::Infallible;
///
///     fn read_chunk(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
///         if self.pending.is_empty() {
///             return Err(nb::Error::WouldBlock);
///         }
///         let n = buf.len().min(self.pending.len());
///         buf[..n].copy_from_slice(&self.pending[..n]);
///         self.pending.drain(..n);
///         Ok(n)
///     }
/// }
/// ```
pub trait Transport {
    /// Transient read failure
    type Error: fmt::Display;

    /// Perform one bounded read into `buf`
    fn read_chunk(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error>;

    /// Human-readable name of the underlying device, used in logs
    fn describe(&self) -> &str {
        "transport"
    }
}

impl<T: Transport + ?Sized> Transport for alloc::boxed::Box<T> {
    type Error = T::Error;

    fn read_chunk(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
        (**self).read_chunk(buf)
    }

    fn describe(&self) -> &str {
        (**self).describe()
    }
}
