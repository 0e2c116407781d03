//! Line assembly over a chunked byte stream
//!
//! A serial port delivers bytes, not messages. A single read can end halfway
//! through a reading, or carry three readings at once. [`LineAssembler`]
//! keeps the unterminated tail between reads and hands out every complete
//! `\n`-terminated line as soon as it exists.
//!
//! ## Example
//!
//! ```rust
//! use telebridge_core::stream::LineAssembler;
//!
//! let mut assembler = LineAssembler::new();
//!
//! // First read ends mid-line: nothing is emitted yet
//! assert_eq!(assembler.feed(b"21.").count(), 0);
//!
//! // Second read completes it and carries one more full line
//! let lines: Vec<_> = assembler.feed(b"5\n22.0\n").collect();
//! assert_eq!(lines[0].as_bytes(), b"21.5\n");
//! assert_eq!(lines[1].as_bytes(), b"22.0\n");
//! ```

use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::constants::buffers::LINE_BUFFER_RESERVE;

/// One complete line, terminator included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    bytes: Vec<u8>,
}

impl RawLine {
    /// Raw bytes including the trailing `\n`
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes without the `\n` (or `\r\n`) terminator
    pub fn content(&self) -> &[u8] {
        let bytes = self.bytes.strip_suffix(b"\n").unwrap_or(&self.bytes);
        bytes.strip_suffix(b"\r").unwrap_or(bytes)
    }

    /// Length in bytes, terminator included
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a zero-length line (only constructible by hand)
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Take the underlying bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<&[u8]> for RawLine {
    fn from(bytes: &[u8]) -> Self {
        Self { bytes: bytes.to_vec() }
    }
}

impl From<Vec<u8>> for RawLine {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

/// Counters kept by the assembler
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssemblerStats {
    /// Bytes accepted through `feed`
    pub bytes_fed: usize,
    /// Complete lines handed out
    pub lines_emitted: usize,
    /// Lines dropped for exceeding the length limit
    pub overflowed_lines: usize,
}

/// Turns byte chunks into complete lines
///
/// ## Buffer Layout
///
/// ```text
/// buffer: [ emitted lines | complete lines not yet pulled | partial tail ]
///           ^0             ^consumed                        ^scan_pos..len
/// ```
///
/// Emitted bytes are compacted away at the start of the next `feed`. Once the
/// iterator returned by `feed` is exhausted, the buffer holds only the
/// partial tail, which never contains a newline.
///
/// ## Length Limit
///
/// By default the tail may grow without bound. With
/// [`with_max_line_len`](Self::with_max_line_len) any line whose content
/// (everything before the `\n`) exceeds the limit is dropped, whether it
/// arrives in one chunk or many. A partial tail that outgrows the limit is
/// dropped early, and every byte up to and including the next newline is
/// skipped so the rest of the oversized line is never taken for a line of
/// its own.
#[derive(Debug, Clone)]
pub struct LineAssembler {
    buffer: Vec<u8>,
    consumed: usize,
    scan_pos: usize,
    max_line_len: Option<usize>,
    discarding: bool,
    stats: AssemblerStats,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAssembler {
    /// Create an assembler with an unbounded line buffer
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(LINE_BUFFER_RESERVE),
            consumed: 0,
            scan_pos: 0,
            max_line_len: None,
            discarding: false,
            stats: AssemblerStats::default(),
        }
    }

    /// Drop lines longer than `max` bytes, terminator excluded
    pub fn with_max_line_len(mut self, max: usize) -> Self {
        self.max_line_len = Some(max);
        self
    }

    /// Append a chunk and return the lines it completes
    ///
    /// The returned iterator is lazy: each call to `next` extracts one line.
    /// Lines left unpulled when it is dropped are returned by the next `feed`,
    /// ahead of anything the new chunk completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Lines<'_> {
        self.compact();
        if !chunk.is_empty() {
            self.buffer.extend_from_slice(chunk);
            self.stats.bytes_fed += chunk.len();
        }
        Lines { assembler: self }
    }

    /// Bytes buffered but not yet handed out
    pub fn pending(&self) -> &[u8] {
        &self.buffer[self.consumed..]
    }

    /// Number of bytes buffered but not yet handed out
    pub fn pending_len(&self) -> usize {
        self.buffer.len() - self.consumed
    }

    /// Configured length limit, if any
    pub fn max_line_len(&self) -> Option<usize> {
        self.max_line_len
    }

    /// Get statistics
    pub fn stats(&self) -> &AssemblerStats {
        &self.stats
    }

    /// Forget all buffered bytes
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.consumed = 0;
        self.scan_pos = 0;
        self.discarding = false;
    }

    fn compact(&mut self) {
        if self.consumed > 0 {
            self.buffer.drain(..self.consumed);
            self.scan_pos -= self.consumed;
            self.consumed = 0;
        }
    }

    fn next_line(&mut self) -> Option<RawLine> {
        loop {
            let newline = self.buffer[self.scan_pos..].iter().position(|&b| b == b'\n');

            let Some(offset) = newline else {
                self.scan_pos = self.buffer.len();
                self.enforce_limit();
                return None;
            };

            let start = self.consumed;
            let end = self.scan_pos + offset + 1;
            self.consumed = end;
            self.scan_pos = end;

            if self.discarding {
                self.discarding = false;
                log::debug!("Resynchronized after oversized line");
                continue;
            }

            let content_len = end - start - 1;
            if let Some(max) = self.max_line_len.filter(|&max| content_len > max) {
                log::warn!("Discarding line of {} bytes (limit {})", content_len, max);
                self.stats.overflowed_lines += 1;
                continue;
            }

            self.stats.lines_emitted += 1;
            return Some(RawLine::from(&self.buffer[start..end]));
        }
    }

    // Only called when the tail holds no newline, so every byte before
    // `consumed` has already been emitted and the whole buffer may go.
    fn enforce_limit(&mut self) {
        let tail = self.pending_len();

        if self.discarding {
            self.clear_tail();
            return;
        }

        if let Some(max) = self.max_line_len {
            if tail > max {
                log::warn!("Discarding partial line of {} bytes (limit {})", tail, max);
                self.stats.overflowed_lines += 1;
                self.discarding = true;
                self.clear_tail();
            }
        }
    }

    fn clear_tail(&mut self) {
        self.buffer.clear();
        self.consumed = 0;
        self.scan_pos = 0;
    }
}

/// Lazy sequence of lines completed by one `feed`
#[derive(Debug)]
pub struct Lines<'a> {
    assembler: &'a mut LineAssembler,
}

impl Iterator for Lines<'_> {
    type Item = RawLine;

    fn next(&mut self) -> Option<Self::Item> {
        self.assembler.next_line()
    }
}

impl FusedIterator for Lines<'_> {}
