//! Buffer Sizes and Line Length Limits

/// Bytes requested from the transport per read.
///
/// A temperature line is a handful of bytes, so one read usually carries
/// several lines or a fragment of one.
pub const DEFAULT_READ_BUFFER_LEN: usize = 256;

/// Longest partial line kept while waiting for a newline.
///
/// A sensor that never sends `\n` would otherwise grow the line buffer
/// without bound. Anything longer than this is not a reading.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

/// Initial capacity reserved for the line buffer.
pub const LINE_BUFFER_RESERVE: usize = 512;
