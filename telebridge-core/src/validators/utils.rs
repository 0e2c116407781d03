//! Text Scanning Utilities for Line Validation
//!
//! ## Whitespace
//!
//! Sensor firmware pads readings with whatever its print routine emits, so
//! trimming uses the full C `isspace` set. Note that `u8::is_ascii_whitespace`
//! leaves out vertical tab (`0x0B`).
//!
//! ## Greedy Literal Scan
//!
//! Validation does not ask "does the whole string look like a number". It
//! scans the longest decimal literal from the start, then checks what is left.
//! The two approaches disagree on inputs like `"5 6"`:
//!
//! ```text
//! "5 6"   → literal "5", remainder " 6"  → rejected
//! "1e"    → literal "1", remainder "e"   → rejected
//! "1e5"   → literal "1e5", remainder ""  → accepted
//! ```

/// True for bytes in the C `isspace` set
pub fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Trim leading and trailing `isspace` bytes
pub fn trim_space(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_ascii() && is_space(c as u8))
}

/// Length of the longest decimal floating-point literal at the start of `text`
///
/// Grammar: optional sign, digits with an optional fractional part (at least
/// one digit overall), then an optional exponent. The exponent marker is only
/// consumed when at least one exponent digit follows it. Returns 0 when no
/// literal starts at the first byte.
pub fn decimal_prefix_len(text: &[u8]) -> usize {
    let digits_from = |start: usize| {
        text[start..].iter().take_while(|b| b.is_ascii_digit()).count()
    };

    let mut pos = 0;
    if matches!(text.first(), Some(b'+' | b'-')) {
        pos = 1;
    }

    let int_digits = digits_from(pos);
    pos += int_digits;
    let mut mantissa_digits = int_digits;

    if text.get(pos) == Some(&b'.') {
        let frac_digits = digits_from(pos + 1);
        if int_digits + frac_digits > 0 {
            pos += 1 + frac_digits;
            mantissa_digits += frac_digits;
        }
    }

    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(text.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(text.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            pos = exp + exp_digits;
        }
    }

    pos
}

/// Whether the digits before the exponent of `literal` include a nonzero one
pub fn mantissa_is_nonzero(literal: &str) -> bool {
    literal
        .bytes()
        .take_while(|b| !matches!(b, b'e' | b'E'))
        .any(|b| matches!(b, b'1'..=b'9'))
}
