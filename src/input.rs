use std::io::{self, BufRead};

/// A bit count read from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitCount {
    pub value: i64,
    /// No integer could be extracted and `value` is the zero fallback.
    pub fallback: bool,
}

impl BitCount {
    const FALLBACK: BitCount = BitCount {
        value: 0,
        fallback: true,
    };
}

/// Extracts a leading integer the way formatted stream input does: leading
/// whitespace is skipped, an optional sign and a run of digits are consumed,
/// and anything after the digits is ignored. Input without digits yields 0.
/// Out-of-range values saturate to the 32-bit signed bounds.
pub fn parse_bit_count(text: &str) -> BitCount {
    let s = text.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return BitCount::FALLBACK;
    }

    let mut magnitude: i64 = 0;
    for d in digits.bytes() {
        magnitude = magnitude
            .saturating_mul(10)
            .saturating_add((d - b'0') as i64);
    }
    let value = if negative { -magnitude } else { magnitude };

    BitCount {
        value: saturate_to_i32(value),
        fallback: false,
    }
}

/// Bounds a count to the 32-bit signed range the prompt accepts.
pub fn saturate_to_i32(value: i64) -> i64 {
    value.clamp(i32::MIN as i64, i32::MAX as i64)
}

/// Reads lines until one holds a token and parses the count from it.
/// End of input yields the zero fallback. Bytes that are not valid UTF-8
/// are treated as non-digits rather than as a read error.
pub fn read_bit_count<R: BufRead>(reader: &mut R) -> io::Result<BitCount> {
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(BitCount::FALLBACK);
        }
        let text = String::from_utf8_lossy(&line);
        if !text.trim().is_empty() {
            return Ok(parse_bit_count(&text));
        }
    }
}
