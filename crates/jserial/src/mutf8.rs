//! # Modified UTF-8
//!
//! The string encoding of `DataOutput.writeUTF`, used for every string in a
//! serialization stream. It differs from standard UTF-8 in two ways:
//!
//! - U+0000 is written as the two bytes `C0 80`, never as a zero byte.
//! - Supplementary characters are written as a UTF-16 surrogate pair, each
//!   half taking three bytes.

use crate::types::Error;
use crate::types::Result;

/// Encodes a string as modified UTF-8.
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

/// Returns the encoded length of `s` without allocating.
pub fn encoded_len(s: &str) -> usize {
    s.encode_utf16()
        .map(|unit| match unit {
            0x0001..=0x007F => 1,
            0x0000 | 0x0080..=0x07FF => 2,
            _ => 3,
        })
        .sum()
}

/// Decodes modified UTF-8 bytes.
///
/// # Errors
/// Returns `Error::InvalidUtf8` on truncated sequences, bad continuation
/// bytes, 4-byte forms, or unpaired surrogates.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(b as u16);
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = continuation(bytes, i + 1)?;
            units.push(((b as u16 & 0x1F) << 6) | b2);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = continuation(bytes, i + 1)?;
            let b3 = continuation(bytes, i + 2)?;
            units.push(((b as u16 & 0x0F) << 12) | (b2 << 6) | b3);
            i += 3;
        } else {
            return Err(Error::InvalidUtf8);
        }
    }
    String::from_utf16(&units).map_err(|_| Error::InvalidUtf8)
}

fn continuation(bytes: &[u8], idx: usize) -> Result<u16> {
    match bytes.get(idx) {
        Some(b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
        _ => Err(Error::InvalidUtf8),
    }
}
