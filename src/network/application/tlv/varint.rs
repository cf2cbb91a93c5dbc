//! Variable-length integers.
//!
//! The encoding is the MQTT "remaining length" scheme: seven data bits per
//! byte, least significant group first, bit 7 set on every byte except the
//! last. At most four bytes are used, which caps values at 268 435 455.

use super::Error;

/// Maximum number of bytes in an encoded varint.
pub const MAX_LEN: usize = 4;

/// Largest value that fits in [`MAX_LEN`] bytes.
pub const MAX_VALUE: u32 = 0x0FFF_FFFF;

const CONTINUATION: u8 = 0x80;
const DATA_MASK: u8 = 0x7F;

/// Number of bytes `value` occupies once encoded.
pub const fn encoded_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        _ => 4,
    }
}

/// Encode `value` into the start of `dst`, returning the number of bytes
/// written.
///
/// Room for the whole varint is checked before the first byte is written.
pub fn encode(mut value: u32, dst: &mut [u8]) -> Result<usize, Error> {
    if value > MAX_VALUE {
        return Err(Error::ValueTooLarge);
    }
    let len = encoded_len(value);
    if dst.len() < len {
        return Err(Error::BufferTooSmall);
    }

    for (i, slot) in dst[..len].iter_mut().enumerate() {
        let mut byte = (value & u32::from(DATA_MASK)) as u8;
        value >>= 7;
        if i + 1 < len {
            byte |= CONTINUATION;
        }
        *slot = byte;
    }
    Ok(len)
}

/// Decode a varint from the start of `src`, returning the value and the
/// number of bytes consumed.
///
/// Running out of input yields [`Error::Truncated`]; a fourth byte that still
/// announces a continuation yields [`Error::InvalidVarint`].
pub fn decode(src: &[u8]) -> Result<(u32, usize), Error> {
    let mut value: u32 = 0;
    for i in 0..MAX_LEN {
        let byte = *src.get(i).ok_or(Error::Truncated)?;
        value |= u32::from(byte & DATA_MASK) << (7 * i);
        if byte & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(Error::InvalidVarint)
}
