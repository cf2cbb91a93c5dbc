//! Error type for the TLV codec

use core::fmt;

/// Errors produced while encoding or decoding TLV frames.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The destination has no room for the next field.
    BufferTooSmall,
    /// The source ended before the frame did.
    Truncated,
    /// A variable-length integer ran past its maximum width.
    InvalidVarint,
    /// A value does not fit in a variable-length integer.
    ValueTooLarge,
    /// The type id is not part of the type table.
    UnknownType(u32),
    /// A static-length type carried content of the wrong size.
    InvalidLength,
    /// String or enum content is not valid UTF-8.
    InvalidUtf8,
    /// The outgoing buffer was poisoned by an earlier failed append,
    /// or was never started.
    Unusable,
}

impl Error {
    /// Whether the error stems from malformed input rather than from
    /// running out of room while encoding.
    pub fn is_protocol(&self) -> bool {
        !matches!(
            self,
            Error::BufferTooSmall | Error::ValueTooLarge | Error::Unusable
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BufferTooSmall => f.write_str("buffer too small"),
            Error::Truncated => f.write_str("truncated frame"),
            Error::InvalidVarint => f.write_str("invalid varint"),
            Error::ValueTooLarge => f.write_str("value too large for varint"),
            Error::UnknownType(id) => write!(f, "unknown type id {}", id),
            Error::InvalidLength => f.write_str("invalid content length"),
            Error::InvalidUtf8 => f.write_str("content is not utf-8"),
            Error::Unusable => f.write_str("buffer unusable for this packet"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::BufferTooSmall => defmt::write!(f, "BufferTooSmall"),
            Error::Truncated => defmt::write!(f, "Truncated"),
            Error::InvalidVarint => defmt::write!(f, "InvalidVarint"),
            Error::ValueTooLarge => defmt::write!(f, "ValueTooLarge"),
            Error::UnknownType(id) => defmt::write!(f, "UnknownType({})", id),
            Error::InvalidLength => defmt::write!(f, "InvalidLength"),
            Error::InvalidUtf8 => defmt::write!(f, "InvalidUtf8"),
            Error::Unusable => defmt::write!(f, "Unusable"),
        }
    }
}
