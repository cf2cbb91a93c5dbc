//! Tag-length-value telemetry framing.
//!
//! Every record on the wire is self-describing: a tag identifying the data
//! point, a type id, an optional length and the content. Records are grouped
//! into packets that share a single header carrying the request/response flag
//! and a request id.
//!
//! # Frame layout
//!
//! ```text
//! byte 0        flags: bit0 = request(1)/response(0), other bits reserved (0)
//! bytes 1-4     request_id, big-endian u32
//! varint        tag_id
//! varint        type_id  (Bool=0, Enum=1, String=2, Double=3)
//! [varint]      content_length, only for String and Enum
//! N bytes       content
//! ```
//!
//! Bool content is one byte, Double content is the eight byte big-endian
//! IEEE-754 bit pattern. String and Enum content is raw UTF-8 with no
//! terminator.
//!
//! # Examples
//!
//! ```rust
//! use iotlink::network::application::tlv::{self, Flags, Header, Value};
//!
//! let mut buf = [0u8; 32];
//! let header = Header::new(Flags::REQUEST, 1234);
//! let len = tlv::encode(header, 4567, &Value::String("hello"), &mut buf).unwrap();
//!
//! let frame = tlv::decode(&buf[..len]).unwrap();
//! assert_eq!(frame.header, header);
//! assert_eq!(frame.record.tag_id, 4567);
//! assert_eq!(frame.record.value().unwrap(), Value::String("hello"));
//! ```

#![deny(unsafe_code)]

pub mod buffer;
pub mod codec;
pub mod error;
pub mod tags;
pub mod varint;


pub use buffer::OutgoingBuffer;
pub use codec::{
    decode, decode_header, decode_record, encode, encode_header, encode_record, Packet, Records,
};
pub use error::Error;

/// Size of the shared packet header: flags plus request id.
pub const HEADER_LEN: usize = 5;

/// Packet control flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u8);

impl Flags {
    /// A response packet (bit 0 clear).
    pub const RESPONSE: Flags = Flags(0x00);
    /// A request packet (bit 0 set).
    pub const REQUEST: Flags = Flags(0x01);

    const DEFINED: u8 = 0x01;

    /// Build flags from a raw byte, dropping reserved bits.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Flags(bits & Self::DEFINED)
    }

    /// Raw byte as written on the wire.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the request bit is set.
    pub const fn is_request(self) -> bool {
        self.0 & Self::REQUEST.0 != 0
    }
}

/// Header shared by every record of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Request/response flag.
    pub flags: Flags,
    /// Caller-chosen id; uniqueness is not checked here.
    pub request_id: u32,
}

impl Header {
    /// Create a header.
    pub const fn new(flags: Flags, request_id: u32) -> Self {
        Self { flags, request_id }
    }
}

/// Wire type of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataType {
    /// One byte, 0 or 1.
    Bool = 0,
    /// Length-prefixed text naming one of a fixed set of choices.
    Enum = 1,
    /// Length-prefixed text.
    String = 2,
    /// Eight byte big-endian IEEE-754 double.
    Double = 3,
}

impl DataType {
    /// Content length fixed by the type, or `None` when the wire carries an
    /// explicit length field.
    pub const fn static_len(self) -> Option<usize> {
        match self {
            DataType::Bool => Some(1),
            DataType::Double => Some(8),
            DataType::Enum | DataType::String => None,
        }
    }

    /// Type id as written on the wire.
    pub const fn id(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for DataType {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(DataType::Bool),
            1 => Ok(DataType::Enum),
            2 => Ok(DataType::String),
            3 => Ok(DataType::Double),
            other => Err(Error::UnknownType(other)),
        }
    }
}

/// A typed record value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// Boolean data point.
    Bool(bool),
    /// Enumerated data point, transferred as its text.
    Enum(&'a str),
    /// Free text data point.
    String(&'a str),
    /// Floating point data point.
    Double(f64),
}

impl<'a> Value<'a> {
    /// Wire type of this value.
    pub const fn data_type(&self) -> DataType {
        match self {
            Value::Bool(_) => DataType::Bool,
            Value::Enum(_) => DataType::Enum,
            Value::String(_) => DataType::String,
            Value::Double(_) => DataType::Double,
        }
    }
}

/// One decoded record. `content` borrows from the decoded input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    /// Data point identifier.
    pub tag_id: u32,
    /// Wire type.
    pub data_type: DataType,
    /// Raw content bytes.
    pub content: &'a [u8],
}

impl<'a> Record<'a> {
    /// Interpret the raw content according to the record type.
    pub fn value(&self) -> Result<Value<'a>, Error> {
        if let Some(len) = self.data_type.static_len() {
            if self.content.len() != len {
                return Err(Error::InvalidLength);
            }
        }

        match self.data_type {
            DataType::Bool => Ok(Value::Bool(self.content[0] != 0)),
            DataType::Double => {
                let mut bits = [0u8; 8];
                bits.copy_from_slice(self.content);
                Ok(Value::Double(f64::from_bits(u64::from_be_bytes(bits))))
            }
            DataType::Enum => core::str::from_utf8(self.content)
                .map(Value::Enum)
                .map_err(|_| Error::InvalidUtf8),
            DataType::String => core::str::from_utf8(self.content)
                .map(Value::String)
                .map_err(|_| Error::InvalidUtf8),
        }
    }
}

/// A single-record frame: header plus one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Packet header.
    pub header: Header,
    /// The record following the header.
    pub record: Record<'a>,
}
