//! Outgoing packet assembly.
//!
//! An [`OutgoingBuffer`] collects several records under one header so that a
//! whole telemetry snapshot goes out in a single write. It is owned by whoever
//! builds the packet and released explicitly once the send is done.

use super::{codec, Error, Flags, Header, Value};

/// Default capacity of an outgoing packet in bytes.
pub const DEFAULT_CAPACITY: usize = 256;

/// A fixed-capacity, append-only packet under construction.
///
/// # Examples
///
/// ```rust
/// use iotlink::network::application::tlv::{Flags, OutgoingBuffer, Packet, Value};
///
/// let mut buffer: OutgoingBuffer = OutgoingBuffer::new();
/// buffer.start(Flags::REQUEST, 42);
/// buffer.append_double(210117, 21.5).unwrap();
/// buffer.append_string(210130, "1700000000").unwrap();
///
/// let packet = Packet::parse(buffer.bytes().unwrap()).unwrap();
/// assert_eq!(packet.header.request_id, 42);
/// assert_eq!(packet.records().count(), 2);
/// ```
#[derive(Debug)]
pub struct OutgoingBuffer<const N: usize = DEFAULT_CAPACITY> {
    data: [u8; N],
    len: usize,
    records: usize,
    usable: bool,
}

impl<const N: usize> Default for OutgoingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> OutgoingBuffer<N> {
    /// Create an empty buffer. It must be [`start`](Self::start)ed before
    /// records can be appended.
    pub const fn new() -> Self {
        Self {
            data: [0; N],
            len: 0,
            records: 0,
            usable: false,
        }
    }

    /// Reset the cursor and write the shared header.
    pub fn start(&mut self, flags: Flags, request_id: u32) {
        self.len = 0;
        self.records = 0;
        match codec::encode_header(Header::new(flags, request_id), &mut self.data) {
            Ok(len) => {
                self.len = len;
                self.usable = true;
            }
            Err(_) => self.usable = false,
        }
    }

    /// Append a boolean record.
    pub fn append_bool(&mut self, tag_id: u32, value: bool) -> Result<(), Error> {
        self.append(tag_id, &Value::Bool(value))
    }

    /// Append an enum record.
    pub fn append_enum(&mut self, tag_id: u32, value: &str) -> Result<(), Error> {
        self.append(tag_id, &Value::Enum(value))
    }

    /// Append a string record.
    pub fn append_string(&mut self, tag_id: u32, value: &str) -> Result<(), Error> {
        self.append(tag_id, &Value::String(value))
    }

    /// Append a double record.
    pub fn append_double(&mut self, tag_id: u32, value: f64) -> Result<(), Error> {
        self.append(tag_id, &Value::Double(value))
    }

    /// Append any value. A failure poisons the packet: every later append and
    /// [`bytes`](Self::bytes) fail until the next [`start`](Self::start).
    pub fn append(&mut self, tag_id: u32, value: &Value<'_>) -> Result<(), Error> {
        if !self.usable {
            return Err(Error::Unusable);
        }
        match codec::encode_record(tag_id, value, &mut self.data[self.len..]) {
            Ok(written) => {
                self.len += written;
                self.records += 1;
                Ok(())
            }
            Err(e) => {
                self.usable = false;
                Err(e)
            }
        }
    }

    /// The finished packet.
    pub fn bytes(&self) -> Result<&[u8], Error> {
        if self.usable {
            Ok(&self.data[..self.len])
        } else {
            Err(Error::Unusable)
        }
    }

    /// Number of records appended since the last start.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Bytes left for further records.
    pub fn remaining(&self) -> usize {
        N - self.len
    }

    /// Drop the packet contents once the send has completed.
    pub fn release(&mut self) {
        self.len = 0;
        self.records = 0;
        self.usable = false;
    }
}
