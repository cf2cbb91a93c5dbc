//! Encoding and decoding of TLV frames.
//!
//! The codec is pure: it never allocates and only ever writes into the
//! caller-supplied destination. Room is checked field by field, so a failed
//! encode can leave a partial frame behind. Callers must treat the whole
//! destination as garbage once any encode call fails.

use super::{varint, DataType, Error, Flags, Frame, Header, Record, Value, HEADER_LEN};

/// Cursor over a destination slice that checks room before every field.
struct Writer<'a> {
    dst: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(dst: &'a mut [u8]) -> Self {
        Self { dst, pos: 0 }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let end = self.pos + bytes.len();
        if end > self.dst.len() {
            return Err(Error::BufferTooSmall);
        }
        self.dst[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn put_varint(&mut self, value: u32) -> Result<(), Error> {
        self.pos += varint::encode(value, &mut self.dst[self.pos..])?;
        Ok(())
    }
}

/// Cursor over a source slice that reports [`Error::Truncated`] instead of
/// reading past its end.
struct Reader<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a [u8]) -> Self {
        Self { src, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let end = self.pos.checked_add(len).ok_or(Error::Truncated)?;
        let bytes = self.src.get(self.pos..end).ok_or(Error::Truncated)?;
        self.pos = end;
        Ok(bytes)
    }

    fn take_varint(&mut self) -> Result<u32, Error> {
        let (value, len) = varint::decode(&self.src[self.pos..])?;
        self.pos += len;
        Ok(value)
    }
}

/// Write the shared packet header (flags and request id).
pub fn encode_header(header: Header, dst: &mut [u8]) -> Result<usize, Error> {
    let mut w = Writer::new(dst);
    w.put(&[header.flags.bits()])?;
    w.put(&header.request_id.to_be_bytes())?;
    Ok(w.pos)
}

/// Write one record without a header.
pub fn encode_record(tag_id: u32, value: &Value<'_>, dst: &mut [u8]) -> Result<usize, Error> {
    let data_type = value.data_type();
    let mut w = Writer::new(dst);

    w.put_varint(tag_id)?;
    w.put_varint(data_type.id())?;

    match value {
        Value::Bool(b) => w.put(&[u8::from(*b)])?,
        Value::Double(d) => w.put(&d.to_bits().to_be_bytes())?,
        Value::Enum(text) | Value::String(text) => {
            let len = u32::try_from(text.len()).map_err(|_| Error::ValueTooLarge)?;
            w.put_varint(len)?;
            w.put(text.as_bytes())?;
        }
    }

    Ok(w.pos)
}

/// Write a complete single-record frame and return its length.
///
/// # Examples
///
/// ```rust
/// use iotlink::network::application::tlv::{self, Flags, Header, Value};
///
/// let mut buf = [0u8; 16];
/// let len = tlv::encode(Header::new(Flags::REQUEST, 7), 3, &Value::Bool(true), &mut buf).unwrap();
/// assert_eq!(&buf[..len], &[0x01, 0, 0, 0, 7, 0x03, 0x00, 0x01]);
/// ```
pub fn encode(
    header: Header,
    tag_id: u32,
    value: &Value<'_>,
    dst: &mut [u8],
) -> Result<usize, Error> {
    let head = encode_header(header, dst)?;
    let body = encode_record(tag_id, value, &mut dst[head..])?;
    Ok(head + body)
}

/// Read the shared packet header.
pub fn decode_header(src: &[u8]) -> Result<(Header, usize), Error> {
    let mut r = Reader::new(src);
    let flags = Flags::from_bits_truncate(r.take(1)?[0]);
    let id = r.take(4)?;
    let request_id = u32::from_be_bytes([id[0], id[1], id[2], id[3]]);
    Ok((Header::new(flags, request_id), r.pos))
}

/// Read one header-less record, returning it with the number of bytes
/// consumed.
pub fn decode_record(src: &[u8]) -> Result<(Record<'_>, usize), Error> {
    let mut r = Reader::new(src);
    let tag_id = r.take_varint()?;
    let data_type = DataType::try_from(r.take_varint()?)?;
    let len = match data_type.static_len() {
        Some(len) => len,
        None => r.take_varint()? as usize,
    };
    let content = r.take(len)?;

    Ok((
        Record {
            tag_id,
            data_type,
            content,
        },
        r.pos,
    ))
}

/// Read a single-record frame. Bytes after the record are ignored.
pub fn decode(src: &[u8]) -> Result<Frame<'_>, Error> {
    let (header, head) = decode_header(src)?;
    let (record, _) = decode_record(&src[head..])?;
    Ok(Frame { header, record })
}

/// A packet: one header followed by any number of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    /// The shared header.
    pub header: Header,
    body: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Parse the header of a packet. Records are decoded lazily by
    /// [`Packet::records`].
    pub fn parse(src: &'a [u8]) -> Result<Self, Error> {
        let (header, head) = decode_header(src)?;
        debug_assert_eq!(head, HEADER_LEN);
        Ok(Self {
            header,
            body: &src[head..],
        })
    }

    /// Iterate over the records. The iterator ends after yielding the first
    /// error.
    pub fn records(&self) -> Records<'a> {
        Records { rest: self.body }
    }
}

/// Iterator over the records of a [`Packet`].
#[derive(Debug, Clone)]
pub struct Records<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match decode_record(self.rest) {
            Ok((record, used)) => {
                self.rest = &self.rest[used..];
                Some(Ok(record))
            }
            Err(e) => {
                self.rest = &[];
                Some(Err(e))
            }
        }
    }
}
