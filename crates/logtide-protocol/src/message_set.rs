//! Legacy Kafka message format (v0) and message-set handling.
//!
//! A message set is not an array: it is a byte-run of concatenated
//! `offset | size | message` entries filling exactly the size declared by
//! the enclosing partition response, with no element count of its own.

use bytes::{BufMut, Bytes, BytesMut};
use crc32fast::Hasher;

use logtide_common::{Error, Result};

use crate::parser::{Decoder, Encoder};

/// Magic byte for message format v0
const MAGIC_V0: i8 = 0;

/// Attributes value for an uncompressed message
const COMPRESSION_NONE: i8 = 0;

/// A single log message.
///
/// `offset` is assigned by the broker; producers encode messages without
/// one. `crc` is the stored checksum as read off the wire - the decoder
/// extracts it but does not verify it, so callers that want verification
/// re-hash the payload themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub offset: i64,
    pub crc: u32,
    pub key: Option<Bytes>,
    pub value: Option<Bytes>,
}

impl Message {
    /// Encode the message body to its on-wire frame.
    ///
    /// The frame is `crc | magic | attributes | key | value`; the leading
    /// 4 bytes are always a valid CRC32-IEEE checksum of the remainder,
    /// patched in after the body is written. The offset and size fields
    /// belong to the enclosing message set, not to the message itself.
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();

        buf.put_u32(0); // crc placeholder, patched below
        buf.put_i8(MAGIC_V0);
        buf.put_i8(COMPRESSION_NONE);

        let mut encoder = Encoder::new(&mut buf);
        encoder.write_bytes(self.key.as_deref());
        encoder.write_bytes(self.value.as_deref());

        let mut hasher = Hasher::new();
        hasher.update(&buf[4..]);
        let crc = hasher.finalize();
        buf[0..4].copy_from_slice(&crc.to_be_bytes());

        Ok(buf.freeze())
    }
}

/// Decode a message set from a view bounded to exactly the declared set
/// size.
///
/// Entries are read until the view is exhausted. Running out of input
/// right at an entry boundary is the normal end of the set; running out
/// anywhere inside an entry is an error. A nonzero attributes byte marks
/// a compressed message and fails the decode - silently treating its
/// payload as an uncompressed record would corrupt it.
pub fn decode_message_set(data: Bytes) -> Result<Vec<Message>> {
    let mut buf = data;
    let mut decoder = Decoder::new(&mut buf);
    let mut messages = Vec::new();

    while decoder.has_remaining() {
        let offset = decoder.read_i64()?;
        let _message_size = decoder.read_i32()?;
        let crc = decoder.read_u32()?;
        let _magic = decoder.read_i8()?;

        let attributes = decoder.read_i8()?;
        if attributes != COMPRESSION_NONE {
            return Err(Error::UnsupportedCompression(attributes));
        }

        let key = decoder.read_bytes()?;
        let value = decoder.read_bytes()?;

        messages.push(Message {
            offset,
            crc,
            key,
            value,
        });
    }

    Ok(messages)
}

/// Encode a run of messages as a message set: `offset | size | message`
/// per entry, no outer element count.
pub fn encode_message_set(messages: &[Message]) -> Result<Bytes> {
    let mut buf = BytesMut::new();

    for message in messages {
        let frame = message.encode()?;
        buf.put_i64(message.offset);
        buf.put_i32(frame.len() as i32);
        buf.put_slice(&frame);
    }

    Ok(buf.freeze())
}
