//! Wire protocol primitives.
//!
//! All multi-byte values are big-endian. Strings carry an i16 length
//! prefix, byte blobs an i32 length prefix; a length of -1 marks a null
//! value, which is distinct from a zero-length one. Arrays carry an i32
//! element count and nothing else - elements are written by the caller.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use logtide_common::{Error, Result};

/// Protocol decoder for reading wire protocol primitives.
///
/// Every read checks the remaining input first and fails with
/// [`Error::UnexpectedEof`] before consuming anything, so a failed
/// decode never leaves a value half-read.
pub struct Decoder<'a> {
    buf: &'a mut dyn Buf,
}

impl<'a> Decoder<'a> {
    /// Create a new decoder
    pub fn new(buf: &'a mut dyn Buf) -> Self {
        Self { buf }
    }

    /// Whether any unread bytes remain in the underlying buffer
    pub fn has_remaining(&self) -> bool {
        self.buf.has_remaining()
    }

    /// Read an i8
    pub fn read_i8(&mut self) -> Result<i8> {
        if self.buf.remaining() < 1 {
            return Err(Error::UnexpectedEof("not enough bytes for i8".into()));
        }
        Ok(self.buf.get_i8())
    }

    /// Read an i16
    pub fn read_i16(&mut self) -> Result<i16> {
        if self.buf.remaining() < 2 {
            return Err(Error::UnexpectedEof("not enough bytes for i16".into()));
        }
        Ok(self.buf.get_i16())
    }

    /// Read an i32
    pub fn read_i32(&mut self) -> Result<i32> {
        if self.buf.remaining() < 4 {
            return Err(Error::UnexpectedEof("not enough bytes for i32".into()));
        }
        Ok(self.buf.get_i32())
    }

    /// Read an i64
    pub fn read_i64(&mut self) -> Result<i64> {
        if self.buf.remaining() < 8 {
            return Err(Error::UnexpectedEof("not enough bytes for i64".into()));
        }
        Ok(self.buf.get_i64())
    }

    /// Read a u8
    pub fn read_u8(&mut self) -> Result<u8> {
        if self.buf.remaining() < 1 {
            return Err(Error::UnexpectedEof("not enough bytes for u8".into()));
        }
        Ok(self.buf.get_u8())
    }

    /// Read a u16
    pub fn read_u16(&mut self) -> Result<u16> {
        if self.buf.remaining() < 2 {
            return Err(Error::UnexpectedEof("not enough bytes for u16".into()));
        }
        Ok(self.buf.get_u16())
    }

    /// Read a u32
    pub fn read_u32(&mut self) -> Result<u32> {
        if self.buf.remaining() < 4 {
            return Err(Error::UnexpectedEof("not enough bytes for u32".into()));
        }
        Ok(self.buf.get_u32())
    }

    /// Read a u64
    pub fn read_u64(&mut self) -> Result<u64> {
        if self.buf.remaining() < 8 {
            return Err(Error::UnexpectedEof("not enough bytes for u64".into()));
        }
        Ok(self.buf.get_u64())
    }

    /// Read a string (null = -1 length)
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let len = self.read_i16()?;
        if len < 0 {
            return Ok(None);
        }

        let len = len as usize;
        if self.buf.remaining() < len {
            return Err(Error::UnexpectedEof(format!(
                "not enough bytes for string of length {}",
                len
            )));
        }

        let mut bytes = vec![0u8; len];
        self.buf.copy_to_slice(&mut bytes);

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| Error::Protocol(format!("Invalid UTF-8 in string: {}", e)))
    }

    /// Read a byte blob (null = -1 length)
    pub fn read_bytes(&mut self) -> Result<Option<Bytes>> {
        let len = self.read_i32()?;
        if len < 0 {
            return Ok(None);
        }

        let len = len as usize;
        if self.buf.remaining() < len {
            return Err(Error::UnexpectedEof(format!(
                "not enough bytes for byte blob of length {}",
                len
            )));
        }

        Ok(Some(self.buf.copy_to_bytes(len)))
    }

    /// Read an array element count
    pub fn read_array_len(&mut self) -> Result<usize> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(Error::Protocol(format!("Negative array length: {}", len)));
        }
        Ok(len as usize)
    }

    /// Read exactly `len` raw bytes as a bounded sub-view
    pub fn read_raw_bytes(&mut self, len: usize) -> Result<Bytes> {
        if self.buf.remaining() < len {
            return Err(Error::UnexpectedEof(format!(
                "not enough bytes for raw block of length {}",
                len
            )));
        }
        Ok(self.buf.copy_to_bytes(len))
    }
}

/// Protocol encoder for writing wire protocol primitives.
///
/// Writes into a growable buffer and cannot fail; fallibility lives at
/// the sink boundary, not here.
pub struct Encoder<'a> {
    buf: &'a mut BytesMut,
}

impl<'a> Encoder<'a> {
    /// Create a new encoder
    pub fn new(buf: &'a mut BytesMut) -> Self {
        Self { buf }
    }

    /// Write an i8
    pub fn write_i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    /// Write an i16
    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_i16(value);
    }

    /// Write an i32
    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    /// Write an i64
    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_i64(value);
    }

    /// Write a u8
    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    /// Write a u16
    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16(value);
    }

    /// Write a u32
    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    /// Write a u64
    pub fn write_u64(&mut self, value: u64) {
        self.buf.put_u64(value);
    }

    /// Write a string (null = None)
    pub fn write_string(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                self.write_i16(s.len() as i16);
                self.buf.put_slice(s.as_bytes());
            }
            None => {
                self.write_i16(-1);
            }
        }
    }

    /// Write a byte blob (null = None)
    pub fn write_bytes(&mut self, value: Option<&[u8]>) {
        match value {
            Some(bytes) => {
                self.write_i32(bytes.len() as i32);
                self.buf.put_slice(bytes);
            }
            None => {
                self.write_i32(-1);
            }
        }
    }

    /// Write an array element count
    pub fn write_array_len(&mut self, len: usize) {
        self.write_i32(len as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_encoding() {
        let mut buf = BytesMut::new();
        let mut encoder = Encoder::new(&mut buf);

        encoder.write_string(Some("hello"));
        encoder.write_string(None);
        encoder.write_string(Some(""));

        let mut frozen_buf = buf.freeze();
        let mut decoder = Decoder::new(&mut frozen_buf);
        assert_eq!(decoder.read_string().unwrap(), Some("hello".to_string()));
        assert_eq!(decoder.read_string().unwrap(), None);
        assert_eq!(decoder.read_string().unwrap(), Some("".to_string()));
    }

    #[test]
    fn test_bytes_null_distinct_from_empty() {
        let mut buf = BytesMut::new();
        let mut encoder = Encoder::new(&mut buf);

        encoder.write_bytes(None);
        encoder.write_bytes(Some(&[]));
        encoder.write_bytes(Some(b"abc"));

        let mut frozen_buf = buf.freeze();
        let mut decoder = Decoder::new(&mut frozen_buf);
        assert_eq!(decoder.read_bytes().unwrap(), None);
        assert_eq!(decoder.read_bytes().unwrap(), Some(Bytes::new()));
        assert_eq!(decoder.read_bytes().unwrap(), Some(Bytes::from_static(b"abc")));
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn test_integer_wire_layout() {
        let mut buf = BytesMut::new();
        let mut encoder = Encoder::new(&mut buf);

        encoder.write_i16(-1);
        encoder.write_i32(12345);
        encoder.write_i64(1 << 33);

        assert_eq!(
            buf.to_vec(),
            vec![
                0xff, 0xff, // -1
                0x00, 0x00, 0x30, 0x39, // 12345
                0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, // 1 << 33
            ]
        );
    }

    #[test]
    fn test_unsigned_round_trip() {
        let mut buf = BytesMut::new();
        let mut encoder = Encoder::new(&mut buf);
        encoder.write_u8(0xff);
        encoder.write_u16(0xbeef);
        encoder.write_u32(0xdead_beef);
        encoder.write_u64(u64::MAX);

        let mut frozen_buf = buf.freeze();
        let mut decoder = Decoder::new(&mut frozen_buf);
        assert_eq!(decoder.read_u8().unwrap(), 0xff);
        assert_eq!(decoder.read_u16().unwrap(), 0xbeef);
        assert_eq!(decoder.read_u32().unwrap(), 0xdead_beef);
        assert_eq!(decoder.read_u64().unwrap(), u64::MAX);
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn test_short_read_is_eof() {
        let mut buf = Bytes::from_static(&[0x00, 0x01]);
        let mut decoder = Decoder::new(&mut buf);
        let err = decoder.read_i32().unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof(_)));
    }

    #[test]
    fn test_truncated_string_is_eof() {
        // Declares 5 bytes but carries 2
        let mut buf = Bytes::from_static(&[0x00, 0x05, b'h', b'i']);
        let mut decoder = Decoder::new(&mut buf);
        let err = decoder.read_string().unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof(_)));
    }

    #[test]
    fn test_negative_array_len_rejected() {
        let mut buf = Bytes::from_static(&[0xff, 0xff, 0xff, 0xfe]);
        let mut decoder = Decoder::new(&mut buf);
        let err = decoder.read_array_len().unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn test_raw_bytes_bounded_view() {
        let mut buf = Bytes::from_static(b"abcdef");
        let mut decoder = Decoder::new(&mut buf);
        assert_eq!(decoder.read_raw_bytes(4).unwrap(), Bytes::from_static(b"abcd"));
        let err = decoder.read_raw_bytes(4).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof(_)));
    }
}
