//! Length-prefixed frame handling for Fetch request/response streams.
//!
//! Both directions of the wire protocol are framed as
//! `[size: i32][body]`. [`crate::fetch::FetchResponse::decode`] consumes
//! the size field itself, so the decoder half yields each inbound frame
//! intact, prefix included. The encoder half takes frames that already
//! carry their prefix (as produced by
//! [`crate::fetch::FetchRequest::encode`]) and validates the declared
//! size before writing.

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use logtide_common::{Error, Result};

/// Maximum frame size (100MB) to prevent OOM on hostile size prefixes
pub(crate) const MAX_FRAME_SIZE: usize = 100 * 1024 * 1024;

/// Splits a byte stream into complete length-prefixed frames
pub struct FetchFrameCodec {
    /// Maximum allowed frame size
    max_frame_size: usize,
}

impl FetchFrameCodec {
    /// Create a new frame codec with default settings
    pub fn new() -> Self {
        Self {
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    /// Create a new frame codec with custom max frame size
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }
}

impl Default for FetchFrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FetchFrameCodec {
    type Item = Bytes;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        // Need at least 4 bytes for the length prefix
        if src.len() < 4 {
            trace!("Not enough data for length prefix, have {} bytes", src.len());
            return Ok(None);
        }

        // Peek at the length without consuming
        let mut length_bytes = [0u8; 4];
        length_bytes.copy_from_slice(&src[..4]);
        let length = i32::from_be_bytes(length_bytes);

        if length < 0 {
            return Err(Error::Protocol(format!("Negative frame size: {}", length)));
        }
        let length = length as usize;

        if length > self.max_frame_size {
            return Err(Error::Protocol(format!(
                "Frame size {} exceeds maximum {}",
                length, self.max_frame_size
            )));
        }

        // Check if we have the complete frame
        if src.len() < 4 + length {
            trace!(
                "Waiting for complete frame, have {} bytes, need {}",
                src.len(),
                4 + length
            );
            src.reserve(4 + length - src.len());
            return Ok(None);
        }

        debug!("Decoding frame of {} bytes", length);

        // Yield the frame intact, prefix included
        let frame = src.split_to(4 + length).freeze();

        Ok(Some(frame))
    }
}

impl Encoder<Bytes> for FetchFrameCodec {
    type Error = Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        if item.len() < 4 {
            return Err(Error::Protocol(format!(
                "Frame of {} bytes is too short to carry a size prefix",
                item.len()
            )));
        }

        let mut length_bytes = [0u8; 4];
        length_bytes.copy_from_slice(&item[..4]);
        let declared = i32::from_be_bytes(length_bytes);

        if declared < 0 || declared as usize != item.len() - 4 {
            return Err(Error::Protocol(format!(
                "Declared frame size {} does not match body of {} bytes",
                declared,
                item.len() - 4
            )));
        }

        if item.len() - 4 > self.max_frame_size {
            return Err(Error::Protocol(format!(
                "Frame size {} exceeds maximum {}",
                item.len() - 4,
                self.max_frame_size
            )));
        }

        debug!("Encoding frame of {} bytes", item.len() - 4);

        dst.reserve(item.len());
        dst.put(item);

        Ok(())
    }
}
