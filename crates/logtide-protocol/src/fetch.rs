//! Fetch request/response codec (Fetch API v0, message format v0).
//!
//! A Fetch request asks the broker for messages starting at given offsets
//! across a set of topic-partitions; the response carries, per partition,
//! an error code, the highest available offset and a message set. Both
//! directions are framed as `[size: i32][body]` with the declared size
//! equal to the byte count following the size field.

use std::io::{self, Read, Write};
use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use logtide_common::{Error, Result};

use crate::error_codes::BrokerError;
use crate::frame::MAX_FRAME_SIZE;
use crate::message_set::{decode_message_set, Message};
use crate::parser::{Decoder, Encoder};

/// Fetch API key
pub const API_KEY_FETCH: i16 = 1;

/// Wire format version implemented by this codec
pub const API_VERSION: i16 = 0;

/// Replica id sent by ordinary clients; only brokers fetch as replicas
const REPLICA_ID_CLIENT: i32 = -1;

/// Fetch request
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Opaque id echoed back by the broker; matching responses to
    /// requests is the caller's responsibility
    pub correlation_id: i32,
    /// Client name, used for broker-side logging and quotas
    pub client_id: String,
    /// How long the broker may wait for `min_bytes` to accumulate.
    /// Truncated to whole milliseconds on encode.
    pub max_wait: Duration,
    /// Minimum bytes the broker should accumulate before replying
    pub min_bytes: i32,
    pub topics: Vec<FetchRequestTopic>,
}

/// Fetch request topic
#[derive(Debug, Clone)]
pub struct FetchRequestTopic {
    pub name: String,
    pub partitions: Vec<FetchRequestPartition>,
}

/// Fetch request partition
#[derive(Debug, Clone)]
pub struct FetchRequestPartition {
    pub partition: i32,
    pub fetch_offset: i64,
    /// Maximum bytes the broker may return for this partition
    pub max_bytes: i32,
}

/// Fetch response
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub correlation_id: i32,
    pub topics: Vec<FetchResponseTopic>,
}

/// Fetch response topic
#[derive(Debug, Clone)]
pub struct FetchResponseTopic {
    pub name: String,
    pub partitions: Vec<FetchResponsePartition>,
}

/// Fetch response partition
#[derive(Debug, Clone)]
pub struct FetchResponsePartition {
    pub partition: i32,
    /// Broker-reported error for this partition, `None` for code 0.
    /// Does not abort decoding of sibling partitions; callers must
    /// inspect it before trusting `messages`.
    pub error: Option<BrokerError>,
    /// Highest offset currently available in this partition
    pub high_watermark: i64,
    pub messages: Vec<Message>,
}

impl FetchRequest {
    /// Encode the request to a complete wire frame, size prefix included.
    ///
    /// The size field is written as a placeholder and patched once the
    /// body length is known, so the sink never needs to seek.
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        let mut encoder = Encoder::new(&mut buf);

        encoder.write_i32(0); // size placeholder, patched below
        encoder.write_i16(API_KEY_FETCH);
        encoder.write_i16(API_VERSION);
        encoder.write_i32(self.correlation_id);
        encoder.write_string(Some(&self.client_id));
        encoder.write_i32(REPLICA_ID_CLIENT);
        encoder.write_i32(self.max_wait.as_millis() as i32);
        encoder.write_i32(self.min_bytes);

        encoder.write_array_len(self.topics.len());
        for topic in &self.topics {
            encoder.write_string(Some(&topic.name));
            encoder.write_array_len(topic.partitions.len());
            for partition in &topic.partitions {
                encoder.write_i32(partition.partition);
                encoder.write_i64(partition.fetch_offset);
                encoder.write_i32(partition.max_bytes);
            }
        }

        let size = (buf.len() - 4) as i32;
        buf[0..4].copy_from_slice(&size.to_be_bytes());

        trace!("Encoded Fetch request: {} bytes, correlation_id={}", buf.len(), self.correlation_id);

        Ok(buf.freeze())
    }

    /// Encode the request and write it to an ordered byte sink.
    /// Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let frame = self.encode()?;
        writer.write_all(&frame)?;
        Ok(frame.len())
    }
}

impl FetchResponse {
    /// Decode a response from a buffer holding one complete frame.
    ///
    /// Reads and discards the envelope size, then the correlation id and
    /// the nested topic/partition results; each partition's message set
    /// is handed to [`decode_message_set`] as a view bounded to exactly
    /// the declared set size. Any failure abandons the whole response -
    /// partial results are discarded, not returned.
    pub fn decode(buf: &mut dyn Buf) -> Result<FetchResponse> {
        let mut decoder = Decoder::new(buf);

        let _size = decoder.read_i32()?;
        let correlation_id = decoder.read_i32()?;

        let topic_count = decoder.read_array_len()?;
        let mut topics = Vec::with_capacity(topic_count.min(32));

        for _ in 0..topic_count {
            let name = decoder
                .read_string()?
                .ok_or_else(|| Error::Protocol("Topic name cannot be null".into()))?;

            let partition_count = decoder.read_array_len()?;
            let mut partitions = Vec::with_capacity(partition_count.min(32));

            for _ in 0..partition_count {
                let partition = decoder.read_i32()?;
                let error = BrokerError::from_code(decoder.read_i16()?);
                let high_watermark = decoder.read_i64()?;

                let set_size = decoder.read_i32()?;
                if set_size < 0 {
                    return Err(Error::Protocol(format!(
                        "Negative message set size: {}",
                        set_size
                    )));
                }

                let set = decoder.read_raw_bytes(set_size as usize)?;
                let messages = decode_message_set(set)?;

                trace!(
                    "  partition {}: {} messages, high watermark {}",
                    partition,
                    messages.len(),
                    high_watermark
                );

                partitions.push(FetchResponsePartition {
                    partition,
                    error,
                    high_watermark,
                    messages,
                });
            }

            topics.push(FetchResponseTopic { name, partitions });
        }

        debug!(
            "Decoded Fetch response: correlation_id={}, topics={}",
            correlation_id,
            topics.len()
        );

        Ok(FetchResponse {
            correlation_id,
            topics,
        })
    }

    /// Read one complete response frame from an ordered byte source and
    /// decode it.
    ///
    /// The whole response must arrive as one logical byte stream; there
    /// is no support for resuming after a partial read.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<FetchResponse> {
        let mut size_bytes = [0u8; 4];
        reader.read_exact(&mut size_bytes).map_err(map_read_err)?;

        let size = i32::from_be_bytes(size_bytes);
        if size < 0 {
            return Err(Error::Protocol(format!("Negative frame size: {}", size)));
        }
        if size as usize > MAX_FRAME_SIZE {
            return Err(Error::Protocol(format!(
                "Frame size {} exceeds maximum {}",
                size, MAX_FRAME_SIZE
            )));
        }

        let mut frame = BytesMut::with_capacity(4 + size as usize);
        frame.put_slice(&size_bytes);
        frame.resize(4 + size as usize, 0);
        reader.read_exact(&mut frame[4..]).map_err(map_read_err)?;

        let mut buf = frame.freeze();
        Self::decode(&mut buf)
    }
}

fn map_read_err(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::UnexpectedEof("stream ended mid-frame".into())
    } else {
        Error::Io(e)
    }
}
