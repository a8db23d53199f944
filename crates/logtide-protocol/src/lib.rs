//! Kafka Fetch wire protocol codec for logtide.
//!
//! This crate implements the v0 Fetch request/response pair of the
//! length-prefixed, big-endian Kafka wire protocol:
//! - Primitive encoding/decoding for protocol integers, strings, byte
//!   blobs and arrays
//! - Fetch request serialization with a patched size prefix
//! - Fetch response deserialization, including the embedded legacy
//!   message sets (message format v0)
//! - Broker error-code mapping
//! - Length-prefixed frame splitting for use with `tokio_util` codecs
//!
//! Compressed message payloads are not supported and are rejected on
//! decode. Message checksums are computed on encode but only surfaced,
//! never verified, on decode.

pub mod error_codes;
pub mod fetch;
pub mod frame;
pub mod message_set;
pub mod parser;

// Re-export main types
pub use error_codes::BrokerError;
pub use fetch::{
    FetchRequest, FetchRequestPartition, FetchRequestTopic, FetchResponse,
    FetchResponsePartition, FetchResponseTopic,
};
pub use frame::FetchFrameCodec;
pub use message_set::{decode_message_set, encode_message_set, Message};
pub use parser::{Decoder, Encoder};
