//! Property-based fuzzing tests for the Fetch codec.
//!
//! These tests use proptest to generate random inputs and verify
//! that the decoders handle them correctly without panicking.

use bytes::{Bytes, BytesMut};
use logtide_protocol::fetch::FetchResponse;
use logtide_protocol::message_set::{decode_message_set, encode_message_set, Message};
use logtide_protocol::parser::{Decoder, Encoder};
use proptest::prelude::*;

fn optional_blob() -> impl Strategy<Value = Option<Vec<u8>>> {
    prop::option::of(prop::collection::vec(any::<u8>(), 0..64))
}

proptest! {
    /// Arbitrary bytes never panic the response decoder
    #[test]
    fn prop_response_decode_no_panic(data: Vec<u8>) {
        let mut buf = Bytes::from(data);
        // Can either succeed or return an error
        let _ = FetchResponse::decode(&mut buf);
    }

    /// Arbitrary bytes never panic the message-set decoder
    #[test]
    fn prop_message_set_decode_no_panic(data: Vec<u8>) {
        let _ = decode_message_set(Bytes::from(data));
    }

    /// Encoded message sets decode back to the same entries
    #[test]
    fn prop_message_set_round_trip(
        entries in prop::collection::vec((any::<i64>(), optional_blob(), optional_blob()), 0..8)
    ) {
        let messages: Vec<Message> = entries
            .into_iter()
            .map(|(offset, key, value)| Message {
                offset,
                crc: 0,
                key: key.map(Bytes::from),
                value: value.map(Bytes::from),
            })
            .collect();

        let set = encode_message_set(&messages).unwrap();
        let decoded = decode_message_set(set).unwrap();

        prop_assert_eq!(decoded.len(), messages.len());
        for (got, want) in decoded.iter().zip(&messages) {
            prop_assert_eq!(got.offset, want.offset);
            prop_assert_eq!(&got.key, &want.key);
            prop_assert_eq!(&got.value, &want.value);
        }
    }

    /// Every encoded message checksums its own remainder
    #[test]
    fn prop_message_crc_covers_remainder(key in optional_blob(), value in optional_blob()) {
        let message = Message {
            offset: 0,
            crc: 0,
            key: key.map(Bytes::from),
            value: value.map(Bytes::from),
        };

        let frame = message.encode().unwrap();
        let stored = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]);
        prop_assert_eq!(stored, crc32fast::hash(&frame[4..]));
    }

    /// Strings round-trip through the primitive codec, null included
    #[test]
    fn prop_string_round_trip(s in prop::option::of("[a-zA-Z0-9._-]{0,64}")) {
        let mut buf = BytesMut::new();
        let mut encoder = Encoder::new(&mut buf);
        encoder.write_string(s.as_deref());

        let mut frozen = buf.freeze();
        let mut decoder = Decoder::new(&mut frozen);
        prop_assert_eq!(decoder.read_string().unwrap(), s);
        prop_assert!(!decoder.has_remaining());
    }

    /// Byte blobs round-trip, with null distinct from empty
    #[test]
    fn prop_bytes_round_trip(blob in optional_blob()) {
        let mut buf = BytesMut::new();
        let mut encoder = Encoder::new(&mut buf);
        encoder.write_bytes(blob.as_deref());

        let mut frozen = buf.freeze();
        let mut decoder = Decoder::new(&mut frozen);
        prop_assert_eq!(decoder.read_bytes().unwrap(), blob.map(Bytes::from));
        prop_assert!(!decoder.has_remaining());
    }
}
