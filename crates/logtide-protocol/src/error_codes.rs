//! Kafka protocol error codes
//!
//! Standard error codes from the Kafka protocol specification, as a
//! broker may report them per partition in a Fetch response.
//! See: https://kafka.apache.org/protocol#protocol_error_codes

use thiserror::Error;

/// An unexpected server-side error
pub const UNKNOWN_SERVER_ERROR: i16 = -1;

/// No error occurred
pub const NONE: i16 = 0;

/// The requested offset is out of range
pub const OFFSET_OUT_OF_RANGE: i16 = 1;

/// The message contents do not match the CRC
pub const CORRUPT_MESSAGE: i16 = 2;

/// This server does not host this topic-partition
pub const UNKNOWN_TOPIC_OR_PARTITION: i16 = 3;

/// The requested fetch size is invalid
pub const INVALID_FETCH_SIZE: i16 = 4;

/// There is no leader for this topic-partition
pub const LEADER_NOT_AVAILABLE: i16 = 5;

/// This broker is not the leader for that topic-partition
pub const NOT_LEADER_FOR_PARTITION: i16 = 6;

/// The request timed out
pub const REQUEST_TIMED_OUT: i16 = 7;

/// The broker is not available
pub const BROKER_NOT_AVAILABLE: i16 = 8;

/// The replica is not available for the requested topic-partition
pub const REPLICA_NOT_AVAILABLE: i16 = 9;

/// The message is larger than the broker accepts
pub const MESSAGE_SIZE_TOO_LARGE: i16 = 10;

/// The controller moved to another broker
pub const STALE_CONTROLLER_EPOCH: i16 = 11;

/// The committing offset metadata is too large
pub const OFFSET_METADATA_TOO_LARGE: i16 = 12;

/// The coordinator is still loading offsets
pub const OFFSET_LOAD_IN_PROGRESS: i16 = 14;

/// The group coordinator is not available
pub const COORDINATOR_NOT_AVAILABLE: i16 = 15;

/// This broker is not the coordinator for that group
pub const NOT_COORDINATOR: i16 = 16;

/// A broker-reported error, decoded from the numeric code a partition
/// result carries on the wire.
///
/// The numeric mapping is not total: codes outside the known table decode
/// to [`BrokerError::Unknown`] rather than failing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerError {
    #[error("unexpected server error")]
    UnknownServerError,
    #[error("offset out of range")]
    OffsetOutOfRange,
    #[error("message contents do not match checksum")]
    CorruptMessage,
    #[error("unknown topic or partition")]
    UnknownTopicOrPartition,
    #[error("invalid fetch size")]
    InvalidFetchSize,
    #[error("leader not available")]
    LeaderNotAvailable,
    #[error("not leader for partition")]
    NotLeaderForPartition,
    #[error("request timed out")]
    RequestTimedOut,
    #[error("broker not available")]
    BrokerNotAvailable,
    #[error("replica not available")]
    ReplicaNotAvailable,
    #[error("message size too large")]
    MessageSizeTooLarge,
    #[error("stale controller epoch")]
    StaleControllerEpoch,
    #[error("offset metadata too large")]
    OffsetMetadataTooLarge,
    #[error("offset load in progress")]
    OffsetLoadInProgress,
    #[error("coordinator not available")]
    CoordinatorNotAvailable,
    #[error("not coordinator")]
    NotCoordinator,
    #[error("unknown broker error code {0}")]
    Unknown(i16),
}

impl BrokerError {
    /// Map a wire error code to a broker error. Code 0 means no error and
    /// maps to `None`.
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            NONE => None,
            UNKNOWN_SERVER_ERROR => Some(Self::UnknownServerError),
            OFFSET_OUT_OF_RANGE => Some(Self::OffsetOutOfRange),
            CORRUPT_MESSAGE => Some(Self::CorruptMessage),
            UNKNOWN_TOPIC_OR_PARTITION => Some(Self::UnknownTopicOrPartition),
            INVALID_FETCH_SIZE => Some(Self::InvalidFetchSize),
            LEADER_NOT_AVAILABLE => Some(Self::LeaderNotAvailable),
            NOT_LEADER_FOR_PARTITION => Some(Self::NotLeaderForPartition),
            REQUEST_TIMED_OUT => Some(Self::RequestTimedOut),
            BROKER_NOT_AVAILABLE => Some(Self::BrokerNotAvailable),
            REPLICA_NOT_AVAILABLE => Some(Self::ReplicaNotAvailable),
            MESSAGE_SIZE_TOO_LARGE => Some(Self::MessageSizeTooLarge),
            STALE_CONTROLLER_EPOCH => Some(Self::StaleControllerEpoch),
            OFFSET_METADATA_TOO_LARGE => Some(Self::OffsetMetadataTooLarge),
            OFFSET_LOAD_IN_PROGRESS => Some(Self::OffsetLoadInProgress),
            COORDINATOR_NOT_AVAILABLE => Some(Self::CoordinatorNotAvailable),
            NOT_COORDINATOR => Some(Self::NotCoordinator),
            other => Some(Self::Unknown(other)),
        }
    }

    /// The wire code for this error
    pub fn code(&self) -> i16 {
        match self {
            Self::UnknownServerError => UNKNOWN_SERVER_ERROR,
            Self::OffsetOutOfRange => OFFSET_OUT_OF_RANGE,
            Self::CorruptMessage => CORRUPT_MESSAGE,
            Self::UnknownTopicOrPartition => UNKNOWN_TOPIC_OR_PARTITION,
            Self::InvalidFetchSize => INVALID_FETCH_SIZE,
            Self::LeaderNotAvailable => LEADER_NOT_AVAILABLE,
            Self::NotLeaderForPartition => NOT_LEADER_FOR_PARTITION,
            Self::RequestTimedOut => REQUEST_TIMED_OUT,
            Self::BrokerNotAvailable => BROKER_NOT_AVAILABLE,
            Self::ReplicaNotAvailable => REPLICA_NOT_AVAILABLE,
            Self::MessageSizeTooLarge => MESSAGE_SIZE_TOO_LARGE,
            Self::StaleControllerEpoch => STALE_CONTROLLER_EPOCH,
            Self::OffsetMetadataTooLarge => OFFSET_METADATA_TOO_LARGE,
            Self::OffsetLoadInProgress => OFFSET_LOAD_IN_PROGRESS,
            Self::CoordinatorNotAvailable => COORDINATOR_NOT_AVAILABLE,
            Self::NotCoordinator => NOT_COORDINATOR,
            Self::Unknown(code) => *code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_means_no_error() {
        assert_eq!(BrokerError::from_code(NONE), None);
    }

    #[test]
    fn test_known_codes_round_trip() {
        for code in [-1, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 15, 16] {
            let err = BrokerError::from_code(code).expect("known code");
            assert_eq!(err.code(), code);
            assert!(!matches!(err, BrokerError::Unknown(_)));
        }
    }

    #[test]
    fn test_unknown_code_falls_back() {
        let err = BrokerError::from_code(999).expect("nonzero code");
        assert_eq!(err, BrokerError::Unknown(999));
        assert_eq!(err.code(), 999);
    }
}
