//! Crate & protocol level errors.
//!
//! # Error Hierarchy
//!
//! - [`Error`]: everything a call into this crate can fail with. Codec
//!   failures ([`Error::Encoding`], [`Error::Decoding`]) abort the call before
//!   or after the round trip; transport failures are wrapped with the name of
//!   the operation that issued them.
//! - [`TransportError`]: failures reported by the [`Transport`] collaborator.
//!   Opaque to this layer and never retried here.
//! - [`BrokerError`]: a non-zero `(error_code, error_message)` pair returned
//!   by the broker. Per-item broker errors (one ACL filter out of many) are
//!   attached to their own result instead of failing the call.
//! - [`KafkaCode`]: the wire taxonomy of broker error codes.
//!
//! [`Transport`]: crate::client::Transport

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::{io, result, time::Duration};
use thiserror::Error as ThisError;

use crate::protocol::ApiKey;

pub type Result<T> = result::Result<T, Error>;

/// Errors returned by the crate.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum Error {
    /// A message could not be serialized (missing required field, value out
    /// of representable range, value of the wrong kind).
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A byte stream could not be parsed (truncated buffer, malformed length
    /// prefix, invalid UTF-8, trailing garbage).
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// The transport collaborator failed the round trip.
    #[error("{operation}: {source}")]
    Transport {
        operation: &'static str,
        source: TransportError,
    },

    /// The round trip did not complete within the configured request timeout.
    #[error("{operation}: request timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// The broker rejected the request as a whole.
    #[error(transparent)]
    Broker(BrokerError),

    /// Cluster metadata has no elected (or no known) controller.
    #[error("No controller available in cluster metadata")]
    NoController,

    /// The API is known but no mutually supported version exists.
    #[error("Unsupported version {version} for {}", .api_key.as_str())]
    UnsupportedVersion { api_key: ApiKey, version: i16 },

    /// The API key has no registered schema.
    #[error("Unknown API key: {0}")]
    UnknownApiKey(i16),

    /// The process-wide message registry was initialized twice.
    #[error("Message registry already initialized")]
    RegistryAlreadyInitialized,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a transport failure with the name of the failing operation.
    pub fn transport(operation: &'static str, source: TransportError) -> Self {
        Error::Transport { operation, source }
    }

    /// Returns true for errors produced by the codec itself.
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Error::Encoding(_) | Error::Decoding(_))
    }
}

impl From<BrokerError> for Error {
    fn from(e: BrokerError) -> Self {
        Error::Broker(e)
    }
}

/// Failures reported by the transport collaborator.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TransportError {
    /// An error in the network.
    #[error("IO error: {0:?}")]
    Io(io::ErrorKind),

    /// The connection closed before a response arrived.
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// The address could not be reached or resolved.
    #[error("Broker unreachable: {0}")]
    Unreachable(String),
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        TransportError::Io(e.kind())
    }
}

/// An error code returned by the broker together with its message.
///
/// Compare against the taxonomy with [`BrokerError::is`]:
///
/// ```rust
/// use kafkaesque_admin::error::{BrokerError, KafkaCode};
///
/// let err = BrokerError::from_code(54, Some("security is disabled".into())).unwrap();
/// assert!(err.is(KafkaCode::SecurityDisabled));
/// assert!(BrokerError::from_code(0, None).is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("broker error {code} ({kind:?}): {message}")]
pub struct BrokerError {
    /// The raw wire code. Preserved even when it is not in [`KafkaCode`].
    pub code: i16,
    /// Classification of `code`; [`KafkaCode::Unknown`] for codes this crate
    /// does not know about.
    pub kind: KafkaCode,
    /// Human readable message from the broker, or the code name when the
    /// broker sent none.
    pub message: String,
}

impl BrokerError {
    /// Convert a wire `(error_code, error_message)` pair.
    ///
    /// Returns `None` for code `0`.
    pub fn from_code(code: i16, message: Option<String>) -> Option<Self> {
        if code == KafkaCode::None as i16 {
            return None;
        }
        let kind = KafkaCode::from_i16(code).unwrap_or(KafkaCode::Unknown);
        let message = match message {
            Some(m) if !m.is_empty() => m,
            _ => format!("{:?}", kind),
        };
        Some(BrokerError {
            code,
            kind,
            message,
        })
    }

    /// Check whether this error is of the given kind.
    pub fn is(&self, kind: KafkaCode) -> bool {
        self.kind == kind
    }
}

/// Various errors reported by a remote Kafka server.
/// See also [Kafka Errors](http://kafka.apache.org/protocol.html)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, FromPrimitive, Default)]
pub enum KafkaCode {
    /// An unexpected server error
    Unknown = -1,
    #[default]
    None = 0,
    /// This request is for a topic or partition that does not exist
    /// on this broker.
    UnknownTopicOrPartition = 3,
    /// This error is thrown if the request exceeds the user-specified
    /// time limit in the request.
    RequestTimedOut = 7,
    /// This is not a client facing error and is used mostly by tools
    /// when a broker is not alive.
    BrokerNotAvailable = 8,
    /// The server disconnected before a response was received.
    NetworkException = 13,
    /// Returned by the broker when the client is not authorized to access
    /// the requested topic.
    TopicAuthorizationFailed = 29,
    /// Returned by the broker when the client is not authorized to access
    /// a particular groupId.
    GroupAuthorizationFailed = 30,
    /// Returned by the broker when the client is not authorized to use an
    /// inter-broker or administrative API.
    ClusterAuthorizationFailed = 31,
    /// The broker does not support the requested SASL mechanism.
    UnsupportedSaslMechanism = 33,
    /// Request is not valid given the current SASL state.
    IllegalSaslState = 34,
    /// The version of API is not supported.
    UnsupportedVersion = 35,
    /// Configuration is invalid.
    InvalidConfig = 40,
    /// This is not the correct controller for this cluster.
    NotController = 41,
    /// The request is malformed or combines filter values the broker
    /// rejects (for example a `MATCH` pattern in a creation).
    InvalidRequest = 42,
    /// The request parameters do not satisfy the configured policy.
    PolicyViolation = 44,
    /// Security features are disabled; no authorizer is configured.
    SecurityDisabled = 54,
    /// SASL Authentication failed.
    SaslAuthenticationFailed = 58,
    /// The resource referenced by the request does not exist.
    ResourceNotFound = 91,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_error_zero_is_none() {
        assert_eq!(BrokerError::from_code(0, None), None);
        assert_eq!(BrokerError::from_code(0, Some("ignored".into())), None);
    }

    #[test]
    fn test_broker_error_known_code() {
        let err = BrokerError::from_code(42, Some("filter too broad".into())).unwrap();
        assert_eq!(err.code, 42);
        assert_eq!(err.kind, KafkaCode::InvalidRequest);
        assert_eq!(err.message, "filter too broad");
        assert!(err.is(KafkaCode::InvalidRequest));
        assert!(!err.is(KafkaCode::SecurityDisabled));
    }

    #[test]
    fn test_broker_error_missing_message_uses_code_name() {
        let err = BrokerError::from_code(31, None).unwrap();
        assert_eq!(err.message, "ClusterAuthorizationFailed");

        let err = BrokerError::from_code(31, Some(String::new())).unwrap();
        assert_eq!(err.message, "ClusterAuthorizationFailed");
    }

    #[test]
    fn test_broker_error_unknown_code_keeps_raw_value() {
        let err = BrokerError::from_code(999, Some("mystery".into())).unwrap();
        assert_eq!(err.code, 999);
        assert_eq!(err.kind, KafkaCode::Unknown);
    }

    #[test]
    fn test_kafka_code_from_primitive() {
        assert_eq!(KafkaCode::from_i16(-1), Some(KafkaCode::Unknown));
        assert_eq!(KafkaCode::from_i16(0), Some(KafkaCode::None));
        assert_eq!(KafkaCode::from_i16(35), Some(KafkaCode::UnsupportedVersion));
        assert_eq!(KafkaCode::from_i16(41), Some(KafkaCode::NotController));
        assert_eq!(KafkaCode::from_i16(54), Some(KafkaCode::SecurityDisabled));
        assert_eq!(KafkaCode::from_i16(999), None);
    }

    #[test]
    fn test_error_display() {
        let err = Error::Decoding("truncated".to_string());
        assert!(err.to_string().contains("Decoding error"));
        assert!(err.is_codec_error());

        let err = Error::transport(
            "Client::describe_acls",
            TransportError::Io(io::ErrorKind::ConnectionRefused),
        );
        let display = err.to_string();
        assert!(display.contains("Client::describe_acls"));
        assert!(display.contains("ConnectionRefused"));
        assert!(!err.is_codec_error());
    }

    #[test]
    fn test_unsupported_version_display() {
        let err = Error::UnsupportedVersion {
            api_key: ApiKey::DescribeAcls,
            version: 9,
        };
        assert_eq!(err.to_string(), "Unsupported version 9 for DescribeAcls");
    }

    #[test]
    fn test_transport_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::TimedOut, "slow");
        assert_eq!(
            TransportError::from(io_err),
            TransportError::Io(io::ErrorKind::TimedOut)
        );
    }
}
