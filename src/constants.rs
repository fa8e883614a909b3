//! Centralized protocol and configuration constants.
//!
//! # Categories
//!
//! - **Protocol Constants**: Kafka wire protocol sizes and limits
//! - **Client Constants**: defaults for [`ClientConfig`](crate::config::ClientConfig)

use std::time::Duration;

// =============================================================================
// Protocol Constants (Kafka Wire Protocol)
// =============================================================================

/// Maximum allowed array size in Kafka protocol parsing.
///
/// This prevents memory exhaustion from malformed messages that claim
/// to have billions of elements.
pub const MAX_PROTOCOL_ARRAY_SIZE: i32 = 100_000;

/// Maximum number of tagged fields accepted in one tagged-field section.
pub const MAX_TAGGED_FIELDS: u32 = 1_024;

/// Length sentinel for a null classic string or array.
pub const NULL_LENGTH: i16 = -1;

/// Varint prefix for a null compact string or array (`length + 1 == 0`).
pub const COMPACT_NULL: u32 = 0;

/// Initial capacity for encode buffers. ACL requests are small.
pub const DEFAULT_ENCODE_CAPACITY: usize = 128;

// =============================================================================
// Client Constants
// =============================================================================

/// Client id sent in request headers when none is configured.
pub const DEFAULT_CLIENT_ID: &str = "kafkaesque-admin";

/// Default time allowed for a single request round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
