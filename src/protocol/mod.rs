//! Kafka wire protocol: schemas, the versioned codec, headers, and the
//! message registry.
//!
//! # Module Organization
//!
//! - [`schema`]: static field tables and cached per-version layouts
//! - [`codec`]: schema-driven encode/decode of dynamic [`Struct`] values
//! - [`header`]: request/response headers
//! - [`versions`]: locally supported version ranges and negotiation
//! - [`registry`]: api key to schema pair lookup
//! - [`messages`]: typed ACL request/response messages

pub mod api_key;
pub mod codec;
pub mod header;
pub mod messages;
pub mod registry;
pub mod schema;
pub mod value;
pub mod versions;

pub use api_key::ApiKey;
pub use codec::{decode, encode};
pub use header::{RequestHeader, ResponseHeader};
pub use messages::{BrokerMessage, Message, Request};
pub use registry::{MessageType, Registry};
pub use schema::{DefaultValue, Field, FieldType, Layout, Schema};
pub use value::{Struct, TaggedField, Value};
pub use versions::SupportedVersion;
