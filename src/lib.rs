//! # kafkaesque-admin
//! Versioned Kafka wire codec and a control-plane client for ACL
//! administration.
//!
//! The core is a schema-driven codec: every message is a static table of
//! fields with per-field version ranges, and a single message-wide switch
//! selects between the classic fixed-width layout and the flexible layout
//! (compact strings and arrays, trailing tagged fields). ACL management is
//! built on top of it.
//!
//! # Module Organization
//!
//! - [`protocol`]: schemas, codec, headers, registry and typed messages
//! - [`acl`]: domain filters and entries, lowered to and raised from wire
//!   messages
//! - [`cluster`]: cluster metadata and broker resolution
//! - [`client`]: the [`Client`](client::Client) and its
//!   [`Transport`](client::Transport) collaborator
//! - [`config`], [`telemetry`], [`metrics`]: configuration, logging setup
//!   and Prometheus request metrics
//!
//! ## Getting started
//!
//! ```rust,no_run
//! use kafkaesque_admin::prelude::*;
//!
//! async fn list_all<T: Transport>(transport: T) -> Result<()> {
//!     let client = Client::new(transport, ClientConfig::from_env()?)?;
//!     let response = client.describe_acls(&AclFilter::any()).await?;
//!     for acl in &response.acls {
//!         println!("{}", acl);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Resources
//! - [Kafka Protocol Spec](https://kafka.apache.org/protocol.html)
//! - [KIP-482: flexible versions](https://cwiki.apache.org/confluence/display/KAFKA/KIP-482%3A+The+Kafka+Protocol+should+Support+Optional+Tagged+Fields)

#![forbid(unsafe_code)]

mod encode;
pub mod error;
mod parser;
pub mod protocol;
pub mod types;

pub mod acl;
pub mod client;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod metrics;
pub mod telemetry;

pub mod prelude {
    //! Main exports for ACL administration.
    pub use crate::acl::{
        AclEntry, AclFilter, AclOperation, AclPermissionType, CreateAclsResponse, DeleteAclResult,
        DeleteAclsResponse, DescribeAclsResponse, PatternType, ResourceType,
    };
    pub use crate::client::{Client, Transport, TransportResult};
    pub use crate::cluster::{Broker, Cluster};
    pub use crate::config::ClientConfig;
    pub use crate::error::{BrokerError, Error, KafkaCode, Result, TransportError};
    pub use crate::protocol::{ApiKey, SupportedVersion};
    pub use crate::types::BrokerId;

    pub use bytes;
}
