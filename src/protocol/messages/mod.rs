//! Typed wire messages.
//!
//! Each message owns a static [`Schema`] and converts to and from the dynamic
//! [`Struct`] the codec walks. Field values are kept as raw wire integers;
//! interpreting them is the job of the [`acl`](crate::acl) layer.

mod create_acls;
mod delete_acls;
mod describe_acls;

pub use create_acls::*;
pub use delete_acls::*;
pub use describe_acls::*;

use bytes::Bytes;

use super::api_key::ApiKey;
use super::codec;
use super::schema::Schema;
use super::value::Struct;
use crate::cluster::{Broker, Cluster, resolve_broker};
use crate::error::Result;
use crate::types::VersionRange;

/// A value with a static schema.
pub trait Message: Sized {
    fn schema() -> &'static Schema;

    fn to_struct(&self) -> Struct;

    fn from_struct(value: Struct) -> Result<Self>;

    fn encode(&self, version: i16) -> Result<Bytes> {
        codec::encode(&self.to_struct(), Self::schema(), version)
    }

    fn decode(bytes: Bytes, version: i16) -> Result<Self> {
        Self::from_struct(codec::decode(bytes, Self::schema(), version)?)
    }
}

/// A top-level request message.
pub trait Request: Message {
    type Response: Message;

    const API_KEY: ApiKey;

    /// Versions this crate can encode the request (and decode its response)
    /// at.
    const VERSIONS: VersionRange;
}

/// A request that knows which broker must receive it.
pub trait BrokerMessage: Request {
    /// Defaults to the cluster controller.
    fn broker(&self, cluster: &Cluster) -> Result<Broker> {
        resolve_broker(cluster)
    }
}

pub(crate) fn to_structs<T: Message>(items: &[T]) -> Vec<Struct> {
    items.iter().map(Message::to_struct).collect()
}

pub(crate) fn from_structs<T: Message>(items: Vec<Struct>) -> Result<Vec<T>> {
    items.into_iter().map(T::from_struct).collect()
}
