//! ACL administration client.
//!
//! A [`Client`] drives one call through the whole pipeline:
//!
//! 1. lower the domain request into its wire message
//! 2. pick the target broker from cluster metadata
//! 3. negotiate the api version with that broker
//! 4. encode header and body, hand the frame to the [`Transport`]
//! 5. check the correlation id, decode the body, raise it to domain types
//!
//! The transport owns connections, framing on the socket, TLS/SASL and
//! retries. The whole call is bounded by
//! [`ClientConfig::request_timeout`]; on timeout the in-flight round trip is
//! dropped.

use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::time::timeout;

use crate::acl::{
    AclEntry, AclFilter, CreateAclsResponse, DeleteAclsResponse, DescribeAclsResponse,
    lower_create, lower_delete, lower_describe, raise_create, raise_delete, raise_describe,
};
use crate::cluster::{Broker, Cluster};
use crate::config::ClientConfig;
use crate::constants::DEFAULT_ENCODE_CAPACITY;
use crate::error::{BrokerError, Error, Result, TransportError};
use crate::metrics;
use crate::protocol::ApiKey;
use crate::protocol::codec;
use crate::protocol::header::{RequestHeader, ResponseHeader};
use crate::protocol::messages::{BrokerMessage, Message};
use crate::protocol::registry::{self, Registry};
use crate::protocol::versions::{SupportedVersion, negotiate};
use crate::types::CorrelationId;

pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Network collaborator: cluster metadata, version discovery, and raw
/// request/response exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Current cluster metadata snapshot.
    async fn cluster(&self) -> TransportResult<Cluster>;

    /// Api version ranges advertised by `broker` (typically cached
    /// `ApiVersions` results).
    async fn api_versions(&self, broker: &Broker) -> TransportResult<Vec<SupportedVersion>>;

    /// Send one request frame (header + body) to `broker` and return the
    /// matching response frame (header + body).
    async fn round_trip(&self, broker: &Broker, frame: Bytes) -> TransportResult<Bytes>;
}

pub struct Client<T> {
    transport: T,
    config: ClientConfig,
    registry: &'static Registry,
    correlation: AtomicI32,
}

impl<T: Transport> Client<T> {
    /// Create a client using the process-wide registry, installing the
    /// default one if none is set.
    pub fn new(transport: T, config: ClientConfig) -> Result<Self> {
        Self::with_registry(transport, config, registry::global_or_init()?)
    }

    pub fn with_registry(
        transport: T,
        config: ClientConfig,
        registry: &'static Registry,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            config,
            registry,
            correlation: AtomicI32::new(0),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// List the ACLs matching `filter`.
    ///
    /// A broker rejection of the whole request is returned in
    /// [`DescribeAclsResponse::error`], not as `Err`.
    #[tracing::instrument(skip(self, filter), fields(client_id = %self.config.client_id))]
    pub async fn describe_acls(&self, filter: &AclFilter) -> Result<DescribeAclsResponse> {
        let request = lower_describe(filter);
        let response = self.send("Client::describe_acls", &request).await?;
        let response = raise_describe(response);
        record_broker_errors(ApiKey::DescribeAcls, response.error.iter());
        tracing::debug!(
            acls = response.acls.len(),
            error = ?response.error,
            "described ACLs"
        );
        Ok(response)
    }

    /// Delete the ACLs matching each filter. `results[i]` answers
    /// `filters[i]`; one failing filter does not affect the others.
    #[tracing::instrument(skip(self, filters), fields(client_id = %self.config.client_id, filter_count = filters.len()))]
    pub async fn delete_acls(&self, filters: &[AclFilter]) -> Result<DeleteAclsResponse> {
        let request = lower_delete(filters);
        let response = self.send("Client::delete_acls", &request).await?;
        let response = raise_delete(response);
        record_broker_errors(
            ApiKey::DeleteAcls,
            response.results.iter().flat_map(|r| {
                r.error
                    .iter()
                    .chain(r.failed.iter().map(|(_, error)| error))
            }),
        );
        if response.results.len() != filters.len() {
            return Err(Error::Decoding(format!(
                "DeleteAcls returned {} results for {} filters",
                response.results.len(),
                filters.len()
            )));
        }
        Ok(response)
    }

    /// Create ACL bindings. `errors[i]` answers `entries[i]`.
    #[tracing::instrument(skip(self, entries), fields(client_id = %self.config.client_id, entry_count = entries.len()))]
    pub async fn create_acls(&self, entries: &[AclEntry]) -> Result<CreateAclsResponse> {
        let request = lower_create(entries)?;
        let response = self.send("Client::create_acls", &request).await?;
        let response = raise_create(response);
        record_broker_errors(ApiKey::CreateAcls, response.errors.iter().flatten());
        if response.errors.len() != entries.len() {
            return Err(Error::Decoding(format!(
                "CreateAcls returned {} results for {} entries",
                response.errors.len(),
                entries.len()
            )));
        }
        Ok(response)
    }

    fn next_correlation_id(&self) -> CorrelationId {
        CorrelationId(self.correlation.fetch_add(1, Ordering::Relaxed))
    }

    async fn send<R>(&self, operation: &'static str, request: &R) -> Result<R::Response>
    where
        R: BrokerMessage + Sync,
    {
        let limit = self.config.request_timeout;
        let api = R::API_KEY.as_str();
        let start = Instant::now();
        match timeout(limit, self.exchange(operation, request)).await {
            Ok(result) => {
                let status = if result.is_ok() { "success" } else { "error" };
                metrics::record_request(api, status, start.elapsed());
                result
            }
            Err(_) => {
                metrics::record_request(api, "timeout", start.elapsed());
                tracing::warn!(
                    operation,
                    timeout_ms = limit.as_millis() as u64,
                    "request timed out"
                );
                Err(Error::Timeout {
                    operation,
                    timeout: limit,
                })
            }
        }
    }

    async fn exchange<R>(&self, operation: &'static str, request: &R) -> Result<R::Response>
    where
        R: BrokerMessage + Sync,
    {
        let api_key = R::API_KEY;

        let cluster = self
            .transport
            .cluster()
            .await
            .map_err(|e| Error::transport(operation, e))?;
        let broker = request.broker(&cluster)?;

        let local = self
            .registry
            .get(api_key)
            .ok_or(Error::UnknownApiKey(api_key.code()))?
            .versions;
        let advertised = self
            .transport
            .api_versions(&broker)
            .await
            .map_err(|e| Error::transport(operation, e))?;
        let version = negotiate(api_key, local, &advertised, self.config.max_version(api_key))?;
        let message = self.registry.lookup(api_key, version)?;

        let correlation_id = self.next_correlation_id();
        let header = RequestHeader {
            api_key,
            api_version: version,
            correlation_id,
            client_id: Some(self.config.client_id.clone()),
        };

        let mut frame = BytesMut::with_capacity(DEFAULT_ENCODE_CAPACITY);
        header.encode(&mut frame, message.request_is_flexible(version))?;
        codec::encode_into(&mut frame, &request.to_struct(), message.request, version)?;

        tracing::debug!(
            api_key = api_key.as_str(),
            version,
            broker = %broker,
            correlation_id = correlation_id.value(),
            bytes = frame.len(),
            "sending request"
        );

        let response = self
            .transport
            .round_trip(&broker, frame.freeze())
            .await
            .map_err(|e| Error::transport(operation, e))?;

        let (header, body) = ResponseHeader::decode(response, message.response_is_flexible(version))?;
        if header.correlation_id != correlation_id {
            return Err(Error::Decoding(format!(
                "correlation id mismatch: sent {}, received {}",
                correlation_id, header.correlation_id
            )));
        }

        let value = codec::decode(body, message.response, version)?;
        R::Response::from_struct(value)
    }
}

fn record_broker_errors<'a>(api_key: ApiKey, errors: impl Iterator<Item = &'a BrokerError>) {
    for error in errors {
        metrics::record_broker_error(api_key.as_str(), error.code);
    }
}
