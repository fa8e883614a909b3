//! In-memory broker used by the integration tests.
//!
//! It implements [`Transport`] by decoding request frames with the same
//! codec the client uses, applying them to an ACL store, and encoding a
//! response frame at the request's version.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};

use kafkaesque_admin::acl::{
    AclEntry, AclFilter, AclOperation, AclPermissionType, PatternType, ResourceType,
};
use kafkaesque_admin::client::{Transport, TransportResult};
use kafkaesque_admin::cluster::{Broker, Cluster};
use kafkaesque_admin::error::{KafkaCode, TransportError};
use kafkaesque_admin::protocol::messages::*;
use kafkaesque_admin::protocol::registry;
use kafkaesque_admin::protocol::{ApiKey, Message, RequestHeader, ResponseHeader, SupportedVersion};

pub const CONTROLLER: i32 = 1;

pub struct InMemoryBroker {
    pub acls: Mutex<Vec<AclEntry>>,
    pub cluster: Cluster,
    pub versions: Vec<SupportedVersion>,
    /// Answer DescribeAcls with SECURITY_DISABLED.
    pub authorizer_disabled: bool,
    /// Delay before answering, to exercise the client timeout.
    pub delay: Option<Duration>,
    /// Fail every round trip with this transport error.
    pub fail_with: Option<TransportError>,
    pub throttle_time_ms: i32,
    pub round_trips: AtomicUsize,
    /// (api key, version) of every request received.
    pub received: Mutex<Vec<(ApiKey, i16)>>,
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self {
            acls: Mutex::new(Vec::new()),
            cluster: Cluster::new(
                CONTROLLER,
                [
                    Broker::new(0, "broker-0", 9092),
                    Broker::new(CONTROLLER, "broker-1", 9092),
                ],
            ),
            versions: vec![
                SupportedVersion::new(ApiKey::DescribeAcls, 0, 3),
                SupportedVersion::new(ApiKey::CreateAcls, 0, 3),
                SupportedVersion::new(ApiKey::DeleteAcls, 0, 3),
            ],
            authorizer_disabled: false,
            delay: None,
            fail_with: None,
            throttle_time_ms: 0,
            round_trips: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit every ACL api to `[0, max]`.
    pub fn with_max_version(mut self, max: i16) -> Self {
        for v in &mut self.versions {
            v.max_version = max;
        }
        self
    }

    pub fn stored(&self) -> Vec<AclEntry> {
        self.acls.lock().unwrap().clone()
    }

    fn handle(&self, header: &RequestHeader, body: Bytes) -> Bytes {
        let version = header.api_version;
        let result = match header.api_key {
            ApiKey::DescribeAcls => {
                let request = DescribeAclsRequestData::decode(body, version).unwrap();
                self.describe(request).encode(version)
            }
            ApiKey::CreateAcls => {
                let request = CreateAclsRequestData::decode(body, version).unwrap();
                self.create(request).encode(version)
            }
            ApiKey::DeleteAcls => {
                let request = DeleteAclsRequestData::decode(body, version).unwrap();
                self.delete(request).encode(version)
            }
            other => panic!("unexpected api key {:?}", other),
        };
        result.unwrap()
    }

    fn describe(&self, request: DescribeAclsRequestData) -> DescribeAclsResponseData {
        if self.authorizer_disabled {
            return DescribeAclsResponseData {
                throttle_time_ms: self.throttle_time_ms,
                error_code: KafkaCode::SecurityDisabled as i16,
                error_message: Some("No Authorizer is configured on the broker".to_string()),
                resources: vec![],
            };
        }

        let filter = AclFilter {
            resource_type_filter: ResourceType::from_wire(request.resource_type_filter),
            resource_name_filter: request.resource_name_filter,
            pattern_type_filter: PatternType::from_wire(request.pattern_type_filter),
            principal_filter: request.principal_filter,
            host_filter: request.host_filter,
            operation: AclOperation::from_wire(request.operation),
            permission_type: AclPermissionType::from_wire(request.permission_type),
        };

        let mut resources: BTreeMap<(i8, String, i8), Vec<DescribeAclsAcl>> = BTreeMap::new();
        for acl in self.acls.lock().unwrap().iter().filter(|a| filter.matches(a)) {
            resources
                .entry((
                    acl.resource_type.code(),
                    acl.resource_name.clone(),
                    acl.pattern_type.code(),
                ))
                .or_default()
                .push(DescribeAclsAcl {
                    principal: acl.principal.clone(),
                    host: acl.host.clone(),
                    operation: acl.operation.code(),
                    permission_type: acl.permission_type.code(),
                });
        }

        DescribeAclsResponseData {
            throttle_time_ms: self.throttle_time_ms,
            error_code: 0,
            error_message: None,
            resources: resources
                .into_iter()
                .map(
                    |((resource_type, resource_name, pattern_type), acls)| DescribeAclsResource {
                        resource_type,
                        resource_name,
                        pattern_type,
                        acls,
                    },
                )
                .collect(),
        }
    }

    fn create(&self, request: CreateAclsRequestData) -> CreateAclsResponseData {
        let mut acls = self.acls.lock().unwrap();
        let results = request
            .creations
            .into_iter()
            .map(|c| {
                if !c.principal.contains(':') {
                    return AclCreationResult {
                        error_code: KafkaCode::InvalidRequest as i16,
                        error_message: Some(format!("invalid principal {}", c.principal)),
                    };
                }
                let entry = AclEntry {
                    resource_type: ResourceType::from_wire(c.resource_type),
                    resource_name: c.resource_name,
                    pattern_type: PatternType::from_wire(c.resource_pattern_type),
                    principal: c.principal,
                    host: c.host,
                    operation: AclOperation::from_wire(c.operation),
                    permission_type: AclPermissionType::from_wire(c.permission_type),
                };
                if !acls.contains(&entry) {
                    acls.push(entry);
                }
                AclCreationResult {
                    error_code: 0,
                    error_message: None,
                }
            })
            .collect();

        CreateAclsResponseData {
            throttle_time_ms: self.throttle_time_ms,
            results,
        }
    }

    fn delete(&self, request: DeleteAclsRequestData) -> DeleteAclsResponseData {
        let mut acls = self.acls.lock().unwrap();
        let filter_results = request
            .filters
            .into_iter()
            .map(|f| {
                if f.principal_filter.as_deref().is_some_and(|p| !p.contains(':')) {
                    return DeleteAclsFilterResult {
                        error_code: KafkaCode::InvalidRequest as i16,
                        error_message: Some("principal must be of the form Type:name".to_string()),
                        matching_acls: vec![],
                    };
                }
                let filter = AclFilter {
                    resource_type_filter: ResourceType::from_wire(f.resource_type_filter),
                    resource_name_filter: f.resource_name_filter,
                    pattern_type_filter: PatternType::from_wire(f.pattern_type_filter),
                    principal_filter: f.principal_filter,
                    host_filter: f.host_filter,
                    operation: AclOperation::from_wire(f.operation),
                    permission_type: AclPermissionType::from_wire(f.permission_type),
                };

                let (removed, kept): (Vec<_>, Vec<_>) =
                    acls.drain(..).partition(|a| filter.matches(a));
                *acls = kept;

                DeleteAclsFilterResult {
                    error_code: 0,
                    error_message: None,
                    matching_acls: removed
                        .into_iter()
                        .map(|a| DeleteAclsMatchingAcl {
                            error_code: 0,
                            error_message: None,
                            resource_type: a.resource_type.code(),
                            resource_name: a.resource_name,
                            pattern_type: a.pattern_type.code(),
                            principal: a.principal,
                            host: a.host,
                            operation: a.operation.code(),
                            permission_type: a.permission_type.code(),
                        })
                        .collect(),
                }
            })
            .collect();

        DeleteAclsResponseData {
            throttle_time_ms: self.throttle_time_ms,
            filter_results,
        }
    }
}

#[async_trait]
impl Transport for InMemoryBroker {
    async fn cluster(&self) -> TransportResult<Cluster> {
        Ok(self.cluster.clone())
    }

    async fn api_versions(&self, _broker: &Broker) -> TransportResult<Vec<SupportedVersion>> {
        Ok(self.versions.clone())
    }

    async fn round_trip(&self, broker: &Broker, frame: Bytes) -> TransportResult<Bytes> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        assert_eq!(broker.id.value(), self.cluster.controller.value());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let registry = registry::global_or_init().unwrap();
        let (header, body) = RequestHeader::decode(frame, |key, version| {
            registry
                .lookup(key, version)
                .is_ok_and(|m| m.request_is_flexible(version))
        })
        .unwrap();
        self.received
            .lock()
            .unwrap()
            .push((header.api_key, header.api_version));

        let message = registry.lookup(header.api_key, header.api_version).unwrap();
        let body = self.handle(&header, body);

        let mut out = BytesMut::new();
        ResponseHeader {
            correlation_id: header.correlation_id,
        }
        .encode(&mut out, message.response_is_flexible(header.api_version))
        .unwrap();
        out.extend_from_slice(&body);
        Ok(out.freeze())
    }
}

pub fn entry(
    resource_type: ResourceType,
    name: &str,
    principal: &str,
    operation: AclOperation,
) -> AclEntry {
    AclEntry::new(
        resource_type,
        name,
        principal,
        operation,
        AclPermissionType::Allow,
    )
}
