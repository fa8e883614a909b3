use std::time::Duration;

use super::{
    AclEntry, AclFilter, AclOperation, AclPermissionType, PatternType, ResourceType, throttle,
};
use crate::error::BrokerError;
use crate::protocol::messages::{DescribeAclsRequestData, DescribeAclsResponseData};

/// ACLs matching a describe filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeAclsResponse {
    /// Time the broker throttled the request.
    pub throttle: Duration,
    /// Set when the broker rejected the whole request; `acls` is then empty.
    pub error: Option<BrokerError>,
    pub acls: Vec<AclEntry>,
}

/// Build the wire request for one (normalized) filter.
pub fn lower_describe(filter: &AclFilter) -> DescribeAclsRequestData {
    let filter = filter.clone().normalized();
    DescribeAclsRequestData {
        resource_type_filter: filter.resource_type_filter.code(),
        resource_name_filter: filter.resource_name_filter,
        pattern_type_filter: filter.pattern_type_filter.code(),
        principal_filter: filter.principal_filter,
        host_filter: filter.host_filter,
        operation: filter.operation.code(),
        permission_type: filter.permission_type.code(),
    }
}

/// Flatten resources x nested ACLs into entries.
pub fn raise_describe(response: DescribeAclsResponseData) -> DescribeAclsResponse {
    let throttle = throttle(response.throttle_time_ms);
    if let Some(error) = BrokerError::from_code(response.error_code, response.error_message) {
        return DescribeAclsResponse {
            throttle,
            error: Some(error),
            acls: Vec::new(),
        };
    }

    let acls = response
        .resources
        .into_iter()
        .flat_map(|resource| {
            let resource_type = ResourceType::from_wire(resource.resource_type);
            let pattern_type = PatternType::from_wire(resource.pattern_type);
            let resource_name = resource.resource_name;
            resource.acls.into_iter().map(move |acl| AclEntry {
                resource_type,
                resource_name: resource_name.clone(),
                pattern_type,
                principal: acl.principal,
                host: acl.host,
                operation: AclOperation::from_wire(acl.operation),
                permission_type: AclPermissionType::from_wire(acl.permission_type),
            })
        })
        .collect();

    DescribeAclsResponse {
        throttle,
        error: None,
        acls,
    }
}
