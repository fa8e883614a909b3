use std::time::Duration;

use super::{
    AclEntry, AclFilter, AclOperation, AclPermissionType, PatternType, ResourceType, throttle,
};
use crate::error::BrokerError;
use crate::protocol::messages::{
    DeleteAclsFilter, DeleteAclsMatchingAcl, DeleteAclsRequestData, DeleteAclsResponseData,
};

/// Outcome of one delete filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteAclResult {
    /// Failure of this filter only; sibling filters are unaffected.
    pub error: Option<BrokerError>,
    /// ACLs removed by this filter.
    pub acls: Vec<AclEntry>,
    /// ACLs matched by this filter that the broker failed to remove.
    pub failed: Vec<(AclEntry, BrokerError)>,
}

/// Per-filter results; `results[i]` answers `filters[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAclsResponse {
    pub throttle: Duration,
    pub results: Vec<DeleteAclResult>,
}

pub fn lower_delete(filters: &[AclFilter]) -> DeleteAclsRequestData {
    let filters = filters
        .iter()
        .map(|filter| {
            let filter = filter.clone().normalized();
            DeleteAclsFilter {
                resource_type_filter: filter.resource_type_filter.code(),
                resource_name_filter: filter.resource_name_filter,
                pattern_type_filter: filter.pattern_type_filter.code(),
                principal_filter: filter.principal_filter,
                host_filter: filter.host_filter,
                operation: filter.operation.code(),
                permission_type: filter.permission_type.code(),
            }
        })
        .collect();
    DeleteAclsRequestData { filters }
}

/// Raise filter results in broker order, which is request order.
pub fn raise_delete(response: DeleteAclsResponseData) -> DeleteAclsResponse {
    let results = response
        .filter_results
        .into_iter()
        .map(|result| {
            let mut raised = DeleteAclResult {
                error: BrokerError::from_code(result.error_code, result.error_message),
                ..Default::default()
            };
            for mut acl in result.matching_acls {
                let error = BrokerError::from_code(acl.error_code, acl.error_message.take());
                let entry = raise_matching_acl(acl);
                match error {
                    Some(error) => raised.failed.push((entry, error)),
                    None => raised.acls.push(entry),
                }
            }
            raised
        })
        .collect();

    DeleteAclsResponse {
        throttle: throttle(response.throttle_time_ms),
        results,
    }
}

fn raise_matching_acl(acl: DeleteAclsMatchingAcl) -> AclEntry {
    AclEntry {
        resource_type: ResourceType::from_wire(acl.resource_type),
        resource_name: acl.resource_name,
        pattern_type: PatternType::from_wire(acl.pattern_type),
        principal: acl.principal,
        host: acl.host,
        operation: AclOperation::from_wire(acl.operation),
        permission_type: AclPermissionType::from_wire(acl.permission_type),
    }
}
