use std::time::Duration;

use super::{AclEntry, throttle};
use crate::error::{BrokerError, Result};
use crate::protocol::messages::{AclCreation, CreateAclsRequestData, CreateAclsResponseData};

/// One optional error per submitted entry, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAclsResponse {
    pub throttle: Duration,
    pub errors: Vec<Option<BrokerError>>,
}

impl CreateAclsResponse {
    /// True when every entry was created.
    pub fn is_ok(&self) -> bool {
        self.errors.iter().all(Option::is_none)
    }
}

/// Entries must be concrete; see [`AclEntry::validate`].
pub fn lower_create(entries: &[AclEntry]) -> Result<CreateAclsRequestData> {
    let creations = entries
        .iter()
        .map(|entry| {
            entry.validate()?;
            Ok(AclCreation {
                resource_type: entry.resource_type.code(),
                resource_name: entry.resource_name.clone(),
                resource_pattern_type: entry.pattern_type.code(),
                principal: entry.principal.clone(),
                host: entry.host.clone(),
                operation: entry.operation.code(),
                permission_type: entry.permission_type.code(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CreateAclsRequestData { creations })
}

pub fn raise_create(response: CreateAclsResponseData) -> CreateAclsResponse {
    CreateAclsResponse {
        throttle: throttle(response.throttle_time_ms),
        errors: response
            .results
            .into_iter()
            .map(|r| BrokerError::from_code(r.error_code, r.error_message))
            .collect(),
    }
}
