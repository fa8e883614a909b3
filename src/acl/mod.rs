//! ACL domain types and their translation to and from wire messages.
//!
//! Filters use `Option<String>` for their string criteria: `None` means "no
//! criterion" and travels as a null string, while `Some("")` is a real
//! (empty) criterion. Enum criteria left at `Unknown` are widened to `Any`
//! by [`AclFilter::normalized`] before a filter is lowered, so the default
//! filter matches every ACL.

mod create;
mod delete;
mod describe;

pub use create::*;
pub use delete::*;
pub use describe::*;

use std::fmt;
use std::time::Duration;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::error::{Error, Result};

fn from_wire<T: FromPrimitive + Default>(value: i8) -> T {
    T::from_i8(value).unwrap_or_default()
}

/// Broker-reported throttle time.
pub(crate) fn throttle(ms: i32) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}

/// Kind of resource an ACL applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive)]
#[repr(i8)]
pub enum ResourceType {
    #[default]
    Unknown = 0,
    /// Filter wildcard.
    Any = 1,
    Topic = 2,
    Group = 3,
    Cluster = 4,
    TransactionalId = 5,
    DelegationToken = 6,
}

impl ResourceType {
    /// Unrecognized wire values map to `Unknown`.
    pub fn from_wire(value: i8) -> Self {
        from_wire(value)
    }

    pub fn code(self) -> i8 {
        self as i8
    }
}

/// How a resource name is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive)]
#[repr(i8)]
pub enum PatternType {
    #[default]
    Unknown = 0,
    /// Filter wildcard: any pattern type.
    Any = 1,
    /// Filter only: every pattern that would match the given name.
    Match = 2,
    Literal = 3,
    Prefixed = 4,
}

impl PatternType {
    pub fn from_wire(value: i8) -> Self {
        from_wire(value)
    }

    pub fn code(self) -> i8 {
        self as i8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive)]
#[repr(i8)]
pub enum AclOperation {
    #[default]
    Unknown = 0,
    Any = 1,
    All = 2,
    Read = 3,
    Write = 4,
    Create = 5,
    Delete = 6,
    Alter = 7,
    Describe = 8,
    ClusterAction = 9,
    DescribeConfigs = 10,
    AlterConfigs = 11,
    IdempotentWrite = 12,
}

impl AclOperation {
    pub fn from_wire(value: i8) -> Self {
        from_wire(value)
    }

    pub fn code(self) -> i8 {
        self as i8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive)]
#[repr(i8)]
pub enum AclPermissionType {
    #[default]
    Unknown = 0,
    Any = 1,
    Deny = 2,
    Allow = 3,
}

impl AclPermissionType {
    pub fn from_wire(value: i8) -> Self {
        from_wire(value)
    }

    pub fn code(self) -> i8 {
        self as i8
    }
}

/// Criteria selecting ACL bindings for describe and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AclFilter {
    pub resource_type_filter: ResourceType,
    pub resource_name_filter: Option<String>,
    pub pattern_type_filter: PatternType,
    pub principal_filter: Option<String>,
    pub host_filter: Option<String>,
    pub operation: AclOperation,
    pub permission_type: AclPermissionType,
}

impl AclFilter {
    /// A filter matching every ACL.
    pub fn any() -> Self {
        Self::default().normalized()
    }

    pub fn with_resource(mut self, resource_type: ResourceType, name: impl Into<String>) -> Self {
        self.resource_type_filter = resource_type;
        self.resource_name_filter = Some(name.into());
        self
    }

    pub fn with_pattern_type(mut self, pattern_type: PatternType) -> Self {
        self.pattern_type_filter = pattern_type;
        self
    }

    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal_filter = Some(principal.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host_filter = Some(host.into());
        self
    }

    pub fn with_operation(mut self, operation: AclOperation) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_permission_type(mut self, permission_type: AclPermissionType) -> Self {
        self.permission_type = permission_type;
        self
    }

    /// Widen every `Unknown` enum criterion to `Any`. Each field is handled
    /// independently; string criteria are left untouched.
    pub fn normalized(mut self) -> Self {
        if self.operation == AclOperation::Unknown {
            self.operation = AclOperation::Any;
        }
        if self.permission_type == AclPermissionType::Unknown {
            self.permission_type = AclPermissionType::Any;
        }
        if self.resource_type_filter == ResourceType::Unknown {
            self.resource_type_filter = ResourceType::Any;
        }
        if self.pattern_type_filter == PatternType::Unknown {
            self.pattern_type_filter = PatternType::Any;
        }
        self
    }

    /// Whether `entry` is selected by this filter, using broker matching
    /// rules. `Unknown` criteria are treated as `Any`.
    pub fn matches(&self, entry: &AclEntry) -> bool {
        let filter = self.clone().normalized();

        let resource_type = matches!(filter.resource_type_filter, ResourceType::Any)
            || filter.resource_type_filter == entry.resource_type;
        let operation = matches!(filter.operation, AclOperation::Any)
            || filter.operation == entry.operation;
        let permission = matches!(filter.permission_type, AclPermissionType::Any)
            || filter.permission_type == entry.permission_type;
        let principal = filter
            .principal_filter
            .as_deref()
            .is_none_or(|p| p == entry.principal);
        let host = filter
            .host_filter
            .as_deref()
            .is_none_or(|h| h == entry.host);

        resource_type
            && operation
            && permission
            && principal
            && host
            && filter.matches_pattern(entry)
    }

    fn matches_pattern(&self, entry: &AclEntry) -> bool {
        let name = self.resource_name_filter.as_deref();
        match self.pattern_type_filter {
            PatternType::Any | PatternType::Unknown => {
                name.is_none_or(|n| n == entry.resource_name)
            }
            PatternType::Match => match name {
                None => true,
                Some(n) => match entry.pattern_type {
                    PatternType::Literal => {
                        entry.resource_name == n || entry.resource_name == WILDCARD_RESOURCE
                    }
                    PatternType::Prefixed => n.starts_with(entry.resource_name.as_str()),
                    _ => false,
                },
            },
            exact => exact == entry.pattern_type && name.is_none_or(|n| n == entry.resource_name),
        }
    }
}

/// Literal resource name matching every resource of its type.
pub const WILDCARD_RESOURCE: &str = "*";

impl From<&AclEntry> for AclFilter {
    /// The narrowest filter selecting exactly `entry`.
    fn from(entry: &AclEntry) -> Self {
        Self {
            resource_type_filter: entry.resource_type,
            resource_name_filter: Some(entry.resource_name.clone()),
            pattern_type_filter: entry.pattern_type,
            principal_filter: Some(entry.principal.clone()),
            host_filter: Some(entry.host.clone()),
            operation: entry.operation,
            permission_type: entry.permission_type,
        }
    }
}

/// A concrete ACL binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AclEntry {
    pub resource_type: ResourceType,
    pub resource_name: String,
    pub pattern_type: PatternType,
    pub principal: String,
    pub host: String,
    pub operation: AclOperation,
    pub permission_type: AclPermissionType,
}

impl AclEntry {
    /// A literal binding on `resource_name` from any host.
    pub fn new(
        resource_type: ResourceType,
        resource_name: impl Into<String>,
        principal: impl Into<String>,
        operation: AclOperation,
        permission_type: AclPermissionType,
    ) -> Self {
        Self {
            resource_type,
            resource_name: resource_name.into(),
            pattern_type: PatternType::Literal,
            principal: principal.into(),
            host: WILDCARD_RESOURCE.to_string(),
            operation,
            permission_type,
        }
    }

    pub fn with_pattern_type(mut self, pattern_type: PatternType) -> Self {
        self.pattern_type = pattern_type;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Entries name concrete values only: no `Unknown` and no wildcard
    /// variants.
    pub fn validate(&self) -> Result<()> {
        let invalid = |what: &str, value: &dyn fmt::Debug| {
            Err(Error::Encoding(format!(
                "ACL entry {} must be concrete, got {:?}",
                what, value
            )))
        };
        if matches!(self.resource_type, ResourceType::Unknown | ResourceType::Any) {
            return invalid("resource type", &self.resource_type);
        }
        if !matches!(self.pattern_type, PatternType::Literal | PatternType::Prefixed) {
            return invalid("pattern type", &self.pattern_type);
        }
        if matches!(self.operation, AclOperation::Unknown | AclOperation::Any) {
            return invalid("operation", &self.operation);
        }
        if matches!(
            self.permission_type,
            AclPermissionType::Unknown | AclPermissionType::Any
        ) {
            return invalid("permission type", &self.permission_type);
        }
        Ok(())
    }
}

impl fmt::Display for AclEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {:?} on {:?}:{:?}:{} from {}",
            self.principal,
            self.permission_type,
            self.operation,
            self.resource_type,
            self.pattern_type,
            self.resource_name,
            self.host
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice_read_topic() -> AclEntry {
        AclEntry::new(
            ResourceType::Topic,
            "t",
            "User:alice",
            AclOperation::Read,
            AclPermissionType::Allow,
        )
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(ResourceType::Topic.code(), 2);
        assert_eq!(ResourceType::DelegationToken.code(), 6);
        assert_eq!(PatternType::Prefixed.code(), 4);
        assert_eq!(AclOperation::IdempotentWrite.code(), 12);
        assert_eq!(AclPermissionType::Allow.code(), 3);
    }

    #[test]
    fn test_unknown_wire_values() {
        assert_eq!(ResourceType::from_wire(42), ResourceType::Unknown);
        assert_eq!(PatternType::from_wire(-1), PatternType::Unknown);
        assert_eq!(AclOperation::from_wire(99), AclOperation::Unknown);
        assert_eq!(AclPermissionType::from_wire(3), AclPermissionType::Allow);
    }

    #[test]
    fn test_normalized_defaults_each_field() {
        let filter = AclFilter::default().normalized();
        assert_eq!(filter.operation, AclOperation::Any);
        assert_eq!(filter.permission_type, AclPermissionType::Any);
        assert_eq!(filter.resource_type_filter, ResourceType::Any);
        assert_eq!(filter.pattern_type_filter, PatternType::Any);
        assert_eq!(filter.principal_filter, None);

        let filter = AclFilter::default()
            .with_operation(AclOperation::Write)
            .normalized();
        assert_eq!(filter.operation, AclOperation::Write);
        assert_eq!(filter.permission_type, AclPermissionType::Any);
    }

    #[test]
    fn test_filter_matches() {
        let entry = alice_read_topic();
        assert!(AclFilter::default().matches(&entry));
        assert!(AclFilter::from(&entry).matches(&entry));
        assert!(
            !AclFilter::default()
                .with_principal("User:alice")
                .with_operation(AclOperation::Write)
                .matches(&entry)
        );
        assert!(!AclFilter::default().with_host("").matches(&entry));
    }

    #[test]
    fn test_filter_match_pattern() {
        let prefixed = AclEntry::new(
            ResourceType::Topic,
            "orders-",
            "User:alice",
            AclOperation::Read,
            AclPermissionType::Allow,
        )
        .with_pattern_type(PatternType::Prefixed);
        let wildcard = AclEntry::new(
            ResourceType::Topic,
            WILDCARD_RESOURCE,
            "User:alice",
            AclOperation::Read,
            AclPermissionType::Allow,
        );

        let filter = AclFilter::default()
            .with_resource(ResourceType::Topic, "orders-eu")
            .with_pattern_type(PatternType::Match);
        assert!(filter.matches(&prefixed));
        assert!(filter.matches(&wildcard));
        assert!(!filter.matches(&alice_read_topic()));

        let literal = AclFilter::default()
            .with_resource(ResourceType::Topic, "orders-eu")
            .with_pattern_type(PatternType::Literal);
        assert!(!literal.matches(&prefixed));
    }

    #[test]
    fn test_entry_validate() {
        assert!(alice_read_topic().validate().is_ok());

        let mut entry = alice_read_topic();
        entry.operation = AclOperation::Any;
        assert!(matches!(entry.validate(), Err(Error::Encoding(_))));

        let entry = alice_read_topic().with_pattern_type(PatternType::Match);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_throttle() {
        assert_eq!(throttle(250), Duration::from_millis(250));
        assert_eq!(throttle(-5), Duration::ZERO);
    }
}
