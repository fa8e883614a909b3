//! DescribeAcls (api key 29), versions 0-3, flexible from v2.

use super::{BrokerMessage, Message, Request, from_structs, to_structs};
use crate::error::Result;
use crate::protocol::api_key::ApiKey;
use crate::protocol::schema::{DefaultValue, Field, FieldType, Schema};
use crate::protocol::value::Struct;
use crate::types::VersionRange;

/// Wire value of `PatternType::Literal`, the implied pattern type before v1.
pub(crate) const LITERAL_PATTERN: i64 = 3;

static REQUEST_FIELDS: [Field; 7] = [
    Field::new("resource_type_filter", FieldType::Int8, 0, 3),
    Field::new("resource_name_filter", FieldType::String, 0, 3)
        .compact()
        .nullable(),
    Field::new("pattern_type_filter", FieldType::Int8, 1, 3)
        .with_default(DefaultValue::Int(LITERAL_PATTERN)),
    Field::new("principal_filter", FieldType::String, 0, 3)
        .compact()
        .nullable(),
    Field::new("host_filter", FieldType::String, 0, 3)
        .compact()
        .nullable(),
    Field::new("operation", FieldType::Int8, 0, 3),
    Field::new("permission_type", FieldType::Int8, 0, 3),
];

pub static DESCRIBE_ACLS_REQUEST: Schema =
    Schema::new("DescribeAclsRequest", &REQUEST_FIELDS).flexible(2, 3);

static ACL_FIELDS: [Field; 4] = [
    Field::new("principal", FieldType::String, 0, 3).compact(),
    Field::new("host", FieldType::String, 0, 3).compact(),
    Field::new("operation", FieldType::Int8, 0, 3),
    Field::new("permission_type", FieldType::Int8, 0, 3),
];

pub static DESCRIBE_ACLS_ACL: Schema =
    Schema::new("DescribeAclsResponseAcl", &ACL_FIELDS).flexible(2, 3);

static RESOURCE_FIELDS: [Field; 4] = [
    Field::new("resource_type", FieldType::Int8, 0, 3),
    Field::new("resource_name", FieldType::String, 0, 3).compact(),
    Field::new("pattern_type", FieldType::Int8, 1, 3)
        .with_default(DefaultValue::Int(LITERAL_PATTERN)),
    Field::new("acls", FieldType::Array(&DESCRIBE_ACLS_ACL), 0, 3).compact(),
];

pub static DESCRIBE_ACLS_RESOURCE: Schema =
    Schema::new("DescribeAclsResource", &RESOURCE_FIELDS).flexible(2, 3);

static RESPONSE_FIELDS: [Field; 4] = [
    Field::new("throttle_time_ms", FieldType::Int32, 0, 3),
    Field::new("error_code", FieldType::Int16, 0, 3),
    Field::new("error_message", FieldType::String, 0, 3)
        .compact()
        .nullable(),
    Field::new("resources", FieldType::Array(&DESCRIBE_ACLS_RESOURCE), 0, 3).compact(),
];

pub static DESCRIBE_ACLS_RESPONSE: Schema =
    Schema::new("DescribeAclsResponse", &RESPONSE_FIELDS).flexible(2, 3);

/// DescribeAcls request: a single filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeAclsRequestData {
    pub resource_type_filter: i8,
    pub resource_name_filter: Option<String>,
    pub pattern_type_filter: i8,
    pub principal_filter: Option<String>,
    pub host_filter: Option<String>,
    pub operation: i8,
    pub permission_type: i8,
}

impl Message for DescribeAclsRequestData {
    fn schema() -> &'static Schema {
        &DESCRIBE_ACLS_REQUEST
    }

    fn to_struct(&self) -> Struct {
        Struct::new()
            .with("resource_type_filter", self.resource_type_filter)
            .with("resource_name_filter", self.resource_name_filter.clone())
            .with("pattern_type_filter", self.pattern_type_filter)
            .with("principal_filter", self.principal_filter.clone())
            .with("host_filter", self.host_filter.clone())
            .with("operation", self.operation)
            .with("permission_type", self.permission_type)
    }

    fn from_struct(mut value: Struct) -> Result<Self> {
        let schema = Self::schema();
        Ok(Self {
            resource_type_filter: value.take_i8(schema, "resource_type_filter")?,
            resource_name_filter: value.take_opt_string(schema, "resource_name_filter")?,
            pattern_type_filter: value.take_i8(schema, "pattern_type_filter")?,
            principal_filter: value.take_opt_string(schema, "principal_filter")?,
            host_filter: value.take_opt_string(schema, "host_filter")?,
            operation: value.take_i8(schema, "operation")?,
            permission_type: value.take_i8(schema, "permission_type")?,
        })
    }
}

impl Request for DescribeAclsRequestData {
    type Response = DescribeAclsResponseData;
    const API_KEY: ApiKey = ApiKey::DescribeAcls;
    const VERSIONS: VersionRange = VersionRange::new(0, 3);
}

impl BrokerMessage for DescribeAclsRequestData {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeAclsResponseData {
    pub throttle_time_ms: i32,
    pub error_code: i16,
    pub error_message: Option<String>,
    pub resources: Vec<DescribeAclsResource>,
}

impl Message for DescribeAclsResponseData {
    fn schema() -> &'static Schema {
        &DESCRIBE_ACLS_RESPONSE
    }

    fn to_struct(&self) -> Struct {
        Struct::new()
            .with("throttle_time_ms", self.throttle_time_ms)
            .with("error_code", self.error_code)
            .with("error_message", self.error_message.clone())
            .with("resources", to_structs(&self.resources))
    }

    fn from_struct(mut value: Struct) -> Result<Self> {
        let schema = Self::schema();
        Ok(Self {
            throttle_time_ms: value.take_i32(schema, "throttle_time_ms")?,
            error_code: value.take_i16(schema, "error_code")?,
            error_message: value.take_opt_string(schema, "error_message")?,
            resources: from_structs(value.take_array(schema, "resources")?)?,
        })
    }
}

/// A resource and the ACLs bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeAclsResource {
    pub resource_type: i8,
    pub resource_name: String,
    pub pattern_type: i8,
    pub acls: Vec<DescribeAclsAcl>,
}

impl Message for DescribeAclsResource {
    fn schema() -> &'static Schema {
        &DESCRIBE_ACLS_RESOURCE
    }

    fn to_struct(&self) -> Struct {
        Struct::new()
            .with("resource_type", self.resource_type)
            .with("resource_name", self.resource_name.as_str())
            .with("pattern_type", self.pattern_type)
            .with("acls", to_structs(&self.acls))
    }

    fn from_struct(mut value: Struct) -> Result<Self> {
        let schema = Self::schema();
        Ok(Self {
            resource_type: value.take_i8(schema, "resource_type")?,
            resource_name: value.take_string(schema, "resource_name")?,
            pattern_type: value.take_i8(schema, "pattern_type")?,
            acls: from_structs(value.take_array(schema, "acls")?)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeAclsAcl {
    pub principal: String,
    pub host: String,
    pub operation: i8,
    pub permission_type: i8,
}

impl Message for DescribeAclsAcl {
    fn schema() -> &'static Schema {
        &DESCRIBE_ACLS_ACL
    }

    fn to_struct(&self) -> Struct {
        Struct::new()
            .with("principal", self.principal.as_str())
            .with("host", self.host.as_str())
            .with("operation", self.operation)
            .with("permission_type", self.permission_type)
    }

    fn from_struct(mut value: Struct) -> Result<Self> {
        let schema = Self::schema();
        Ok(Self {
            principal: value.take_string(schema, "principal")?,
            host: value.take_string(schema, "host")?,
            operation: value.take_i8(schema, "operation")?,
            permission_type: value.take_i8(schema, "permission_type")?,
        })
    }
}
