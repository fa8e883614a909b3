//! DeleteAcls (api key 31), versions 0-3, flexible from v2.

use super::describe_acls::LITERAL_PATTERN;
use super::{BrokerMessage, Message, Request, from_structs, to_structs};
use crate::error::Result;
use crate::protocol::api_key::ApiKey;
use crate::protocol::schema::{DefaultValue, Field, FieldType, Schema};
use crate::protocol::value::Struct;
use crate::types::VersionRange;

static FILTER_FIELDS: [Field; 7] = [
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

pub static DELETE_ACLS_FILTER: Schema =
    Schema::new("DeleteAclsFilter", &FILTER_FIELDS).flexible(2, 3);

static REQUEST_FIELDS: [Field; 1] =
    [Field::new("filters", FieldType::Array(&DELETE_ACLS_FILTER), 0, 3).compact()];

pub static DELETE_ACLS_REQUEST: Schema =
    Schema::new("DeleteAclsRequest", &REQUEST_FIELDS).flexible(2, 3);

static MATCHING_ACL_FIELDS: [Field; 9] = [
    Field::new("error_code", FieldType::Int16, 0, 3),
    Field::new("error_message", FieldType::String, 0, 3)
        .compact()
        .nullable(),
    Field::new("resource_type", FieldType::Int8, 0, 3),
    Field::new("resource_name", FieldType::String, 0, 3).compact(),
    Field::new("pattern_type", FieldType::Int8, 1, 3)
        .with_default(DefaultValue::Int(LITERAL_PATTERN)),
    Field::new("principal", FieldType::String, 0, 3).compact(),
    Field::new("host", FieldType::String, 0, 3).compact(),
    Field::new("operation", FieldType::Int8, 0, 3),
    Field::new("permission_type", FieldType::Int8, 0, 3),
];

pub static DELETE_ACLS_MATCHING_ACL: Schema =
    Schema::new("DeleteAclsMatchingAcl", &MATCHING_ACL_FIELDS).flexible(2, 3);

static FILTER_RESULT_FIELDS: [Field; 3] = [
    Field::new("error_code", FieldType::Int16, 0, 3),
    Field::new("error_message", FieldType::String, 0, 3)
        .compact()
        .nullable(),
    Field::new(
        "matching_acls",
        FieldType::Array(&DELETE_ACLS_MATCHING_ACL),
        0,
        3,
    )
    .compact(),
];

pub static DELETE_ACLS_FILTER_RESULT: Schema =
    Schema::new("DeleteAclsFilterResult", &FILTER_RESULT_FIELDS).flexible(2, 3);

static RESPONSE_FIELDS: [Field; 2] = [
    Field::new("throttle_time_ms", FieldType::Int32, 0, 3),
    Field::new(
        "filter_results",
        FieldType::Array(&DELETE_ACLS_FILTER_RESULT),
        0,
        3,
    )
    .compact(),
];

pub static DELETE_ACLS_RESPONSE: Schema =
    Schema::new("DeleteAclsResponse", &RESPONSE_FIELDS).flexible(2, 3);

/// DeleteAcls request: any number of filters, answered positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAclsRequestData {
    pub filters: Vec<DeleteAclsFilter>,
}

impl Message for DeleteAclsRequestData {
    fn schema() -> &'static Schema {
        &DELETE_ACLS_REQUEST
    }

    fn to_struct(&self) -> Struct {
        Struct::new().with("filters", to_structs(&self.filters))
    }

    fn from_struct(mut value: Struct) -> Result<Self> {
        Ok(Self {
            filters: from_structs(value.take_array(Self::schema(), "filters")?)?,
        })
    }
}

impl Request for DeleteAclsRequestData {
    type Response = DeleteAclsResponseData;
    const API_KEY: ApiKey = ApiKey::DeleteAcls;
    const VERSIONS: VersionRange = VersionRange::new(0, 3);
}

impl BrokerMessage for DeleteAclsRequestData {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAclsFilter {
    pub resource_type_filter: i8,
    pub resource_name_filter: Option<String>,
    pub pattern_type_filter: i8,
    pub principal_filter: Option<String>,
    pub host_filter: Option<String>,
    pub operation: i8,
    pub permission_type: i8,
}

impl Message for DeleteAclsFilter {
    fn schema() -> &'static Schema {
        &DELETE_ACLS_FILTER
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAclsResponseData {
    pub throttle_time_ms: i32,
    pub filter_results: Vec<DeleteAclsFilterResult>,
}

impl Message for DeleteAclsResponseData {
    fn schema() -> &'static Schema {
        &DELETE_ACLS_RESPONSE
    }

    fn to_struct(&self) -> Struct {
        Struct::new()
            .with("throttle_time_ms", self.throttle_time_ms)
            .with("filter_results", to_structs(&self.filter_results))
    }

    fn from_struct(mut value: Struct) -> Result<Self> {
        let schema = Self::schema();
        Ok(Self {
            throttle_time_ms: value.take_i32(schema, "throttle_time_ms")?,
            filter_results: from_structs(value.take_array(schema, "filter_results")?)?,
        })
    }
}

/// Outcome of one filter: its own error plus the ACLs it removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAclsFilterResult {
    pub error_code: i16,
    pub error_message: Option<String>,
    pub matching_acls: Vec<DeleteAclsMatchingAcl>,
}

impl Message for DeleteAclsFilterResult {
    fn schema() -> &'static Schema {
        &DELETE_ACLS_FILTER_RESULT
    }

    fn to_struct(&self) -> Struct {
        Struct::new()
            .with("error_code", self.error_code)
            .with("error_message", self.error_message.clone())
            .with("matching_acls", to_structs(&self.matching_acls))
    }

    fn from_struct(mut value: Struct) -> Result<Self> {
        let schema = Self::schema();
        Ok(Self {
            error_code: value.take_i16(schema, "error_code")?,
            error_message: value.take_opt_string(schema, "error_message")?,
            matching_acls: from_structs(value.take_array(schema, "matching_acls")?)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAclsMatchingAcl {
    pub error_code: i16,
    pub error_message: Option<String>,
    pub resource_type: i8,
    pub resource_name: String,
    pub pattern_type: i8,
    pub principal: String,
    pub host: String,
    pub operation: i8,
    pub permission_type: i8,
}

impl Message for DeleteAclsMatchingAcl {
    fn schema() -> &'static Schema {
        &DELETE_ACLS_MATCHING_ACL
    }

    fn to_struct(&self) -> Struct {
        Struct::new()
            .with("error_code", self.error_code)
            .with("error_message", self.error_message.clone())
            .with("resource_type", self.resource_type)
            .with("resource_name", self.resource_name.as_str())
            .with("pattern_type", self.pattern_type)
            .with("principal", self.principal.as_str())
            .with("host", self.host.as_str())
            .with("operation", self.operation)
            .with("permission_type", self.permission_type)
    }

    fn from_struct(mut value: Struct) -> Result<Self> {
        let schema = Self::schema();
        Ok(Self {
            error_code: value.take_i16(schema, "error_code")?,
            error_message: value.take_opt_string(schema, "error_message")?,
            resource_type: value.take_i8(schema, "resource_type")?,
            resource_name: value.take_string(schema, "resource_name")?,
            pattern_type: value.take_i8(schema, "pattern_type")?,
            principal: value.take_string(schema, "principal")?,
            host: value.take_string(schema, "host")?,
            operation: value.take_i8(schema, "operation")?,
            permission_type: value.take_i8(schema, "permission_type")?,
        })
    }
}
