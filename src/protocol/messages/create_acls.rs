//! CreateAcls (api key 30), versions 0-3, flexible from v2.

use super::describe_acls::LITERAL_PATTERN;
use super::{BrokerMessage, Message, Request, from_structs, to_structs};
use crate::error::Result;
use crate::protocol::api_key::ApiKey;
use crate::protocol::schema::{DefaultValue, Field, FieldType, Schema};
use crate::protocol::value::Struct;
use crate::types::VersionRange;

static CREATION_FIELDS: [Field; 7] = [
    Field::new("resource_type", FieldType::Int8, 0, 3),
    Field::new("resource_name", FieldType::String, 0, 3).compact(),
    Field::new("resource_pattern_type", FieldType::Int8, 1, 3)
        .with_default(DefaultValue::Int(LITERAL_PATTERN)),
    Field::new("principal", FieldType::String, 0, 3).compact(),
    Field::new("host", FieldType::String, 0, 3).compact(),
    Field::new("operation", FieldType::Int8, 0, 3),
    Field::new("permission_type", FieldType::Int8, 0, 3),
];

pub static ACL_CREATION: Schema = Schema::new("AclCreation", &CREATION_FIELDS).flexible(2, 3);

static REQUEST_FIELDS: [Field; 1] =
    [Field::new("creations", FieldType::Array(&ACL_CREATION), 0, 3).compact()];

pub static CREATE_ACLS_REQUEST: Schema =
    Schema::new("CreateAclsRequest", &REQUEST_FIELDS).flexible(2, 3);

static RESULT_FIELDS: [Field; 2] = [
    Field::new("error_code", FieldType::Int16, 0, 3),
    Field::new("error_message", FieldType::String, 0, 3)
        .compact()
        .nullable(),
];

pub static ACL_CREATION_RESULT: Schema =
    Schema::new("AclCreationResult", &RESULT_FIELDS).flexible(2, 3);

static RESPONSE_FIELDS: [Field; 2] = [
    Field::new("throttle_time_ms", FieldType::Int32, 0, 3),
    Field::new("results", FieldType::Array(&ACL_CREATION_RESULT), 0, 3).compact(),
];

pub static CREATE_ACLS_RESPONSE: Schema =
    Schema::new("CreateAclsResponse", &RESPONSE_FIELDS).flexible(2, 3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAclsRequestData {
    pub creations: Vec<AclCreation>,
}

impl Message for CreateAclsRequestData {
    fn schema() -> &'static Schema {
        &CREATE_ACLS_REQUEST
    }

    fn to_struct(&self) -> Struct {
        Struct::new().with("creations", to_structs(&self.creations))
    }

    fn from_struct(mut value: Struct) -> Result<Self> {
        Ok(Self {
            creations: from_structs(value.take_array(Self::schema(), "creations")?)?,
        })
    }
}

impl Request for CreateAclsRequestData {
    type Response = CreateAclsResponseData;
    const API_KEY: ApiKey = ApiKey::CreateAcls;
    const VERSIONS: VersionRange = VersionRange::new(0, 3);
}

impl BrokerMessage for CreateAclsRequestData {}

/// One concrete ACL binding to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclCreation {
    pub resource_type: i8,
    pub resource_name: String,
    pub resource_pattern_type: i8,
    pub principal: String,
    pub host: String,
    pub operation: i8,
    pub permission_type: i8,
}

impl Message for AclCreation {
    fn schema() -> &'static Schema {
        &ACL_CREATION
    }

    fn to_struct(&self) -> Struct {
        Struct::new()
            .with("resource_type", self.resource_type)
            .with("resource_name", self.resource_name.as_str())
            .with("resource_pattern_type", self.resource_pattern_type)
            .with("principal", self.principal.as_str())
            .with("host", self.host.as_str())
            .with("operation", self.operation)
            .with("permission_type", self.permission_type)
    }

    fn from_struct(mut value: Struct) -> Result<Self> {
        let schema = Self::schema();
        Ok(Self {
            resource_type: value.take_i8(schema, "resource_type")?,
            resource_name: value.take_string(schema, "resource_name")?,
            resource_pattern_type: value.take_i8(schema, "resource_pattern_type")?,
            principal: value.take_string(schema, "principal")?,
            host: value.take_string(schema, "host")?,
            operation: value.take_i8(schema, "operation")?,
            permission_type: value.take_i8(schema, "permission_type")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAclsResponseData {
    pub throttle_time_ms: i32,
    pub results: Vec<AclCreationResult>,
}

impl Message for CreateAclsResponseData {
    fn schema() -> &'static Schema {
        &CREATE_ACLS_RESPONSE
    }

    fn to_struct(&self) -> Struct {
        Struct::new()
            .with("throttle_time_ms", self.throttle_time_ms)
            .with("results", to_structs(&self.results))
    }

    fn from_struct(mut value: Struct) -> Result<Self> {
        let schema = Self::schema();
        Ok(Self {
            throttle_time_ms: value.take_i32(schema, "throttle_time_ms")?,
            results: from_structs(value.take_array(schema, "results")?)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclCreationResult {
    pub error_code: i16,
    pub error_message: Option<String>,
}

impl Message for AclCreationResult {
    fn schema() -> &'static Schema {
        &ACL_CREATION_RESULT
    }

    fn to_struct(&self) -> Struct {
        Struct::new()
            .with("error_code", self.error_code)
            .with("error_message", self.error_message.clone())
    }

    fn from_struct(mut value: Struct) -> Result<Self> {
        let schema = Self::schema();
        Ok(Self {
            error_code: value.take_i16(schema, "error_code")?,
            error_message: value.take_opt_string(schema, "error_message")?,
        })
    }
}
