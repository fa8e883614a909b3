//! Dynamic message values walked by the codec.

use std::collections::BTreeMap;

use bytes::Bytes;

use super::schema::Schema;
use crate::error::{Error, Result};

/// A raw entry of a tagged-field section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedField {
    pub tag: u32,
    pub data: Bytes,
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    /// `None` is the null string.
    String(Option<String>),
    /// `None` is the null array.
    Array(Option<Vec<Struct>>),
}

impl Value {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int8(_) => "int8",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::String(_) => "string",
            Value::Array(_) => "array",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Some(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Some(v.to_string()))
    }
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Struct>> for Value {
    fn from(v: Vec<Struct>) -> Self {
        Value::Array(Some(v))
    }
}

/// A message (or nested struct) as a set of named field values.
///
/// Only the fields present at the encoding version are written; fields
/// outside their version range are ignored on encode and never produced on
/// decode. Tagged fields read from a flexible message are kept verbatim so
/// the value re-encodes byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Struct {
    fields: BTreeMap<&'static str, Value>,
    pub tagged_fields: Vec<TaggedField>,
}

impl Struct {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &'static str, value: impl Into<Value>) {
        self.fields.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Remove and return a field, falling back to the schema default when the
    /// field is absent (typically because it is outside its version range).
    pub fn take(&mut self, schema: &Schema, name: &str) -> Result<Value> {
        if let Some(value) = self.fields.remove(name) {
            return Ok(value);
        }
        schema
            .field(name)
            .and_then(|f| f.default_value())
            .ok_or_else(|| Error::Decoding(format!("{}: missing field {}", schema.name, name)))
    }

    pub fn take_i8(&mut self, schema: &Schema, name: &str) -> Result<i8> {
        match self.take(schema, name)? {
            Value::Int8(v) => Ok(v),
            other => Err(mismatch(schema, name, "int8", &other)),
        }
    }

    pub fn take_i16(&mut self, schema: &Schema, name: &str) -> Result<i16> {
        match self.take(schema, name)? {
            Value::Int16(v) => Ok(v),
            other => Err(mismatch(schema, name, "int16", &other)),
        }
    }

    pub fn take_i32(&mut self, schema: &Schema, name: &str) -> Result<i32> {
        match self.take(schema, name)? {
            Value::Int32(v) => Ok(v),
            other => Err(mismatch(schema, name, "int32", &other)),
        }
    }

    /// A nullable string.
    pub fn take_opt_string(&mut self, schema: &Schema, name: &str) -> Result<Option<String>> {
        match self.take(schema, name)? {
            Value::String(v) => Ok(v),
            other => Err(mismatch(schema, name, "string", &other)),
        }
    }

    /// A non-nullable string.
    pub fn take_string(&mut self, schema: &Schema, name: &str) -> Result<String> {
        self.take_opt_string(schema, name)?
            .ok_or_else(|| Error::Decoding(format!("{}.{}: unexpected null", schema.name, name)))
    }

    /// An array of structs; a null array reads as empty.
    pub fn take_array(&mut self, schema: &Schema, name: &str) -> Result<Vec<Struct>> {
        match self.take(schema, name)? {
            Value::Array(v) => Ok(v.unwrap_or_default()),
            other => Err(mismatch(schema, name, "array", &other)),
        }
    }
}

fn mismatch(schema: &Schema, name: &str, expected: &str, got: &Value) -> Error {
    Error::Decoding(format!(
        "{}.{}: expected {}, found {}",
        schema.name,
        name,
        expected,
        got.kind()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::schema::{DefaultValue, Field, FieldType};

    static FIELDS: [Field; 3] = [
        Field::new("n", FieldType::Int8, 0, 1),
        Field::new("p", FieldType::Int8, 1, 1).with_default(DefaultValue::Int(3)),
        Field::new("s", FieldType::String, 0, 1).nullable(),
    ];
    static SCHEMA: Schema = Schema::new("ValueTest", &FIELDS);

    #[test]
    fn test_struct_equality_ignores_insertion_order() {
        let a = Struct::new().with("n", 1i8).with("s", "x");
        let b = Struct::new().with("s", "x").with("n", 1i8);
        assert_eq!(a, b);
    }

    #[test]
    fn test_take_typed() {
        let mut s = Struct::new().with("n", 7i8).with("s", None::<String>);
        assert_eq!(s.take_i8(&SCHEMA, "n").unwrap(), 7);
        assert_eq!(s.take_opt_string(&SCHEMA, "s").unwrap(), None);
        assert!(s.is_empty());
    }

    #[test]
    fn test_take_falls_back_to_default() {
        let mut s = Struct::new();
        assert_eq!(s.take_i8(&SCHEMA, "p").unwrap(), 3);
    }

    #[test]
    fn test_take_missing_required() {
        let mut s = Struct::new();
        let err = s.take_i8(&SCHEMA, "n").unwrap_err();
        assert!(matches!(err, Error::Decoding(_)));
    }

    #[test]
    fn test_take_kind_mismatch() {
        let mut s = Struct::new().with("n", 7i32);
        let err = s.take_i8(&SCHEMA, "n").unwrap_err();
        assert!(err.to_string().contains("expected int8, found int32"));
    }

    #[test]
    fn test_take_string_rejects_null() {
        let mut s = Struct::new().with("s", None::<String>);
        assert!(s.take_string(&SCHEMA, "s").is_err());
    }
}
