//! Static schema descriptors for versioned messages.
//!
//! A [`Schema`] is an ordered table of [`Field`]s. Each field carries the
//! inclusive version range in which it is on the wire and the qualifiers
//! that pick its layout:
//!
//! - `compact`: strings and arrays use a varint `length + 1` prefix in
//!   flexible versions and a fixed-width prefix in classic versions.
//! - `nullable`: absence is written as a sentinel (`-1` classic, `0`
//!   compact) instead of being rejected.
//!
//! Whether a message is *flexible* at a version is a single, message-wide
//! decision taken from the top-level schema's tag section. The pair
//! `(schema, version)` is resolved once into a [`Layout`] and cached.
//!
//! ```rust
//! use kafkaesque_admin::protocol::schema::{Field, FieldType, Schema};
//!
//! static FIELDS: [Field; 2] = [
//!     Field::new("throttle_time_ms", FieldType::Int32, 0, 3),
//!     Field::new("error_message", FieldType::String, 0, 3).compact().nullable(),
//! ];
//! static EXAMPLE: Schema = Schema::new("Example", &FIELDS).flexible(2, 3);
//!
//! assert!(!EXAMPLE.is_flexible(1));
//! assert!(EXAMPLE.layout(2).flexible);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use super::value::Value;
use crate::error::{Error, Result};
use crate::types::VersionRange;

/// Semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    String,
    /// Array of nested structs described by another schema.
    Array(&'static Schema),
}

impl FieldType {
    fn name(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::Int8 => "int8",
            FieldType::Int16 => "int16",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::String => "string",
            FieldType::Array(_) => "array",
        }
    }
}

/// Value used when a field is missing from the message being encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    /// Null string or array. Only valid on nullable fields.
    Null,
    /// Empty string or array.
    Empty,
}

/// One field of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub versions: VersionRange,
    pub compact: bool,
    pub nullable: bool,
    pub default: Option<DefaultValue>,
}

impl Field {
    /// A required, non-compact, non-nullable field present in `[min, max]`.
    pub const fn new(name: &'static str, ty: FieldType, min: i16, max: i16) -> Self {
        Self {
            name,
            ty,
            versions: VersionRange::new(min, max),
            compact: false,
            nullable: false,
            default: None,
        }
    }

    pub const fn compact(mut self) -> Self {
        self.compact = true;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// `min_version <= version <= max_version`.
    #[inline]
    pub const fn is_present(&self, version: i16) -> bool {
        self.versions.contains(version)
    }

    /// Materialize the declared default, if any.
    ///
    /// `None` when the default does not fit the field type or width.
    pub fn default_value(&self) -> Option<Value> {
        let default = self.default?;
        let value = match (self.ty, default) {
            (FieldType::Bool, DefaultValue::Bool(b)) => Value::Bool(b),
            (FieldType::Int8, DefaultValue::Int(n)) => Value::Int8(i8::try_from(n).ok()?),
            (FieldType::Int16, DefaultValue::Int(n)) => Value::Int16(i16::try_from(n).ok()?),
            (FieldType::Int32, DefaultValue::Int(n)) => Value::Int32(i32::try_from(n).ok()?),
            (FieldType::Int64, DefaultValue::Int(n)) => Value::Int64(n),
            (FieldType::String, DefaultValue::Null) => Value::String(None),
            (FieldType::String, DefaultValue::Empty) => Value::String(Some(String::new())),
            (FieldType::Array(_), DefaultValue::Null) => Value::Array(None),
            (FieldType::Array(_), DefaultValue::Empty) => Value::Array(Some(Vec::new())),
            _ => return None,
        };
        Some(value)
    }
}

/// Static description of a message or nested struct.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [Field],
    /// Versions in which the message carries a trailing tagged-field
    /// section, i.e. the flexible versions.
    pub tag_section: Option<VersionRange>,
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Self {
            name,
            fields,
            tag_section: None,
        }
    }

    /// Declare the tag section, making the message flexible in `[min, max]`.
    pub const fn flexible(mut self, min: i16, max: i16) -> Self {
        self.tag_section = Some(VersionRange::new(min, max));
        self
    }

    /// A message is flexible at `version` iff its tag section covers it.
    #[inline]
    pub fn is_flexible(&self, version: i16) -> bool {
        self.tag_section.is_some_and(|r| r.contains(version))
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Resolved layout of this message at `version`.
    pub fn layout(&'static self, version: i16) -> Arc<Layout> {
        Layout::resolve(self, version, self.is_flexible(version))
    }

    /// Check the table for mistakes that would make the codec ambiguous.
    ///
    /// Nested schemas are checked recursively.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in self.fields {
            if !seen.insert(field.name) {
                return Err(Error::Config(format!(
                    "{}: duplicate field {}",
                    self.name, field.name
                )));
            }
            if let Some(default) = field.default {
                if field.default_value().is_none() {
                    return Err(Error::Config(format!(
                        "{}.{}: default {:?} does not fit a {} field",
                        self.name,
                        field.name,
                        default,
                        field.ty.name()
                    )));
                }
                if default == DefaultValue::Null && !field.nullable {
                    return Err(Error::Config(format!(
                        "{}.{}: null default on a non-nullable field",
                        self.name, field.name
                    )));
                }
            }
            if (field.compact || field.nullable)
                && !matches!(field.ty, FieldType::String | FieldType::Array(_))
            {
                return Err(Error::Config(format!(
                    "{}.{}: compact/nullable only apply to strings and arrays",
                    self.name, field.name
                )));
            }
            if let FieldType::Array(element) = field.ty {
                element.validate()?;
            }
        }
        Ok(())
    }
}

/// Concrete wire representation of one field at one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    /// `i16` length prefix, `-1` for null.
    String { nullable: bool },
    /// Varint `length + 1` prefix, `0` for null.
    CompactString { nullable: bool },
    /// `i32` count prefix, `-1` for null.
    Array {
        nullable: bool,
        element: &'static Schema,
    },
    /// Varint `count + 1` prefix, `0` for null.
    CompactArray {
        nullable: bool,
        element: &'static Schema,
    },
}

/// A field that is present on the wire at the layout's version.
#[derive(Debug, Clone, Copy)]
pub struct FieldPlan {
    pub field: &'static Field,
    pub kind: WireKind,
}

/// The fields of a schema present at one version, with their wire kinds.
#[derive(Debug)]
pub struct Layout {
    pub schema: &'static Schema,
    pub version: i16,
    /// Message-wide flexible switch: every struct in the message carries a
    /// tagged-field section, and every `compact` field uses varint prefixes.
    pub flexible: bool,
    pub fields: Vec<FieldPlan>,
}

type LayoutKey = (usize, i16, bool);

static LAYOUTS: Lazy<DashMap<LayoutKey, Arc<Layout>>> = Lazy::new(DashMap::new);

impl Layout {
    /// Resolve (or fetch from the cache) the layout of `schema` at `version`.
    ///
    /// `flexible` comes from the top-level message; nested structs inherit it.
    pub fn resolve(schema: &'static Schema, version: i16, flexible: bool) -> Arc<Layout> {
        let key = (schema as *const Schema as usize, version, flexible);
        if let Some(layout) = LAYOUTS.get(&key) {
            return Arc::clone(layout.value());
        }
        let layout = Arc::new(Self::build(schema, version, flexible));
        Arc::clone(LAYOUTS.entry(key).or_insert(layout).value())
    }

    fn build(schema: &'static Schema, version: i16, flexible: bool) -> Layout {
        let fields = schema
            .fields
            .iter()
            .filter(|f| f.is_present(version))
            .map(|field| {
                let compact = flexible && field.compact;
                let nullable = field.nullable;
                let kind = match field.ty {
                    FieldType::Bool => WireKind::Bool,
                    FieldType::Int8 => WireKind::Int8,
                    FieldType::Int16 => WireKind::Int16,
                    FieldType::Int32 => WireKind::Int32,
                    FieldType::Int64 => WireKind::Int64,
                    FieldType::String if compact => WireKind::CompactString { nullable },
                    FieldType::String => WireKind::String { nullable },
                    FieldType::Array(element) if compact => {
                        WireKind::CompactArray { nullable, element }
                    }
                    FieldType::Array(element) => WireKind::Array { nullable, element },
                };
                FieldPlan { field, kind }
            })
            .collect();

        tracing::trace!(
            schema = schema.name,
            version,
            flexible,
            "resolved message layout"
        );

        Layout {
            schema,
            version,
            flexible,
            fields,
        }
    }
}
