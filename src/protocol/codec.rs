//! Schema-driven, versioned encoding and decoding.
//!
//! [`encode`] and [`decode`] walk a message's resolved [`Layout`] in
//! declaration order. Both are pure functions of their inputs, and for every
//! value `m` valid at version `v`:
//!
//! ```text
//! decode(encode(m, v), v) == m
//! ```
//!
//! Fields outside their version range produce no bytes and consume none.
//! In flexible versions every struct (the message and each nested array
//! element) ends with a tagged-field section; unknown tags read on decode are
//! kept on the [`Struct`] and written back on encode.

use bytes::{BufMut, Bytes, BytesMut};
use nom::{
    IResult,
    error::ErrorKind,
    number::complete::{be_i8, be_i16, be_i32, be_i64},
};
use nombytes::NomBytes;

use super::schema::{Layout, Schema, WireKind};
use super::value::{Struct, Value};
use crate::constants::DEFAULT_ENCODE_CAPACITY;
use crate::encode::{
    ToByte, encode_array_len, encode_compact_array_len, encode_compact_string,
    encode_tagged_fields,
};
use crate::error::{Error, Result};
use crate::parser::{
    parse_array_len, parse_compact_array_len, parse_compact_nullable_string,
    parse_nullable_string, parse_tagged_fields,
};

/// Encode `value` as `schema` at `version`.
pub fn encode(value: &Struct, schema: &'static Schema, version: i16) -> Result<Bytes> {
    let mut buffer = BytesMut::with_capacity(DEFAULT_ENCODE_CAPACITY);
    encode_into(&mut buffer, value, schema, version)?;
    Ok(buffer.freeze())
}

/// Encode `value` as `schema` at `version`, appending to `buffer`.
pub fn encode_into<W: BufMut>(
    buffer: &mut W,
    value: &Struct,
    schema: &'static Schema,
    version: i16,
) -> Result<()> {
    let layout = schema.layout(version);
    encode_struct(buffer, value, &layout)
}

fn encode_struct<W: BufMut>(buffer: &mut W, value: &Struct, layout: &Layout) -> Result<()> {
    for plan in &layout.fields {
        let field = plan.field;
        let default;
        let v = match value.get(field.name) {
            Some(v) => v,
            None => {
                default = field.default_value().ok_or_else(|| {
                    Error::Encoding(format!(
                        "{}: missing required field {}",
                        layout.schema.name, field.name
                    ))
                })?;
                &default
            }
        };
        encode_field(buffer, layout, plan.kind, field.name, v)?;
    }

    if layout.flexible {
        encode_tagged_fields(buffer, &value.tagged_fields)?;
    }
    Ok(())
}

fn encode_field<W: BufMut>(
    buffer: &mut W,
    layout: &Layout,
    kind: WireKind,
    name: &str,
    value: &Value,
) -> Result<()> {
    let null_check = |is_null: bool, nullable: bool| {
        if is_null && !nullable {
            Err(Error::Encoding(format!(
                "{}.{}: null value for non-nullable field",
                layout.schema.name, name
            )))
        } else {
            Ok(())
        }
    };

    match (kind, value) {
        (WireKind::Bool, Value::Bool(v)) => v.encode(buffer),
        (WireKind::Int8, Value::Int8(v)) => v.encode(buffer),
        (WireKind::Int16, Value::Int16(v)) => v.encode(buffer),
        (WireKind::Int32, Value::Int32(v)) => v.encode(buffer),
        (WireKind::Int64, Value::Int64(v)) => v.encode(buffer),
        (WireKind::String { nullable }, Value::String(s)) => {
            null_check(s.is_none(), nullable)?;
            s.as_deref().encode(buffer).map_err(|e| context(layout, name, e))
        }
        (WireKind::CompactString { nullable }, Value::String(s)) => {
            null_check(s.is_none(), nullable)?;
            encode_compact_string(buffer, s.as_deref())
        }
        (WireKind::Array { nullable, element }, Value::Array(items)) => {
            null_check(items.is_none(), nullable)?;
            encode_array_len(buffer, items.as_ref().map(Vec::len))?;
            let element = Layout::resolve(element, layout.version, layout.flexible);
            for item in items.iter().flatten() {
                encode_struct(buffer, item, &element)?;
            }
            Ok(())
        }
        (WireKind::CompactArray { nullable, element }, Value::Array(items)) => {
            null_check(items.is_none(), nullable)?;
            encode_compact_array_len(buffer, items.as_ref().map(Vec::len))?;
            let element = Layout::resolve(element, layout.version, layout.flexible);
            for item in items.iter().flatten() {
                encode_struct(buffer, item, &element)?;
            }
            Ok(())
        }
        (kind, value) => Err(Error::Encoding(format!(
            "{}.{}: cannot encode {} value as {:?}",
            layout.schema.name,
            name,
            value.kind(),
            kind
        ))),
    }
}

fn context(layout: &Layout, name: &str, err: Error) -> Error {
    match err {
        Error::Encoding(msg) => Error::Encoding(format!("{}.{}: {}", layout.schema.name, name, msg)),
        other => other,
    }
}

/// Decode exactly one `schema` message at `version` from `bytes`.
///
/// Trailing bytes after the message are an error.
pub fn decode(bytes: Bytes, schema: &'static Schema, version: i16) -> Result<Struct> {
    let (rest, value) = decode_prefix(NomBytes::new(bytes), schema, version)?;
    let rest = rest.into_bytes();
    if !rest.is_empty() {
        return Err(Error::Decoding(format!(
            "{} v{}: {} trailing bytes after message",
            schema.name,
            version,
            rest.len()
        )));
    }
    Ok(value)
}

/// Decode one `schema` message at `version` from the front of `input`,
/// returning the unconsumed remainder.
pub fn decode_prefix(
    input: NomBytes,
    schema: &'static Schema,
    version: i16,
) -> Result<(NomBytes, Struct)> {
    let layout = schema.layout(version);
    decode_struct(input, &layout)
}

fn decode_struct(mut s: NomBytes, layout: &Layout) -> Result<(NomBytes, Struct)> {
    let mut value = Struct::new();
    for plan in &layout.fields {
        let (rest, v) = decode_field(s, layout, plan.kind, plan.field.name)?;
        value.set(plan.field.name, v);
        s = rest;
    }

    if layout.flexible {
        let (rest, tagged) = read(parse_tagged_fields(s), layout, "tagged fields")?;
        if !tagged.is_empty() {
            tracing::debug!(
                schema = layout.schema.name,
                version = layout.version,
                count = tagged.len(),
                "keeping unrecognized tagged fields"
            );
        }
        value.tagged_fields = tagged;
        s = rest;
    }
    Ok((s, value))
}

fn decode_field(
    s: NomBytes,
    layout: &Layout,
    kind: WireKind,
    name: &str,
) -> Result<(NomBytes, Value)> {
    match kind {
        WireKind::Bool => {
            let (s, v) = read(be_i8(s), layout, name)?;
            Ok((s, Value::Bool(v != 0)))
        }
        WireKind::Int8 => {
            let (s, v) = read(be_i8(s), layout, name)?;
            Ok((s, Value::Int8(v)))
        }
        WireKind::Int16 => {
            let (s, v) = read(be_i16(s), layout, name)?;
            Ok((s, Value::Int16(v)))
        }
        WireKind::Int32 => {
            let (s, v) = read(be_i32(s), layout, name)?;
            Ok((s, Value::Int32(v)))
        }
        WireKind::Int64 => {
            let (s, v) = read(be_i64(s), layout, name)?;
            Ok((s, Value::Int64(v)))
        }
        WireKind::String { nullable } => {
            let (s, raw) = read(parse_nullable_string(s), layout, name)?;
            Ok((s, string_value(raw, nullable, layout, name)?))
        }
        WireKind::CompactString { nullable } => {
            let (s, raw) = read(parse_compact_nullable_string(s), layout, name)?;
            Ok((s, string_value(raw, nullable, layout, name)?))
        }
        WireKind::Array { nullable, element } => {
            let (s, len) = read(parse_array_len(s), layout, name)?;
            decode_items(s, len, nullable, element, layout, name)
        }
        WireKind::CompactArray { nullable, element } => {
            let (s, len) = read(parse_compact_array_len(s), layout, name)?;
            decode_items(s, len, nullable, element, layout, name)
        }
    }
}

fn decode_items(
    mut s: NomBytes,
    len: Option<usize>,
    nullable: bool,
    element: &'static Schema,
    layout: &Layout,
    name: &str,
) -> Result<(NomBytes, Value)> {
    let Some(len) = len else {
        null_allowed(nullable, layout, name)?;
        return Ok((s, Value::Array(None)));
    };

    let element = Layout::resolve(element, layout.version, layout.flexible);
    let mut items = Vec::with_capacity(len.min(1024));
    for _ in 0..len {
        let (rest, item) = decode_struct(s, &element)?;
        items.push(item);
        s = rest;
    }
    Ok((s, Value::Array(Some(items))))
}

fn string_value(
    raw: Option<Bytes>,
    nullable: bool,
    layout: &Layout,
    name: &str,
) -> Result<Value> {
    let Some(raw) = raw else {
        null_allowed(nullable, layout, name)?;
        return Ok(Value::String(None));
    };
    let s = String::from_utf8(raw.to_vec()).map_err(|_| {
        Error::Decoding(format!(
            "{} v{}: field {}: invalid UTF-8",
            layout.schema.name, layout.version, name
        ))
    })?;
    Ok(Value::String(Some(s)))
}

fn null_allowed(nullable: bool, layout: &Layout, name: &str) -> Result<()> {
    if nullable {
        Ok(())
    } else {
        Err(Error::Decoding(format!(
            "{} v{}: field {}: null length on non-nullable field",
            layout.schema.name, layout.version, name
        )))
    }
}

fn read<T>(result: IResult<NomBytes, T>, layout: &Layout, field: &str) -> Result<(NomBytes, T)> {
    result.map_err(|e| {
        let reason = match &e {
            nom::Err::Incomplete(_) => "truncated input",
            nom::Err::Error(e) | nom::Err::Failure(e) => match e.code {
                ErrorKind::Eof => "truncated input",
                ErrorKind::TooLarge => "length exceeds protocol limit",
                ErrorKind::LengthValue => "invalid negative length",
                _ => "malformed input",
            },
        };
        Error::Decoding(format!(
            "{} v{}: field {}: {}",
            layout.schema.name, layout.version, field, reason
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TaggedField;
    use crate::protocol::schema::{DefaultValue, Field, FieldType};

    static ITEM_FIELDS: [Field; 2] = [
        Field::new("id", FieldType::Int16, 0, 3),
        Field::new("label", FieldType::String, 0, 3).compact(),
    ];
    static ITEM: Schema = Schema::new("Item", &ITEM_FIELDS).flexible(2, 3);

    static MSG_FIELDS: [Field; 5] = [
        Field::new("throttle_time_ms", FieldType::Int32, 0, 3),
        Field::new("mode", FieldType::Int8, 1, 3).with_default(DefaultValue::Int(3)),
        Field::new("note", FieldType::String, 0, 3).compact().nullable(),
        Field::new("flag", FieldType::Bool, 0, 3),
        Field::new("items", FieldType::Array(&ITEM), 0, 3).compact(),
    ];
    static MSG: Schema = Schema::new("Msg", &MSG_FIELDS).flexible(2, 3);

    fn sample(version: i16) -> Struct {
        let mut s = Struct::new()
            .with("throttle_time_ms", 100i32)
            .with("note", "hi")
            .with("flag", true)
            .with(
                "items",
                vec![Struct::new().with("id", 7i16).with("label", "x")],
            );
        if version >= 1 {
            s.set("mode", 4i8);
        }
        s
    }

    #[test]
    fn test_encode_classic_v0_bytes() {
        let bytes = encode(&sample(0), &MSG, 0).unwrap();
        let expected: Vec<u8> = vec![
            0x00, 0x00, 0x00, 0x64, // throttle_time_ms = 100
            // mode absent at v0
            0x00, 0x02, b'h', b'i', // note: i16 length
            0x01, // flag
            0x00, 0x00, 0x00, 0x01, // items: i32 count
            0x00, 0x07, // id
            0x00, 0x01, b'x', // label
        ];
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn test_encode_flexible_v2_bytes() {
        let bytes = encode(&sample(2), &MSG, 2).unwrap();
        let expected: Vec<u8> = vec![
            0x00, 0x00, 0x00, 0x64, // throttle_time_ms = 100
            0x04, // mode
            0x03, b'h', b'i', // note: compact length + 1
            0x01, // flag
            0x02, // items: compact count + 1
            0x00, 0x07, // id
            0x02, b'x', // label
            0x00, // item tagged fields
            0x00, // message tagged fields
        ];
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn test_round_trip_all_versions() {
        for version in 0..=3 {
            let value = sample(version);
            let bytes = encode(&value, &MSG, version).unwrap();
            let decoded = decode(bytes, &MSG, version).unwrap();
            assert_eq!(decoded, value, "round trip at v{}", version);
        }
    }

    #[test]
    fn test_version_gated_field_ignored_on_encode() {
        // "mode" is set but absent at v0: same bytes as without it.
        let with_mode = sample(0).with("mode", 1i8);
        assert_eq!(
            encode(&with_mode, &MSG, 0).unwrap(),
            encode(&sample(0), &MSG, 0).unwrap()
        );
    }

    #[test]
    fn test_default_used_for_missing_field() {
        let bytes = encode(&sample(0), &MSG, 1).unwrap();
        let decoded = decode(bytes, &MSG, 1).unwrap();
        assert_eq!(decoded.get("mode"), Some(&Value::Int8(3)));
    }

    #[test]
    fn test_missing_required_field() {
        let value = Struct::new().with("note", "hi");
        let err = encode(&value, &MSG, 0).unwrap_err();
        assert!(matches!(err, Error::Encoding(ref m) if m.contains("throttle_time_ms")));
    }

    #[test]
    fn test_wrong_value_kind() {
        let value = sample(0).with("throttle_time_ms", 1i8);
        assert!(matches!(encode(&value, &MSG, 0), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_null_for_non_nullable_string_rejected_on_encode() {
        let value = Struct::new()
            .with("id", 1i16)
            .with("label", None::<String>);
        assert!(matches!(encode(&value, &ITEM, 0), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_null_vs_empty_string() {
        let null = sample(3).with("note", None::<String>);
        let empty = sample(3).with("note", "");

        let null_bytes = encode(&null, &MSG, 3).unwrap();
        let empty_bytes = encode(&empty, &MSG, 3).unwrap();
        assert_eq!(null_bytes[5], 0x00);
        assert_eq!(empty_bytes[5], 0x01);

        assert_eq!(decode(null_bytes, &MSG, 3).unwrap(), null);
        assert_eq!(decode(empty_bytes, &MSG, 3).unwrap(), empty);
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = encode(&sample(2), &MSG, 2).unwrap();
        for cut in 0..bytes.len() {
            let err = decode(bytes.slice(..cut), &MSG, 2).unwrap_err();
            assert!(matches!(err, Error::Decoding(_)), "cut at {}", cut);
        }
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut bytes = encode(&sample(0), &MSG, 0).unwrap().to_vec();
        bytes.push(0xFF);
        let err = decode(Bytes::from(bytes), &MSG, 0).unwrap_err();
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn test_decode_negative_length_on_non_nullable_array() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&(-1i16).to_be_bytes()); // null note is fine
        bytes.push(0);
        bytes.extend_from_slice(&(-1i32).to_be_bytes()); // null items is not
        let err = decode(Bytes::from(bytes), &MSG, 0).unwrap_err();
        assert!(err.to_string().contains("non-nullable"));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&2i16.to_be_bytes());
        bytes.extend_from_slice(&[0xFF, 0xFE]);
        bytes.push(0);
        bytes.extend_from_slice(&0i32.to_be_bytes());
        let err = decode(Bytes::from(bytes), &MSG, 0).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_unknown_tagged_fields_preserved() {
        let mut bytes = encode(&sample(3), &MSG, 3).unwrap().to_vec();
        // Replace the empty message tag section with one unknown tag.
        bytes.pop();
        bytes.extend_from_slice(&[0x01, 0x09, 0x02, 0xAB, 0xCD]);

        let decoded = decode(Bytes::from(bytes.clone()), &MSG, 3).unwrap();
        assert_eq!(
            decoded.tagged_fields,
            vec![TaggedField {
                tag: 9,
                data: Bytes::from_static(&[0xAB, 0xCD]),
            }]
        );

        let reencoded = encode(&decoded, &MSG, 3).unwrap();
        assert_eq!(&reencoded[..], &bytes[..]);
    }

    #[test]
    fn test_tagged_fields_not_written_in_classic_versions() {
        let mut value = sample(1);
        value.tagged_fields.push(TaggedField {
            tag: 1,
            data: Bytes::from_static(b"z"),
        });
        assert_eq!(
            encode(&value, &MSG, 1).unwrap(),
            encode(&sample(1), &MSG, 1).unwrap()
        );
    }
}
