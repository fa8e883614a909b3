//! Deserialize data from the bytecode protocol.
use bytes::Bytes;
use nom::{
    IResult,
    bytes::complete::take,
    error::ErrorKind,
    number::complete::{be_i16, be_i32},
};
use nombytes::NomBytes;

use crate::constants::{MAX_PROTOCOL_ARRAY_SIZE, MAX_TAGGED_FIELDS};
use crate::protocol::TaggedField;

fn failure<T>(s: NomBytes, kind: ErrorKind) -> IResult<NomBytes, T> {
    Err(nom::Err::Failure(nom::error::Error::new(s, kind)))
}

/// Convert bytes to a validated UTF-8 string.
/// Returns an error if the bytes are not valid UTF-8.
pub fn bytes_to_string(bytes: &Bytes) -> Result<String, nom::Err<nom::error::Error<NomBytes>>> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|_| {
            nom::Err::Failure(nom::error::Error::new(
                NomBytes::from(bytes.as_ref()),
                ErrorKind::Verify,
            ))
        })
}

/// Convert optional bytes to a validated UTF-8 string.
/// Returns None for None input, error for invalid UTF-8.
pub fn bytes_to_string_opt(
    bytes: Option<Bytes>,
) -> Result<Option<String>, nom::Err<nom::error::Error<NomBytes>>> {
    match bytes {
        Some(b) => bytes_to_string(&b).map(Some),
        None => Ok(None),
    }
}

/// Parse a classic NULLABLE_STRING: i16 length, `-1` for null.
pub fn parse_nullable_string(s: NomBytes) -> IResult<NomBytes, Option<Bytes>> {
    let (s, length) = be_i16(s)?;

    // Null string
    if length == -1 {
        return Ok((s, None));
    }

    if length < 0 {
        return failure(s, ErrorKind::LengthValue);
    }

    let (s, string) = take(length as u16)(s)?;
    Ok((s, Some(string.into_bytes())))
}

/// Parse a classic array count: i32, `-1` for null.
///
/// Any other negative count, or a count above [`MAX_PROTOCOL_ARRAY_SIZE`], is
/// a failure.
pub fn parse_array_len(s: NomBytes) -> IResult<NomBytes, Option<usize>> {
    let (s, length) = be_i32(s)?;

    // Null array
    if length == -1 {
        return Ok((s, None));
    }

    // Validate array size bounds
    if !(0..=MAX_PROTOCOL_ARRAY_SIZE).contains(&length) {
        return failure(s, ErrorKind::TooLarge);
    }

    Ok((s, Some(length as usize)))
}

/// Parse an unsigned varint (variable-length integer) used in flexible encoding.
/// Returns the parsed value and remaining bytes.
pub fn parse_unsigned_varint(s: NomBytes) -> IResult<NomBytes, u32> {
    let mut result: u32 = 0;
    let mut shift = 0;
    let mut remaining = s;

    loop {
        let (s, byte) = take(1usize)(remaining)?;
        let b = byte.into_bytes()[0];
        remaining = s;

        // The fifth byte carries only the top four bits of a u32.
        if shift == 28 && (b & 0x70) != 0 {
            return failure(remaining, ErrorKind::TooLarge);
        }
        result |= ((b & 0x7F) as u32) << shift;

        if (b & 0x80) == 0 {
            break;
        }

        shift += 7;
        if shift > 28 {
            // Overflow protection
            return failure(remaining, ErrorKind::TooLarge);
        }
    }

    Ok((remaining, result))
}

/// Parse a compact length prefix: `0` is null, `n + 1` is length `n`.
pub fn parse_compact_len(s: NomBytes) -> IResult<NomBytes, Option<usize>> {
    let (s, length) = parse_unsigned_varint(s)?;
    if length == 0 {
        return Ok((s, None));
    }
    Ok((s, Some((length - 1) as usize)))
}

/// Parse a compact array count, bounded by [`MAX_PROTOCOL_ARRAY_SIZE`].
pub fn parse_compact_array_len(s: NomBytes) -> IResult<NomBytes, Option<usize>> {
    let (s, length) = parse_compact_len(s)?;
    match length {
        Some(n) if n > MAX_PROTOCOL_ARRAY_SIZE as usize => failure(s, ErrorKind::TooLarge),
        other => Ok((s, other)),
    }
}

/// Parse a COMPACT_NULLABLE_STRING used in flexible encoding.
/// Format: unsigned varint length where:
/// - 0 = null
/// - 1 = empty string ""
/// - n+1 = string of length n
pub fn parse_compact_nullable_string(s: NomBytes) -> IResult<NomBytes, Option<Bytes>> {
    let (s, length) = parse_compact_len(s)?;

    match length {
        None => Ok((s, None)),
        Some(0) => Ok((s, Some(Bytes::new()))),
        Some(n) => {
            let (s, string) = take(n)(s)?;
            Ok((s, Some(string.into_bytes())))
        }
    }
}

/// Read a tagged field section.
/// Format: unsigned varint count, then for each: varint tag, varint size, bytes
pub fn parse_tagged_fields(s: NomBytes) -> IResult<NomBytes, Vec<TaggedField>> {
    let (mut s, count) = parse_unsigned_varint(s)?;
    if count > MAX_TAGGED_FIELDS {
        return failure(s, ErrorKind::TooLarge);
    }

    let mut fields: Vec<TaggedField> = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (remaining, tag) = parse_unsigned_varint(s)?;
        // Tags must be strictly ascending, which also rules out duplicates.
        if fields.last().is_some_and(|last| tag <= last.tag) {
            return failure(remaining, ErrorKind::Verify);
        }
        let (remaining, size) = parse_unsigned_varint(remaining)?;
        let (remaining, data) = take(size as usize)(remaining)?;
        fields.push(TaggedField {
            tag,
            data: data.into_bytes(),
        });
        s = remaining;
    }

    Ok((s, fields))
}

/// Skip tagged fields in flexible encoding.
pub fn skip_tagged_fields(s: NomBytes) -> IResult<NomBytes, ()> {
    let (s, _) = parse_tagged_fields(s)?;
    Ok((s, ()))
}
