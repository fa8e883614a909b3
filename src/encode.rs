//! Serialize data into the bytecode protocol.
use bytes::BufMut;

use crate::constants::{COMPACT_NULL, NULL_LENGTH};
use crate::error::{Error, Result};
use crate::protocol::TaggedField;

pub trait ToByte {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()>;
}

impl<'a, T: ToByte + 'a + ?Sized> ToByte for &'a T {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        (*self).encode(buffer)
    }
}

impl ToByte for bool {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        buffer.put_i8(*self as i8);
        Ok(())
    }
}

impl ToByte for i8 {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        buffer.put_i8(*self);
        Ok(())
    }
}

impl ToByte for i16 {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        buffer.put_i16(*self);
        Ok(())
    }
}

impl ToByte for i32 {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        buffer.put_i32(*self);
        Ok(())
    }
}

impl ToByte for i64 {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        buffer.put_i64(*self);
        Ok(())
    }
}

impl ToByte for str {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        let length = i16::try_from(self.len()).map_err(|_| {
            Error::Encoding(format!(
                "string of {} bytes exceeds the i16 length prefix",
                self.len()
            ))
        })?;
        buffer.put_i16(length);
        buffer.put(self.as_bytes());
        Ok(())
    }
}

impl ToByte for String {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        self.as_str().encode(buffer)
    }
}

impl ToByte for Option<&str> {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        match *self {
            Some(xs) => xs.encode(buffer),
            None => NULL_LENGTH.encode(buffer), // NULLABLE_STRING uses i16 length prefix
        }
    }
}

impl ToByte for Option<String> {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.as_deref().encode(buffer)
    }
}

/// Renders the length of a classic protocol array (`i32` count, `-1` for
/// null).
pub fn encode_array_len<W: BufMut>(buffer: &mut W, len: Option<usize>) -> Result<()> {
    match len {
        Some(len) => {
            let len = i32::try_from(len)
                .map_err(|_| Error::Encoding(format!("array of {} items is too long", len)))?;
            buffer.put_i32(len);
        }
        None => buffer.put_i32(NULL_LENGTH as i32),
    }
    Ok(())
}

/// Encode an unsigned varint (variable-length integer) to the buffer.
/// Used by flexible encoding formats (KIP-482).
pub fn encode_unsigned_varint<W: BufMut>(buffer: &mut W, mut value: u32) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buffer.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

/// Length prefix of a compact string or array: `length + 1`, `0` for null.
fn compact_len(len: Option<usize>) -> Result<u32> {
    match len {
        Some(len) => u32::try_from(len)
            .ok()
            .and_then(|l| l.checked_add(1))
            .ok_or_else(|| Error::Encoding(format!("compact length {} overflows", len))),
        None => Ok(COMPACT_NULL),
    }
}

/// Renders the length of a compact array (used in flexible encoding).
pub fn encode_compact_array_len<W: BufMut>(buffer: &mut W, len: Option<usize>) -> Result<()> {
    encode_unsigned_varint(buffer, compact_len(len)?);
    Ok(())
}

/// Encode a COMPACT_(NULLABLE_)STRING.
pub fn encode_compact_string<W: BufMut>(buffer: &mut W, s: Option<&str>) -> Result<()> {
    encode_unsigned_varint(buffer, compact_len(s.map(str::len))?);
    if let Some(s) = s {
        buffer.put(s.as_bytes());
    }
    Ok(())
}

/// Encode empty tagged fields (used at end of flexible-format structs).
/// An empty tagged field section is just a single 0 byte (varint for 0 fields).
pub fn encode_empty_tagged_fields<W: BufMut>(buffer: &mut W) {
    buffer.put_u8(0);
}

/// Encode a tagged field section. Tags are written in ascending order.
pub fn encode_tagged_fields<W: BufMut>(buffer: &mut W, fields: &[TaggedField]) -> Result<()> {
    if fields.is_empty() {
        encode_empty_tagged_fields(buffer);
        return Ok(());
    }

    let mut sorted: Vec<&TaggedField> = fields.iter().collect();
    sorted.sort_by_key(|f| f.tag);
    if sorted.windows(2).any(|w| w[0].tag == w[1].tag) {
        return Err(Error::Encoding("duplicate tag in tagged fields".to_string()));
    }

    encode_unsigned_varint(buffer, sorted.len() as u32);
    for field in sorted {
        let size = u32::try_from(field.data.len())
            .map_err(|_| Error::Encoding(format!("tagged field {} is too large", field.tag)))?;
        encode_unsigned_varint(buffer, field.tag);
        encode_unsigned_varint(buffer, size);
        buffer.put_slice(&field.data);
    }
    Ok(())
}
