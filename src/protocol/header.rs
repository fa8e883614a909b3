//! Request and response headers.
//!
//! The request header is the same for every API except for one detail:
//! flexible request versions (header v2) append a tagged-field section after
//! `client_id`. `client_id` itself always keeps the classic `i16` length
//! prefix, even in flexible versions.

use bytes::{BufMut, Bytes};
use nom::{
    IResult,
    number::complete::{be_i16, be_i32},
};
use nombytes::NomBytes;

use super::api_key::ApiKey;
use crate::encode::{ToByte, encode_empty_tagged_fields};
use crate::error::{Error, Result};
use crate::parser::{bytes_to_string_opt, parse_nullable_string, skip_tagged_fields};
use crate::types::CorrelationId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    pub api_key: ApiKey,
    pub api_version: i16,
    pub correlation_id: CorrelationId,
    pub client_id: Option<String>,
}

impl RequestHeader {
    /// Write the header. `flexible` is the flexibility of the request body at
    /// `api_version`.
    pub fn encode<W: BufMut>(&self, buffer: &mut W, flexible: bool) -> Result<()> {
        self.api_key.code().encode(buffer)?;
        self.api_version.encode(buffer)?;
        self.correlation_id.encode(buffer)?;
        self.client_id.as_deref().encode(buffer)?;
        if flexible {
            encode_empty_tagged_fields(buffer);
        }
        Ok(())
    }

    /// Split a request frame into its header and body.
    ///
    /// `is_flexible` decides, from the api key and version read off the
    /// wire, whether the header carries a tagged-field section.
    pub fn decode(
        frame: Bytes,
        is_flexible: impl FnOnce(ApiKey, i16) -> bool,
    ) -> Result<(RequestHeader, Bytes)> {
        let (body, header) = parse_request_header(NomBytes::new(frame), is_flexible)
            .map_err(|_| Error::Decoding("malformed request header".to_string()))?;
        Ok((header, body.into_bytes()))
    }
}

/// Parse a request header from bytes.
pub fn parse_request_header(
    s: NomBytes,
    is_flexible: impl FnOnce(ApiKey, i16) -> bool,
) -> IResult<NomBytes, RequestHeader> {
    let (s, api_key) = be_i16(s)?;
    let (s, api_version) = be_i16(s)?;
    let (s, correlation_id) = be_i32(s)?;
    let (s, client_id) = parse_nullable_string(s)?;

    let api_key = ApiKey::from(api_key);
    let s = if is_flexible(api_key, api_version) {
        let (s, _) = skip_tagged_fields(s)?;
        s
    } else {
        s
    };

    let client_id = bytes_to_string_opt(client_id)?;

    Ok((
        s,
        RequestHeader {
            api_key,
            api_version,
            correlation_id: CorrelationId(correlation_id),
            client_id,
        },
    ))
}

/// Response header for Kafka protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub correlation_id: CorrelationId,
}

impl ResponseHeader {
    /// Write the header. Flexible responses (header v1) carry a tagged-field
    /// section after the correlation id.
    pub fn encode<W: BufMut>(&self, buffer: &mut W, flexible: bool) -> Result<()> {
        self.correlation_id.encode(buffer)?;
        if flexible {
            encode_empty_tagged_fields(buffer);
        }
        Ok(())
    }

    /// Split a response frame into its header and body.
    pub fn decode(frame: Bytes, flexible: bool) -> Result<(ResponseHeader, Bytes)> {
        let (body, header) = parse_response_header(NomBytes::new(frame), flexible)
            .map_err(|_| Error::Decoding("truncated response header".to_string()))?;
        Ok((header, body.into_bytes()))
    }
}

pub fn parse_response_header(s: NomBytes, flexible: bool) -> IResult<NomBytes, ResponseHeader> {
    let (s, correlation_id) = be_i32(s)?;
    let s = if flexible {
        let (s, _) = skip_tagged_fields(s)?;
        s
    } else {
        s
    };
    Ok((
        s,
        ResponseHeader {
            correlation_id: CorrelationId(correlation_id),
        },
    ))
}
