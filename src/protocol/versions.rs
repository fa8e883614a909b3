//! API version information and negotiation.
//!
//! # Current Support Matrix
//!
//! | API | Min | Max | Flexible from |
//! |-----|-----|-----|---------------|
//! | DescribeAcls | 0 | 3 | 2 |
//! | CreateAcls | 0 | 3 | 2 |
//! | DeleteAcls | 0 | 3 | 2 |
//!
//! The version used on the wire is the highest version both sides support,
//! optionally lowered by a per-client cap.

use super::api_key::ApiKey;
use crate::error::{Error, Result};
use crate::types::VersionRange;

/// Supported API version range for a specific API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedVersion {
    /// The API key.
    pub api_key: ApiKey,
    /// Minimum supported version.
    pub min_version: i16,
    /// Maximum supported version.
    pub max_version: i16,
}

impl SupportedVersion {
    pub const fn new(api_key: ApiKey, min_version: i16, max_version: i16) -> Self {
        Self {
            api_key,
            min_version,
            max_version,
        }
    }

    pub const fn range(&self) -> VersionRange {
        VersionRange::new(self.min_version, self.max_version)
    }
}

/// APIs this crate can speak.
pub const SUPPORTED_VERSIONS: &[SupportedVersion] = &[
    SupportedVersion::new(ApiKey::DescribeAcls, 0, 3),
    SupportedVersion::new(ApiKey::CreateAcls, 0, 3),
    SupportedVersion::new(ApiKey::DeleteAcls, 0, 3),
];

/// Find the supported version info for a specific API key.
pub fn find_version(api_key: ApiKey) -> Option<&'static SupportedVersion> {
    SUPPORTED_VERSIONS.iter().find(|v| v.api_key == api_key)
}

/// Pick the version to use for `api_key`.
///
/// The result is `min(local.max, broker.max, cap)` as long as it is not below
/// the minimum of either side. A broker that does not list the api key, or
/// ranges that do not overlap, yield [`Error::UnsupportedVersion`].
pub fn negotiate(
    api_key: ApiKey,
    local: VersionRange,
    broker: &[SupportedVersion],
    cap: Option<i16>,
) -> Result<i16> {
    let unsupported = |version| Error::UnsupportedVersion { api_key, version };

    let remote = broker
        .iter()
        .find(|v| v.api_key == api_key)
        .ok_or(unsupported(local.max))?;

    let mut range = local
        .intersect(&remote.range())
        .ok_or(unsupported(local.max.min(remote.max_version)))?;

    if let Some(cap) = cap {
        if cap < range.min {
            return Err(unsupported(cap));
        }
        range.max = range.max.min(cap);
    }

    tracing::trace!(
        api_key = api_key.as_str(),
        version = range.max,
        broker_min = remote.min_version,
        broker_max = remote.max_version,
        "negotiated api version"
    );

    Ok(range.max)
}
