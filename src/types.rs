//! Type-safe wrappers for Kafka protocol primitives.
//!
//! These newtypes provide type safety to prevent mixing up different
//! integer types that have the same underlying representation but
//! different semantic meanings.

use bytes::BufMut;
use std::fmt;

use crate::encode::ToByte;
use crate::error::Result;

/// A Kafka broker identifier.
///
/// Broker IDs are 32-bit signed integers that uniquely identify
/// brokers within a Kafka cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BrokerId(pub i32);

impl BrokerId {
    /// Invalid broker ID, used in metadata to indicate "no controller".
    pub const INVALID: Self = BrokerId(-1);

    /// Create a new broker ID from a raw value.
    #[inline]
    pub const fn new(value: i32) -> Self {
        BrokerId(value)
    }

    /// Get the raw i32 value.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Check if this is a valid (non-negative) broker ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl From<i32> for BrokerId {
    fn from(value: i32) -> Self {
        BrokerId(value)
    }
}

impl From<BrokerId> for i32 {
    fn from(id: BrokerId) -> Self {
        id.0
    }
}

impl fmt::Display for BrokerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Kafka request correlation ID.
///
/// Correlation IDs are 32-bit signed integers that clients use to
/// match responses to their corresponding requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CorrelationId(pub i32);

impl CorrelationId {
    /// Create a new correlation ID from a raw value.
    #[inline]
    pub const fn new(value: i32) -> Self {
        CorrelationId(value)
    }

    /// Get the raw i32 value.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for CorrelationId {
    fn from(value: i32) -> Self {
        CorrelationId(value)
    }
}

impl From<CorrelationId> for i32 {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToByte for CorrelationId {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        self.0.encode(buffer)
    }
}

/// An inclusive range of API versions.
///
/// Used both for schema field presence and for broker/client version
/// support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRange {
    pub min: i16,
    pub max: i16,
}

impl VersionRange {
    /// Create a new range. `min` must not exceed `max`.
    pub const fn new(min: i16, max: i16) -> Self {
        assert!(min <= max, "version range min must not exceed max");
        Self { min, max }
    }

    /// Check whether `version` falls inside the range.
    #[inline]
    pub const fn contains(&self, version: i16) -> bool {
        version >= self.min && version <= self.max
    }

    /// Intersection of two ranges, or `None` if they do not overlap.
    pub fn intersect(&self, other: &VersionRange) -> Option<VersionRange> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(VersionRange { min, max })
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}..=v{}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_id() {
        assert!(BrokerId::new(0).is_valid());
        assert!(!BrokerId::INVALID.is_valid());
        assert_eq!(i32::from(BrokerId::from(7)), 7);
        assert_eq!(format!("{}", BrokerId(3)), "3");
    }

    #[test]
    fn test_correlation_id_encode() {
        let mut buf = Vec::new();
        CorrelationId(42).encode(&mut buf).unwrap();
        assert_eq!(buf, vec![0x00, 0x00, 0x00, 0x2A]);
    }

    #[test]
    fn test_version_range_contains() {
        let range = VersionRange::new(1, 3);
        assert!(!range.contains(0));
        assert!(range.contains(1));
        assert!(range.contains(3));
        assert!(!range.contains(4));
    }

    #[test]
    fn test_version_range_intersect() {
        let a = VersionRange::new(0, 3);
        let b = VersionRange::new(2, 5);
        assert_eq!(a.intersect(&b), Some(VersionRange::new(2, 3)));

        let c = VersionRange::new(4, 5);
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_version_range_display() {
        assert_eq!(VersionRange::new(0, 3).to_string(), "v0..=v3");
    }
}
