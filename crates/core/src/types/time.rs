//! Backend timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nanoseconds since the Unix epoch, as stamped by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create from raw nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Create from a UTC datetime. Saturates outside the representable range.
    #[must_use]
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_nanos_opt().unwrap_or(i64::MAX))
    }

    /// Raw nanoseconds.
    #[must_use]
    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    /// As a UTC datetime.
    #[must_use]
    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_datetime_roundtrip() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let ts = Timestamp::from_datetime(at);
        assert_eq!(ts.to_datetime(), at);
        assert!(Timestamp::from_nanos(1) < ts);
    }
}
