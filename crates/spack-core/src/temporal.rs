//! # Temporal Types
//!
//! Two concerns live here:
//!
//! - [`Timestamp`], the UTC-only instant stamped on conformance reports.
//!   It always renders as `YYYY-MM-DDTHH:MM:SSZ`.
//! - [`parse_iso8601`], the lenient reader for manifest `created_at`
//!   values. It accepts calendar dates, date-times with a `T` or space
//!   separator, optional seconds and fractions, and an optional UTC
//!   offset. A trailing `Z` is read as `+00:00`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string with a `Z` suffix.
    ///
    /// # Errors
    ///
    /// Rejects anything that is not RFC 3339 or carries an explicit offset.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::InvalidTimestamp {
                input: s.to_string(),
                reason: "report timestamps must use the Z suffix".to_string(),
            });
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| CoreError::InvalidTimestamp {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO 8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// A successfully parsed ISO 8601 literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsoInstant {
    /// Date-time with an explicit offset.
    Zoned(DateTime<FixedOffset>),
    /// Date-time without an offset.
    Local(NaiveDateTime),
    /// Calendar date only.
    Date(NaiveDate),
}

const ZONED_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a manifest timestamp as ISO 8601.
///
/// # Errors
///
/// Returns [`CoreError::InvalidTimestamp`] when no accepted form matches.
pub fn parse_iso8601(input: &str) -> Result<IsoInstant, CoreError> {
    let normalized = match input.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => input.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(IsoInstant::Zoned(dt));
    }
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Ok(IsoInstant::Zoned(dt));
        }
    }
    for fmt in LOCAL_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Ok(IsoInstant::Local(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return Ok(IsoInstant::Date(date));
    }

    Err(CoreError::InvalidTimestamp {
        input: input.to_string(),
        reason: "not a recognised ISO 8601 date or date-time".to_string(),
    })
}
