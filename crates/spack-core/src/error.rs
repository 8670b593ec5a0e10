//! # Error Types
//!
//! Errors raised while interpreting core vocabulary: parsing rule and
//! check identifiers from configuration, and parsing ISO-8601 literals.

use thiserror::Error;

/// Top-level error type for `spack-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A string did not name a known validation rule.
    #[error("unknown rule identifier: {0:?}")]
    UnknownRule(String),

    /// A string did not name a known check.
    #[error("unknown check {0:?} (run `spatialpack rules` for the list)")]
    UnknownCheck(String),

    /// A string did not name a severity level.
    #[error("unknown severity {0:?} (expected \"error\" or \"warning\")")]
    UnknownSeverity(String),

    /// A date/time literal could not be parsed.
    #[error("invalid ISO 8601 timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The literal as it appeared in the input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_check_display_mentions_rules_command() {
        let err = CoreError::UnknownCheck("bogus".to_string());
        let msg = err.to_string();
        assert!(msg.contains("bogus"));
        assert!(msg.contains("spatialpack rules"));
    }

    #[test]
    fn invalid_timestamp_display() {
        let err = CoreError::InvalidTimestamp {
            input: "not-a-date".to_string(),
            reason: "no matching format".to_string(),
        };
        assert!(err.to_string().contains("not-a-date"));
    }
}
