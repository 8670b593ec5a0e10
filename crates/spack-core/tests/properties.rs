//! Property tests for core vocabulary: timestamp parsing and severity routing.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use spack_core::{parse_iso8601, Check, FindingCollector, Severity, SeverityPolicy, Timestamp};

proptest! {
    #[test]
    fn any_report_timestamp_is_valid_iso8601(secs in 0i64..4_102_444_800) {
        let dt = Utc.timestamp_opt(secs, 0).unwrap();
        let rendered = Timestamp::from_utc(dt).to_iso8601();
        prop_assert!(rendered.ends_with('Z'));
        prop_assert!(parse_iso8601(&rendered).is_ok());
        prop_assert_eq!(Timestamp::parse(&rendered).unwrap().to_iso8601(), rendered);
    }

    #[test]
    fn alphabetic_noise_never_parses(s in "[a-zA-Z ]{0,24}") {
        prop_assert!(parse_iso8601(&s).is_err());
    }

    #[test]
    fn collector_partitions_every_finding(indices in proptest::collection::vec(0usize..20, 0..40)) {
        let checks = Check::all();
        let policy = SeverityPolicy::default();
        let mut collector = FindingCollector::new(&policy);
        let mut expected_errors = 0usize;
        for i in &indices {
            let check = checks[*i % checks.len()];
            if check.default_severity() == Severity::Error {
                expected_errors += 1;
            }
            collector.record(check, check.as_str(), "");
        }
        let result = collector.finish(0);
        prop_assert_eq!(result.error_count(), expected_errors);
        prop_assert_eq!(result.error_count() + result.warning_count(), indices.len());
    }
}
