//! # spack-core — Foundational Types for Spatial Pack Validation
//!
//! This crate is the leaf of the `spack-*` workspace. It defines the
//! vocabulary every other crate speaks: rule identifiers, findings, the
//! severity policy that classifies them, and UTC timestamps.
//!
//! ## Key Design Principles
//!
//! 1. **The rule catalog is reference data.** [`RULE_CATALOG`] is a `const`
//!    table. Reporting reads it; control flow never does.
//!
//! 2. **Severity is a policy, not a branch.** Every individual check is a
//!    [`Check`] variant with a default [`Severity`]. A [`SeverityPolicy`]
//!    decides where a finding lands, so promoting a warning to an error is
//!    a table edit.
//!
//! 3. **UTC-only report timestamps.** [`Timestamp`] renders as
//!    `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `spack-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod finding;
pub mod rule;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use finding::{Check, Finding, FindingCollector, Severity, SeverityPolicy, ValidationResult};
pub use rule::{RuleEntry, RuleId, RULE_CATALOG};
pub use temporal::{parse_iso8601, IsoInstant, Timestamp};
