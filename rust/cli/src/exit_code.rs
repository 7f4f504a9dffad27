//! Process exit codes of `potledger`.
//!
//! Anomalies found in a hand history (unknown lines, missed hands, sum
//! mismatches) are part of a successful report and exit with [`SUCCESS`].

pub const SUCCESS: i32 = 0;

/// Usage, input, configuration or parse failure.
pub const ERROR: i32 = 2;
