//! Normalized self-test history entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one previously executed device self-test.
///
/// Raw outcome descriptors vary per protocol and firmware; anything the
/// normalizer does not recognize maps to `Unknown` and is kept rather than
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfTestOutcome {
    Passed,
    Failed,
    Aborted,
    Unknown,
}

impl SelfTestOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelfTestOutcome::Passed => "passed",
            SelfTestOutcome::Failed => "failed",
            SelfTestOutcome::Aborted => "aborted",
            SelfTestOutcome::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SelfTestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the device's self-test log, most recent first as reported
/// by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfTestEntry {
    /// Power-on hours at which the test ran, when the log reports it.
    pub lifetime_hours: Option<u64>,
    pub outcome: SelfTestOutcome,
    /// Raw descriptor as reported, kept for the detailed report.
    pub raw_status: String,
}

impl SelfTestEntry {
    pub fn failed(&self) -> bool {
        self.outcome == SelfTestOutcome::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::{SelfTestEntry, SelfTestOutcome};

    #[test]
    fn failed_predicate() {
        let entry = SelfTestEntry {
            lifetime_hours: Some(1200),
            outcome: SelfTestOutcome::Failed,
            raw_status: "Completed: read failure".to_string(),
        };
        assert!(entry.failed());

        let entry = SelfTestEntry {
            lifetime_hours: None,
            outcome: SelfTestOutcome::Unknown,
            raw_status: "Vendor specific".to_string(),
        };
        assert!(!entry.failed());
    }
}
