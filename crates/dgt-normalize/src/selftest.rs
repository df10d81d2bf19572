//! Raw self-test descriptors to normalized outcomes.

use dgt_adapter::RawSelfTest;
use dgt_model::{SelfTestEntry, SelfTestOutcome};

/// Maps one raw self-test status onto the outcome enum.
///
/// Matching is on the descriptor text smartctl renders for all three
/// protocols. Failure wording is checked first because failed runs still
/// start with "Completed" ("Completed: read failure"). Anything
/// unrecognized maps to `Unknown` rather than being dropped.
pub fn normalize_outcome(raw: &RawSelfTest) -> SelfTestOutcome {
    let status = raw.status.to_lowercase();
    if status.contains("fail") || status.contains("fatal") {
        return SelfTestOutcome::Failed;
    }
    if status.contains("abort") || status.contains("interrupt") {
        return SelfTestOutcome::Aborted;
    }
    if status.contains("without error") || status == "passed" {
        return SelfTestOutcome::Passed;
    }
    SelfTestOutcome::Unknown
}

pub fn normalize_entries(raw: &[RawSelfTest]) -> Vec<SelfTestEntry> {
    raw.iter()
        .map(|entry| SelfTestEntry {
            lifetime_hours: entry.lifetime_hours,
            outcome: normalize_outcome(entry),
            raw_status: entry.status.clone(),
        })
        .collect()
}
