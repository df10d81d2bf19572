//! Rule evaluation over one canonical record.

use tracing::{debug, trace};

use dgt_model::{Field, HealthRecord, ReasonCode};

use crate::config::Thresholds;
use crate::table::{RuleKind, rule_table};

/// A rule that was applicable but could not be evaluated because one of its
/// required fields was unreadable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRule {
    pub code: ReasonCode,
    pub kind: RuleKind,
    pub missing: Vec<Field>,
}

/// Output of one evaluation pass, reason codes in rule-table order.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub fail_reasons: Vec<ReasonCode>,
    pub flag_reasons: Vec<ReasonCode>,
    pub skipped: Vec<SkippedRule>,
}

impl Evaluation {
    /// True when a Fail-kind rule whose applicability matched could not be
    /// evaluated; the classifier elevates such a device to `Error` rather
    /// than letting it pass silently.
    pub fn insufficient_for_fail(&self) -> bool {
        self.skipped
            .iter()
            .any(|skipped| skipped.kind == RuleKind::Fail)
    }
}

/// Evaluates every applicable rule against the record, in table order, with
/// no short-circuit, so every triggered condition is reported.
pub fn evaluate(record: &HealthRecord, thresholds: &Thresholds) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for rule in rule_table() {
        if !rule.applies.matches(record) {
            continue;
        }

        let missing: Vec<Field> = rule
            .required
            .iter()
            .copied()
            .filter(|field| record.fields.is_unreadable(*field))
            .collect();
        if !missing.is_empty() {
            trace!(
                serial = %record.identity.serial,
                rule = %rule.code,
                ?missing,
                "rule skipped, required field unreadable"
            );
            evaluation.skipped.push(SkippedRule {
                code: rule.code,
                kind: rule.kind,
                missing,
            });
            continue;
        }

        if (rule.condition)(record, thresholds) {
            match rule.kind {
                RuleKind::Fail => evaluation.fail_reasons.push(rule.code),
                RuleKind::Flag => evaluation.flag_reasons.push(rule.code),
            }
        }
    }

    debug!(
        serial = %record.identity.serial,
        fails = evaluation.fail_reasons.len(),
        flags = evaluation.flag_reasons.len(),
        skipped = evaluation.skipped.len(),
        "rules evaluated"
    );
    evaluation
}
