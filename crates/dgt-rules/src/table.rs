//! The declarative rule table.
//!
//! Each row carries its own applicability predicate (protocol and/or media
//! class) so "what applies to what" is data, auditable in one place and in
//! the `rules` CLI listing. Evaluation order is declaration order and all
//! applicable rules run; there is no short-circuit.

use dgt_model::{Field, HealthRecord, MediaClass, Protocol, ReasonCode};

use crate::config::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Fail,
    Flag,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Fail => "fail",
            RuleKind::Flag => "flag",
        }
    }
}

/// Which devices a rule examines.
#[derive(Debug, Clone, Copy)]
pub struct Applicability {
    /// `None` means every protocol.
    pub protocols: Option<&'static [Protocol]>,
    /// `None` means both media classes.
    pub class: Option<MediaClass>,
}

impl Applicability {
    pub fn matches(&self, record: &HealthRecord) -> bool {
        if let Some(protocols) = self.protocols {
            if !protocols.contains(&record.identity.protocol) {
                return false;
            }
        }
        if let Some(class) = self.class {
            if class != record.media_class {
                return false;
            }
        }
        true
    }

    /// Short description for the rule listing ("hdd", "nvme", "all", ...).
    pub fn describe(&self) -> String {
        match (self.protocols, self.class) {
            (None, None) => "all".to_string(),
            (None, Some(class)) => class.as_str().to_string(),
            (Some(protocols), class) => {
                let names: Vec<&str> = protocols.iter().map(Protocol::as_str).collect();
                match class {
                    Some(class) => format!("{} {}", names.join("/"), class.as_str()),
                    None => names.join("/"),
                }
            }
        }
    }
}

const ALL: Applicability = Applicability {
    protocols: None,
    class: None,
};
const HDD: Applicability = Applicability {
    protocols: None,
    class: Some(MediaClass::Hdd),
};
const SSD: Applicability = Applicability {
    protocols: None,
    class: Some(MediaClass::Ssd),
};
const NVME: Applicability = Applicability {
    protocols: Some(&[Protocol::Nvme]),
    class: None,
};

/// One exclusion rule. The condition only sees canonical/derived fields; a
/// `None` field value never fires a rule (unreadable fields are handled by
/// the engine before the condition runs).
pub struct Rule {
    pub code: ReasonCode,
    pub kind: RuleKind,
    pub applies: Applicability,
    /// Fields the condition needs; if any is unreadable the rule is skipped
    /// and recorded as an insufficient-data note.
    pub required: &'static [Field],
    pub condition: fn(&HealthRecord, &Thresholds) -> bool,
    /// Human-readable condition for the rule listing.
    pub summary: &'static str,
}

static RULE_TABLE: &[Rule] = &[
    Rule {
        code: ReasonCode::FailedSelftestHistory,
        kind: RuleKind::Fail,
        applies: ALL,
        required: &[Field::SelfTestHistory],
        condition: |record, _| record.has_failed_self_test(),
        summary: "any logged self-test outcome is failed",
    },
    Rule {
        code: ReasonCode::PendingSectorsHigh,
        kind: RuleKind::Fail,
        applies: HDD,
        required: &[Field::PendingSectors],
        condition: |record, t| record.pending_sectors.is_some_and(|v| v > t.pending_sectors),
        summary: "pending sector count > pending_sectors",
    },
    Rule {
        code: ReasonCode::ReallocatedHigh,
        kind: RuleKind::Fail,
        applies: HDD,
        required: &[Field::ReallocatedSectors],
        condition: |record, t| {
            record
                .reallocated_sectors
                .is_some_and(|v| v > t.reallocated_sectors)
        },
        summary: "reallocated sector count > reallocated_sectors",
    },
    Rule {
        code: ReasonCode::PercentUsedExceeded,
        kind: RuleKind::Fail,
        applies: SSD,
        required: &[Field::PercentageUsed],
        condition: |record, t| record.percentage_used.is_some_and(|v| v > t.percent_used),
        summary: "endurance percentage used > percent_used",
    },
    Rule {
        code: ReasonCode::SpareLow,
        kind: RuleKind::Fail,
        applies: SSD,
        required: &[Field::AvailableSpare],
        condition: |record, t| record.available_spare.is_some_and(|v| v <= t.available_spare),
        summary: "available spare <= available_spare",
    },
    Rule {
        code: ReasonCode::MediaErrorsHigh,
        kind: RuleKind::Fail,
        applies: NVME,
        required: &[Field::MediaErrors],
        condition: |record, t| record.media_errors.is_some_and(|v| v > t.media_errors),
        summary: "media and data integrity errors > media_errors",
    },
    Rule {
        code: ReasonCode::CriticalTempTime,
        kind: RuleKind::Fail,
        applies: NVME,
        required: &[Field::CriticalTempMinutes],
        condition: |record, t| {
            record
                .critical_temp_minutes
                .is_some_and(|v| v > t.critical_temp_minutes)
        },
        summary: "minutes at critical composite temperature > critical_temp_minutes",
    },
    Rule {
        code: ReasonCode::HeavyUse,
        kind: RuleKind::Flag,
        applies: HDD,
        required: &[Field::WorkloadRate],
        condition: |record, t| {
            record
                .workload_tb_per_year
                .is_some_and(|v| v > t.heavy_use_tb_per_year)
        },
        summary: "annualized workload (TB/year) > heavy_use_tb_per_year",
    },
    Rule {
        code: ReasonCode::TempWarningHistory,
        kind: RuleKind::Flag,
        applies: NVME,
        required: &[Field::WarningTempMinutes],
        condition: |record, t| {
            record
                .warning_temp_minutes
                .is_some_and(|v| v > t.warning_temp_minutes)
        },
        summary: "minutes at warning composite temperature > warning_temp_minutes",
    },
];

/// The rule table in evaluation order.
pub fn rule_table() -> &'static [Rule] {
    RULE_TABLE
}

#[cfg(test)]
mod tests {
    use super::{RuleKind, rule_table};
    use dgt_model::ReasonCode;

    #[test]
    fn table_order_matches_the_documented_rule_set() {
        let codes: Vec<ReasonCode> = rule_table().iter().map(|rule| rule.code).collect();
        assert_eq!(
            codes,
            vec![
                ReasonCode::FailedSelftestHistory,
                ReasonCode::PendingSectorsHigh,
                ReasonCode::ReallocatedHigh,
                ReasonCode::PercentUsedExceeded,
                ReasonCode::SpareLow,
                ReasonCode::MediaErrorsHigh,
                ReasonCode::CriticalTempTime,
                ReasonCode::HeavyUse,
                ReasonCode::TempWarningHistory,
            ]
        );
    }

    #[test]
    fn codes_are_unique() {
        let mut seen = std::collections::BTreeSet::new();
        for rule in rule_table() {
            assert!(seen.insert(rule.code.as_str()), "duplicate {}", rule.code);
        }
    }

    #[test]
    fn fail_rules_precede_flag_rules() {
        let first_flag = rule_table()
            .iter()
            .position(|rule| rule.kind == RuleKind::Flag)
            .unwrap();
        assert!(
            rule_table()[first_flag..]
                .iter()
                .all(|rule| rule.kind == RuleKind::Flag)
        );
    }

    #[test]
    fn applicability_descriptions() {
        let descriptions: Vec<String> = rule_table()
            .iter()
            .map(|rule| rule.applies.describe())
            .collect();
        assert_eq!(descriptions[0], "all");
        assert_eq!(descriptions[1], "hdd");
        assert_eq!(descriptions[5], "nvme");
    }
}
