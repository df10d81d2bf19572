//! The classifier: merges rule outputs into one final status.
//!
//! Precedence, highest first: Error (an applicable Fail-kind rule went
//! unevaluated for lack of readable data, so the verdict cannot be trusted)
//! > Fail > Pass. Flags never change the status; they ride along on a
//! Pass. Pure function of its inputs.

use dgt_model::{
    GradeStatus, GradedDevice, HealthRecord, InsufficientDataNote, ReasonCode,
};

use crate::engine::Evaluation;

/// Classifies one evaluated record into an immutable graded device.
pub fn classify(device: String, record: HealthRecord, evaluation: Evaluation) -> GradedDevice {
    let insufficiency: Vec<InsufficientDataNote> = evaluation
        .skipped
        .iter()
        .map(|skipped| InsufficientDataNote {
            rule: skipped.code,
            missing: skipped.missing.clone(),
        })
        .collect();

    let (status, fail_reasons) = if evaluation.insufficient_for_fail() {
        // Any reasons that did fire are kept, in table order, ahead of the
        // insufficiency marker.
        let mut reasons = evaluation.fail_reasons;
        reasons.push(ReasonCode::InsufficientData);
        (GradeStatus::Error, reasons)
    } else if !evaluation.fail_reasons.is_empty() {
        (GradeStatus::Fail, evaluation.fail_reasons)
    } else {
        (GradeStatus::Pass, Vec::new())
    };

    GradedDevice {
        device,
        record: Some(record),
        status,
        fail_reasons,
        flag_codes: evaluation.flag_reasons,
        insufficiency,
    }
}

/// Builds the Error-status result for a device whose raw data never made it
/// to normalization (adapter failure, timeout, unresolved identity).
pub fn error_device(device: String, reason: ReasonCode) -> GradedDevice {
    GradedDevice {
        device,
        record: None,
        status: GradeStatus::Error,
        fail_reasons: vec![reason],
        flag_codes: Vec::new(),
        insufficiency: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, error_device};
    use crate::engine::{Evaluation, SkippedRule};
    use crate::table::RuleKind;
    use dgt_model::{
        DeviceIdentity, Field, GradeStatus, HealthRecord, MediaClass, Protocol, ReasonCode,
    };

    fn record() -> HealthRecord {
        HealthRecord::new(
            DeviceIdentity {
                vendor: "TOSHIBA".to_string(),
                model: "MG07ACA14TE".to_string(),
                serial: "X0A0A00AF00A".to_string(),
                firmware: "0101".to_string(),
                capacity_bytes: 14_000_519_643_136,
                protocol: Protocol::Sata,
            },
            MediaClass::Hdd,
        )
    }

    #[test]
    fn fail_reasons_win() {
        let evaluation = Evaluation {
            fail_reasons: vec![ReasonCode::ReallocatedHigh],
            flag_reasons: vec![ReasonCode::HeavyUse],
            skipped: vec![],
        };
        let graded = classify("sda".to_string(), record(), evaluation);
        assert_eq!(graded.status, GradeStatus::Fail);
        assert_eq!(graded.fail_reasons, vec![ReasonCode::ReallocatedHigh]);
        assert_eq!(graded.flag_codes, vec![ReasonCode::HeavyUse]);
    }

    #[test]
    fn flags_alone_keep_pass_status() {
        let evaluation = Evaluation {
            fail_reasons: vec![],
            flag_reasons: vec![ReasonCode::HeavyUse],
            skipped: vec![],
        };
        let graded = classify("sda".to_string(), record(), evaluation);
        assert_eq!(graded.status, GradeStatus::Pass);
        assert!(!graded.flag_codes.is_empty());
        assert_eq!(graded.display_status(), GradeStatus::Flagged);
    }

    #[test]
    fn error_outranks_a_fired_fail_rule() {
        let evaluation = Evaluation {
            fail_reasons: vec![ReasonCode::ReallocatedHigh],
            flag_reasons: vec![],
            skipped: vec![SkippedRule {
                code: ReasonCode::PendingSectorsHigh,
                kind: RuleKind::Fail,
                missing: vec![Field::PendingSectors],
            }],
        };
        let graded = classify("sda".to_string(), record(), evaluation);
        assert_eq!(graded.status, GradeStatus::Error);
        assert_eq!(
            graded.fail_reasons,
            vec![ReasonCode::ReallocatedHigh, ReasonCode::InsufficientData]
        );
    }

    #[test]
    fn skipped_fail_rule_elevates_to_error() {
        let evaluation = Evaluation {
            fail_reasons: vec![],
            flag_reasons: vec![],
            skipped: vec![SkippedRule {
                code: ReasonCode::PendingSectorsHigh,
                kind: RuleKind::Fail,
                missing: vec![Field::PendingSectors],
            }],
        };
        let graded = classify("sda".to_string(), record(), evaluation);
        assert_eq!(graded.status, GradeStatus::Error);
        assert_eq!(graded.fail_reasons, vec![ReasonCode::InsufficientData]);
        assert_eq!(graded.insufficiency.len(), 1);
        assert_eq!(graded.insufficiency[0].rule, ReasonCode::PendingSectorsHigh);
    }

    #[test]
    fn skipped_flag_rule_does_not_elevate() {
        let evaluation = Evaluation {
            fail_reasons: vec![],
            flag_reasons: vec![],
            skipped: vec![SkippedRule {
                code: ReasonCode::HeavyUse,
                kind: RuleKind::Flag,
                missing: vec![Field::WorkloadRate],
            }],
        };
        let graded = classify("sda".to_string(), record(), evaluation);
        assert_eq!(graded.status, GradeStatus::Pass);
        assert_eq!(graded.insufficiency.len(), 1);
    }

    #[test]
    fn clean_record_passes() {
        let graded = classify("sda".to_string(), record(), Evaluation::default());
        assert_eq!(graded.status, GradeStatus::Pass);
        assert!(graded.fail_reasons.is_empty());
        assert!(graded.flag_codes.is_empty());
        assert_eq!(graded.reason_summary(), "");
    }

    #[test]
    fn error_device_has_no_record() {
        let graded = error_device("nvme0".to_string(), ReasonCode::DataReadError);
        assert_eq!(graded.status, GradeStatus::Error);
        assert!(graded.record.is_none());
        assert_eq!(graded.fail_reasons, vec![ReasonCode::DataReadError]);
    }
}
