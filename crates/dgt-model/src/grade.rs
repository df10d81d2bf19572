//! Grading outcome types: status, machine-readable reason codes, and the
//! immutable graded device.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::field::Field;
use crate::record::HealthRecord;

/// Final classification of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeStatus {
    Pass,
    Fail,
    /// Pass with advisory flags. The classifier emits `Pass` and carries the
    /// flag codes separately; this variant exists for rendering the combined
    /// single-column status in reports.
    Flagged,
    Error,
}

impl GradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradeStatus::Pass => "pass",
            GradeStatus::Fail => "fail",
            GradeStatus::Flagged => "flagged",
            GradeStatus::Error => "error",
        }
    }
}

impl fmt::Display for GradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Machine-readable reason code attached to a verdict.
///
/// Rule codes and error codes share one namespace so a report cell is always
/// a list of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    // Fail-kind rules
    FailedSelftestHistory,
    PendingSectorsHigh,
    ReallocatedHigh,
    PercentUsedExceeded,
    SpareLow,
    MediaErrorsHigh,
    CriticalTempTime,
    // Flag-kind rules
    HeavyUse,
    TempWarningHistory,
    // Error reasons
    DataReadError,
    IdentityUnresolved,
    InsufficientData,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::FailedSelftestHistory => "FAILED_SELFTEST_HISTORY",
            ReasonCode::PendingSectorsHigh => "PENDING_SECTORS_HIGH",
            ReasonCode::ReallocatedHigh => "REALLOCATED_HIGH",
            ReasonCode::PercentUsedExceeded => "PERCENT_USED_EXCEEDED",
            ReasonCode::SpareLow => "SPARE_LOW",
            ReasonCode::MediaErrorsHigh => "MEDIA_ERRORS_HIGH",
            ReasonCode::CriticalTempTime => "CRITICAL_TEMP_TIME",
            ReasonCode::HeavyUse => "HEAVY_USE",
            ReasonCode::TempWarningHistory => "TEMP_WARNING_HISTORY",
            ReasonCode::DataReadError => "DATA_READ_ERROR",
            ReasonCode::IdentityUnresolved => "IDENTITY_UNRESOLVED",
            ReasonCode::InsufficientData => "INSUFFICIENT_DATA",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReasonCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FAILED_SELFTEST_HISTORY" => Ok(ReasonCode::FailedSelftestHistory),
            "PENDING_SECTORS_HIGH" => Ok(ReasonCode::PendingSectorsHigh),
            "REALLOCATED_HIGH" => Ok(ReasonCode::ReallocatedHigh),
            "PERCENT_USED_EXCEEDED" => Ok(ReasonCode::PercentUsedExceeded),
            "SPARE_LOW" => Ok(ReasonCode::SpareLow),
            "MEDIA_ERRORS_HIGH" => Ok(ReasonCode::MediaErrorsHigh),
            "CRITICAL_TEMP_TIME" => Ok(ReasonCode::CriticalTempTime),
            "HEAVY_USE" => Ok(ReasonCode::HeavyUse),
            "TEMP_WARNING_HISTORY" => Ok(ReasonCode::TempWarningHistory),
            "DATA_READ_ERROR" => Ok(ReasonCode::DataReadError),
            "IDENTITY_UNRESOLVED" => Ok(ReasonCode::IdentityUnresolved),
            "INSUFFICIENT_DATA" => Ok(ReasonCode::InsufficientData),
            _ => Err(format!("unknown reason code: {s}")),
        }
    }
}

/// A rule that could not be evaluated because a required field was
/// unreadable. Carried on the graded device so reports can say which
/// criteria went unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientDataNote {
    pub rule: ReasonCode,
    pub missing: Vec<Field>,
}

/// One device, graded. Constructed exactly once per device by the
/// classifier; the record inside is no longer mutated after this point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedDevice {
    /// Discovery name (capture file stem or device node).
    pub device: String,
    /// The canonical record. `None` only for `Error`-status devices whose
    /// raw data could not be read or whose identity never resolved.
    pub record: Option<HealthRecord>,
    pub status: GradeStatus,
    /// Fail reasons in rule-table order, or the single error reason for
    /// `Error`-status devices.
    pub fail_reasons: Vec<ReasonCode>,
    /// Flag codes in rule-table order.
    pub flag_codes: Vec<ReasonCode>,
    /// Rules skipped for lack of readable data.
    pub insufficiency: Vec<InsufficientDataNote>,
}

impl GradedDevice {
    /// Status for single-column display: a passing device that carries
    /// flags shows as `flagged`.
    pub fn display_status(&self) -> GradeStatus {
        if self.status == GradeStatus::Pass && !self.flag_codes.is_empty() {
            GradeStatus::Flagged
        } else {
            self.status
        }
    }

    /// All reason and flag codes as one ordered, space-separated string for
    /// compact report cells. Empty for a clean pass.
    pub fn reason_summary(&self) -> String {
        let mut parts: Vec<&'static str> =
            self.fail_reasons.iter().map(ReasonCode::as_str).collect();
        parts.extend(self.flag_codes.iter().map(ReasonCode::as_str));
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::{GradeStatus, ReasonCode};
    use std::str::FromStr;

    #[test]
    fn reason_code_round_trips() {
        for code in [
            ReasonCode::FailedSelftestHistory,
            ReasonCode::SpareLow,
            ReasonCode::DataReadError,
            ReasonCode::InsufficientData,
        ] {
            assert_eq!(ReasonCode::from_str(code.as_str()).unwrap(), code);
        }
    }

    #[test]
    fn status_strings() {
        assert_eq!(GradeStatus::Pass.as_str(), "pass");
        assert_eq!(GradeStatus::Error.as_str(), "error");
    }
}
