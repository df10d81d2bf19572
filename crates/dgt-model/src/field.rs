//! Canonical field registry and per-record coverage tracking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Canonical health-record fields addressable by the normalizer, the rule
/// table, and the reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ReallocatedSectors,
    PendingSectors,
    PercentageUsed,
    AvailableSpare,
    MediaErrors,
    PowerOnHours,
    HostBytesRead,
    HostBytesWritten,
    PowerCycleCount,
    AverageTemperature,
    MaximumTemperature,
    WarningTempMinutes,
    CriticalTempMinutes,
    SelfTestHistory,
    MediaClassDetection,
    WorkloadRate,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ReallocatedSectors => "reallocated_sectors",
            Field::PendingSectors => "pending_sectors",
            Field::PercentageUsed => "percentage_used",
            Field::AvailableSpare => "available_spare",
            Field::MediaErrors => "media_errors",
            Field::PowerOnHours => "power_on_hours",
            Field::HostBytesRead => "host_bytes_read",
            Field::HostBytesWritten => "host_bytes_written",
            Field::PowerCycleCount => "power_cycle_count",
            Field::AverageTemperature => "average_temperature",
            Field::MaximumTemperature => "maximum_temperature",
            Field::WarningTempMinutes => "warning_temp_minutes",
            Field::CriticalTempMinutes => "critical_temp_minutes",
            Field::SelfTestHistory => "self_test_history",
            Field::MediaClassDetection => "media_class",
            Field::WorkloadRate => "workload_rate",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which canonical fields were populated, which are inherently absent for
/// the record's protocol/class, and which were attempted but failed to read.
///
/// A field is in at most one of the three sets; the marking methods move a
/// field between sets so the last observation wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCoverage {
    applied: BTreeSet<Field>,
    not_applicable: BTreeSet<Field>,
    unreadable: BTreeSet<Field>,
}

impl FieldCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field was resolved from raw data and populated.
    pub fn mark_applied(&mut self, field: Field) {
        self.not_applicable.remove(&field);
        self.unreadable.remove(&field);
        self.applied.insert(field);
    }

    /// Field has no meaning for this protocol/class combination.
    pub fn mark_not_applicable(&mut self, field: Field) {
        self.applied.remove(&field);
        self.unreadable.remove(&field);
        self.not_applicable.insert(field);
    }

    /// Field is defined for this device but could not be resolved.
    pub fn mark_unreadable(&mut self, field: Field) {
        self.applied.remove(&field);
        self.not_applicable.remove(&field);
        self.unreadable.insert(field);
    }

    pub fn is_applied(&self, field: Field) -> bool {
        self.applied.contains(&field)
    }

    pub fn is_not_applicable(&self, field: Field) -> bool {
        self.not_applicable.contains(&field)
    }

    pub fn is_unreadable(&self, field: Field) -> bool {
        self.unreadable.contains(&field)
    }

    pub fn applied(&self) -> impl Iterator<Item = Field> + '_ {
        self.applied.iter().copied()
    }

    pub fn not_applicable(&self) -> impl Iterator<Item = Field> + '_ {
        self.not_applicable.iter().copied()
    }

    pub fn unreadable(&self) -> impl Iterator<Item = Field> + '_ {
        self.unreadable.iter().copied()
    }
}
