//! The canonical health record: one protocol-independent snapshot of a
//! device's diagnostic state.

use serde::{Deserialize, Serialize};

use crate::field::FieldCoverage;
use crate::protocol::{MediaClass, Protocol};
use crate::selftest::{SelfTestEntry, SelfTestOutcome};

/// Identity fields. Resolving these is the one hard requirement of
/// normalization; a device whose serial, protocol, or capacity cannot be
/// determined is not gradeable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub vendor: String,
    pub model: String,
    pub serial: String,
    pub firmware: String,
    pub capacity_bytes: u64,
    pub protocol: Protocol,
}

impl DeviceIdentity {
    /// Capacity in decimal gigabytes, the unit the reports use.
    pub fn capacity_gb(&self) -> u64 {
        self.capacity_bytes / 1_000_000_000
    }
}

/// Protocol-independent normalized snapshot of one device.
///
/// Built empty by the normalizer from one raw attribute bag, filled by the
/// normalizer and the derived-metrics pass, then consumed read-only by the
/// rule engine. `None` on a value field means the coverage sets say why:
/// either `not_applicable` for this protocol/class or `unreadable`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub identity: DeviceIdentity,
    pub media_class: MediaClass,

    // Wear indicators (class-conditional)
    pub reallocated_sectors: Option<u64>,
    pub pending_sectors: Option<u64>,
    pub percentage_used: Option<u64>,
    pub available_spare: Option<u64>,
    pub media_errors: Option<u64>,

    // Usage indicators
    pub power_on_hours: Option<u64>,
    pub host_bytes_read: Option<u64>,
    pub host_bytes_written: Option<u64>,
    pub power_cycle_count: Option<u64>,

    // Thermal indicators
    pub average_temperature_c: Option<i64>,
    pub maximum_temperature_c: Option<i64>,
    pub warning_temp_minutes: Option<u64>,
    pub critical_temp_minutes: Option<u64>,

    // History
    pub self_test_history: Vec<SelfTestEntry>,

    // Derived
    pub workload_tb_per_year: Option<f64>,
    pub power_on_readable: Option<String>,

    pub fields: FieldCoverage,
}

impl HealthRecord {
    pub fn new(identity: DeviceIdentity, media_class: MediaClass) -> Self {
        Self {
            identity,
            media_class,
            reallocated_sectors: None,
            pending_sectors: None,
            percentage_used: None,
            available_spare: None,
            media_errors: None,
            power_on_hours: None,
            host_bytes_read: None,
            host_bytes_written: None,
            power_cycle_count: None,
            average_temperature_c: None,
            maximum_temperature_c: None,
            warning_temp_minutes: None,
            critical_temp_minutes: None,
            self_test_history: Vec::new(),
            workload_tb_per_year: None,
            power_on_readable: None,
            fields: FieldCoverage::new(),
        }
    }

    pub fn has_failed_self_test(&self) -> bool {
        self.self_test_history.iter().any(SelfTestEntry::failed)
    }

    pub fn self_test_counts(&self) -> (usize, usize) {
        let failed = self
            .self_test_history
            .iter()
            .filter(|entry| entry.outcome == SelfTestOutcome::Failed)
            .count();
        (self.self_test_history.len(), failed)
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceIdentity, HealthRecord};
    use crate::protocol::{MediaClass, Protocol};
    use crate::selftest::{SelfTestEntry, SelfTestOutcome};

    fn record() -> HealthRecord {
        HealthRecord::new(
            DeviceIdentity {
                vendor: "INTEL".to_string(),
                model: "SSDPE2KX040T8".to_string(),
                serial: "PHLJ123400AB4P0DGN".to_string(),
                firmware: "VDV10131".to_string(),
                capacity_bytes: 4_000_787_030_016,
                protocol: Protocol::Nvme,
            },
            MediaClass::Ssd,
        )
    }

    #[test]
    fn capacity_gb_is_decimal() {
        assert_eq!(record().identity.capacity_gb(), 4000);
    }

    #[test]
    fn failed_self_test_detection() {
        let mut record = record();
        assert!(!record.has_failed_self_test());
        record.self_test_history.push(SelfTestEntry {
            lifetime_hours: Some(99),
            outcome: SelfTestOutcome::Passed,
            raw_status: "Completed without error".to_string(),
        });
        record.self_test_history.push(SelfTestEntry {
            lifetime_hours: Some(120),
            outcome: SelfTestOutcome::Failed,
            raw_status: "Completed: read failure".to_string(),
        });
        assert!(record.has_failed_self_test());
        assert_eq!(record.self_test_counts(), (2, 1));
    }
}
