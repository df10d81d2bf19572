//! The raw attribute bag: what an adapter hands the normalizer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use dgt_model::Protocol;

/// Well-known bag keys shared between adapters and the normalizer's field
/// maps. Adapters publish under these names; nothing forces them to, but a
/// key the field maps never mention is simply ignored.
pub mod keys {
    // Identity (all protocols, smartctl top level)
    pub const SERIAL_NUMBER: &str = "serial_number";
    pub const MODEL_NAME: &str = "model_name";
    pub const MODEL_FAMILY: &str = "model_family";
    pub const VENDOR: &str = "vendor";
    pub const FIRMWARE_VERSION: &str = "firmware_version";
    pub const CAPACITY_BYTES: &str = "user_capacity_bytes";
    pub const ROTATION_RATE: &str = "rotation_rate";

    // Usage / thermal (smartctl top level)
    pub const POWER_ON_HOURS: &str = "power_on_time_hours";
    pub const POWER_CYCLE_COUNT: &str = "power_cycle_count";
    pub const TEMPERATURE_CURRENT: &str = "temperature_current";

    // ATA SMART attributes, raw or normalized column as noted
    pub const ATA_REALLOCATED_RAW: &str = "attr.5.raw";
    pub const ATA_POWER_ON_HOURS_RAW: &str = "attr.9.raw";
    pub const ATA_POWER_CYCLES_RAW: &str = "attr.12.raw";
    pub const ATA_AVAILABLE_RESERVED_VALUE: &str = "attr.173.value";
    pub const ATA_AIRFLOW_TEMP_RAW: &str = "attr.190.raw";
    pub const ATA_TEMP_RAW: &str = "attr.194.raw";
    pub const ATA_PENDING_RAW: &str = "attr.197.raw";
    pub const ATA_PERCENT_LIFETIME_RAW: &str = "attr.202.raw";
    pub const ATA_SSD_LIFE_LEFT_VALUE: &str = "attr.231.value";
    pub const ATA_WEAROUT_VALUE: &str = "attr.233.value";
    pub const ATA_LBAS_WRITTEN_RAW: &str = "attr.241.raw";
    pub const ATA_LBAS_READ_RAW: &str = "attr.242.raw";

    // ATA device statistics pages
    pub const STATS_AVERAGE_LONG_TEMP: &str = "stats.average_long_term_temperature";
    pub const STATS_HIGHEST_TEMP: &str = "stats.highest_temperature";

    // SCSI log pages
    pub const SCSI_GROWN_DEFECTS: &str = "scsi_grown_defect_list";
    pub const SCSI_READ_BYTES: &str = "scsi_read_bytes_processed";
    pub const SCSI_WRITE_BYTES: &str = "scsi_write_bytes_processed";
    pub const SCSI_TEMP_TRIP: &str = "scsi_temperature_drive_trip";
    pub const SCSI_PERCENT_USED: &str = "scsi_percentage_used_endurance_indicator";

    // NVMe SMART / Health Information log
    pub const NVME_PERCENTAGE_USED: &str = "nvme.percentage_used";
    pub const NVME_AVAILABLE_SPARE: &str = "nvme.available_spare";
    pub const NVME_MEDIA_ERRORS: &str = "nvme.media_errors";
    pub const NVME_DATA_UNITS_READ: &str = "nvme.data_units_read";
    pub const NVME_DATA_UNITS_WRITTEN: &str = "nvme.data_units_written";
    pub const NVME_POWER_ON_HOURS: &str = "nvme.power_on_hours";
    pub const NVME_POWER_CYCLES: &str = "nvme.power_cycles";
    pub const NVME_TEMPERATURE: &str = "nvme.temperature";
    pub const NVME_WARNING_TEMP_TIME: &str = "nvme.warning_temp_time";
    pub const NVME_CRITICAL_COMP_TIME: &str = "nvme.critical_comp_time";

    // Self-test history, all protocols
    pub const SELF_TEST_LOG: &str = "self_test_log";
}

/// One raw self-test log entry, outcome still in the device's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSelfTest {
    /// Outcome descriptor as reported ("Completed without error",
    /// "Completed: read failure", an NVMe result code rendered as text, ...).
    pub status: String,
    /// Numeric status value when the log reports one.
    pub status_value: Option<u64>,
    pub lifetime_hours: Option<u64>,
}

/// A raw attribute value. Adapters preserve source units; conversion is the
/// normalizer's job and happens exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RawValue {
    Uint(u64),
    Int(i64),
    Float(f64),
    Text(String),
    SelfTests(Vec<RawSelfTest>),
}

impl RawValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            RawValue::Uint(v) => Some(*v),
            RawValue::Int(v) => u64::try_from(*v).ok(),
            RawValue::Float(v) if *v >= 0.0 && v.fract() == 0.0 => Some(*v as u64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Uint(v) => i64::try_from(*v).ok(),
            RawValue::Int(v) => Some(*v),
            RawValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Uint(v) => Some(*v as f64),
            RawValue::Int(v) => Some(*v as f64),
            RawValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_self_tests(&self) -> Option<&[RawSelfTest]> {
        match self {
            RawValue::SelfTests(v) => Some(v),
            _ => None,
        }
    }
}

/// One attribute with its provenance: which command or log page it came
/// from. Provenance is carried for the detailed report and for debugging
/// vendor quirks; the grading path ignores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAttribute {
    pub value: RawValue,
    pub source: String,
}

/// Everything one adapter fetch produced for one device.
///
/// Ephemeral: owned by the normalizer for the duration of one normalization
/// pass and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAttributeBag {
    protocol: Protocol,
    attrs: BTreeMap<String, RawAttribute>,
}

impl RawAttributeBag {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            attrs: BTreeMap::new(),
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn insert(&mut self, key: &str, value: RawValue, source: &str) {
        self.attrs.insert(
            key.to_string(),
            RawAttribute {
                value,
                source: source.to_string(),
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.attrs.get(key).map(|attr| &attr.value)
    }

    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|attr| attr.source.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{RawAttributeBag, RawValue, keys};
    use dgt_model::Protocol;

    #[test]
    fn insert_and_read_back() {
        let mut bag = RawAttributeBag::new(Protocol::Sata);
        bag.insert(keys::SERIAL_NUMBER, RawValue::Text("WD-123".into()), "smartctl identity");
        bag.insert(keys::ATA_REALLOCATED_RAW, RawValue::Uint(12), "ata_smart_attributes");

        assert_eq!(bag.protocol(), Protocol::Sata);
        assert_eq!(
            bag.get(keys::SERIAL_NUMBER).and_then(RawValue::as_text),
            Some("WD-123")
        );
        assert_eq!(
            bag.get(keys::ATA_REALLOCATED_RAW).and_then(RawValue::as_u64),
            Some(12)
        );
        assert_eq!(bag.source_of(keys::ATA_REALLOCATED_RAW), Some("ata_smart_attributes"));
        assert!(!bag.contains(keys::NVME_MEDIA_ERRORS));
    }

    #[test]
    fn numeric_coercions() {
        assert_eq!(RawValue::Int(-4).as_u64(), None);
        assert_eq!(RawValue::Float(7.0).as_u64(), Some(7));
        assert_eq!(RawValue::Float(7.5).as_u64(), None);
        assert_eq!(RawValue::Uint(9).as_f64(), Some(9.0));
        assert_eq!(RawValue::Text("x".into()).as_u64(), None);
    }
}
