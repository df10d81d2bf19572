//! Capture adapter: turns `smartctl -x -j` JSON captures into raw
//! attribute bags.
//!
//! A capture directory holds one JSON document per device, produced on the
//! collection host by `smartctl` (which already merges NVMe health-log and
//! SCSI log-page data into its JSON output). Keeping captures on disk means
//! grading needs neither root nor the diagnostic tools installed.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use dgt_model::Protocol;

use crate::DeviceAdapter;
use crate::bag::{RawAttributeBag, RawSelfTest, RawValue, keys};
use crate::discovery::DeviceHandle;
use crate::error::{AdapterError, Result};

const SRC_IDENTITY: &str = "smartctl identity";
const SRC_ATA_ATTRS: &str = "ata_smart_attributes";
const SRC_ATA_STATS: &str = "ata_device_statistics";
const SRC_ATA_SELF_TEST: &str = "ata_smart_self_test_log";
const SRC_NVME_HEALTH: &str = "nvme_smart_health_information_log";
const SRC_NVME_SELF_TEST: &str = "nvme_self_test_log";
const SRC_SCSI_LOGS: &str = "scsi log pages";

/// Adapter over a directory of smartctl JSON captures.
#[derive(Debug, Default, Clone)]
pub struct CaptureAdapter;

impl CaptureAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceAdapter for CaptureAdapter {
    fn fetch(&self, handle: &DeviceHandle) -> Result<RawAttributeBag> {
        let path = &handle.path;
        if !path.is_file() {
            return Err(AdapterError::CaptureNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| AdapterError::CaptureRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let json: Value =
            serde_json::from_str(&text).map_err(|e| AdapterError::CaptureParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        let bag = parse_capture(&json, path)?;
        debug!(
            device = %handle.name,
            protocol = %bag.protocol(),
            attributes = bag.len(),
            "capture parsed"
        );
        Ok(bag)
    }
}

/// Parses one smartctl JSON document into a bag.
pub fn parse_capture(json: &Value, path: &Path) -> Result<RawAttributeBag> {
    let device = json
        .get("device")
        .ok_or_else(|| AdapterError::MissingDeviceSection {
            path: path.to_path_buf(),
        })?;
    let protocol_text = device
        .get("protocol")
        .and_then(Value::as_str)
        .ok_or_else(|| AdapterError::MissingDeviceSection {
            path: path.to_path_buf(),
        })?;
    let protocol: Protocol =
        protocol_text
            .parse()
            .map_err(|_| AdapterError::UnknownProtocol {
                value: protocol_text.to_string(),
                path: path.to_path_buf(),
            })?;

    let mut bag = RawAttributeBag::new(protocol);
    collect_identity(json, &mut bag);
    match protocol {
        Protocol::Sata => {
            collect_ata_attributes(json, &mut bag);
            collect_ata_statistics(json, &mut bag);
            collect_ata_self_tests(json, &mut bag);
        }
        Protocol::Sas => collect_scsi(json, &mut bag),
        Protocol::Nvme => {
            collect_nvme_health(json, &mut bag);
            collect_nvme_self_tests(json, &mut bag);
        }
    }
    Ok(bag)
}

fn collect_identity(json: &Value, bag: &mut RawAttributeBag) {
    for (key, json_key) in [
        (keys::SERIAL_NUMBER, "serial_number"),
        (keys::MODEL_NAME, "model_name"),
        (keys::MODEL_FAMILY, "model_family"),
        (keys::VENDOR, "vendor"),
        (keys::FIRMWARE_VERSION, "firmware_version"),
    ] {
        if let Some(text) = json.get(json_key).and_then(Value::as_str) {
            bag.insert(key, RawValue::Text(text.to_string()), SRC_IDENTITY);
        }
    }
    if let Some(bytes) = json
        .pointer("/user_capacity/bytes")
        .and_then(value_as_u64)
    {
        bag.insert(keys::CAPACITY_BYTES, RawValue::Uint(bytes), SRC_IDENTITY);
    }
    if let Some(rate) = json.get("rotation_rate").and_then(value_as_u64) {
        bag.insert(keys::ROTATION_RATE, RawValue::Uint(rate), SRC_IDENTITY);
    }
    if let Some(hours) = json.pointer("/power_on_time/hours").and_then(value_as_u64) {
        bag.insert(keys::POWER_ON_HOURS, RawValue::Uint(hours), SRC_IDENTITY);
    }
    if let Some(count) = json.get("power_cycle_count").and_then(value_as_u64) {
        bag.insert(keys::POWER_CYCLE_COUNT, RawValue::Uint(count), SRC_IDENTITY);
    }
    if let Some(current) = json.pointer("/temperature/current").and_then(Value::as_i64) {
        bag.insert(keys::TEMPERATURE_CURRENT, RawValue::Int(current), SRC_IDENTITY);
    }
}

fn collect_ata_attributes(json: &Value, bag: &mut RawAttributeBag) {
    let Some(table) = json
        .pointer("/ata_smart_attributes/table")
        .and_then(Value::as_array)
    else {
        return;
    };
    // (attribute id, bag key, use normalized value instead of raw)
    const WANTED: &[(u64, &str, bool)] = &[
        (5, keys::ATA_REALLOCATED_RAW, false),
        (9, keys::ATA_POWER_ON_HOURS_RAW, false),
        (12, keys::ATA_POWER_CYCLES_RAW, false),
        (173, keys::ATA_AVAILABLE_RESERVED_VALUE, true),
        (190, keys::ATA_AIRFLOW_TEMP_RAW, false),
        (194, keys::ATA_TEMP_RAW, false),
        (197, keys::ATA_PENDING_RAW, false),
        (202, keys::ATA_PERCENT_LIFETIME_RAW, false),
        (231, keys::ATA_SSD_LIFE_LEFT_VALUE, true),
        (233, keys::ATA_WEAROUT_VALUE, true),
        (241, keys::ATA_LBAS_WRITTEN_RAW, false),
        (242, keys::ATA_LBAS_READ_RAW, false),
    ];
    for attr in table {
        let Some(id) = attr.get("id").and_then(value_as_u64) else {
            continue;
        };
        for (wanted_id, key, normalized) in WANTED {
            if id != *wanted_id {
                continue;
            }
            let value = if *normalized {
                attr.get("value").and_then(value_as_u64)
            } else {
                attr.pointer("/raw/value").and_then(value_as_u64)
            };
            if let Some(value) = value {
                bag.insert(key, RawValue::Uint(value), SRC_ATA_ATTRS);
            }
        }
    }
}

fn collect_ata_statistics(json: &Value, bag: &mut RawAttributeBag) {
    let Some(pages) = json
        .pointer("/ata_device_statistics/pages")
        .and_then(Value::as_array)
    else {
        return;
    };
    for page in pages {
        if page.get("name").and_then(Value::as_str) != Some("Temperature Statistics") {
            continue;
        }
        let Some(table) = page.get("table").and_then(Value::as_array) else {
            continue;
        };
        for row in table {
            let name = row.get("name").and_then(Value::as_str).unwrap_or("");
            let value = row.get("value").and_then(Value::as_i64);
            match (name, value) {
                ("Average Long Term Temperature", Some(v)) => {
                    bag.insert(keys::STATS_AVERAGE_LONG_TEMP, RawValue::Int(v), SRC_ATA_STATS);
                }
                ("Highest Temperature", Some(v)) => {
                    bag.insert(keys::STATS_HIGHEST_TEMP, RawValue::Int(v), SRC_ATA_STATS);
                }
                _ => {}
            }
        }
    }
}

fn collect_ata_self_tests(json: &Value, bag: &mut RawAttributeBag) {
    // Extended log wins over the standard one, same as smartctl's own output.
    let table = json
        .pointer("/ata_smart_self_test_log/extended/table")
        .or_else(|| json.pointer("/ata_smart_self_test_log/standard/table"))
        .and_then(Value::as_array);
    let Some(table) = table else {
        return;
    };
    let mut entries = Vec::new();
    for row in table {
        let status = row
            .pointer("/status/string")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        entries.push(RawSelfTest {
            status,
            status_value: row.pointer("/status/value").and_then(value_as_u64),
            lifetime_hours: row.get("lifetime_hours").and_then(value_as_u64),
        });
    }
    bag.insert(keys::SELF_TEST_LOG, RawValue::SelfTests(entries), SRC_ATA_SELF_TEST);
}

fn collect_nvme_health(json: &Value, bag: &mut RawAttributeBag) {
    let Some(log) = json.get("nvme_smart_health_information_log") else {
        return;
    };
    for (key, json_key) in [
        (keys::NVME_PERCENTAGE_USED, "percentage_used"),
        (keys::NVME_AVAILABLE_SPARE, "available_spare"),
        (keys::NVME_MEDIA_ERRORS, "media_errors"),
        (keys::NVME_DATA_UNITS_READ, "data_units_read"),
        (keys::NVME_DATA_UNITS_WRITTEN, "data_units_written"),
        (keys::NVME_POWER_ON_HOURS, "power_on_hours"),
        (keys::NVME_POWER_CYCLES, "power_cycles"),
        (keys::NVME_WARNING_TEMP_TIME, "warning_temp_time"),
        (keys::NVME_CRITICAL_COMP_TIME, "critical_comp_time"),
    ] {
        if let Some(value) = log.get(json_key).and_then(value_as_u64) {
            bag.insert(key, RawValue::Uint(value), SRC_NVME_HEALTH);
        }
    }
    // smartctl reports this one in degrees Celsius, unlike the raw log page.
    if let Some(temp) = log.get("temperature").and_then(Value::as_i64) {
        bag.insert(keys::NVME_TEMPERATURE, RawValue::Int(temp), SRC_NVME_HEALTH);
    }
}

fn collect_nvme_self_tests(json: &Value, bag: &mut RawAttributeBag) {
    let Some(table) = json
        .pointer("/nvme_self_test_log/table")
        .and_then(Value::as_array)
    else {
        return;
    };
    let mut entries = Vec::new();
    for row in table {
        let status = row
            .pointer("/self_test_result/string")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        entries.push(RawSelfTest {
            status,
            status_value: row.pointer("/self_test_result/value").and_then(value_as_u64),
            lifetime_hours: row.get("power_on_hours").and_then(value_as_u64),
        });
    }
    bag.insert(keys::SELF_TEST_LOG, RawValue::SelfTests(entries), SRC_NVME_SELF_TEST);
}

fn collect_scsi(json: &Value, bag: &mut RawAttributeBag) {
    if let Some(defects) = json.get("scsi_grown_defect_list").and_then(value_as_u64) {
        bag.insert(keys::SCSI_GROWN_DEFECTS, RawValue::Uint(defects), SRC_SCSI_LOGS);
    }
    if let Some(trip) = json.pointer("/temperature/drive_trip").and_then(Value::as_i64) {
        bag.insert(keys::SCSI_TEMP_TRIP, RawValue::Int(trip), SRC_SCSI_LOGS);
    }
    if let Some(used) = json
        .get("scsi_percentage_used_endurance_indicator")
        .and_then(value_as_u64)
    {
        bag.insert(keys::SCSI_PERCENT_USED, RawValue::Uint(used), SRC_SCSI_LOGS);
    }
    // The error counter log reports "gigabytes processed" as a decimal
    // string; published in bytes (1 GB = 10^9).
    for (key, direction) in [
        (keys::SCSI_READ_BYTES, "read"),
        (keys::SCSI_WRITE_BYTES, "write"),
    ] {
        let gigabytes = json
            .pointer(&format!("/scsi_error_counter_log/{direction}/gigabytes_processed"))
            .and_then(|v| match v {
                Value::String(s) => s.trim().parse::<f64>().ok(),
                other => other.as_f64(),
            });
        if let Some(gigabytes) = gigabytes {
            let bytes = (gigabytes * 1e9).round() as u64;
            bag.insert(key, RawValue::Uint(bytes), SRC_SCSI_LOGS);
        }
    }
    if let Some(table) = json.get("scsi_self_test_results").and_then(Value::as_array) {
        let mut entries = Vec::new();
        for row in table {
            let status = row
                .pointer("/result/string")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            entries.push(RawSelfTest {
                status,
                status_value: row.pointer("/result/value").and_then(value_as_u64),
                lifetime_hours: row.pointer("/power_on_time/hours").and_then(value_as_u64),
            });
        }
        bag.insert(keys::SELF_TEST_LOG, RawValue::SelfTests(entries), SRC_SCSI_LOGS);
    }
}

fn value_as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| *v >= 0.0 && v.fract() == 0.0).map(|v| v as u64))
}
