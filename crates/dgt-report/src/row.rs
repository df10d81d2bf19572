//! Flat report rows: one graded device rendered to display strings.
//!
//! All three file formats and the console table share this shape, so a
//! value formats the same way everywhere. Unpopulated fields render empty,
//! exactly like an attribute a drive never reported.

use dgt_model::{Field, GradedDevice, HealthRecord};

/// Column headers, in report order.
pub const COLUMNS: &[&str] = &[
    "SerialNumber",
    "Model",
    "Firmware",
    "Capacity(GB)",
    "Protocol",
    "Class",
    "Status",
    "Reasons",
    "POH_Readable",
    "POH_Hours",
    "ReallocatedSectors(HDD)",
    "PendingSectors(HDD)",
    "PercentUsed(SSD)",
    "AvailableSpare%(SSD)",
    "MediaErrors(NVMe)",
    "HostReads(GB)",
    "HostWrites(GB)",
    "AvgTemp",
    "MaxTemp",
    "WarningTempTime(min)",
    "CriticalTempTime(min)",
    "Workload(TB/yr)",
    "Notes",
];

/// XML element names matching [`COLUMNS`] one to one.
pub const XML_NAMES: &[&str] = &[
    "SerialNumber",
    "Model",
    "Firmware",
    "CapacityGb",
    "Protocol",
    "Class",
    "Status",
    "Reasons",
    "PowerOnReadable",
    "PowerOnHours",
    "ReallocatedSectors",
    "PendingSectors",
    "PercentUsed",
    "AvailableSpare",
    "MediaErrors",
    "HostReadsGb",
    "HostWritesGb",
    "AverageTemperature",
    "MaximumTemperature",
    "WarningTempMinutes",
    "CriticalTempMinutes",
    "WorkloadTbPerYear",
    "Notes",
];

#[derive(Debug, Clone)]
pub struct ReportRow {
    values: Vec<String>,
}

impl ReportRow {
    pub fn from_graded(graded: &GradedDevice) -> Self {
        let record = graded.record.as_ref();
        let identity = record.map(|r| &r.identity);
        let values = vec![
            identity.map(|i| i.serial.clone()).unwrap_or_else(|| graded.device.clone()),
            identity.map(|i| i.model.clone()).unwrap_or_default(),
            identity.map(|i| i.firmware.clone()).unwrap_or_default(),
            identity.map(|i| i.capacity_gb().to_string()).unwrap_or_default(),
            identity.map(|i| i.protocol.to_string()).unwrap_or_default(),
            record.map(|r| r.media_class.to_string()).unwrap_or_default(),
            graded.display_status().to_string(),
            graded.reason_summary(),
            record.and_then(|r| r.power_on_readable.clone()).unwrap_or_default(),
            opt_u64(record.and_then(|r| r.power_on_hours)),
            opt_u64(record.and_then(|r| r.reallocated_sectors)),
            opt_u64(record.and_then(|r| r.pending_sectors)),
            opt_u64(record.and_then(|r| r.percentage_used)),
            opt_u64(record.and_then(|r| r.available_spare)),
            opt_u64(record.and_then(|r| r.media_errors)),
            opt_gb(record.and_then(|r| r.host_bytes_read)),
            opt_gb(record.and_then(|r| r.host_bytes_written)),
            opt_i64(record.and_then(|r| r.average_temperature_c)),
            opt_i64(record.and_then(|r| r.maximum_temperature_c)),
            opt_u64(record.and_then(|r| r.warning_temp_minutes)),
            opt_u64(record.and_then(|r| r.critical_temp_minutes)),
            record
                .and_then(|r| r.workload_tb_per_year)
                .map(|rate| format!("{rate:.1}"))
                .unwrap_or_default(),
            notes(graded, record),
        ];
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Stem for per-device report files: `<model>-<serial>`, filesystem-safe.
    pub fn file_stem(graded: &GradedDevice) -> String {
        match graded.record.as_ref() {
            Some(record) => sanitize(&format!(
                "{}-{}",
                record.identity.model, record.identity.serial
            )),
            None => sanitize(&graded.device),
        }
    }
}

fn opt_u64(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_i64(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Bytes as decimal gigabytes with one decimal place.
fn opt_gb(value: Option<u64>) -> String {
    value
        .map(|bytes| format!("{:.1}", bytes as f64 / 1e9))
        .unwrap_or_default()
}

/// Skipped rules and unreadable fields, compact enough for one cell.
fn notes(graded: &GradedDevice, record: Option<&HealthRecord>) -> String {
    let mut parts: Vec<String> = graded
        .insufficiency
        .iter()
        .map(|note| {
            let missing: Vec<&str> = note.missing.iter().map(Field::as_str).collect();
            format!("{} unchecked ({})", note.rule, missing.join(","))
        })
        .collect();
    if let Some(record) = record {
        let unreadable: Vec<&str> = record.fields.unreadable().map(|f| f.as_str()).collect();
        if !unreadable.is_empty() {
            parts.push(format!("unreadable: {}", unreadable.join(",")));
        }
    }
    parts.join("; ")
}

fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    out
}
