//! JSON rendition: a versioned payload carrying the full graded records.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use dgt_model::GradedDevice;

const REPORT_SCHEMA: &str = "dgt.device-grades";
const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct ReportPayload<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    device_count: usize,
    devices: &'a [GradedDevice],
}

pub fn write(devices: &[GradedDevice], path: &Path) -> Result<()> {
    let payload = ReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        device_count: devices.len(),
        devices,
    };
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
