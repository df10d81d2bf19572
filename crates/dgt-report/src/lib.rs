//! Report renderers for graded device streams.
//!
//! Three renditions of the same ordered record stream: CSV for
//! spreadsheets/ERP import, JSON for machine consumers (carries the full
//! canonical records), XML for the legacy intake pipeline. Combined file
//! per batch, or one file per device.

mod csv_report;
mod json_report;
pub mod row;
mod xml_report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use dgt_model::GradedDevice;

pub use row::ReportRow;

/// Base name for combined report files.
const REPORT_STEM: &str = "device_grades";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
    Xml,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
            ReportFormat::Xml => "xml",
        }
    }
}

/// Writes one combined report for the batch. Returns the file path.
pub fn write_report(
    devices: &[GradedDevice],
    output_dir: &Path,
    format: ReportFormat,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create report directory {}", output_dir.display()))?;
    let path = output_dir.join(format!("{REPORT_STEM}.{}", format.extension()));
    render(devices, &path, format)?;
    Ok(path)
}

/// Writes one report file per device. Returns the file paths in device
/// order.
pub fn write_per_device_reports(
    devices: &[GradedDevice],
    output_dir: &Path,
    format: ReportFormat,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create report directory {}", output_dir.display()))?;
    let mut paths = Vec::with_capacity(devices.len());
    for device in devices {
        let stem = ReportRow::file_stem(device);
        let path = output_dir.join(format!("{stem}.{}", format.extension()));
        render(std::slice::from_ref(device), &path, format)?;
        paths.push(path);
    }
    Ok(paths)
}

fn render(devices: &[GradedDevice], path: &Path, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Csv => csv_report::write(devices, path),
        ReportFormat::Json => json_report::write(devices, path),
        ReportFormat::Xml => xml_report::write(devices, path),
    }
    .with_context(|| format!("write report {}", path.display()))
}
