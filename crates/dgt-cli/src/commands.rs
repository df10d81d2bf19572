use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span};

use dgt_adapter::{CaptureAdapter, DeviceAdapter, discover_captures};
use dgt_batch::{BatchOptions, CancelToken, run_batch_with};
use dgt_model::{Protocol, ReasonCode};
use dgt_report::ReportFormat;
use dgt_rules::{Thresholds, rule_table};

use crate::cli::{GradeArgs, ReportFormatArg, RulesArgs};
use crate::summary::apply_table_style;
use crate::types::GradeOutcome;

pub fn run_grade(args: &GradeArgs) -> Result<GradeOutcome> {
    let grade_span = info_span!("grade", capture_dir = %args.capture_dir.display());
    let _guard = grade_span.enter();

    let thresholds = build_thresholds(args)?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.capture_dir.join("reports"));

    // =========================================================================
    // Stage 1: Discover captures
    // =========================================================================
    let ignored = ignored_protocols(args);
    let handles = discover_captures(&args.capture_dir, &ignored)
        .with_context(|| format!("scan capture directory {}", args.capture_dir.display()))?;
    if handles.is_empty() {
        bail!(
            "no device captures found in {} (expected one smartctl JSON file per device)",
            args.capture_dir.display()
        );
    }
    info!(devices = handles.len(), "captures discovered");

    // =========================================================================
    // Stage 2: Grade, bounded-parallel, discovery order preserved
    // =========================================================================
    let adapter: Arc<dyn DeviceAdapter> = Arc::new(CaptureAdapter::new());
    let options = BatchOptions {
        workers: args.workers,
        device_timeout: Duration::from_secs(args.device_timeout_secs),
    };
    let bar = ProgressBar::new(handles.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/dim} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let grade_start = Instant::now();
    let batch = run_batch_with(
        &adapter,
        &handles,
        &thresholds,
        &options,
        &CancelToken::new(),
        |progress| {
            bar.set_message(format!("{} [{}]", progress.device, progress.status));
            bar.inc(1);
        },
    );
    bar.finish_and_clear();
    info!(
        devices = batch.len(),
        duration_ms = grade_start.elapsed().as_millis(),
        "grading complete"
    );

    // =========================================================================
    // Stage 3: Reports
    // =========================================================================
    let mut report_paths = Vec::new();
    if !args.dry_run {
        for format in report_formats(args.format) {
            if args.per_device {
                let paths =
                    dgt_report::write_per_device_reports(batch.devices(), &output_dir, format)?;
                report_paths.extend(paths);
            } else {
                report_paths.push(dgt_report::write_report(batch.devices(), &output_dir, format)?);
            }
        }
    }

    Ok(GradeOutcome {
        batch,
        output_dir,
        report_paths,
        dry_run: args.dry_run,
    })
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let thresholds = match &args.config {
        Some(path) => Thresholds::load(path).context("load rule thresholds")?,
        None => Thresholds::default(),
    };

    let mut table = Table::new();
    table.set_header(vec!["Code", "Applies to", "Condition", "Kind", "Threshold"]);
    apply_table_style(&mut table);
    for rule in rule_table() {
        table.add_row(vec![
            rule.code.as_str().to_string(),
            rule.applies.describe(),
            rule.summary.to_string(),
            rule.kind.as_str().to_string(),
            threshold_value(rule.code, &thresholds),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn build_thresholds(args: &GradeArgs) -> Result<Thresholds> {
    let mut thresholds = match &args.config {
        Some(path) => Thresholds::load(path).context("load rule thresholds")?,
        None => Thresholds::default(),
    };
    if let Some(value) = args.media_error_threshold {
        thresholds.media_errors = value;
    }
    if let Some(value) = args.critical_temp_minutes {
        thresholds.critical_temp_minutes = value;
    }
    if let Some(value) = args.warning_temp_minutes {
        thresholds.warning_temp_minutes = value;
    }
    if let Some(value) = args.heavy_use_tb_per_year {
        thresholds.heavy_use_tb_per_year = value;
    }
    thresholds.validate().context("validate rule thresholds")?;
    Ok(thresholds)
}

fn ignored_protocols(args: &GradeArgs) -> Vec<Protocol> {
    let mut ignored = Vec::new();
    if args.ignore_sata {
        ignored.push(Protocol::Sata);
    }
    if args.ignore_sas {
        ignored.push(Protocol::Sas);
    }
    if args.ignore_nvme {
        ignored.push(Protocol::Nvme);
    }
    ignored
}

fn report_formats(arg: ReportFormatArg) -> Vec<ReportFormat> {
    match arg {
        ReportFormatArg::Csv => vec![ReportFormat::Csv],
        ReportFormatArg::Json => vec![ReportFormat::Json],
        ReportFormatArg::Xml => vec![ReportFormat::Xml],
        ReportFormatArg::All => vec![ReportFormat::Csv, ReportFormat::Json, ReportFormat::Xml],
    }
}

/// The configured value backing each rule, for the rule listing.
fn threshold_value(code: ReasonCode, thresholds: &Thresholds) -> String {
    match code {
        ReasonCode::FailedSelftestHistory => "-".to_string(),
        ReasonCode::PendingSectorsHigh => thresholds.pending_sectors.to_string(),
        ReasonCode::ReallocatedHigh => thresholds.reallocated_sectors.to_string(),
        ReasonCode::PercentUsedExceeded => thresholds.percent_used.to_string(),
        ReasonCode::SpareLow => thresholds.available_spare.to_string(),
        ReasonCode::MediaErrorsHigh => thresholds.media_errors.to_string(),
        ReasonCode::CriticalTempTime => thresholds.critical_temp_minutes.to_string(),
        ReasonCode::HeavyUse => format!("{:.0}", thresholds.heavy_use_tb_per_year),
        ReasonCode::TempWarningHistory => thresholds.warning_temp_minutes.to_string(),
        _ => "-".to_string(),
    }
}
