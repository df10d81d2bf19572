//! CLI argument definitions for the drive grader.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "drive-grader",
    version,
    about = "Grade storage devices for reuse from captured diagnostics",
    long_about = "Grade storage devices at end-of-life/resale decision points.\n\n\
                  Reads smartctl JSON captures (one file per device), normalizes\n\
                  SATA/SAS/NVMe attributes into one canonical record, evaluates the\n\
                  exclusion rule table, and writes CSV/JSON/XML reports."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Grade a directory of device captures and write reports.
    Grade(GradeArgs),

    /// Print the exclusion rule table.
    Rules(RulesArgs),
}

#[derive(Parser)]
pub struct GradeArgs {
    /// Directory of smartctl JSON captures, one file per device.
    #[arg(value_name = "CAPTURE_DIR")]
    pub capture_dir: PathBuf,

    /// Output directory for reports (default: <CAPTURE_DIR>/reports).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Report format to generate.
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: ReportFormatArg,

    /// Write one report file per device instead of a combined file.
    #[arg(long = "per-device")]
    pub per_device: bool,

    /// Grade and print the summary without writing report files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// JSON file with rule thresholds; absent keys keep their defaults.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip SATA devices.
    #[arg(long = "ignore-sata")]
    pub ignore_sata: bool,

    /// Skip SAS devices.
    #[arg(long = "ignore-sas")]
    pub ignore_sas: bool,

    /// Skip NVMe devices.
    #[arg(long = "ignore-nvme")]
    pub ignore_nvme: bool,

    /// Worker threads for the batch (0 = size from host parallelism).
    #[arg(long = "workers", default_value_t = 0)]
    pub workers: usize,

    /// Per-device adapter timeout in seconds.
    #[arg(long = "device-timeout-secs", default_value_t = 30)]
    pub device_timeout_secs: u64,

    /// Override the NVMe media error fail threshold.
    #[arg(long = "media-error-threshold", value_name = "N")]
    pub media_error_threshold: Option<u64>,

    /// Override the NVMe critical composite-temperature minutes fail threshold.
    #[arg(long = "critical-temp-minutes", value_name = "MIN")]
    pub critical_temp_minutes: Option<u64>,

    /// Override the NVMe warning composite-temperature minutes flag threshold.
    #[arg(long = "warning-temp-minutes", value_name = "MIN")]
    pub warning_temp_minutes: Option<u64>,

    /// Override the heavy-use flag threshold in TB/year.
    #[arg(long = "heavy-use-tb-per-year", value_name = "TB")]
    pub heavy_use_tb_per_year: Option<f64>,
}

#[derive(Parser)]
pub struct RulesArgs {
    /// JSON file with rule thresholds to display instead of the defaults.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Csv,
    Json,
    Xml,
    All,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
