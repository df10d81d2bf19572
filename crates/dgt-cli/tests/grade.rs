//! Full-pipeline tests: capture directory in, graded reports out.

use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

use dgt_cli::cli::{GradeArgs, ReportFormatArg};
use dgt_cli::commands::run_grade;
use dgt_model::{GradeStatus, ReasonCode};

fn write_capture(dir: &Path, name: &str, value: &serde_json::Value) {
    std::fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn sata_hdd_reallocated() -> serde_json::Value {
    json!({
        "device": {"name": "/dev/sda", "protocol": "ATA"},
        "model_name": "ST4000DM004-2CV104",
        "serial_number": "ZFN0FAIL",
        "firmware_version": "0001",
        "rotation_rate": 5400,
        "user_capacity": {"bytes": 4000787030016u64},
        "power_on_time": {"hours": 11000},
        "power_cycle_count": 77,
        "ata_smart_attributes": {"table": [
            {"id": 5, "name": "Reallocated_Sector_Ct", "value": 95, "raw": {"value": 15, "string": "15"}},
            {"id": 197, "name": "Current_Pending_Sector", "value": 100, "raw": {"value": 0, "string": "0"}},
            {"id": 241, "name": "Total_LBAs_Written", "value": 100, "raw": {"value": 1000000, "string": "1000000"}},
            {"id": 242, "name": "Total_LBAs_Read", "value": 100, "raw": {"value": 1000000, "string": "1000000"}}
        ]},
        "ata_smart_self_test_log": {"standard": {"table": [
            {"type": {"value": 1, "string": "Short offline"},
             "status": {"value": 0, "string": "Completed without error", "passed": true},
             "lifetime_hours": 10000}
        ]}}
    })
}

fn nvme_spare_low() -> serde_json::Value {
    json!({
        "device": {"name": "/dev/nvme0", "protocol": "NVMe"},
        "model_name": "Samsung SSD 970 EVO 1TB",
        "serial_number": "S466NB0K1SPARE",
        "firmware_version": "2B2QEXE7",
        "user_capacity": {"bytes": 1000204886016u64},
        "nvme_smart_health_information_log": {
            "temperature": 36,
            "available_spare": 96,
            "percentage_used": 50,
            "data_units_read": 1000000,
            "data_units_written": 1000000,
            "power_cycles": 200,
            "power_on_hours": 9000,
            "media_errors": 0,
            "warning_temp_time": 0,
            "critical_comp_time": 0
        }
    })
}

fn sata_ssd_clean() -> serde_json::Value {
    json!({
        "device": {"name": "/dev/sdb", "protocol": "ATA"},
        "model_name": "Crucial_CT1050MX300SSD1",
        "serial_number": "164314CLEAN",
        "firmware_version": "M0CR060",
        "rotation_rate": 0,
        "user_capacity": {"bytes": 1050214588416u64},
        "power_on_time": {"hours": 20000},
        "ata_smart_attributes": {"table": [
            {"id": 173, "name": "Available_Reservd_Space", "value": 100, "raw": {"value": 17, "string": "17"}},
            {"id": 202, "name": "Percent_Lifetime_Remain", "value": 10, "raw": {"value": 90, "string": "90"}}
        ]},
        "ata_smart_self_test_log": {"standard": {"table": []}}
    })
}

fn sas_hdd_heavy_use() -> serde_json::Value {
    json!({
        "device": {"name": "/dev/sdc", "protocol": "SCSI"},
        "vendor": "HGST",
        "model_name": "HUH721212AL5200",
        "serial_number": "8CJHEAVY",
        "firmware_version": "A21D",
        "rotation_rate": 7200,
        "user_capacity": {"bytes": 12000138625024u64},
        "power_on_time": {"hours": 18000},
        "scsi_grown_defect_list": 0,
        "scsi_error_counter_log": {
            "read": {"gigabytes_processed": "700000.000"},
            "write": {"gigabytes_processed": "500000.000"}
        }
    })
}

fn capture_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_capture(dir.path(), "a-sata-hdd.json", &sata_hdd_reallocated());
    write_capture(dir.path(), "b-nvme.json", &nvme_spare_low());
    write_capture(dir.path(), "c-sata-ssd.json", &sata_ssd_clean());
    std::fs::write(dir.path().join("d-broken.json"), "{ not json").unwrap();
    write_capture(dir.path(), "e-sas-hdd.json", &sas_hdd_heavy_use());
    dir
}

fn grade_args(dir: &Path) -> GradeArgs {
    GradeArgs {
        capture_dir: dir.to_path_buf(),
        output_dir: None,
        format: ReportFormatArg::All,
        per_device: false,
        dry_run: false,
        config: None,
        ignore_sata: false,
        ignore_sas: false,
        ignore_nvme: false,
        workers: 2,
        device_timeout_secs: 10,
        media_error_threshold: None,
        critical_temp_minutes: None,
        warning_temp_minutes: None,
        heavy_use_tb_per_year: None,
    }
}

#[test]
fn grades_a_mixed_capture_directory() {
    let dir = capture_dir();
    let outcome = run_grade(&grade_args(dir.path())).unwrap();
    let devices = outcome.batch.devices();
    assert_eq!(devices.len(), 5);

    // Discovery order is capture filename order.
    let names: Vec<&str> = devices.iter().map(|d| d.device.as_str()).collect();
    assert_eq!(
        names,
        vec!["a-sata-hdd", "b-nvme", "c-sata-ssd", "d-broken", "e-sas-hdd"]
    );

    let sata_hdd = &devices[0];
    assert_eq!(sata_hdd.status, GradeStatus::Fail);
    assert_eq!(sata_hdd.fail_reasons, vec![ReasonCode::ReallocatedHigh]);

    let nvme = &devices[1];
    assert_eq!(nvme.status, GradeStatus::Fail);
    assert_eq!(nvme.fail_reasons, vec![ReasonCode::SpareLow]);

    let sata_ssd = &devices[2];
    assert_eq!(sata_ssd.status, GradeStatus::Pass);
    assert!(sata_ssd.fail_reasons.is_empty());
    assert!(sata_ssd.flag_codes.is_empty());
    let record = sata_ssd.record.as_ref().unwrap();
    assert_eq!(record.percentage_used, Some(90));

    let broken = &devices[3];
    assert_eq!(broken.status, GradeStatus::Error);
    assert_eq!(broken.fail_reasons, vec![ReasonCode::DataReadError]);
    assert!(broken.record.is_none());

    let sas = &devices[4];
    assert_eq!(sas.status, GradeStatus::Pass);
    assert_eq!(sas.flag_codes, vec![ReasonCode::HeavyUse]);
    assert_eq!(sas.display_status(), GradeStatus::Flagged);
    let record = sas.record.as_ref().unwrap();
    assert_eq!(record.power_on_readable.as_deref(), Some("2y 20d 0h"));
    // 1200 TB over 18000 h ~= 584 TB/year
    let rate = record.workload_tb_per_year.unwrap();
    assert!((rate - 584.0).abs() < 0.1, "rate was {rate}");

    assert!(outcome.has_failures());
    assert!(outcome.has_errors());

    // All three report renditions land in <capture_dir>/reports.
    assert_eq!(outcome.report_paths.len(), 3);
    for path in &outcome.report_paths {
        assert!(path.is_file());
        assert!(path.parent().unwrap().ends_with("reports"));
    }
    let csv_text = std::fs::read_to_string(&outcome.report_paths[0]).unwrap();
    assert_eq!(csv_text.lines().count(), 6);
    assert!(csv_text.contains("ZFN0FAIL"));
    assert!(csv_text.contains("DATA_READ_ERROR"));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = capture_dir();
    let mut args = grade_args(dir.path());
    args.dry_run = true;
    let outcome = run_grade(&args).unwrap();
    assert!(outcome.report_paths.is_empty());
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn protocol_ignore_filters_devices() {
    let dir = capture_dir();
    let mut args = grade_args(dir.path());
    args.ignore_nvme = true;
    args.ignore_sas = true;
    args.dry_run = true;
    let outcome = run_grade(&args).unwrap();
    let names: Vec<&str> = outcome
        .batch
        .devices()
        .iter()
        .map(|d| d.device.as_str())
        .collect();
    // The broken capture cannot be protocol-sniffed and is kept; its grade
    // reports the read error instead of being silently dropped.
    assert_eq!(names, vec!["a-sata-hdd", "c-sata-ssd", "d-broken"]);
}

#[test]
fn threshold_overrides_change_verdicts() {
    let dir = TempDir::new().unwrap();
    write_capture(dir.path(), "nvme.json", &nvme_spare_low());
    let mut args = grade_args(dir.path());
    args.dry_run = true;
    // Give the warning-temp rule something to flag and loosen nothing else.
    args.warning_temp_minutes = Some(0);
    let outcome = run_grade(&args).unwrap();
    let device = &outcome.batch.devices()[0];
    // warning_temp_time is 0, threshold 0, condition is strictly-greater:
    // still no flag.
    assert!(device.flag_codes.is_empty());
    assert_eq!(device.status, GradeStatus::Fail);
}

#[test]
fn config_file_feeds_thresholds() {
    let dir = TempDir::new().unwrap();
    write_capture(dir.path(), "sata.json", &sata_hdd_reallocated());
    // Config lives outside the capture directory so it is not mistaken for
    // a capture.
    let config_dir = TempDir::new().unwrap();
    let config_path = config_dir.path().join("thresholds.json");
    std::fs::write(&config_path, r#"{"reallocated_sectors": 20}"#).unwrap();

    let mut args = grade_args(dir.path());
    args.dry_run = true;
    args.config = Some(config_path);
    let outcome = run_grade(&args).unwrap();
    // 15 reallocated sectors no longer exceeds the configured 20.
    assert_eq!(outcome.batch.devices()[0].status, GradeStatus::Pass);
}

#[test]
fn empty_capture_directory_is_a_batch_level_failure() {
    let dir = TempDir::new().unwrap();
    let args = grade_args(dir.path());
    assert!(run_grade(&args).is_err());
}

#[test]
fn per_device_reports_use_identity_stems() {
    let dir = TempDir::new().unwrap();
    write_capture(dir.path(), "nvme.json", &nvme_spare_low());
    let mut args = grade_args(dir.path());
    args.format = ReportFormatArg::Csv;
    args.per_device = true;
    let outcome = run_grade(&args).unwrap();
    assert_eq!(outcome.report_paths.len(), 1);
    let name = outcome.report_paths[0].file_name().unwrap().to_str().unwrap();
    assert!(name.contains("S466NB0K1SPARE"), "got {name}");
}
