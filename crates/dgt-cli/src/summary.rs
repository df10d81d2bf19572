use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dgt_model::{Field, GradeStatus, GradedDevice};
use dgt_rules::rule_table;

use crate::types::GradeOutcome;

pub fn print_summary(outcome: &GradeOutcome) {
    let batch = &outcome.batch;
    println!("Devices graded: {}", batch.len());
    if outcome.dry_run {
        println!("Dry run: no report files written");
    } else {
        println!("Output: {}", outcome.output_dir.display());
        for path in &outcome.report_paths {
            println!("Report: {}", path.display());
        }
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Device"),
        header_cell("Serial"),
        header_cell("Model"),
        header_cell("Protocol"),
        header_cell("Class"),
        header_cell("Capacity(GB)"),
        header_cell("POH"),
        header_cell("Status"),
        header_cell("Reasons/Flags"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 5, CellAlignment::Right);
    align_column(&mut table, 7, CellAlignment::Center);

    for device in batch.devices() {
        let record = device.record.as_ref();
        table.add_row(vec![
            Cell::new(&device.device),
            Cell::new(record.map(|r| r.identity.serial.as_str()).unwrap_or("-")),
            Cell::new(record.map(|r| r.identity.model.as_str()).unwrap_or("-")),
            Cell::new(record.map(|r| r.identity.protocol.as_str()).unwrap_or("-")),
            Cell::new(record.map(|r| r.media_class.as_str()).unwrap_or("-")),
            record
                .map(|r| Cell::new(r.identity.capacity_gb()))
                .unwrap_or_else(|| dim_cell("-")),
            record
                .and_then(|r| r.power_on_readable.as_deref())
                .map(Cell::new)
                .unwrap_or_else(|| dim_cell("-")),
            status_cell(device.display_status()),
            reasons_cell(device),
        ]);
    }

    let (pass, flagged, fail, error) = batch.status_counts();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} devices", batch.len())).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(format!(
            "{pass} pass / {flagged} flagged / {fail} fail / {error} error"
        ))
        .add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    print_findings(batch.devices());
}

/// Per-finding detail table: every reason, flag, and unchecked rule.
fn print_findings(devices: &[GradedDevice]) {
    let mut rows = Vec::new();
    for device in devices {
        for code in &device.fail_reasons {
            rows.push((device.device.clone(), severity_for(device), *code, detail_for(*code)));
        }
        for code in &device.flag_codes {
            rows.push((device.device.clone(), "FLAG", *code, detail_for(*code)));
        }
        for note in &device.insufficiency {
            let missing: Vec<&str> = note.missing.iter().map(Field::as_str).collect();
            rows.push((
                device.device.clone(),
                "SKIPPED",
                note.rule,
                format!("not evaluated, unreadable: {}", missing.join(", ")),
            ));
        }
    }
    if rows.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Device"),
        header_cell("Severity"),
        header_cell("Code"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    for (device, severity, code, detail) in rows {
        table.add_row(vec![
            Cell::new(device),
            severity_text_cell(severity),
            Cell::new(code.as_str()),
            Cell::new(detail),
        ]);
    }
    println!();
    println!("Findings:");
    println!("{table}");
}

fn severity_for(device: &GradedDevice) -> &'static str {
    match device.status {
        GradeStatus::Error => "ERROR",
        _ => "FAIL",
    }
}

/// Condition text from the rule table; error codes get fixed wording.
fn detail_for(code: dgt_model::ReasonCode) -> String {
    if let Some(rule) = rule_table().iter().find(|rule| rule.code == code) {
        return rule.summary.to_string();
    }
    match code {
        dgt_model::ReasonCode::DataReadError => "diagnostic data could not be read".to_string(),
        dgt_model::ReasonCode::IdentityUnresolved => {
            "serial number or capacity could not be resolved".to_string()
        }
        dgt_model::ReasonCode::InsufficientData => {
            "an applicable fail rule had no readable data".to_string()
        }
        _ => String::new(),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: GradeStatus) -> Cell {
    match status {
        GradeStatus::Pass => Cell::new("PASS").fg(Color::Green),
        GradeStatus::Flagged => Cell::new("FLAGGED").fg(Color::Yellow),
        GradeStatus::Fail => Cell::new("FAIL").fg(Color::Red),
        GradeStatus::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn severity_text_cell(severity: &str) -> Cell {
    match severity {
        "ERROR" => Cell::new(severity)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        "FAIL" => Cell::new(severity).fg(Color::Red),
        "FLAG" => Cell::new(severity).fg(Color::Yellow),
        _ => Cell::new(severity).fg(Color::DarkGrey),
    }
}

fn reasons_cell(device: &GradedDevice) -> Cell {
    let summary = device.reason_summary();
    if summary.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(summary)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
