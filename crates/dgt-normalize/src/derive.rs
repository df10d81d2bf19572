//! Derived metrics: values no protocol reports directly.

use tracing::debug;

use dgt_model::{Field, HealthRecord};

/// Hours in the 365-day reporting year used for both the workload rate and
/// the human-readable duration. No leap adjustment.
pub const HOURS_PER_YEAR: u64 = 8760;

/// Decimal terabyte.
const BYTES_PER_TB: f64 = 1e12;

/// Adds the derived metrics to a normalized record. Pure computation over
/// fields already present; never fails.
///
/// - annualized workload = (host bytes read + written) in TB per year of
///   power-on time,
/// - human-readable power-on duration,
/// - NVMe composite-temperature minutes pass through untouched (the
///   normalizer already placed them).
pub fn apply(record: &mut HealthRecord) {
    apply_workload(record);
    record.power_on_readable = record.power_on_hours.map(format_hours);
}

fn apply_workload(record: &mut HealthRecord) {
    let poh = record.power_on_hours.filter(|hours| *hours > 0);
    let read = record.host_bytes_read;
    let written = record.host_bytes_written;

    // Zero or unreadable power-on hours would be a division fault; one
    // missing byte counter still yields a usable lower bound, both missing
    // does not.
    let (Some(poh), true) = (poh, read.is_some() || written.is_some()) else {
        record.fields.mark_unreadable(Field::WorkloadRate);
        return;
    };

    let total_bytes = read.unwrap_or(0).saturating_add(written.unwrap_or(0));
    let years = poh as f64 / HOURS_PER_YEAR as f64;
    let rate = (total_bytes as f64 / BYTES_PER_TB) / years;
    debug!(
        serial = %record.identity.serial,
        total_bytes,
        power_on_hours = poh,
        tb_per_year = rate,
        "workload derived"
    );
    record.workload_tb_per_year = Some(rate);
    record.fields.mark_applied(Field::WorkloadRate);
}

/// Formats an hour count as whole years, remaining whole days, remaining
/// whole hours: `18000` -> `"2y 20d 0h"`. 365-day years, 24-hour days,
/// all three components always present. Presentational only; nothing
/// parses it back.
pub fn format_hours(hours: u64) -> String {
    let years = hours / HOURS_PER_YEAR;
    let days = (hours % HOURS_PER_YEAR) / 24;
    let remainder = hours % 24;
    format!("{years}y {days}d {remainder}h")
}
