//! The normalization pass: one raw attribute bag in, one canonical health
//! record out.

use tracing::{debug, warn};

use dgt_adapter::{RawAttributeBag, RawValue, keys};
use dgt_model::{DeviceIdentity, Field, HealthRecord, MediaClass, Protocol};

use crate::error::{NormalizeError, Result};
use crate::fieldmap::{Availability, Conversion, field_map};
use crate::selftest::normalize_entries;

/// Normalizes one bag into a health record.
///
/// Fails only when identity (serial number, capacity) cannot be resolved;
/// every other missing or malformed attribute degrades into the record's
/// unreadable set.
pub fn normalize(bag: &RawAttributeBag) -> Result<HealthRecord> {
    let protocol = bag.protocol();
    let identity = resolve_identity(bag, protocol)?;
    let (media_class, class_readable) = detect_media_class(bag, protocol);

    let mut record = HealthRecord::new(identity, media_class);
    if class_readable {
        record.fields.mark_applied(Field::MediaClassDetection);
    } else {
        record.fields.mark_unreadable(Field::MediaClassDetection);
    }

    for spec in field_map(protocol) {
        if let Some(class) = spec.class {
            if class != record.media_class {
                record.fields.mark_not_applicable(spec.field);
                continue;
            }
        }
        match spec.availability {
            Availability::NotApplicable => record.fields.mark_not_applicable(spec.field),
            Availability::Mapped(candidates) => {
                resolve_mapped(bag, spec.field, candidates, &mut record);
            }
        }
    }

    resolve_self_tests(bag, &mut record);
    debug!(
        serial = %record.identity.serial,
        protocol = %record.identity.protocol,
        class = %record.media_class,
        "record normalized"
    );
    Ok(record)
}

fn resolve_identity(bag: &RawAttributeBag, protocol: Protocol) -> Result<DeviceIdentity> {
    let serial = bag
        .get(keys::SERIAL_NUMBER)
        .and_then(RawValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let capacity_bytes = bag
        .get(keys::CAPACITY_BYTES)
        .and_then(RawValue::as_u64)
        .filter(|bytes| *bytes > 0);

    let mut missing = Vec::new();
    if serial.is_none() {
        missing.push("serial_number");
    }
    if capacity_bytes.is_none() {
        missing.push("capacity_bytes");
    }

    let model = bag
        .get(keys::MODEL_NAME)
        .and_then(RawValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string();

    let (Some(serial), Some(capacity_bytes)) = (serial, capacity_bytes) else {
        return Err(NormalizeError::IdentityUnresolved {
            device: model,
            missing,
        });
    };

    let vendor = bag
        .get(keys::VENDOR)
        .or_else(|| bag.get(keys::MODEL_FAMILY))
        .and_then(RawValue::as_text)
        .map(|text| text.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| vendor_from_model(&model));
    let firmware = bag
        .get(keys::FIRMWARE_VERSION)
        .and_then(RawValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string();

    Ok(DeviceIdentity {
        vendor,
        model,
        serial,
        firmware,
        capacity_bytes,
        protocol,
    })
}

/// First token of the model string, uppercased. Good enough when neither a
/// vendor field nor a model family is reported.
fn vendor_from_model(model: &str) -> String {
    model
        .split_whitespace()
        .next()
        .map(str::to_uppercase)
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

/// NVMe is always solid-state. SATA/SAS split on the reported rotation rate
/// (0 means "Solid State Device" in smartctl terms); a rotating-capable
/// device that does not report one grades under the HDD rules and carries
/// the detection as unreadable.
fn detect_media_class(bag: &RawAttributeBag, protocol: Protocol) -> (MediaClass, bool) {
    if !protocol.supports_rotating_media() {
        return (MediaClass::Ssd, true);
    }
    match bag.get(keys::ROTATION_RATE).and_then(RawValue::as_u64) {
        Some(0) => (MediaClass::Ssd, true),
        Some(_) => (MediaClass::Hdd, true),
        None => (MediaClass::Hdd, false),
    }
}

fn resolve_mapped(
    bag: &RawAttributeBag,
    field: Field,
    candidates: &[crate::fieldmap::Candidate],
    record: &mut HealthRecord,
) {
    for candidate in candidates {
        let Some(value) = bag.get(candidate.key) else {
            continue;
        };
        // First present candidate wins; a present key that does not parse is
        // a read failure, not a reason to fall through to weaker sources.
        if assign(record, field, value, candidate.conversion) {
            record.fields.mark_applied(field);
        } else {
            warn!(
                serial = %record.identity.serial,
                %field,
                key = candidate.key,
                "raw attribute present but unparseable"
            );
            record.fields.mark_unreadable(field);
        }
        return;
    }
    record.fields.mark_unreadable(field);
}

fn assign(record: &mut HealthRecord, field: Field, value: &RawValue, conversion: Conversion) -> bool {
    match field {
        Field::AverageTemperature => {
            let Some(v) = value.as_i64() else { return false };
            record.average_temperature_c = Some(v);
            true
        }
        Field::MaximumTemperature => {
            let Some(v) = value.as_i64() else { return false };
            record.maximum_temperature_c = Some(v);
            true
        }
        _ => {
            let Some(raw) = value.as_u64() else { return false };
            let v = conversion.apply(raw);
            match field {
                Field::ReallocatedSectors => record.reallocated_sectors = Some(v),
                Field::PendingSectors => record.pending_sectors = Some(v),
                Field::PercentageUsed => record.percentage_used = Some(v),
                Field::AvailableSpare => record.available_spare = Some(v),
                Field::MediaErrors => record.media_errors = Some(v),
                Field::PowerOnHours => record.power_on_hours = Some(v),
                Field::HostBytesRead => record.host_bytes_read = Some(v),
                Field::HostBytesWritten => record.host_bytes_written = Some(v),
                Field::PowerCycleCount => record.power_cycle_count = Some(v),
                Field::WarningTempMinutes => record.warning_temp_minutes = Some(v),
                Field::CriticalTempMinutes => record.critical_temp_minutes = Some(v),
                _ => return false,
            }
            true
        }
    }
}

fn resolve_self_tests(bag: &RawAttributeBag, record: &mut HealthRecord) {
    match bag.get(keys::SELF_TEST_LOG) {
        Some(RawValue::SelfTests(entries)) => {
            record.self_test_history = normalize_entries(entries);
            record.fields.mark_applied(Field::SelfTestHistory);
        }
        Some(_) => record.fields.mark_unreadable(Field::SelfTestHistory),
        // No log section means the device never logged a test; an empty
        // history is a normal, readable state.
        None => {
            record.self_test_history = Vec::new();
            record.fields.mark_applied(Field::SelfTestHistory);
        }
    }
}
