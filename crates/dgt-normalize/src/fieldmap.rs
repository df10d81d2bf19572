//! Per-protocol field maps: which raw keys feed each canonical field.
//!
//! One static table per protocol, consulted in row order. For each field the
//! candidate keys are tried in priority order; the first key present in the
//! bag wins and its conversion is applied exactly once, here. A field listed
//! as `NotApplicable` (or whose `class` does not match the record) lands in
//! the record's not-applicable set; a mapped field with no resolvable
//! candidate lands in the unreadable set.

use dgt_adapter::keys;
use dgt_model::{Field, MediaClass, Protocol};

/// Unit conversion applied when a candidate resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Value already in canonical units.
    Identity,
    /// NVMe data units: one unit is 1000 logical blocks of 512 bytes,
    /// so bytes = units x 512,000 (NVMe spec, SMART/Health log).
    DataUnits512K,
    /// ATA LBA counters assume 512-byte logical sectors: bytes = LBAs x 512.
    Lba512,
    /// Normalized remaining-life percentage (100 = new); canonical field is
    /// percentage used, so value = 100 - raw, floored at 0.
    PercentRemainingToUsed,
}

impl Conversion {
    pub fn apply(&self, raw: u64) -> u64 {
        match self {
            Conversion::Identity => raw,
            Conversion::DataUnits512K => raw.saturating_mul(512_000),
            Conversion::Lba512 => raw.saturating_mul(512),
            Conversion::PercentRemainingToUsed => 100u64.saturating_sub(raw.min(100)),
        }
    }
}

/// One candidate raw key for a canonical field.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub key: &'static str,
    pub conversion: Conversion,
}

const fn ident(key: &'static str) -> Candidate {
    Candidate {
        key,
        conversion: Conversion::Identity,
    }
}

/// How a canonical field resolves for one protocol.
#[derive(Debug, Clone, Copy)]
pub enum Availability {
    /// Candidate raw keys, highest priority first. An empty list means the
    /// field is meaningful for the protocol but no capture source exists,
    /// so it always reads as unreadable.
    Mapped(&'static [Candidate]),
    /// The field has no meaning on this protocol.
    NotApplicable,
}

/// One row of a protocol's field map.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    /// Restricts the row to one media class; rows whose class does not match
    /// the record resolve as not-applicable.
    pub class: Option<MediaClass>,
    pub availability: Availability,
}

const fn mapped(
    field: Field,
    class: Option<MediaClass>,
    candidates: &'static [Candidate],
) -> FieldSpec {
    FieldSpec {
        field,
        class,
        availability: Availability::Mapped(candidates),
    }
}

const fn not_applicable(field: Field) -> FieldSpec {
    FieldSpec {
        field,
        class: None,
        availability: Availability::NotApplicable,
    }
}

static SATA_MAP: &[FieldSpec] = &[
    mapped(
        Field::ReallocatedSectors,
        Some(MediaClass::Hdd),
        &[ident(keys::ATA_REALLOCATED_RAW)],
    ),
    mapped(
        Field::PendingSectors,
        Some(MediaClass::Hdd),
        &[ident(keys::ATA_PENDING_RAW)],
    ),
    mapped(
        Field::PercentageUsed,
        Some(MediaClass::Ssd),
        &[
            ident(keys::ATA_PERCENT_LIFETIME_RAW),
            Candidate {
                key: keys::ATA_SSD_LIFE_LEFT_VALUE,
                conversion: Conversion::PercentRemainingToUsed,
            },
            Candidate {
                key: keys::ATA_WEAROUT_VALUE,
                conversion: Conversion::PercentRemainingToUsed,
            },
        ],
    ),
    mapped(
        Field::AvailableSpare,
        Some(MediaClass::Ssd),
        &[ident(keys::ATA_AVAILABLE_RESERVED_VALUE)],
    ),
    not_applicable(Field::MediaErrors),
    mapped(
        Field::PowerOnHours,
        None,
        &[ident(keys::POWER_ON_HOURS), ident(keys::ATA_POWER_ON_HOURS_RAW)],
    ),
    mapped(
        Field::HostBytesRead,
        None,
        &[Candidate {
            key: keys::ATA_LBAS_READ_RAW,
            conversion: Conversion::Lba512,
        }],
    ),
    mapped(
        Field::HostBytesWritten,
        None,
        &[Candidate {
            key: keys::ATA_LBAS_WRITTEN_RAW,
            conversion: Conversion::Lba512,
        }],
    ),
    mapped(
        Field::PowerCycleCount,
        None,
        &[ident(keys::POWER_CYCLE_COUNT), ident(keys::ATA_POWER_CYCLES_RAW)],
    ),
    mapped(
        Field::AverageTemperature,
        None,
        &[
            ident(keys::STATS_AVERAGE_LONG_TEMP),
            ident(keys::TEMPERATURE_CURRENT),
        ],
    ),
    mapped(
        Field::MaximumTemperature,
        None,
        &[ident(keys::STATS_HIGHEST_TEMP)],
    ),
    not_applicable(Field::WarningTempMinutes),
    not_applicable(Field::CriticalTempMinutes),
];

static SAS_MAP: &[FieldSpec] = &[
    mapped(
        Field::ReallocatedSectors,
        Some(MediaClass::Hdd),
        &[ident(keys::SCSI_GROWN_DEFECTS)],
    ),
    // SCSI has no pending-reallocation concept: a suspect sector is either
    // recovered or added to the grown defect list.
    not_applicable(Field::PendingSectors),
    mapped(
        Field::PercentageUsed,
        Some(MediaClass::Ssd),
        &[ident(keys::SCSI_PERCENT_USED)],
    ),
    not_applicable(Field::AvailableSpare),
    not_applicable(Field::MediaErrors),
    mapped(Field::PowerOnHours, None, &[ident(keys::POWER_ON_HOURS)]),
    mapped(Field::HostBytesRead, None, &[ident(keys::SCSI_READ_BYTES)]),
    mapped(Field::HostBytesWritten, None, &[ident(keys::SCSI_WRITE_BYTES)]),
    mapped(Field::PowerCycleCount, None, &[ident(keys::POWER_CYCLE_COUNT)]),
    mapped(
        Field::AverageTemperature,
        None,
        &[ident(keys::TEMPERATURE_CURRENT)],
    ),
    // Lifetime maximum is not exposed through smartctl's SCSI output; the
    // field stays meaningful, it just never resolves from captures.
    mapped(Field::MaximumTemperature, None, &[]),
    not_applicable(Field::WarningTempMinutes),
    not_applicable(Field::CriticalTempMinutes),
];

static NVME_MAP: &[FieldSpec] = &[
    not_applicable(Field::ReallocatedSectors),
    not_applicable(Field::PendingSectors),
    mapped(
        Field::PercentageUsed,
        None,
        &[ident(keys::NVME_PERCENTAGE_USED)],
    ),
    mapped(
        Field::AvailableSpare,
        None,
        &[ident(keys::NVME_AVAILABLE_SPARE)],
    ),
    mapped(Field::MediaErrors, None, &[ident(keys::NVME_MEDIA_ERRORS)]),
    mapped(
        Field::PowerOnHours,
        None,
        &[ident(keys::NVME_POWER_ON_HOURS), ident(keys::POWER_ON_HOURS)],
    ),
    mapped(
        Field::HostBytesRead,
        None,
        &[Candidate {
            key: keys::NVME_DATA_UNITS_READ,
            conversion: Conversion::DataUnits512K,
        }],
    ),
    mapped(
        Field::HostBytesWritten,
        None,
        &[Candidate {
            key: keys::NVME_DATA_UNITS_WRITTEN,
            conversion: Conversion::DataUnits512K,
        }],
    ),
    mapped(
        Field::PowerCycleCount,
        None,
        &[ident(keys::NVME_POWER_CYCLES), ident(keys::POWER_CYCLE_COUNT)],
    ),
    mapped(
        Field::AverageTemperature,
        None,
        &[ident(keys::NVME_TEMPERATURE), ident(keys::TEMPERATURE_CURRENT)],
    ),
    mapped(Field::MaximumTemperature, None, &[]),
    mapped(
        Field::WarningTempMinutes,
        None,
        &[ident(keys::NVME_WARNING_TEMP_TIME)],
    ),
    mapped(
        Field::CriticalTempMinutes,
        None,
        &[ident(keys::NVME_CRITICAL_COMP_TIME)],
    ),
];

/// Field map for one protocol, in canonical row order.
pub fn field_map(protocol: Protocol) -> &'static [FieldSpec] {
    match protocol {
        Protocol::Sata => SATA_MAP,
        Protocol::Sas => SAS_MAP,
        Protocol::Nvme => NVME_MAP,
    }
}
