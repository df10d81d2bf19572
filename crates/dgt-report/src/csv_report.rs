//! CSV rendition.

use std::path::Path;

use anyhow::Result;

use dgt_model::GradedDevice;

use crate::row::{COLUMNS, ReportRow};

pub fn write(devices: &[GradedDevice], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COLUMNS)?;
    for device in devices {
        writer.write_record(ReportRow::from_graded(device).values())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write;
    use dgt_model::{
        DeviceIdentity, GradeStatus, GradedDevice, HealthRecord, MediaClass, Protocol, ReasonCode,
    };
    use tempfile::TempDir;

    #[test]
    fn header_and_rows() {
        let mut record = HealthRecord::new(
            DeviceIdentity {
                vendor: "INTEL".to_string(),
                model: "SSDPE2KX040T8".to_string(),
                serial: "PHLJ1234".to_string(),
                firmware: "VDV10131".to_string(),
                capacity_bytes: 4_000_787_030_016,
                protocol: Protocol::Nvme,
            },
            MediaClass::Ssd,
        );
        record.available_spare = Some(96);
        record.percentage_used = Some(50);
        let graded = GradedDevice {
            device: "nvme0".to_string(),
            record: Some(record),
            status: GradeStatus::Fail,
            fail_reasons: vec![ReasonCode::SpareLow],
            flag_codes: vec![],
            insufficiency: vec![],
        };

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grades.csv");
        write(&[graded], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        insta::assert_snapshot!(
            header,
            @"SerialNumber,Model,Firmware,Capacity(GB),Protocol,Class,Status,Reasons,POH_Readable,POH_Hours,ReallocatedSectors(HDD),PendingSectors(HDD),PercentUsed(SSD),AvailableSpare%(SSD),MediaErrors(NVMe),HostReads(GB),HostWrites(GB),AvgTemp,MaxTemp,WarningTempTime(min),CriticalTempTime(min),Workload(TB/yr),Notes"
        );
        let row = lines.next().unwrap();
        assert!(row.contains("PHLJ1234"));
        assert!(row.contains("SPARE_LOW"));
        assert!(row.contains("nvme"));
        assert_eq!(lines.next(), None);
    }
}
