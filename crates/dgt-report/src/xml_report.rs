//! XML rendition, one `<Device>` element per graded device.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use dgt_model::GradedDevice;

use crate::row::{ReportRow, XML_NAMES};

pub fn write(devices: &[GradedDevice], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut xml = Writer::new_with_indent(BufWriter::new(file), b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut root = BytesStart::new("DeviceGrades");
    root.push_attribute((
        "GeneratedAt",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true).as_str(),
    ));
    root.push_attribute(("DeviceCount", devices.len().to_string().as_str()));
    xml.write_event(Event::Start(root))?;

    for device in devices {
        xml.write_event(Event::Start(BytesStart::new("Device")))?;
        let row = ReportRow::from_graded(device);
        for (name, value) in XML_NAMES.iter().zip(row.values()) {
            write_text_element(&mut xml, name, value)?;
        }
        xml.write_event(Event::End(BytesEnd::new("Device")))?;
    }

    xml.write_event(Event::End(BytesEnd::new("DeviceGrades")))?;
    std::io::Write::flush(&mut xml.into_inner())?;
    Ok(())
}

fn write_text_element<W: std::io::Write>(
    xml: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<()> {
    if value.is_empty() {
        xml.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(value)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
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
    fn renders_device_elements() {
        let record = HealthRecord::new(
            DeviceIdentity {
                vendor: "HGST".to_string(),
                model: "HUH721212AL5200".to_string(),
                serial: "8CJ1234".to_string(),
                firmware: "A21D".to_string(),
                capacity_bytes: 12_000_138_625_024,
                protocol: Protocol::Sas,
            },
            MediaClass::Hdd,
        );
        let graded = GradedDevice {
            device: "sdb".to_string(),
            record: Some(record),
            status: GradeStatus::Pass,
            fail_reasons: vec![],
            flag_codes: vec![ReasonCode::HeavyUse],
            insufficiency: vec![],
        };

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grades.xml");
        write(&[graded], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<DeviceGrades"));
        assert!(text.contains("<SerialNumber>8CJ1234</SerialNumber>"));
        assert!(text.contains("<Status>flagged</Status>"));
        assert!(text.contains("<Reasons>HEAVY_USE</Reasons>"));
        // unpopulated fields collapse to empty elements
        assert!(text.contains("<MediaErrors/>"));
    }
}
