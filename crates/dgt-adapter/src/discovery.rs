//! Capture discovery: find device capture files and hand out handles.

use std::path::{Path, PathBuf};

use dgt_model::Protocol;

use crate::error::{AdapterError, Result};

/// An opaque reference to one device an adapter can fetch.
///
/// For the capture adapter this is a JSON file; a live adapter would carry
/// a `/dev` path instead. Discovery order defines report order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    /// Short display name (capture file stem or device node basename).
    pub name: String,
    /// Adapter-specific locator.
    pub path: PathBuf,
}

impl DeviceHandle {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Lists capture files (`*.json`) in a directory, sorted by filename so a
/// batch is reproducible across runs.
///
/// `ignored` drops devices of the listed protocols without reading the full
/// capture; the protocol is sniffed from the capture's device section and a
/// capture that cannot be sniffed is kept (the fetch will report the real
/// error per device rather than silently skipping it).
pub fn discover_captures(dir: &Path, ignored: &[Protocol]) -> Result<Vec<DeviceHandle>> {
    if !dir.is_dir() {
        return Err(AdapterError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| AdapterError::DirectoryScan {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| AdapterError::DirectoryScan {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut handles = Vec::new();
    for path in files {
        if !ignored.is_empty() {
            match sniff_protocol(&path) {
                Some(protocol) if ignored.contains(&protocol) => {
                    tracing::debug!(path = %path.display(), %protocol, "capture ignored by protocol filter");
                    continue;
                }
                _ => {}
            }
        }
        let name = path
            .file_stem()
            .and_then(|v| v.to_str())
            .unwrap_or("device")
            .to_string();
        handles.push(DeviceHandle::new(name, path));
    }
    Ok(handles)
}

/// Best-effort protocol sniff from the capture's `device.protocol` field.
fn sniff_protocol(path: &Path) -> Option<Protocol> {
    let text = std::fs::read_to_string(path).ok()?;
    let json: serde_json::Value = serde_json::from_str(&text).ok()?;
    json.get("device")
        .and_then(|device| device.get("protocol"))
        .and_then(|value| value.as_str())
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::{DeviceHandle, discover_captures};
    use dgt_model::Protocol;
    use tempfile::TempDir;

    fn capture(protocol: &str) -> String {
        format!(r#"{{"device": {{"name": "/dev/sda", "protocol": "{protocol}"}}}}"#)
    }

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b-drive.json"), capture("ATA")).unwrap();
        std::fs::write(dir.path().join("a-drive.json"), capture("NVMe")).unwrap();
        std::fs::write(dir.path().join("c-drive.json"), capture("SCSI")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a capture").unwrap();
        dir
    }

    #[test]
    fn discovers_sorted_json_files() {
        let dir = create_test_dir();
        let handles = discover_captures(dir.path(), &[]).unwrap();
        let names: Vec<&str> = handles.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["a-drive", "b-drive", "c-drive"]);
    }

    #[test]
    fn ignore_filter_drops_protocols() {
        let dir = create_test_dir();
        let handles = discover_captures(dir.path(), &[Protocol::Nvme]).unwrap();
        let names: Vec<&str> = handles.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["b-drive", "c-drive"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(discover_captures(&missing, &[]).is_err());
    }

    #[test]
    fn handle_keeps_stem_as_name() {
        let handle = DeviceHandle::new("sda", "/tmp/sda.json");
        assert_eq!(handle.name, "sda");
    }
}
