use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("capture file not found: {path}")]
    CaptureNotFound { path: PathBuf },

    #[error("capture directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read capture {path}")]
    CaptureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse capture {path} as smartctl JSON")]
    CaptureParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("capture {path} has no device section")]
    MissingDeviceSection { path: PathBuf },

    #[error("unknown transport protocol {value:?} in capture {path}")]
    UnknownProtocol { value: String, path: PathBuf },

    #[error("adapter fetch for {device} exceeded {seconds}s timeout")]
    Timeout { device: String, seconds: u64 },

    #[error("failed to scan capture directory {path}")]
    DirectoryScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, AdapterError>;
