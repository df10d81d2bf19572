//! Transport protocol and media class enumerations.
//!
//! The three wire protocols expose semantically equivalent health concepts
//! through incompatible raw attribute sets; everything downstream of the
//! normalizer keys its behavior off these two tags rather than re-inspecting
//! raw data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage transport protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Serial ATA, SMART attribute table via `smartctl`.
    Sata,
    /// Serial Attached SCSI, log pages via `smartctl`.
    Sas,
    /// NVM Express, health log via `nvme-cli` or `smartctl`.
    Nvme,
}

impl Protocol {
    /// Canonical lowercase name as used in reports and capture files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Sata => "sata",
            Protocol::Sas => "sas",
            Protocol::Nvme => "nvme",
        }
    }

    /// True for the rotating-capable transports (SATA/SAS carry both HDDs
    /// and SSDs; NVMe is always solid-state).
    pub fn supports_rotating_media(&self) -> bool {
        matches!(self, Protocol::Sata | Protocol::Sas)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    /// Parse a protocol tag. Case-insensitive; accepts the `smartctl`
    /// device-type spellings as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sata" | "ata" => Ok(Protocol::Sata),
            "sas" | "scsi" => Ok(Protocol::Sas),
            "nvme" => Ok(Protocol::Nvme),
            _ => Err(format!("unknown transport protocol: {s}")),
        }
    }
}

/// Physical media class, orthogonal to the transport.
///
/// Wear rules split on this: sector reallocation counters only exist on
/// rotating media, endurance percentages only on solid-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaClass {
    Hdd,
    Ssd,
}

impl MediaClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaClass::Hdd => "hdd",
            MediaClass::Ssd => "ssd",
        }
    }
}

impl fmt::Display for MediaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hdd" => Ok(MediaClass::Hdd),
            "ssd" => Ok(MediaClass::Ssd),
            _ => Err(format!("unknown media class: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MediaClass, Protocol};

    #[test]
    fn protocol_from_str() {
        assert_eq!("SATA".parse::<Protocol>().unwrap(), Protocol::Sata);
        assert_eq!("scsi".parse::<Protocol>().unwrap(), Protocol::Sas);
        assert_eq!("nvme".parse::<Protocol>().unwrap(), Protocol::Nvme);
        assert!("ide".parse::<Protocol>().is_err());
    }

    #[test]
    fn rotating_support() {
        assert!(Protocol::Sata.supports_rotating_media());
        assert!(Protocol::Sas.supports_rotating_media());
        assert!(!Protocol::Nvme.supports_rotating_media());
    }

    #[test]
    fn media_class_from_str() {
        assert_eq!("HDD".parse::<MediaClass>().unwrap(), MediaClass::Hdd);
        assert_eq!("ssd".parse::<MediaClass>().unwrap(), MediaClass::Ssd);
    }
}
