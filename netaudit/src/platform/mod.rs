//! Platform classification and per-platform command profiles.
//!
//! A device's OS family decides which diagnostic commands it understands
//! and which parsers apply to their output. Detection never fails a device:
//! anything unrecognized is [`PlatformFamily::Unknown`] and routes to the
//! minimal fallback profile.

mod detect;
mod profiles;

pub use detect::{classify_version_output, detect, PROBE_COMMAND};
pub use profiles::{CommandProfile, ProfileEntry, ProfileRegistry};

use serde::Serialize;

/// Closed enum of supported device OS families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlatformFamily {
    /// Classic Cisco IOS.
    Ios,

    /// Cisco IOS XE.
    IosXe,

    /// Cisco NX-OS (Nexus).
    Nxos,

    /// Cisco ASA.
    Asa,

    /// Unrecognized platform; gets the fallback profile.
    Unknown,
}

impl PlatformFamily {
    /// Short display tag used in the report.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformFamily::Ios => "IOS",
            PlatformFamily::IosXe => "IOS-XE",
            PlatformFamily::Nxos => "NX-OS",
            PlatformFamily::Asa => "ASA",
            PlatformFamily::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detected platform: family tag plus the raw version string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformInfo {
    /// Detected OS family.
    pub family: PlatformFamily,

    /// Raw version string as extracted from the probe output, empty when
    /// nothing matched.
    pub version: String,
}

impl PlatformInfo {
    pub fn new(family: PlatformFamily, version: impl Into<String>) -> Self {
        Self {
            family,
            version: version.into(),
        }
    }

    /// The value returned when no detection pattern matched.
    pub fn unknown() -> Self {
        Self {
            family: PlatformFamily::Unknown,
            version: String::new(),
        }
    }
}
