//! Platform detection from version-probe output.

use std::sync::LazyLock;
use std::time::Duration;

use log::debug;
use regex::Regex;

use super::{PlatformFamily, PlatformInfo};
use crate::error::TransportError;
use crate::transport::Session;

/// Vendor-agnostic probe command understood by every supported family.
pub const PROBE_COMMAND: &str = "show version";

static NXOS_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:NXOS|system):\s+version\s+(\S+)").unwrap()
});

static ASA_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Adaptive Security Appliance Software Version (\S+)").unwrap()
});

static IOS_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Version ([^,\s\]]+)").unwrap()
});

/// Classify `show version` output into a platform family and version.
///
/// Pure and total: unrecognized or empty output yields
/// [`PlatformInfo::unknown`], never an error. Order matters below — IOS XE
/// banners also contain the plain "Cisco IOS Software" marker.
pub fn classify_version_output(output: &str) -> PlatformInfo {
    if output.contains("NX-OS") || output.contains("Nexus Operating System") {
        let version = NXOS_VERSION
            .captures(output)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        return PlatformInfo::new(PlatformFamily::Nxos, version);
    }

    if output.contains("Adaptive Security Appliance") {
        let version = ASA_VERSION
            .captures(output)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        return PlatformInfo::new(PlatformFamily::Asa, version);
    }

    if output.contains("IOS XE Software") || output.contains("IOS-XE Software") {
        let version = ios_version(output);
        return PlatformInfo::new(PlatformFamily::IosXe, version);
    }

    if output.contains("Cisco IOS Software") || output.contains("Cisco Internetwork Operating System") {
        let version = ios_version(output);
        return PlatformInfo::new(PlatformFamily::Ios, version);
    }

    PlatformInfo::unknown()
}

fn ios_version(output: &str) -> String {
    IOS_VERSION
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Probe an open session and classify the device's platform.
///
/// Only the transport can fail here; a probe that runs but produces
/// unrecognized text degrades to `Unknown` rather than failing the device.
pub async fn detect(
    session: &mut dyn Session,
    timeout: Duration,
) -> Result<PlatformInfo, TransportError> {
    let output = session.exec(PROBE_COMMAND, timeout).await?;
    let info = classify_version_output(&output);
    debug!("classified platform {} (version '{}')", info.family, info.version);
    Ok(info)
}
