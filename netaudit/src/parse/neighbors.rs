//! Parser for `show cdp neighbors detail` output.

use std::sync::LazyLock;

use regex::Regex;

use super::{ParseOutput, ParsedRecord};
use crate::report::NeighborRecord;

static DEVICE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Device ID:\s*(\S+)").unwrap());

static PLATFORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Platform:\s*([^,]+),").unwrap());

static INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Interface:\s*([^,]+),\s*Port ID \(outgoing port\):\s*(.+)").unwrap()
});

/// Parse CDP neighbor detail blocks into [`NeighborRecord`]s.
///
/// Blocks are separated by dashed lines. A block missing its Device ID or
/// local interface is skipped with a note; partial data elsewhere (no
/// platform, no port) still produces a record with empty fields.
pub fn parse_neighbors(raw: &str) -> ParseOutput {
    let mut out = ParseOutput::new();

    for block in split_blocks(raw) {
        if block.trim().is_empty() {
            continue;
        }

        let device = DEVICE_ID
            .captures(block)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        let interface = INTERFACE.captures(block);

        let (Some(device), Some(iface_caps)) = (device, interface) else {
            // Preamble text before the first separator lands here too;
            // only note blocks that look like they carried neighbor data.
            if block.contains("Device ID:") {
                out.notes
                    .push("cdp block missing device id or interface".to_string());
            }
            continue;
        };

        let platform = PLATFORM
            .captures(block)
            .and_then(|c| c.get(1))
            .map(|m| normalize_platform(m.as_str()))
            .unwrap_or_default();

        out.records.push(ParsedRecord::Neighbor(NeighborRecord {
            local_interface: iface_caps[1].trim().to_string(),
            neighbor: device,
            platform,
            port: iface_caps[2].trim().to_string(),
        }));
    }

    if out.records.is_empty() && out.notes.is_empty() {
        out.notes.push("no cdp neighbors parsed".to_string());
    }
    out
}

fn split_blocks(raw: &str) -> impl Iterator<Item = &str> {
    raw.split("\n-------------------------").flat_map(|b| b.split("\n----------"))
}

/// Normalize a CDP platform string: drop the vendor prefix, trim whitespace.
fn normalize_platform(platform: &str) -> String {
    let trimmed = platform.trim();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("cisco ") {
        trimmed[trimmed.len() - rest.len()..].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDP_SAMPLE: &str = "\
-------------------------
Device ID: core-sw1.example.net
Entry address(es):
  IP address: 10.1.1.254
Platform: cisco WS-C3850-24T,  Capabilities: Router Switch IGMP
Interface: GigabitEthernet0/1,  Port ID (outgoing port): GigabitEthernet1/0/4
Holdtime : 133 sec

-------------------------
Device ID: ap-floor2
Entry address(es):
  IP address: 10.1.20.7
Platform: cisco AIR-CAP3702I-E-K9,  Capabilities: Trans-Bridge
Interface: GigabitEthernet0/12,  Port ID (outgoing port): GigabitEthernet0
Holdtime : 167 sec";

    fn records(out: &ParseOutput) -> Vec<&NeighborRecord> {
        out.records
            .iter()
            .map(|r| match r {
                ParsedRecord::Neighbor(n) => n,
                other => panic!("unexpected record {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_parse_two_neighbors() {
        let out = parse_neighbors(CDP_SAMPLE);
        let recs = records(&out);
        assert_eq!(recs.len(), 2);

        assert_eq!(recs[0].neighbor, "core-sw1.example.net");
        assert_eq!(recs[0].local_interface, "GigabitEthernet0/1");
        assert_eq!(recs[0].port, "GigabitEthernet1/0/4");
        assert_eq!(recs[0].platform, "WS-C3850-24T");

        assert_eq!(recs[1].neighbor, "ap-floor2");
        assert_eq!(recs[1].platform, "AIR-CAP3702I-E-K9");
    }

    #[test]
    fn test_vendor_prefix_stripped_case_insensitively() {
        assert_eq!(normalize_platform("Cisco WS-C2960X-48"), "WS-C2960X-48");
        assert_eq!(normalize_platform(" cisco N9K-C93180YC-EX "), "N9K-C93180YC-EX");
        assert_eq!(normalize_platform("VMware ESX"), "VMware ESX");
    }

    #[test]
    fn test_block_without_interface_is_noted() {
        let out = parse_neighbors("-------------------------\nDevice ID: lonely\nHoldtime : 10 sec");
        assert!(out.records.is_empty());
        assert_eq!(out.notes.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let out = parse_neighbors("");
        assert!(out.records.is_empty());
        assert_eq!(out.notes.len(), 1);
    }
}
