//! Parser for interface status listings.
//!
//! Handles the two layouts that show up across the supported families:
//!
//! - the `show ip interface brief` table (IOS/IOS-XE/ASA, and the NX-OS
//!   variant with its combined `protocol-up/link-up/admin-up` column)
//! - the prose form `GigabitEthernet0/1 is up, line protocol is up`

use std::sync::LazyLock;

use regex::Regex;

use super::{ParseOutput, ParsedRecord};
use crate::report::InterfaceRecord;

static PROSE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+) is (administratively down|up|down), line protocol is (up|down)").unwrap()
});

static IP_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,3}\.){3}\d{1,3}$|^unassigned$").unwrap());

/// Parse interface status output into [`InterfaceRecord`]s.
pub fn parse_interfaces(raw: &str) -> ParseOutput {
    let mut out = ParseOutput::new();

    for line in raw.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = PROSE_LINE.captures(line.trim_start()) {
            let admin = match &caps[2] {
                "administratively down" => "administratively down",
                "up" => "up",
                _ => "down",
            };
            out.records.push(ParsedRecord::Interface(InterfaceRecord::new(
                &caps[1], admin, &caps[3],
            )));
            continue;
        }

        if let Some(record) = parse_table_row(line) {
            out.records.push(ParsedRecord::Interface(record));
        }
    }

    if out.records.is_empty() {
        out.notes.push("no interface records parsed".to_string());
    }
    out
}

/// Parse one table row, or None for headers and unrecognized lines.
fn parse_table_row(line: &str) -> Option<InterfaceRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() || tokens[0].eq_ignore_ascii_case("interface") {
        return None;
    }

    // NX-OS combined status column: "protocol-up/link-up/admin-up"
    if tokens.len() == 3 && tokens[2].contains("protocol-") {
        let (admin, protocol) = split_nxos_status(tokens[2]);
        let mut record = InterfaceRecord::new(tokens[0], admin, protocol);
        record.ip_address = ip_field(tokens[1]);
        return Some(record);
    }

    // IOS brief layout: Interface IP-Address OK? Method Status Protocol.
    // "administratively down" makes the status span two tokens.
    if tokens.len() >= 6 && IP_LIKE.is_match(tokens[1]) {
        let protocol = *tokens.last()?;
        if protocol != "up" && protocol != "down" {
            return None;
        }
        let status = tokens[4..tokens.len() - 1].join(" ");
        let admin = normalize_status(&status)?;

        let mut record = InterfaceRecord::new(tokens[0], admin, protocol);
        record.ip_address = ip_field(tokens[1]);
        return Some(record);
    }

    None
}

fn split_nxos_status(combined: &str) -> (String, String) {
    let mut admin = String::new();
    let mut protocol = String::new();
    for part in combined.split('/') {
        if let Some(v) = part.strip_prefix("admin-") {
            admin = if v == "down" {
                "administratively down".to_string()
            } else {
                v.to_string()
            };
        } else if let Some(v) = part.strip_prefix("protocol-") {
            protocol = v.to_string();
        }
    }
    (admin, protocol)
}

fn normalize_status(status: &str) -> Option<&'static str> {
    match status {
        "up" => Some("up"),
        "down" => Some("down"),
        "administratively down" | "admin-down" => Some("administratively down"),
        _ => None,
    }
}

fn ip_field(token: &str) -> Option<String> {
    if token == "unassigned" {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRIEF_SAMPLE: &str = "\
Interface                  IP-Address      OK? Method Status                Protocol
GigabitEthernet0/1         10.1.1.1        YES NVRAM  up                    up
GigabitEthernet0/2         unassigned      YES unset  administratively down down
Vlan100                    10.1.100.1      YES NVRAM  down                  down";

    const NXOS_SAMPLE: &str = "\
IP Interface Status for VRF \"default\"(1)
Interface            IP Address      Interface Status
Eth1/1               10.2.0.1        protocol-up/link-up/admin-up
Eth1/2               10.2.0.5        protocol-down/link-down/admin-down";

    fn records(out: &ParseOutput) -> Vec<&InterfaceRecord> {
        out.records
            .iter()
            .map(|r| match r {
                ParsedRecord::Interface(i) => i,
                other => panic!("unexpected record {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_prose_line() {
        let out = parse_interfaces("Gi0/1 is up, line protocol is up");
        let recs = records(&out);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].interface, "Gi0/1");
        assert_eq!(recs[0].admin_status, "up");
        assert_eq!(recs[0].protocol_status, "up");
    }

    #[test]
    fn test_brief_table() {
        let out = parse_interfaces(BRIEF_SAMPLE);
        let recs = records(&out);
        assert_eq!(recs.len(), 3);

        assert_eq!(recs[0].interface, "GigabitEthernet0/1");
        assert_eq!(recs[0].ip_address.as_deref(), Some("10.1.1.1"));
        assert_eq!(recs[0].admin_status, "up");
        assert_eq!(recs[0].protocol_status, "up");

        assert_eq!(recs[1].admin_status, "administratively down");
        assert_eq!(recs[1].protocol_status, "down");
        assert!(recs[1].ip_address.is_none());

        assert_eq!(recs[2].admin_status, "down");
    }

    #[test]
    fn test_nxos_combined_status() {
        let out = parse_interfaces(NXOS_SAMPLE);
        let recs = records(&out);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].interface, "Eth1/1");
        assert_eq!(recs[0].admin_status, "up");
        assert_eq!(recs[1].admin_status, "administratively down");
        assert_eq!(recs[1].protocol_status, "down");
    }

    #[test]
    fn test_truncated_table_is_skipped() {
        // Row cut off mid-way: too few columns, must not produce a record
        let out = parse_interfaces("GigabitEthernet0/1         10.1.1.1        YES");
        assert!(out.records.is_empty());
        assert_eq!(out.notes.len(), 1);
    }

    #[test]
    fn test_empty_input_notes() {
        let out = parse_interfaces("");
        assert!(out.records.is_empty());
        assert!(!out.notes.is_empty());
    }
}
