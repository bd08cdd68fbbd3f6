//! Parser for `show version`-class output.

use std::sync::LazyLock;

use regex::Regex;

use super::{ParseOutput, ParsedRecord};
use crate::report::DeviceFacts;

static HOSTNAME_UPTIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\S+) uptime is").unwrap());

static HOSTNAME_NXOS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Device name:\s*(\S+)").unwrap());

static MODEL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Model\s+[Nn]umber\s*:\s*(\S+)").unwrap());

static MODEL_PROCESSOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[Cc]isco\s+(\S+)\s.*(?:processor|chassis)").unwrap());

static VERSION_GENERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Version ([^,\s\]]+)").unwrap());

static VERSION_NXOS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:NXOS|system):\s+version\s+(\S+)").unwrap());

/// Extract hostname, model, and OS version from version output.
///
/// Fields that cannot be found are left empty; when nothing at all is
/// found, the output carries a note instead of an empty record.
pub fn parse_version(raw: &str) -> ParseOutput {
    let mut out = ParseOutput::new();

    let hostname = first_capture(&[&HOSTNAME_UPTIME, &HOSTNAME_NXOS], raw);
    let model = first_capture(&[&MODEL_NUMBER, &MODEL_PROCESSOR], raw);
    let version = first_capture(&[&VERSION_NXOS, &VERSION_GENERIC], raw);

    if hostname.is_empty() && model.is_empty() && version.is_empty() {
        return ParseOutput::noted("no version facts recognized in output");
    }

    if hostname.is_empty() {
        out.notes.push("hostname not found in version output".to_string());
    }

    out.records.push(ParsedRecord::Facts(DeviceFacts {
        hostname,
        model,
        version,
    }));
    out
}

fn first_capture(patterns: &[&LazyLock<Regex>], text: &str) -> String {
    patterns
        .iter()
        .find_map(|p| p.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
