//! Report model: per-device outcomes and the aggregated audit report.
//!
//! Workers never write to shared state; they produce a [`DeviceOutcome`]
//! value carrying everything observed for one device, including its log
//! events. A single [`Aggregator`] collects the outcomes and freezes them
//! into an [`AuditReport`], the one artifact handed to output writers.

use chrono::{DateTime, Local};
use log::warn;
use serde::Serialize;

use crate::error::FailureKind;
use crate::platform::PlatformInfo;

/// One audit target: a network device identified by its address.
///
/// `position` is the device's index in the input list. Duplicate addresses
/// are distinct targets, and the position doubles as the stable sort
/// tiebreak that keeps aggregation order-independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// Hostname or IP address used to reach the device.
    pub address: String,

    /// Optional free-form label from the device list.
    pub label: Option<String>,

    /// Index in the input device list.
    pub position: usize,
}

impl Device {
    /// Create a device with input position 0.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            label: None,
            position: 0,
        }
    }

    /// Set the input-list position.
    pub fn at_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Attach a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Severity of a captured log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => f.write_str("INFO"),
            Severity::Warn => f.write_str("WARNING"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

/// One log line captured while processing a device.
///
/// Events are attached to the device's outcome instead of being written
/// directly, so the log file has a single writer at the end of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    /// When the event happened.
    pub at: DateTime<Local>,

    /// Address of the device the event belongs to.
    pub device: String,

    /// Event severity.
    pub severity: Severity,

    /// Human-readable message.
    pub message: String,
}

impl LogEvent {
    /// Create an event timestamped now.
    pub fn now(device: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            at: Local::now(),
            device: device.into(),
            severity,
            message: message.into(),
        }
    }
}

/// Discovered CDP neighbor attached to an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbor {
    /// Neighbor device name (CDP Device ID).
    pub device: String,

    /// Normalized neighbor platform string.
    pub platform: String,

    /// Remote port the neighbor sees us on.
    pub port: String,
}

/// One interface row of the final report.
///
/// The owning device is carried by the surrounding [`DeviceResult`], not
/// duplicated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceRecord {
    /// Interface name as the device printed it.
    pub interface: String,

    /// Assigned IP address, if any.
    pub ip_address: Option<String>,

    /// Normalized admin status ("up", "down", "administratively down").
    pub admin_status: String,

    /// Normalized line-protocol status ("up", "down").
    pub protocol_status: String,

    /// Merged neighbor data, when CDP discovered one on this interface.
    pub neighbor: Option<Neighbor>,
}

impl InterfaceRecord {
    /// Create a record with no IP and no neighbor.
    pub fn new(
        interface: impl Into<String>,
        admin_status: impl Into<String>,
        protocol_status: impl Into<String>,
    ) -> Self {
        Self {
            interface: interface.into(),
            ip_address: None,
            admin_status: admin_status.into(),
            protocol_status: protocol_status.into(),
            neighbor: None,
        }
    }
}

/// A neighbor discovered on a local interface, before merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborRecord {
    /// Local interface the neighbor was discovered on.
    pub local_interface: String,

    /// Neighbor device name.
    pub neighbor: String,

    /// Normalized neighbor platform string.
    pub platform: String,

    /// Remote port identifier.
    pub port: String,
}

/// Facts extracted from `show version`-class output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceFacts {
    /// Configured hostname, empty when not found.
    pub hostname: String,

    /// Hardware model, empty when not found.
    pub model: String,

    /// OS version string, empty when not found.
    pub version: String,
}

/// Successful audit of one device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceResult {
    pub device: Device,
    pub platform: PlatformInfo,
    pub facts: DeviceFacts,
    pub interfaces: Vec<InterfaceRecord>,
    pub events: Vec<LogEvent>,
}

/// Terminal failure of one device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceFailure {
    pub device: Device,
    pub kind: FailureKind,
    pub detail: String,
    pub events: Vec<LogEvent>,
}

/// Exactly one of these exists per input device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceOutcome {
    Result(DeviceResult),
    Failure(DeviceFailure),
}

impl DeviceOutcome {
    /// The device this outcome belongs to.
    pub fn device(&self) -> &Device {
        match self {
            DeviceOutcome::Result(r) => &r.device,
            DeviceOutcome::Failure(f) => &f.device,
        }
    }

    /// Log events captured while producing this outcome.
    pub fn events(&self) -> &[LogEvent] {
        match self {
            DeviceOutcome::Result(r) => &r.events,
            DeviceOutcome::Failure(f) => &f.events,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DeviceOutcome::Failure(_))
    }
}

/// The frozen set of per-device outcomes for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditReport {
    /// Run start time, used to name both output files.
    pub started_at: DateTime<Local>,

    /// One entry per input device, sorted by (address, input position).
    entries: Vec<DeviceOutcome>,
}

impl AuditReport {
    /// All entries, in stable sorted order.
    pub fn entries(&self) -> &[DeviceOutcome] {
        &self.entries
    }

    /// Number of audited devices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of devices that failed.
    pub fn failure_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_failure()).count()
    }

    /// Filename fragment derived from the run start time.
    pub fn timestamp_slug(&self) -> String {
        self.started_at.format("%Y-%m-%d_%H-%M-%S").to_string()
    }
}

/// Collects worker outcomes and freezes them into an [`AuditReport`].
///
/// Collection is additive and commutative: the frozen report is identical
/// no matter what order outcomes arrive in, because `finish` sorts by the
/// stable key (device address, input position).
pub struct Aggregator {
    started_at: DateTime<Local>,
    expected: usize,
    entries: Vec<DeviceOutcome>,
}

impl Aggregator {
    /// Create an aggregator expecting one outcome per input device.
    pub fn new(started_at: DateTime<Local>, expected: usize) -> Self {
        Self {
            started_at,
            expected,
            entries: Vec::with_capacity(expected),
        }
    }

    /// Add one device outcome.
    pub fn collect(&mut self, outcome: DeviceOutcome) {
        self.entries.push(outcome);
    }

    /// Freeze the report. Logs a warning if the entry count does not match
    /// the number of input devices.
    pub fn finish(mut self) -> AuditReport {
        if self.entries.len() != self.expected {
            warn!(
                "report has {} entries for {} devices",
                self.entries.len(),
                self.expected
            );
        }
        self.entries.sort_by(|a, b| {
            let ka = (&a.device().address, a.device().position);
            let kb = (&b.device().address, b.device().position);
            ka.cmp(&kb)
        });
        AuditReport {
            started_at: self.started_at,
            entries: self.entries,
        }
    }
}

/// Canonicalize an interface identifier for neighbor matching.
///
/// Devices abbreviate interface names inconsistently between commands
/// (`Gi0/1` in CDP output vs `GigabitEthernet0/1` in interface listings),
/// so merging keys on the expanded, lowercased form.
pub fn canonical_interface_id(name: &str) -> String {
    let trimmed = name.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_alphabetic() && c != '-')
        .unwrap_or(trimmed.len());
    let (prefix, rest) = trimmed.split_at(split);

    let lower = prefix.to_ascii_lowercase();
    let full = match lower.as_str() {
        "gi" | "gig" | "gigabitethernet" => "gigabitethernet",
        "te" | "ten" | "tengigabitethernet" | "tengige" => "tengigabitethernet",
        "twe" | "twentyfivegige" => "twentyfivegige",
        "fo" | "fortygige" | "fortygigabitethernet" => "fortygigabitethernet",
        "hu" | "hundredgige" | "hundredgigabitethernet" => "hundredgige",
        "fa" | "fas" | "fastethernet" => "fastethernet",
        "et" | "eth" | "ethernet" => "ethernet",
        "po" | "port-channel" => "port-channel",
        "lo" | "loopback" => "loopback",
        "vl" | "vlan" => "vlan",
        "se" | "serial" => "serial",
        "tu" | "tunnel" => "tunnel",
        other => other,
    };

    format!("{}{}", full, rest.trim())
}

/// Merge discovered neighbors into the interface records they belong to.
///
/// Matching is by canonical interface ID. Neighbors whose local interface
/// has no interface record still surface as their own row with empty status
/// fields, so nothing discovered is silently dropped.
pub fn merge_neighbors(
    mut interfaces: Vec<InterfaceRecord>,
    neighbors: Vec<NeighborRecord>,
) -> Vec<InterfaceRecord> {
    let mut unmatched: Vec<NeighborRecord> = Vec::new();

    for neighbor in neighbors {
        let key = canonical_interface_id(&neighbor.local_interface);
        let slot = interfaces
            .iter_mut()
            .find(|i| i.neighbor.is_none() && canonical_interface_id(&i.interface) == key);

        match slot {
            Some(record) => {
                record.neighbor = Some(Neighbor {
                    device: neighbor.neighbor,
                    platform: neighbor.platform,
                    port: neighbor.port,
                });
            }
            None => unmatched.push(neighbor),
        }
    }

    for neighbor in unmatched {
        interfaces.push(InterfaceRecord {
            interface: neighbor.local_interface.clone(),
            ip_address: None,
            admin_status: String::new(),
            protocol_status: String::new(),
            neighbor: Some(Neighbor {
                device: neighbor.neighbor,
                platform: neighbor.platform,
                port: neighbor.port,
            }),
        });
    }

    interfaces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PlatformFamily, PlatformInfo};

    fn result_outcome(address: &str, position: usize) -> DeviceOutcome {
        DeviceOutcome::Result(DeviceResult {
            device: Device::new(address).at_position(position),
            platform: PlatformInfo::new(PlatformFamily::Ios, "15.2(4)M7"),
            facts: DeviceFacts::default(),
            interfaces: vec![],
            events: vec![],
        })
    }

    fn failure_outcome(address: &str, position: usize) -> DeviceOutcome {
        DeviceOutcome::Failure(DeviceFailure {
            device: Device::new(address).at_position(position),
            kind: FailureKind::ConnectTimeout,
            detail: "timed out".to_string(),
            events: vec![],
        })
    }

    #[test]
    fn test_canonical_interface_id() {
        assert_eq!(canonical_interface_id("Gi0/1"), "gigabitethernet0/1");
        assert_eq!(
            canonical_interface_id("GigabitEthernet0/1"),
            "gigabitethernet0/1"
        );
        assert_eq!(canonical_interface_id("Te1/0/1"), "tengigabitethernet1/0/1");
        assert_eq!(canonical_interface_id("Eth1/1"), "ethernet1/1");
        assert_eq!(canonical_interface_id("Po10"), "port-channel10");
        assert_eq!(canonical_interface_id("Fo1/1/1"), "fortygigabitethernet1/1/1");
        assert_eq!(
            canonical_interface_id("FortyGigabitEthernet1/1/1"),
            "fortygigabitethernet1/1/1"
        );
        assert_eq!(canonical_interface_id("Hu1/0/25"), "hundredgige1/0/25");
        assert_eq!(canonical_interface_id("HundredGigE1/0/25"), "hundredgige1/0/25");
        assert_eq!(canonical_interface_id("Vlan100"), "vlan100");
        // Unknown prefixes pass through lowercased
        assert_eq!(canonical_interface_id("Foo0/0"), "foo0/0");
    }

    #[test]
    fn test_merge_matching_neighbor() {
        let interfaces = vec![
            InterfaceRecord::new("GigabitEthernet0/1", "up", "up"),
            InterfaceRecord::new("GigabitEthernet0/2", "down", "down"),
        ];
        let neighbors = vec![NeighborRecord {
            local_interface: "Gi0/1".to_string(),
            neighbor: "core-sw1".to_string(),
            platform: "WS-C3850-24T".to_string(),
            port: "Gi1/0/4".to_string(),
        }];

        let merged = merge_neighbors(interfaces, neighbors);
        assert_eq!(merged.len(), 2);

        let gi1 = &merged[0];
        assert_eq!(gi1.admin_status, "up");
        let n = gi1.neighbor.as_ref().unwrap();
        assert_eq!(n.device, "core-sw1");
        assert_eq!(n.platform, "WS-C3850-24T");

        assert!(merged[1].neighbor.is_none());
    }

    #[test]
    fn test_merge_unmatched_neighbor_kept_as_own_row() {
        let interfaces = vec![InterfaceRecord::new("GigabitEthernet0/1", "up", "up")];
        let neighbors = vec![NeighborRecord {
            local_interface: "Gi0/5".to_string(),
            neighbor: "phone-1".to_string(),
            platform: "CP-8841".to_string(),
            port: "Port 1".to_string(),
        }];

        let merged = merge_neighbors(interfaces, neighbors);
        assert_eq!(merged.len(), 2);

        let extra = &merged[1];
        assert_eq!(extra.interface, "Gi0/5");
        assert!(extra.admin_status.is_empty());
        assert_eq!(extra.neighbor.as_ref().unwrap().device, "phone-1");
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let started = Local::now();
        let outcomes = vec![
            result_outcome("10.0.0.3", 2),
            failure_outcome("10.0.0.1", 0),
            result_outcome("10.0.0.2", 1),
            // duplicate address, distinct target
            failure_outcome("10.0.0.2", 3),
        ];

        let mut forward = Aggregator::new(started, outcomes.len());
        for o in outcomes.iter().cloned() {
            forward.collect(o);
        }

        let mut reversed = Aggregator::new(started, outcomes.len());
        for o in outcomes.iter().rev().cloned() {
            reversed.collect(o);
        }

        assert_eq!(forward.finish(), reversed.finish());
    }

    #[test]
    fn test_report_counts() {
        let started = Local::now();
        let mut agg = Aggregator::new(started, 3);
        agg.collect(result_outcome("a", 0));
        agg.collect(failure_outcome("b", 1));
        agg.collect(result_outcome("c", 2));

        let report = agg.finish();
        assert_eq!(report.len(), 3);
        assert_eq!(report.failure_count(), 1);
        assert!(!report.is_empty());
    }
}
