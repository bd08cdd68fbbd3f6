//! CSV report writer.

use std::path::Path;

use serde::Serialize;

use crate::error::OutputError;
use crate::report::{AuditReport, DeviceFailure, DeviceOutcome, DeviceResult};

/// Placeholder for fields with no value.
const NA: &str = "N/A";

/// One flattened CSV row.
///
/// Field order is the column order in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct CsvRow {
    hostname: String,
    ip_address: String,
    model: String,
    version: String,
    status: String,
    interface: String,
    interface_ip: String,
    interface_status: String,
    protocol_status: String,
    neighbor_device: String,
    neighbor_platform: String,
    neighbor_interface: String,
}

/// Write the report to `path` as CSV.
pub fn write_csv(report: &AuditReport, path: &Path) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows_for_report(report) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Flatten the report into rows. Every device contributes at least one row.
pub(crate) fn rows_for_report(report: &AuditReport) -> Vec<CsvRow> {
    let mut rows = Vec::new();
    for entry in report.entries() {
        match entry {
            DeviceOutcome::Result(result) => rows.extend(result_rows(result)),
            DeviceOutcome::Failure(failure) => rows.push(failure_row(failure)),
        }
    }
    rows
}

fn result_rows(result: &DeviceResult) -> Vec<CsvRow> {
    let hostname = non_empty(&result.facts.hostname);
    let model = non_empty(&result.facts.model);
    let version = non_empty(&result.facts.version);
    let address = result.device.address.clone();

    if result.interfaces.is_empty() {
        // A device with nothing to list still gets a summary row.
        return vec![CsvRow {
            hostname,
            ip_address: address,
            model,
            version,
            status: "OK".to_string(),
            interface: NA.to_string(),
            interface_ip: NA.to_string(),
            interface_status: NA.to_string(),
            protocol_status: NA.to_string(),
            neighbor_device: NA.to_string(),
            neighbor_platform: NA.to_string(),
            neighbor_interface: NA.to_string(),
        }];
    }

    result
        .interfaces
        .iter()
        .map(|iface| {
            let (neighbor_device, neighbor_platform, neighbor_interface) = match &iface.neighbor {
                Some(n) => (n.device.clone(), n.platform.clone(), n.port.clone()),
                None => (NA.to_string(), NA.to_string(), NA.to_string()),
            };
            CsvRow {
                hostname: hostname.clone(),
                ip_address: address.clone(),
                model: model.clone(),
                version: version.clone(),
                status: "OK".to_string(),
                interface: iface.interface.clone(),
                interface_ip: iface
                    .ip_address
                    .clone()
                    .unwrap_or_else(|| NA.to_string()),
                interface_status: non_empty(&iface.admin_status),
                protocol_status: non_empty(&iface.protocol_status),
                neighbor_device,
                neighbor_platform,
                neighbor_interface,
            }
        })
        .collect()
}

fn failure_row(failure: &DeviceFailure) -> CsvRow {
    CsvRow {
        hostname: NA.to_string(),
        ip_address: failure.device.address.clone(),
        model: NA.to_string(),
        version: NA.to_string(),
        status: failure.kind.status_text().to_string(),
        interface: NA.to_string(),
        interface_ip: NA.to_string(),
        interface_status: NA.to_string(),
        protocol_status: NA.to_string(),
        neighbor_device: NA.to_string(),
        neighbor_platform: NA.to_string(),
        neighbor_interface: NA.to_string(),
    }
}

fn non_empty(value: &str) -> String {
    if value.is_empty() {
        NA.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    use crate::error::FailureKind;
    use crate::platform::{PlatformFamily, PlatformInfo};
    use crate::report::{
        Aggregator, Device, DeviceFacts, InterfaceRecord, Neighbor,
    };

    fn sample_result(address: &str, interfaces: Vec<InterfaceRecord>) -> DeviceOutcome {
        DeviceOutcome::Result(DeviceResult {
            device: Device::new(address),
            platform: PlatformInfo::new(PlatformFamily::Ios, "15.2(4)E10"),
            facts: DeviceFacts {
                hostname: "core-sw1".to_string(),
                model: "WS-C2960-24TT-L".to_string(),
                version: "15.2(4)E10".to_string(),
            },
            interfaces,
            events: vec![],
        })
    }

    fn report_of(outcomes: Vec<DeviceOutcome>) -> AuditReport {
        let mut agg = Aggregator::new(Local::now(), outcomes.len());
        for o in outcomes {
            agg.collect(o);
        }
        agg.finish()
    }

    #[test]
    fn test_one_row_per_interface() {
        let mut iface = InterfaceRecord::new("GigabitEthernet0/1", "up", "up");
        iface.ip_address = Some("10.1.1.1".to_string());
        iface.neighbor = Some(Neighbor {
            device: "dist-sw2".to_string(),
            platform: "WS-C3850-24T".to_string(),
            port: "Gi1/0/4".to_string(),
        });
        let bare = InterfaceRecord::new("GigabitEthernet0/2", "administratively down", "down");

        let report = report_of(vec![sample_result("10.0.0.1", vec![iface, bare])]);
        let rows = rows_for_report(&report);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].hostname, "core-sw1");
        assert_eq!(rows[0].ip_address, "10.0.0.1");
        assert_eq!(rows[0].status, "OK");
        assert_eq!(rows[0].interface_ip, "10.1.1.1");
        assert_eq!(rows[0].neighbor_device, "dist-sw2");
        assert_eq!(rows[0].neighbor_interface, "Gi1/0/4");

        assert_eq!(rows[1].interface_ip, "N/A");
        assert_eq!(rows[1].interface_status, "administratively down");
        assert_eq!(rows[1].neighbor_device, "N/A");
    }

    #[test]
    fn test_device_without_interfaces_gets_summary_row() {
        let report = report_of(vec![sample_result("10.0.0.1", vec![])]);
        let rows = rows_for_report(&report);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, "OK");
        assert_eq!(rows[0].interface, "N/A");
        assert_eq!(rows[0].hostname, "core-sw1");
    }

    #[test]
    fn test_failure_row_carries_status_text() {
        let report = report_of(vec![DeviceOutcome::Failure(DeviceFailure {
            device: Device::new("10.0.0.9"),
            kind: FailureKind::AuthFailure,
            detail: "bad password".to_string(),
            events: vec![],
        })]);
        let rows = rows_for_report(&report);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ip_address, "10.0.0.9");
        assert_eq!(rows[0].status, "Authentication Failed");
        assert_eq!(rows[0].hostname, "N/A");
    }
}
