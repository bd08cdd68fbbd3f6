//! Per-device unit of work.
//!
//! One worker takes a device end to end: open a session, detect the
//! platform, run the profile commands, parse, and produce exactly one
//! [`DeviceOutcome`]. Command- and parse-level problems are absorbed here;
//! only a dead connection or a fully failed profile terminates the device.

use log::{error, info, warn};

use crate::config::{AuditConfig, Credentials};
use crate::error::{FailureKind, TransportError};
use crate::parse::{self, ParsedRecord};
use crate::platform::{self, ProfileRegistry};
use crate::report::{
    merge_neighbors, Device, DeviceFacts, DeviceFailure, DeviceOutcome, DeviceResult,
    InterfaceRecord, LogEvent, NeighborRecord, Severity,
};
use crate::transport::{Session, Transport};

/// Audit one device and produce its terminal outcome.
///
/// Never returns an error: every failure mode is folded into a
/// [`DeviceFailure`] carrying the events observed up to that point.
pub async fn run_device(
    transport: &dyn Transport,
    device: Device,
    credentials: &Credentials,
    registry: &ProfileRegistry,
    config: &AuditConfig,
) -> DeviceOutcome {
    let mut log = WorkerLog::new(&device.address);

    log.info("connecting");
    let mut session = match transport
        .open(&device, credentials, config.connect_timeout)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            let kind = FailureKind::from_connect_error(&e);
            log.error(format!("connection failed: {}", e));
            return DeviceOutcome::Failure(DeviceFailure {
                device,
                kind,
                detail: e.to_string(),
                events: log.into_events(),
            });
        }
    };
    log.info("connected");

    let platform = match platform::detect(session.as_mut(), config.command_timeout).await {
        Ok(platform) => platform,
        Err(e) => {
            log.error(format!("platform probe failed: {}", e));
            close_quietly(session, &device.address).await;
            return DeviceOutcome::Failure(DeviceFailure {
                device,
                kind: FailureKind::CommandError,
                detail: format!("platform probe failed: {}", e),
                events: log.into_events(),
            });
        }
    };
    log.info(format!(
        "detected platform {} (version '{}')",
        platform.family, platform.version
    ));

    let profile = registry.resolve(&platform);
    let total = profile.len();

    let mut facts: Option<DeviceFacts> = None;
    let mut interfaces: Vec<InterfaceRecord> = Vec::new();
    let mut neighbors: Vec<NeighborRecord> = Vec::new();
    let mut succeeded = 0usize;

    for (i, entry) in profile.entries().iter().enumerate() {
        log.info(format!("running command {}/{}: {}", i + 1, total, entry.command));

        let output = match session.exec(&entry.command, config.command_timeout).await {
            Ok(output) => output,
            Err(TransportError::Disconnected) => {
                log.error(format!("session lost during '{}'", entry.command));
                return DeviceOutcome::Failure(DeviceFailure {
                    device,
                    kind: FailureKind::CommandError,
                    detail: format!("session lost during '{}'", entry.command),
                    events: log.into_events(),
                });
            }
            Err(e) => {
                // Command-level fault tolerance: skip this command's
                // records and keep going with the rest of the profile.
                log.error(format!("command failed: {}", e));
                continue;
            }
        };

        succeeded += 1;
        let parsed = parse::parse(entry.parser, &output);
        for note in &parsed.notes {
            log.warn(format!("{}: {}", entry.parser, note));
        }

        for record in parsed.records {
            match record {
                ParsedRecord::Facts(f) => {
                    facts.get_or_insert(f);
                }
                ParsedRecord::Interface(i) => interfaces.push(i),
                ParsedRecord::Neighbor(n) => neighbors.push(n),
            }
        }
        log.info(format!("command {}/{} succeeded", i + 1, total));
    }

    close_quietly(session, &device.address).await;

    if succeeded == 0 {
        log.error(format!("all {} commands failed", total));
        return DeviceOutcome::Failure(DeviceFailure {
            device,
            kind: FailureKind::CommandError,
            detail: format!("all {} commands failed", total),
            events: log.into_events(),
        });
    }

    let interfaces = merge_neighbors(interfaces, neighbors);
    log.info(format!("audit complete, {} interface records", interfaces.len()));

    DeviceOutcome::Result(DeviceResult {
        device,
        platform,
        facts: facts.unwrap_or_default(),
        interfaces,
        events: log.into_events(),
    })
}

async fn close_quietly(session: Box<dyn Session>, address: &str) {
    if let Err(e) = session.close().await {
        warn!("{}: error closing session: {}", address, e);
    }
}

/// Captures per-device log events and mirrors them to the process logger.
struct WorkerLog {
    device: String,
    events: Vec<LogEvent>,
}

impl WorkerLog {
    fn new(device: &str) -> Self {
        Self {
            device: device.to_string(),
            events: Vec::new(),
        }
    }

    fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}: {}", self.device, message);
        self.events
            .push(LogEvent::now(&self.device, Severity::Info, message));
    }

    fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}: {}", self.device, message);
        self.events
            .push(LogEvent::now(&self.device, Severity::Warn, message));
    }

    fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{}: {}", self.device, message);
        self.events
            .push(LogEvent::now(&self.device, Severity::Error, message));
    }

    fn into_events(self) -> Vec<LogEvent> {
        self.events
    }
}
