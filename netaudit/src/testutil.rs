//! Scriptable fake transport for worker and engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Credentials;
use crate::error::TransportError;
use crate::report::Device;
use crate::transport::{Session, Transport};

pub(crate) const IOS_VERSION_OUTPUT: &str = "\
Cisco IOS Software, C2960 Software (C2960-LANBASEK9-M), Version 15.2(4)E10, RELEASE SOFTWARE (fc2)

core-sw1 uptime is 2 years, 11 weeks, 4 days

cisco WS-C2960-24TT-L (PowerPC405) processor (revision B0) with 65536K bytes of memory.
Model number                    : WS-C2960-24TT-L
";

pub(crate) const IOS_INTERFACES_OUTPUT: &str = "\
Interface                  IP-Address      OK? Method Status                Protocol
GigabitEthernet0/1         10.1.1.1        YES NVRAM  up                    up
GigabitEthernet0/2         unassigned      YES unset  administratively down down
";

pub(crate) const IOS_CDP_OUTPUT: &str = "\
-------------------------
Device ID: core-sw1.example.net
Platform: cisco WS-C3850-24T,  Capabilities: Router Switch IGMP
Interface: GigabitEthernet0/1,  Port ID (outgoing port): GigabitEthernet1/0/4
Holdtime : 133 sec
";

/// How a fake device's `open` fails.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FakeOpenError {
    Timeout,
    Auth,
}

/// Scripted response for one command.
#[derive(Debug, Clone)]
pub(crate) enum FakeResponse {
    /// Return this output.
    Ok(String),

    /// The device rejects the command.
    Fail,

    /// The command exceeds its timeout.
    Timeout,

    /// The session drops mid-command.
    Disconnect,

    /// The command handler panics, like a buggy parser downstream.
    Panic,
}

/// Script for one device behind the fake transport.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeDevice {
    open_error: Option<FakeOpenError>,
    responses: HashMap<String, FakeResponse>,
}

impl FakeDevice {
    /// A device with no scripted responses; unknown commands return empty
    /// output.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A healthy IOS device answering the full built-in IOS profile.
    pub(crate) fn healthy_ios() -> Self {
        Self::new()
            .with_response("show version", FakeResponse::Ok(IOS_VERSION_OUTPUT.to_string()))
            .with_response(
                "show ip interface brief",
                FakeResponse::Ok(IOS_INTERFACES_OUTPUT.to_string()),
            )
            .with_response(
                "show cdp neighbors detail",
                FakeResponse::Ok(IOS_CDP_OUTPUT.to_string()),
            )
    }

    /// A device whose `open` fails.
    pub(crate) fn failing_open(error: FakeOpenError) -> Self {
        Self {
            open_error: Some(error),
            responses: HashMap::new(),
        }
    }

    /// Script a response for one command.
    pub(crate) fn with_response(mut self, command: &str, response: FakeResponse) -> Self {
        self.responses.insert(command.to_string(), response);
        self
    }
}

/// Fake [`Transport`] with per-address scripts and concurrency accounting.
pub(crate) struct FakeTransport {
    devices: HashMap<String, FakeDevice>,
    exec_delay: Duration,
    current_open: Arc<AtomicUsize>,
    max_open: Arc<AtomicUsize>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self {
            devices: HashMap::new(),
            exec_delay: Duration::ZERO,
            current_open: Arc::new(AtomicUsize::new(0)),
            max_open: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_device(mut self, address: &str, device: FakeDevice) -> Self {
        self.devices.insert(address.to_string(), device);
        self
    }

    /// Delay every exec, giving sessions time to overlap.
    pub(crate) fn with_exec_delay(mut self, delay: Duration) -> Self {
        self.exec_delay = delay;
        self
    }

    /// Highest number of sessions that were open at the same instant.
    pub(crate) fn max_concurrent_sessions(&self) -> usize {
        self.max_open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn open(
        &self,
        device: &Device,
        _credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Box<dyn Session>, TransportError> {
        let script = self
            .devices
            .get(&device.address)
            .cloned()
            .unwrap_or_else(FakeDevice::new);

        if let Some(error) = script.open_error {
            return Err(match error {
                FakeOpenError::Timeout => TransportError::ConnectTimeout(timeout),
                FakeOpenError::Auth => TransportError::AuthenticationFailed {
                    user: "admin".to_string(),
                },
            });
        }

        let open = self.current_open.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open.fetch_max(open, Ordering::SeqCst);

        Ok(Box::new(FakeSession {
            responses: script.responses,
            exec_delay: self.exec_delay,
            current_open: self.current_open.clone(),
        }))
    }
}

struct FakeSession {
    responses: HashMap<String, FakeResponse>,
    exec_delay: Duration,
    current_open: Arc<AtomicUsize>,
}

#[async_trait]
impl Session for FakeSession {
    async fn exec(&mut self, command: &str, timeout: Duration) -> Result<String, TransportError> {
        if !self.exec_delay.is_zero() {
            tokio::time::sleep(self.exec_delay).await;
        }

        match self.responses.get(command) {
            Some(FakeResponse::Ok(output)) => Ok(output.clone()),
            Some(FakeResponse::Fail) => Err(TransportError::CommandFailed {
                command: command.to_string(),
                message: "% Invalid input".to_string(),
            }),
            Some(FakeResponse::Timeout) => Err(TransportError::CommandTimeout {
                command: command.to_string(),
                timeout,
            }),
            Some(FakeResponse::Disconnect) => Err(TransportError::Disconnected),
            Some(FakeResponse::Panic) => panic!("scripted fault in '{}'", command),
            None => Ok(String::new()),
        }
    }

    async fn close(self: Box<Self>) -> Result<(), TransportError> {
        Ok(())
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.current_open.fetch_sub(1, Ordering::SeqCst);
    }
}
