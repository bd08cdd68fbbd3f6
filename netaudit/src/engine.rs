//! Bounded worker pool fanning devices out and outcomes back in.
//!
//! Each device runs in its own task; a semaphore caps how many hold an open
//! session at once. All outcomes flow through one channel into a single
//! aggregating consumer, so no worker ever touches shared mutable state.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Local;
use futures_util::FutureExt;
use log::{error, info};
use tokio::sync::{mpsc, Semaphore};

use crate::config::{AuditConfig, Credentials};
use crate::error::FailureKind;
use crate::platform::ProfileRegistry;
use crate::report::{
    Aggregator, AuditReport, Device, DeviceFailure, DeviceOutcome, LogEvent, Severity,
};
use crate::transport::Transport;
use crate::worker::run_device;

/// The concurrent device-audit engine.
pub struct AuditEngine {
    transport: Arc<dyn Transport>,
    registry: Arc<ProfileRegistry>,
    config: AuditConfig,
}

impl AuditEngine {
    /// Create an engine with the built-in profile registry.
    pub fn new(transport: Arc<dyn Transport>, config: AuditConfig) -> Self {
        Self {
            transport,
            registry: Arc::new(ProfileRegistry::builtin()),
            config,
        }
    }

    /// Replace the profile registry.
    pub fn with_registry(mut self, registry: ProfileRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Audit every device and return the frozen report.
    ///
    /// Guarantees exactly one report entry per input device. A panic inside
    /// one worker task is caught at the pool boundary and becomes that
    /// device's failure; it never affects the other devices or the run.
    pub async fn run(&self, devices: Vec<Device>, credentials: Credentials) -> AuditReport {
        let started = Local::now();
        let total = devices.len();
        let mut aggregator = Aggregator::new(started, total);

        if devices.is_empty() {
            return aggregator.finish();
        }

        info!(
            "auditing {} devices with pool size {}",
            total, self.config.pool_size
        );

        let credentials = Arc::new(credentials);
        let semaphore = Arc::new(Semaphore::new(self.config.pool_size));
        let (tx, mut rx) = mpsc::channel::<DeviceOutcome>(total);

        for device in devices {
            let transport = self.transport.clone();
            let registry = self.registry.clone();
            let config = self.config.clone();
            let credentials = credentials.clone();
            let semaphore = semaphore.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };

                let fallback = device.clone();
                let outcome = AssertUnwindSafe(run_device(
                    transport.as_ref(),
                    device,
                    &credentials,
                    &registry,
                    &config,
                ))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    let detail = format!("worker panicked: {}", panic_message(&panic));
                    error!("{}: {}", fallback.address, detail);
                    let event = LogEvent::now(&fallback.address, Severity::Error, detail.clone());
                    DeviceOutcome::Failure(DeviceFailure {
                        device: fallback,
                        kind: FailureKind::ParseError,
                        detail,
                        events: vec![event],
                    })
                });

                // The receiver lives until every sender is dropped, so this
                // only fails if the whole run is being torn down.
                let _ = tx.send(outcome).await;
            });
        }
        drop(tx);

        while let Some(outcome) = rx.recv().await {
            aggregator.collect(outcome);
        }

        let report = aggregator.finish();
        info!(
            "audit finished: {} devices, {} failed",
            report.len(),
            report.failure_count()
        );
        report
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
