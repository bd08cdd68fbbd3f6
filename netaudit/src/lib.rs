//! # Netaudit
//!
//! Concurrent SSH audit engine for heterogeneous network devices.
//!
//! Netaudit connects to a fleet of Cisco-class devices over SSH, detects
//! each device's platform, runs a platform-specific command profile, parses
//! the output into structured records, and aggregates everything into one
//! CSV report and one run log.
//!
//! ## Features
//!
//! - Async SSH sessions via russh
//! - Platform detection (IOS, IOS-XE, NX-OS, ASA) with a safe fallback
//! - Bounded-concurrency worker pool with per-device failure isolation
//! - Total parsers: malformed device output degrades, never aborts
//! - Order-independent aggregation into a deterministic report
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use netaudit::config::{AuditConfig, Credentials};
//! use netaudit::engine::AuditEngine;
//! use netaudit::output::write_outputs;
//! use netaudit::report::Device;
//! use netaudit::transport::SshTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netaudit::Error> {
//!     let devices = vec![
//!         Device::new("192.168.1.1").at_position(0),
//!         Device::new("192.168.1.2").at_position(1),
//!     ];
//!     let credentials = Credentials::new("admin", "secret");
//!
//!     let transport = Arc::new(SshTransport::default());
//!     let engine = AuditEngine::new(transport, AuditConfig::default());
//!
//!     let report = engine.run(devices, credentials).await;
//!     let paths = write_outputs(&report, Path::new("."))?;
//!     println!("wrote {} and {}", paths.csv.display(), paths.log.display());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod parse;
pub mod platform;
pub mod report;
pub mod transport;
pub mod worker;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export main types for convenience
pub use config::{AuditConfig, Credentials};
pub use engine::AuditEngine;
pub use error::{Error, FailureKind};
pub use report::{AuditReport, Device, DeviceOutcome};
pub use transport::{SshConfig, SshTransport};
