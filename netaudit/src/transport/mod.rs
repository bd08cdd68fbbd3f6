//! Transport capability: authenticated sessions to devices.
//!
//! The engine depends only on the [`Transport`] and [`Session`] traits, not
//! on any concrete implementation. The SSH implementation lives in
//! [`ssh::SshTransport`]; tests inject fakes.

mod buffer;
pub mod config;
mod ssh;

pub use buffer::PatternBuffer;
pub use config::{HostKeyVerification, SshConfig};
pub use ssh::SshTransport;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::Credentials;
use crate::error::TransportError;
use crate::report::Device;

/// Opens authenticated sessions to devices.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a session to `device`, bounded by `timeout`.
    async fn open(
        &self,
        device: &Device,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Box<dyn Session>, TransportError>;
}

/// An open, authenticated session to one device.
#[async_trait]
pub trait Session: Send {
    /// Execute a command and return its textual output, bounded by `timeout`.
    async fn exec(&mut self, command: &str, timeout: Duration) -> Result<String, TransportError>;

    /// Close the session.
    async fn close(self: Box<Self>) -> Result<(), TransportError>;
}
