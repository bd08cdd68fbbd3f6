//! Run configuration and credentials.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Credentials for the whole audit run.
///
/// One set is supplied once per run and shared read-only by every device
/// worker. The password and enable secret are wrapped in [`SecretString`] so
/// they never appear in debug output or logs.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// SSH username.
    pub username: String,

    /// SSH password.
    pub password: SecretString,

    /// Optional privileged-mode (enable) secret.
    pub enable_secret: Option<SecretString>,
}

impl Credentials {
    /// Create credentials with username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            enable_secret: None,
        }
    }

    /// Attach an enable secret.
    pub fn with_enable_secret(mut self, secret: impl Into<String>) -> Self {
        self.enable_secret = Some(SecretString::from(secret.into()));
        self
    }
}

/// Audit engine configuration.
///
/// Everything here is a tunable, not policy baked into the engine: pool size
/// bounds concurrent sessions, and the two timeouts bound each connect and
/// each command execution individually.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Maximum number of concurrently active device sessions.
    pub pool_size: usize,

    /// Timeout for opening a session to one device.
    pub connect_timeout: Duration,

    /// Timeout for each individual command execution.
    pub command_timeout: Duration,

    /// Directory the CSV and log files are written to.
    pub output_dir: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            connect_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(30),
            output_dir: PathBuf::from("."),
        }
    }
}

impl AuditConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker pool size. Values below 1 are clamped to 1.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size.max(1);
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-command timeout.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}
