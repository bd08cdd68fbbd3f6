//! SSH transport configuration.

use std::path::PathBuf;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys. Connection fails if the host
    /// is not already in known_hosts.
    Strict,

    /// Accept and auto-learn unknown keys, but reject changed keys.
    /// This is the default and matches common SSH client behavior.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. For lab sweeps only.
    Disabled,
}

/// Settings shared by every SSH session the transport opens.
///
/// Per-device values (address, credentials, timeouts) arrive through the
/// `Transport::open` call instead.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// SSH port (default: 22).
    pub port: u16,

    /// Terminal width for the PTY. Wide enough that devices never wrap
    /// command echo.
    pub terminal_width: u32,

    /// Terminal height for the PTY.
    pub terminal_height: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file; None uses the user default.
    pub known_hosts_path: Option<PathBuf>,

    /// Commands issued right after the session opens, before any probe.
    /// Defaults to disabling terminal paging.
    pub on_open_commands: Vec<String>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            port: 22,
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            on_open_commands: vec!["terminal length 0".to_string()],
        }
    }
}

impl SshConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SSH port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the host key verification mode.
    pub fn with_host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Set the known_hosts path.
    pub fn with_known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }
}
