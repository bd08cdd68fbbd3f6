//! Error types for netaudit.

use std::io;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Main error type for netaudit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Report output errors (CSV/log file writing)
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// Audit run configuration errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Transport layer errors (SSH connection, authentication, command I/O).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Connecting to the device exceeded the timeout
    #[error("Connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// A command did not complete within the timeout
    #[error("Command '{command}' timed out after {timeout:?}")]
    CommandTimeout { command: String, timeout: Duration },

    /// The device rejected or garbled a command
    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// Expected prompt never appeared in the session output
    #[error("Prompt not found within {0:?}")]
    PromptTimeout(Duration),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Host key differs from the recorded known_hosts entry
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host not present in known_hosts under strict verification
    #[error("Unknown host key for {host}:{port}")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts file could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Enable-mode escalation failed
    #[error("Enable escalation failed: {message}")]
    EnableFailed { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Report output errors (file creation, CSV serialization).
#[derive(Error, Debug)]
pub enum OutputError {
    /// CSV serialization failed
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error writing an output file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Classification of a terminal per-device failure.
///
/// Command- and parse-level problems are absorbed inside the device worker;
/// only the kinds below terminate a device's audit. The kind ends up in the
/// final report next to the failure detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// The device could not be reached before the connect timeout fired.
    /// Also covers refused/unreachable/protocol-level connect errors.
    ConnectTimeout,

    /// The device rejected the supplied credentials.
    AuthFailure,

    /// Every profile command failed, or the session was lost mid-run.
    CommandError,

    /// A parser malfunctioned (worker task panic).
    ParseError,
}

impl FailureKind {
    /// Classify a transport error raised while opening a session.
    pub fn from_connect_error(err: &TransportError) -> Self {
        match err {
            TransportError::AuthenticationFailed { .. } => FailureKind::AuthFailure,
            _ => FailureKind::ConnectTimeout,
        }
    }

    /// Short status text for the CSV `status` column.
    pub fn status_text(&self) -> &'static str {
        match self {
            FailureKind::ConnectTimeout => "Connection Timeout",
            FailureKind::AuthFailure => "Authentication Failed",
            FailureKind::CommandError => "Command Error",
            FailureKind::ParseError => "Parse Error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status_text())
    }
}

/// Result type alias using netaudit's Error.
pub type Result<T> = std::result::Result<T, Error>;
