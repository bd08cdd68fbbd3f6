//! SSH transport implementation using russh.
//!
//! Cisco-class devices want a PTY plus an interactive shell, not exec
//! channels, so each session drives a shell: send a line, accumulate output,
//! and stop when the device prompt shows up at the buffer tail.

use std::path::PathBuf;
use std::sync::{Arc, LazyLock, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use regex::bytes::Regex;
use russh::client::{self, Handle, Msg};
use russh::keys::PublicKey;
use russh::{Channel, ChannelMsg};
use secrecy::ExposeSecret;

use super::buffer::PatternBuffer;
use super::config::{HostKeyVerification, SshConfig};
use super::{Session, Transport};
use crate::config::Credentials;
use crate::error::TransportError;
use crate::report::Device;

/// Matches EXEC (">") and privileged ("#") prompts of the supported families.
static PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[\w.\-@()/:+ ]{0,63}[>#]\s?$").unwrap());

/// Matches the password challenge issued by `enable`.
static PASSWORD_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)password:\s?$").unwrap());

/// Matches whatever `enable` comes back with: the password challenge, or a
/// prompt directly when no enable password is configured.
static ENABLE_RESPONSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi:password:\s?$)|(?m:^[\w.\-@()/:+ ]{0,63}[>#]\s?$)").unwrap()
});

/// Output markers that mean the device rejected a command.
const FAILURE_MARKERS: &[&str] = &[
    "% Invalid input",
    "% Incomplete command",
    "% Ambiguous command",
    "% Invalid command",
    "Invalid command at",
    "ERROR: % Invalid",
];

/// SSH implementation of the [`Transport`] capability.
pub struct SshTransport {
    config: SshConfig,
}

impl SshTransport {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }
}

impl Default for SshTransport {
    fn default() -> Self {
        Self::new(SshConfig::default())
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn open(
        &self,
        device: &Device,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Box<dyn Session>, TransportError> {
        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: Some(timeout),
            ..Default::default()
        });

        let host_key_error: Arc<Mutex<Option<TransportError>>> = Arc::new(Mutex::new(None));

        let handler = AuditHandler {
            host: device.address.clone(),
            port: self.config.port,
            host_key_verification: self.config.host_key_verification.clone(),
            known_hosts_path: self.config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };

        let mut handle = tokio::time::timeout(
            timeout,
            client::connect(
                ssh_config,
                (device.address.as_str(), self.config.port),
                handler,
            ),
        )
        .await
        .map_err(|_| TransportError::ConnectTimeout(timeout))?
        .map_err(|e| {
            // Surface the detailed host-key error stored by
            // check_server_key instead of the generic russh one.
            if let Some(hk_err) = host_key_error.lock().unwrap().take() {
                hk_err
            } else {
                TransportError::Ssh(e)
            }
        })?;

        authenticate(&mut handle, credentials).await?;

        let channel = open_shell_channel(&handle, &self.config).await?;

        let mut session = SshSession {
            handle,
            channel,
            buffer: PatternBuffer::default(),
            host: device.address.clone(),
        };

        // Wait for the login banner to settle into a prompt.
        let banner = session
            .read_until(&PROMPT, timeout)
            .await
            .map_err(|e| match e {
                TransportError::CommandTimeout { timeout, .. } => {
                    TransportError::PromptTimeout(timeout)
                }
                other => other,
            })?;

        // User EXEC prompt plus an enable secret means we should escalate.
        // Escalation is best-effort: an unprivileged session can still run
        // the audit's show commands.
        if last_line(&banner).ends_with('>') {
            if let Some(secret) = &credentials.enable_secret {
                let secret = secret.expose_secret().to_string();
                if let Err(e) = session.enter_enable(&secret, timeout).await {
                    warn!("{}: enable escalation failed: {}", session.host, e);
                }
            }
        }

        for cmd in &self.config.on_open_commands {
            // Paging setup differs per OS; a rejected variant is harmless.
            if let Err(e) = session.exec(cmd, timeout).await {
                debug!("{}: on-open command '{}' failed: {}", session.host, cmd, e);
            }
        }

        Ok(Box::new(session))
    }
}

async fn authenticate(
    handle: &mut Handle<AuditHandler>,
    credentials: &Credentials,
) -> Result<(), TransportError> {
    let success = handle
        .authenticate_password(&credentials.username, credentials.password.expose_secret())
        .await
        .map_err(TransportError::Ssh)?
        .success();

    if !success {
        return Err(TransportError::AuthenticationFailed {
            user: credentials.username.clone(),
        });
    }
    Ok(())
}

async fn open_shell_channel(
    handle: &Handle<AuditHandler>,
    config: &SshConfig,
) -> Result<Channel<Msg>, TransportError> {
    let channel = handle
        .channel_open_session()
        .await
        .map_err(TransportError::Ssh)?;

    channel
        .request_pty(
            true,
            "xterm",
            config.terminal_width,
            config.terminal_height,
            0,
            0,
            &[],
        )
        .await
        .map_err(TransportError::Ssh)?;

    channel
        .request_shell(true)
        .await
        .map_err(TransportError::Ssh)?;

    Ok(channel)
}

/// One open shell session to a device.
struct SshSession {
    handle: Handle<AuditHandler>,
    channel: Channel<Msg>,
    buffer: PatternBuffer,
    host: String,
}

impl SshSession {
    /// Read channel data until `pattern` matches the buffer tail, then
    /// drain and return everything accumulated.
    async fn read_until(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> Result<String, TransportError> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.buffer.tail_contains(pattern) {
                let data = self.buffer.take();
                return Ok(String::from_utf8_lossy(&data).into_owned());
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| TransportError::CommandTimeout {
                    command: String::new(),
                    timeout,
                })?
                .ok_or(TransportError::Disconnected)?;

            match msg {
                ChannelMsg::Data { ref data } => self.buffer.extend(data),
                ChannelMsg::ExtendedData { ref data, .. } => self.buffer.extend(data),
                ChannelMsg::Eof | ChannelMsg::Close => return Err(TransportError::Disconnected),
                _ => {}
            }
        }
    }

    /// Send one line of input.
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        let data = format!("{}\n", line);
        self.channel
            .data(data.as_bytes())
            .await
            .map_err(|_| TransportError::Disconnected)?;
        Ok(())
    }

    /// Escalate from user EXEC to privileged EXEC with the enable secret.
    async fn enter_enable(
        &mut self,
        secret: &str,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        self.send_line("enable").await?;
        let response = self.read_until(&ENABLE_RESPONSE, timeout).await?;

        // No enable password configured: the device drops straight into
        // privileged EXEC without a challenge.
        if last_line(&response).ends_with('#') {
            debug!("{}: entered privileged EXEC", self.host);
            return Ok(());
        }

        if !PASSWORD_PROMPT.is_match(response.as_bytes()) {
            return Err(TransportError::EnableFailed {
                message: "device stayed at user EXEC".to_string(),
            });
        }

        self.send_line(secret).await?;
        let output = self.read_until(&PROMPT, timeout).await?;

        if !last_line(&output).ends_with('#') {
            return Err(TransportError::EnableFailed {
                message: "device stayed at user EXEC".to_string(),
            });
        }
        debug!("{}: entered privileged EXEC", self.host);
        Ok(())
    }
}

#[async_trait]
impl Session for SshSession {
    async fn exec(&mut self, command: &str, timeout: Duration) -> Result<String, TransportError> {
        self.buffer.clear();
        self.send_line(command).await?;

        let raw = self
            .read_until(&PROMPT, timeout)
            .await
            .map_err(|e| match e {
                TransportError::CommandTimeout { timeout, .. } => TransportError::CommandTimeout {
                    command: command.to_string(),
                    timeout,
                },
                other => other,
            })?;

        let output = normalize_output(&raw, command);

        for marker in FAILURE_MARKERS {
            if output.contains(marker) {
                return Err(TransportError::CommandFailed {
                    command: command.to_string(),
                    message: (*marker).to_string(),
                });
            }
        }

        Ok(output)
    }

    async fn close(self: Box<Self>) -> Result<(), TransportError> {
        self.handle
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// Strip the command echo from the front and the prompt from the back.
fn normalize_output(raw: &str, command: &str) -> String {
    let trimmed = raw.trim_start_matches(['\r', '\n']);
    let without_echo = trimmed
        .strip_prefix(command)
        .unwrap_or(trimmed)
        .trim_start_matches(['\r', '\n']);

    match without_echo.rfind('\n') {
        Some(pos) if PROMPT.is_match(without_echo[pos + 1..].as_bytes()) => {
            without_echo[..pos].trim_end_matches('\r').to_string()
        }
        _ => without_echo.to_string(),
    }
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .trim()
}

/// russh client handler carrying the host-key policy.
struct AuditHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    /// Stores a detailed host-key error so connect() can surface it
    /// instead of the generic russh::Error::UnknownKey.
    host_key_error: Arc<Mutex<Option<TransportError>>>,
}

impl AuditHandler {
    /// Check the host key against known_hosts.
    ///
    /// Returns `Ok(true)` if matched, `Ok(false)` if host not found,
    /// `Err(TransportError::HostKeyChanged)` if key changed.
    fn check_known_hosts(&self, pubkey: &PublicKey) -> std::result::Result<bool, TransportError> {
        let result = if let Some(ref path) = self.known_hosts_path {
            russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::check_known_hosts(&self.host, self.port, pubkey)
        };

        match result {
            Ok(matched) => Ok(matched),
            Err(russh::keys::Error::KeyChanged { line }) => Err(TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            }),
            Err(e) => Err(TransportError::KnownHosts(e.to_string())),
        }
    }

    /// Save a new host key to known_hosts.
    fn learn_host_key(&self, pubkey: &PublicKey) -> std::result::Result<(), TransportError> {
        let result = if let Some(ref path) = self.known_hosts_path {
            russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey)
        };

        result.map_err(|e| TransportError::KnownHosts(e.to_string()))
    }
}

impl client::Handler for AuditHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.host_key_verification {
            HostKeyVerification::Disabled => Ok(true),

            HostKeyVerification::AcceptNew => match self.check_known_hosts(server_public_key) {
                Ok(true) => Ok(true),
                Ok(false) => {
                    if let Err(e) = self.learn_host_key(server_public_key) {
                        warn!("failed to save host key for {}: {}", self.host, e);
                    }
                    Ok(true)
                }
                Err(e) => {
                    *self.host_key_error.lock().unwrap() = Some(e);
                    Ok(false)
                }
            },

            HostKeyVerification::Strict => match self.check_known_hosts(server_public_key) {
                Ok(true) => Ok(true),
                Ok(false) => {
                    *self.host_key_error.lock().unwrap() = Some(TransportError::HostKeyUnknown {
                        host: self.host.clone(),
                        port: self.port,
                    });
                    Ok(false)
                }
                Err(e) => {
                    *self.host_key_error.lock().unwrap() = Some(e);
                    Ok(false)
                }
            },
        }
    }
}
