//! Command-line entry point for netaudit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::info;

use netaudit::config::{AuditConfig, Credentials};
use netaudit::engine::AuditEngine;
use netaudit::error::Error;
use netaudit::output::write_outputs;
use netaudit::report::Device;
use netaudit::transport::{HostKeyVerification, SshConfig, SshTransport};

/// Audit a fleet of network devices over SSH and produce a CSV report.
#[derive(Parser, Debug)]
#[command(name = "netaudit", version, about)]
struct Cli {
    /// Device list file, one address per line ('#' starts a comment;
    /// anything after the address on a line becomes the device label)
    #[arg(short, long, default_value = "devices.txt")]
    devices: PathBuf,

    /// SSH username
    #[arg(short, long)]
    username: String,

    /// SSH password
    #[arg(short, long, env = "NETAUDIT_PASSWORD", hide_env_values = true)]
    password: String,

    /// Privileged-mode (enable) secret
    #[arg(long, env = "NETAUDIT_ENABLE_SECRET", hide_env_values = true)]
    enable_secret: Option<String>,

    /// Maximum number of concurrent device sessions
    #[arg(long, default_value_t = 10)]
    pool_size: usize,

    /// Per-device connect timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECONDS")]
    connect_timeout: u64,

    /// Per-command timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECONDS")]
    command_timeout: u64,

    /// SSH port for all devices
    #[arg(long, default_value_t = 22)]
    port: u16,

    /// Directory the CSV and log files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Host key checking policy
    #[arg(long, value_enum, default_value_t = HostKeyMode::AcceptNew)]
    host_key_checking: HostKeyMode,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HostKeyMode {
    /// Reject hosts not already in known_hosts
    Strict,
    /// Learn unknown hosts, reject changed keys
    AcceptNew,
    /// Skip host key checks entirely (lab use)
    Off,
}

impl From<HostKeyMode> for HostKeyVerification {
    fn from(mode: HostKeyMode) -> Self {
        match mode {
            HostKeyMode::Strict => HostKeyVerification::Strict,
            HostKeyMode::AcceptNew => HostKeyVerification::AcceptNew,
            HostKeyMode::Off => HostKeyVerification::Disabled,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let devices = load_devices(&cli.devices)?;
    if devices.is_empty() {
        return Err(Error::InvalidConfig {
            message: format!("no devices found in {}", cli.devices.display()),
        });
    }
    info!("loaded {} devices from {}", devices.len(), cli.devices.display());

    let transport = Arc::new(SshTransport::new(ssh_config(&cli)));

    let mut credentials = Credentials::new(cli.username, cli.password);
    if let Some(secret) = cli.enable_secret {
        credentials = credentials.with_enable_secret(secret);
    }

    let config = AuditConfig::new()
        .with_pool_size(cli.pool_size)
        .with_connect_timeout(Duration::from_secs(cli.connect_timeout))
        .with_command_timeout(Duration::from_secs(cli.command_timeout))
        .with_output_dir(&cli.output_dir);

    let engine = AuditEngine::new(transport, config.clone());
    let report = engine.run(devices, credentials).await;

    let paths = write_outputs(&report, &config.output_dir)?;

    println!(
        "Audited {} devices ({} failed). Report: {}, log: {}",
        report.len(),
        report.failure_count(),
        paths.csv.display(),
        paths.log.display()
    );
    Ok(())
}

/// Build the transport settings from the CLI. The SSH port lives here and
/// only here.
fn ssh_config(cli: &Cli) -> SshConfig {
    SshConfig::new()
        .with_port(cli.port)
        .with_host_key_verification(cli.host_key_checking.into())
}

/// Read the device list: one address per line, blank lines and comments
/// skipped, duplicates kept as distinct targets.
fn load_devices(path: &std::path::Path) -> Result<Vec<Device>, Error> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::InvalidConfig {
        message: format!("cannot read device file {}: {}", path.display(), e),
    })?;
    Ok(parse_device_list(&contents))
}

fn parse_device_list(contents: &str) -> Vec<Device> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .enumerate()
        .map(|(position, line)| {
            let mut parts = line.split_whitespace();
            let address = parts.next().unwrap_or_default();
            let label = parts.collect::<Vec<_>>().join(" ");

            let device = Device::new(address).at_position(position);
            if label.is_empty() {
                device
            } else {
                device.with_label(label)
            }
        })
        .collect()
}
