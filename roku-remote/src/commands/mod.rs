//! Command implementations
//!
//! Every command takes a [`Context`] and an output sink, so tests can run
//! them against a fake device and inspect what would have been printed.

pub mod apps;
pub mod device;
pub mod output;

use std::io::Write;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use roku_discovery::DiscoveryError;
use roku_ecp::{Device, EcpClient, EcpError, RetryPolicy, ECP_PORT};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{AppsCommand, Command, DeviceCommand};
use crate::config::{ConfigError, ConfigStore};

/// How long the reachability probe waits for a TCP connection.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Printed under the error when no device is configured.
pub const NO_DEVICE_HINT: &str = "Run 'roku device find' to discover and configure a Roku device";

/// Failures specific to the command line front end
#[derive(Debug, Error)]
pub enum CliError {
    #[error("no Roku device configured. Run 'roku device find' first to set a default device")]
    NoDeviceConfigured,

    #[error("invalid host IP address: {0}")]
    InvalidHost(String),

    #[error(
        "unable to connect to Roku device at {address}: {message}\n\n\
         Please ensure:\n  \
         • The Roku device is powered on\n  \
         • The device is connected to the same network\n  \
         • The IP address is correct (run 'roku device find' to re-scan)"
    )]
    Unreachable { address: String, message: String },

    #[error("app '{0}' not found. Use 'roku apps list' to see available apps")]
    AppNotFound(String),

    #[error("app '{0}' is already installed")]
    AlreadyInstalled(String),

    #[error("you must provide an application name or id")]
    EmptyApp,

    #[error("interactive session failed: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Ecp(#[from] EcpError),
}

impl CliError {
    /// Extra line printed after the error, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::NoDeviceConfigured => Some(NO_DEVICE_HINT),
            _ => None,
        }
    }
}

/// Everything a command needs besides its own arguments
#[derive(Debug)]
pub struct Context {
    pub config: ConfigStore,
    pub host_override: Option<String>,
    pub json: bool,
    pub cancel: CancellationToken,
    port: u16,
    probe_timeout: Duration,
    retry: Option<RetryPolicy>,
}

impl Context {
    pub fn new(config: ConfigStore, cancel: CancellationToken) -> Self {
        Self {
            config,
            host_override: None,
            json: false,
            cancel,
            port: ECP_PORT,
            probe_timeout: PROBE_TIMEOUT,
            retry: None,
        }
    }

    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host_override = host.filter(|h| !h.trim().is_empty());
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Talk to devices on a port other than 8060.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Retry policy for both the transport and action layers.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// The `--host` flag, else the configured host.
    pub fn host(&self) -> Option<String> {
        self.host_override
            .as_ref()
            .map(|h| h.trim().to_string())
            .or_else(|| self.config.host())
    }

    /// The target address, checked for presence and syntax only.
    pub fn target(&self) -> Result<IpAddr, CliError> {
        let host = self.host().ok_or(CliError::NoDeviceConfigured)?;
        host.parse().map_err(|_| CliError::InvalidHost(host))
    }

    /// A device handle for the target, after checking it accepts connections.
    pub async fn device(&self) -> Result<Device, CliError> {
        let address = self.target()?;
        probe(SocketAddr::new(address, self.port), self.probe_timeout).await?;

        let mut builder = EcpClient::builder(address.to_string())
            .port(self.port)
            .cancellation_token(self.cancel.clone());
        if let Some(retry) = self.retry {
            builder = builder.retry_policy(retry);
        }
        let mut device = Device::new(builder.build()?);
        if let Some(retry) = self.retry {
            device = device.with_action_retry(retry);
        }
        Ok(device)
    }
}

/// Check that something accepts TCP connections at `address`.
pub async fn probe(address: SocketAddr, timeout: Duration) -> Result<(), CliError> {
    debug!("Probing {} (timeout {:?})", address, timeout);
    let unreachable = |message: String| CliError::Unreachable {
        address: address.ip().to_string(),
        message,
    };
    match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(unreachable(e.to_string())),
        Err(_) => Err(unreachable(format!("no response within {}s", timeout.as_secs()))),
    }
}

/// Run one parsed command.
pub async fn run(command: Command, ctx: &mut Context, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Device(cmd) => match cmd {
            DeviceCommand::Find { wait } => device::find(ctx, Duration::from_secs(wait), out).await,
            DeviceCommand::Switch => device::switch(ctx, out).await,
            DeviceCommand::Describe => device::describe(ctx, out).await,
            DeviceCommand::Info => device::info(ctx, out).await,
            DeviceCommand::Live => device::live(ctx, out).await,
            DeviceCommand::Send { action: Some(action) } => device::send(ctx, &action, out).await,
            DeviceCommand::Send { action: None } => device::send_interactive(ctx).await,
            DeviceCommand::Control => device::control(ctx).await,
            DeviceCommand::Type { text } => device::type_text(ctx, &text, out).await,
            DeviceCommand::Search { keyword } => device::search(ctx, &keyword, out).await,
        },
        Command::Apps(cmd) => match cmd {
            AppsCommand::List => apps::list(ctx, out).await,
            AppsCommand::Active => apps::active(ctx, out).await,
            AppsCommand::Launch { app } => apps::launch(ctx, &app, out).await,
            AppsCommand::Add { app } => apps::add(ctx, &app, out).await,
        },
    }
}

/// One-line rendering of an error and its causes. A cause whose text the
/// line already carries is not repeated.
pub fn error_line(err: &anyhow::Error) -> String {
    let mut line = err.to_string();
    for cause in err.chain().skip(1) {
        let text = cause.to_string();
        if !line.contains(&text) {
            line.push_str(": ");
            line.push_str(&text);
        }
    }
    line
}
