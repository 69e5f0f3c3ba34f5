//! Device handle with one method per remote capability
//!
//! Wraps an [`EcpClient`] and adds the outer retry around key presses.

use std::net::IpAddr;

use tracing::{debug, info};

use crate::client::EcpClient;
use crate::error::Result;
use crate::models::{ActiveApp, Apps, DeviceInfo, Info, Player};
use crate::retry::RetryPolicy;

/// Handle to a single Roku device
///
/// Every call goes through the client's transport retry. [`Device::action`]
/// additionally retries the whole keypress with [`RetryPolicy::action`], so a
/// flaky key press may produce up to nine HTTP exchanges.
///
/// # Example
///
/// ```rust,ignore
/// let device = Device::connect("192.168.1.20")?;
/// device.action("home").await?;
/// let apps = device.apps().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Device {
    /// IP address of the device
    pub address: IpAddr,
    client: EcpClient,
    action_retry: RetryPolicy,
}

impl Device {
    /// Handle for an already configured client.
    pub fn new(client: EcpClient) -> Self {
        Self {
            address: client.address(),
            client,
            action_retry: RetryPolicy::action(),
        }
    }

    /// Handle with default client settings for `address`.
    pub fn connect(address: &str) -> Result<Self> {
        Ok(Self::new(EcpClient::new(address)?))
    }

    pub fn with_action_retry(mut self, policy: RetryPolicy) -> Self {
        self.action_retry = policy;
        self
    }

    pub fn client(&self) -> &EcpClient {
        &self.client
    }

    /// Detailed device descriptor.
    pub async fn describe(&self) -> Result<DeviceInfo> {
        self.client.device_info().await
    }

    /// Root UPnP description.
    pub async fn info(&self) -> Result<Info> {
        self.client.info().await
    }

    pub async fn apps(&self) -> Result<Apps> {
        self.client.apps().await
    }

    pub async fn active_app(&self) -> Result<ActiveApp> {
        self.client.active_app().await
    }

    pub async fn player(&self) -> Result<Player> {
        self.client.media_player().await
    }

    pub async fn launch(&self, app_id: &str) -> Result<()> {
        info!("Launching app {} on {}", app_id, self.address);
        self.client.launch(app_id).await
    }

    pub async fn install(&self, app_id: &str) -> Result<()> {
        info!("Installing app {} on {}", app_id, self.address);
        self.client.install(app_id).await
    }

    pub async fn input(&self, text: &str) -> Result<()> {
        self.client.input(text).await
    }

    pub async fn search(&self, keyword: &str) -> Result<()> {
        self.client.search(keyword).await
    }

    /// Hold the key bound to `name` until [`Device::key_up`].
    pub async fn key_down(&self, name: &str) -> Result<()> {
        self.client.keydown(name).await
    }

    pub async fn key_up(&self, name: &str) -> Result<()> {
        self.client.keyup(name).await
    }

    /// Send a named remote action such as `"home"` or `"volumeup"`.
    ///
    /// Unknown names fail before any request and are not retried.
    pub async fn action(&self, name: &str) -> Result<()> {
        self.client.actions().resolve(name)?;
        debug!("Sending action {} to {}", name, self.address);

        self.action_retry
            .run(self.client.cancellation_token(), |_| {
                self.client.keypress(name)
            })
            .await
    }
}
