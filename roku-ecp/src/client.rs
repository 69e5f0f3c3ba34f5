//! HTTP transport for the External Control Protocol
//!
//! Every request goes through [`EcpClient::query`] or [`EcpClient::command`],
//! which share a single retry loop and the same failure classification. The
//! HTTP method always comes from [`Endpoint::method`].

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::actions::ActionTable;
use crate::endpoint::{Endpoint, Method};
use crate::error::{EcpError, Result, LIMITED_MODE_MARKER};
use crate::models::{self, ActiveApp, Apps, DeviceInfo, Info, Player};
use crate::retry::RetryPolicy;

/// Port every Roku device serves ECP on.
pub const ECP_PORT: u16 = 8060;

/// Per-request timeout, covering connect, send and body read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_BODY_IN_ERROR: usize = 200;

/// Builder for [`EcpClient`].
#[derive(Debug, Clone)]
pub struct EcpClientBuilder {
    address: String,
    port: u16,
    timeout: Duration,
    retry: RetryPolicy,
    actions: Option<Arc<ActionTable>>,
    cancel: Option<CancellationToken>,
}

impl EcpClientBuilder {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: ECP_PORT,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::transport(),
            actions: None,
            cancel: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn actions(mut self, actions: Arc<ActionTable>) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Token observed by every request and backoff wait.
    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Validate the address and build the client. No I/O happens here.
    pub fn build(self) -> Result<EcpClient> {
        let trimmed = self.address.trim();
        let address: IpAddr = trimmed
            .parse()
            .map_err(|_| EcpError::InvalidTarget(self.address.clone()))?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| EcpError::Unreachable {
                endpoint: address.to_string(),
                message: e.to_string(),
            })?;

        Ok(EcpClient {
            http,
            address,
            base_url: format!("http://{}", SocketAddr::new(address, self.port)),
            retry: self.retry,
            actions: self.actions.unwrap_or_else(|| Arc::new(ActionTable::standard())),
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

/// Async client for a single Roku device.
///
/// Cloning is cheap; clones share the connection pool, the action table and
/// the cancellation token.
#[derive(Debug, Clone)]
pub struct EcpClient {
    http: reqwest::Client,
    address: IpAddr,
    base_url: String,
    retry: RetryPolicy,
    actions: Arc<ActionTable>,
    cancel: CancellationToken,
}

/// Form pair sent with a POST, e.g. `("id", "12")`.
type FormField<'a> = Option<(&'static str, &'a str)>;

impl EcpClient {
    /// Client for `address` on the standard port with default settings.
    pub fn new(address: &str) -> Result<Self> {
        EcpClientBuilder::new(address).build()
    }

    pub fn builder(address: impl Into<String>) -> EcpClientBuilder {
        EcpClientBuilder::new(address)
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// `http://<address>:<port>`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fetch `endpoint` and decode the XML body, retrying transient failures.
    pub async fn query<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T> {
        let path = endpoint.path();
        self.retry
            .run(&self.cancel, |attempt| async move {
                debug!("{} (attempt {})", path, attempt + 1);
                let body = self.send(endpoint.method(), path, None).await?;
                models::from_xml(&body).map_err(|e| EcpError::Decode {
                    endpoint: path.to_string(),
                    message: e.to_string(),
                })
            })
            .await
    }

    /// Call `endpoint` with `fragment` appended to its path, optionally with
    /// a single form field, retrying transient failures. The response body
    /// is discarded.
    pub async fn command(
        &self,
        endpoint: Endpoint,
        fragment: &str,
        field: FormField<'_>,
    ) -> Result<()> {
        let path = endpoint.with_fragment(fragment);
        let path = path.as_str();
        self.retry
            .run(&self.cancel, |attempt| async move {
                debug!("{} (attempt {})", path, attempt + 1);
                self.send(endpoint.method(), path, field).await.map(|_| ())
            })
            .await
    }

    pub async fn info(&self) -> Result<Info> {
        self.query(Endpoint::Root).await
    }

    pub async fn device_info(&self) -> Result<DeviceInfo> {
        self.query(Endpoint::DeviceInfo).await
    }

    pub async fn apps(&self) -> Result<Apps> {
        self.query(Endpoint::Apps).await
    }

    pub async fn active_app(&self) -> Result<ActiveApp> {
        self.query(Endpoint::ActiveApp).await
    }

    pub async fn media_player(&self) -> Result<Player> {
        self.query(Endpoint::MediaPlayer).await
    }

    /// Press and release the key bound to `action`.
    pub async fn keypress(&self, action: &str) -> Result<()> {
        self.key(Endpoint::Keypress, action).await
    }

    pub async fn keydown(&self, action: &str) -> Result<()> {
        self.key(Endpoint::Keydown, action).await
    }

    pub async fn keyup(&self, action: &str) -> Result<()> {
        self.key(Endpoint::Keyup, action).await
    }

    pub async fn launch(&self, app_id: &str) -> Result<()> {
        let app_id = non_empty(app_id, "launch")?;
        self.command(Endpoint::Launch, "", Some(("id", app_id)))
            .await
    }

    pub async fn install(&self, app_id: &str) -> Result<()> {
        let app_id = non_empty(app_id, "install")?;
        self.command(Endpoint::Install, "", Some(("id", app_id)))
            .await
    }

    /// Send literal text to the focused input field.
    pub async fn input(&self, text: &str) -> Result<()> {
        self.command(Endpoint::Input, "", Some(("text", text)))
            .await
    }

    pub async fn search(&self, keyword: &str) -> Result<()> {
        self.command(Endpoint::Search, "", Some(("keyword", keyword)))
            .await
    }

    async fn key(&self, endpoint: Endpoint, action: &str) -> Result<()> {
        let fragment = self.actions.resolve(action)?;
        self.command(endpoint, fragment, None).await
    }

    /// One HTTP exchange, classified. Returns the body on success.
    async fn send(&self, method: Method, path: &str, field: FormField<'_>) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let request = match method {
            Method::Get => self.http.get(&url),
            Method::Post => match field {
                Some(pair) => self.http.post(&url).form(&[pair]),
                None => self.http.post(&url).body(""),
            },
        };

        let unreachable = |e: reqwest::Error| EcpError::Unreachable {
            endpoint: path.to_string(),
            message: e.to_string(),
        };

        let response = request.send().await.map_err(unreachable)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(unreachable)?;
        debug!("{} {} -> {}", method_name(method), path, status);

        classify(status, path, &body)?;
        Ok(body)
    }
}

/// Map a response status and body to success or a typed error.
///
/// Any 2xx is success. A 403 whose body carries the Limited mode marker is
/// reported as [`EcpError::RestrictedMode`]; every other status becomes
/// [`EcpError::Protocol`] with the body flattened onto one line.
pub fn classify(status: u16, endpoint: &str, body: &str) -> Result<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    if status == 403 && body.contains(LIMITED_MODE_MARKER) {
        return Err(EcpError::RestrictedMode {
            endpoint: endpoint.to_string(),
        });
    }
    Err(EcpError::Protocol {
        status,
        endpoint: endpoint.to_string(),
        body: summarize_body(body),
    })
}

fn summarize_body(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_BODY_IN_ERROR {
        return flat;
    }
    let mut truncated: String = flat.chars().take(MAX_BODY_IN_ERROR).collect();
    truncated.push_str("...");
    truncated
}

fn non_empty<'a>(app_id: &'a str, operation: &'static str) -> Result<&'a str> {
    let trimmed = app_id.trim();
    if trimmed.is_empty() {
        return Err(EcpError::EmptyIdentifier { operation });
    }
    Ok(trimmed)
}

fn method_name(method: Method) -> &'static str {
    match method {
        Method::Get => "GET",
        Method::Post => "POST",
    }
}
