//! Client for the Roku External Control Protocol
//!
//! ECP is a small HTTP/XML API every Roku device serves on port 8060. This
//! crate offers a typed async client with retry and failure classification,
//! plus a [`Device`] handle that adds a second retry layer for key presses.
//!
//! ```rust,ignore
//! use roku_ecp::Device;
//!
//! let device = Device::connect("192.168.1.20")?;
//! let info = device.describe().await?;
//! println!("{} ({})", info.display_name(), info.model_name);
//! device.action("home").await?;
//! ```

pub mod actions;
pub mod client;
pub mod device;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod retry;

pub use actions::{ActionTable, STANDARD_ACTIONS};
pub use client::{classify, EcpClient, EcpClientBuilder, DEFAULT_TIMEOUT, ECP_PORT};
pub use device::Device;
pub use endpoint::{Endpoint, Method};
pub use error::{EcpError, Result, LIMITED_MODE_HINT};
pub use models::{ActiveApp, App, Apps, DeviceInfo, Info, Player};
pub use retry::{Backoff, RetryPolicy};

pub use tokio_util::sync::CancellationToken;
