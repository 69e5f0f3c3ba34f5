//! Roku device discovery library
//!
//! Finds ECP-capable devices on the local network with a single SSDP
//! M-SEARCH for the `roku:ecp` search target. Only addresses are returned;
//! use `roku-ecp` to talk to a device once found.
//!
//! # Quick Start
//!
//! ```no_run
//! use roku_discovery::search;
//! use std::time::Duration;
//!
//! for device in search(Duration::from_secs(5))? {
//!     println!("Found Roku at {}", device.address);
//! }
//! # Ok::<(), roku_discovery::DiscoveryError>(())
//! ```
//!
//! # Iterator-based Discovery
//!
//! ```no_run
//! use roku_discovery::search_iter;
//! use std::time::Duration;
//!
//! if let Some(first) = search_iter(Duration::from_secs(5))?.next() {
//!     println!("First device: {}", first.address);
//! }
//! # Ok::<(), roku_discovery::DiscoveryError>(())
//! ```

mod discovery;
mod error;
mod ssdp;

pub use discovery::{Discovery, DiscoveryIterator, ROKU_SEARCH_TARGET};
pub use error::{DiscoveryError, Result};

use std::net::IpAddr;
use std::time::Duration;

use serde::Serialize;

/// A device that answered the search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredDevice {
    /// IP address serving ECP
    pub address: IpAddr,
    /// `LOCATION` header, e.g. `http://192.168.1.134:8060/`
    pub location: String,
    /// Unique service name, e.g. `uuid:roku:ecp:YN00H5123456`
    pub usn: String,
}

/// Search for `window` and collect every device found.
pub fn search(window: Duration) -> Result<Vec<DiscoveredDevice>> {
    Discovery::new(window).run()
}

/// Search for `window`, yielding devices as replies arrive.
pub fn search_iter(window: Duration) -> Result<DiscoveryIterator> {
    Discovery::new(window).iter()
}
