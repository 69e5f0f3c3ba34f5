//! Core discovery logic and iterator implementation.
//!
//! 1. Send one SSDP M-SEARCH for `roku:ecp`
//! 2. Drop replies from other device classes and repeated locations
//! 3. Resolve each reply's address from its `LOCATION` URL
//! 4. Yield a [`DiscoveredDevice`] per unique device

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tracing::{debug, info};
use url::{Host, Url};

use crate::error::{DiscoveryError, Result};
use crate::ssdp::{SsdpClient, SsdpResponse, SsdpResponseIterator, MULTICAST_ADDR};
use crate::DiscoveredDevice;

/// Search target every ECP device answers to.
pub const ROKU_SEARCH_TARGET: &str = "roku:ecp";

/// Configurable SSDP search.
///
/// ```no_run
/// use roku_discovery::Discovery;
/// use std::time::Duration;
///
/// let devices = Discovery::new(Duration::from_secs(5)).run()?;
/// # Ok::<(), roku_discovery::DiscoveryError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Discovery {
    window: Duration,
    destination: String,
    search_target: String,
    mx: u8,
}

impl Discovery {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            destination: MULTICAST_ADDR.to_string(),
            search_target: ROKU_SEARCH_TARGET.to_string(),
            mx: 2,
        }
    }

    /// Send the M-SEARCH somewhere other than the multicast group.
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn search_target(mut self, search_target: impl Into<String>) -> Self {
        self.search_target = search_target.into();
        self
    }

    /// Maximum reply delay advertised to devices, in seconds.
    pub fn mx(mut self, mx: u8) -> Self {
        self.mx = mx;
        self
    }

    /// Start the search and return a streaming iterator.
    pub fn iter(&self) -> Result<DiscoveryIterator> {
        if self.window.is_zero() {
            return Err(DiscoveryError::ZeroDuration);
        }
        let client = SsdpClient::bind()?;
        let responses = client.search(&self.destination, &self.search_target, self.mx, self.window)?;
        Ok(DiscoveryIterator {
            responses,
            search_target: self.search_target.clone(),
            seen_locations: HashSet::new(),
        })
    }

    /// Run the search to completion.
    pub fn run(&self) -> Result<Vec<DiscoveredDevice>> {
        let devices: Vec<DiscoveredDevice> = self.iter()?.collect();
        info!("Discovery finished with {} device(s)", devices.len());
        Ok(devices)
    }
}

/// Iterator over devices found by a running search.
///
/// Each device is yielded once, as soon as its first reply arrives.
pub struct DiscoveryIterator {
    responses: SsdpResponseIterator,
    search_target: String,
    seen_locations: HashSet<String>,
}

impl Iterator for DiscoveryIterator {
    type Item = DiscoveredDevice;

    fn next(&mut self) -> Option<Self::Item> {
        for response in self.responses.by_ref() {
            if !response.is_roku(&self.search_target) {
                debug!("Ignoring non-Roku reply from {}", response.location);
                continue;
            }
            if !self.seen_locations.insert(response.location.clone()) {
                continue;
            }
            match to_device(response) {
                Some(device) => {
                    debug!("Found Roku device at {}", device.address);
                    return Some(device);
                }
                None => continue,
            }
        }
        None
    }
}

fn to_device(response: SsdpResponse) -> Option<DiscoveredDevice> {
    let address = address_from_location(&response.location, response.sender)?;
    Some(DiscoveredDevice {
        address,
        location: response.location,
        usn: response.usn,
    })
}

/// Host of a `LOCATION` URL as an IP address.
///
/// Hostnames are not resolved; the datagram's source address is used
/// instead when available.
pub(crate) fn address_from_location(location: &str, sender: Option<SocketAddr>) -> Option<IpAddr> {
    let from_url = Url::parse(location).ok().and_then(|url| match url.host() {
        Some(Host::Ipv4(ip)) => Some(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => Some(IpAddr::V6(ip)),
        Some(Host::Domain(_)) | None => None,
    });
    from_url.or_else(|| sender.map(|addr| addr.ip()))
}
