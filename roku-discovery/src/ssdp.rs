//! SSDP M-SEARCH client
//!
//! Sends one search request and reads unicast replies until a deadline. Not
//! part of the public API.

use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::{DiscoveryError, Result};

/// Standard SSDP multicast group and port.
pub(crate) const MULTICAST_ADDR: &str = "239.255.255.250:1900";

/// A parsed reply to an M-SEARCH request
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SsdpResponse {
    pub location: String,
    pub st: String,
    pub usn: String,
    pub server: Option<String>,
    /// Source address of the datagram
    pub sender: Option<SocketAddr>,
}

impl SsdpResponse {
    /// Whether the reply came from an ECP-capable device.
    pub fn is_roku(&self, search_target: &str) -> bool {
        if self.st.contains(search_target) || self.usn.contains(search_target) {
            return true;
        }
        self.server
            .as_deref()
            .map(|server| server.to_ascii_lowercase().contains("roku"))
            .unwrap_or(false)
    }
}

pub(crate) struct SsdpClient {
    socket: UdpSocket,
}

impl SsdpClient {
    pub fn bind() -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| DiscoveryError::Network(format!("Failed to bind UDP socket: {}", e)))?;

        socket
            .set_multicast_loop_v4(true)
            .map_err(|e| DiscoveryError::Network(format!("Failed to set multicast loop: {}", e)))?;

        Ok(Self { socket })
    }

    /// Send an M-SEARCH for `search_target` to `destination` and return an
    /// iterator over replies received within `window`.
    pub fn search(
        self,
        destination: &str,
        search_target: &str,
        mx: u8,
        window: Duration,
    ) -> Result<SsdpResponseIterator> {
        let request = format!(
            "M-SEARCH * HTTP/1.1\r\n\
             HOST: 239.255.255.250:1900\r\n\
             MAN: \"ssdp:discover\"\r\n\
             MX: {}\r\n\
             ST: {}\r\n\
             USER-AGENT: roku-remote/{} UPnP/1.0\r\n\
             \r\n",
            mx,
            search_target,
            env!("CARGO_PKG_VERSION")
        );

        self.socket
            .send_to(request.as_bytes(), destination)
            .map_err(|e| DiscoveryError::Network(format!("Failed to send M-SEARCH: {}", e)))?;
        debug!("Sent M-SEARCH for {} to {}", search_target, destination);

        Ok(SsdpResponseIterator {
            socket: self.socket,
            buffer: [0; 2048],
            deadline: Instant::now() + window,
            finished: false,
        })
    }
}

/// Iterator over SSDP replies, ending at the deadline.
///
/// Datagrams that are not valid UTF-8 or lack a required header are skipped.
pub(crate) struct SsdpResponseIterator {
    socket: UdpSocket,
    buffer: [u8; 2048],
    deadline: Instant,
    finished: bool,
}

impl Iterator for SsdpResponseIterator {
    type Item = SsdpResponse;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let remaining = self.deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.finished = true;
                break;
            }
            if let Err(e) = self.socket.set_read_timeout(Some(remaining)) {
                debug!("Failed to set read timeout: {}", e);
                self.finished = true;
                break;
            }

            match self.socket.recv_from(&mut self.buffer) {
                Ok((size, sender)) => {
                    let Ok(text) = std::str::from_utf8(&self.buffer[..size]) else {
                        trace!("Skipping non UTF-8 datagram from {}", sender);
                        continue;
                    };
                    match parse_ssdp_response(text) {
                        Some(mut response) => {
                            response.sender = Some(sender);
                            return Some(response);
                        }
                        None => trace!("Skipping malformed SSDP reply from {}", sender),
                    }
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    self.finished = true;
                }
                Err(e) => {
                    debug!("SSDP socket error: {}", e);
                    self.finished = true;
                }
            }
        }
        None
    }
}

/// Parse an SSDP reply. `LOCATION`, `ST` and `USN` are required.
pub(crate) fn parse_ssdp_response(response: &str) -> Option<SsdpResponse> {
    let mut lines = response.lines();
    let status = lines.next()?.trim();
    if !status.to_ascii_uppercase().starts_with("HTTP/") {
        return None;
    }

    let mut location = None;
    let mut st = None;
    let mut usn = None;
    let mut server = None;

    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match name.trim().to_ascii_uppercase().as_str() {
            "LOCATION" => location = Some(value),
            "ST" => st = Some(value),
            "USN" => usn = Some(value),
            "SERVER" => server = Some(value),
            _ => {}
        }
    }

    Some(SsdpResponse {
        location: location.filter(|l| !l.is_empty())?,
        st: st?,
        usn: usn?,
        server,
        sender: None,
    })
}
