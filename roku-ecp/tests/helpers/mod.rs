//! Shared setup for tests that run the client against a mock device

#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use mockito::ServerGuard;
use roku_ecp::{Backoff, CancellationToken, EcpClient, RetryPolicy};

/// Load an XML document from `tests/fixtures`.
pub fn fixture(filename: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(filename);

    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", filename, e))
}

/// Address of a running mock server.
pub fn server_addr(server: &ServerGuard) -> SocketAddr {
    server
        .host_with_port()
        .parse()
        .expect("mock server address should be ip:port")
}

/// Client pointed at the mock server with the default transport policy.
pub fn client_for(server: &ServerGuard) -> EcpClient {
    client_with(server, RetryPolicy::transport(), CancellationToken::new())
}

pub fn client_with(
    server: &ServerGuard,
    retry: RetryPolicy,
    cancel: CancellationToken,
) -> EcpClient {
    let addr = server_addr(server);
    EcpClient::builder(addr.ip().to_string())
        .port(addr.port())
        .timeout(Duration::from_secs(2))
        .retry_policy(retry)
        .cancellation_token(cancel)
        .build()
        .expect("client should build for a loopback address")
}

/// Transport policy with millisecond waits, for tests that stack retries.
pub fn fast_transport() -> RetryPolicy {
    RetryPolicy::transport().with_backoff(Backoff::Exponential {
        base: Duration::from_millis(5),
        factor: 2,
    })
}

pub const LIMITED_MODE_BODY: &str =
    "ECP command not allowed in Limited mode. Change the setting in Settings > System > Advanced system settings.";
