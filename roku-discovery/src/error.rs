//! Error types for the discovery system.

use thiserror::Error;

/// Failures that stop a search before any response can be read.
///
/// Malformed or unrelated responses are skipped silently and never surface
/// as errors.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Socket creation, configuration or send failed
    #[error("network error: {0}")]
    Network(String),
    /// The search window was zero
    #[error("search duration must be greater than zero")]
    ZeroDuration,
}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
