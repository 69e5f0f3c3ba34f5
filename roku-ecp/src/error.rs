//! Error types for the ECP client

use thiserror::Error;

/// Substring a device puts in a 403 body when it is in Limited mode.
pub const LIMITED_MODE_MARKER: &str = "Limited mode";

/// Remediation shown to the user whenever a device reports Limited mode.
pub const LIMITED_MODE_HINT: &str = "Try pressing the Home button 5 times quickly on your Roku remote \
to exit Limited mode, or use 'roku apps active' to see the current app";

/// Errors that can occur while talking to a Roku device
///
/// The first three variants are validation failures detected before any
/// request is sent; they are never retried.
#[derive(Debug, Error)]
pub enum EcpError {
    /// Missing or malformed device address
    #[error("invalid target address '{0}'")]
    InvalidTarget(String),

    /// Action name not present in the action table
    #[error("unrecognized action '{0}'")]
    UnrecognizedAction(String),

    /// Install or launch called with a blank app identifier
    #[error("{operation} requires a non-empty app identifier")]
    EmptyIdentifier {
        /// Operation that was rejected ("launch" or "install")
        operation: &'static str,
    },

    /// Connection, timeout or other transport failure
    #[error("unable to reach {endpoint}: {message}")]
    Unreachable { endpoint: String, message: String },

    /// The device refused the request because it is in Limited mode
    #[error("roku device is in Limited mode and rejected {endpoint}. {}", LIMITED_MODE_HINT)]
    RestrictedMode { endpoint: String },

    /// Non-2xx status that is not otherwise classified
    #[error("unexpected status {status} from {endpoint}: {body}")]
    Protocol {
        status: u16,
        endpoint: String,
        body: String,
    },

    /// A 2xx response whose XML body could not be decoded
    #[error("failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The retry ceiling was reached; carries the last underlying error
    #[error("operation failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<EcpError>,
    },

    /// The operation was aborted by the caller's cancellation token
    #[error("operation cancelled")]
    Cancelled,
}

impl EcpError {
    /// Whether a failed attempt may succeed if repeated.
    ///
    /// Validation errors, Limited mode, cancellation and 400/404 statuses are final.
    pub fn is_transient(&self) -> bool {
        match self {
            EcpError::Unreachable { .. } | EcpError::Decode { .. } => true,
            EcpError::Protocol { status, .. } => !matches!(status, 400 | 404),
            EcpError::RetriesExhausted { .. } => true,
            EcpError::InvalidTarget(_)
            | EcpError::UnrecognizedAction(_)
            | EcpError::EmptyIdentifier { .. }
            | EcpError::RestrictedMode { .. }
            | EcpError::Cancelled => false,
        }
    }

    /// Whether this error was raised before any network I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EcpError::InvalidTarget(_)
                | EcpError::UnrecognizedAction(_)
                | EcpError::EmptyIdentifier { .. }
        )
    }

    /// The innermost error, looking through retry exhaustion wrappers.
    pub fn root_cause(&self) -> &EcpError {
        match self {
            EcpError::RetriesExhausted { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether the device reported Limited mode, directly or after retries.
    pub fn is_restricted_mode(&self) -> bool {
        matches!(self.root_cause(), EcpError::RestrictedMode { .. })
    }

    /// Wrap `last` as a retry exhaustion unless it already is one.
    pub(crate) fn exhausted(attempts: u32, last: EcpError) -> Self {
        match last {
            EcpError::RetriesExhausted { .. } | EcpError::Cancelled => last,
            other => EcpError::RetriesExhausted {
                attempts,
                source: Box::new(other),
            },
        }
    }
}

/// Type alias for results that can return an EcpError
pub type Result<T> = std::result::Result<T, EcpError>;
