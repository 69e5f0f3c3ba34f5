//! Logging setup for the `roku` binary
//!
//! Interactive sessions draw on the alternate screen, so anything written to
//! stderr while they run corrupts the display. Those commands default to
//! [`LoggingMode::Silent`].

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber at all
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with source locations
    Debug,
}

impl LoggingMode {
    /// Parse `silent`, `development`/`dev` or `debug`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "silent" | "off" => Some(LoggingMode::Silent),
            "development" | "dev" => Some(LoggingMode::Development),
            "debug" => Some(LoggingMode::Debug),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },
}

/// Initialize logging once for the process.
///
/// The filter comes from `ROKU_LOG_LEVEL`, then `RUST_LOG`, then
/// `default_level` (usually the `--log-level` flag).
pub fn init_logging(mode: LoggingMode, default_level: &str) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter(mode, default_level)?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter(mode, default_level)?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Pick the mode from `ROKU_LOG_MODE`, falling back to `fallback`.
pub fn mode_from_env(fallback: LoggingMode) -> LoggingMode {
    std::env::var("ROKU_LOG_MODE")
        .ok()
        .and_then(|value| LoggingMode::parse(&value))
        .unwrap_or(fallback)
}

fn create_env_filter(mode: LoggingMode, default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = filter_directive(
        mode,
        std::env::var("ROKU_LOG_LEVEL").ok(),
        std::env::var("RUST_LOG").ok(),
        default_level,
    )
    .unwrap_or_else(|| "off".to_string());

    EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter {
        filter: directive.clone(),
        message: e.to_string(),
    })
}

/// Filter directive for a mode. Every mode that installs a subscriber
/// honours the same precedence; only the output format differs.
fn filter_directive(
    mode: LoggingMode,
    roku_level: Option<String>,
    rust_log: Option<String>,
    default_level: &str,
) -> Option<String> {
    match mode {
        LoggingMode::Silent => None,
        LoggingMode::Development | LoggingMode::Debug => {
            Some(resolve_filter(roku_level, rust_log, default_level))
        }
    }
}

fn resolve_filter(roku_level: Option<String>, rust_log: Option<String>, default_level: &str) -> String {
    roku_level
        .filter(|v| !v.trim().is_empty())
        .or_else(|| rust_log.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| default_level.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent, "info").is_ok());
    }

    #[rstest]
    #[case("silent", Some(LoggingMode::Silent))]
    #[case("DEV", Some(LoggingMode::Development))]
    #[case(" debug ", Some(LoggingMode::Debug))]
    #[case("verbose", None)]
    fn test_parse_mode(#[case] value: &str, #[case] expected: Option<LoggingMode>) {
        assert_eq!(LoggingMode::parse(value), expected);
    }

    #[test]
    fn test_filter_precedence() {
        assert_eq!(
            resolve_filter(Some("trace".into()), Some("warn".into()), "info"),
            "trace"
        );
        assert_eq!(resolve_filter(None, Some("warn".into()), "info"), "warn");
        assert_eq!(resolve_filter(Some("  ".into()), None, "error"), "error");
    }

    #[rstest]
    #[case(LoggingMode::Development)]
    #[case(LoggingMode::Debug)]
    fn test_mode_uses_flag_level(#[case] mode: LoggingMode) {
        assert_eq!(filter_directive(mode, None, None, "warn").as_deref(), Some("warn"));
        assert_eq!(
            filter_directive(mode, Some("trace".into()), None, "warn").as_deref(),
            Some("trace")
        );
    }

    #[test]
    fn test_silent_has_no_directive() {
        assert_eq!(filter_directive(LoggingMode::Silent, None, None, "info"), None);
    }
}
