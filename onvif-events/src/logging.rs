//! Diagnostic tracing setup
//!
//! Standard output is reserved for the JSON event log written through a
//! [`LogSink`](crate::sink::LogSink). Library diagnostics (request/response
//! tracing, parse warnings) therefore always go to stderr, and are off
//! unless asked for.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No diagnostics, only the event log on stdout
    Silent,
    /// Compact stderr output
    Diagnostics,
    /// Verbose stderr output with source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}

/// Initialize diagnostics with the specified mode
///
/// # Environment Variables
///
/// - `ONVIF_LOG_LEVEL`: Override the filter (error, warn, info, debug, trace,
///   or a full directive such as `soap_client=trace`)
/// - `RUST_LOG`: Used when `ONVIF_LOG_LEVEL` is not set
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    init_logging_with_filter(mode, None)
}

/// Initialize diagnostics with an explicit filter directive
///
/// An explicit directive takes precedence over the environment.
pub fn init_logging_with_filter(
    mode: LoggingMode,
    directive: Option<&str>,
) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Diagnostics => {
            let filter = create_env_filter(directive, "warn")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_thread_ids(false)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter(directive, "debug")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
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

/// Pick a mode from an optional filter directive
///
/// No directive means silent unless the environment asks for diagnostics.
/// Any `debug` or `trace` level in the directive selects verbose output.
pub fn mode_for_level(level: Option<&str>) -> LoggingMode {
    let from_env = std::env::var("ONVIF_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();

    match level.or(from_env.as_deref()) {
        None => LoggingMode::Silent,
        Some(directive) if directive.trim().eq_ignore_ascii_case("off") => LoggingMode::Silent,
        Some(directive) if directive.split(',').any(is_verbose) => LoggingMode::Debug,
        Some(_) => LoggingMode::Diagnostics,
    }
}

fn is_verbose(part: &str) -> bool {
    let level = part.rsplit('=').next().unwrap_or(part).trim();
    level.eq_ignore_ascii_case("debug") || level.eq_ignore_ascii_case("trace")
}

/// Check a filter directive without installing it
pub fn validate_filter(directive: &str) -> Result<(), LoggingError> {
    create_env_filter(Some(directive), "warn").map(|_| ())
}

/// Create an environment filter with fallback to default level
fn create_env_filter(directive: Option<&str>, default_level: &str) -> Result<EnvFilter, LoggingError> {
    // Explicit directive, then ONVIF_LOG_LEVEL, then RUST_LOG, then default
    let directive = match directive {
        Some(directive) => directive.to_string(),
        None => std::env::var("ONVIF_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| default_level.to_string()),
    };

    EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter(format!("{directive}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[test]
    fn test_explicit_level_selects_mode() {
        assert_eq!(mode_for_level(Some("off")), LoggingMode::Silent);
        assert_eq!(mode_for_level(Some("trace")), LoggingMode::Debug);
        assert_eq!(mode_for_level(Some("info")), LoggingMode::Diagnostics);
        assert_eq!(mode_for_level(Some("DEBUG")), LoggingMode::Debug);
    }

    #[test]
    fn test_directive_selects_mode() {
        assert_eq!(mode_for_level(Some("soap_client=trace")), LoggingMode::Debug);
        assert_eq!(mode_for_level(Some("warn,onvif_api=debug")), LoggingMode::Debug);
        assert_eq!(mode_for_level(Some("soap_client=info")), LoggingMode::Diagnostics);
    }

    #[test]
    fn test_validate_filter_accepts_levels_and_directives() {
        assert!(validate_filter("info").is_ok());
        assert!(validate_filter("soap_client=trace").is_ok());
        assert!(validate_filter("warn,onvif_events=debug").is_ok());
        assert!(matches!(
            validate_filter("soap_client=loudest"),
            Err(LoggingError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        assert!(create_env_filter(Some("soap_client=loudest"), "warn").is_err());
        assert!(create_env_filter(Some("soap_client=trace"), "warn").is_ok());
    }
}
