//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ncmdump_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Connection failed to {url}")]
    #[diagnostic(
        code(ncmdump::connection_failed),
        help(
            "Check the console address and port, and whether it expects --tls.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(ncmdump::timeout),
        help("Increase the limit with --timeout or check console responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(ncmdump::auth_failed),
        help("Verify --username and --password (or use --ask-password).")
    )]
    AuthFailed { message: String },

    // ── Console responses ────────────────────────────────────────────
    #[error("Unexpected response from console: {message}")]
    #[diagnostic(
        code(ncmdump::malformed_response),
        help("Make sure the address points at an Orion console with NCM installed.")
    )]
    MalformedResponse { message: String },

    #[error("{}", api_message(*status, message))]
    #[diagnostic(code(ncmdump::api_error))]
    ApiError { message: String, status: Option<u16> },

    // ── Output ───────────────────────────────────────────────────────
    #[error("Could not write configuration for {device}")]
    #[diagnostic(
        code(ncmdump::write_failed),
        help("Check that --output-dir exists or can be created and is writable.")
    )]
    Sink {
        device: String,
        #[source]
        source: std::io::Error,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ncmdump::validation))]
    Validation { field: String, reason: String },

    #[error("No console address given")]
    #[diagnostic(
        code(ncmdump::no_address),
        help("Pass --ip <HOST>, set NCMDUMP_ADDRESS, or add `address` to {path}")
    )]
    NoAddress { path: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(ncmdump::no_config))]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(ncmdump::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not encode output: {0}")]
    #[diagnostic(code(ncmdump::json))]
    Json(#[from] serde_json::Error),
}

fn api_message(status: Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("Console returned HTTP {status}: {message}"),
        None => format!("Console error: {message}"),
    }
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoAddress { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::MalformedResponse { message } => CliError::MalformedResponse { message },
            CoreError::Api { message, status } => CliError::ApiError { message, status },
            CoreError::Sink { device, source } => CliError::Sink { device, source },
            CoreError::Config { message } => CliError::Validation {
                field: "address".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_exits_with_auth_code() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "no session ticket".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn connection_and_timeout_codes() {
        let refused = CliError::from(CoreError::ConnectionFailed {
            url: "http://10.0.0.5/".into(),
            reason: "connection refused".into(),
        });
        assert_eq!(refused.exit_code(), exit_code::CONNECTION);
        assert_eq!(CliError::from(CoreError::Timeout).exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn api_error_mentions_status() {
        let err = CliError::from(CoreError::Api {
            message: "Internal Server Error".into(),
            status: Some(500),
        });
        assert_eq!(err.exit_code(), exit_code::GENERAL);
        assert!(err.to_string().contains("HTTP 500"));
    }
}
