// ── Core error types ──
//
// User-facing errors from ncmdump-core. The `From<ncmdump_api::Error>`
// impl folds transport-layer failures into the handful of cases the
// front-end needs to pick a message and an exit code.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to console at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Console request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Malformed console response: {message}")]
    MalformedResponse { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Output errors ────────────────────────────────────────────────
    #[error("Failed to write config for {device}: {source}")]
    Sink {
        device: String,
        #[source]
        source: std::io::Error,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The console refused (or never granted) the session.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ncmdump_api::Error> for CoreError {
    fn from(err: ncmdump_api::Error) -> Self {
        match err {
            ncmdump_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            ncmdump_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ncmdump_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ncmdump_api::Error::Tls(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            ncmdump_api::Error::Http { status, message } => {
                if status == 401 || status == 403 {
                    CoreError::AuthenticationFailed {
                        message: format!("HTTP {status}: {message}"),
                    }
                } else {
                    CoreError::Api {
                        message,
                        status: Some(status),
                    }
                }
            }
            ncmdump_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
            err @ (ncmdump_api::Error::UnexpectedShape { .. }
            | ncmdump_api::Error::EmptyTable { .. }) => CoreError::Api {
                message: err.to_string(),
                status: None,
            },
        }
    }
}
