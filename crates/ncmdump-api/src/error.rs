use thiserror::Error;

/// Top-level error type for the `ncmdump-api` crate.
///
/// Covers every failure mode of the console surfaces: login, transport,
/// HTTP status, and the shape checks needed to pull values out of the
/// ASMX JSON envelopes. `ncmdump-core` decides which of these are fatal.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login did not yield the authentication cookie.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client could not be configured.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success HTTP status from a data endpoint.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The envelope parsed, but a value had a type we cannot use.
    #[error("Unexpected response shape at {path}: {message}")]
    UnexpectedShape { path: &'static str, message: String },

    /// A paged table came back with no rows.
    #[error("{endpoint} returned an empty table")]
    EmptyTable { endpoint: &'static str },
}

impl Error {
    /// Returns `true` if the console rejected (or never granted) the session.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::Http { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    /// Returns `true` for the "no rows" outcome of a paged lookup.
    pub fn is_empty_table(&self) -> bool {
        matches!(self, Self::EmptyTable { .. })
    }

    /// Returns `true` if the request never reached the console.
    pub fn is_connect(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
