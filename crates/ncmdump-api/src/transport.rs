// Shared transport configuration for building reqwest::Client instances.
//
// The login client and the data client differ only in redirect policy;
// TLS, user agent, and timeout come from this one place.

use std::time::Duration;

use reqwest::redirect::Policy;

/// User agent sent on every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = "NCM Dump";

/// Shared transport configuration for building HTTP clients.
///
/// Certificates are never verified: NCM consoles almost always run on
/// self-signed certificates and the tool treats this as a fixed setting.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub user_agent: String,
    /// `None` keeps reqwest's default (no overall request timeout).
    pub timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.into(),
            timeout: None,
        }
    }
}

impl TransportConfig {
    /// Build the client used for every post-login call.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        self.builder()
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Build the login client.
    ///
    /// Redirects are not followed: the authentication cookie is set on the
    /// first hop, and the caller inspects that response's headers.
    pub fn build_login_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        self.builder()
            .redirect(Policy::none())
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build login client: {e}")))
    }

    fn builder(&self) -> reqwest::ClientBuilder {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .danger_accept_invalid_certs(true);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder
    }
}
