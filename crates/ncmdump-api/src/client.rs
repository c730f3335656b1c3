// Console HTTP client
//
// `ConsoleClient` is the unauthenticated half: it knows the base URL and
// owns the two reqwest clients. `login` (see `session.rs`) consumes it and
// hands back a `ConsoleSession`, which is the only type carrying the
// node-scoped endpoints. Endpoint methods live in their own modules as
// inherent impls; this file keeps to transport mechanics.

use reqwest::header::{CONTENT_TYPE, COOKIE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::AsmxResponse;
use crate::session::CredentialBundle;
use crate::transport::TransportConfig;

/// Marks requests as AJAX calls; the ASMX services require it for JSON.
const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// Build the console base URL from a host (optionally `host:port`), an
/// explicit port, and the scheme switch.
///
/// ```
/// let url = ncmdump_api::console_url("10.0.0.5", Some(8787), false).unwrap();
/// assert_eq!(url.as_str(), "http://10.0.0.5:8787/");
/// ```
pub fn console_url(address: &str, port: Option<u16>, tls: bool) -> Result<Url, Error> {
    let scheme = if tls { "https" } else { "http" };
    let host = address.trim().trim_end_matches('/');
    let full = match port {
        Some(port) => format!("{scheme}://{host}:{port}/"),
        None => format!("{scheme}://{host}/"),
    };
    Ok(Url::parse(&full)?)
}

// ── Unauthenticated client ───────────────────────────────────────────

/// Entry point: holds transport state until a login succeeds.
#[derive(Debug)]
pub struct ConsoleClient {
    login_http: reqwest::Client,
    http: reqwest::Client,
    base_url: Url,
}

impl ConsoleClient {
    /// Create a client for the console at `base_url`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            login_http: transport.build_login_client()?,
            http: transport.build_client()?,
            base_url,
        })
    }

    /// The console base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn login_http(&self) -> &reqwest::Client {
        &self.login_http
    }

    pub(crate) fn into_session(self, credentials: CredentialBundle) -> ConsoleSession {
        ConsoleSession {
            http: self.http,
            base_url: self.base_url,
            credentials,
        }
    }
}

// ── Authenticated session ────────────────────────────────────────────

/// An authenticated console session.
///
/// Only [`ConsoleClient::login`] constructs one. The credential bundle is
/// read-only for the life of the session and sent on every request.
#[derive(Debug)]
pub struct ConsoleSession {
    http: reqwest::Client,
    base_url: Url,
    credentials: CredentialBundle,
}

impl ConsoleSession {
    /// The console base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Cookies captured at login.
    pub fn credentials(&self) -> &CredentialBundle {
        &self.credentials
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Absolute URL for a console path plus optional query pairs.
    pub(crate) fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn with_cookies(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.cookie_header() {
            Some(header) => builder.header(COOKIE, header),
            None => builder,
        }
    }

    /// POST a JSON body to an ASMX service and unwrap `{"d": ...}`.
    pub(crate) async fn post_asmx<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let builder = self
            .http
            .post(url)
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        let resp = self
            .with_cookies(builder)
            .send()
            .await
            .map_err(Error::Transport)?;

        let body = read_body(resp).await?;

        let envelope: AsmxResponse<T> = serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        Ok(envelope.d)
    }

    /// GET a page and return its body as text.
    pub(crate) async fn get_text(&self, url: Url) -> Result<String, Error> {
        debug!("GET {}", url);

        let resp = self
            .with_cookies(self.http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        read_body(resp).await
    }
}

/// Read the body of a successful response, mapping error statuses.
async fn read_body(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Http {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        });
    }

    resp.text().await.map_err(Error::Transport)
}

/// First 200 bytes of `body`, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
