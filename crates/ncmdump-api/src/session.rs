// Console authentication
//
// Form-based login against `Login.aspx`. The console answers with a
// redirect whose `Set-Cookie` headers carry the forms-auth ticket; that
// first response is captured as a `CredentialBundle` and attached to every
// later request. Nothing is refreshed or persisted.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, trace};

use crate::client::{ConsoleClient, ConsoleSession};
use crate::error::Error;

/// Login form endpoint.
pub const LOGIN_PATH: &str = "/Orion/Login.aspx";

/// Where the login form asks to be sent back to.
const LOGIN_RETURN_URL: &str = "/Orion/NCM/ConfigurationManagement.aspx";

/// Substring of the forms-auth cookie (`.ASPXAUTH`) that marks a
/// successful login.
pub const AUTH_COOKIE_MARKER: &str = "ASPXAUTH";

const USERNAME_FIELD: &str = "ctl00$BodyContent$Username";
const PASSWORD_FIELD: &str = "ctl00$BodyContent$Password";
const EVENT_TARGET_FIELD: &str = "__EVENTTARGET";

// ── Cookies ──────────────────────────────────────────────────────────

/// One cookie from the login response.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub http_only: bool,
    pub secure: bool,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            http_only: false,
            secure: false,
        }
    }

    fn from_response(cookie: &reqwest::cookie::Cookie<'_>) -> Self {
        Self {
            name: cookie.name().to_owned(),
            value: cookie.value().to_owned(),
            path: cookie.path().map(String::from),
            domain: cookie.domain().map(String::from),
            http_only: cookie.http_only(),
            secure: cookie.secure(),
        }
    }
}

/// `Set-Cookie` style rendering: `name=value; Path=/; HttpOnly`.
impl fmt::Display for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(ref path) = self.path {
            write!(f, "; Path={path}")?;
        }
        if let Some(ref domain) = self.domain {
            write!(f, "; Domain={domain}")?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Ordered set of cookies proving an authenticated session.
///
/// Produced once per run by [`ConsoleClient::login`] and only read
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialBundle {
    cookies: Vec<SessionCookie>,
}

impl CredentialBundle {
    pub fn new(cookies: Vec<SessionCookie>) -> Self {
        Self { cookies }
    }

    pub fn cookies(&self) -> &[SessionCookie] {
        &self.cookies
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Every cookie in `Set-Cookie` form, space separated.
    pub fn serialized(&self) -> String {
        self.cookies
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Does the serialized bundle contain `marker`?
    pub fn contains_marker(&self, marker: &str) -> bool {
        self.serialized().contains(marker)
    }

    /// Value for an outgoing `Cookie` header (`a=1; b=2`), if any.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

// ── Login ────────────────────────────────────────────────────────────

impl ConsoleClient {
    /// Submit the login form and capture the session cookies.
    ///
    /// Only the first response is inspected; redirects are not followed.
    /// The HTTP status is irrelevant (the console answers a good login with
    /// 302): success means the returned cookies include
    /// [`AUTH_COOKIE_MARKER`]. Anything else is [`Error::Authentication`].
    pub async fn login(
        self,
        username: &str,
        password: &SecretString,
    ) -> Result<ConsoleSession, Error> {
        let mut url = self.base_url().join(LOGIN_PATH)?;
        url.query_pairs_mut().append_pair("ReturnUrl", LOGIN_RETURN_URL);

        debug!("logging in at {}", url);

        let form = [
            (USERNAME_FIELD, username),
            (PASSWORD_FIELD, password.expose_secret()),
            (EVENT_TARGET_FIELD, ""),
        ];

        let resp = self
            .login_http()
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let bundle = CredentialBundle::new(
            resp.cookies()
                .map(|c| SessionCookie::from_response(&c))
                .collect(),
        );

        for cookie in bundle.cookies() {
            trace!(name = %cookie.name, "login response cookie");
        }

        if !bundle.contains_marker(AUTH_COOKIE_MARKER) {
            return Err(Error::Authentication {
                message: format!(
                    "no {AUTH_COOKIE_MARKER} cookie in login response (HTTP {status}) for {}",
                    self.base_url()
                ),
            });
        }

        info!("login successful for {}", self.base_url());
        Ok(self.into_session(bundle))
    }
}
