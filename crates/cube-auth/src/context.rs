//! Per-request authentication context.

use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::principal::Principal;
use crate::session::Session;

/// Everything the providers need from one request: its session (if any),
/// its cookies, the principal attached so far, and the client address.
///
/// Cookies added here are emitted as `Set-Cookie` headers when the jar is
/// returned as part of the response.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    session: Option<Session>,
    jar: CookieJar,
    principal: Option<Principal>,
    client_ip: Option<String>,
}

impl AuthContext {
    /// Creates a context from a session and the request cookies.
    pub fn new(session: Option<Session>, jar: CookieJar) -> Self {
        Self {
            session,
            jar,
            principal: None,
            client_ip: None,
        }
    }

    /// A context with no session and no cookies.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Sets the client address recorded on login.
    pub fn with_client_ip(mut self, ip: Option<String>) -> Self {
        self.client_ip = ip;
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Swaps in a regenerated session. The caller is responsible for
    /// sending its id back to the client.
    pub fn replace_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Current value of a cookie, including cookies added during this request.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.jar.get(name).map(|c| c.value().to_string())
    }

    /// Adds (or replaces) a response cookie.
    pub fn add_cookie(&mut self, cookie: Cookie<'static>) {
        self.jar = std::mem::take(&mut self.jar).add(cookie);
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn set_principal(&mut self, principal: Option<Principal>) {
        self.principal = principal;
    }

    pub fn client_ip(&self) -> Option<&str> {
        self.client_ip.as_deref()
    }
}
