//! Auth-context middleware.
//!
//! Binds a session and the request cookies to an [`AuthContext`], restores
//! the current user from the remember-me cookie when the session has none,
//! attaches the principal, and emits cookie changes on the way out. A
//! session id that changed while the request ran (login, logout or a
//! remember-me restore) is sent back as a fresh session cookie.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tokio::sync::Mutex;
use tracing::debug;

use cube_auth::{AuthContext, ManageProvider, SessionStore};
use cube_core::result::AppResult;
use cube_entity::User;

use crate::error::ApiError;
use crate::extractors::SharedContext;
use crate::state::AppState;

/// Installs the per-request [`AuthContext`].
pub async fn auth_context(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let client_ip = client_ip(&request, state.config.server.trust_forwarded_for);
    let (ctx, original_sid) = match prepare_context(&state, jar, client_ip).await {
        Ok(prepared) => prepared,
        Err(e) => return ApiError(e).into_response(),
    };

    let shared: SharedContext = Arc::new(Mutex::new(ctx));
    request.extensions_mut().insert(shared.clone());

    let response = next.run(request).await;

    let ctx = shared.lock().await;
    let mut jar = ctx.jar().clone();
    if let Some(session) = ctx.session() {
        if original_sid.as_deref() != Some(session.id()) {
            jar = jar.add(session_cookie(&state.config.session.cookie_name, session.id()));
        }
    }
    (jar, response).into_response()
}

fn session_cookie(name: &str, id: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Builds the context and returns it with the session id the client sent,
/// if that id was accepted.
async fn prepare_context(
    state: &AppState,
    jar: CookieJar,
    client_ip: Option<String>,
) -> AppResult<(AuthContext, Option<String>)> {
    let existing = jar
        .get(&state.config.session.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| SessionStore::is_issued_id(v));

    let session = match &existing {
        Some(id) => state.sessions.open(id.clone()),
        None => state.sessions.create(),
    };

    let mut ctx = AuthContext::new(Some(session), jar).with_client_ip(client_ip);
    let provider = state.provider.as_ref();
    let remember = provider.remember_me().clone();

    if provider.current(&ctx).await?.is_none() && ctx.cookie(remember.cookie_key()).is_some() {
        let restored = remember.load_cookie(provider, &mut ctx, true).await?;
        if restored.is_none() {
            debug!("Clearing rejected remember-me cookie");
            remember.save_cookie::<User>(&mut ctx, None, remember.max_age());
        }
    }

    remember.set_principal(provider, &mut ctx).await?;
    Ok((ctx, existing))
}

/// The peer address, or the first `X-Forwarded-For` hop when the server
/// sits behind a trusted proxy.
fn client_ip(request: &Request, trust_forwarded_for: bool) -> Option<String> {
    let forwarded = trust_forwarded_for
        .then(|| request.headers().get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    forwarded.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http;

    fn request(forwarded: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/api/account/me");
        if let Some(value) = forwarded {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        let peer: SocketAddr = "10.1.2.3:55000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        request
    }

    #[test]
    fn test_forwarded_header_ignored_by_default() {
        let req = request(Some("203.0.113.9"));
        assert_eq!(client_ip(&req, false).as_deref(), Some("10.1.2.3"));
    }

    #[test]
    fn test_forwarded_header_used_behind_proxy() {
        let req = request(Some("203.0.113.9, 10.0.0.1"));
        assert_eq!(client_ip(&req, true).as_deref(), Some("203.0.113.9"));

        let req = request(Some("  "));
        assert_eq!(client_ip(&req, true).as_deref(), Some("10.1.2.3"));
        assert_eq!(client_ip(&request(None), true).as_deref(), Some("10.1.2.3"));
    }

    #[test]
    fn test_no_peer_address() {
        let req = http::Request::builder().body(Body::empty()).unwrap();
        assert!(client_ip(&req, false).is_none());
    }
}
