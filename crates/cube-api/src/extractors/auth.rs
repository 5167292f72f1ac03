//! Extractors exposing the per-request [`AuthContext`] to handlers.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::sync::Mutex;

use cube_auth::{AuthContext, ManageProvider, Principal};
use cube_core::error::AppError;
use cube_entity::User;

use crate::error::ApiError;
use crate::state::AppState;

/// Context shared between the auth middleware and the handler.
pub type SharedContext = Arc<Mutex<AuthContext>>;

/// The request's auth context, installed by the `auth_context` middleware.
#[derive(Debug, Clone)]
pub struct Auth(pub SharedContext);

impl std::ops::Deref for Auth {
    type Target = SharedContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SharedContext>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| ApiError(AppError::internal("Auth context middleware is not installed")))
    }
}

/// A logged-in user and its principal; rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub principal: Principal,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(shared) = Auth::from_request_parts(parts, state).await?;
        let ctx = shared.lock().await;

        let principal = ctx
            .principal()
            .cloned()
            .ok_or_else(|| AppError::authentication("Not logged in"))?;
        let user = state
            .provider
            .current(&ctx)
            .await?
            .ok_or_else(|| AppError::authentication("Not logged in"))?;

        Ok(Self { user, principal })
    }
}
