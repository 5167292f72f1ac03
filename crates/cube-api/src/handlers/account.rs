//! Account handlers: login, logout, register, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use cube_auth::ManageProvider;
use cube_core::error::AppError;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, MeResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::{Auth, CurrentUser};
use crate::state::AppState;

/// POST /api/account/login
pub async fn login(
    State(state): State<AppState>,
    auth: Auth,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let mut ctx = auth.lock().await;
    let provider = state.provider.as_ref();

    let user = provider
        .login(&mut ctx, &req.username, &req.password, req.remember_me)
        .await?
        .ok_or_else(|| AppError::authentication("Invalid user name or password"))?;
    provider.remember_me().set_principal(provider, &mut ctx).await?;

    Ok(Json(ApiResponse::ok(user.into())))
}

/// POST /api/account/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: Auth,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let mut ctx = auth.lock().await;
    state.provider.logout(&mut ctx).await?;
    ctx.set_principal(None);

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Logged out".to_string(),
    })))
}

/// POST /api/account/register
///
/// Anonymous sign-up: the account is enabled and gets the configured
/// default role whatever the body says.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let user = state
        .provider
        .register(&req.username, &req.password, state.default_role_id, true)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user.into()))))
}

/// GET /api/account/me
pub async fn me(current: CurrentUser) -> Json<ApiResponse<MeResponse>> {
    Json(ApiResponse::ok(MeResponse {
        user: current.user.into(),
        roles: current.principal.roles,
    }))
}
