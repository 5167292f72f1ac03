//! User lookup handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use cube_auth::ManageProvider;
use cube_core::error::AppError;

use crate::dto::request::CreateUserRequest;
use crate::dto::response::{ApiResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::state::AppState;

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .provider
        .find_by_id_str(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

    Ok(Json(ApiResponse::ok(user.into())))
}

/// POST /api/users
///
/// Creates an account with an explicit role and status. Administrators only.
pub async fn create_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    if !current.principal.is_in_role(ADMINISTRATOR_ROLE) {
        return Err(AppError::authorization("Administrator role required").into());
    }

    let user = state
        .provider
        .register(&req.username, &req.password, req.role_id, req.enabled)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user.into()))))
}

const ADMINISTRATOR_ROLE: &str = "Administrator";
