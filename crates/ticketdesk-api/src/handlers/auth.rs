//! Auth handlers — login, logout, me.

use axum::Json;
use axum::extract::State;

use crate::dto::request::LoginRequest;
use crate::dto::response::{ApiResponse, LoginResponse, MeResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthSession;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let result = state
        .session_manager
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        token: result.session.id,
        expires_at: result.session.expires_at,
        user: UserResponse::from(&result.user),
    })))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.session_manager.logout(auth.session_id).await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Logged out successfully".to_string(),
    })))
}

/// GET /api/auth/me
pub async fn me(auth: AuthSession) -> Json<ApiResponse<MeResponse>> {
    Json(ApiResponse::ok(MeResponse {
        user_id: auth.user_id,
        username: auth.username.clone(),
        role: auth.role.to_string(),
        department_id: auth.member_department(),
        managed_department_ids: auth.managed_departments().to_vec(),
    }))
}
