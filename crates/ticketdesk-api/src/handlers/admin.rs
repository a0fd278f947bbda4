//! Admin handlers — the unrestricted ticket listing and account
//! management. Role enforcement lives in the services.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use ticketdesk_entity::ticket::TicketListItem;
use ticketdesk_entity::user::AppUser;
use ticketdesk_service::user::admin::{CreateUserRequest, UpdateUserRequest, UserSummary};

use crate::dto::request::TicketListParams;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthSession;
use crate::state::AppState;

/// Query parameters for the user listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSearchParams {
    /// Username substring.
    pub search: Option<String>,
}

/// GET /api/admin/tickets — every ticket, optionally narrowed to one
/// target department via `department_id`.
pub async fn tickets(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(params): Query<TicketListParams>,
) -> Result<Json<ApiResponse<Vec<TicketListItem>>>, ApiError> {
    let tickets = state
        .queries
        .admin_listing(&auth, params.department_id, &params.filter(), params.sort())
        .await?;
    Ok(Json(ApiResponse::ok(tickets)))
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(params): Query<UserSearchParams>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let users = state
        .user_admin
        .list_users(&auth, params.search.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /api/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let user = state.user_admin.get_user(&auth, id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<AppUser>>, ApiError> {
    let user = state.user_admin.create_user(&auth, req).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<AppUser>>, ApiError> {
    let user = state.user_admin.update_user(&auth, id, req).await?;
    Ok(Json(ApiResponse::ok(user)))
}
