//! Department handlers.

use axum::Json;
use axum::extract::State;

use ticketdesk_entity::department::Department;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthSession;
use crate::state::AppState;

/// GET /api/departments — leaf departments, by name.
pub async fn leaves(
    State(state): State<AppState>,
    _auth: AuthSession,
) -> Result<Json<ApiResponse<Vec<Department>>>, ApiError> {
    let departments = state.departments.leaves().await?;
    Ok(Json(ApiResponse::ok(departments)))
}

/// GET /api/departments/targets — leaves the caller may target with a
/// new ticket.
pub async fn creation_targets(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<ApiResponse<Vec<Department>>>, ApiError> {
    let departments = state.departments.creation_targets(&auth).await?;
    Ok(Json(ApiResponse::ok(departments)))
}
