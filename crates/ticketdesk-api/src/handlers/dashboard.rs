//! Dashboard handlers.
//!
//! The bucket `filter` parameter narrows the listing only; the aggregate
//! counts always cover the full role scope.

use axum::Json;
use axum::extract::{Query, State};

use ticketdesk_service::ticket::query::Dashboard;

use crate::dto::request::TicketListParams;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthSession;
use crate::state::AppState;

/// GET /api/dashboard/user — own-department dashboard for Users.
pub async fn user_dashboard(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(params): Query<TicketListParams>,
) -> Result<Json<ApiResponse<Dashboard>>, ApiError> {
    let dashboard = state
        .queries
        .user_dashboard(&auth, params.bucket(), &params.filter(), params.sort())
        .await?;
    Ok(Json(ApiResponse::ok(dashboard)))
}

/// GET /api/dashboard/manager — managed-departments dashboard.
pub async fn manager_dashboard(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(params): Query<TicketListParams>,
) -> Result<Json<ApiResponse<Dashboard>>, ApiError> {
    let dashboard = state
        .queries
        .manager_dashboard(&auth, params.bucket(), &params.filter(), params.sort())
        .await?;
    Ok(Json(ApiResponse::ok(dashboard)))
}
