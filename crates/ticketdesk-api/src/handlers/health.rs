//! Health check handler.

use axum::Json;
use axum::extract::State;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let database_ok = ticketdesk_database::connection::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    Ok(Json(json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "database": database_ok,
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
