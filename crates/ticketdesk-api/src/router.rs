//! Route definitions for the TicketDesk HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`. The
//! router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(ticket_routes())
        .merge(dashboard_routes())
        .merge(department_routes())
        .merge(admin_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Auth endpoints: login, logout, me.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
}

/// Ticket creation, listings, detail, and workflow actions.
fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(handlers::ticket::my_created))
        .route("/tickets", post(handlers::ticket::create))
        .route("/tickets/assigned", get(handlers::ticket::my_assigned))
        .route("/tickets/{id}", get(handlers::ticket::detail))
        .route(
            "/tickets/{id}/attachments/{attachment_id}",
            get(handlers::ticket::attachment),
        )
        .route("/tickets/{id}/manage", post(handlers::ticket::self_manage))
        .route("/tickets/{id}/approve", post(handlers::ticket::approve_and_assign))
        .route("/tickets/{id}/solve", post(handlers::ticket::solve_myself))
        .route("/tickets/{id}/close-solved", post(handlers::ticket::close_solved))
        .route("/tickets/{id}/status", post(handlers::ticket::change_status))
}

/// Role dashboards.
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/user", get(handlers::dashboard::user_dashboard))
        .route("/dashboard/manager", get(handlers::dashboard::manager_dashboard))
}

/// Department listings.
fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/departments", get(handlers::department::leaves))
        .route("/departments/targets", get(handlers::department::creation_targets))
}

/// Admin-only surfaces.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/tickets", get(handlers::admin::tickets))
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users", post(handlers::admin::create_user))
        .route("/admin/users/{id}", get(handlers::admin::get_user))
        .route("/admin/users/{id}", put(handlers::admin::update_user))
}

/// Liveness endpoint.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// CORS layer from configuration; `*` means permissive.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors.allowed_origins;

    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
