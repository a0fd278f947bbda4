//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use ticketdesk_auth::session::manager::SessionManager;
use ticketdesk_auth::session::store::SessionStore;
use ticketdesk_core::config::AppConfig;
use ticketdesk_service::department::DepartmentService;
use ticketdesk_service::ticket::{TicketQueryService, TicketWorkflowService};
use ticketdesk_service::user::UserAdminService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Session persistence, used by the auth extractor.
    pub session_store: Arc<SessionStore>,
    /// Login/logout lifecycle.
    pub session_manager: Arc<SessionManager>,
    /// Ticket workflow engine.
    pub workflow: Arc<TicketWorkflowService>,
    /// Ticket listing and dashboard queries.
    pub queries: Arc<TicketQueryService>,
    /// Department listings.
    pub departments: Arc<DepartmentService>,
    /// Admin account management.
    pub user_admin: Arc<UserAdminService>,
}
