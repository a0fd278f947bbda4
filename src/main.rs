//! TicketDesk Server — internal helpdesk ticketing service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use ticketdesk_core::config::AppConfig;
use ticketdesk_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("TICKETDESK_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TicketDesk v{}", env!("CARGO_PKG_VERSION"));

    // ── Database: pool, migrations, seed ─────────────────────────
    let db_pool = ticketdesk_database::connection::create_pool(&config.database).await?;

    if config.database.run_migrations {
        ticketdesk_database::migration::run_migrations(&db_pool).await?;
    }

    let verifier = ticketdesk_auth::CredentialVerifier::new();
    if config.database.seed_on_startup {
        ticketdesk_database::seed::run(&db_pool, &verifier.hash("1234")).await?;
    }

    // ── Repositories ─────────────────────────────────────────────
    use ticketdesk_database::repositories::attachment::AttachmentRepository;
    use ticketdesk_database::repositories::department::DepartmentRepository;
    use ticketdesk_database::repositories::history::HistoryRepository;
    use ticketdesk_database::repositories::session::SessionRepository;
    use ticketdesk_database::repositories::ticket::TicketRepository;
    use ticketdesk_database::repositories::user::UserRepository;

    let department_repo = Arc::new(DepartmentRepository::new(db_pool.clone()));
    let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
    let ticket_repo = Arc::new(TicketRepository::new(db_pool.clone()));
    let history_repo = Arc::new(HistoryRepository::new(db_pool.clone()));
    let attachment_repo = Arc::new(AttachmentRepository::new(db_pool.clone()));
    let session_repo = Arc::new(SessionRepository::new(db_pool.clone()));

    // ── Storage ──────────────────────────────────────────────────
    let attachment_store = Arc::new(
        ticketdesk_storage::AttachmentStore::new(&config.storage.upload_root).await?,
    );

    // ── Auth ─────────────────────────────────────────────────────
    let session_store = Arc::new(ticketdesk_auth::SessionStore::new(
        Arc::clone(&session_repo),
        config.session.clone(),
    ));
    let session_manager = Arc::new(ticketdesk_auth::SessionManager::new(
        Arc::clone(&session_store),
        Arc::clone(&user_repo),
        verifier.clone(),
    ));

    let purged = session_store.purge_expired().await?;
    if purged > 0 {
        tracing::info!(purged, "Removed expired sessions");
    }

    // ── Services ─────────────────────────────────────────────────
    let workflow = Arc::new(ticketdesk_service::ticket::TicketWorkflowService::new(
        Arc::clone(&ticket_repo),
        Arc::clone(&department_repo),
        Arc::clone(&user_repo),
        Arc::clone(&attachment_repo),
        Arc::clone(&attachment_store),
    ));
    let queries = Arc::new(ticketdesk_service::ticket::TicketQueryService::new(
        Arc::clone(&ticket_repo),
        Arc::clone(&history_repo),
        Arc::clone(&attachment_repo),
        Arc::clone(&user_repo),
        Arc::clone(&attachment_store),
    ));
    let departments = Arc::new(ticketdesk_service::department::DepartmentService::new(
        Arc::clone(&department_repo),
        Arc::clone(&user_repo),
    ));
    let user_admin = Arc::new(ticketdesk_service::user::UserAdminService::new(
        Arc::clone(&user_repo),
        Arc::clone(&department_repo),
        verifier,
    ));

    // ── HTTP server ──────────────────────────────────────────────
    let state = ticketdesk_api::AppState {
        config: Arc::new(config.clone()),
        db_pool,
        session_store,
        session_manager,
        workflow,
        queries,
        departments,
        user_admin,
    };

    let app = ticketdesk_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("TicketDesk server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("TicketDesk server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
