//! Ticket history repository implementation.
//!
//! History rows are inserted by [`TicketRepository::apply_transition`]
//! inside the workflow transaction; this repository only reads them back.
//!
//! [`TicketRepository::apply_transition`]: super::ticket::TicketRepository::apply_transition

use sqlx::PgPool;

use ticketdesk_core::error::{AppError, ErrorKind};
use ticketdesk_core::result::AppResult;
use ticketdesk_entity::history::TicketHistory;

/// Read-side repository for the append-only transition log.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: PgPool,
}

impl HistoryRepository {
    /// Create a new history repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All transitions for a ticket, oldest first.
    pub async fn find_by_ticket(&self, ticket_id: i64) -> AppResult<Vec<TicketHistory>> {
        sqlx::query_as::<_, TicketHistory>(
            "SELECT * FROM ticket_histories WHERE ticket_id = $1 ORDER BY changed_at, id",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load ticket history", e))
    }
}
