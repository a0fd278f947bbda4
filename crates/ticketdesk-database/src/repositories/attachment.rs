//! Ticket attachment repository implementation.

use sqlx::PgPool;

use ticketdesk_core::error::{AppError, ErrorKind};
use ticketdesk_core::result::AppResult;
use ticketdesk_entity::attachment::{NewTicketAttachment, TicketAttachment};

/// Repository for attachment rows.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a stored attachment.
    pub async fn insert(&self, new: &NewTicketAttachment) -> AppResult<TicketAttachment> {
        sqlx::query_as::<_, TicketAttachment>(
            "INSERT INTO ticket_attachments (ticket_id, file_name, file_path, content_type) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(new.ticket_id)
        .bind(&new.file_name)
        .bind(&new.file_path)
        .bind(&new.content_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert attachment", e))
    }

    /// All attachments for a ticket, in upload order.
    pub async fn find_by_ticket(&self, ticket_id: i64) -> AppResult<Vec<TicketAttachment>> {
        sqlx::query_as::<_, TicketAttachment>(
            "SELECT * FROM ticket_attachments WHERE ticket_id = $1 ORDER BY uploaded_at, id",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load ticket attachments", e)
        })
    }
}
