//! Ticket attachment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A file attached to a ticket at creation time. Never edited afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketAttachment {
    /// Unique attachment identifier.
    pub id: i64,
    /// Owning ticket.
    pub ticket_id: i64,
    /// Original filename, preserved for display.
    pub file_name: String,
    /// Stored relative path in the blob store.
    pub file_path: String,
    /// Declared content type, if the client sent one.
    pub content_type: Option<String>,
    /// Upload time (UTC).
    pub uploaded_at: DateTime<Utc>,
}

/// Data for recording a stored attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicketAttachment {
    pub ticket_id: i64,
    pub file_name: String,
    pub file_path: String,
    pub content_type: Option<String>,
}
