//! Ticket history entity model.
//!
//! History rows are append-only: one row per status transition, never
//! mutated or deleted. Read back in `changed_at` order they retrace the
//! ticket's path through the workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ticket::TicketStatus;
use crate::user::UserRole;

/// One recorded status transition.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketHistory {
    /// Unique history row identifier.
    pub id: i64,
    /// The ticket this row belongs to.
    pub ticket_id: i64,
    /// Status before the transition.
    pub old_status: TicketStatus,
    /// Status after the transition.
    pub new_status: TicketStatus,
    /// Username of the actor.
    pub changed_by: String,
    /// Role the actor held at the time.
    pub role: UserRole,
    /// When the transition happened (UTC).
    pub changed_at: DateTime<Utc>,
    /// Optional free-text note (mandatory for manager rejections).
    pub comment: Option<String>,
}

/// Data for appending a history row, written in the same transaction as
/// the ticket mutation it records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicketHistory {
    pub ticket_id: i64,
    pub old_status: TicketStatus,
    pub new_status: TicketStatus,
    pub changed_by: String,
    pub role: UserRole,
    pub changed_at: DateTime<Utc>,
    pub comment: Option<String>,
}
