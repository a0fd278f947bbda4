//! Ticket entity model.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::priority::TicketPriority;
use super::status::TicketStatus;

/// A helpdesk ticket routed from one department to another.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// Unique ticket identifier.
    pub id: i64,
    /// Short summary line.
    pub title: String,
    /// Full problem description.
    pub description: String,
    /// Target leaf department that will work the ticket.
    pub department_id: i64,
    /// Sender leaf department. Required for User-created tickets;
    /// managers may legitimately have none.
    pub from_department_id: Option<i64>,
    /// Current workflow status.
    pub status: TicketStatus,
    /// Priority, set only when a manager approves the ticket.
    pub priority: Option<TicketPriority>,
    /// Username snapshot of the creator, for display.
    pub created_by: String,
    /// Creator's account id.
    pub created_by_user_id: i64,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
    /// Current assignee, if any.
    pub assigned_user_id: Option<i64>,
    /// Human-facing reference, stamped once right after insert.
    pub reference_number: Option<String>,
}

/// Data required to create a ticket. The status, priority, and assignee
/// are fixed by the create operation itself and are not caller inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    /// Target leaf department.
    pub department_id: i64,
    /// Resolved sender department.
    pub from_department_id: Option<i64>,
    /// Username snapshot.
    pub created_by: String,
    /// Creator's account id.
    pub created_by_user_id: i64,
    /// Creation time, stamped by the workflow engine.
    pub created_at: DateTime<Utc>,
}

/// A ticket row joined with display names, as produced by listing queries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketListItem {
    pub id: i64,
    pub reference_number: Option<String>,
    pub title: String,
    pub status: TicketStatus,
    pub priority: Option<TicketPriority>,
    pub department_id: i64,
    /// Target department display name.
    pub department_name: String,
    pub from_department_id: Option<i64>,
    /// Sender department display name.
    pub from_department_name: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub assigned_user_id: Option<i64>,
    /// Assignee username, if assigned.
    pub assigned_user_name: Option<String>,
}

/// Aggregate status counts over an unfiltered listing scope.
///
/// `AssignedToDepartment` and `InProgress` are always presented to end
/// users as one "in progress" bucket.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, FromRow)]
pub struct TicketCounts {
    pub total: i64,
    pub new_count: i64,
    pub in_progress_count: i64,
    pub closed_count: i64,
}

/// Format the immutable human-facing reference for a persisted ticket.
///
/// The id is the ticket's own generated key, which is why creation is a
/// two-phase write: insert, read back the id, stamp the reference.
pub fn reference_number(created_at: DateTime<Utc>, id: i64) -> String {
    format!("TS-{}-{:06}", created_at.year(), id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reference_number_zero_pads_id() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(reference_number(at, 1), "TS-2025-000001");
        assert_eq!(reference_number(at, 42), "TS-2025-000042");
    }

    #[test]
    fn test_reference_number_keeps_wide_ids() {
        let at = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(reference_number(at, 1_234_567), "TS-2031-1234567");
    }
}
