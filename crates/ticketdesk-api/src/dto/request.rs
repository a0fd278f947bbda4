//! Request DTOs.

use serde::{Deserialize, Serialize};

use ticketdesk_entity::ticket::{StatusBucket, TicketFilter, TicketPriority, TicketSort, TicketStatus};

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body for the generic status-change endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    /// Requested target status.
    pub new_status: TicketStatus,
    /// Free-text note; mandatory for manager rejections.
    pub comment: Option<String>,
}

/// Body for manager approve-and-assign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveAssignRequest {
    /// The employee to assign.
    pub assigned_user_id: i64,
    /// Priority to stamp on approval.
    pub priority: TicketPriority,
}

/// The shared listing query-parameter surface.
///
/// Everything arrives as optional strings; parsing happens exactly once
/// here, with the silently-ignore rules for status/date and the
/// default-fallback rule for the sort key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketListParams {
    /// Substring match on the reference number.
    pub ticket_number: Option<String>,
    /// Substring match on the title.
    pub title: Option<String>,
    /// Substring match on the target department name.
    pub department: Option<String>,
    /// Substring match on the sender department name.
    pub from_department: Option<String>,
    /// Substring match on the creator username.
    pub created_by: Option<String>,
    /// Substring match on the assignee username.
    pub assigned_to: Option<String>,
    /// Exact status match; unparseable input is ignored.
    pub status: Option<String>,
    /// Exact creation-date match (time of day ignored).
    pub created_at: Option<String>,
    /// Sort key; unknown keys fall back to creation time descending.
    pub sort: Option<String>,
    /// Sort direction (`asc`/`desc`).
    pub dir: Option<String>,
    /// Dashboard bucket narrowing (`new`/`in_progress`/`closed`).
    pub filter: Option<String>,
    /// Exact target-department narrowing (admin listing only).
    pub department_id: Option<i64>,
}

impl TicketListParams {
    /// The typed filter set.
    pub fn filter(&self) -> TicketFilter {
        TicketFilter::from_params(
            self.ticket_number.as_deref(),
            self.title.as_deref(),
            self.department.as_deref(),
            self.from_department.as_deref(),
            self.created_by.as_deref(),
            self.assigned_to.as_deref(),
            self.status.as_deref(),
            self.created_at.as_deref(),
        )
    }

    /// The resolved sort specification.
    pub fn sort(&self) -> TicketSort {
        TicketSort::from_params(self.sort.as_deref(), self.dir.as_deref())
    }

    /// The dashboard bucket, if a recognizable one was requested.
    pub fn bucket(&self) -> Option<StatusBucket> {
        self.filter.as_deref().and_then(StatusBucket::parse)
    }
}
