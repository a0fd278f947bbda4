//! Ticket workflow status and the legal transition graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a ticket.
///
/// The workflow is monotonic: `New → AssignedToDepartment → InProgress →
/// Closed`, with two shortcuts out of `New` — straight to `InProgress`
/// (self-assign / manager solve) and straight to `Closed` (manager
/// rejection). `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Submitted, awaiting triage.
    New,
    /// Approved by a manager and assigned to a department employee.
    AssignedToDepartment,
    /// Being worked, either by the assignee or by the manager directly.
    InProgress,
    /// Finished or rejected. Terminal.
    Closed,
}

impl TicketStatus {
    /// Whether a direct transition from `self` to `next` is legal.
    pub fn can_transition(self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (New, AssignedToDepartment)
                | (New, InProgress)
                | (New, Closed)
                | (AssignedToDepartment, InProgress)
                | (InProgress, Closed)
        )
    }

    /// Whether no further transition can leave this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Return the status as its stored snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::AssignedToDepartment => "assigned_to_department",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = ticketdesk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "").as_str() {
            "new" => Ok(Self::New),
            "assignedtodepartment" => Ok(Self::AssignedToDepartment),
            "inprogress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            _ => Err(ticketdesk_core::AppError::validation(format!(
                "Invalid ticket status: '{s}'"
            ))),
        }
    }
}

/// Validate that a sequence of (old, new) status pairs read from history
/// rows in `changed_at` order forms a legal path through the workflow.
///
/// Each pair must be a legal transition, each row must start where the
/// previous one ended, and nothing may follow a transition into `Closed`.
pub fn is_valid_history_path(path: &[(TicketStatus, TicketStatus)]) -> bool {
    let mut previous_end: Option<TicketStatus> = None;
    for &(old, new) in path {
        if !old.can_transition(new) {
            return false;
        }
        if let Some(prev) = previous_end {
            if prev.is_terminal() || prev != old {
                return false;
            }
        }
        previous_end = Some(new);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::TicketStatus::*;
    use super::*;

    #[test]
    fn test_legal_transitions() {
        assert!(New.can_transition(AssignedToDepartment));
        assert!(New.can_transition(InProgress));
        assert!(New.can_transition(Closed));
        assert!(AssignedToDepartment.can_transition(InProgress));
        assert!(InProgress.can_transition(Closed));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!Closed.can_transition(New));
        assert!(!Closed.can_transition(InProgress));
        assert!(!AssignedToDepartment.can_transition(Closed));
        assert!(!AssignedToDepartment.can_transition(New));
        assert!(!InProgress.can_transition(AssignedToDepartment));
        assert!(!New.can_transition(New));
    }

    #[test]
    fn test_closed_is_terminal() {
        assert!(Closed.is_terminal());
        assert!(!New.is_terminal());
        assert!(!InProgress.is_terminal());
    }

    #[test]
    fn test_from_str_accepts_both_casings() {
        assert_eq!("new".parse::<TicketStatus>().unwrap(), New);
        assert_eq!(
            "AssignedToDepartment".parse::<TicketStatus>().unwrap(),
            AssignedToDepartment
        );
        assert_eq!("in_progress".parse::<TicketStatus>().unwrap(), InProgress);
        assert_eq!("InProgress".parse::<TicketStatus>().unwrap(), InProgress);
        assert!("reopened".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_full_approval_path_is_valid() {
        let path = [
            (New, AssignedToDepartment),
            (AssignedToDepartment, InProgress),
            (InProgress, Closed),
        ];
        assert!(is_valid_history_path(&path));
    }

    #[test]
    fn test_rejection_and_solve_paths_are_valid() {
        assert!(is_valid_history_path(&[(New, Closed)]));
        assert!(is_valid_history_path(&[(New, InProgress), (InProgress, Closed)]));
    }

    #[test]
    fn test_nothing_follows_closed() {
        let path = [(New, Closed), (New, InProgress)];
        assert!(!is_valid_history_path(&path));
    }

    #[test]
    fn test_path_must_chain() {
        // Row starts at a status the previous row did not end in.
        let path = [(New, AssignedToDepartment), (InProgress, Closed)];
        assert!(!is_valid_history_path(&path));
    }

    #[test]
    fn test_empty_path_is_valid() {
        assert!(is_valid_history_path(&[]));
    }
}
