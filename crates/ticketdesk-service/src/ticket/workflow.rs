//! The ticket workflow engine.
//!
//! Owns every lifecycle mutation: create, self-assign, approve-and-assign,
//! manager solve, manager close, and the generic status change. Each
//! operation re-reads the ticket, walks the gate order (role eligibility →
//! department/ownership → status precondition), and commits the ticket
//! mutation together with its history row in one transaction. A race
//! between two conflicting approvals resolves as last-write-wins.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use ticketdesk_core::error::AppError;
use ticketdesk_database::repositories::attachment::AttachmentRepository;
use ticketdesk_database::repositories::department::DepartmentRepository;
use ticketdesk_database::repositories::ticket::{
    AssigneeChange, TicketRepository, TicketTransition,
};
use ticketdesk_database::repositories::user::UserRepository;
use ticketdesk_entity::attachment::NewTicketAttachment;
use ticketdesk_entity::department::Department;
use ticketdesk_entity::history::NewTicketHistory;
use ticketdesk_entity::ticket::{NewTicket, Ticket, TicketPriority, TicketStatus};
use ticketdesk_entity::user::UserRole;
use ticketdesk_storage::AttachmentStore;

use crate::context::RequestContext;

/// One uploaded file accompanying a create request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename from the client.
    pub file_name: String,
    /// Declared content type, if any.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

/// Caller input for ticket creation. Status, priority, and assignee are
/// fixed by the operation and never caller-controlled.
#[derive(Debug, Clone)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    /// Target leaf department.
    pub department_id: i64,
    /// Optional file attachments.
    pub files: Vec<UploadedFile>,
}

/// Drives the ticket lifecycle state machine.
#[derive(Debug, Clone)]
pub struct TicketWorkflowService {
    /// Ticket repository.
    tickets: Arc<TicketRepository>,
    /// Department repository.
    departments: Arc<DepartmentRepository>,
    /// User repository.
    users: Arc<UserRepository>,
    /// Attachment row repository.
    attachments: Arc<AttachmentRepository>,
    /// Attachment blob store.
    store: Arc<AttachmentStore>,
}

impl TicketWorkflowService {
    /// Creates a new workflow service.
    pub fn new(
        tickets: Arc<TicketRepository>,
        departments: Arc<DepartmentRepository>,
        users: Arc<UserRepository>,
        attachments: Arc<AttachmentRepository>,
        store: Arc<AttachmentStore>,
    ) -> Self {
        Self {
            tickets,
            departments,
            users,
            attachments,
            store,
        }
    }

    /// Create a ticket targeting a leaf department.
    ///
    /// Users may not target a leaf sharing their own root department;
    /// managers may not target a department they manage. The sender
    /// department is resolved from the session scope with a fallback to
    /// the stored account row, and is mandatory for Users.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: CreateTicketRequest,
    ) -> Result<Ticket, AppError> {
        if !matches!(ctx.role, UserRole::User | UserRole::Manager) {
            return Err(AppError::forbidden("Only users and managers create tickets"));
        }

        let title = request.title.trim();
        if title.is_empty() || title.len() > 200 {
            return Err(AppError::validation("Title is required (200 characters max)."));
        }
        if request.description.trim().is_empty() {
            return Err(AppError::validation("Description is required."));
        }

        let target = self
            .departments
            .find_by_id(request.department_id)
            .await?
            .filter(Department::is_leaf)
            .ok_or_else(|| AppError::validation("Selected department does not exist."))?;

        let sender_department_id = self.resolve_sender_department(ctx).await?;

        match ctx.role {
            UserRole::User => {
                if let Some(department_id) = sender_department_id {
                    let own = self.departments.find_by_id(department_id).await?;
                    if let Some(own) = own {
                        if shares_root(&own, &target) {
                            return Err(AppError::validation(
                                "You cannot create a ticket for your own department.",
                            ));
                        }
                    }
                } else {
                    return Err(AppError::validation(
                        "Your account has no department assigned. Please contact an administrator.",
                    ));
                }
            }
            UserRole::Manager => {
                if ctx.manages(target.id) {
                    return Err(AppError::validation(
                        "You cannot create a ticket for a department you manage.",
                    ));
                }
            }
            UserRole::Admin => unreachable!("gated above"),
        }

        let ticket = self
            .tickets
            .create(&NewTicket {
                title: title.to_string(),
                description: request.description.trim().to_string(),
                department_id: target.id,
                from_department_id: sender_department_id,
                created_by: ctx.username.clone(),
                created_by_user_id: ctx.user_id,
                created_at: Utc::now(),
            })
            .await?;

        info!(
            ticket = ticket.id,
            reference = ticket.reference_number.as_deref().unwrap_or(""),
            department = target.id,
            "Ticket created"
        );

        // Attachment writes are fire-and-forget after the ticket commit;
        // a failed file is skipped and the rest proceed.
        for file in request.files {
            if file.data.is_empty() {
                continue;
            }
            match self.store.save(ticket.id, &file.file_name, file.data).await {
                Ok(stored) => {
                    if let Err(e) = self
                        .attachments
                        .insert(&NewTicketAttachment {
                            ticket_id: ticket.id,
                            file_name: stored.file_name,
                            file_path: stored.relative_path,
                            content_type: file.content_type,
                        })
                        .await
                    {
                        warn!(ticket = ticket.id, error = %e, "Failed to record attachment row");
                    }
                }
                Err(e) => {
                    warn!(ticket = ticket.id, file = %file.file_name, error = %e, "Failed to store attachment");
                }
            }
        }

        Ok(ticket)
    }

    /// Self-assign a New ticket in the caller's own department.
    ///
    /// Requires role User with the `can_manage_dept_tickets` capability.
    pub async fn self_manage(&self, ctx: &RequestContext, ticket_id: i64) -> Result<Ticket, AppError> {
        if ctx.role != UserRole::User {
            return Err(AppError::forbidden("Only department users self-assign tickets"));
        }
        let department_id = ctx
            .member_department()
            .ok_or_else(|| AppError::forbidden("Caller has no department"))?;

        let can_manage = self
            .users
            .find_by_id(ctx.user_id)
            .await?
            .map(|u| u.can_manage_dept_tickets)
            .unwrap_or(false);
        if !can_manage {
            return Err(AppError::forbidden("Caller may not manage department tickets"));
        }

        let ticket = self.find_ticket(ticket_id).await?;
        if ticket.department_id != department_id {
            return Err(AppError::forbidden("Ticket belongs to another department"));
        }
        if ticket.status != TicketStatus::New {
            return Err(AppError::forbidden("Ticket is not in New status"));
        }

        self.transition(
            ctx,
            &ticket,
            TicketTransition {
                status: TicketStatus::InProgress,
                assignee: AssigneeChange::Set(ctx.user_id),
                priority: None,
            },
            Some("User managed ticket (self-assign) and started processing.".to_string()),
        )
        .await
    }

    /// Approve a New ticket and assign it to a department employee,
    /// setting its priority.
    pub async fn approve_and_assign(
        &self,
        ctx: &RequestContext,
        ticket_id: i64,
        assigned_user_id: i64,
        priority: TicketPriority,
    ) -> Result<Ticket, AppError> {
        let ticket = self.managed_ticket(ctx, ticket_id).await?;

        if ticket.status != TicketStatus::New {
            return Err(AppError::validation("This ticket is not in New status."));
        }

        let assignee_ok = self
            .users
            .find_by_id(assigned_user_id)
            .await?
            .map(|u| u.is_assignable_in(ticket.department_id))
            .unwrap_or(false);
        if !assignee_ok {
            return Err(AppError::validation(
                "Selected user is not valid for this ticket department.",
            ));
        }

        self.transition(
            ctx,
            &ticket,
            TicketTransition {
                status: TicketStatus::AssignedToDepartment,
                assignee: AssigneeChange::Set(assigned_user_id),
                priority: Some(priority),
            },
            Some(format!(
                "Approved and assigned to user id={assigned_user_id}, priority={priority}."
            )),
        )
        .await
    }

    /// Start working a New ticket directly, without naming an employee.
    pub async fn solve_myself(&self, ctx: &RequestContext, ticket_id: i64) -> Result<Ticket, AppError> {
        let ticket = self.managed_ticket(ctx, ticket_id).await?;

        if ticket.status != TicketStatus::New {
            return Err(AppError::validation("This ticket is not in New status."));
        }

        self.transition(
            ctx,
            &ticket,
            TicketTransition {
                status: TicketStatus::InProgress,
                assignee: AssigneeChange::Clear,
                priority: None,
            },
            Some("Manager started working without assigning.".to_string()),
        )
        .await
    }

    /// Close a ticket the manager solved directly. Only valid while the
    /// ticket is InProgress with no assignee — the employee path closes
    /// through [`Self::change_status`] instead.
    pub async fn manager_close_solved(
        &self,
        ctx: &RequestContext,
        ticket_id: i64,
    ) -> Result<Ticket, AppError> {
        let ticket = self.managed_ticket(ctx, ticket_id).await?;

        if !close_solved_allowed(ticket.status, ticket.assigned_user_id) {
            return Err(AppError::validation(
                "Ticket cannot be closed in its current state.",
            ));
        }

        self.transition(
            ctx,
            &ticket,
            TicketTransition {
                status: TicketStatus::Closed,
                assignee: AssigneeChange::Keep,
                priority: None,
            },
            Some("Manager closed the ticket.".to_string()),
        )
        .await
    }

    /// Generic status change with two role-specific policies.
    ///
    /// A User must be the current assignee and may only advance
    /// `AssignedToDepartment → InProgress` and `InProgress → Closed`.
    /// A Manager may only reject (`New → Closed`) within a managed
    /// department and must supply a non-empty comment. Admins never
    /// drive the workflow.
    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        ticket_id: i64,
        new_status: TicketStatus,
        comment: Option<String>,
    ) -> Result<Ticket, AppError> {
        let ticket = self.find_ticket(ticket_id).await?;

        match ctx.role {
            UserRole::User => {
                if ticket.assigned_user_id != Some(ctx.user_id) {
                    return Err(AppError::forbidden("Caller is not the ticket assignee"));
                }
                if !user_transition_allowed(ticket.status, new_status) {
                    return Err(AppError::forbidden("Status change not permitted"));
                }
            }
            UserRole::Manager => {
                if !ctx.manages(ticket.department_id) {
                    return Err(AppError::forbidden("Ticket is outside the managed departments"));
                }
                if !manager_rejection_allowed(ticket.status, new_status) {
                    return Err(AppError::forbidden("Managers may only reject New tickets"));
                }
                if comment.as_deref().map(str::trim).unwrap_or("").is_empty() {
                    return Err(AppError::validation("Reject reason is required."));
                }
            }
            UserRole::Admin => {
                return Err(AppError::forbidden("Admins do not drive the ticket workflow"));
            }
        }

        self.transition(
            ctx,
            &ticket,
            TicketTransition {
                status: new_status,
                assignee: AssigneeChange::Keep,
                priority: None,
            },
            comment,
        )
        .await
    }

    /// Re-read a ticket or fail with NotFound.
    async fn find_ticket(&self, ticket_id: i64) -> Result<Ticket, AppError> {
        self.tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ticket not found"))
    }

    /// Manager gate shared by approve/solve/close: role, non-empty
    /// managed set, ticket exists, ticket department is managed.
    async fn managed_ticket(&self, ctx: &RequestContext, ticket_id: i64) -> Result<Ticket, AppError> {
        if ctx.role != UserRole::Manager {
            return Err(AppError::forbidden("Only managers triage tickets"));
        }
        if ctx.managed_departments().is_empty() {
            return Err(AppError::forbidden("Caller manages no departments"));
        }
        let ticket = self.find_ticket(ticket_id).await?;
        if !ctx.manages(ticket.department_id) {
            return Err(AppError::forbidden("Ticket is outside the managed departments"));
        }
        Ok(ticket)
    }

    /// Persist a transition with its history row and return the
    /// refreshed ticket.
    async fn transition(
        &self,
        ctx: &RequestContext,
        ticket: &Ticket,
        transition: TicketTransition,
        comment: Option<String>,
    ) -> Result<Ticket, AppError> {
        let history = NewTicketHistory {
            ticket_id: ticket.id,
            old_status: ticket.status,
            new_status: transition.status,
            changed_by: ctx.username.clone(),
            role: ctx.role,
            changed_at: Utc::now(),
            comment,
        };

        self.tickets
            .apply_transition(ticket.id, &transition, &history)
            .await?;

        info!(
            ticket = ticket.id,
            from = %ticket.status,
            to = %transition.status,
            by = %ctx.username,
            "Ticket transition applied"
        );

        self.find_ticket(ticket.id).await
    }

    /// Sender department: prefer the session scope, fall back to the
    /// stored account row. Managers may legitimately resolve to none.
    async fn resolve_sender_department(&self, ctx: &RequestContext) -> Result<Option<i64>, AppError> {
        if let Some(id) = ctx.member_department() {
            return Ok(Some(id));
        }
        self.users.find_department_id(ctx.user_id).await
    }
}

/// Whether two departments belong to the same root. A department with no
/// parent counts as its own root.
fn shares_root(a: &Department, b: &Department) -> bool {
    a.root_id() == b.root_id()
}

/// The User policy for the generic status change: assignees may only
/// accept assigned work and close work in progress.
fn user_transition_allowed(current: TicketStatus, requested: TicketStatus) -> bool {
    matches!(
        (current, requested),
        (TicketStatus::AssignedToDepartment, TicketStatus::InProgress)
            | (TicketStatus::InProgress, TicketStatus::Closed)
    )
}

/// The Manager policy for the generic status change: rejection only.
fn manager_rejection_allowed(current: TicketStatus, requested: TicketStatus) -> bool {
    current == TicketStatus::New && requested == TicketStatus::Closed
}

/// Manager close is only for the solved-myself path: in progress and
/// unassigned.
fn close_solved_allowed(status: TicketStatus, assigned_user_id: Option<i64>) -> bool {
    status == TicketStatus::InProgress && assigned_user_id.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use TicketStatus::*;

    fn dept(id: i64, parent: Option<i64>) -> Department {
        Department {
            id,
            name: format!("dept-{id}"),
            parent_department_id: parent,
        }
    }

    #[test]
    fn test_user_may_not_target_leaf_under_own_root() {
        // "IT Training" (leaf of IT) vs "IT Management" (leaf of IT).
        let it_training = dept(3, Some(1));
        let it_management = dept(4, Some(1));
        assert!(shares_root(&it_training, &it_management));

        // "HR Training" (leaf of HR) is fine.
        let hr_training = dept(5, Some(2));
        assert!(!shares_root(&it_training, &hr_training));
    }

    #[test]
    fn test_rootless_department_is_its_own_root() {
        let root = dept(1, None);
        let leaf = dept(3, Some(1));
        assert!(shares_root(&root, &leaf));
    }

    #[test]
    fn test_user_change_status_whitelist() {
        assert!(user_transition_allowed(AssignedToDepartment, InProgress));
        assert!(user_transition_allowed(InProgress, Closed));

        // Everything else is rejected for the User policy, including
        // moves that the state machine itself would allow.
        assert!(!user_transition_allowed(New, InProgress));
        assert!(!user_transition_allowed(New, Closed));
        assert!(!user_transition_allowed(New, AssignedToDepartment));
        assert!(!user_transition_allowed(AssignedToDepartment, Closed));
        assert!(!user_transition_allowed(InProgress, InProgress));
        assert!(!user_transition_allowed(Closed, InProgress));
        assert!(!user_transition_allowed(Closed, Closed));
    }

    #[test]
    fn test_manager_change_status_is_rejection_only() {
        assert!(manager_rejection_allowed(New, Closed));
        assert!(!manager_rejection_allowed(New, InProgress));
        assert!(!manager_rejection_allowed(InProgress, Closed));
        assert!(!manager_rejection_allowed(AssignedToDepartment, Closed));
        assert!(!manager_rejection_allowed(Closed, Closed));
    }

    #[test]
    fn test_close_solved_requires_unassigned_in_progress() {
        assert!(close_solved_allowed(InProgress, None));
        assert!(!close_solved_allowed(InProgress, Some(5)));
        assert!(!close_solved_allowed(New, None));
        assert!(!close_solved_allowed(AssignedToDepartment, None));
        assert!(!close_solved_allowed(Closed, None));
    }
}
