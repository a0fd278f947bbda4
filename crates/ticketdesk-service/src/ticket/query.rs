//! The ticket listing and dashboard query service.
//!
//! Every listing starts from a role-derived base scope; filters, sorting,
//! and the dashboard bucket only ever narrow within it. Dashboard counts
//! are computed over the unfiltered scope, so changing the display filter
//! never changes the numbers.

use std::sync::Arc;

use bytes::Bytes;

use ticketdesk_core::error::AppError;
use ticketdesk_database::repositories::attachment::AttachmentRepository;
use ticketdesk_database::repositories::history::HistoryRepository;
use ticketdesk_database::repositories::ticket::{TicketRepository, TicketScope};
use ticketdesk_database::repositories::user::UserRepository;
use ticketdesk_entity::attachment::TicketAttachment;
use ticketdesk_entity::history::TicketHistory;
use ticketdesk_entity::ticket::{
    StatusBucket, Ticket, TicketCounts, TicketFilter, TicketListItem, TicketSort,
};
use ticketdesk_entity::user::{AppUser, UserRole};
use ticketdesk_storage::AttachmentStore;

use crate::context::RequestContext;

/// A dashboard payload: aggregate counts over the full scope plus the
/// (possibly bucket-narrowed) listing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Dashboard {
    /// Counts over the unfiltered scope.
    pub counts: TicketCounts,
    /// The bucket the listing was narrowed to, if any.
    pub bucket: Option<StatusBucket>,
    /// The listing rows.
    pub tickets: Vec<TicketListItem>,
}

/// Everything the ticket detail view needs.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub attachments: Vec<TicketAttachment>,
    /// Transitions in `changed_at` order.
    pub history: Vec<TicketHistory>,
    /// Employees a managing caller could assign; empty otherwise.
    pub assignable_users: Vec<AppUser>,
    /// Whether the caller manages the ticket's department.
    pub manager_can_act: bool,
    /// Whether the caller could self-assign tickets in this department.
    pub can_self_manage: bool,
}

/// Builds role-scoped ticket listings and dashboards.
#[derive(Debug, Clone)]
pub struct TicketQueryService {
    tickets: Arc<TicketRepository>,
    histories: Arc<HistoryRepository>,
    attachments: Arc<AttachmentRepository>,
    users: Arc<UserRepository>,
    store: Arc<AttachmentStore>,
}

impl TicketQueryService {
    /// Creates a new query service.
    pub fn new(
        tickets: Arc<TicketRepository>,
        histories: Arc<HistoryRepository>,
        attachments: Arc<AttachmentRepository>,
        users: Arc<UserRepository>,
        store: Arc<AttachmentStore>,
    ) -> Self {
        Self {
            tickets,
            histories,
            attachments,
            users,
            store,
        }
    }

    /// Tickets the caller created.
    pub async fn my_created(
        &self,
        ctx: &RequestContext,
        filter: &TicketFilter,
        sort: TicketSort,
    ) -> Result<Vec<TicketListItem>, AppError> {
        self.tickets
            .search(&TicketScope::CreatedBy(ctx.user_id), filter, sort, None)
            .await
    }

    /// Tickets currently assigned to the caller.
    pub async fn my_assigned(
        &self,
        ctx: &RequestContext,
        filter: &TicketFilter,
        sort: TicketSort,
    ) -> Result<Vec<TicketListItem>, AppError> {
        self.tickets
            .search(&TicketScope::AssignedTo(ctx.user_id), filter, sort, None)
            .await
    }

    /// Department dashboard for a User: everything routed to their own
    /// department.
    pub async fn user_dashboard(
        &self,
        ctx: &RequestContext,
        bucket: Option<StatusBucket>,
        filter: &TicketFilter,
        sort: TicketSort,
    ) -> Result<Dashboard, AppError> {
        if ctx.role != UserRole::User {
            return Err(AppError::forbidden("User dashboard is for department users"));
        }
        let department_id = ctx
            .member_department()
            .ok_or_else(|| AppError::forbidden("Caller has no department"))?;

        self.dashboard(TicketScope::Department(department_id), bucket, filter, sort)
            .await
    }

    /// Triage dashboard for a Manager: everything routed to any managed
    /// department.
    pub async fn manager_dashboard(
        &self,
        ctx: &RequestContext,
        bucket: Option<StatusBucket>,
        filter: &TicketFilter,
        sort: TicketSort,
    ) -> Result<Dashboard, AppError> {
        if ctx.role != UserRole::Manager {
            return Err(AppError::forbidden("Manager dashboard is for managers"));
        }
        let managed = ctx.managed_departments();
        if managed.is_empty() {
            return Err(AppError::forbidden("Caller manages no departments"));
        }

        self.dashboard(
            TicketScope::ManagedDepartments(managed.to_vec()),
            bucket,
            filter,
            sort,
        )
        .await
    }

    /// Unrestricted listing for an Admin, optionally narrowed to one
    /// target department.
    pub async fn admin_listing(
        &self,
        ctx: &RequestContext,
        department_id: Option<i64>,
        filter: &TicketFilter,
        sort: TicketSort,
    ) -> Result<Vec<TicketListItem>, AppError> {
        if !ctx.is_admin() {
            return Err(AppError::forbidden("Admin listing is for admins"));
        }
        self.tickets
            .search(&TicketScope::All { department_id }, filter, sort, None)
            .await
    }

    /// Detail view data with the role-specific visibility rule.
    pub async fn detail(&self, ctx: &RequestContext, ticket_id: i64) -> Result<TicketDetail, AppError> {
        let ticket = self
            .tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ticket not found"))?;

        let is_creator = ticket.created_by_user_id == ctx.user_id;

        let (assignable_users, manager_can_act, can_self_manage) = match ctx.role {
            UserRole::Admin => (Vec::new(), false, false),
            UserRole::Manager => {
                let manages = ctx.manages(ticket.department_id);
                if !manages && !is_creator {
                    return Err(AppError::forbidden("Ticket is outside the managed departments"));
                }
                let assignable = if manages {
                    self.users.find_assignable(ticket.department_id).await?
                } else {
                    Vec::new()
                };
                (assignable, manages, false)
            }
            UserRole::User => {
                let is_assignee = ticket.assigned_user_id == Some(ctx.user_id);
                let same_department = ctx.member_department() == Some(ticket.department_id);
                if !is_creator && !is_assignee && !same_department {
                    return Err(AppError::forbidden("Ticket is not visible to the caller"));
                }
                let can_self_manage = same_department
                    && self
                        .users
                        .find_by_id(ctx.user_id)
                        .await?
                        .map(|u| u.can_manage_dept_tickets)
                        .unwrap_or(false);
                (Vec::new(), false, can_self_manage)
            }
        };

        let history = self.histories.find_by_ticket(ticket.id).await?;
        let attachments = self.attachments.find_by_ticket(ticket.id).await?;

        Ok(TicketDetail {
            ticket,
            attachments,
            history,
            assignable_users,
            manager_can_act,
            can_self_manage,
        })
    }

    /// Fetch an attachment's row and contents, under the same visibility
    /// rule as the detail view.
    pub async fn attachment_content(
        &self,
        ctx: &RequestContext,
        ticket_id: i64,
        attachment_id: i64,
    ) -> Result<(TicketAttachment, Bytes), AppError> {
        let detail = self.detail(ctx, ticket_id).await?;

        let attachment = detail
            .attachments
            .into_iter()
            .find(|a| a.id == attachment_id)
            .ok_or_else(|| AppError::not_found("Attachment not found"))?;

        let data = self.store.read(&attachment.file_path).await?;
        Ok((attachment, data))
    }

    /// Shared dashboard assembly: counts over the unfiltered scope, then
    /// the narrowed listing.
    async fn dashboard(
        &self,
        scope: TicketScope,
        bucket: Option<StatusBucket>,
        filter: &TicketFilter,
        sort: TicketSort,
    ) -> Result<Dashboard, AppError> {
        let counts = self.tickets.count_buckets(&scope).await?;
        let tickets = self.tickets.search(&scope, filter, sort, bucket).await?;

        Ok(Dashboard {
            counts,
            bucket,
            tickets,
        })
    }
}
