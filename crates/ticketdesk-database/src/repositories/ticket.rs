//! Ticket repository: workflow writes and the dynamic listing query.
//!
//! All workflow mutations commit the ticket change and its history row in
//! one transaction. Listing queries are assembled with `QueryBuilder` from
//! a role-derived base scope, typed filters, and a whitelisted sort key —
//! no caller-supplied SQL fragments ever reach the builder.

use sqlx::{PgPool, Postgres, QueryBuilder};

use ticketdesk_core::error::{AppError, ErrorKind};
use ticketdesk_core::result::AppResult;
use ticketdesk_entity::history::NewTicketHistory;
use ticketdesk_entity::ticket::model::reference_number;
use ticketdesk_entity::ticket::{
    NewTicket, StatusBucket, Ticket, TicketCounts, TicketFilter, TicketListItem, TicketPriority,
    TicketSort, TicketSortKey, TicketStatus,
};

/// Role-derived base scope for listing queries and dashboard counts.
#[derive(Debug, Clone)]
pub enum TicketScope {
    /// Tickets created by one account.
    CreatedBy(i64),
    /// Tickets targeting one department.
    Department(i64),
    /// Tickets assigned to one account.
    AssignedTo(i64),
    /// Tickets targeting any of a manager's departments.
    ManagedDepartments(Vec<i64>),
    /// Every ticket, optionally narrowed to one target department (admin).
    All { department_id: Option<i64> },
}

/// How a workflow transition touches the assignee column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeChange {
    /// Leave the column as it is.
    Keep,
    /// Clear the assignee (manager solves without naming an employee).
    Clear,
    /// Assign to the given account.
    Set(i64),
}

/// A validated workflow transition ready to be persisted.
#[derive(Debug, Clone)]
pub struct TicketTransition {
    /// The status to store.
    pub status: TicketStatus,
    /// Assignee column change.
    pub assignee: AssigneeChange,
    /// Priority to set; `None` leaves the column untouched.
    pub priority: Option<TicketPriority>,
}

/// Repository for ticket persistence and listing queries.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a ticket by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ticket by id", e))
    }

    /// Persist a new ticket and stamp its reference number.
    ///
    /// The reference is derived from the generated id, so this is a
    /// two-step write inside one transaction: insert returning the id,
    /// then update the reference column.
    pub async fn create(&self, new: &NewTicket) -> AppResult<Ticket> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO tickets \
             (title, description, department_id, from_department_id, status, \
              created_by, created_by_user_id, created_at) \
             VALUES ($1, $2, $3, $4, 'new', $5, $6, $7) RETURNING id",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.department_id)
        .bind(new.from_department_id)
        .bind(&new.created_by)
        .bind(new.created_by_user_id)
        .bind(new.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert ticket", e))?;

        let reference = reference_number(new.created_at, id);
        sqlx::query("UPDATE tickets SET reference_number = $1 WHERE id = $2")
            .bind(&reference)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to stamp reference number", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit ticket insert", e)
        })?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::database("Inserted ticket vanished"))
    }

    /// Apply a workflow transition: update the ticket and append its
    /// history row, committing together or not at all.
    pub async fn apply_transition(
        &self,
        ticket_id: i64,
        transition: &TicketTransition,
        history: &NewTicketHistory,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE tickets SET status = ");
        qb.push_bind(transition.status);
        match transition.assignee {
            AssigneeChange::Keep => {}
            AssigneeChange::Clear => {
                qb.push(", assigned_user_id = NULL");
            }
            AssigneeChange::Set(user_id) => {
                qb.push(", assigned_user_id = ");
                qb.push_bind(user_id);
            }
        }
        if let Some(priority) = transition.priority {
            qb.push(", priority = ");
            qb.push_bind(priority);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(ticket_id);

        qb.build().execute(&mut *tx).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update ticket status", e)
        })?;

        sqlx::query(
            "INSERT INTO ticket_histories \
             (ticket_id, old_status, new_status, changed_by, role, changed_at, comment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(history.ticket_id)
        .bind(history.old_status)
        .bind(history.new_status)
        .bind(&history.changed_by)
        .bind(history.role)
        .bind(history.changed_at)
        .bind(&history.comment)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert history row", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transition", e)
        })
    }

    /// Run the dynamic listing query: scope AND filters, ordered by the
    /// whitelisted sort key, optionally narrowed to a dashboard bucket.
    pub async fn search(
        &self,
        scope: &TicketScope,
        filter: &TicketFilter,
        sort: TicketSort,
        bucket: Option<StatusBucket>,
    ) -> AppResult<Vec<TicketListItem>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT t.id, t.reference_number, t.title, t.status, t.priority, \
             t.department_id, d.name AS department_name, \
             t.from_department_id, fd.name AS from_department_name, \
             t.created_by, t.created_at, \
             t.assigned_user_id, au.user_name AS assigned_user_name \
             FROM tickets t \
             JOIN departments d ON d.id = t.department_id \
             LEFT JOIN departments fd ON fd.id = t.from_department_id \
             LEFT JOIN app_users au ON au.id = t.assigned_user_id \
             WHERE ",
        );

        push_scope(&mut qb, scope);
        push_filters(&mut qb, filter);
        if let Some(bucket) = bucket {
            qb.push(bucket_predicate(bucket));
        }

        qb.push(" ORDER BY ");
        qb.push(sort_column(sort.key));
        qb.push(" ");
        qb.push(sort.direction.as_sql());

        qb.build_query_as::<TicketListItem>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tickets", e))
    }

    /// Aggregate status counts over the **unfiltered** scope. Dashboard
    /// bucket filters never pass through here, so the counts always
    /// reflect the full scope.
    pub async fn count_buckets(&self, scope: &TicketScope) -> AppResult<TicketCounts> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE t.status = 'new') AS new_count, \
             COUNT(*) FILTER (WHERE t.status IN ('assigned_to_department', 'in_progress')) \
                 AS in_progress_count, \
             COUNT(*) FILTER (WHERE t.status = 'closed') AS closed_count \
             FROM tickets t WHERE ",
        );

        push_scope(&mut qb, scope);

        qb.build_query_as::<TicketCounts>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count tickets", e))
    }
}

/// Append the base-scope predicate.
fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: &TicketScope) {
    match scope {
        TicketScope::CreatedBy(user_id) => {
            qb.push("t.created_by_user_id = ");
            qb.push_bind(*user_id);
        }
        TicketScope::Department(department_id) => {
            qb.push("t.department_id = ");
            qb.push_bind(*department_id);
        }
        TicketScope::AssignedTo(user_id) => {
            qb.push("t.assigned_user_id = ");
            qb.push_bind(*user_id);
        }
        TicketScope::ManagedDepartments(ids) => {
            qb.push("t.department_id = ANY(");
            qb.push_bind(ids.clone());
            qb.push(")");
        }
        TicketScope::All { department_id } => match department_id {
            Some(id) => {
                qb.push("t.department_id = ");
                qb.push_bind(*id);
            }
            None => {
                qb.push("TRUE");
            }
        },
    }
}

/// Append the optional AND-combined filter predicates.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &TicketFilter) {
    if let Some(reference) = &filter.reference_number {
        qb.push(" AND t.reference_number ILIKE ");
        qb.push_bind(contains_pattern(reference));
    }
    if let Some(title) = &filter.title {
        qb.push(" AND t.title ILIKE ");
        qb.push_bind(contains_pattern(title));
    }
    if let Some(name) = &filter.department_name {
        qb.push(" AND d.name ILIKE ");
        qb.push_bind(contains_pattern(name));
    }
    if let Some(name) = &filter.from_department_name {
        qb.push(" AND fd.name ILIKE ");
        qb.push_bind(contains_pattern(name));
    }
    if let Some(creator) = &filter.created_by {
        qb.push(" AND t.created_by ILIKE ");
        qb.push_bind(contains_pattern(creator));
    }
    if let Some(assignee) = &filter.assigned_to {
        qb.push(" AND au.user_name ILIKE ");
        qb.push_bind(contains_pattern(assignee));
    }
    if let Some(status) = filter.status {
        qb.push(" AND t.status = ");
        qb.push_bind(status);
    }
    if let Some(date) = filter.created_on {
        qb.push(" AND t.created_at::date = ");
        qb.push_bind(date);
    }
}

/// Static predicate narrowing a listing to one dashboard bucket.
fn bucket_predicate(bucket: StatusBucket) -> &'static str {
    match bucket {
        StatusBucket::New => " AND t.status = 'new'",
        StatusBucket::InProgress => {
            " AND t.status IN ('assigned_to_department', 'in_progress')"
        }
        StatusBucket::Closed => " AND t.status = 'closed'",
    }
}

/// Map a whitelisted sort key to its ORDER BY expression. Textual keys
/// sort case-insensitively.
fn sort_column(key: TicketSortKey) -> &'static str {
    match key {
        TicketSortKey::ReferenceNumber => "LOWER(t.reference_number)",
        TicketSortKey::Title => "LOWER(t.title)",
        TicketSortKey::Department => "LOWER(d.name)",
        TicketSortKey::FromDepartment => "LOWER(fd.name)",
        TicketSortKey::CreatedBy => "LOWER(t.created_by)",
        TicketSortKey::AssignedTo => "LOWER(au.user_name)",
        TicketSortKey::Status => "t.status",
        TicketSortKey::CreatedAt => "t.created_at",
    }
}

fn contains_pattern(needle: &str) -> String {
    format!("%{}%", needle.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_columns_are_whitelisted_expressions() {
        // Every key maps to a fixed expression over the joined aliases.
        for key in [
            TicketSortKey::ReferenceNumber,
            TicketSortKey::Title,
            TicketSortKey::Department,
            TicketSortKey::FromDepartment,
            TicketSortKey::CreatedBy,
            TicketSortKey::AssignedTo,
            TicketSortKey::Status,
            TicketSortKey::CreatedAt,
        ] {
            let column = sort_column(key);
            assert!(column.contains("t.") || column.contains("d.") || column.contains("fd.") || column.contains("au."));
        }
    }

    #[test]
    fn test_textual_sort_keys_are_case_insensitive() {
        assert_eq!(sort_column(TicketSortKey::Title), "LOWER(t.title)");
        assert_eq!(sort_column(TicketSortKey::AssignedTo), "LOWER(au.user_name)");
        // Enum and timestamp keys compare exactly.
        assert_eq!(sort_column(TicketSortKey::Status), "t.status");
        assert_eq!(sort_column(TicketSortKey::CreatedAt), "t.created_at");
    }

    #[test]
    fn test_bucket_predicates_match_bucket_semantics() {
        assert!(bucket_predicate(StatusBucket::InProgress).contains("assigned_to_department"));
        assert!(bucket_predicate(StatusBucket::InProgress).contains("in_progress"));
        assert_eq!(bucket_predicate(StatusBucket::New), " AND t.status = 'new'");
    }

    #[test]
    fn test_contains_pattern_trims_and_wraps() {
        assert_eq!(contains_pattern("  printer "), "%printer%");
    }

    #[test]
    fn test_scope_predicates_compile_to_expected_sql() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_scope(&mut qb, &TicketScope::ManagedDepartments(vec![1, 2]));
        assert!(qb.sql().contains("t.department_id = ANY("));

        let mut qb = QueryBuilder::<Postgres>::new("");
        push_scope(&mut qb, &TicketScope::All { department_id: None });
        assert_eq!(qb.sql(), "TRUE");
    }

    #[test]
    fn test_filters_are_and_combined() {
        let filter = TicketFilter {
            title: Some("vpn".into()),
            status: Some(TicketStatus::New),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("WHERE TRUE");
        push_filters(&mut qb, &filter);
        let sql = qb.sql();
        assert!(sql.contains(" AND t.title ILIKE "));
        assert!(sql.contains(" AND t.status = "));
        assert!(!sql.contains("fd.name ILIKE"));
    }
}
