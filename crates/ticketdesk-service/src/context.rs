//! Request context carrying the authenticated principal and their
//! typed department scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ticketdesk_entity::session::Session;
use ticketdesk_entity::user::UserRole;

/// Role-specific department affiliation, resolved once at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepartmentScope {
    /// Admins have no department affiliation.
    Unscoped,
    /// A User belongs to at most one leaf department.
    Member(Option<i64>),
    /// A Manager triages a set of leaf departments.
    Managed(Vec<i64>),
}

/// Context for the current authenticated request.
///
/// Constructed once per request from the session row and passed as an
/// explicit parameter into every service method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: i64,
    /// The current session ID.
    pub session_id: Uuid,
    /// The username at login time.
    pub username: String,
    /// The role at login time.
    pub role: UserRole,
    /// Typed department scope.
    pub scope: DepartmentScope,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Build a context from a validated session row.
    pub fn from_session(session: &Session) -> Self {
        let scope = match session.role {
            UserRole::Admin => DepartmentScope::Unscoped,
            UserRole::User => DepartmentScope::Member(session.department_id),
            UserRole::Manager => {
                DepartmentScope::Managed(session.managed_department_ids.clone())
            }
        };

        Self {
            user_id: session.user_id,
            session_id: session.id,
            username: session.user_name.clone(),
            role: session.role,
            scope,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// The single home department of a User, if any.
    pub fn member_department(&self) -> Option<i64> {
        match &self.scope {
            DepartmentScope::Member(id) => *id,
            _ => None,
        }
    }

    /// The managed department set of a Manager (empty for other roles).
    pub fn managed_departments(&self) -> &[i64] {
        match &self.scope {
            DepartmentScope::Managed(ids) => ids,
            _ => &[],
        }
    }

    /// Whether the caller manages the given department.
    pub fn manages(&self, department_id: i64) -> bool {
        self.managed_departments().contains(&department_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(role: UserRole, dept: Option<i64>, managed: Vec<i64>) -> Session {
        Session {
            id: Uuid::new_v4(),
            user_id: 9,
            user_name: "mgr.it".into(),
            role,
            department_id: dept,
            managed_department_ids: managed,
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        }
    }

    #[test]
    fn test_user_scope_is_member() {
        let ctx = RequestContext::from_session(&session(UserRole::User, Some(3), vec![]));
        assert_eq!(ctx.scope, DepartmentScope::Member(Some(3)));
        assert_eq!(ctx.member_department(), Some(3));
        assert!(ctx.managed_departments().is_empty());
    }

    #[test]
    fn test_manager_scope_is_managed_set() {
        let ctx = RequestContext::from_session(&session(UserRole::Manager, None, vec![3, 4]));
        assert!(ctx.manages(3));
        assert!(ctx.manages(4));
        assert!(!ctx.manages(5));
        assert_eq!(ctx.member_department(), None);
    }

    #[test]
    fn test_admin_scope_is_unscoped() {
        let ctx = RequestContext::from_session(&session(UserRole::Admin, None, vec![]));
        assert!(ctx.is_admin());
        assert_eq!(ctx.scope, DepartmentScope::Unscoped);
        assert!(!ctx.manages(1));
    }

    #[test]
    fn test_manager_department_column_is_ignored() {
        // Managers never use the single-department column, even if set.
        let ctx = RequestContext::from_session(&session(UserRole::Manager, Some(8), vec![2]));
        assert_eq!(ctx.member_department(), None);
    }
}
