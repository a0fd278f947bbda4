//! User account entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;

/// A registered account in the TicketDesk system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppUser {
    /// Unique user identifier.
    pub id: i64,
    /// Unique login name.
    pub user_name: String,
    /// Stored credential digest.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role.
    pub role: UserRole,
    /// Home department (User role only; Managers use the assignment table).
    pub department_id: Option<i64>,
    /// Whether a User may self-assign New tickets in their own department.
    pub can_manage_dept_tickets: bool,
    /// Soft-disable flag; inactive accounts cannot log in or be assigned.
    pub is_active: bool,
}

impl AppUser {
    /// Whether this account may be chosen as a ticket assignee for the
    /// given department.
    pub fn is_assignable_in(&self, department_id: i64) -> bool {
        self.is_active && self.role == UserRole::User && self.department_id == Some(department_id)
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub user_name: String,
    /// Pre-hashed credential digest.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
    /// Home department (User role only).
    pub department_id: Option<i64>,
    /// Self-assign capability (User role only).
    pub can_manage_dept_tickets: bool,
    /// Initial active flag.
    pub is_active: bool,
}

/// Data for an admin edit of an existing account.
///
/// The username and credential are immutable through this path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New role.
    pub role: UserRole,
    /// New active flag.
    pub is_active: bool,
    /// New home department (User role only).
    pub department_id: Option<i64>,
    /// New self-assign capability (User role only).
    pub can_manage_dept_tickets: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole, dept: Option<i64>, active: bool) -> AppUser {
        AppUser {
            id: 1,
            user_name: "it.training".into(),
            password_hash: String::new(),
            role,
            department_id: dept,
            can_manage_dept_tickets: false,
            is_active: active,
        }
    }

    #[test]
    fn test_assignable_requires_active_user_in_department() {
        assert!(user(UserRole::User, Some(3), true).is_assignable_in(3));
        assert!(!user(UserRole::User, Some(3), false).is_assignable_in(3));
        assert!(!user(UserRole::User, Some(4), true).is_assignable_in(3));
        assert!(!user(UserRole::Manager, Some(3), true).is_assignable_in(3));
    }
}
