//! Admin account management: search, create, and edit.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::info;

use ticketdesk_auth::CredentialVerifier;
use ticketdesk_core::error::AppError;
use ticketdesk_database::repositories::department::DepartmentRepository;
use ticketdesk_database::repositories::user::UserRepository;
use ticketdesk_entity::user::{AppUser, CreateUser, UpdateUser, UserRole};

use crate::context::RequestContext;

/// An account row joined with department display data for admin views.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserSummary {
    pub user: AppUser,
    /// Home department display name (User role only).
    pub department_name: Option<String>,
    /// Managed department display names (Manager role only).
    pub managed_departments: Vec<String>,
    /// Managed department ids (Manager role only).
    pub managed_department_ids: Vec<i64>,
}

/// Caller input for creating an account.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateUserRequest {
    pub user_name: String,
    pub password: String,
    pub role: UserRole,
    pub department_id: Option<i64>,
    #[serde(default)]
    pub managed_department_ids: Vec<i64>,
    #[serde(default)]
    pub can_manage_dept_tickets: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Caller input for an admin edit. Username and credential are immutable
/// through this path.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateUserRequest {
    pub role: UserRole,
    pub is_active: bool,
    pub department_id: Option<i64>,
    #[serde(default)]
    pub managed_department_ids: Vec<i64>,
    #[serde(default)]
    pub can_manage_dept_tickets: bool,
}

fn default_active() -> bool {
    true
}

/// Admin-only account management.
#[derive(Debug, Clone)]
pub struct UserAdminService {
    users: Arc<UserRepository>,
    departments: Arc<DepartmentRepository>,
    verifier: CredentialVerifier,
}

impl UserAdminService {
    /// Creates a new admin service.
    pub fn new(
        users: Arc<UserRepository>,
        departments: Arc<DepartmentRepository>,
        verifier: CredentialVerifier,
    ) -> Self {
        Self {
            users,
            departments,
            verifier,
        }
    }

    /// List accounts, optionally narrowed by a username substring.
    pub async fn list_users(
        &self,
        ctx: &RequestContext,
        search: Option<&str>,
    ) -> Result<Vec<UserSummary>, AppError> {
        self.require_admin(ctx)?;

        let users = self.users.search(search).await?;
        let department_names: HashMap<i64, String> = self
            .departments
            .find_all()
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();

        let mut summaries = Vec::with_capacity(users.len());
        for user in users {
            summaries.push(self.summarize(user, &department_names).await?);
        }
        Ok(summaries)
    }

    /// Fetch one account for the edit view.
    pub async fn get_user(&self, ctx: &RequestContext, id: i64) -> Result<UserSummary, AppError> {
        self.require_admin(ctx)?;

        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let department_names: HashMap<i64, String> = self
            .departments
            .find_all()
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();

        self.summarize(user, &department_names).await
    }

    /// Create an account. Managers get their assignments inserted after
    /// the row exists.
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        request: CreateUserRequest,
    ) -> Result<AppUser, AppError> {
        self.require_admin(ctx)?;

        let user_name = request.user_name.trim();
        if user_name.is_empty() {
            return Err(AppError::validation("Username is required."));
        }
        if request.password.is_empty() {
            return Err(AppError::validation("Password is required."));
        }
        validate_role_fields(request.role, request.department_id, &request.managed_department_ids)?;

        if self.users.username_exists(user_name).await? {
            return Err(AppError::validation("Username already exists."));
        }

        let user = self
            .users
            .insert(&CreateUser {
                user_name: user_name.to_string(),
                password_hash: self.verifier.hash(&request.password),
                role: request.role,
                department_id: department_for_role(request.role, request.department_id),
                can_manage_dept_tickets: request.role == UserRole::User
                    && request.can_manage_dept_tickets,
                is_active: request.is_active,
            })
            .await?;

        if user.role == UserRole::Manager {
            let ids = distinct(&request.managed_department_ids);
            self.users.replace_managed_departments(user.id, &ids).await?;
        }

        info!(user = %user.user_name, role = %user.role, "Account created");
        Ok(user)
    }

    /// Edit an account. Manager assignments are replaced wholesale:
    /// existing links are cleared, then the new set is inserted.
    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        id: i64,
        request: UpdateUserRequest,
    ) -> Result<AppUser, AppError> {
        self.require_admin(ctx)?;

        validate_role_fields(request.role, request.department_id, &request.managed_department_ids)?;

        let user = self
            .users
            .update(
                id,
                &UpdateUser {
                    role: request.role,
                    is_active: request.is_active,
                    department_id: department_for_role(request.role, request.department_id),
                    can_manage_dept_tickets: request.role == UserRole::User
                        && request.can_manage_dept_tickets,
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let ids = if user.role == UserRole::Manager {
            distinct(&request.managed_department_ids)
        } else {
            Vec::new()
        };
        self.users.replace_managed_departments(user.id, &ids).await?;

        info!(user = %user.user_name, role = %user.role, "Account updated");
        Ok(user)
    }

    fn require_admin(&self, ctx: &RequestContext) -> Result<(), AppError> {
        if ctx.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Admin role required"))
        }
    }

    async fn summarize(
        &self,
        user: AppUser,
        department_names: &HashMap<i64, String>,
    ) -> Result<UserSummary, AppError> {
        let department_name = user
            .department_id
            .and_then(|id| department_names.get(&id).cloned());

        let managed_department_ids = if user.role == UserRole::Manager {
            self.users.managed_department_ids(user.id).await?
        } else {
            Vec::new()
        };
        let managed_departments = managed_department_ids
            .iter()
            .filter_map(|id| department_names.get(id).cloned())
            .collect();

        Ok(UserSummary {
            user,
            department_name,
            managed_departments,
            managed_department_ids,
        })
    }
}

/// Role-dependent field rules shared by create and edit: a User needs a
/// home department, a Manager needs at least one assignment.
fn validate_role_fields(
    role: UserRole,
    department_id: Option<i64>,
    managed_department_ids: &[i64],
) -> Result<(), AppError> {
    if role == UserRole::Manager && managed_department_ids.is_empty() {
        return Err(AppError::validation("Manager must have at least one department."));
    }
    if role == UserRole::User && department_id.is_none() {
        return Err(AppError::validation("Department is required for User."));
    }
    Ok(())
}

/// The home-department column is only meaningful for the User role.
fn department_for_role(role: UserRole, department_id: Option<i64>) -> Option<i64> {
    if role == UserRole::User { department_id } else { None }
}

fn distinct(ids: &[i64]) -> Vec<i64> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_requires_assignments() {
        assert!(validate_role_fields(UserRole::Manager, None, &[]).is_err());
        assert!(validate_role_fields(UserRole::Manager, None, &[3]).is_ok());
    }

    #[test]
    fn test_user_requires_department() {
        assert!(validate_role_fields(UserRole::User, None, &[]).is_err());
        assert!(validate_role_fields(UserRole::User, Some(3), &[]).is_ok());
    }

    #[test]
    fn test_admin_needs_neither() {
        assert!(validate_role_fields(UserRole::Admin, None, &[]).is_ok());
    }

    #[test]
    fn test_department_column_cleared_for_non_users() {
        assert_eq!(department_for_role(UserRole::User, Some(3)), Some(3));
        assert_eq!(department_for_role(UserRole::Manager, Some(3)), None);
        assert_eq!(department_for_role(UserRole::Admin, Some(3)), None);
    }

    #[test]
    fn test_distinct_dedups_and_sorts() {
        assert_eq!(distinct(&[4, 2, 4, 2, 9]), vec![2, 4, 9]);
    }
}
