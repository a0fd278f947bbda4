//! Department listing and creation-target resolution.

use std::sync::Arc;

use ticketdesk_core::error::AppError;
use ticketdesk_database::repositories::department::DepartmentRepository;
use ticketdesk_database::repositories::user::UserRepository;
use ticketdesk_entity::department::Department;
use ticketdesk_entity::user::UserRole;

use crate::context::RequestContext;

/// Read-side service over the department hierarchy.
#[derive(Debug, Clone)]
pub struct DepartmentService {
    departments: Arc<DepartmentRepository>,
    users: Arc<UserRepository>,
}

impl DepartmentService {
    /// Creates a new department service.
    pub fn new(departments: Arc<DepartmentRepository>, users: Arc<UserRepository>) -> Self {
        Self { departments, users }
    }

    /// Leaf departments, ordered by name. The only valid ticket targets.
    pub async fn leaves(&self) -> Result<Vec<Department>, AppError> {
        self.departments.find_leaves().await
    }

    /// Leaf departments the caller may target with a new ticket.
    ///
    /// Users lose every leaf under their own root; managers lose their
    /// managed set. The create operation re-validates, so this is a
    /// convenience for pickers, not the enforcement point.
    pub async fn creation_targets(&self, ctx: &RequestContext) -> Result<Vec<Department>, AppError> {
        let leaves = self.departments.find_leaves().await?;

        match ctx.role {
            UserRole::User => {
                let own_department = match ctx.member_department() {
                    Some(id) => Some(id),
                    None => self.users.find_department_id(ctx.user_id).await?,
                };
                let own_root = match own_department {
                    Some(id) => self.departments.find_by_id(id).await?.map(|d| d.root_id()),
                    None => None,
                };
                Ok(match own_root {
                    Some(root) => leaves.into_iter().filter(|d| d.root_id() != root).collect(),
                    None => leaves,
                })
            }
            UserRole::Manager => Ok(leaves
                .into_iter()
                .filter(|d| !ctx.manages(d.id))
                .collect()),
            UserRole::Admin => Ok(leaves),
        }
    }
}
