//! Department entity model.
//!
//! Departments form a two-level tree: root departments (no parent) group
//! leaf departments (parent set). Only leaf departments are valid ticket
//! endpoints.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A department node in the two-level hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Department {
    /// Unique department identifier.
    pub id: i64,
    /// Display name (e.g. "IT Training").
    pub name: String,
    /// Parent department. `None` marks a root department.
    pub parent_department_id: Option<i64>,
}

impl Department {
    /// A leaf department has a parent and is the only valid ticket target.
    pub fn is_leaf(&self) -> bool {
        self.parent_department_id.is_some()
    }

    /// The root of this department's subtree. A department with no parent
    /// is its own root.
    pub fn root_id(&self) -> i64 {
        self.parent_department_id.unwrap_or(self.id)
    }
}

/// Association between a Manager user and a leaf department they triage.
///
/// Rows are replaced wholesale (delete-all, re-insert) whenever an admin
/// edits a manager's assignments.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ManagerDepartment {
    /// The managing user.
    pub manager_user_id: i64,
    /// The managed leaf department.
    pub department_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dept(id: i64, parent: Option<i64>) -> Department {
        Department {
            id,
            name: format!("dept-{id}"),
            parent_department_id: parent,
        }
    }

    #[test]
    fn test_root_is_its_own_root() {
        let root = dept(1, None);
        assert!(!root.is_leaf());
        assert_eq!(root.root_id(), 1);
    }

    #[test]
    fn test_leaf_resolves_parent_root() {
        let leaf = dept(7, Some(2));
        assert!(leaf.is_leaf());
        assert_eq!(leaf.root_id(), 2);
    }
}
