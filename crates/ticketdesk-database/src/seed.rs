//! Initial data seeding: department tree and default accounts.
//!
//! Runs at startup and is idempotent — departments are only created when
//! none exist, and accounts are only created when the `admin` account is
//! missing. The caller supplies the default credential digest so this
//! crate stays independent of the auth crate.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;

use ticketdesk_core::result::AppResult;
use ticketdesk_entity::user::{CreateUser, UserRole};

use crate::repositories::department::DepartmentRepository;
use crate::repositories::user::UserRepository;

/// Root departments and their leaves.
const DEPARTMENT_TREE: &[(&str, &[&str])] = &[
    ("HR", &["HR Training", "HR Management"]),
    ("IT", &["IT Training", "IT Management"]),
    ("Finance", &["Finance Training", "Finance Management"]),
];

/// Department users: username → home leaf department.
const DEPARTMENT_USERS: &[(&str, &str)] = &[
    ("hr.training", "HR Training"),
    ("hr.management", "HR Management"),
    ("it.training", "IT Training"),
    ("it.management", "IT Management"),
    ("fin.training", "Finance Training"),
    ("fin.management", "Finance Management"),
];

/// Managers: username → managed leaf departments.
const MANAGERS: &[(&str, &[&str])] = &[
    ("mgr.hr", &["HR Training", "HR Management"]),
    ("mgr.it", &["IT Training", "IT Management"]),
    ("mgr.finance", &["Finance Training", "Finance Management"]),
];

/// Seed the department tree and default accounts when missing.
pub async fn run(pool: &PgPool, default_password_hash: &str) -> AppResult<()> {
    let departments = DepartmentRepository::new(pool.clone());
    let users = UserRepository::new(pool.clone());

    if departments.count().await? == 0 {
        info!("Seeding departments (3 roots + 6 leaves)");
        for (root_name, leaves) in DEPARTMENT_TREE {
            let root = departments.insert(root_name, None).await?;
            for leaf_name in *leaves {
                departments.insert(leaf_name, Some(root.id)).await?;
            }
        }
    }

    if users.find_by_username("admin").await?.is_some() {
        return Ok(());
    }

    info!("Seeding default accounts");

    let by_name: HashMap<String, i64> = departments
        .find_all()
        .await?
        .into_iter()
        .map(|d| (d.name, d.id))
        .collect();

    users
        .insert(&CreateUser {
            user_name: "admin".into(),
            password_hash: default_password_hash.into(),
            role: UserRole::Admin,
            department_id: None,
            can_manage_dept_tickets: false,
            is_active: true,
        })
        .await?;

    for (user_name, department) in DEPARTMENT_USERS {
        users
            .insert(&CreateUser {
                user_name: (*user_name).into(),
                password_hash: default_password_hash.into(),
                role: UserRole::User,
                department_id: by_name.get(*department).copied(),
                can_manage_dept_tickets: false,
                is_active: true,
            })
            .await?;
    }

    for (user_name, managed) in MANAGERS {
        let manager = users
            .insert(&CreateUser {
                user_name: (*user_name).into(),
                password_hash: default_password_hash.into(),
                role: UserRole::Manager,
                department_id: None,
                can_manage_dept_tickets: false,
                is_active: true,
            })
            .await?;

        let ids: Vec<i64> = managed
            .iter()
            .filter_map(|name| by_name.get(*name).copied())
            .collect();
        users.replace_managed_departments(manager.id, &ids).await?;
    }

    Ok(())
}
