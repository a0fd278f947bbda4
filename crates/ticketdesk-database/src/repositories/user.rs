//! User account repository implementation.

use sqlx::PgPool;

use ticketdesk_core::error::{AppError, ErrorKind};
use ticketdesk_core::result::AppResult;
use ticketdesk_entity::user::{AppUser, CreateUser, UpdateUser};

/// Repository for account CRUD and manager-assignment queries.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an account by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<AppUser>> {
        sqlx::query_as::<_, AppUser>("SELECT * FROM app_users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find an account by username (case-insensitive).
    pub async fn find_by_username(&self, user_name: &str) -> AppResult<Option<AppUser>> {
        sqlx::query_as::<_, AppUser>("SELECT * FROM app_users WHERE LOWER(user_name) = LOWER($1)")
            .bind(user_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    /// Check whether a username is already taken.
    pub async fn username_exists(&self, user_name: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM app_users WHERE LOWER(user_name) = LOWER($1))",
        )
        .bind(user_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check username", e))
    }

    /// List accounts, optionally narrowed by a username substring.
    pub async fn search(&self, user_name_contains: Option<&str>) -> AppResult<Vec<AppUser>> {
        match user_name_contains {
            Some(s) if !s.trim().is_empty() => sqlx::query_as::<_, AppUser>(
                "SELECT * FROM app_users WHERE user_name ILIKE $1 ORDER BY user_name",
            )
            .bind(format!("%{}%", s.trim()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search users", e)),
            _ => sqlx::query_as::<_, AppUser>("SELECT * FROM app_users ORDER BY user_name")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e)),
        }
    }

    /// Accounts eligible for assignment in a department: active, role
    /// `user`, affiliated with that department. Ordered by username.
    pub async fn find_assignable(&self, department_id: i64) -> AppResult<Vec<AppUser>> {
        sqlx::query_as::<_, AppUser>(
            "SELECT * FROM app_users \
             WHERE is_active AND role = 'user' AND department_id = $1 \
             ORDER BY user_name",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list assignable users", e)
        })
    }

    /// Insert a new account.
    pub async fn insert(&self, create: &CreateUser) -> AppResult<AppUser> {
        sqlx::query_as::<_, AppUser>(
            "INSERT INTO app_users \
             (user_name, password_hash, role, department_id, can_manage_dept_tickets, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&create.user_name)
        .bind(&create.password_hash)
        .bind(create.role)
        .bind(create.department_id)
        .bind(create.can_manage_dept_tickets)
        .bind(create.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert user", e))
    }

    /// Apply an admin edit to an existing account.
    pub async fn update(&self, id: i64, update: &UpdateUser) -> AppResult<Option<AppUser>> {
        sqlx::query_as::<_, AppUser>(
            "UPDATE app_users \
             SET role = $1, is_active = $2, department_id = $3, can_manage_dept_tickets = $4 \
             WHERE id = $5 RETURNING *",
        )
        .bind(update.role)
        .bind(update.is_active)
        .bind(update.department_id)
        .bind(update.can_manage_dept_tickets)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user", e))
    }

    /// The department ids a manager is assigned to triage.
    pub async fn managed_department_ids(&self, manager_user_id: i64) -> AppResult<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT department_id FROM manager_departments \
             WHERE manager_user_id = $1 ORDER BY department_id",
        )
        .bind(manager_user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load managed departments", e)
        })
    }

    /// Replace a manager's department assignments wholesale: delete all
    /// existing rows, then insert the new set, in one transaction.
    pub async fn replace_managed_departments(
        &self,
        manager_user_id: i64,
        department_ids: &[i64],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("DELETE FROM manager_departments WHERE manager_user_id = $1")
            .bind(manager_user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear managed departments", e)
            })?;

        for department_id in department_ids {
            sqlx::query(
                "INSERT INTO manager_departments (manager_user_id, department_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(manager_user_id)
            .bind(department_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to insert managed department", e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }

    /// The stored home department of an account, if any. Used as the
    /// fallback when the session carries no sender department.
    pub async fn find_department_id(&self, user_id: i64) -> AppResult<Option<i64>> {
        let row: Option<Option<i64>> =
            sqlx::query_scalar("SELECT department_id FROM app_users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to load user department", e)
                })?;
        Ok(row.flatten())
    }
}
