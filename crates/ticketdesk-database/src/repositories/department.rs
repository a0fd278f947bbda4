//! Department repository implementation.

use sqlx::PgPool;

use ticketdesk_core::error::{AppError, ErrorKind};
use ticketdesk_core::result::AppResult;
use ticketdesk_entity::department::Department;

/// Repository for department hierarchy queries.
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    /// Create a new department repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a department by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find department by id", e)
            })
    }

    /// List every department, roots and leaves alike.
    pub async fn find_all(&self) -> AppResult<Vec<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list departments", e))
    }

    /// List leaf departments (the only valid ticket targets), by name.
    pub async fn find_leaves(&self) -> AppResult<Vec<Department>> {
        sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE parent_department_id IS NOT NULL ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list leaf departments", e)
        })
    }

    /// Count all departments. Used to decide whether seeding is needed.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM departments")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count departments", e)
            })
    }

    /// Insert a department node. Used by the seed routine.
    pub async fn insert(&self, name: &str, parent_department_id: Option<i64>) -> AppResult<Department> {
        sqlx::query_as::<_, Department>(
            "INSERT INTO departments (name, parent_department_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(parent_department_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert department", e))
    }
}
