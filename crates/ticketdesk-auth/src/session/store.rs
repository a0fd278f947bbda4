//! Session storage operations wrapping the database repository.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use ticketdesk_core::config::session::SessionConfig;
use ticketdesk_core::error::AppError;
use ticketdesk_database::repositories::session::SessionRepository;
use ticketdesk_entity::session::{CreateSession, Session};
use ticketdesk_entity::user::UserRole;

/// Abstracts session persistence operations.
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Session database repository.
    repo: Arc<SessionRepository>,
    /// Session configuration.
    config: SessionConfig,
}

impl SessionStore {
    /// Creates a new session store.
    pub fn new(repo: Arc<SessionRepository>, config: SessionConfig) -> Self {
        Self { repo, config }
    }

    /// Creates a session row carrying the already-resolved scope.
    pub async fn create_session(
        &self,
        user_id: i64,
        user_name: &str,
        role: UserRole,
        department_id: Option<i64>,
        managed_department_ids: Vec<i64>,
    ) -> Result<Session, AppError> {
        let expires_at = Utc::now() + Duration::hours(self.config.ttl_hours as i64);

        self.repo
            .insert(&CreateSession {
                user_id,
                user_name: user_name.to_string(),
                role,
                department_id,
                managed_department_ids,
                expires_at,
            })
            .await
    }

    /// Resolve a bearer token to a live session.
    ///
    /// Unknown and expired tokens are both Authentication failures; an
    /// expired row is deleted on sight.
    pub async fn validate(&self, token: Uuid) -> Result<Session, AppError> {
        let session = self
            .repo
            .find_by_id(token)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid or expired session"))?;

        if session.is_expired() {
            self.repo.delete(session.id).await?;
            return Err(AppError::authentication("Invalid or expired session"));
        }

        Ok(session)
    }

    /// Delete a session unconditionally (logout).
    pub async fn remove(&self, token: Uuid) -> Result<(), AppError> {
        self.repo.delete(token).await
    }

    /// Purge expired rows.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        self.repo.delete_expired().await
    }
}
