//! Session lifecycle manager — login and logout flows.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use ticketdesk_core::error::AppError;
use ticketdesk_database::repositories::user::UserRepository;
use ticketdesk_entity::session::Session;
use ticketdesk_entity::user::{AppUser, UserRole};

use crate::password::CredentialVerifier;

use super::store::SessionStore;

/// Result of a successful login.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LoginResult {
    /// Created session; its id is the bearer token.
    pub session: Session,
    /// The authenticated user.
    pub user: AppUser,
}

/// Manages the complete session lifecycle.
#[derive(Debug, Clone)]
pub struct SessionManager {
    /// Session persistence.
    session_store: Arc<SessionStore>,
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Credential verifier.
    verifier: CredentialVerifier,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        session_store: Arc<SessionStore>,
        user_repo: Arc<UserRepository>,
        verifier: CredentialVerifier,
    ) -> Self {
        Self {
            session_store,
            user_repo,
            verifier,
        }
    }

    /// Performs the login flow:
    ///
    /// 1. Look up an active account by username
    /// 2. Verify the credential digest
    /// 3. Resolve the role-specific department scope
    /// 4. Create a fresh session row carrying that scope
    ///
    /// Each login gets its own session row, so scope from a previous
    /// login can never leak into the new one.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::authentication("Invalid username or password"))?;

        if !self.verifier.verify(password, &user.password_hash) {
            return Err(AppError::authentication("Invalid username or password"));
        }

        let (department_id, managed_department_ids) = match user.role {
            UserRole::User => (user.department_id, Vec::new()),
            UserRole::Manager => {
                let ids = self.user_repo.managed_department_ids(user.id).await?;
                (None, ids)
            }
            UserRole::Admin => (None, Vec::new()),
        };

        let session = self
            .session_store
            .create_session(
                user.id,
                &user.user_name,
                user.role,
                department_id,
                managed_department_ids,
            )
            .await?;

        info!(user = %user.user_name, role = %user.role, "Login successful");

        Ok(LoginResult { session, user })
    }

    /// Delete the given session unconditionally.
    pub async fn logout(&self, token: Uuid) -> Result<(), AppError> {
        self.session_store.remove(token).await?;
        info!(session = %token, "Logged out");
        Ok(())
    }
}
