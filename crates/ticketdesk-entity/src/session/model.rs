//! Session entity model.
//!
//! Sessions are created on login and destroyed on logout or expiry. The
//! role-specific department scope is resolved and stored **once** at
//! login; downstream code never re-parses it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::user::UserRole;

/// An active login session. The row id doubles as the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier / opaque bearer token.
    pub id: Uuid,
    /// The account this session belongs to.
    pub user_id: i64,
    /// Username at login time.
    pub user_name: String,
    /// Role at login time.
    pub role: UserRole,
    /// Home department scope (User role only).
    pub department_id: Option<i64>,
    /// Managed department scope (Manager role only).
    pub managed_department_ids: Vec<i64>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Data required to create a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub user_id: i64,
    pub user_name: String,
    pub role: UserRole,
    pub department_id: Option<i64>,
    pub managed_department_ids: Vec<i64>,
    pub expires_at: DateTime<Utc>,
}
