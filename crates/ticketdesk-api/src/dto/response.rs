//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ticketdesk_entity::user::AppUser;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Account summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub user_name: String,
    pub role: String,
    pub department_id: Option<i64>,
    pub can_manage_dept_tickets: bool,
    pub is_active: bool,
}

impl From<&AppUser> for UserResponse {
    fn from(user: &AppUser) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.clone(),
            role: user.role.to_string(),
            department_id: user.department_id,
            can_manage_dept_tickets: user.can_manage_dept_tickets,
            is_active: user.is_active,
        }
    }
}

/// Login response: the session token plus the authenticated account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token for subsequent requests.
    pub token: Uuid,
    /// Session expiry.
    pub expires_at: chrono::DateTime<chrono::Utc>,
    /// The authenticated account.
    pub user: UserResponse,
}

/// The current principal, as resolved from the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    /// Home department (User role only).
    pub department_id: Option<i64>,
    /// Managed departments (Manager role only).
    pub managed_department_ids: Vec<i64>,
}
