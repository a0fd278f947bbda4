//! `AuthSession` extractor — resolves the bearer session token into a
//! typed `RequestContext`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use ticketdesk_core::error::AppError;
use ticketdesk_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated request context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthSession(pub RequestContext);

impl AuthSession {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthSession {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let token = Uuid::parse_str(token.trim())
            .map_err(|_| AppError::authentication("Invalid session token"))?;

        // The session row carries the typed scope resolved at login.
        let session = state.session_store.validate(token).await?;

        Ok(AuthSession(RequestContext::from_session(&session)))
    }
}
