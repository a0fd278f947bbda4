//! # ticketdesk-auth
//!
//! Credential verification and session lifecycle for TicketDesk. Login
//! resolves the role-specific department scope exactly once and stores it
//! on the session row; every later request reads the typed scope back
//! without re-parsing anything.

pub mod password;
pub mod session;

pub use password::CredentialVerifier;
pub use session::{SessionManager, SessionStore};
