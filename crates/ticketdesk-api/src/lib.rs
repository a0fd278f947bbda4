//! # ticketdesk-api
//!
//! The HTTP surface of TicketDesk: an Axum router over the service layer.
//! Every authenticated handler receives a typed [`RequestContext`] via the
//! session extractor; the view layer consuming these JSON responses is a
//! separate concern.
//!
//! [`RequestContext`]: ticketdesk_service::RequestContext

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
