//! # ticketdesk-service
//!
//! Business logic for TicketDesk. Every operation takes an explicit
//! [`context::RequestContext`] as its first argument — who is acting and
//! with which department scope — and enforces, in order: role
//! eligibility, department/ownership membership, and the status-machine
//! precondition. Nothing here reads ambient state.

pub mod context;
pub mod department;
pub mod ticket;
pub mod user;

pub use context::{DepartmentScope, RequestContext};
