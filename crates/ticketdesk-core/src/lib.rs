//! # ticketdesk-core
//!
//! Core crate for TicketDesk. Contains configuration schemas, shared
//! sorting types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TicketDesk crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
