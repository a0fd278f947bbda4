//! # ticketdesk-entity
//!
//! Domain entity models for TicketDesk. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod attachment;
pub mod department;
pub mod history;
pub mod session;
pub mod ticket;
pub mod user;
