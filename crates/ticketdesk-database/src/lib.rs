//! # ticketdesk-database
//!
//! PostgreSQL connection management, migrations, seeding, and repository
//! implementations for TicketDesk. Repositories own all SQL; the service
//! layer never touches the pool directly.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod seed;
