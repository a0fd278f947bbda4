//! Ticket history (audit log) entities.

pub mod model;

pub use model::{NewTicketHistory, TicketHistory};
