//! Ticket attachment entities.

pub mod model;

pub use model::{NewTicketAttachment, TicketAttachment};
