//! Ticket entities: the central workflow aggregate.

pub mod filter;
pub mod model;
pub mod priority;
pub mod status;

pub use filter::{StatusBucket, TicketFilter, TicketSort, TicketSortKey};
pub use model::{NewTicket, Ticket, TicketCounts, TicketListItem};
pub use priority::TicketPriority;
pub use status::TicketStatus;
