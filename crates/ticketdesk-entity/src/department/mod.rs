//! Department hierarchy entities.

pub mod model;

pub use model::{Department, ManagerDepartment};
