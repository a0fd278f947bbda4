//! Department listing services.

pub mod service;

pub use service::DepartmentService;
