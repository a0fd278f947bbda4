//! Account administration services.

pub mod admin;

pub use admin::UserAdminService;
