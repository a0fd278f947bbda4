//! Shared value types used across crates.

pub mod sorting;

pub use sorting::SortDirection;
