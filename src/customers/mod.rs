//! Customer directory
//!
//! Read-only listing and lookup of customer records.

mod store;
pub mod handlers;

pub use store::CustomerDirectory;
