//! Registration abuse control
//!
//! Records registration attempts and throttles identities with too many
//! recent failures.

mod abuse;
mod store;
pub mod handlers;

pub use abuse::{AbuseCounter, RateLimitPolicy, RateLimitStatus};
pub use store::{AttemptLog, AttemptStore, IdentityKey};
