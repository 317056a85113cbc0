//! Authentication module
//!
//! Issues access and refresh credentials and rotates them on refresh
//! requests. No session state is kept server-side.

mod claims;
mod revocation;
mod service;
pub mod handlers;

pub use claims::{AccessClaims, RefreshClaims, REFRESH_TOKEN_TYPE};
pub use revocation::{NoRevocation, RevocationCheck};
pub use service::{CustomerLookup, TokenPair, TokenService, TOKEN_TYPE};
