use async_trait::async_trait;

use crate::auth::claims::RefreshClaims;
use crate::error::StoreError;

/// Consulted by the token service after a refresh credential verifies and
/// before a new pair is minted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RevocationCheck: Send + Sync {
    async fn is_revoked(&self, claims: &RefreshClaims) -> Result<bool, StoreError>;
}

/// Stateless rotation: nothing is ever revoked.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRevocation;

#[async_trait]
impl RevocationCheck for NoRevocation {
    async fn is_revoked(&self, _claims: &RefreshClaims) -> Result<bool, StoreError> {
        Ok(false)
    }
}
