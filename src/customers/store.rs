use async_trait::async_trait;

use crate::db::models::Customer;
use crate::error::StoreError;

/// Paged read access to customer records.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Newest first.
    async fn list_customers(&self, limit: i64, offset: i64) -> Result<Vec<Customer>, StoreError>;

    async fn count_customers(&self) -> Result<i64, StoreError>;
}
