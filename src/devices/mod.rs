//! Device registration

use async_trait::async_trait;

use crate::db::models::{Device, NewDevice};
use crate::error::StoreError;

pub mod handlers;

#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Fails with `StoreError::Conflict` for a duplicate id or unknown customer.
    async fn create_device(&self, device: NewDevice) -> Result<Device, StoreError>;
}
