use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::{NewRegistrationAttempt, RegistrationAttempt};
use crate::error::StoreError;

/// Identity fields used to correlate attempts. A record matches when any
/// populated field equals the record's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityKey {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub ip: Option<String>,
}

impl IdentityKey {
    pub fn new(email: Option<String>, phone: Option<String>, ip: Option<String>) -> Self {
        fn populated(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }
        Self {
            email: populated(email),
            phone: populated(phone),
            ip: populated(ip),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.ip.is_none()
    }

    pub fn matches(&self, attempt: &RegistrationAttempt) -> bool {
        let email = self.email.is_some() && self.email == attempt.email;
        let phone = self.phone.is_some() && self.phone == attempt.phone;
        let ip = self.ip.as_deref() == Some(attempt.ip.as_str());
        email || phone || ip
    }
}

/// Append-only attempt log as seen by the abuse counter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn create(&self, attempt: NewRegistrationAttempt) -> Result<RegistrationAttempt, StoreError>;

    /// Failed attempts matching `key` with `created_at >= since`.
    async fn count_failures_since(
        &self,
        key: &IdentityKey,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError>;
}

/// Read access to individual attempts for the history endpoints.
#[async_trait]
pub trait AttemptLog: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RegistrationAttempt>, StoreError>;

    /// Newest first.
    async fn find_by_email(
        &self,
        email: &str,
        limit: i64,
    ) -> Result<Vec<RegistrationAttempt>, StoreError>;
}
