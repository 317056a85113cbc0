use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Result label counted by the abuse counter.
pub const FAILURE_RESULT: &str = "failure";

/// Role assigned to customers created without one.
pub const DEFAULT_CUSTOMER_ROLE: &str = "customer";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub role: String,
    pub email_verified: bool,
    pub phone_verified: bool,
    #[serde(skip_serializing)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            first_name: None,
            last_name: None,
            username: None,
            role: DEFAULT_CUSTOMER_ROLE.to_string(),
            email_verified: false,
            phone_verified: false,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// A device registered to a customer.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub device_name: Option<String>,
    pub device_type: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub device_fingerprint: Option<String>,
    pub ip: Option<String>,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub device_name: Option<String>,
    pub device_type: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub device_fingerprint: Option<String>,
    pub ip: Option<String>,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl NewDevice {
    pub fn into_device(self, created_at: DateTime<Utc>) -> Device {
        Device {
            id: self.id,
            customer_id: self.customer_id,
            device_name: self.device_name,
            device_type: self.device_type,
            os: self.os,
            os_version: self.os_version,
            device_fingerprint: self.device_fingerprint,
            ip: self.ip,
            is_active: self.is_active,
            last_used_at: self.last_used_at,
            created_at,
        }
    }
}

/// A persisted registration attempt. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationAttempt {
    pub id: Uuid,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub ip: String,
    pub device_id: Option<String>,
    pub action: String,
    pub result: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RegistrationAttempt {
    pub fn is_failure(&self) -> bool {
        self.result == FAILURE_RESULT
    }
}

/// Attempt fields supplied by the caller; the store assigns `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistrationAttempt {
    pub id: Uuid,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub ip: String,
    pub device_id: Option<String>,
    pub action: String,
    pub result: String,
    pub reason: Option<String>,
}

impl NewRegistrationAttempt {
    pub fn into_attempt(self, created_at: DateTime<Utc>) -> RegistrationAttempt {
        RegistrationAttempt {
            id: self.id,
            phone: self.phone,
            email: self.email,
            ip: self.ip,
            device_id: self.device_id,
            action: self.action,
            result: self.result,
            reason: self.reason,
            created_at,
        }
    }
}
