use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::CustomerLookup;
use crate::customers::CustomerDirectory;
use crate::db::models::{
    Customer, Device, NewDevice, NewRegistrationAttempt, RegistrationAttempt, FAILURE_RESULT,
};
use crate::devices::DeviceStore;
use crate::error::StoreError;
use crate::registration::{AttemptLog, AttemptStore, IdentityKey};

const ATTEMPT_COLUMNS: &str =
    "id, phone, email, ip, device_id, action, result, reason, created_at";

const CUSTOMER_COLUMNS: &str = "id, email, first_name, last_name, username, role, \
    email_verified, phone_verified, is_active, created_at";

const DEVICE_COLUMNS: &str = "id, customer_id, device_name, device_type, os, os_version, \
    device_fingerprint, ip, is_active, last_used_at, created_at";

/// Postgres-backed customer and registration-attempt stores.
#[derive(Clone)]
pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(self.pool.as_ref())
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl CustomerLookup for DbOperations {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, StoreError> {
        let query = format!("SELECT {} FROM customers WHERE id = $1", CUSTOMER_COLUMNS);

        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(customer)
    }
}

#[async_trait]
impl CustomerDirectory for DbOperations {
    async fn list_customers(&self, limit: i64, offset: i64) -> Result<Vec<Customer>, StoreError> {
        let query = format!(
            "SELECT {} FROM customers ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            CUSTOMER_COLUMNS
        );

        let customers = sqlx::query_as::<_, Customer>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(customers)
    }

    async fn count_customers(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl DeviceStore for DbOperations {
    async fn create_device(&self, device: NewDevice) -> Result<Device, StoreError> {
        let query = format!(
            r#"
            INSERT INTO devices (id, customer_id, device_name, device_type, os, os_version,
                                 device_fingerprint, ip, is_active, last_used_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            DEVICE_COLUMNS
        );

        let stored = sqlx::query_as::<_, Device>(&query)
            .bind(device.id)
            .bind(device.customer_id)
            .bind(device.device_name)
            .bind(device.device_type)
            .bind(device.os)
            .bind(device.os_version)
            .bind(device.device_fingerprint)
            .bind(device.ip)
            .bind(device.is_active)
            .bind(device.last_used_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(stored)
    }
}

#[async_trait]
impl AttemptStore for DbOperations {
    async fn create(&self, attempt: NewRegistrationAttempt) -> Result<RegistrationAttempt, StoreError> {
        let query = format!(
            r#"
            INSERT INTO registration_attempts (id, phone, email, ip, device_id, action, result, reason)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            ATTEMPT_COLUMNS
        );

        let stored = sqlx::query_as::<_, RegistrationAttempt>(&query)
            .bind(attempt.id)
            .bind(attempt.phone)
            .bind(attempt.email)
            .bind(attempt.ip)
            .bind(attempt.device_id)
            .bind(attempt.action)
            .bind(attempt.result)
            .bind(attempt.reason)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(stored)
    }

    async fn count_failures_since(
        &self,
        key: &IdentityKey,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        // NULL parameters compare as unknown, so absent identity fields never match.
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM registration_attempts
            WHERE result = $1
              AND created_at >= $2
              AND (email = $3 OR phone = $4 OR ip = $5)
            "#,
        )
        .bind(FAILURE_RESULT)
        .bind(since)
        .bind(key.email.as_deref())
        .bind(key.phone.as_deref())
        .bind(key.ip.as_deref())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl AttemptLog for DbOperations {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RegistrationAttempt>, StoreError> {
        let query = format!("SELECT {} FROM registration_attempts WHERE id = $1", ATTEMPT_COLUMNS);

        let attempt = sqlx::query_as::<_, RegistrationAttempt>(&query)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(attempt)
    }

    async fn find_by_email(
        &self,
        email: &str,
        limit: i64,
    ) -> Result<Vec<RegistrationAttempt>, StoreError> {
        let query = format!(
            "SELECT {} FROM registration_attempts WHERE email = $1 ORDER BY created_at DESC LIMIT $2",
            ATTEMPT_COLUMNS
        );

        let attempts = sqlx::query_as::<_, RegistrationAttempt>(&query)
            .bind(email)
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(attempts)
    }
}
