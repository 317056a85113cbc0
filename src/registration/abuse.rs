use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::RegistrationConfig;
use crate::db::models::{NewRegistrationAttempt, RegistrationAttempt};
use crate::error::AppError;
use crate::registration::store::{AttemptStore, IdentityKey};

/// Window and threshold applied by [`AbuseCounter::check_rate_limit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub window_minutes: i64,
    pub threshold: i64,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window_minutes: 60,
            threshold: 5,
        }
    }
}

impl From<&RegistrationConfig> for RateLimitPolicy {
    fn from(config: &RegistrationConfig) -> Self {
        Self {
            window_minutes: config.window_minutes,
            threshold: config.failure_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    pub failed_attempts: i64,
    pub is_limited: bool,
    pub message: String,
}

/// Counts failed registration attempts over a trailing window.
///
/// Holds no counters of its own: every check re-reads the attempt store.
pub struct AbuseCounter {
    store: Arc<dyn AttemptStore>,
    policy: RateLimitPolicy,
}

impl AbuseCounter {
    pub fn new(store: Arc<dyn AttemptStore>, policy: RateLimitPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Appends an attempt. Store errors are returned unchanged.
    pub async fn record_attempt(
        &self,
        attempt: NewRegistrationAttempt,
    ) -> Result<RegistrationAttempt, AppError> {
        if attempt.action.trim().is_empty() {
            return Err(AppError::ValidationError("action is required".into()));
        }
        if attempt.result.trim().is_empty() {
            return Err(AppError::ValidationError("result is required".into()));
        }

        let stored = self.store.create(attempt).await?;
        info!(
            attempt_id = %stored.id,
            action = %stored.action,
            result = %stored.result,
            "Registration attempt recorded"
        );
        Ok(stored)
    }

    pub async fn count_recent_failures(
        &self,
        key: &IdentityKey,
        window_minutes: i64,
    ) -> Result<i64, AppError> {
        self.count_recent_failures_at(key, window_minutes, Utc::now()).await
    }

    /// Counts failures created at or after `now - window_minutes`.
    pub async fn count_recent_failures_at(
        &self,
        key: &IdentityKey,
        window_minutes: i64,
        now: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let since = window_start(now, window_minutes)?;
        if key.is_empty() {
            return Ok(0);
        }
        Ok(self.store.count_failures_since(key, since).await?)
    }

    /// Applies the threshold policy. `window_minutes` overrides the policy window.
    pub async fn check_rate_limit(
        &self,
        key: &IdentityKey,
        window_minutes: Option<i64>,
    ) -> Result<RateLimitStatus, AppError> {
        let minutes = window_minutes.unwrap_or(self.policy.window_minutes);
        if minutes <= 0 {
            return Err(AppError::ValidationError("minutes must be positive".into()));
        }

        let failed_attempts = self.count_recent_failures(key, minutes).await?;
        let is_limited = failed_attempts >= self.policy.threshold;

        let message = if is_limited {
            warn!(failed_attempts, minutes, email = ?key.email, phone = ?key.phone, ip = ?key.ip, "Registration rate limit exceeded");
            format!(
                "Rate limit exceeded. {} failed attempts in the last {} minutes.",
                failed_attempts, minutes
            )
        } else {
            format!("{} failed attempts in the last {} minutes.", failed_attempts, minutes)
        };

        Ok(RateLimitStatus {
            failed_attempts,
            is_limited,
            message,
        })
    }
}

/// `now - window_minutes`, or a validation error when the window leaves the
/// representable time range.
fn window_start(now: DateTime<Utc>, window_minutes: i64) -> Result<DateTime<Utc>, AppError> {
    Duration::try_minutes(window_minutes)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| AppError::ValidationError("minutes is out of range".into()))
}
