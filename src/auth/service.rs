use crate::auth::claims::{AccessClaims, RefreshClaims, REFRESH_TOKEN_TYPE};
use crate::auth::revocation::{NoRevocation, RevocationCheck};
use crate::config::AuthConfig;
use crate::db::models::Customer;
use crate::error::{AppError, AuthError, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const TOKEN_TYPE: &str = "Bearer";

/// Read-only view of customer records needed to gate rotation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerLookup: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, StoreError>;
}

/// Result of a successful rotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// Issues, verifies, and rotates bearer credentials.
///
/// Access and refresh tokens are signed with separate HS256 keys. Nothing is
/// stored server-side; every rotation re-reads the customer so a deactivated
/// account is cut off at its next refresh.
pub struct TokenService {
    customers: Arc<dyn CustomerLookup>,
    revocation: Arc<dyn RevocationCheck>,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenService {
    /// Builds the service from startup configuration.
    ///
    /// Fails with `ConfigError` if either secret is empty, if both kinds share
    /// a secret, or if a lifetime is not positive.
    pub fn new(config: &AuthConfig, customers: Arc<dyn CustomerLookup>) -> Result<Self, AppError> {
        if config.access_token_secret.is_empty() || config.refresh_token_secret.is_empty() {
            return Err(AppError::ConfigError("token signing secrets must not be empty".into()));
        }
        if config.access_token_secret == config.refresh_token_secret {
            return Err(AppError::ConfigError(
                "access and refresh tokens must use distinct signing secrets".into(),
            ));
        }
        if config.access_token_ttl_secs <= 0 || config.refresh_token_ttl_secs <= 0 {
            return Err(AppError::ConfigError("token lifetimes must be positive".into()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            customers,
            revocation: Arc::new(NoRevocation),
            access_encoding: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            access_ttl: Duration::seconds(config.access_token_ttl_secs),
            refresh_ttl: Duration::seconds(config.refresh_token_ttl_secs),
            validation,
        })
    }

    pub fn with_revocation_check(mut self, revocation: Arc<dyn RevocationCheck>) -> Self {
        self.revocation = revocation;
        self
    }

    /// Access token lifetime in seconds, as reported in `expiresIn`.
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    pub fn issue_access_token(
        &self,
        customer_id: Uuid,
        email: &str,
        device_id: Option<&str>,
    ) -> Result<String, AppError> {
        self.issue_access_token_at(customer_id, email, device_id, Utc::now())
    }

    pub fn issue_refresh_token(
        &self,
        customer_id: Uuid,
        token_id: Option<&str>,
    ) -> Result<String, AppError> {
        self.issue_refresh_token_at(customer_id, token_id, Utc::now())
    }

    fn issue_access_token_at(
        &self,
        customer_id: Uuid,
        email: &str,
        device_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = AccessClaims::new(customer_id, email, device_id, now, self.access_ttl);
        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| AppError::InternalError(format!("Access token signing failed: {}", e)))
    }

    fn issue_refresh_token_at(
        &self,
        customer_id: Uuid,
        token_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = RefreshClaims::new(customer_id, token_id, now, self.refresh_ttl);
        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| AppError::InternalError(format!("Refresh token signing failed: {}", e)))
    }

    /// Checks signature, structure, kind marker, and expiry of a refresh token.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        let claims = decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(classify)?;

        if claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(AuthError::InvalidCredential);
        }
        Ok(claims)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.access_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(classify)
    }

    /// Exchanges a valid refresh token for a new access/refresh pair.
    ///
    /// The presented refresh token is not invalidated; two concurrent calls
    /// with the same token both succeed.
    pub async fn rotate(
        &self,
        refresh_token: &str,
        device_id: Option<&str>,
    ) -> Result<TokenPair, AppError> {
        info!("Attempting to refresh access token");

        let claims = self.verify_refresh_token(refresh_token).map_err(|e| {
            warn!(error = %e, "Refresh token verification failed");
            e
        })?;

        let customer_id = claims.customer_id().ok_or_else(|| {
            warn!(subject = %claims.sub, "Refresh token subject is not a customer id");
            AuthError::InvalidCredential
        })?;

        if self.revocation.is_revoked(&claims).await.map_err(AuthError::from)? {
            warn!(customer_id = %customer_id, jti = ?claims.jti, "Revoked refresh token presented");
            return Err(AuthError::RevokedCredential.into());
        }

        let customer = self
            .customers
            .find_by_id(customer_id)
            .await
            .map_err(AuthError::from)?
            .ok_or_else(|| {
                warn!(customer_id = %customer_id, "Customer not found for refresh token");
                AuthError::UnknownSubject
            })?;

        if !customer.is_active {
            warn!(customer_id = %customer_id, "Inactive customer attempted token refresh");
            return Err(AuthError::InactiveAccount.into());
        }

        let now = Utc::now();
        let token_id = Uuid::new_v4().to_string();
        let access_token = self.issue_access_token_at(customer.id, &customer.email, device_id, now)?;
        let refresh_token = self.issue_refresh_token_at(customer.id, Some(&token_id), now)?;

        info!(customer_id = %customer_id, "Tokens refreshed successfully");

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_token_ttl_secs(),
            token_type: TOKEN_TYPE.to_string(),
        })
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
        _ => AuthError::InvalidCredential,
    }
}
