use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marker carried by every refresh credential.
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Claims embedded in an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    pub fn new(
        customer_id: Uuid,
        email: &str,
        device_id: Option<&str>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: customer_id.to_string(),
            email: email.to_string(),
            device_id: device_id.map(str::to_string),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

/// Claims embedded in a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    pub sub: String,
    #[serde(rename = "type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl RefreshClaims {
    pub fn new(
        customer_id: Uuid,
        token_id: Option<&str>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: customer_id.to_string(),
            token_type: REFRESH_TOKEN_TYPE.to_string(),
            jti: token_id.map(str::to_string),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// Parses the subject as a customer id.
    pub fn customer_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}
