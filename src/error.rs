use thiserror::Error;
use actix_web::{ResponseError, HttpResponse, http::StatusCode};
use serde_json::json;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("SMS error: {0}")]
    SmsError(#[from] SmsError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Failure kinds surfaced by the token service.
///
/// Each credential failure is its own variant so the HTTP layer can map it to
/// a response without inspecting message text.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credential")]
    InvalidCredential,

    #[error("Credential expired")]
    ExpiredCredential,

    #[error("Unknown subject")]
    UnknownSubject,

    #[error("Account inactive")]
    InactiveAccount,

    #[error("Credential revoked")]
    RevokedCredential,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// Errors produced by collaborator stores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Record not found")]
    NotFound,

    /// A uniqueness or reference constraint rejected the write.
    #[error("Constraint violated: {0}")]
    Conflict(String),
}

#[derive(Error, Debug)]
pub enum SmsError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Function error: {0}")]
    FunctionError(String),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db_err)
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
            {
                StoreError::Conflict(db_err.message().to_string())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StoreError(err.into())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl AppError {
    /// Message safe to return to the client. Store and internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::AuthError(e) => match e {
                AuthError::InvalidCredential
                | AuthError::UnknownSubject
                | AuthError::RevokedCredential => "Invalid refresh token".to_string(),
                AuthError::ExpiredCredential => "Refresh token has expired".to_string(),
                AuthError::InactiveAccount => "Customer account is inactive".to_string(),
                AuthError::StoreUnavailable(_) => "Service temporarily unavailable".to_string(),
            },
            AppError::StoreError(StoreError::NotFound) => "Record not found".to_string(),
            AppError::StoreError(StoreError::Conflict(_)) => {
                "Request conflicts with existing data".to_string()
            }
            AppError::StoreError(StoreError::Unavailable(_)) => {
                "Service temporarily unavailable".to_string()
            }
            AppError::SmsError(_) => "Failed to send SMS".to_string(),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::ConfigError(_) | AppError::InternalError(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let response = json!({
            "success": false,
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": self.public_message(),
        });
        HttpResponse::build(status).json(response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthError(e) => match e {
                AuthError::InvalidCredential => StatusCode::UNAUTHORIZED,
                AuthError::ExpiredCredential => StatusCode::UNAUTHORIZED,
                AuthError::UnknownSubject => StatusCode::UNAUTHORIZED,
                AuthError::RevokedCredential => StatusCode::UNAUTHORIZED,
                AuthError::InactiveAccount => StatusCode::FORBIDDEN,
                AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            AppError::StoreError(StoreError::NotFound) => StatusCode::NOT_FOUND,
            AppError::StoreError(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::StoreError(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::SmsError(_) => StatusCode::BAD_GATEWAY,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
