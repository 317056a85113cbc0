use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use crate::AppState;
use crate::error::AppError;
use tracing::{info, error};

pub const DEVICE_ID_HEADER: &str = "x-device-id";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// POST /auth/refresh
///
/// Exchanges a refresh token for a new access/refresh pair. An optional
/// `x-device-id` header is embedded in the new access token.
pub async fn refresh(
    req: HttpRequest,
    body: web::Json<RefreshTokenRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if body.refresh_token.is_empty() {
        return Err(AppError::ValidationError("refreshToken must not be empty".into()));
    }

    let device_id = req
        .headers()
        .get(DEVICE_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty());

    match state.token_service.rotate(&body.refresh_token, device_id).await {
        Ok(pair) => {
            info!(device_id = ?device_id, "Token refresh succeeded");
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "data": pair,
            })))
        }
        Err(e) => {
            error!(error = %e, "Token refresh failed");
            Err(e)
        }
    }
}
