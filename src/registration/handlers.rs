use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::db::models::NewRegistrationAttempt;
use crate::error::AppError;
use crate::registration::store::IdentityKey;

const DEFAULT_HISTORY_LIMIT: i64 = 10;
const MAX_HISTORY_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRequest {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub action: String,
    pub result: String,
    pub reason: Option<String>,
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptCreated {
    pub id: Uuid,
    pub action: String,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitCheckRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub minutes: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

const UNKNOWN_IP: &str = "unknown";

/// Socket address of the caller. Forwarding headers are honoured only when
/// `server.trust_forwarded` is set.
fn client_ip(req: &HttpRequest, trust_forwarded: bool) -> Option<String> {
    if trust_forwarded {
        return req.connection_info().realip_remote_addr().map(|addr| {
            addr.parse::<std::net::SocketAddr>()
                .map(|socket| socket.ip().to_string())
                .unwrap_or_else(|_| addr.to_string())
        });
    }
    req.peer_addr().map(|addr| addr.ip().to_string())
}

/// Whole-minute window from the request body.
fn requested_window(minutes: Option<f64>) -> Result<Option<i64>, AppError> {
    match minutes {
        None => Ok(None),
        Some(m) if m.is_finite() && m.fract() == 0.0 && m.abs() < i64::MAX as f64 => {
            Ok(Some(m as i64))
        }
        Some(_) => Err(AppError::ValidationError(
            "minutes must be a whole number".into(),
        )),
    }
}

/// POST /api/registration/attempt
pub async fn record_attempt(
    req: HttpRequest,
    body: web::Json<AttemptRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let attempt = NewRegistrationAttempt {
        id: Uuid::new_v4(),
        phone: body.phone,
        email: body.email,
        ip: client_ip(&req, state.config.server.trust_forwarded)
            .unwrap_or_else(|| UNKNOWN_IP.to_string()),
        device_id: body.device_id,
        action: body.action,
        result: body.result,
        reason: body.reason,
    };

    let stored = state.abuse_counter.record_attempt(attempt).await?;
    let created = AttemptCreated {
        id: stored.id,
        action: stored.action,
        result: stored.result,
        created_at: stored.created_at,
    };

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": created,
    })))
}

/// GET /api/registration/attempts/{id}
pub async fn get_attempt(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let attempt = state
        .attempt_log
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Registration attempt not found".into()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": attempt,
    })))
}

/// GET /api/registration/attempts/email/{email}
pub async fn get_attempts_by_email(
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let email = path.into_inner();
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(AppError::ValidationError(format!(
            "limit must be between 1 and {}",
            MAX_HISTORY_LIMIT
        )));
    }

    let attempts = state.attempt_log.find_by_email(&email, limit).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": attempts.len(),
        "data": attempts,
    })))
}

/// POST /api/registration/rate-limit/check
pub async fn check_rate_limit(
    req: HttpRequest,
    body: web::Json<RateLimitCheckRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let minutes = requested_window(body.minutes)?;
    let key = IdentityKey::new(
        body.email,
        body.phone,
        client_ip(&req, state.config.server.trust_forwarded),
    );

    let status = state.abuse_counter.check_rate_limit(&key, minutes).await?;
    info!(
        failed_attempts = status.failed_attempts,
        is_limited = status.is_limited,
        "Registration rate check completed"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": status,
    })))
}
