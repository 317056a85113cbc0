use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::db::models::NewDevice;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceRequest {
    pub id: Option<Uuid>,
    pub customer_id: Uuid,
    pub device_name: Option<String>,
    pub device_type: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub device_fingerprint: Option<String>,
    pub ip: Option<String>,
    pub is_active: Option<bool>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<CreateDeviceRequest> for NewDevice {
    fn from(body: CreateDeviceRequest) -> Self {
        Self {
            id: body.id.unwrap_or_else(Uuid::new_v4),
            customer_id: body.customer_id,
            device_name: body.device_name,
            device_type: body.device_type,
            os: body.os,
            os_version: body.os_version,
            device_fingerprint: body.device_fingerprint,
            ip: body.ip,
            is_active: body.is_active.unwrap_or(true),
            last_used_at: body.last_used_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCreated {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub device_name: Option<String>,
    pub device_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// POST /api/device/create
pub async fn create_device(
    body: web::Json<CreateDeviceRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let device = state.devices.create_device(body.into_inner().into()).await?;
    info!(device_id = %device.id, customer_id = %device.customer_id, "Device registered");

    let created = DeviceCreated {
        id: device.id,
        customer_id: device.customer_id,
        device_name: device.device_name,
        device_type: device.device_type,
        created_at: device.created_at,
    };

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": created,
    })))
}
