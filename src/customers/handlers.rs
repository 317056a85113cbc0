use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::error::AppError;

const DEFAULT_PAGE_LIMIT: i64 = 10;
const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/customers
pub async fn list_customers(
    query: web::Query<ListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(AppError::ValidationError(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_LIMIT
        )));
    }
    let offset = query.offset.unwrap_or(0);
    if offset < 0 {
        return Err(AppError::ValidationError("offset must not be negative".into()));
    }

    let (customers, total) = tokio::try_join!(
        state.customer_directory.list_customers(limit, offset),
        state.customer_directory.count_customers(),
    )?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": customers,
        "total": total,
    })))
}

/// GET /api/customers/{id}
pub async fn get_customer(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let customer = state
        .customer_lookup
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer not found".into()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": customer,
    })))
}
