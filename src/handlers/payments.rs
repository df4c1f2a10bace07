use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::payments::RecordPaymentRequest;
use crate::{ApiResponse, AppState};

use super::tenant_id;

pub async fn record_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_id(&headers)?;
    let recorded = state
        .services
        .payments
        .record_payment(order_id, tenant, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(recorded))))
}

pub async fn list_payments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_id(&headers)?;
    let payments = state
        .services
        .payments
        .list_payments(order_id, tenant)
        .await?;
    Ok(Json(ApiResponse::success(payments)))
}
