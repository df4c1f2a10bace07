use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::order::{OrderStatus, PaymentStatus};
use crate::errors::ServiceError;
use crate::repositories::OrderFilters;
use crate::services::orders::{CreateOrderRequest, UpdateOrderRequest};
use crate::{ApiResponse, AppState};

use super::tenant_id;

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

fn default_page() -> u64 {
    1
}
fn default_per_page() -> u64 {
    20
}

#[derive(Debug, Deserialize, Default)]
pub struct CancelOrderBody {
    pub reason: Option<String>,
}

pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_id(&headers)?;
    let priced = state.services.orders.create_order(tenant, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(priced))))
}

pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_id(&headers)?;
    let detail = state.services.orders.get_order(order_id, tenant).await?;
    Ok(Json(ApiResponse::success(detail)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListOrdersQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_id(&headers)?;
    let filters = OrderFilters {
        status: query.status,
        payment_status: query.payment_status,
    };
    let list = state
        .services
        .orders
        .list_orders(tenant, filters, query.page, query.per_page)
        .await?;
    Ok(Json(ApiResponse::success(list)))
}

pub async fn update_order_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_id(&headers)?;
    let priced = state
        .services
        .orders
        .update_order(order_id, tenant, request)
        .await?;
    Ok(Json(ApiResponse::success(priced)))
}

pub async fn confirm_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_id(&headers)?;
    let order = state.services.orders.confirm_order(order_id, tenant).await?;
    Ok(Json(ApiResponse::success(order)))
}

pub async fn complete_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_id(&headers)?;
    let order = state
        .services
        .orders
        .complete_order(order_id, tenant)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
    body: Option<Json<CancelOrderBody>>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_id(&headers)?;
    let reason = body.and_then(|Json(b)| b.reason);
    let order = state
        .services
        .orders
        .cancel_order(order_id, tenant, reason)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}
