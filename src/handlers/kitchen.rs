use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::order_item::OrderItemStatus;
use crate::errors::ServiceError;
use crate::{ApiResponse, AppState};

use super::tenant_id;

#[derive(Debug, Deserialize, Default)]
pub struct CreateTicketBody {
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemStatusBody {
    pub status: OrderItemStatus,
}

pub async fn create_ticket(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
    body: Option<Json<CreateTicketBody>>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_id(&headers)?;
    let priority = body.map(|Json(b)| b.priority).unwrap_or_default();
    let ticket = state
        .services
        .kitchen
        .create_ticket(order_id, tenant, priority)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(ticket))))
}

pub async fn update_item_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((order_id, item_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateItemStatusBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenant_id(&headers)?;
    let item = state
        .services
        .kitchen
        .update_item_status(order_id, tenant, item_id, body.status)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}
