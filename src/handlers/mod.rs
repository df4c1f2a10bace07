//! Thin HTTP adapters over the order core. Routing and header plumbing
//! only; all rules live in the services.

pub mod kitchen;
pub mod orders;
pub mod payments;

use axum::{
    http::HeaderMap,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::{errors::ServiceError, AppState};

/// Header carrying the authenticated tenant, set by the tenant-resolution
/// middleware in front of this service.
const TENANT_HEADER: &str = "x-tenant-id";

pub(crate) fn tenant_id(headers: &HeaderMap) -> Result<Uuid, ServiceError> {
    headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| {
            ServiceError::InvalidInput("missing or invalid X-Tenant-Id header".into())
        })
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/v1/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route("/api/v1/orders/:id", get(orders::get_order))
        .route("/api/v1/orders/:id/items", put(orders::update_order_items))
        .route("/api/v1/orders/:id/confirm", post(orders::confirm_order))
        .route("/api/v1/orders/:id/complete", post(orders::complete_order))
        .route("/api/v1/orders/:id/cancel", post(orders::cancel_order))
        .route(
            "/api/v1/orders/:id/payments",
            post(payments::record_payment).get(payments::list_payments),
        )
        .route(
            "/api/v1/orders/:id/kitchen-tickets",
            post(kitchen::create_ticket),
        )
        .route(
            "/api/v1/orders/:id/items/:item_id/status",
            post(kitchen::update_item_status),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
