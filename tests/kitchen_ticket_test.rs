//! Kitchen ticket derivation and the per-item preparation workflow.

mod common;

use assert_matches::assert_matches;
use common::{line_item, receipt_line, TestEnv};
use rust_decimal_macros::dec;
use uuid::Uuid;

use tillpoint::entities::order_item::OrderItemStatus;
use tillpoint::errors::ServiceError;
use tillpoint::services::orders::CreateOrderRequest;

fn create_request(items: Vec<tillpoint::pricing::LineItemInput>) -> CreateOrderRequest {
    CreateOrderRequest {
        items,
        order_type_id: None,
        customer_name: None,
        table_number: Some("4".to_string()),
        notes: None,
        tax_rate: None,
        service_charge_rate: None,
        discounts: vec![],
    }
}

#[tokio::test]
async fn ticket_snapshots_preparable_items() {
    let env = TestEnv::new().await;
    let tenant = env.seed_tenant().await;

    let created = env
        .services
        .orders
        .create_order(
            tenant.id,
            create_request(vec![receipt_line(), line_item("Es Teh", dec!(8000), 2)]),
        )
        .await
        .unwrap();

    let ticket = env
        .services
        .kitchen
        .create_ticket(created.order.id, tenant.id, 0)
        .await
        .unwrap();

    assert!(ticket.ticket_number.starts_with("KT-"));
    assert_eq!(ticket.lines.0.len(), 2);
    assert!(ticket
        .lines
        .0
        .iter()
        .all(|l| l.status == OrderItemStatus::Pending));
}

#[tokio::test]
async fn daily_ticket_numbers_increment_per_tenant() {
    let env = TestEnv::new().await;
    let tenant = env.seed_tenant().await;

    let created = env
        .services
        .orders
        .create_order(tenant.id, create_request(vec![receipt_line()]))
        .await
        .unwrap();

    let first = env
        .services
        .kitchen
        .create_ticket(created.order.id, tenant.id, 0)
        .await
        .unwrap();
    let second = env
        .services
        .kitchen
        .create_ticket(created.order.id, tenant.id, 1)
        .await
        .unwrap();

    assert_ne!(first.ticket_number, second.ticket_number);
    assert!(first.ticket_number.ends_with("-001"));
    assert!(second.ticket_number.ends_with("-002"));
}

#[tokio::test]
async fn tickets_require_the_kitchen_feature_flag() {
    let env = TestEnv::new().await;
    let tenant = env.seed_tenant_with(true, false).await;

    let created = env
        .services
        .orders
        .create_order(tenant.id, create_request(vec![receipt_line()]))
        .await
        .unwrap();

    let err = env
        .services
        .kitchen
        .create_ticket(created.order.id, tenant.id, 0)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));
}

#[tokio::test]
async fn cancelled_orders_produce_no_tickets() {
    let env = TestEnv::new().await;
    let tenant = env.seed_tenant().await;

    let created = env
        .services
        .orders
        .create_order(tenant.id, create_request(vec![receipt_line()]))
        .await
        .unwrap();
    env.services
        .orders
        .cancel_order(created.order.id, tenant.id, None)
        .await
        .unwrap();

    let err = env
        .services
        .kitchen
        .create_ticket(created.order.id, tenant.id, 0)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));
}

#[tokio::test]
async fn fully_delivered_orders_have_nothing_to_ticket() {
    let env = TestEnv::new().await;
    let tenant = env.seed_tenant().await;

    let created = env
        .services
        .orders
        .create_order(tenant.id, create_request(vec![receipt_line()]))
        .await
        .unwrap();
    let item_id = created.items[0].id;

    // Skipping ahead in the workflow is allowed.
    env.services
        .kitchen
        .update_item_status(created.order.id, tenant.id, item_id, OrderItemStatus::Delivered)
        .await
        .unwrap();

    let err = env
        .services
        .kitchen
        .create_ticket(created.order.id, tenant.id, 0)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));
}

#[tokio::test]
async fn item_workflow_is_forward_only() {
    let env = TestEnv::new().await;
    let tenant = env.seed_tenant().await;

    let created = env
        .services
        .orders
        .create_order(tenant.id, create_request(vec![receipt_line()]))
        .await
        .unwrap();
    let item_id = created.items[0].id;
    let order_id = created.order.id;

    let item = env
        .services
        .kitchen
        .update_item_status(order_id, tenant.id, item_id, OrderItemStatus::Preparing)
        .await
        .unwrap();
    assert_eq!(item.status, OrderItemStatus::Preparing);

    let err = env
        .services
        .kitchen
        .update_item_status(order_id, tenant.id, item_id, OrderItemStatus::Pending)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));
}

#[tokio::test]
async fn item_workflow_is_tenant_scoped() {
    let env = TestEnv::new().await;
    let tenant = env.seed_tenant().await;
    let other = env.seed_tenant().await;

    let created = env
        .services
        .orders
        .create_order(tenant.id, create_request(vec![receipt_line()]))
        .await
        .unwrap();

    let err = env
        .services
        .kitchen
        .update_item_status(
            created.order.id,
            other.id,
            created.items[0].id,
            OrderItemStatus::Preparing,
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);

    let err = env
        .services
        .kitchen
        .create_ticket(created.order.id, Uuid::new_v4(), 0)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
}
