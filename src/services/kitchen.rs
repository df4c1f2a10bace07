use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::kitchen_ticket::{
    self, ActiveModel as TicketActiveModel, Entity as KitchenTicket, TicketLine, TicketLines,
};
use crate::entities::order::OrderStatus;
use crate::entities::order_item::{
    self, ActiveModel as OrderItemActiveModel, Entity as OrderItem, OrderItemStatus,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::ids::IdGenerator;
use crate::repositories::OrderRepository;
use crate::services::tenants;

/// Derives preparation tickets from an order's pending items and advances
/// the per-item kitchen workflow. Tickets never mutate order status or
/// pricing.
pub struct KitchenTicketService {
    db: Arc<DbPool>,
    ids: Arc<dyn IdGenerator>,
    event_sender: Option<Arc<EventSender>>,
}

impl KitchenTicketService {
    pub fn new(
        db: Arc<DbPool>,
        ids: Arc<dyn IdGenerator>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db,
            ids,
            event_sender,
        }
    }

    /// Creates a ticket covering the order's preparable items (pending or
    /// preparing). Rejected when the kitchen workflow is disabled for the
    /// tenant, the order is cancelled, or nothing is left to prepare.
    #[instrument(skip(self), fields(order_id = %order_id, tenant_id = %tenant_id))]
    pub async fn create_ticket(
        &self,
        order_id: Uuid,
        tenant_id: Uuid,
        priority: i32,
    ) -> Result<kitchen_ticket::Model, ServiceError> {
        let txn = self.db.begin().await?;

        // The tenant row lock serializes same-day ticket numbering.
        let tenant = tenants::find_active_for_update(&txn, tenant_id).await?;
        if !tenant.kitchen_enabled {
            return Err(ServiceError::InvalidState(format!(
                "kitchen workflow is not enabled for tenant {}",
                tenant_id
            )));
        }

        let order = OrderRepository::find_scoped(&txn, order_id, tenant_id).await?;
        if order.status == OrderStatus::Cancelled {
            return Err(ServiceError::InvalidState(
                "cannot create a kitchen ticket for a cancelled order".into(),
            ));
        }

        let items = OrderRepository::find_items(&txn, order_id).await?;
        if items.is_empty() {
            return Err(ServiceError::InvalidState(
                "order has no items to prepare".into(),
            ));
        }

        let lines: Vec<TicketLine> = items
            .iter()
            .filter(|item| {
                matches!(
                    item.status,
                    OrderItemStatus::Pending | OrderItemStatus::Preparing
                )
            })
            .map(|item| TicketLine {
                order_item_id: item.id,
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                notes: item.notes.clone(),
                status: item.status,
            })
            .collect();

        if lines.is_empty() {
            return Err(ServiceError::InvalidState(
                "all items are already prepared; nothing to put on a ticket".into(),
            ));
        }

        let now = Utc::now();
        let ticket_number = generate_ticket_number(&txn, tenant_id, now).await?;

        let ticket = TicketActiveModel {
            id: Set(self.ids.new_id()),
            tenant_id: Set(tenant_id),
            order_id: Set(order_id),
            ticket_number: Set(ticket_number),
            priority: Set(priority),
            lines: Set(TicketLines(lines)),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        self.emit(Event::KitchenTicketCreated {
            ticket_id: ticket.id,
            order_id,
            tenant_id,
        })
        .await;

        Ok(ticket)
    }

    /// Advances one item through the kitchen workflow. Forward-only:
    /// pending -> preparing -> ready -> delivered, skipping ahead is fine,
    /// moving backwards is not. Independent of the order's own status.
    #[instrument(skip(self), fields(order_id = %order_id, tenant_id = %tenant_id, item_id = %item_id))]
    pub async fn update_item_status(
        &self,
        order_id: Uuid,
        tenant_id: Uuid,
        item_id: Uuid,
        new_status: OrderItemStatus,
    ) -> Result<order_item::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = OrderRepository::find_scoped(&txn, order_id, tenant_id).await?;
        if order.status == OrderStatus::Cancelled {
            return Err(ServiceError::InvalidState(
                "cannot update items of a cancelled order".into(),
            ));
        }

        let item = OrderItem::find_by_id(item_id)
            .filter(order_item::Column::OrderId.eq(order_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Item {} not found on order {}", item_id, order_id))
            })?;

        if workflow_rank(new_status) <= workflow_rank(item.status) {
            return Err(ServiceError::InvalidState(format!(
                "item status cannot move from '{}' to '{}'",
                item.status, new_status
            )));
        }

        let mut active: OrderItemActiveModel = item.into();
        active.status = Set(new_status);
        let item = active.update(&txn).await?;

        txn.commit().await?;
        Ok(item)
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send domain event");
            }
        }
    }
}

fn workflow_rank(status: OrderItemStatus) -> u8 {
    match status {
        OrderItemStatus::Pending => 0,
        OrderItemStatus::Preparing => 1,
        OrderItemStatus::Ready => 2,
        OrderItemStatus::Delivered => 3,
    }
}

/// Next per-tenant daily ticket number, e.g. `KT-20260825-003`.
async fn generate_ticket_number<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    now: DateTime<Utc>,
) -> Result<String, ServiceError> {
    let day_start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ServiceError::InternalError("invalid day boundary".into()))?;

    let today_count = KitchenTicket::find()
        .filter(kitchen_ticket::Column::TenantId.eq(tenant_id))
        .filter(kitchen_ticket::Column::CreatedAt.gte(day_start))
        .count(conn)
        .await?;

    Ok(format!("KT-{}-{:03}", now.format("%Y%m%d"), today_count + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_only_moves_forward() {
        assert!(workflow_rank(OrderItemStatus::Preparing) > workflow_rank(OrderItemStatus::Pending));
        assert!(workflow_rank(OrderItemStatus::Ready) > workflow_rank(OrderItemStatus::Preparing));
        assert!(workflow_rank(OrderItemStatus::Delivered) > workflow_rank(OrderItemStatus::Ready));
    }
}
