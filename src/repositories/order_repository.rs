use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entities::order::{self, Column, Entity as Order, OrderStatus, PaymentStatus};
use crate::entities::order_item::{self, Entity as OrderItem};
use crate::errors::ServiceError;

/// Tenant-scoped query filters for order listings.
#[derive(Clone, Debug, Default)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// Tenant-scoped read access to the order aggregate.
///
/// Every query here carries an explicit `tenant_id`; the repository never
/// infers tenant scope. Writes stay in the services, inside their own
/// transactions.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: Arc<DatabaseConnection>,
}

impl OrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an order by id within a tenant. An order that exists under a
    /// different tenant is reported as a tenant mismatch, which the HTTP
    /// layer renders as not-found.
    pub async fn find_by_id(
        &self,
        order_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        Self::find_scoped(self.db.as_ref(), order_id, tenant_id).await
    }

    /// Same scoping rules as [`find_by_id`], usable inside a transaction.
    pub async fn find_scoped<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        let order = Order::find_by_id(order_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if order.tenant_id != tenant_id {
            return Err(ServiceError::TenantMismatch {
                order_id,
                tenant_id,
            });
        }
        Ok(order)
    }

    /// Loads an order with `SELECT ... FOR UPDATE` so concurrent status or
    /// payment mutations serialize on the row. Must run inside a
    /// transaction to be meaningful.
    pub async fn find_for_update<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        let order = Order::find_by_id(order_id)
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if order.tenant_id != tenant_id {
            return Err(ServiceError::TenantMismatch {
                order_id,
                tenant_id,
            });
        }
        Ok(order)
    }

    /// Items of one order, in display order.
    pub async fn find_items<C: ConnectionTrait>(
        conn: &C,
        order_id: Uuid,
    ) -> Result<Vec<order_item::Model>, ServiceError> {
        Ok(OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::Position)
            .all(conn)
            .await?)
    }

    /// Paginated tenant listing with optional status filters, newest first.
    pub async fn find_by_tenant(
        &self,
        tenant_id: Uuid,
        filters: &OrderFilters,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<order::Model>, u64), ServiceError> {
        let mut query = Order::find()
            .filter(Column::TenantId.eq(tenant_id))
            .order_by_desc(Column::CreatedAt);

        if let Some(status) = filters.status {
            query = query.filter(Column::Status.eq(status));
        }
        if let Some(payment_status) = filters.payment_status {
            query = query.filter(Column::PaymentStatus.eq(payment_status));
        }

        let paginator = query.paginate(self.db.as_ref(), per_page.max(1));
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((orders, total))
    }

    /// Next date-prefixed order number for a tenant, e.g. `ORD-20260825-0007`.
    ///
    /// Counts inside the caller's creation transaction; uniqueness only
    /// needs to hold per tenant, the sequence does not need to be gapless.
    pub async fn generate_order_number<C: ConnectionTrait>(
        conn: &C,
        tenant_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<String, ServiceError> {
        let day_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| ServiceError::InternalError("invalid day boundary".into()))?;

        let today_count = Order::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::CreatedAt.gte(day_start))
            .count(conn)
            .await?;

        Ok(format!(
            "ORD-{}-{:04}",
            now.format("%Y%m%d"),
            today_count + 1
        ))
    }
}
