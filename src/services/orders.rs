use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::order::{
    self, ActiveModel as OrderActiveModel, OrderStatus, PaymentStatus,
};
use crate::entities::order_item::{
    self, ActiveModel as OrderItemActiveModel, Entity as OrderItem, OrderItemStatus,
    SelectedOptions,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::ids::IdGenerator;
use crate::pricing::{self, AppliedDiscount, LineItemInput, PriceCalculation};
use crate::repositories::{OrderFilters, OrderRepository};
use crate::services::tenants;
use crate::state_machine;

/// Request to create a new order. Items are caller-resolved snapshots;
/// rates fall back to the tenant's configured defaults.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<LineItemInput>,
    pub order_type_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub table_number: Option<String>,
    pub notes: Option<String>,
    pub tax_rate: Option<Decimal>,
    pub service_charge_rate: Option<Decimal>,
    #[serde(default)]
    pub discounts: Vec<AppliedDiscount>,
}

/// Request to replace an order's item set. Whole-cart semantics: the old
/// item rows are discarded and the new set is priced from scratch.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<LineItemInput>,
    pub customer_name: Option<String>,
    pub table_number: Option<String>,
    pub notes: Option<String>,
    pub tax_rate: Option<Decimal>,
    pub service_charge_rate: Option<Decimal>,
    #[serde(default)]
    pub discounts: Vec<AppliedDiscount>,
}

/// An order with its items and, for create/update, the breakdown the
/// pricing engine produced for it.
#[derive(Debug, Clone, Serialize)]
pub struct PricedOrder {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
    pub pricing: PriceCalculation,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<order::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Orchestrates order creation, item replacement and the confirm /
/// complete / cancel transitions. The database is the only shared state;
/// every mutation re-reads the order under a row lock inside its own
/// transaction.
pub struct OrderLifecycleService {
    db: Arc<DbPool>,
    repo: OrderRepository,
    ids: Arc<dyn IdGenerator>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderLifecycleService {
    pub fn new(
        db: Arc<DbPool>,
        ids: Arc<dyn IdGenerator>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        let repo = OrderRepository::new(db.clone());
        Self {
            db,
            repo,
            ids,
            event_sender,
        }
    }

    /// Creates a draft order with a full price breakdown. The order row and
    /// all item rows are inserted in one transaction.
    #[instrument(skip(self, request), fields(tenant_id = %tenant_id, item_count = request.items.len()))]
    pub async fn create_order(
        &self,
        tenant_id: Uuid,
        request: CreateOrderRequest,
    ) -> Result<PricedOrder, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        pricing::validate_items(&request.items)?;

        let txn = self.db.begin().await?;

        // The tenant row lock serializes same-day order numbering.
        let tenant = tenants::find_active_for_update(&txn, tenant_id).await?;
        let tax_rate = resolve_rate("tax_rate", request.tax_rate, tenant.default_tax_rate)?;
        let service_charge_rate = resolve_rate(
            "service_charge_rate",
            request.service_charge_rate,
            tenant.default_service_charge_rate,
        )?;

        let calc = pricing::calculate(
            &request.items,
            tax_rate,
            service_charge_rate,
            &request.discounts,
        );

        let now = Utc::now();
        let order_id = self.ids.new_id();
        let order_number = OrderRepository::generate_order_number(&txn, tenant_id, now).await?;

        let order = OrderActiveModel {
            id: Set(order_id),
            tenant_id: Set(tenant_id),
            order_number: Set(order_number),
            status: Set(OrderStatus::Draft),
            subtotal: Set(calc.subtotal),
            discount_amount: Set(calc.total_discount),
            tax_rate: Set(calc.tax_rate),
            tax_amount: Set(calc.tax_amount),
            service_charge_rate: Set(calc.service_charge_rate),
            service_charge_amount: Set(calc.service_charge_amount),
            total_amount: Set(calc.total_amount),
            paid_amount: Set(Decimal::ZERO),
            payment_status: Set(PaymentStatus::Unpaid),
            order_type_id: Set(request.order_type_id),
            customer_name: Set(request.customer_name),
            table_number: Set(request.table_number),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            completed_at: Set(None),
        }
        .insert(&txn)
        .await?;

        let item_models = self.build_item_rows(order.id, &request.items, &calc);
        OrderItem::insert_many(item_models).exec(&txn).await?;
        let items = OrderRepository::find_items(&txn, order.id).await?;

        txn.commit().await?;

        self.emit(Event::OrderCreated {
            order_id: order.id,
            tenant_id,
        })
        .await;

        Ok(PricedOrder {
            order,
            items,
            pricing: calc,
        })
    }

    /// Replaces the entire item set and reprices the order. Partial item
    /// patching is deliberately unsupported; every update is "save the
    /// current cart state". Terminal orders reject edits, and the payment
    /// status is re-derived against the new total so a repriced order can
    /// never complete underpaid.
    #[instrument(skip(self, request), fields(order_id = %order_id, tenant_id = %tenant_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        tenant_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<PricedOrder, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        pricing::validate_items(&request.items)?;

        let txn = self.db.begin().await?;

        tenants::find_active(&txn, tenant_id).await?;
        let order = OrderRepository::find_for_update(&txn, order_id, tenant_id).await?;

        if state_machine::is_terminal(order.status) {
            return Err(ServiceError::InvalidState(format!(
                "cannot modify items of a '{}' order",
                order.status
            )));
        }

        // Unspecified rates keep the order's current ones, so editing the
        // cart never silently re-rates an in-flight order.
        let tax_rate = resolve_rate("tax_rate", request.tax_rate, order.tax_rate)?;
        let service_charge_rate = resolve_rate(
            "service_charge_rate",
            request.service_charge_rate,
            order.service_charge_rate,
        )?;

        let calc = pricing::calculate(
            &request.items,
            tax_rate,
            service_charge_rate,
            &request.discounts,
        );

        // The ledger is append-only, so an update can never shrink the total
        // below what was already taken; refund-then-cancel is the way out.
        if calc.total_amount < order.paid_amount {
            return Err(ServiceError::InvalidState(format!(
                "new total {} is below the {} already paid; cancel and refund instead",
                calc.total_amount, order.paid_amount
            )));
        }
        let payment_status = if order.paid_amount == Decimal::ZERO {
            PaymentStatus::Unpaid
        } else if order.paid_amount == calc.total_amount {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        };

        // Whole-set replacement: old rows out, new rows in, totals updated,
        // all in this one transaction.
        OrderItem::delete_many()
            .filter(order_item::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        let item_models = self.build_item_rows(order_id, &request.items, &calc);
        OrderItem::insert_many(item_models).exec(&txn).await?;

        let mut active: OrderActiveModel = order.into();
        active.subtotal = Set(calc.subtotal);
        active.discount_amount = Set(calc.total_discount);
        active.tax_rate = Set(calc.tax_rate);
        active.tax_amount = Set(calc.tax_amount);
        active.service_charge_rate = Set(calc.service_charge_rate);
        active.service_charge_amount = Set(calc.service_charge_amount);
        active.total_amount = Set(calc.total_amount);
        active.payment_status = Set(payment_status);
        if let Some(customer_name) = request.customer_name {
            active.customer_name = Set(Some(customer_name));
        }
        if let Some(table_number) = request.table_number {
            active.table_number = Set(Some(table_number));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));
        let order = active.update(&txn).await?;

        let items = OrderRepository::find_items(&txn, order_id).await?;
        txn.commit().await?;

        self.emit(Event::OrderUpdated {
            order_id,
            tenant_id,
        })
        .await;

        Ok(PricedOrder {
            order,
            items,
            pricing: calc,
        })
    }

    /// Confirms a draft order with at least one item.
    #[instrument(skip(self), fields(order_id = %order_id, tenant_id = %tenant_id))]
    pub async fn confirm_order(
        &self,
        order_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = OrderRepository::find_for_update(&txn, order_id, tenant_id).await?;
        let item_count = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .count(&txn)
            .await?;

        state_machine::can_confirm(order.status, item_count as usize)?;
        state_machine::assert_transition(order.status, OrderStatus::Confirmed)?;

        let mut active: OrderActiveModel = order.into();
        active.status = Set(OrderStatus::Confirmed);
        active.updated_at = Set(Some(Utc::now()));
        let order = active.update(&txn).await?;

        txn.commit().await?;

        self.emit(Event::OrderConfirmed {
            order_id,
            tenant_id,
        })
        .await;

        Ok(order)
    }

    /// Completes a confirmed, fully paid order and stamps `completed_at`.
    #[instrument(skip(self), fields(order_id = %order_id, tenant_id = %tenant_id))]
    pub async fn complete_order(
        &self,
        order_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = OrderRepository::find_for_update(&txn, order_id, tenant_id).await?;

        state_machine::can_complete(order.status, order.payment_status, order.total_amount)?;
        state_machine::assert_transition(order.status, OrderStatus::Completed)?;

        let now = Utc::now();
        let mut active: OrderActiveModel = order.into();
        active.status = Set(OrderStatus::Completed);
        active.completed_at = Set(Some(now));
        active.updated_at = Set(Some(now));
        let order = active.update(&txn).await?;

        txn.commit().await?;

        self.emit(Event::OrderCompleted {
            order_id,
            tenant_id,
            completed_at: now,
        })
        .await;

        Ok(order)
    }

    /// Cancels any non-terminal order. When money has already been taken, a
    /// structured refund warning is appended to the order notes so staff can
    /// settle up; the ledger itself is never rewritten.
    #[instrument(skip(self, reason), fields(order_id = %order_id, tenant_id = %tenant_id))]
    pub async fn cancel_order(
        &self,
        order_id: Uuid,
        tenant_id: Uuid,
        reason: Option<String>,
    ) -> Result<order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = OrderRepository::find_for_update(&txn, order_id, tenant_id).await?;

        state_machine::can_cancel(order.status)?;
        state_machine::assert_transition(order.status, OrderStatus::Cancelled)?;

        let refund_owed = order.paid_amount > Decimal::ZERO;
        let mut annotations = Vec::new();
        if refund_owed {
            annotations.push(format!(
                "[refund due] order cancelled with paid amount {}; a refund may be owed",
                order.paid_amount
            ));
        }
        if let Some(reason) = reason.as_deref().filter(|r| !r.trim().is_empty()) {
            annotations.push(format!("[cancellation reason] {}", reason.trim()));
        }
        let notes = match (&order.notes, annotations.is_empty()) {
            (_, true) => order.notes.clone(),
            (Some(existing), false) => Some(format!("{}\n{}", existing, annotations.join("\n"))),
            (None, false) => Some(annotations.join("\n")),
        };

        let mut active: OrderActiveModel = order.into();
        active.status = Set(OrderStatus::Cancelled);
        active.notes = Set(notes);
        active.updated_at = Set(Some(Utc::now()));
        let order = active.update(&txn).await?;

        txn.commit().await?;

        self.emit(Event::OrderCancelled {
            order_id,
            tenant_id,
            refund_owed,
        })
        .await;

        Ok(order)
    }

    /// Loads an order and its items, tenant-scoped.
    #[instrument(skip(self), fields(order_id = %order_id, tenant_id = %tenant_id))]
    pub async fn get_order(
        &self,
        order_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<OrderDetail, ServiceError> {
        let order = self.repo.find_by_id(order_id, tenant_id).await?;
        let items = OrderRepository::find_items(self.db.as_ref(), order_id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Paginated tenant listing, newest first.
    #[instrument(skip(self, filters), fields(tenant_id = %tenant_id))]
    pub async fn list_orders(
        &self,
        tenant_id: Uuid,
        filters: OrderFilters,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let (orders, total) = self
            .repo
            .find_by_tenant(tenant_id, &filters, page, per_page)
            .await?;
        Ok(OrderListResponse {
            orders,
            total,
            page,
            per_page,
        })
    }

    fn build_item_rows(
        &self,
        order_id: Uuid,
        inputs: &[LineItemInput],
        calc: &PriceCalculation,
    ) -> Vec<OrderItemActiveModel> {
        let now = Utc::now();
        inputs
            .iter()
            .zip(calc.items.iter())
            .enumerate()
            .map(|(position, (input, priced))| OrderItemActiveModel {
                id: Set(self.ids.new_id()),
                order_id: Set(order_id),
                product_id: Set(input.product_id),
                product_name: Set(input.product_name.clone()),
                base_price: Set(input.base_price),
                variant_id: Set(input.variant_id),
                variant_name: Set(input.variant_name.clone()),
                variant_price_delta: Set(input.variant_price_delta),
                selected_options: Set(SelectedOptions(input.selected_options.clone())),
                quantity: Set(input.quantity),
                item_subtotal: Set(priced.item_subtotal),
                notes: Set(input.notes.clone()),
                status: Set(OrderItemStatus::Pending),
                position: Set(position as i32),
                created_at: Set(now),
            })
            .collect()
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send domain event");
            }
        }
    }
}

fn resolve_rate(
    field: &str,
    requested: Option<Decimal>,
    fallback: Decimal,
) -> Result<Decimal, ServiceError> {
    let rate = requested.unwrap_or(fallback);
    if rate < Decimal::ZERO {
        return Err(ServiceError::InvalidInput(format!(
            "{} must not be negative, got {}",
            field, rate
        )));
    }
    Ok(rate)
}
