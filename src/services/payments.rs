use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::order::{self, ActiveModel as OrderActiveModel, OrderStatus, PaymentStatus};
use crate::entities::order_payment::{
    self, ActiveModel as PaymentActiveModel, Entity as OrderPayment, PaymentMethod,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::ids::IdGenerator;
use crate::repositories::OrderRepository;

#[derive(Debug, Clone, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub transaction_ref: Option<String>,
    pub notes: Option<String>,
}

/// Result of recording one payment: the ledger row, the re-derived order,
/// and what is still outstanding.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRecorded {
    pub payment: order_payment::Model,
    pub order: order::Model,
    pub remaining_amount: Decimal,
}

/// The money-correctness core. Payments are append-only; `paid_amount` on
/// the order is a strict running sum, updated in the same transaction as
/// the ledger insert, with the order row locked so two concurrent payments
/// can never both read the same remaining balance.
pub struct PaymentLedgerService {
    db: Arc<DbPool>,
    ids: Arc<dyn IdGenerator>,
    event_sender: Option<Arc<EventSender>>,
}

impl PaymentLedgerService {
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

    /// Records a payment against an order. At most the current remaining
    /// balance can be paid in one call; overpayment is rejected before any
    /// write happens.
    #[instrument(skip(self, request), fields(order_id = %order_id, tenant_id = %tenant_id, amount = %request.amount))]
    pub async fn record_payment(
        &self,
        order_id: Uuid,
        tenant_id: Uuid,
        request: RecordPaymentRequest,
    ) -> Result<PaymentRecorded, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(format!(
                "payment amount must be positive, got {}",
                request.amount
            )));
        }

        let txn = self.db.begin().await?;

        let order = OrderRepository::find_for_update(&txn, order_id, tenant_id).await?;

        if order.status == OrderStatus::Cancelled {
            return Err(ServiceError::InvalidState(
                "cannot record a payment against a cancelled order".into(),
            ));
        }

        let remaining = order.total_amount - order.paid_amount;
        if request.amount > remaining {
            return Err(ServiceError::InvalidInput(format!(
                "payment of {} exceeds remaining balance of {}",
                request.amount, remaining
            )));
        }

        let now = Utc::now();
        let payment = PaymentActiveModel {
            id: Set(self.ids.new_id()),
            order_id: Set(order_id),
            tenant_id: Set(tenant_id),
            amount: Set(request.amount),
            payment_method: Set(request.payment_method),
            transaction_ref: Set(request.transaction_ref),
            notes: Set(request.notes),
            paid_at: Set(now),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let new_paid = order.paid_amount + request.amount;
        // Exact Decimal equality: both sides come from the same fixed-point
        // representation, never binary floats.
        let payment_status = if new_paid == order.total_amount {
            PaymentStatus::Paid
        } else if new_paid > Decimal::ZERO {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        };

        // Drift check against the ledger itself; the running sum is
        // authoritative, a mismatch indicates a bug worth loud logging.
        let ledger_sum: Decimal = OrderPayment::find()
            .filter(order_payment::Column::OrderId.eq(order_id))
            .all(&txn)
            .await?
            .iter()
            .map(|p| p.amount)
            .sum();
        if ledger_sum != new_paid {
            warn!(
                %order_id,
                %ledger_sum,
                %new_paid,
                "payment ledger sum diverges from running paid_amount"
            );
        }

        let total_amount = order.total_amount;
        let mut active: OrderActiveModel = order.into();
        active.paid_amount = Set(new_paid);
        active.payment_status = Set(payment_status);
        active.updated_at = Set(Some(now));
        let order = active.update(&txn).await?;

        txn.commit().await?;

        let remaining_amount = total_amount - new_paid;
        self.emit(Event::PaymentRecorded {
            order_id,
            tenant_id,
            payment_id: payment.id,
            amount: payment.amount,
            remaining: remaining_amount,
        })
        .await;

        Ok(PaymentRecorded {
            payment,
            order,
            remaining_amount,
        })
    }

    /// The order's ledger rows, oldest first. Tenant-scoped like every
    /// other read.
    #[instrument(skip(self), fields(order_id = %order_id, tenant_id = %tenant_id))]
    pub async fn list_payments(
        &self,
        order_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Vec<order_payment::Model>, ServiceError> {
        OrderRepository::find_scoped(self.db.as_ref(), order_id, tenant_id).await?;

        Ok(OrderPayment::find()
            .filter(order_payment::Column::OrderId.eq(order_id))
            .order_by_asc(order_payment::Column::PaidAt)
            .all(self.db.as_ref())
            .await?)
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send domain event");
            }
        }
    }
}
