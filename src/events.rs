use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Domain events emitted after a state change commits. Delivery is
/// best-effort; a failed send is logged by the emitting service and never
/// fails the operation itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated {
        order_id: Uuid,
        tenant_id: Uuid,
    },
    OrderUpdated {
        order_id: Uuid,
        tenant_id: Uuid,
    },
    OrderConfirmed {
        order_id: Uuid,
        tenant_id: Uuid,
    },
    OrderCompleted {
        order_id: Uuid,
        tenant_id: Uuid,
        completed_at: DateTime<Utc>,
    },
    OrderCancelled {
        order_id: Uuid,
        tenant_id: Uuid,
        refund_owed: bool,
    },
    PaymentRecorded {
        order_id: Uuid,
        tenant_id: Uuid,
        payment_id: Uuid,
        amount: Decimal,
        remaining: Decimal,
    },
    KitchenTicketCreated {
        ticket_id: Uuid,
        order_id: Uuid,
        tenant_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel, logging each event. Downstream consumers
/// (printers, customer displays, sync) hang off this loop in deployments.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "domain event");
    }
}
