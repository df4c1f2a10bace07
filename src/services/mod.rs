pub mod kitchen;
pub mod orders;
pub mod payments;
pub mod tenants;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::ids::IdGenerator;

/// All order-core services, constructed once and shared by the handlers.
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<orders::OrderLifecycleService>,
    pub payments: Arc<payments::PaymentLedgerService>,
    pub kitchen: Arc<kitchen::KitchenTicketService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DbPool>,
        ids: Arc<dyn IdGenerator>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            orders: Arc::new(orders::OrderLifecycleService::new(
                db.clone(),
                ids.clone(),
                event_sender.clone(),
            )),
            payments: Arc::new(payments::PaymentLedgerService::new(
                db.clone(),
                ids.clone(),
                event_sender.clone(),
            )),
            kitchen: Arc::new(kitchen::KitchenTicketService::new(db, ids, event_sender)),
        }
    }
}
