use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order_item::OrderItemStatus;

/// Snapshot of one preparable line at ticket-creation time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketLine {
    pub order_item_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub notes: Option<String>,
    pub status: OrderItemStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct TicketLines(pub Vec<TicketLine>);

/// The `kitchen_tickets` table: derived preparation instructions. Tickets
/// never feed back into order status or pricing.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kitchen_tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub order_id: Uuid,

    /// Unique per tenant per day.
    pub ticket_number: String,

    /// Higher prints first; 0 is normal service.
    pub priority: i32,

    #[sea_orm(column_type = "Json")]
    pub lines: TicketLines,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
