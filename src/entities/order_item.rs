use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kitchen workflow status of a single line, independent of the parent
/// order's lifecycle status.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderItemStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "preparing")]
    Preparing,
    #[sea_orm(string_value = "ready")]
    Ready,
    #[sea_orm(string_value = "delivered")]
    Delivered,
}

/// A price-affecting choice attached to an item. Options may carry nested
/// sub-groups for multi-level modifiers (e.g. combo -> drink -> size); the
/// tree is finite-depth and validated at input time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub group_id: Uuid,
    pub option_id: Uuid,
    pub option_name: String,
    /// May be negative (e.g. "Small" = -15000).
    pub price_delta: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_groups: Vec<SelectedOptionGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOptionGroup {
    pub group_id: Uuid,
    pub group_name: Option<String>,
    #[serde(default)]
    pub options: Vec<SelectedOption>,
}

/// JSON column wrapper for the option tree of one line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SelectedOptions(pub Vec<SelectedOption>);

/// The `order_items` table. Rows are owned exclusively by one order and are
/// replaced wholesale on every order update; there is no partial patching.
/// `product_name` and prices are snapshots, decoupled from later catalog
/// edits.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,

    pub product_id: Uuid,
    pub product_name: String,
    pub base_price: Decimal,

    // One variant per line; further choices go through the option tree.
    pub variant_id: Option<Uuid>,
    pub variant_name: Option<String>,
    pub variant_price_delta: Decimal,

    #[sea_orm(column_type = "Json")]
    pub selected_options: SelectedOptions,

    pub quantity: i32,
    /// `(base_price + variant_price_delta + option deltas) * quantity`.
    pub item_subtotal: Decimal,

    pub notes: Option<String>,
    pub status: OrderItemStatus,

    /// Insertion order doubles as display order.
    pub position: i32,

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
