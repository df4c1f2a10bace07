use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The `tenants` table. One row per isolated business; every other
/// aggregate in the system is scoped to exactly one of these.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    /// Deactivated tenants keep their data but reject all order operations.
    pub is_active: bool,

    /// Default tax rate applied when a caller does not supply one.
    pub default_tax_rate: Decimal,

    /// Default service-charge rate applied when a caller does not supply one.
    pub default_service_charge_rate: Decimal,

    /// Feature flag: kitchen ticket workflow.
    pub kitchen_enabled: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
