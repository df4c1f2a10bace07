//! Shared harness: in-memory SQLite with the schema built straight from
//! the entities, plus seed helpers.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema, Set,
};
use uuid::Uuid;

use tillpoint::entities::{kitchen_ticket, order, order_item, order_payment, tenant};
use tillpoint::ids::SequenceIds;
use tillpoint::pricing::LineItemInput;
use tillpoint::services::AppServices;

pub struct TestEnv {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
}

impl TestEnv {
    /// Fresh database and services. A single pooled connection keeps the
    /// in-memory database alive and shared across all operations.
    pub async fn new() -> Self {
        let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
        opts.max_connections(1).min_connections(1);
        let db = Database::connect(opts).await.expect("sqlite connect");

        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let statements = [
            schema.create_table_from_entity(tenant::Entity),
            schema.create_table_from_entity(order::Entity),
            schema.create_table_from_entity(order_item::Entity),
            schema.create_table_from_entity(order_payment::Entity),
            schema.create_table_from_entity(kitchen_ticket::Entity),
        ];
        for stmt in statements {
            db.execute(backend.build(&stmt)).await.expect("create table");
        }

        let db = Arc::new(db);
        let services = AppServices::new(db.clone(), Arc::new(SequenceIds::default()), None);
        Self { db, services }
    }

    /// Seeds an active tenant with 10% tax, 5% service charge and the
    /// kitchen workflow enabled.
    pub async fn seed_tenant(&self) -> tenant::Model {
        self.seed_tenant_with(true, true).await
    }

    pub async fn seed_tenant_with(&self, is_active: bool, kitchen_enabled: bool) -> tenant::Model {
        tenant::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Warung Tegal".to_string()),
            is_active: Set(is_active),
            default_tax_rate: Set(dec!(0.1)),
            default_service_charge_rate: Set(dec!(0.05)),
            kitchen_enabled: Set(kitchen_enabled),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.db.as_ref())
        .await
        .expect("seed tenant")
    }
}

/// A plain line with no variant and no options.
pub fn line_item(name: &str, base_price: Decimal, quantity: i32) -> LineItemInput {
    LineItemInput {
        product_id: Uuid::new_v4(),
        product_name: name.to_string(),
        base_price,
        variant_id: None,
        variant_name: None,
        variant_price_delta: Decimal::ZERO,
        selected_options: vec![],
        quantity,
        notes: None,
    }
}

/// The worked receipt from the pricing engine docs: one line of
/// base 45000 + 10000 option, qty 2 -> total 126500 at 10% + 5%.
pub fn receipt_line() -> LineItemInput {
    let mut item = line_item("Nasi Goreng Spesial", dec!(45000), 2);
    item.selected_options = vec![order_item::SelectedOption {
        group_id: Uuid::new_v4(),
        option_id: Uuid::new_v4(),
        option_name: "Extra Telur".to_string(),
        price_delta: dec!(10000),
        child_groups: vec![],
    }];
    item
}
