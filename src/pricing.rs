//! Pure pricing engine.
//!
//! Both order creation and order update call [`calculate`] with identical
//! semantics, so the two paths can never drift apart. Nothing here performs
//! I/O and every money value is a `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::order_item::{SelectedOption, SelectedOptionGroup};
use crate::errors::ServiceError;

/// Maximum nesting depth of the option tree accepted from callers.
pub const MAX_OPTION_DEPTH: usize = 3;

/// One requested line, as submitted by a caller. Prices are snapshots the
/// caller resolved from the catalog; the engine does not consult the catalog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineItemInput {
    pub product_id: Uuid,
    pub product_name: String,
    pub base_price: Decimal,
    pub variant_id: Option<Uuid>,
    pub variant_name: Option<String>,
    #[serde(default)]
    pub variant_price_delta: Decimal,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
    pub quantity: i32,
    pub notes: Option<String>,
}

/// A discount already resolved by the caller. The engine only sums
/// `amount_saved`; eligibility evaluation happens upstream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub discount_id: Option<Uuid>,
    pub name: String,
    pub amount_saved: Decimal,
}

/// Per-line slice of a [`PriceCalculation`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemPricing {
    pub product_id: Uuid,
    pub product_name: String,
    /// `base_price + variant_price_delta + option deltas`, unclamped.
    pub unit_price: Decimal,
    pub quantity: i32,
    pub item_subtotal: Decimal,
}

/// Full price breakdown. Ephemeral: returned to callers and copied onto the
/// order row, never persisted as its own aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceCalculation {
    pub items: Vec<ItemPricing>,
    pub subtotal: Decimal,
    pub total_discount: Decimal,
    pub subtotal_after_discount: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub service_charge_rate: Decimal,
    pub service_charge_amount: Decimal,
    pub total_amount: Decimal,
}

/// Sum of price deltas through the whole option tree of one line.
fn option_delta(options: &[SelectedOption]) -> Decimal {
    options
        .iter()
        .map(|opt| {
            opt.price_delta
                + opt
                    .child_groups
                    .iter()
                    .map(|group| option_delta(&group.options))
                    .sum::<Decimal>()
        })
        .sum()
}

fn group_depth(groups: &[SelectedOptionGroup]) -> usize {
    groups
        .iter()
        .flat_map(|g| g.options.iter())
        .map(|opt| 1 + group_depth(&opt.child_groups))
        .max()
        .unwrap_or(0)
}

/// Rejects structurally invalid line items before any pricing or
/// persistence happens. Shared by the create and update paths.
pub fn validate_items(items: &[LineItemInput]) -> Result<(), ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::InvalidInput(
            "order must contain at least one item".into(),
        ));
    }
    for (idx, item) in items.iter().enumerate() {
        if item.quantity < 1 {
            return Err(ServiceError::InvalidInput(format!(
                "item {} ({}): quantity must be at least 1, got {}",
                idx, item.product_name, item.quantity
            )));
        }
        if item.product_name.trim().is_empty() {
            return Err(ServiceError::InvalidInput(format!(
                "item {}: product name must not be empty",
                idx
            )));
        }
        let depth = item
            .selected_options
            .iter()
            .map(|opt| 1 + group_depth(&opt.child_groups))
            .max()
            .unwrap_or(0);
        if depth > MAX_OPTION_DEPTH {
            return Err(ServiceError::InvalidInput(format!(
                "item {} ({}): option nesting depth {} exceeds maximum of {}",
                idx, item.product_name, depth, MAX_OPTION_DEPTH
            )));
        }
    }
    Ok(())
}

/// Computes the full price breakdown for a set of line items.
///
/// Deterministic and side-effect free. A negative unit price (caller-supplied
/// catalog error) is not clamped here; it flows into the subtotal, where the
/// discount floor is the only clamping point.
pub fn calculate(
    items: &[LineItemInput],
    tax_rate: Decimal,
    service_charge_rate: Decimal,
    discounts: &[AppliedDiscount],
) -> PriceCalculation {
    let item_pricings: Vec<ItemPricing> = items
        .iter()
        .map(|item| {
            let unit_price =
                item.base_price + item.variant_price_delta + option_delta(&item.selected_options);
            ItemPricing {
                product_id: item.product_id,
                product_name: item.product_name.clone(),
                unit_price,
                quantity: item.quantity,
                item_subtotal: unit_price * Decimal::from(item.quantity),
            }
        })
        .collect();

    let subtotal: Decimal = item_pricings.iter().map(|i| i.item_subtotal).sum();
    let total_discount: Decimal = discounts.iter().map(|d| d.amount_saved).sum();
    let subtotal_after_discount = (subtotal - total_discount).max(Decimal::ZERO);

    let tax_amount = subtotal_after_discount * tax_rate;
    let service_charge_amount = subtotal_after_discount * service_charge_rate;
    let total_amount = subtotal_after_discount + tax_amount + service_charge_amount;

    PriceCalculation {
        items: item_pricings,
        subtotal,
        total_discount,
        subtotal_after_discount,
        tax_rate,
        tax_amount,
        service_charge_rate,
        service_charge_amount,
        total_amount,
    }
}
