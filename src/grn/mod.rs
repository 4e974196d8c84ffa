//! Goods received notes: line item arithmetic, payment totals, and the
//! operations that edit stored GRNs.

mod ledger;
mod line_item;
mod totals;

use serde::{Deserialize, Serialize};

pub use ledger::{
    add_item, create_grn, format_grn_number, remove_item, resolve_grn_number, set_charge,
    set_item_field,
};
pub use line_item::{apply_field_change, DiscountBase, LineField, LineItem};
pub use totals::{recompute_on_charge_change, recompute_subtotal, ChargeField, PaymentDetails};

/// Knobs for the two places where the arithmetic has a choice to make.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CalcOptions {
    /// Price the discount is taken from when the pack size is edited.
    pub pack_discount_base: DiscountBase,
    /// Recompute totals even when the sub-total drops to zero or below.
    pub recompute_on_empty: bool,
}

/// Round to two decimals, halves away from zero. NaN and infinities pass
/// through, as do finite values too large to scale by 100.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}

/// Two-decimal display of a money value.
pub fn format_amount(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else {
        format!("{:.2}", round2(value))
    }
}
