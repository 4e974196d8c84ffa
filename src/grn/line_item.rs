use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::GrnError;
use crate::filter::js_number;
use crate::grn::{round2, CalcOptions};

/// One product line on a goods received note.
///
/// The first seven fields are typed in by the user; the five after them are
/// derived and only change through [`apply_field_change`]. Anything else the
/// form carries (product name, batch, expiry...) lives in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub pack: f64,
    pub quantity: f64,
    #[serde(default)]
    pub free_quantity: f64,
    pub mrp: f64,
    pub rate: f64,
    #[serde(default)]
    pub tax_percentage: f64,
    #[serde(default)]
    pub discount_percentage: f64,

    #[serde(default)]
    pub mrp_per_tablet: f64,
    #[serde(default)]
    pub rate_per_tablet: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub amount: f64,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl LineItem {
    /// A blank line as created by "Add Item": single-unit pack, everything
    /// else zero.
    pub fn new(product: &str) -> Self {
        let mut details = BTreeMap::new();
        if !product.is_empty() {
            details.insert("product".to_string(), product.to_string());
        }
        Self {
            pack: 1.0,
            quantity: 0.0,
            free_quantity: 0.0,
            mrp: 0.0,
            rate: 0.0,
            tax_percentage: 0.0,
            discount_percentage: 0.0,
            mrp_per_tablet: 0.0,
            rate_per_tablet: 0.0,
            tax_amount: 0.0,
            discount_amount: 0.0,
            amount: 0.0,
            details,
        }
    }

    pub fn product(&self) -> &str {
        self.details.get("product").map(String::as_str).unwrap_or("")
    }

    fn tax_on_rate(&self) -> f64 {
        round2(self.rate * self.quantity * self.tax_percentage / 100.0)
    }

    fn discount_on(&self, base: f64) -> f64 {
        round2(base * self.quantity * self.discount_percentage / 100.0)
    }

    fn line_amount(&self) -> f64 {
        round2(self.rate * self.quantity + self.tax_amount - self.discount_amount)
    }
}

/// Which price the discount is taken from when the pack size changes.
/// Every other edit takes it from `rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountBase {
    #[default]
    Mrp,
    Rate,
}

/// A field name on a line item that can be edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineField {
    Pack,
    Quantity,
    FreeQuantity,
    Mrp,
    Rate,
    TaxPercentage,
    DiscountPercentage,
    /// Stored verbatim in `details`.
    Other(String),
}

const DERIVED_FIELDS: [&str; 5] = [
    "mrp_per_tablet",
    "rate_per_tablet",
    "tax_amount",
    "discount_amount",
    "amount",
];

/// `freeQuantity` -> `free_quantity`
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.trim().chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch == '-' {
            out.push('_');
        } else {
            out.push(ch);
        }
    }
    out
}

impl FromStr for LineField {
    type Err = GrnError;

    /// Accepts snake_case or camelCase names. Derived fields are refused.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = to_snake_case(s);
        if DERIVED_FIELDS.contains(&name.as_str()) {
            return Err(GrnError::DerivedField(s.to_string()));
        }
        Ok(match name.as_str() {
            "pack" => LineField::Pack,
            "quantity" | "qty" => LineField::Quantity,
            "free_quantity" | "free_qty" => LineField::FreeQuantity,
            "mrp" => LineField::Mrp,
            "rate" => LineField::Rate,
            "tax_percentage" | "tax" => LineField::TaxPercentage,
            "discount_percentage" | "discount" => LineField::DiscountPercentage,
            _ => LineField::Other(s.trim().to_string()),
        })
    }
}

impl fmt::Display for LineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineField::Pack => f.write_str("pack"),
            LineField::Quantity => f.write_str("quantity"),
            LineField::FreeQuantity => f.write_str("free_quantity"),
            LineField::Mrp => f.write_str("mrp"),
            LineField::Rate => f.write_str("rate"),
            LineField::TaxPercentage => f.write_str("tax_percentage"),
            LineField::DiscountPercentage => f.write_str("discount_percentage"),
            LineField::Other(name) => f.write_str(name),
        }
    }
}

/// Apply one edit to a line item and recompute whatever depends on it.
///
/// `raw` is converted the way a form input is (`Number(raw)`): junk becomes
/// NaN and flows into the derived fields, a zero pack divides to
/// Infinity/NaN. Neither is an error.
pub fn apply_field_change(
    item: &LineItem,
    field: &LineField,
    raw: &str,
    options: &CalcOptions,
) -> LineItem {
    let mut next = item.clone();

    match field {
        LineField::Pack => {
            next.pack = js_number(raw);
            next.mrp_per_tablet = round2(next.mrp / next.pack);
            next.rate_per_tablet = round2(next.rate / next.pack);
            next.tax_amount = next.tax_on_rate();
            // Pack edits price the discount off MRP unless configured otherwise.
            next.discount_amount = match options.pack_discount_base {
                DiscountBase::Mrp => next.discount_on(next.mrp),
                DiscountBase::Rate => next.discount_on(next.rate),
            };
            next.amount = next.line_amount();
        }
        LineField::Quantity | LineField::FreeQuantity => {
            if *field == LineField::Quantity {
                next.quantity = js_number(raw);
            } else {
                next.free_quantity = js_number(raw);
            }
            next.tax_amount = next.tax_on_rate();
            next.discount_amount = next.discount_on(next.rate);
            next.amount = next.line_amount();
        }
        LineField::Mrp => {
            next.mrp = js_number(raw);
            next.mrp_per_tablet = round2(next.mrp / next.pack);
        }
        LineField::Rate => {
            next.rate = js_number(raw);
            next.tax_amount = next.tax_on_rate();
            next.discount_amount = next.discount_on(next.rate);
            next.amount = next.line_amount();
            next.rate_per_tablet = round2(next.rate / next.pack);
        }
        LineField::TaxPercentage => {
            next.tax_percentage = js_number(raw);
            next.tax_amount = next.tax_on_rate();
            next.amount = next.line_amount();
        }
        LineField::DiscountPercentage => {
            next.discount_percentage = js_number(raw);
            next.discount_amount = next.discount_on(next.rate);
            next.amount = next.line_amount();
        }
        LineField::Other(name) => {
            next.details.insert(name.clone(), raw.to_string());
        }
    }

    tracing::debug!(field = %field, raw, amount = next.amount, "Recomputed line item");
    next
}
