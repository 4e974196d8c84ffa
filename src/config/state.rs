use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{GrnError, Result};
use crate::grn::{
    apply_field_change, recompute_on_charge_change, recompute_subtotal, CalcOptions,
    ChargeField, LineField, LineItem, PaymentDetails,
};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    pub counter: Counter,
    #[serde(default)]
    pub grns: Vec<GrnRecord>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Counter {
    pub last_number: u32,
    pub last_year: u32,
}

impl Default for Counter {
    fn default() -> Self {
        Self {
            last_number: 0,
            last_year: chrono::Utc::now().year() as u32,
        }
    }
}

/// A stored goods received note.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GrnRecord {
    pub number: String,
    pub supplier: String,
    /// Supplier's invoice number, if the delivery came with one
    #[serde(default)]
    pub invoice_no: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub payment: PaymentDetails,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl GrnRecord {
    pub fn new(number: String, supplier: String, invoice_no: Option<String>, date: NaiveDate) -> Self {
        Self {
            number,
            supplier,
            invoice_no,
            date,
            payment: PaymentDetails::default(),
            items: Vec::new(),
        }
    }

    /// Append a blank line and return its 1-based line number.
    pub fn add_item(&mut self, product: &str) -> usize {
        self.items.push(LineItem::new(product));
        self.items.len()
    }

    fn line_index(&self, line: usize) -> Result<usize> {
        if line == 0 || line > self.items.len() {
            return Err(GrnError::InvalidLine {
                grn: self.number.clone(),
                line,
                count: self.items.len(),
            });
        }
        Ok(line - 1)
    }

    /// Edit one field of a line (1-based). The totals are refreshed only
    /// when the line's amount changed.
    pub fn set_item_field(
        &mut self,
        line: usize,
        field: &LineField,
        raw: &str,
        options: &CalcOptions,
    ) -> Result<&LineItem> {
        let idx = self.line_index(line)?;
        let before = self.items[idx].amount;
        self.items[idx] = apply_field_change(&self.items[idx], field, raw, options);
        // Bitwise so that NaN staying NaN counts as unchanged.
        if self.items[idx].amount.to_bits() != before.to_bits() {
            self.payment = recompute_subtotal(&self.items, &self.payment, options);
        }
        Ok(&self.items[idx])
    }

    /// Drop a line (1-based) and refresh the totals.
    pub fn remove_item(&mut self, line: usize, options: &CalcOptions) -> Result<LineItem> {
        let idx = self.line_index(line)?;
        let removed = self.items.remove(idx);
        self.payment = recompute_subtotal(&self.items, &self.payment, options);
        Ok(removed)
    }

    pub fn set_charge(&mut self, field: ChargeField, raw: &str) {
        self.payment = recompute_on_charge_change(field, raw, &self.payment);
    }
}
