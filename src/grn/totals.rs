use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GrnError;
use crate::filter::js_number;
use crate::grn::{round2, CalcOptions, LineItem};

/// Footer of a GRN: totals derived from the line items plus the charges
/// entered by hand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentDetails {
    pub sub_total: f64,
    pub over_all_discount_percentage: f64,
    pub over_all_discount_amount: f64,
    pub net_amount: f64,
    pub other_charges: f64,
    pub freight: f64,
    pub cst: f64,
    pub excise: f64,
    pub cess: f64,
    pub credit_note_amount: f64,
    pub net_payable: f64,
}

impl PaymentDetails {
    /// The five additive charges, in form order.
    pub fn charges(&self) -> [f64; 5] {
        [self.other_charges, self.freight, self.cst, self.excise, self.cess]
    }

    pub fn charges_total(&self) -> f64 {
        self.charges().iter().sum()
    }

    fn discount_on_sub_total(&self) -> f64 {
        if self.over_all_discount_percentage == 0.0 {
            0.0
        } else {
            round2(self.sub_total * self.over_all_discount_percentage / 100.0)
        }
    }
}

/// A hand-editable field of [`PaymentDetails`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeField {
    OverAllDiscountPercentage,
    CreditNoteAmount,
    OtherCharges,
    Freight,
    Cst,
    Excise,
    Cess,
}

impl FromStr for ChargeField {
    type Err = GrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "overalldiscountpercentage" | "discountpercentage" | "discount" => {
                Ok(ChargeField::OverAllDiscountPercentage)
            }
            "creditnoteamount" | "creditnote" => Ok(ChargeField::CreditNoteAmount),
            "othercharges" => Ok(ChargeField::OtherCharges),
            "freight" => Ok(ChargeField::Freight),
            "cst" => Ok(ChargeField::Cst),
            "excise" => Ok(ChargeField::Excise),
            "cess" => Ok(ChargeField::Cess),
            "subtotal" | "overalldiscountamount" | "netamount" | "netpayable" => {
                Err(GrnError::DerivedField(s.to_string()))
            }
            _ => Err(GrnError::UnknownChargeField(s.to_string())),
        }
    }
}

impl fmt::Display for ChargeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChargeField::OverAllDiscountPercentage => "over_all_discount_percentage",
            ChargeField::CreditNoteAmount => "credit_note_amount",
            ChargeField::OtherCharges => "other_charges",
            ChargeField::Freight => "freight",
            ChargeField::Cst => "cst",
            ChargeField::Excise => "excise",
            ChargeField::Cess => "cess",
        };
        f.write_str(name)
    }
}

/// Rebuild the totals after a line item amount changed.
///
/// A sub-total that is not positive leaves `payment` as it was unless
/// `options.recompute_on_empty` is set.
pub fn recompute_subtotal(
    items: &[LineItem],
    payment: &PaymentDetails,
    options: &CalcOptions,
) -> PaymentDetails {
    let sub_total = round2(items.iter().map(|i| i.amount).sum::<f64>());
    let positive = sub_total > 0.0;
    if !positive && !options.recompute_on_empty {
        tracing::debug!(sub_total, "Sub-total not positive, totals left unchanged");
        return payment.clone();
    }

    let mut next = payment.clone();
    next.sub_total = sub_total;
    next.over_all_discount_amount = next.discount_on_sub_total();

    let no_discount = next.over_all_discount_percentage == 0.0;
    next.net_amount = if no_discount {
        sub_total
    } else {
        round2(sub_total - next.over_all_discount_amount)
    };
    next.net_payable = if no_discount && next.charges().iter().all(|c| *c == 0.0) {
        sub_total
    } else {
        round2(sub_total - next.over_all_discount_amount + next.charges_total())
    };

    tracing::debug!(
        sub_total,
        net_payable = next.net_payable,
        items = items.len(),
        "Recomputed totals"
    );
    next
}

/// Apply a hand edit to one payment field.
///
/// The discount percentage reprices everything from `sub_total`. A credit
/// note is taken off `net_amount` alone; any other charge sets
/// `net_payable` to `net_amount` plus all five charges.
pub fn recompute_on_charge_change(
    field: ChargeField,
    raw: &str,
    payment: &PaymentDetails,
) -> PaymentDetails {
    let value = js_number(raw);
    let mut next = payment.clone();

    match field {
        ChargeField::OverAllDiscountPercentage => {
            next.over_all_discount_percentage = value;
            next.over_all_discount_amount = next.discount_on_sub_total();
            next.net_amount = round2(next.sub_total - next.over_all_discount_amount);
            next.net_payable = round2(next.net_amount + next.charges_total());
        }
        ChargeField::CreditNoteAmount => {
            next.credit_note_amount = value;
            next.net_payable = round2(next.net_amount - value);
        }
        ChargeField::OtherCharges
        | ChargeField::Freight
        | ChargeField::Cst
        | ChargeField::Excise
        | ChargeField::Cess => {
            match field {
                ChargeField::OtherCharges => next.other_charges = value,
                ChargeField::Freight => next.freight = value,
                ChargeField::Cst => next.cst = value,
                ChargeField::Excise => next.excise = value,
                _ => next.cess = value,
            }
            next.net_payable = round2(next.net_amount + next.charges_total());
        }
    }

    tracing::debug!(field = %field, raw, net_payable = next.net_payable, "Applied payment edit");
    next
}
