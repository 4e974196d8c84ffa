pub mod config;
pub mod error;
pub mod filter;
pub mod grn;

pub use config::{Config, GrnRecord, State};
pub use error::{GrnError, Result};
pub use filter::{evaluate, filter_rows, FilterCondition, FilterSet, Prefix, Row, Scalar};
pub use grn::{
    apply_field_change, recompute_on_charge_change, recompute_subtotal, CalcOptions, ChargeField,
    LineField, LineItem, PaymentDetails,
};
