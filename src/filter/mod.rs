//! Grid filtering: prefix conditions evaluated against rows of scalar cells.

pub mod predicate;
pub mod rowset;
pub mod scalar;

pub use predicate::{evaluate, FilterCondition, NumericPrefix, Prefix, SetPrefix, TextPrefix};
pub use rowset::{filter_rows, FilterSet, Row};
pub use scalar::{js_number, parse_float, Scalar};
