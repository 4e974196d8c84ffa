use std::fmt;
use std::str::FromStr;

use crate::error::GrnError;
use crate::filter::scalar::{parse_float, Scalar};

/// Comparison operator attached to a filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    Like,
    NotLike,
    In,
    NotIn,
    LessThan,
    GreaterThan,
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Prefix::Like => "LIKE",
            Prefix::NotLike => "NOT_LIKE",
            Prefix::In => "IN",
            Prefix::NotIn => "NOT_IN",
            Prefix::LessThan => "LESS_THAN",
            Prefix::GreaterThan => "GREATER_THAN",
        };
        f.write_str(name)
    }
}

impl FromStr for Prefix {
    type Err = GrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "LIKE" => Ok(Prefix::Like),
            "NOT_LIKE" => Ok(Prefix::NotLike),
            "IN" => Ok(Prefix::In),
            "NOT_IN" => Ok(Prefix::NotIn),
            "LESS_THAN" | "LT" => Ok(Prefix::LessThan),
            "GREATER_THAN" | "GT" => Ok(Prefix::GreaterThan),
            _ => Err(GrnError::UnknownPrefix(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPrefix {
    Like,
    NotLike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetPrefix {
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericPrefix {
    LessThan,
    GreaterThan,
}

/// One filter condition. The value shape follows the operator: set
/// operators carry a list, the others a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    Text { prefix: TextPrefix, value: String },
    Set { prefix: SetPrefix, values: Vec<String> },
    /// The raw operand is kept; it is run through `parseFloat` at compare time.
    Numeric { prefix: NumericPrefix, value: String },
}

impl FilterCondition {
    /// Build a condition from a prefix and the text the user typed.
    /// Set operators take a comma separated list.
    pub fn new(prefix: Prefix, raw: &str) -> Self {
        match prefix {
            Prefix::Like => Self::like(raw),
            Prefix::NotLike => FilterCondition::Text {
                prefix: TextPrefix::NotLike,
                value: raw.to_string(),
            },
            Prefix::In | Prefix::NotIn => {
                let values = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();
                let prefix = if prefix == Prefix::In {
                    SetPrefix::In
                } else {
                    SetPrefix::NotIn
                };
                FilterCondition::Set { prefix, values }
            }
            Prefix::LessThan => FilterCondition::Numeric {
                prefix: NumericPrefix::LessThan,
                value: raw.to_string(),
            },
            Prefix::GreaterThan => FilterCondition::Numeric {
                prefix: NumericPrefix::GreaterThan,
                value: raw.to_string(),
            },
        }
    }

    pub fn like(value: impl Into<String>) -> Self {
        FilterCondition::Text {
            prefix: TextPrefix::Like,
            value: value.into(),
        }
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterCondition::Set {
            prefix: SetPrefix::In,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn prefix(&self) -> Prefix {
        match self {
            FilterCondition::Text { prefix: TextPrefix::Like, .. } => Prefix::Like,
            FilterCondition::Text { prefix: TextPrefix::NotLike, .. } => Prefix::NotLike,
            FilterCondition::Set { prefix: SetPrefix::In, .. } => Prefix::In,
            FilterCondition::Set { prefix: SetPrefix::NotIn, .. } => Prefix::NotIn,
            FilterCondition::Numeric { prefix: NumericPrefix::LessThan, .. } => Prefix::LessThan,
            FilterCondition::Numeric { prefix: NumericPrefix::GreaterThan, .. } => {
                Prefix::GreaterThan
            }
        }
    }

    /// True when the condition carries no value and so filters nothing.
    pub fn is_blank(&self) -> bool {
        match self {
            FilterCondition::Text { value, .. } | FilterCondition::Numeric { value, .. } => {
                value.is_empty()
            }
            FilterCondition::Set { values, .. } => values.is_empty(),
        }
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterCondition::Text { value, .. } | FilterCondition::Numeric { value, .. } => {
                write!(f, "{} {}", self.prefix(), value)
            }
            FilterCondition::Set { values, .. } => {
                write!(f, "{} [{}]", self.prefix(), values.join(", "))
            }
        }
    }
}

/// Test one cell against one condition.
///
/// A blank condition always passes. A null cell fails every text and set
/// condition, negated ones included. Numeric comparisons where either side
/// does not parse pass, so rows that cannot be compared are kept.
pub fn evaluate(cell: &Scalar, condition: &FilterCondition) -> bool {
    if condition.is_blank() {
        return true;
    }

    match condition {
        FilterCondition::Text { prefix, value } => {
            if cell.is_null() {
                return false;
            }
            let haystack = cell.to_js_string().to_lowercase();
            let found = haystack.contains(&value.to_lowercase());
            match prefix {
                TextPrefix::Like => found,
                TextPrefix::NotLike => !found,
            }
        }
        FilterCondition::Set { prefix, values } => {
            if cell.is_null() {
                return false;
            }
            let needle = cell.to_js_string();
            let found = values.iter().any(|v| *v == needle);
            match prefix {
                SetPrefix::In => found,
                SetPrefix::NotIn => !found,
            }
        }
        FilterCondition::Numeric { prefix, value } => {
            let lhs = parse_float(&cell.to_js_string());
            let rhs = parse_float(value);
            if lhs.is_nan() || rhs.is_nan() {
                return true;
            }
            match prefix {
                NumericPrefix::LessThan => lhs < rhs,
                NumericPrefix::GreaterThan => lhs > rhs,
            }
        }
    }
}
