use std::collections::BTreeMap;

use crate::error::{GrnError, Result};
use crate::filter::predicate::{evaluate, FilterCondition, Prefix};
use crate::filter::scalar::Scalar;

/// A grid row: field name to cell value. The schema comes from column
/// definitions, not from the filter.
pub type Row = BTreeMap<String, Scalar>;

/// Field name to condition. A `None` entry is a control the user left
/// empty and imposes nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    conditions: BTreeMap<String, Option<FilterCondition>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the condition on one field.
    pub fn set(&mut self, field: impl Into<String>, condition: FilterCondition) {
        self.conditions.insert(field.into(), Some(condition));
    }

    /// Builder form of [`FilterSet::set`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, condition: FilterCondition) -> Self {
        self.set(field, condition);
        self
    }

    /// Leave the field in the set but without a condition.
    pub fn clear_field(&mut self, field: &str) {
        if let Some(slot) = self.conditions.get_mut(field) {
            *slot = None;
        }
    }

    /// Drop every condition ("Clear").
    pub fn clear(&mut self) {
        self.conditions.clear();
    }

    /// True when no field carries a condition.
    pub fn is_empty(&self) -> bool {
        self.conditions.values().all(Option::is_none)
    }

    /// Active `(field, condition)` pairs.
    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterCondition)> {
        self.conditions
            .iter()
            .filter_map(|(field, cond)| cond.as_ref().map(|c| (field.as_str(), c)))
    }

    /// Parse a `field:PREFIX:value` clause and add it to the set.
    /// The value may itself contain colons.
    pub fn add_clause(&mut self, clause: &str) -> Result<()> {
        let mut parts = clause.splitn(3, ':');
        let (field, prefix, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(f), Some(p), Some(v)) => (f.trim(), p, v),
            _ => {
                return Err(GrnError::InvalidFilter {
                    clause: clause.to_string(),
                    reason: "expected field:PREFIX:value (e.g., 'name:LIKE:para')".to_string(),
                })
            }
        };

        if field.is_empty() {
            return Err(GrnError::InvalidFilter {
                clause: clause.to_string(),
                reason: "field name is empty".to_string(),
            });
        }

        let prefix: Prefix = prefix.parse()?;
        self.set(field, FilterCondition::new(prefix, value));
        Ok(())
    }

    /// Build a set from several clauses; later clauses on the same field win.
    pub fn from_clauses<S: AsRef<str>>(clauses: &[S]) -> Result<Self> {
        let mut set = FilterSet::new();
        for clause in clauses {
            set.add_clause(clause.as_ref())?;
        }
        Ok(set)
    }

    /// Whether one row satisfies every active condition. A missing field is
    /// evaluated as null.
    pub fn matches(&self, row: &Row) -> bool {
        self.active().all(|(field, condition)| {
            let cell = row.get(field).unwrap_or(&Scalar::Null);
            evaluate(cell, condition)
        })
    }
}

/// Keep the rows that satisfy every condition in `filter_set`, in their
/// original order. The input is left untouched.
pub fn filter_rows<'a>(rows: &'a [Row], filter_set: &FilterSet) -> Vec<&'a Row> {
    let kept: Vec<&Row> = rows.iter().filter(|row| filter_set.matches(row)).collect();
    tracing::debug!(
        total = rows.len(),
        kept = kept.len(),
        conditions = filter_set.active().count(),
        "Applied row filter"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Scalar)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn sample() -> Vec<Row> {
        vec![
            row(&[("name", "Paracetamol".into()), ("stock", 120.0.into()), ("status", "A".into())]),
            row(&[("name", "Ibuprofen".into()), ("stock", 8.0.into()), ("status", "B".into())]),
            row(&[("name", "Amoxicillin".into()), ("stock", Scalar::Null), ("status", "C".into())]),
            row(&[("name", "Cetirizine".into()), ("status", "A".into())]),
        ]
    }

    #[test]
    fn test_like_scenario() {
        let rows = vec![row(&[("name", "John".into())]), row(&[("name", "Jane".into())])];
        let fs = FilterSet::new().with("name", FilterCondition::like("jo"));
        let result = filter_rows(&rows, &fs);
        assert_eq!(result, vec![&rows[0]]);
    }

    #[test]
    fn test_in_scenario() {
        let rows: Vec<Row> = ["A", "B", "C"]
            .iter()
            .map(|s| row(&[("status", (*s).into())]))
            .collect();
        let fs = FilterSet::new().with("status", FilterCondition::one_of(["A", "C"]));
        let result = filter_rows(&rows, &fs);
        assert_eq!(result, vec![&rows[0], &rows[2]]);
    }

    #[test]
    fn test_empty_set_is_identity() {
        let rows = sample();
        let result = filter_rows(&rows, &FilterSet::new());
        assert_eq!(result.len(), rows.len());
        assert!(result.iter().zip(rows.iter()).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let rows = sample();
        let fs = FilterSet::from_clauses(&["name:NOT_LIKE:xyz", "stock:LESS_THAN:100"]).unwrap();
        let once: Vec<Row> = filter_rows(&rows, &fs).into_iter().cloned().collect();
        let twice: Vec<Row> = filter_rows(&once, &fs).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_all_conditions_must_hold() {
        let rows = sample();
        let fs = FilterSet::from_clauses(&["status:IN:A,B", "stock:GREATER_THAN:10"]).unwrap();
        let kept: Vec<&str> = filter_rows(&rows, &fs)
            .into_iter()
            .map(|r| match &r["name"] {
                Scalar::Text(s) => s.as_str(),
                _ => "",
            })
            .collect();
        // Cetirizine has no stock, so the numeric test cannot exclude it.
        assert_eq!(kept, vec!["Paracetamol", "Cetirizine"]);
    }

    #[test]
    fn test_missing_field_fails_text_conditions() {
        let rows = sample();
        let fs = FilterSet::from_clauses(&["supplier:NOT_LIKE:acme"]).unwrap();
        assert!(filter_rows(&rows, &fs).is_empty());
    }

    #[test]
    fn test_cleared_field_imposes_nothing() {
        let rows = sample();
        let mut fs = FilterSet::from_clauses(&["name:LIKE:para"]).unwrap();
        assert_eq!(filter_rows(&rows, &fs).len(), 1);
        fs.clear_field("name");
        assert!(fs.is_empty());
        assert_eq!(filter_rows(&rows, &fs).len(), rows.len());
        fs.set("status", FilterCondition::one_of(["C"]));
        fs.clear();
        assert!(fs.is_empty());
    }

    #[test]
    fn test_clause_parsing() {
        let fs = FilterSet::from_clauses(&["expiry:LIKE:2026-01:15"]).unwrap();
        let (field, cond) = fs.active().next().unwrap();
        assert_eq!(field, "expiry");
        assert_eq!(cond, &FilterCondition::like("2026-01:15"));

        assert!(matches!(
            FilterSet::from_clauses(&["name-like-x"]),
            Err(GrnError::InvalidFilter { .. })
        ));
        assert!(matches!(
            FilterSet::from_clauses(&[":LIKE:x"]),
            Err(GrnError::InvalidFilter { .. })
        ));
        assert!(matches!(
            FilterSet::from_clauses(&["name:ABOUT:x"]),
            Err(GrnError::UnknownPrefix(_))
        ));
    }
}
