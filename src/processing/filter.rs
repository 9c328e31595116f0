//! Filter stage: keeps rows matching every predicate.
//!
//! Predicates never fail. A missing field reads as the empty string for `contains` and `equals`
//! and has no numeric or boolean reading, so it fails `gt`, `lt`, `true` and `false`.

use serde::{Deserialize, Serialize};

use crate::types::{Row, Value};

/// Comparison applied by a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Case-insensitive substring match on the display string.
    #[serde(rename = "contains")]
    Contains,
    /// Numeric equality when both sides are numeric, display-string equality otherwise.
    #[serde(rename = "equals")]
    Equals,
    /// Numeric `>`.
    #[serde(rename = "gt", alias = "greaterThan")]
    GreaterThan,
    /// Numeric `<`.
    #[serde(rename = "lt", alias = "lessThan")]
    LessThan,
    /// Cell reads as boolean `true` (see [`Value::to_bool`]); the comparand is ignored.
    ///
    /// Null, missing, date-time and unrecognised text cells never match either boolean operator.
    #[serde(rename = "true", alias = "isTrue")]
    IsTrue,
    /// Cell reads as boolean `false`; the comparand is ignored.
    #[serde(rename = "false", alias = "isFalse")]
    IsFalse,
}

/// Right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Comparand {
    /// Number typed by the caller.
    Number(f64),
    /// Free text as typed by the caller.
    Text(String),
}

impl Comparand {
    fn as_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::Float64(*n),
            Self::Text(s) => Value::Utf8(s.clone()),
        }
    }
}

impl Default for Comparand {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for Comparand {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Comparand {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<f64> for Comparand {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for Comparand {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<i64> for Comparand {
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

/// A single `field operator value` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// Row field the predicate reads.
    pub field: String,
    /// Comparison to apply.
    pub operator: FilterOperator,
    /// Value to compare against.
    #[serde(default)]
    pub value: Comparand,
}

impl Predicate {
    /// Create a predicate.
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Comparand>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// `field contains value`.
    pub fn contains(field: impl Into<String>, value: impl Into<Comparand>) -> Self {
        Self::new(field, FilterOperator::Contains, value)
    }

    /// `field equals value`.
    pub fn equals(field: impl Into<String>, value: impl Into<Comparand>) -> Self {
        Self::new(field, FilterOperator::Equals, value)
    }

    /// `field > value`.
    pub fn gt(field: impl Into<String>, value: impl Into<Comparand>) -> Self {
        Self::new(field, FilterOperator::GreaterThan, value)
    }

    /// `field < value`.
    pub fn lt(field: impl Into<String>, value: impl Into<Comparand>) -> Self {
        Self::new(field, FilterOperator::LessThan, value)
    }

    /// Returns `true` if `row` satisfies this predicate.
    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.get(&self.field);
        match self.operator {
            FilterOperator::Contains => contains_match(cell, &self.value),
            FilterOperator::Equals => loose_eq(cell, &self.value),
            FilterOperator::GreaterThan => numeric_match(cell, &self.value, |a, b| a > b),
            FilterOperator::LessThan => numeric_match(cell, &self.value, |a, b| a < b),
            FilterOperator::IsTrue => cell.and_then(Value::to_bool) == Some(true),
            FilterOperator::IsFalse => cell.and_then(Value::to_bool) == Some(false),
        }
    }
}

/// Returns `true` if `row` satisfies every predicate (AND semantics).
pub fn matches_all(row: &Row, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|p| p.matches(row))
}

/// Returns the rows that satisfy every predicate, in input order.
///
/// An empty predicate slice keeps every row.
pub fn filter(rows: &[Row], predicates: &[Predicate]) -> Vec<Row> {
    if predicates.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| matches_all(row, predicates))
        .cloned()
        .collect()
}

fn cell_text(cell: Option<&Value>) -> String {
    cell.map(Value::to_display_string).unwrap_or_default()
}

fn contains_match(cell: Option<&Value>, needle: &Comparand) -> bool {
    let haystack = cell_text(cell).to_lowercase();
    let needle = needle.as_value().to_display_string().to_lowercase();
    haystack.contains(&needle)
}

/// The single equality coercion: numeric when both sides read as numbers, text otherwise.
fn loose_eq(cell: Option<&Value>, comparand: &Comparand) -> bool {
    let rhs = comparand.as_value();
    if let (Some(a), Some(b)) = (cell.and_then(Value::to_number), rhs.to_number()) {
        return a == b;
    }
    cell_text(cell) == rhs.to_display_string()
}

fn numeric_match(cell: Option<&Value>, comparand: &Comparand, cmp: fn(f64, f64) -> bool) -> bool {
    match (cell.and_then(Value::to_number), comparand.as_value().to_number()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales_rows() -> Vec<Row> {
        vec![
            Row::from([("region", Value::from("EU")), ("sales", Value::from(100))]),
            Row::from([("region", Value::from("US")), ("sales", Value::from(200))]),
            Row::from([("region", Value::from("EU")), ("sales", Value::from(50))]),
        ]
    }

    #[test]
    fn empty_predicates_keep_every_row() {
        let rows = sales_rows();
        assert_eq!(filter(&rows, &[]), rows);
    }

    #[test]
    fn gt_coerces_text_comparand() {
        let rows = sales_rows();
        let out = filter(&rows, &[Predicate::gt("sales", "99")]);
        let sales: Vec<_> = out.iter().map(|r| r.get("sales").cloned()).collect();
        assert_eq!(sales, vec![Some(Value::Int64(100)), Some(Value::Int64(200))]);
    }

    #[test]
    fn lt_excludes_non_numeric_cells() {
        let rows = vec![
            Row::from([("v", Value::from("abc"))]),
            Row::from([("v", Value::from("3"))]),
            Row::from([("v", Value::Null)]),
            Row::from([("other", Value::from(1))]),
        ];
        let out = filter(&rows, &[Predicate::lt("v", 10)]);
        assert_eq!(out, vec![Row::from([("v", Value::from("3"))])]);
    }

    #[test]
    fn contains_is_case_insensitive() {
        let rows = vec![
            Row::from([("product", Value::from("Enterprise License"))]),
            Row::from([("product", Value::from("Pro Tools"))]),
        ];
        let out = filter(&rows, &[Predicate::contains("product", "LICENSE")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("product"), Some(&Value::from("Enterprise License")));
    }

    #[test]
    fn contains_reads_numbers_as_text() {
        let rows = vec![
            Row::from([("id", Value::from(1205))]),
            Row::from([("id", Value::from(77))]),
        ];
        let out = filter(&rows, &[Predicate::contains("id", 20_i64)]);
        assert_eq!(out, vec![Row::from([("id", Value::from(1205))])]);
    }

    #[test]
    fn contains_with_empty_comparand_matches_missing_fields() {
        let rows = vec![Row::from([("a", Value::from(1))]), Row::new()];
        assert_eq!(filter(&rows, &[Predicate::contains("a", "")]).len(), 2);
        assert_eq!(filter(&rows, &[Predicate::contains("a", "1")]).len(), 1);
    }

    #[test]
    fn equals_matches_numeric_text_against_number() {
        let row = Row::from([("n", Value::from(5))]);
        assert!(Predicate::equals("n", "5").matches(&row));
        assert!(Predicate::equals("n", "5.0").matches(&row));
        assert!(Predicate::equals("n", 5_i64).matches(&row));
        assert!(!Predicate::equals("n", "five").matches(&row));
    }

    #[test]
    fn equals_compares_text_exactly() {
        let row = Row::from([("region", Value::from("EU")), ("flag", Value::Bool(true))]);
        assert!(Predicate::equals("region", "EU").matches(&row));
        assert!(!Predicate::equals("region", "eu").matches(&row));
        assert!(Predicate::equals("flag", "true").matches(&row));
    }

    #[test]
    fn equals_missing_field_only_matches_empty_comparand() {
        let row = Row::from([("a", Value::Null)]);
        assert!(Predicate::equals("a", "").matches(&row));
        assert!(Predicate::equals("missing", "").matches(&row));
        assert!(!Predicate::equals("missing", "x").matches(&row));
        assert!(!Predicate::equals("missing", 0_i64).matches(&row));
    }

    #[test]
    fn boolean_operators_read_truthiness() {
        let rows = vec![
            Row::from([("active", Value::Bool(true))]),
            Row::from([("active", Value::from("no"))]),
            Row::from([("active", Value::from("unknown"))]),
        ];
        let t = filter(&rows, &[Predicate::new("active", FilterOperator::IsTrue, "")]);
        let f = filter(&rows, &[Predicate::new("active", FilterOperator::IsFalse, "")]);
        assert_eq!(t, vec![rows[0].clone()]);
        assert_eq!(f, vec![rows[1].clone()]);
    }

    #[test]
    fn boolean_operators_ignore_comparand_and_skip_unreadable_cells() {
        let rows = vec![
            Row::from([("active", Value::Int64(1))]),
            Row::from([("active", Value::Null)]),
            Row::from([("other", Value::Bool(true))]),
            Row::from([("active", Value::Float64(0.0))]),
        ];
        let t = filter(&rows, &[Predicate::new("active", FilterOperator::IsTrue, "false")]);
        let f = filter(&rows, &[Predicate::new("active", FilterOperator::IsFalse, 1_i64)]);
        assert_eq!(t, vec![rows[0].clone()]);
        assert_eq!(f, vec![rows[3].clone()]);
    }

    #[test]
    fn predicates_are_and_combined() {
        let rows = sales_rows();
        let out = filter(
            &rows,
            &[Predicate::equals("region", "EU"), Predicate::gt("sales", 60_i64)],
        );
        assert_eq!(out, vec![rows[0].clone()]);
    }

    #[test]
    fn predicate_deserializes_from_viewer_filter_state() {
        let json = r#"[
            {"field": "sales", "operator": "gt", "value": "99"},
            {"field": "sales", "operator": "lessThan", "value": 500},
            {"field": "region", "operator": "contains"}
        ]"#;
        let preds: Vec<Predicate> = serde_json::from_str(json).unwrap();
        assert_eq!(preds[0], Predicate::gt("sales", "99"));
        assert_eq!(preds[1], Predicate::lt("sales", 500_i64));
        assert_eq!(preds[2], Predicate::contains("region", ""));
    }
}
