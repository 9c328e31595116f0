//! Sort stage: stable ordering by a single field.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{Row, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

/// Field and direction to sort by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// Row field to compare.
    pub field: String,
    /// Direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Compare two rows under this spec.
    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let ordering = compare_cells(a.get(&self.field), b.get(&self.field));
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

static NULL: Value = Value::Null;

/// Compare two optional cells; a missing field orders like [`Value::Null`].
pub fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    a.unwrap_or(&NULL).total_cmp(b.unwrap_or(&NULL))
}

/// Returns the rows ordered by `spec`.
///
/// The sort is stable in both directions: rows with equal keys keep their input order.
/// `None` returns the rows unchanged.
pub fn sort(rows: &[Row], spec: Option<&SortSpec>) -> Vec<Row> {
    let mut out = rows.to_vec();
    if let Some(spec) = spec {
        out.sort_by(|a, b| spec.compare(a, b));
    }
    out
}
