//! Aggregation stage: collapses rows into one summary row per group.

use std::collections::HashMap;

use crate::types::{Row, Schema, Value};

/// Field holding the stringified group key on an aggregation result row.
pub const GROUP_KEY_FIELD: &str = "_groupKey";

/// Field holding the number of member rows on an aggregation result row.
pub const COUNT_FIELD: &str = "_count";

/// Group `rows` by the stringified value of `group_by`.
///
/// - `None` returns the rows unchanged.
/// - Rows whose group field prints identically share a group; a missing field and `Null` both
///   print as the empty string.
/// - Each output row carries [`GROUP_KEY_FIELD`], [`COUNT_FIELD`], the first member's original
///   group value, a `Float64` sum for every other numeric schema column (cells without a
///   numeric reading add 0), and the first member's value for the remaining schema columns.
/// - Groups appear in the order their key is first seen.
pub fn aggregate(rows: &[Row], group_by: Option<&str>, schema: &Schema) -> Vec<Row> {
    let Some(group_field) = group_by else {
        return rows.to_vec();
    };

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupAccumulator> = Vec::new();

    for row in rows {
        let representative = row.get(group_field).cloned().unwrap_or(Value::Null);
        let key = representative.to_display_string();

        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                groups.push(GroupAccumulator::new(key.clone(), group_field, representative, row, schema));
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].add(row, group_field, schema);
    }

    groups.into_iter().map(GroupAccumulator::finish).collect()
}

struct GroupAccumulator {
    row: Row,
    count: i64,
}

impl GroupAccumulator {
    fn new(key: String, group_field: &str, representative: Value, first: &Row, schema: &Schema) -> Self {
        let mut row = Row::with_capacity(schema.columns.len() + 3);
        row.insert(GROUP_KEY_FIELD, Value::Utf8(key));
        row.insert(COUNT_FIELD, Value::Int64(0));
        row.insert(group_field, representative);

        for col in schema.columns.iter().filter(|c| c.field != group_field) {
            if col.kind.is_numeric() {
                row.insert(col.field.as_str(), Value::Float64(0.0));
            } else {
                let first_value = first.get(&col.field).cloned().unwrap_or(Value::Null);
                row.insert(col.field.as_str(), first_value);
            }
        }

        Self { row, count: 0 }
    }

    fn add(&mut self, member: &Row, group_field: &str, schema: &Schema) {
        self.count += 1;
        for col in schema.numeric_columns().filter(|c| c.field != group_field) {
            let contribution = member
                .get(&col.field)
                .and_then(Value::to_number)
                .unwrap_or(0.0);
            let sum = self
                .row
                .get(&col.field)
                .and_then(Value::to_number)
                .unwrap_or(0.0);
            self.row.insert(col.field.as_str(), Value::Float64(sum + contribution));
        }
    }

    fn finish(mut self) -> Row {
        self.row.insert(COUNT_FIELD, Value::Int64(self.count));
        self.row
    }
}
