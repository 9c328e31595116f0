//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single object: `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Object keys keep their document order. Keys described by the schema are converted according to
//! their column kind; other keys keep their natural JSON type.

use std::fs;
use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{ColumnKind, DataSet, Row, Schema, Value};

use super::csv::parse_typed_value;

/// Ingest a JSON file into an in-memory [`DataSet`].
pub fn ingest_json_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let text = fs::read_to_string(path)?;
    ingest_json_from_str(&text, schema)
}

/// Ingest JSON from an in-memory string into a [`DataSet`].
pub fn ingest_json_from_str(input: &str, schema: &Schema) -> IngestionResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => ingest_json_values(&items, schema),
            serde_json::Value::Object(_) => ingest_json_values(std::slice::from_ref(&v), schema),
            _ => Err(IngestionError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for line in trimmed.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            values.push(serde_json::from_str::<serde_json::Value>(line)?);
        }
        ingest_json_values(&values, schema)
    }
}

fn ingest_json_values(values: &[serde_json::Value], schema: &Schema) -> IngestionResult<DataSet> {
    let mut rows: Vec<Row> = Vec::with_capacity(values.len());

    for (idx0, v) in values.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = v.as_object().ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!("row {row_num} is not a json object"),
        })?;

        let mut row = Row::with_capacity(obj.len());
        for (key, jv) in obj {
            let value = match schema.kind_of(key) {
                Some(kind) => convert_json_value(row_num, key, kind, jv)?,
                None => natural_value(jv),
            };
            row.insert(key.as_str(), value);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

/// Value for a key the schema does not describe.
fn natural_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::Utf8(s.clone()),
        other => Value::Utf8(other.to_string()),
    }
}

fn convert_json_value(
    row: usize,
    column: &str,
    kind: ColumnKind,
    v: &serde_json::Value,
) -> IngestionResult<Value> {
    if v.is_null() {
        return Ok(Value::Null);
    }
    // Typed columns accept their value as text too ("42", "true", "2023-01-05").
    if let Some(s) = v.as_str() {
        return parse_typed_value(row, column, kind, s);
    }

    let mismatch = |message: &str| IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw: v.to_string(),
        message: message.to_string(),
    };

    match kind {
        ColumnKind::String => Ok(natural_value(v)),
        ColumnKind::Boolean => v.as_bool().map(Value::Bool).ok_or_else(|| mismatch("expected bool")),
        ColumnKind::Number | ColumnKind::Currency => match v.as_i64() {
            Some(i) => Ok(Value::Int64(i)),
            None => v.as_f64().map(Value::Float64).ok_or_else(|| mismatch("expected number")),
        },
        ColumnKind::Date => v
            .as_i64()
            .and_then(chrono::DateTime::from_timestamp_millis)
            .map(Value::DateTime)
            .ok_or_else(|| mismatch("expected date string or epoch milliseconds")),
    }
}
