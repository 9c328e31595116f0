//! CSV ingestion implementation.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{parse_bool, parse_datetime, ColumnKind, DataSet, Row, Schema, Value};

/// Ingest a CSV file into an in-memory [`DataSet`].
///
/// Rules:
///
/// - CSV must have headers.
/// - Every header becomes a row key, in header order.
/// - Columns described by the schema are parsed according to their kind; other columns stay text.
/// - Empty cells become [`Value::Null`].
pub fn ingest_csv_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr, schema)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "csv input has no header row".to_string(),
        });
    }

    let kinds: Vec<Option<ColumnKind>> = headers.iter().map(|h| schema.kind_of(h)).collect();

    let mut rows: Vec<Row> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let mut row = Row::with_capacity(headers.len());
        for (col_idx, header) in headers.iter().enumerate() {
            let raw = record.get(col_idx).unwrap_or("");
            let value = match kinds[col_idx] {
                Some(kind) => parse_typed_value(user_row, header, kind, raw)?,
                None => untyped_value(raw),
            };
            row.insert(header, value);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

fn untyped_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Value::Null
    } else {
        Value::Utf8(trimmed.to_owned())
    }
}

/// Parse a text cell according to its column kind.
pub(crate) fn parse_typed_value(
    row: usize,
    column: &str,
    kind: ColumnKind,
    raw: &str,
) -> IngestionResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let parse_error = |message: &str| IngestionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message: message.to_owned(),
    };

    match kind {
        ColumnKind::String => Ok(Value::Utf8(trimmed.to_owned())),
        ColumnKind::Number | ColumnKind::Currency => {
            if let Ok(v) = trimmed.parse::<i64>() {
                return Ok(Value::Int64(v));
            }
            trimmed
                .parse::<f64>()
                .map(Value::Float64)
                .map_err(|e| parse_error(&e.to_string()))
        }
        ColumnKind::Boolean => parse_bool(trimmed)
            .map(Value::Bool)
            .ok_or_else(|| parse_error("expected bool (true/false/1/0/yes/no)")),
        ColumnKind::Date => parse_datetime(trimmed)
            .map(Value::DateTime)
            .ok_or_else(|| parse_error("expected date (RFC 3339 or YYYY-MM-DD)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;
    use chrono::{TimeZone, Utc};

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("id", "ID", ColumnKind::Number),
            Column::new("date", "Date", ColumnKind::Date),
            Column::new("sales", "Sales", ColumnKind::Currency),
            Column::new("active", "Active", ColumnKind::Boolean),
        ])
    }

    fn read(input: &str) -> IngestionResult<DataSet> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes());
        ingest_csv_from_reader(&mut rdr, &schema())
    }

    #[test]
    fn typed_and_untyped_columns() {
        let ds = read("id,date,region,sales,active\n1,2023-03-04,EU,99.5,yes\n").unwrap();
        let row = &ds.rows[0];

        assert_eq!(
            row.keys().collect::<Vec<_>>(),
            vec!["id", "date", "region", "sales", "active"]
        );
        assert_eq!(row.get("id"), Some(&Value::Int64(1)));
        assert_eq!(
            row.get("date"),
            Some(&Value::DateTime(Utc.with_ymd_and_hms(2023, 3, 4, 0, 0, 0).unwrap()))
        );
        assert_eq!(row.get("region"), Some(&Value::from("EU")));
        assert_eq!(row.get("sales"), Some(&Value::Float64(99.5)));
        assert_eq!(row.get("active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn empty_cells_become_null() {
        let ds = read("id,region\n,\n").unwrap();
        assert_eq!(ds.rows[0].get("id"), Some(&Value::Null));
        assert_eq!(ds.rows[0].get("region"), Some(&Value::Null));
    }

    #[test]
    fn parse_error_reports_user_row() {
        let err = read("id,sales\n1,10\n2,lots\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("row 3"), "{msg}");
        assert!(msg.contains("column 'sales'"), "{msg}");
    }
}
