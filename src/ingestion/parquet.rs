//! Parquet ingestion implementation.

use std::path::Path;

use chrono::{DateTime, Days, NaiveDate, Utc};
use parquet::file::reader::FileReader;
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::Field;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{ColumnKind, DataSet, Row, Schema, Value};

use super::csv::parse_typed_value;

/// Ingest a Parquet file into an in-memory [`DataSet`].
///
/// Notes:
/// - Every top-level column of the file becomes a row key, in file order
/// - Columns described by the schema are converted according to their kind
/// - Uses the Parquet record API (`RowIter`)
pub fn ingest_parquet_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let reader = SerializedFileReader::try_from(path.as_ref())?;
    let expected_rows = usize::try_from(reader.metadata().file_metadata().num_rows()).unwrap_or(0);

    let mut rows: Vec<Row> = Vec::with_capacity(expected_rows);
    for (idx0, row_res) in reader.into_iter().enumerate() {
        let row_num = idx0 + 1;
        let record = row_res?;

        let mut row = Row::with_capacity(record.len());
        for (name, field) in record.get_column_iter() {
            let value = match schema.kind_of(name) {
                Some(kind) => convert_parquet_field(row_num, name, kind, field)?,
                None => natural_value(field),
            };
            row.insert(name.as_str(), value);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

fn integer_of(f: &Field) -> Option<i64> {
    match f {
        Field::Byte(v) => Some(i64::from(*v)),
        Field::Short(v) => Some(i64::from(*v)),
        Field::Int(v) => Some(i64::from(*v)),
        Field::Long(v) => Some(*v),
        Field::UByte(v) => Some(i64::from(*v)),
        Field::UShort(v) => Some(i64::from(*v)),
        Field::UInt(v) => Some(i64::from(*v)),
        Field::ULong(v) => i64::try_from(*v).ok(),
        _ => None,
    }
}

fn datetime_of(f: &Field) -> Option<DateTime<Utc>> {
    match f {
        Field::Date(days) => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
            let date = if *days >= 0 {
                epoch.checked_add_days(Days::new(u64::from(days.unsigned_abs())))?
            } else {
                epoch.checked_sub_days(Days::new(u64::from(days.unsigned_abs())))?
            };
            date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
        }
        Field::TimestampMillis(ms) => DateTime::from_timestamp_millis(*ms),
        Field::TimestampMicros(us) => DateTime::from_timestamp_micros(*us),
        _ => None,
    }
}

/// Value for a column the schema does not describe.
fn natural_value(f: &Field) -> Value {
    if let Some(i) = integer_of(f) {
        return Value::Int64(i);
    }
    if let Some(dt) = datetime_of(f) {
        return Value::DateTime(dt);
    }
    match f {
        Field::Null => Value::Null,
        Field::Bool(b) => Value::Bool(*b),
        Field::Float(v) => Value::Float64(f64::from(*v)),
        Field::Double(v) => Value::Float64(*v),
        Field::Str(s) => Value::Utf8(s.clone()),
        other => Value::Utf8(other.to_string()),
    }
}

fn convert_parquet_field(row: usize, column: &str, kind: ColumnKind, f: &Field) -> IngestionResult<Value> {
    match f {
        Field::Null => return Ok(Value::Null),
        Field::Str(s) => return parse_typed_value(row, column, kind, s),
        _ => {}
    }

    let mismatch = |message: &str| IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw: f.to_string(),
        message: message.to_string(),
    };

    match kind {
        ColumnKind::String => Ok(Value::Utf8(f.to_string())),
        ColumnKind::Boolean => match f {
            Field::Bool(b) => Ok(Value::Bool(*b)),
            _ => Err(mismatch("expected bool")),
        },
        ColumnKind::Number | ColumnKind::Currency => match f {
            Field::Float(v) => Ok(Value::Float64(f64::from(*v))),
            Field::Double(v) => Ok(Value::Float64(*v)),
            _ => integer_of(f)
                .map(Value::Int64)
                .ok_or_else(|| mismatch("expected number")),
        },
        ColumnKind::Date => datetime_of(f)
            .map(Value::DateTime)
            .ok_or_else(|| mismatch("expected date or timestamp")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dates_count_days_from_epoch() {
        let expected = Utc.with_ymd_and_hms(2023, 1, 5, 0, 0, 0).unwrap();
        let days = (expected.timestamp() / 86_400) as i32;
        assert_eq!(datetime_of(&Field::Date(days)), Some(expected));
        assert_eq!(
            datetime_of(&Field::Date(-1)),
            Some(Utc.with_ymd_and_hms(1969, 12, 31, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn timestamps_convert_to_utc() {
        let expected = Utc.with_ymd_and_hms(2023, 1, 5, 12, 30, 0).unwrap();
        let ms = expected.timestamp_millis();
        assert_eq!(datetime_of(&Field::TimestampMillis(ms)), Some(expected));
        assert_eq!(datetime_of(&Field::TimestampMicros(ms * 1000)), Some(expected));
    }

    #[test]
    fn typed_conversion() {
        assert_eq!(
            convert_parquet_field(1, "sales", ColumnKind::Currency, &Field::Int(7)).unwrap(),
            Value::Int64(7)
        );
        assert_eq!(
            convert_parquet_field(1, "sales", ColumnKind::Number, &Field::Str("2.5".into())).unwrap(),
            Value::Float64(2.5)
        );
        let err = convert_parquet_field(4, "active", ColumnKind::Boolean, &Field::Int(2)).unwrap_err();
        assert!(err.to_string().contains("row 4"));
    }

    #[test]
    fn unknown_columns_keep_their_type() {
        assert_eq!(natural_value(&Field::Long(9)), Value::Int64(9));
        assert_eq!(natural_value(&Field::Double(1.5)), Value::Float64(1.5));
        assert_eq!(natural_value(&Field::Str("x".into())), Value::from("x"));
        assert_eq!(natural_value(&Field::Null), Value::Null);
    }
}
