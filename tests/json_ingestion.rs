use chrono::{TimeZone, Utc};

use data_grid_pipeline::ingestion::json::{ingest_json_from_path, ingest_json_from_str};
use data_grid_pipeline::types::{Column, ColumnKind, Schema, Value};

fn sales_schema() -> Schema {
    Schema::new(vec![
        Column::new("id", "ID", ColumnKind::Number),
        Column::new("date", "Date", ColumnKind::Date),
        Column::new("product", "Product", ColumnKind::String),
        Column::new("sales", "Sales", ColumnKind::Currency),
        Column::new("active", "Active", ColumnKind::Boolean),
    ])
}

#[test]
fn ingest_json_array_file() {
    let ds = ingest_json_from_path("tests/fixtures/sales.json", &sales_schema()).unwrap();
    assert_eq!(ds.row_count(), 3);

    let second = &ds.rows[1];
    assert_eq!(second.get("sales"), Some(&Value::Int64(850)));
    assert_eq!(second.get("active"), Some(&Value::Bool(false)));
    assert_eq!(second.get("note"), Some(&Value::Null));

    let third = &ds.rows[2];
    assert_eq!(
        third.get("date"),
        Some(&Value::DateTime(Utc.with_ymd_and_hms(2023, 1, 7, 9, 30, 0).unwrap()))
    );
    assert_eq!(third.get("active"), Some(&Value::Bool(true)));
    assert_eq!(third.get("note"), Some(&Value::from("promo \"spring\"")));
}

#[test]
fn rows_keep_document_key_order() {
    let ds = ingest_json_from_path("tests/fixtures/sales.json", &sales_schema()).unwrap();
    assert_eq!(
        ds.rows[0].keys().collect::<Vec<_>>(),
        vec!["id", "date", "product", "region", "sales", "units", "active", "note"]
    );
    // `units` is not in the schema and keeps its JSON number type.
    assert_eq!(ds.rows[0].get("units"), Some(&Value::Int64(10)));
}

#[test]
fn ingest_ndjson_file() {
    let ds = ingest_json_from_path("tests/fixtures/sales.ndjson", &sales_schema()).unwrap();
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[1].get("sales"), Some(&Value::Float64(20.5)));
}

#[test]
fn epoch_millis_in_date_column() {
    let ds = ingest_json_from_str(r#"{"date": 1672876800000}"#, &sales_schema()).unwrap();
    assert_eq!(
        ds.rows[0].get("date"),
        Some(&Value::DateTime(Utc.with_ymd_and_hms(2023, 1, 5, 0, 0, 0).unwrap()))
    );
}

#[test]
fn empty_input_errors() {
    let err = ingest_json_from_str("   ", &sales_schema()).unwrap_err();
    assert!(err.to_string().contains("json input is empty"));
}
