//! `data-grid-pipeline` is the query core of a tabular data viewer: it takes an in-memory
//! [`types::DataSet`] (column descriptors plus open rows) and produces the rows a grid shows for
//! the current filter/group/sort state, plus CSV exports and sample payloads for AI summaries.
//!
//! The primary entrypoint is [`processing::run_pipeline`], which applies a
//! [`processing::ViewQuery`] in a fixed order: **filter → aggregate → sort**. Every stage is a pure
//! function that never fails and never modifies its input.
//!
//! ## What the pipeline does
//!
//! - **Filter**: AND-combined predicates (`contains`, `equals`, `gt`, `lt`, `true`, `false`)
//! - **Aggregate**: optional grouping by one field; one summary row per group with `_groupKey`,
//!   `_count`, sums of every numeric/currency column, first-seen values for the rest
//! - **Sort**: stable ordering by one field, ascending or descending, total across value kinds
//! - **Export**: every field double-quoted, header from the first row's keys
//!
//! ## Quick example
//!
//! ```rust
//! use data_grid_pipeline::export::to_csv;
//! use data_grid_pipeline::processing::{run_pipeline, Predicate, SortSpec, ViewQuery};
//! use data_grid_pipeline::types::{Column, ColumnKind, DataSet, Row, Schema, Value};
//!
//! # fn main() -> Result<(), data_grid_pipeline::ExportError> {
//! let schema = Schema::new(vec![
//!     Column::new("product", "Product", ColumnKind::String),
//!     Column::new("active", "Active", ColumnKind::Boolean),
//!     Column::new("sales", "Sales", ColumnKind::Currency),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         Row::from([("product", Value::from("Widget")), ("active", Value::Bool(true)), ("sales", Value::from(120))]),
//!         Row::from([("product", Value::from("Gadget")), ("active", Value::Bool(false)), ("sales", Value::from(80))]),
//!         Row::from([("product", Value::from("Gizmo")), ("active", Value::Bool(true)), ("sales", Value::from(45))]),
//!     ],
//! );
//!
//! let query = ViewQuery::new()
//!     .with_filter(Predicate::contains("product", "g"))
//!     .with_sort(SortSpec::asc("sales"));
//! let rows = run_pipeline(&ds, &query);
//! assert_eq!(rows.len(), 3);
//! assert_eq!(rows[0].get("product"), Some(&Value::from("Gizmo")));
//!
//! let csv = to_csv(&rows)?.unwrap_or_default();
//! assert!(csv.starts_with("\"product\",\"active\",\"sales\"\n\"Gizmo\",\"true\",\"45\""));
//! # Ok(())
//! # }
//! ```
//!
//! ## Loading data
//!
//! ```no_run
//! use data_grid_pipeline::ingestion::{ingest_from_path, IngestionOptions};
//! use data_grid_pipeline::types::{Column, ColumnKind, Schema};
//!
//! # fn main() -> Result<(), data_grid_pipeline::IngestionError> {
//! let schema = Schema::new(vec![
//!     Column::new("date", "Date", ColumnKind::Date),
//!     Column::new("sales", "Sales", ColumnKind::Currency),
//! ]);
//! // Auto-detects by extension (.csv/.json/.ndjson/.parquet).
//! let ds = ingest_from_path("sales.csv", &schema, &IngestionOptions::default())?;
//! println!("rows={}", ds.row_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: column descriptors, values, rows, datasets
//! - [`processing`]: the filter/aggregate/sort stages and their composition
//! - [`export`]: CSV serialization of a result
//! - [`ingestion`]: CSV/JSON/Parquet loaders with observer hooks
//! - [`execution`]: parallel runner with throttling and metrics
//! - [`view`]: interactive view state with a memoised result
//! - [`insights`]: bounded sample + prompt shaping for text summaries
//! - [`format`], [`chart`]: display helpers
//! - [`error`]: error types

pub mod chart;
pub mod error;
pub mod execution;
pub mod export;
pub mod format;
pub mod ingestion;
pub mod insights;
pub mod processing;
pub mod types;
pub mod view;

pub use error::{
    ExecutionError, ExportError, ExportResult, IngestionError, IngestionResult, InsightError, InsightResult,
};
