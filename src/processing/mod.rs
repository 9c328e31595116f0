//! In-memory query pipeline.
//!
//! A pipeline run is three pure stages applied in a fixed order:
//!
//! - [`filter()`]: keeps rows matching every [`Predicate`]
//! - [`aggregate()`]: optionally collapses rows into one summary row per group
//! - [`sort()`]: stable ordering by one field
//!
//! [`run_pipeline`] composes them for a [`ViewQuery`]. None of the stages fail or modify their
//! input; each returns a new vector.
//!
//! ## Example: filter → group → sort
//!
//! ```rust
//! use data_grid_pipeline::processing::{run_pipeline, Predicate, SortSpec, ViewQuery, COUNT_FIELD};
//! use data_grid_pipeline::types::{Column, ColumnKind, DataSet, Row, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Column::new("region", "Region", ColumnKind::String),
//!     Column::new("sales", "Sales", ColumnKind::Currency),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         Row::from([("region", Value::from("EU")), ("sales", Value::from(100))]),
//!         Row::from([("region", Value::from("US")), ("sales", Value::from(200))]),
//!         Row::from([("region", Value::from("EU")), ("sales", Value::from(50))]),
//!     ],
//! );
//!
//! let query = ViewQuery::new()
//!     .with_filter(Predicate::gt("sales", "10"))
//!     .with_group_by("region")
//!     .with_sort(SortSpec::desc("sales"));
//! let out = run_pipeline(&ds, &query);
//!
//! assert_eq!(out[0].get("region"), Some(&Value::from("US")));
//! assert_eq!(out[1].get("sales"), Some(&Value::Float64(150.0)));
//! assert_eq!(out[1].get(COUNT_FIELD), Some(&Value::Int64(2)));
//! ```

pub mod aggregate;
pub mod filter;
pub mod pipeline;
pub mod sort;

pub use aggregate::{aggregate, COUNT_FIELD, GROUP_KEY_FIELD};
pub use filter::{filter, matches_all, Comparand, FilterOperator, Predicate};
pub use pipeline::{run_pipeline, run_pipeline_reporting, PipelineStage, StageReport, ViewQuery};
pub use sort::{compare_cells, sort, SortDirection, SortSpec};
