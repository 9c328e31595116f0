//! The filter → aggregate → sort composition.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::types::{DataSet, Row};

use super::aggregate::aggregate;
use super::filter::{filter, Predicate};
use super::sort::{sort, SortSpec};

/// Parameters of one pipeline run.
///
/// Every field defaults to "off": no filters, no grouping, no sort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewQuery {
    /// AND-combined predicates.
    pub filters: Vec<Predicate>,
    /// Field to group by, if any.
    pub group_by: Option<String>,
    /// Sort to apply after grouping, if any.
    pub sort: Option<SortSpec>,
}

impl ViewQuery {
    /// A query with no filters, grouping or sort.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter predicate.
    pub fn with_filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Group by `field`.
    pub fn with_group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by = Some(field.into());
        self
    }

    /// Sort by `spec`.
    pub fn with_sort(mut self, spec: SortSpec) -> Self {
        self.sort = Some(spec);
        self
    }
}

/// One of the three pipeline stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Predicate matching.
    Filter,
    /// Grouping with counts and column sums.
    Aggregate,
    /// Stable single-field ordering.
    Sort,
}

impl PipelineStage {
    /// Lowercase name used in log lines: `filter`, `aggregate` or `sort`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Aggregate => "aggregate",
            Self::Sort => "sort",
        }
    }
}

/// Row counts and timing of one executed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub stage: PipelineStage,
    /// Rows handed to the stage.
    pub input_rows: usize,
    pub output_rows: usize,
    pub elapsed: Duration,
}

/// Run `query` over the dataset's rows: filter, then aggregate, then sort.
///
/// The dataset is never modified; the result is always a fresh vector.
pub fn run_pipeline(dataset: &DataSet, query: &ViewQuery) -> Vec<Row> {
    run_pipeline_reporting(dataset, query, |_| {})
}

/// [`run_pipeline`], calling `on_stage` after each stage that ran.
///
/// Filtering always runs; aggregation and sorting only when the query asks for them.
pub fn run_pipeline_reporting(
    dataset: &DataSet,
    query: &ViewQuery,
    mut on_stage: impl FnMut(StageReport),
) -> Vec<Row> {
    let started = Instant::now();
    let filtered = filter(&dataset.rows, &query.filters);
    on_stage(StageReport {
        stage: PipelineStage::Filter,
        input_rows: dataset.rows.len(),
        output_rows: filtered.len(),
        elapsed: started.elapsed(),
    });

    let grouped = match query.group_by.as_deref() {
        Some(field) => {
            let started = Instant::now();
            let out = aggregate(&filtered, Some(field), &dataset.schema);
            on_stage(StageReport {
                stage: PipelineStage::Aggregate,
                input_rows: filtered.len(),
                output_rows: out.len(),
                elapsed: started.elapsed(),
            });
            out
        }
        None => filtered,
    };

    match query.sort.as_ref() {
        Some(spec) => {
            let started = Instant::now();
            let out = sort(&grouped, Some(spec));
            on_stage(StageReport {
                stage: PipelineStage::Sort,
                input_rows: grouped.len(),
                output_rows: out.len(),
                elapsed: started.elapsed(),
            });
            out
        }
        None => grouped,
    }
}
