//! Interactive view state over one immutable dataset.
//!
//! A [`DataView`] holds the current [`ViewQuery`] and the memoised pipeline result. Every state
//! change drops the cached result; [`DataView::rows`] recomputes it from the source dataset on the
//! next read.

use std::cell::OnceCell;
use std::sync::Arc;

use crate::error::ExportResult;
use crate::export::to_csv;
use crate::insights::{InsightOptions, InsightRequest};
use crate::processing::{run_pipeline, Predicate, SortDirection, SortSpec, ViewQuery};
use crate::types::{DataSet, Row, Schema};

/// Filter/sort/group state plus its cached result.
#[derive(Debug, Clone)]
pub struct DataView {
    dataset: Arc<DataSet>,
    query: ViewQuery,
    rows: OnceCell<Vec<Row>>,
}

impl DataView {
    /// A view with no filters, grouping or sort.
    pub fn new(dataset: impl Into<Arc<DataSet>>) -> Self {
        Self::with_query(dataset, ViewQuery::default())
    }

    /// A view starting from `query`.
    pub fn with_query(dataset: impl Into<Arc<DataSet>>, query: ViewQuery) -> Self {
        Self {
            dataset: dataset.into(),
            query,
            rows: OnceCell::new(),
        }
    }

    /// The source dataset.
    pub fn dataset(&self) -> &Arc<DataSet> {
        &self.dataset
    }

    /// Column descriptors of the underlying dataset.
    pub fn schema(&self) -> &Schema {
        &self.dataset.schema
    }

    /// Current query.
    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    /// Replace the whole query.
    pub fn set_query(&mut self, query: ViewQuery) {
        self.query = query;
        self.invalidate();
    }

    /// Append an empty `contains` filter on the first schema column.
    ///
    /// Returns the new filter's index, or `None` when the schema has no columns.
    pub fn add_filter(&mut self) -> Option<usize> {
        let field = self.dataset.schema.columns.first()?.field.clone();
        self.query.filters.push(Predicate::contains(field, ""));
        self.invalidate();
        Some(self.query.filters.len() - 1)
    }

    /// Replace the filter at `index`. Returns `false` if there is none.
    pub fn update_filter(&mut self, index: usize, predicate: Predicate) -> bool {
        let Some(slot) = self.query.filters.get_mut(index) else {
            return false;
        };
        *slot = predicate;
        self.invalidate();
        true
    }

    /// Remove and return the filter at `index`.
    pub fn remove_filter(&mut self, index: usize) -> Option<Predicate> {
        if index >= self.query.filters.len() {
            return None;
        }
        let removed = self.query.filters.remove(index);
        self.invalidate();
        Some(removed)
    }

    /// Drop every predicate; grouping and sorting are kept.
    pub fn clear_filters(&mut self) {
        if !self.query.filters.is_empty() {
            self.query.filters.clear();
            self.invalidate();
        }
    }

    /// Cycle the sort on `field`: none → ascending → descending → none.
    ///
    /// Toggling a different field than the current one starts again at ascending.
    pub fn toggle_sort(&mut self, field: &str) -> Option<&SortSpec> {
        self.query.sort = match self.query.sort.take() {
            Some(spec) if spec.field == field => match spec.direction {
                SortDirection::Asc => Some(SortSpec::desc(field)),
                SortDirection::Desc => None,
            },
            _ => Some(SortSpec::asc(field)),
        };
        self.invalidate();
        self.query.sort.as_ref()
    }

    /// Set or clear the group field.
    pub fn set_group_by(&mut self, field: Option<&str>) {
        let field = field.map(str::to_owned);
        if self.query.group_by != field {
            self.query.group_by = field;
            self.invalidate();
        }
    }

    /// Pipeline result for the current query.
    pub fn rows(&self) -> &[Row] {
        self.rows.get_or_init(|| run_pipeline(&self.dataset, &self.query))
    }

    /// Number of rows in the current result.
    pub fn row_count(&self) -> usize {
        self.rows().len()
    }

    /// CSV text of the current result, `None` when it is empty.
    pub fn to_csv(&self) -> ExportResult<Option<String>> {
        to_csv(self.rows())
    }

    /// Summary request for the current result.
    pub fn insight_request(&self, options: &InsightOptions) -> InsightRequest {
        InsightRequest::from_rows(self.rows(), &self.dataset.schema, options)
    }

    fn invalidate(&mut self) {
        self.rows.take();
    }
}
