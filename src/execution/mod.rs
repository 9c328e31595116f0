//! Execution engine for running view queries, one or many at a time.
//!
//! A single query always runs on the calling thread, stage after stage, exactly as
//! [`crate::processing::run_pipeline`] does. Parallelism only exists between queries:
//! [`ExecutionEngine::run_many`] hands independent queries over one shared, read-only dataset to a
//! rayon pool. On top of that the engine adds:
//!
//! - per-stage and per-query events for an [`ExecutionObserver`]
//! - counters readable at any time through [`ExecutionMetrics`]

mod observer;

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::ExecutionError;
use crate::processing::{run_pipeline_reporting, ViewQuery};
use crate::types::{DataSet, Row};

pub use crate::processing::{PipelineStage, StageReport};
pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, StdErrExecutionObserver,
};

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Worker threads for [`ExecutionEngine::run_many`].
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
}

impl ExecutionOptions {
    fn validate(&self) -> Result<(), ExecutionError> {
        if self.num_threads == Some(0) {
            return Err(ExecutionError::InvalidOptions(
                "num_threads must be > 0 when set".to_string(),
            ));
        }
        Ok(())
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Runs [`ViewQuery`] pipelines over an in-memory [`DataSet`] and reports on them.
pub struct ExecutionEngine {
    pool: ThreadPool,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails if `num_threads == Some(0)` or the worker pool cannot be started.
    pub fn try_new(opts: ExecutionOptions) -> Result<Self, ExecutionError> {
        opts.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.num_threads.unwrap_or_else(available_parallelism))
            .build()?;

        Ok(Self {
            pool,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events.
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to the execution counters.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run one query on the calling thread. The result equals `run_pipeline(dataset, query)`.
    pub fn run(&self, dataset: &DataSet, query: &ViewQuery) -> Vec<Row> {
        let start = Instant::now();
        self.begin(dataset, 1);
        let out = self.run_one(dataset, query);
        self.finish(start);
        out
    }

    /// Run independent queries over one shared dataset in parallel.
    ///
    /// Each query is a complete, sequential pipeline run; the dataset is only read. Results are
    /// returned in query order.
    pub fn run_many(&self, dataset: &DataSet, queries: &[ViewQuery]) -> Vec<Vec<Row>> {
        let start = Instant::now();
        self.begin(dataset, queries.len());

        let results: Vec<Vec<Row>> = self.pool.install(|| {
            queries
                .par_iter()
                .enumerate()
                .map(|(index, query)| {
                    let started = Instant::now();
                    let out = self.run_one(dataset, query);
                    self.emit(ExecutionEvent::QueryFinished {
                        index,
                        output_rows: out.len(),
                        elapsed: started.elapsed(),
                    });
                    out
                })
                .collect()
        });

        self.finish(start);
        results
    }

    fn run_one(&self, dataset: &DataSet, query: &ViewQuery) -> Vec<Row> {
        let out = run_pipeline_reporting(dataset, query, |report| {
            self.emit(ExecutionEvent::StageFinished(report));
        });
        self.metrics.on_query_finished(dataset.row_count(), out.len());
        out
    }

    fn begin(&self, dataset: &DataSet, queries: usize) {
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            input_rows: dataset.row_count(),
            queries,
        });
    }

    fn finish(&self, start: Instant) {
        let elapsed = start.elapsed();
        self.metrics.end_run(elapsed);
        self.emit(ExecutionEvent::RunFinished {
            elapsed,
            metrics: self.metrics.snapshot(),
        });
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}
