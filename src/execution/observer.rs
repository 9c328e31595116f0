use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::processing::StageReport;

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    /// A `run` or `run_many` call began.
    RunStarted { input_rows: usize, queries: usize },
    /// One stage of one query finished.
    StageFinished(StageReport),
    /// One query of a `run_many` batch finished.
    QueryFinished {
        index: usize,
        output_rows: usize,
        elapsed: Duration,
    },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

impl fmt::Display for ExecutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted { input_rows, queries } => {
                write!(f, "[execute][start] input_rows={input_rows} queries={queries}")
            }
            Self::StageFinished(report) => write!(
                f,
                "[execute][{}] input_rows={} output_rows={} elapsed_us={}",
                report.stage.as_str(),
                report.input_rows,
                report.output_rows,
                report.elapsed.as_micros()
            ),
            Self::QueryFinished {
                index,
                output_rows,
                elapsed,
            } => write!(
                f,
                "[execute][query] index={index} output_rows={output_rows} elapsed_us={}",
                elapsed.as_micros()
            ),
            Self::RunFinished { elapsed, metrics } => {
                write!(f, "[execute][done] elapsed_us={} {metrics}", elapsed.as_micros())
            }
        }
    }
}

/// Observer hook for execution events.
///
/// `run_many` calls it from pool threads, so events of different queries may interleave.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Writes one line per execution event to stderr.
#[derive(Debug, Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        eprintln!("{event}");
    }
}

/// Counters for the most recent `run` or `run_many` call.
#[derive(Debug, Default)]
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,
    queries_finished: AtomicU64,
    rows_processed: AtomicU64,
    rows_emitted: AtomicU64,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);
        for counter in [
            &self.elapsed_ns,
            &self.queries_finished,
            &self.rows_processed,
            &self.rows_emitted,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
    }

    pub(crate) fn on_query_finished(&self, input_rows: usize, output_rows: usize) {
        let _ = self.queries_finished.fetch_add(1, Ordering::SeqCst);
        let _ = self.rows_processed.fetch_add(input_rows as u64, Ordering::SeqCst);
        let _ = self.rows_emitted.fetch_add(output_rows as u64, Ordering::SeqCst);
    }

    pub(crate) fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns.store(saturating_nanos(elapsed), Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            queries_finished: self.queries_finished.load(Ordering::SeqCst),
            rows_processed: self.rows_processed.load(Ordering::SeqCst),
            rows_emitted: self.rows_emitted.load(Ordering::SeqCst),
        }
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    /// `None` while a run is still in progress.
    pub elapsed: Option<Duration>,
    pub queries_finished: u64,
    /// Source rows read, summed over queries.
    pub rows_processed: u64,
    /// Result rows, summed over queries.
    pub rows_emitted: u64,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={} queries={} rows_processed={} rows_emitted={}",
            self.run_id, self.queries_finished, self.rows_processed, self.rows_emitted
        )
    }
}
