use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for CSV export.
pub type ExportResult<T> = Result<T, ExportError>;

/// Convenience result type for insight providers.
pub type InsightResult<T> = Result<T, InsightError>;

/// Error type returned by ingestion functions.
///
/// This is a single error enum shared across CSV/JSON/Parquet ingestion.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Parquet ingestion error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Malformed JSON input.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input does not have the expected shape (no headers, non-object rows, unknown format).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the kind its column declares.
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Error type returned by CSV export sinks.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing to the sink failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV writer rejected a record.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The produced bytes were not UTF-8.
    #[error("export produced invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Error type returned by insight providers.
///
/// These never escape [`crate::insights::summarize`]; they are reported to an observer and
/// replaced by a fixed message.
#[derive(Debug, Error)]
pub enum InsightError {
    /// No API key configured for the provider.
    #[error("missing api key: {0}")]
    MissingApiKey(String),

    /// Transport-level failure.
    #[error("http request failed: {0}")]
    Http(String),

    /// The provider answered with an error status.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The provider's response could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The data sample could not be rendered as JSON.
    #[error("failed to serialize data sample: {0}")]
    Sample(#[from] serde_json::Error),
}

/// Error type returned when building an execution engine.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Engine options are out of range.
    #[error("invalid execution options: {0}")]
    InvalidOptions(String),

    /// The worker pool could not be started.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
