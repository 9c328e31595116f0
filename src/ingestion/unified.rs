//! Path-based loading with format detection and outcome reporting.
//!
//! [`ingest_from_path`] picks a loader from the file extension unless [`IngestionOptions::format`]
//! pins one, times the load, and reports the outcome to the configured observer.

use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Schema};

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::{csv, json, parquet};

/// File formats a dataset can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestionFormat {
    Csv,
    /// Array of objects, a single object, or one object per line.
    Json,
    Parquet,
}

impl IngestionFormat {
    /// Format for a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        [
            ("csv", Self::Csv),
            ("json", Self::Json),
            ("ndjson", Self::Json),
            ("parquet", Self::Parquet),
            ("pq", Self::Parquet),
        ]
        .into_iter()
        .find_map(|(known, format)| (known == ext).then_some(format))
    }

    /// Format for `path`, judged by its extension.
    pub fn from_path(path: &Path) -> IngestionResult<Self> {
        let unknown = |detail: String| IngestionError::SchemaMismatch {
            message: format!("{detail} ({})", path.display()),
        };
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| unknown("cannot infer format: path has no extension".to_string()))?;
        Self::from_extension(ext).ok_or_else(|| unknown(format!("cannot infer format from extension '{ext}'")))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Parquet => "parquet",
        }
    }

    fn load(self, path: &Path, schema: &Schema) -> IngestionResult<DataSet> {
        match self {
            Self::Csv => csv::ingest_csv_from_path(path, schema),
            Self::Json => json::ingest_json_from_path(path, schema),
            Self::Parquet => parquet::ingest_parquet_from_path(path, schema),
        }
    }
}

impl fmt::Display for IngestionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs for [`ingest_from_path`]. The default detects the format and only alerts on critical
/// failures.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Pinned format; `None` detects it from the extension.
    pub format: Option<IngestionFormat>,
    /// Receives one callback per load.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Failures at or above this severity also go to `on_alert`.
    pub alert_at_or_above: IngestionSeverity,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

/// Load the file at `path` into a [`DataSet`] typed by `schema`.
///
/// With an observer configured, a successful load produces `on_success` (row count and elapsed
/// time); a failed one produces `on_failure`, plus `on_alert` once its severity reaches
/// `options.alert_at_or_above`. A path whose format cannot be detected fails before any
/// observer call.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use data_grid_pipeline::ingestion::{ingest_from_path, IngestionOptions, StdErrObserver};
/// use data_grid_pipeline::types::{Column, ColumnKind, Schema};
///
/// # fn main() -> Result<(), data_grid_pipeline::IngestionError> {
/// let schema = Schema::new(vec![Column::new("sales", "Sales", ColumnKind::Currency)]);
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     ..Default::default()
/// };
/// let ds = ingest_from_path("exports/q3.ndjson", &schema, &opts)?;
/// assert!(ds.rows.iter().all(|row| row.contains_key("sales")));
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &IngestionOptions,
) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let format = match options.format {
        Some(format) => format,
        None => IngestionFormat::from_path(path)?,
    };

    let started = Instant::now();
    let result = format.load(path, schema);

    if let Some(observer) = options.observer.as_deref() {
        let ctx = IngestionContext {
            path: path.to_path_buf(),
            format,
        };
        report(observer, &ctx, &result, started, options.alert_at_or_above);
    }
    result
}

fn report(
    observer: &dyn IngestionObserver,
    ctx: &IngestionContext,
    result: &IngestionResult<DataSet>,
    started: Instant,
    alert_at_or_above: IngestionSeverity,
) {
    match result {
        Ok(ds) => observer.on_success(
            ctx,
            IngestionStats {
                rows: ds.row_count(),
                elapsed: started.elapsed(),
            },
        ),
        Err(err) => {
            let severity = severity_for_error(err);
            observer.on_failure(ctx, severity, err);
            if severity >= alert_at_or_above {
                observer.on_alert(ctx, severity, err);
            }
        }
    }
}

/// `Critical` when the failure comes from the filesystem, `Error` when the input itself is bad.
pub fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    let io_backed = match e {
        IngestionError::Io(_) => true,
        IngestionError::Csv(err) => matches!(err.kind(), ::csv::ErrorKind::Io(_)),
        IngestionError::Parquet(err) => caused_by_io(err),
        IngestionError::Json(err) => err.is_io(),
        IngestionError::SchemaMismatch { .. } | IngestionError::ParseError { .. } => false,
    };
    if io_backed {
        IngestionSeverity::Critical
    } else {
        IngestionSeverity::Error
    }
}

fn caused_by_io(e: &(dyn StdError + 'static)) -> bool {
    std::iter::successors(Some(e), |&err| err.source()).any(|err| err.is::<std::io::Error>())
}

/// A load described by owned values, runnable later or on another thread.
#[derive(Clone)]
pub struct IngestionRequest {
    /// File to load; its extension picks the format unless the options pin one.
    pub path: PathBuf,
    /// Columns to coerce while loading.
    pub schema: Schema,
    pub options: IngestionOptions,
}

impl IngestionRequest {
    /// Request with default options.
    pub fn new(path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            path: path.into(),
            schema,
            options: IngestionOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: IngestionOptions) -> Self {
        self.options = options;
        self
    }

    /// Load the file now, on the calling thread.
    pub fn run(&self) -> IngestionResult<DataSet> {
        ingest_from_path(&self.path, &self.schema, &self.options)
    }
}

impl fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionRequest")
            .field("path", &self.path)
            .field("columns", &self.schema.columns.len())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(IngestionFormat::from_extension("CSV"), Some(IngestionFormat::Csv));
        assert_eq!(IngestionFormat::from_extension("ndjson"), Some(IngestionFormat::Json));
        assert_eq!(IngestionFormat::from_extension("pq"), Some(IngestionFormat::Parquet));
        assert_eq!(IngestionFormat::from_extension("xlsx"), None);
    }

    #[test]
    fn unknown_extension_is_schema_mismatch() {
        let err = ingest_from_path("data.txt", &Schema::default(), &IngestionOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("cannot infer format from extension 'txt'"));
        assert_eq!(severity_for_error(&err), IngestionSeverity::Error);
    }

    #[test]
    fn missing_file_is_critical() {
        let err = ingest_from_path(
            "definitely_missing_dir/none.json",
            &Schema::default(),
            &IngestionOptions::default(),
        )
        .unwrap_err();
        assert_eq!(severity_for_error(&err), IngestionSeverity::Critical);
    }

    #[derive(Debug)]
    struct Wrapped(std::io::Error);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "wrapped: {}", self.0)
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn io_cause_is_found_through_the_source_chain() {
        let nested = Wrapped(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(caused_by_io(&nested));

        let general = ::parquet::errors::ParquetError::General("bad footer".to_string());
        assert!(!caused_by_io(&general));
        assert_eq!(
            severity_for_error(&IngestionError::Parquet(general)),
            IngestionSeverity::Error
        );
    }
}

