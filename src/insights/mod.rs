//! Natural-language summaries of a pipeline result.
//!
//! The pipeline's only outbound exchange: a bounded sample of the current result plus a column
//! description is turned into a prompt and handed to an [`InsightProvider`]. [`summarize`] never
//! fails; provider errors are reported to an [`InsightObserver`] and replaced by
//! [`FAILURE_MESSAGE`].
//!
//! ```rust
//! use data_grid_pipeline::insights::{summarize, InsightOptions, InsightProvider, InsightRequest};
//! use data_grid_pipeline::types::{Column, ColumnKind, Row, Schema, Value};
//! use data_grid_pipeline::InsightResult;
//!
//! struct Canned;
//!
//! impl InsightProvider for Canned {
//!     fn generate(&self, _prompt: &str) -> InsightResult<String> {
//!         Ok("Sales are concentrated in EU.".to_string())
//!     }
//! }
//!
//! let schema = Schema::new(vec![Column::new("region", "Region", ColumnKind::String)]);
//! let rows = vec![Row::from([("region", Value::from("EU"))])];
//! let opts = InsightOptions::default();
//!
//! let request = InsightRequest::from_rows(&rows, &schema, &opts);
//! assert_eq!(summarize(&Canned, &request, &opts), "Sales are concentrated in EU.");
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;
pub mod prompt;

use std::fmt;
use std::sync::Arc;

use crate::error::{InsightError, InsightResult};
use crate::types::{Row, Schema};

#[cfg(feature = "gemini")]
pub use gemini::GeminiProvider;
pub use prompt::build_prompt;

/// Rows forwarded to the provider by default.
pub const DEFAULT_SAMPLE_LIMIT: usize = 50;

/// Returned when the provider answers with empty text.
pub const EMPTY_MESSAGE: &str = "No insights could be generated.";

/// Returned when the provider call fails.
pub const FAILURE_MESSAGE: &str =
    "Failed to generate insights. Please check your API key or try again later.";

/// Text-generation backend.
pub trait InsightProvider: Send + Sync {
    /// Produce free-form text for `prompt`.
    fn generate(&self, prompt: &str) -> InsightResult<String>;
}

/// Observer interface for summary outcomes.
pub trait InsightObserver: Send + Sync {
    /// Called when the provider returned non-blank text.
    fn on_success(&self, _sample_rows: usize, _chars: usize) {}

    /// Called when the provider answered with only whitespace.
    fn on_empty(&self, _sample_rows: usize) {}

    /// Called when the provider call failed.
    fn on_failure(&self, _error: &InsightError) {}
}

/// Logs summary outcomes to stderr.
#[derive(Debug, Default)]
pub struct StdErrInsightObserver;

impl InsightObserver for StdErrInsightObserver {
    fn on_success(&self, sample_rows: usize, chars: usize) {
        eprintln!("[insights][ok] sample_rows={sample_rows} chars={chars}");
    }

    fn on_empty(&self, sample_rows: usize) {
        eprintln!("[insights][warning] sample_rows={sample_rows} empty response");
    }

    fn on_failure(&self, error: &InsightError) {
        eprintln!("[insights][error] err={error}");
    }
}

/// Options controlling how the sample is shaped and where outcomes are reported.
#[derive(Clone)]
pub struct InsightOptions {
    /// Maximum rows forwarded to the provider.
    pub sample_limit: usize,
    /// Optional observer for logging.
    pub observer: Option<Arc<dyn InsightObserver>>,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            observer: None,
        }
    }
}

impl fmt::Debug for InsightOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightOptions")
            .field("sample_limit", &self.sample_limit)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

/// The bounded payload sent to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightRequest {
    /// `"<display name> (<kind>)"` for every column, joined by `", "`.
    pub columns: String,
    /// Leading rows of the result.
    pub sample: Vec<Row>,
    /// Row count of the full result the sample was taken from.
    pub total_rows: usize,
}

impl InsightRequest {
    /// Take the first `options.sample_limit` rows of `rows` and describe `schema`.
    pub fn from_rows(rows: &[Row], schema: &Schema, options: &InsightOptions) -> Self {
        Self {
            columns: schema.describe(),
            sample: rows.iter().take(options.sample_limit).cloned().collect(),
            total_rows: rows.len(),
        }
    }

    /// Render the prompt: instruction, column description, sample as compact JSON.
    pub fn prompt(&self) -> InsightResult<String> {
        let sample_json = serde_json::to_string(&self.sample)?;
        Ok(build_prompt(&self.columns, &sample_json))
    }
}

/// Ask `provider` for a summary of `request`, applying the fixed fallback texts.
///
/// No retry is attempted; a failure is terminal for this call.
pub fn summarize(provider: &dyn InsightProvider, request: &InsightRequest, options: &InsightOptions) -> String {
    match request.prompt().and_then(|prompt| provider.generate(&prompt)) {
        Ok(text) if text.trim().is_empty() => {
            if let Some(obs) = options.observer.as_ref() {
                obs.on_empty(request.sample.len());
            }
            EMPTY_MESSAGE.to_string()
        }
        Ok(text) => {
            if let Some(obs) = options.observer.as_ref() {
                obs.on_success(request.sample.len(), text.chars().count());
            }
            text
        }
        Err(err) => {
            if let Some(obs) = options.observer.as_ref() {
                obs.on_failure(&err);
            }
            FAILURE_MESSAGE.to_string()
        }
    }
}
