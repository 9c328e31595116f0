use std::sync::{Arc, Mutex};

use data_grid_pipeline::insights::{
    summarize, InsightObserver, InsightOptions, InsightProvider, InsightRequest, DEFAULT_SAMPLE_LIMIT,
    EMPTY_MESSAGE, FAILURE_MESSAGE,
};
use data_grid_pipeline::processing::{run_pipeline, SortSpec, ViewQuery};
use data_grid_pipeline::types::{Column, ColumnKind, DataSet, Row, Schema, Value};
use data_grid_pipeline::{InsightError, InsightResult};

/// Records every prompt and answers with a fixed outcome.
struct ScriptedProvider {
    answer: Result<String, (u16, String)>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn ok(text: &str) -> Self {
        Self {
            answer: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing(status: u16, message: &str) -> Self {
        Self {
            answer: Err((status, message.to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl InsightProvider for ScriptedProvider {
    fn generate(&self, prompt: &str) -> InsightResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.answer {
            Ok(text) => Ok(text.clone()),
            Err((status, message)) => Err(InsightError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

#[derive(Default)]
struct Outcomes {
    successes: Mutex<Vec<(usize, usize)>>,
    failures: Mutex<Vec<String>>,
    empties: Mutex<Vec<usize>>,
}

impl InsightObserver for Outcomes {
    fn on_success(&self, sample_rows: usize, chars: usize) {
        self.successes.lock().unwrap().push((sample_rows, chars));
    }

    fn on_failure(&self, error: &InsightError) {
        self.failures.lock().unwrap().push(error.to_string());
    }

    fn on_empty(&self, sample_rows: usize) {
        self.empties.lock().unwrap().push(sample_rows);
    }
}

fn large_dataset(n: i64) -> DataSet {
    let schema = Schema::new(vec![
        Column::new("region", "Region", ColumnKind::String),
        Column::new("sales", "Sales", ColumnKind::Currency),
    ]);
    let rows = (0..n)
        .map(|i| {
            Row::from([
                ("region", Value::from(if i % 2 == 0 { "EU" } else { "US" })),
                ("sales", Value::Int64(i)),
            ])
        })
        .collect();
    DataSet::new(schema, rows)
}

#[test]
fn sorted_result_sample_reaches_provider() {
    let ds = large_dataset(200);
    let rows = run_pipeline(&ds, &ViewQuery::new().with_sort(SortSpec::desc("sales")));

    let outcomes = Arc::new(Outcomes::default());
    let opts = InsightOptions {
        observer: Some(outcomes.clone()),
        ..Default::default()
    };
    let request = InsightRequest::from_rows(&rows, &ds.schema, &opts);
    assert_eq!(request.sample.len(), DEFAULT_SAMPLE_LIMIT);

    let provider = ScriptedProvider::ok("- US leads on sales.");
    let text = summarize(&provider, &request, &opts);
    assert_eq!(text, "- US leads on sales.");

    let prompts = provider.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("Columns: Region (string), Sales (currency)"));
    assert!(prompt.contains(r#"[{"region":"US","sales":199},{"region":"EU","sales":198}"#));
    assert!(prompt.contains(r#"{"region":"EU","sales":150}]"#));
    assert!(!prompt.contains(r#""sales":149"#));

    assert_eq!(*outcomes.successes.lock().unwrap(), vec![(50, 20)]);
}

#[test]
fn blank_answer_becomes_fixed_message() {
    let ds = large_dataset(3);
    let outcomes = Arc::new(Outcomes::default());
    let opts = InsightOptions {
        observer: Some(outcomes.clone()),
        ..Default::default()
    };
    let request = InsightRequest::from_rows(&ds.rows, &ds.schema, &opts);

    let text = summarize(&ScriptedProvider::ok("  \n"), &request, &opts);
    assert_eq!(text, EMPTY_MESSAGE);
    assert!(outcomes.successes.lock().unwrap().is_empty());
    assert!(outcomes.failures.lock().unwrap().is_empty());
    assert_eq!(*outcomes.empties.lock().unwrap(), vec![3]);
}

#[test]
fn provider_error_is_reported_and_replaced() {
    let ds = large_dataset(3);
    let outcomes = Arc::new(Outcomes::default());
    let opts = InsightOptions {
        observer: Some(outcomes.clone()),
        ..Default::default()
    };
    let request = InsightRequest::from_rows(&ds.rows, &ds.schema, &opts);

    let text = summarize(&ScriptedProvider::failing(403, "API key not valid"), &request, &opts);
    assert_eq!(text, FAILURE_MESSAGE);
    assert_eq!(
        *outcomes.failures.lock().unwrap(),
        vec!["api error (status 403): API key not valid".to_string()]
    );
    assert!(outcomes.successes.lock().unwrap().is_empty());
}

#[test]
fn empty_result_still_prompts_with_empty_sample() {
    let ds = large_dataset(0);
    let opts = InsightOptions::default();
    let request = InsightRequest::from_rows(&ds.rows, &ds.schema, &opts);
    assert_eq!(request.total_rows, 0);

    let provider = ScriptedProvider::ok("Nothing to report.");
    summarize(&provider, &request, &opts);
    assert!(provider.prompts.lock().unwrap()[0].contains("Data Sample (JSON):\n[]"));
}
