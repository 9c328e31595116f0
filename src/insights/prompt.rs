//! Prompt text for data-sample summaries.

/// Analyst instruction placed ahead of the column list and sample.
pub const ANALYST_INSTRUCTION: &str = "You are a senior data analyst. Analyze the following dataset \
and provide 3-5 key insights, trends, or anomalies.\nBe concise and professional. Use markdown for formatting.";

/// Assemble the full prompt from a column description and a JSON-rendered sample.
pub fn build_prompt(columns: &str, sample_json: &str) -> String {
    format!("{ANALYST_INSTRUCTION}\n\nColumns: {columns}\n\nData Sample (JSON):\n{sample_json}\n")
}
