//! CSV export of a pipeline result.
//!
//! Format:
//!
//! - The header is the key list of the first row, in that row's natural order.
//! - Every row is written against that header; a missing key becomes an empty field.
//! - Every field, header included, is wrapped in double quotes and inner quotes are doubled.
//! - Records are separated by `\n`; there is no trailing newline.
//!
//! An empty result set exports nothing.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::ExportResult;
use crate::types::{Row, Value};

/// Serialize `rows` to CSV text, or `None` when there are no rows.
pub fn to_csv(rows: &[Row]) -> ExportResult<Option<String>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    let mut text = String::from_utf8(buf)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(Some(text))
}

/// Write `rows` as CSV to `sink`, returning the number of data rows written.
///
/// Every record, the last one included, ends with `\n`. Nothing is written for an empty slice.
pub fn write_csv<W: Write>(rows: &[Row], sink: W) -> ExportResult<usize> {
    let Some(first) = rows.first() else {
        return Ok(0);
    };
    let headers: Vec<&str> = first.keys().collect();

    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(sink);

    wtr.write_record(&headers)?;
    for row in rows {
        wtr.write_record(headers.iter().map(|h| {
            row.get(h).map(Value::to_display_string).unwrap_or_default()
        }))?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

/// Write `rows` as a CSV file at `path`.
///
/// An empty slice is a no-op: no file is created and `0` is returned.
pub fn export_csv_to_path(rows: &[Row], path: impl AsRef<Path>) -> ExportResult<usize> {
    let Some(text) = to_csv(rows)? else {
        return Ok(0);
    };
    let mut file = File::create(path)?;
    file.write_all(text.as_bytes())?;
    Ok(rows.len())
}

/// Download file name for a report title: whitespace runs become `_`, suffixed `_export.csv`.
pub fn export_file_name(title: &str) -> String {
    let stem = title.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{stem}_export.csv")
}
