//! Cell display formatting for table rendering.

use chrono::Datelike;

use crate::types::{ColumnKind, Value};

/// Render `value` for a cell of a column of `kind`.
///
/// - `Currency` numbers render as US dollars with two decimals: `$1,234.50`, `-$12.00`.
/// - `Date` values render as `M/D/YYYY` (UTC).
/// - Everything else, and values that do not fit their column kind, use
///   [`Value::to_display_string`].
pub fn format_cell(value: &Value, kind: ColumnKind) -> String {
    match kind {
        ColumnKind::Currency => match value {
            Value::Int64(_) | Value::Float64(_) => value
                .to_number()
                .map(format_currency)
                .unwrap_or_else(|| value.to_display_string()),
            _ => value.to_display_string(),
        },
        ColumnKind::Date => match value {
            Value::DateTime(dt) => format!("{}/{}/{}", dt.month(), dt.day(), dt.year()),
            Value::Utf8(s) => crate::types::parse_datetime(s)
                .map(|dt| format!("{}/{}/{}", dt.month(), dt.day(), dt.year()))
                .unwrap_or_else(|| s.clone()),
            _ => value.to_display_string(),
        },
        _ => value.to_display_string(),
    }
}

fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc() as u64;
    let frac = (cents % 100.0) as u64;
    let sign = if amount < 0.0 && cents > 0.0 { "-" } else { "" };
    format!("{sign}${}.{frac:02}", group_thousands(whole))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn currency() {
        assert_eq!(format_cell(&Value::Float64(1234.5), ColumnKind::Currency), "$1,234.50");
        assert_eq!(format_cell(&Value::Int64(-12), ColumnKind::Currency), "-$12.00");
        assert_eq!(format_cell(&Value::Int64(0), ColumnKind::Currency), "$0.00");
        assert_eq!(format_cell(&Value::Float64(1_000_000.004), ColumnKind::Currency), "$1,000,000.00");
        assert_eq!(format_cell(&Value::Float64(-0.001), ColumnKind::Currency), "$0.00");
        assert_eq!(format_cell(&Value::from("n/a"), ColumnKind::Currency), "n/a");
        assert_eq!(format_cell(&Value::Null, ColumnKind::Currency), "");
    }

    #[test]
    fn dates() {
        let dt = Utc.with_ymd_and_hms(2023, 3, 4, 15, 0, 0).unwrap();
        assert_eq!(format_cell(&Value::DateTime(dt), ColumnKind::Date), "3/4/2023");
        assert_eq!(format_cell(&Value::from("2023-12-25"), ColumnKind::Date), "12/25/2023");
        assert_eq!(format_cell(&Value::from("someday"), ColumnKind::Date), "someday");
    }

    #[test]
    fn other_kinds_use_display_string() {
        assert_eq!(format_cell(&Value::Float64(3.0), ColumnKind::Number), "3");
        assert_eq!(format_cell(&Value::Bool(true), ColumnKind::Boolean), "true");
        assert_eq!(format_cell(&Value::from("EU"), ColumnKind::String), "EU");
    }
}
