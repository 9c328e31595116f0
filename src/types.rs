//! Core data model types.
//!
//! A source dataset is a [`DataSet`]: a [`Schema`] of column descriptors plus an ordered list of
//! schema-less [`Row`]s. Column metadata drives formatting and which fields callers pick for
//! grouping and numeric aggregation; the rows themselves are open field → [`Value`] maps.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Semantic kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Free text / categorical.
    String,
    /// Plain number.
    Number,
    /// Date or date-time.
    Date,
    /// Boolean flag.
    Boolean,
    /// Monetary amount (numeric).
    Currency,
}

impl ColumnKind {
    /// Numeric columns are summed during aggregation.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Currency)
    }

    /// Columns offered as group keys.
    pub fn is_groupable(self) -> bool {
        matches!(self, Self::String | Self::Boolean)
    }

    /// Lowercase name, as used in column descriptions.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Currency => "currency",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor for a single column of the source dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Key into [`Row`].
    pub field: String,
    /// Human-readable header.
    #[serde(alias = "headerName")]
    pub display_name: String,
    /// Column kind.
    #[serde(alias = "type")]
    pub kind: ColumnKind,
    /// Preferred display width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Hidden columns are skipped by table rendering.
    #[serde(default, alias = "hide")]
    pub hidden: bool,
}

impl Column {
    /// Create a visible column without a preferred width.
    pub fn new(field: impl Into<String>, display_name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            field: field.into(),
            display_name: display_name.into(),
            kind,
            width: None,
            hidden: false,
        }
    }

    /// Set the preferred display width.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Mark the column hidden.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Ordered list of column descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    /// Columns in display order.
    pub columns: Vec<Column>,
}

impl Schema {
    /// Create a schema from columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.field.as_str())
    }

    /// Returns the index of a column by field name, if present.
    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.field == field)
    }

    /// Look up a column by field name.
    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Kind of the column named `field`, if present.
    pub fn kind_of(&self, field: &str) -> Option<ColumnKind> {
        self.column(field).map(|c| c.kind)
    }

    /// Columns of kind `number` or `currency`.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind.is_numeric())
    }

    /// Columns of kind `string` or `boolean`.
    pub fn groupable_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind.is_groupable())
    }

    /// Columns not marked hidden.
    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.hidden)
    }

    /// `"<display name> (<kind>)"` for every column, joined by `", "`.
    pub fn describe(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("{} ({})", c.display_name, c.kind))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Point in time, normalized to UTC.
    DateTime(DateTime<Utc>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Default-to-string conversion used by `contains`, grouping and CSV export.
    ///
    /// `Null` renders as the empty string and integral floats render without a fraction.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Int64(v) => v.to_string(),
            Self::Float64(v) => format_number(*v),
            Self::Bool(v) => v.to_string(),
            Self::Utf8(s) => s.clone(),
            Self::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Numeric reading of the value, or `None` when it has none.
    ///
    /// Strings are trimmed and parsed as decimals; empty or unparsable text has no reading.
    /// Booleans read as 1/0 and date-times as epoch milliseconds.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) if v.is_nan() => None,
            Self::Float64(v) => Some(*v),
            Self::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Self::Utf8(s) => parse_number(s),
            Self::DateTime(dt) => Some(dt.timestamp_millis() as f64),
        }
    }

    /// Boolean reading of the value, or `None` when it has none.
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Int64(v) => Some(*v != 0),
            Self::Float64(v) if v.is_nan() => None,
            Self::Float64(v) => Some(*v != 0.0),
            Self::Utf8(s) => parse_bool(s.trim()),
            Self::Null | Self::DateTime(_) => None,
        }
    }

    /// Rank used to order values of different variants.
    fn type_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int64(_) | Self::Float64(_) => 2,
            Self::DateTime(_) => 3,
            Self::Utf8(_) => 4,
        }
    }

    /// Total ordering over values.
    ///
    /// `Null` < booleans < numbers < date-times < strings; within a variant the natural order
    /// applies, with `Int64` and `Float64` compared numerically.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int64(a), Self::Int64(b)) => a.cmp(b),
            (Self::Int64(a), Self::Float64(b)) => cmp_int_float(*a, *b),
            (Self::Float64(a), Self::Int64(b)) => cmp_int_float(*b, *a).reverse(),
            (Self::Float64(a), Self::Float64(b)) => cmp_floats(*a, *b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (Self::Utf8(a), Self::Utf8(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

/// Exact integer/float comparison; `as f64` rounds above 2^53.
fn cmp_int_float(a: i64, b: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if b.is_nan() {
        return (a as f64).total_cmp(&b);
    }
    if b >= TWO_POW_63 {
        return Ordering::Less;
    }
    if b < -TWO_POW_63 {
        return Ordering::Greater;
    }
    let floor = b.floor();
    match a.cmp(&(floor as i64)) {
        Ordering::Equal if b > floor => Ordering::Less,
        other => other,
    }
}

/// Numeric order with `-0.0 == 0.0`; NaN falls back to the IEEE total order.
fn cmp_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Utf8(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int64(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Int64(v) => serializer.serialize_i64(*v),
            Self::Float64(v) => serializer.serialize_f64(*v),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Utf8(s) => serializer.serialize_str(s),
            Self::DateTime(_) => serializer.serialize_str(&self.to_display_string()),
        }
    }
}

/// Format a float the way a default number-to-string conversion would.
pub(crate) fn format_number(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let s = if v > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Parse RFC 3339, `YYYY-MM-DDTHH:MM:SS` (UTC) or `YYYY-MM-DD` (midnight UTC).
pub(crate) fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// One record: an insertion-ordered map from field name to [`Value`].
///
/// Key order is the row's natural order; CSV export uses it for the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty row with room for `n` fields.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
        }
    }

    /// Value stored under `field`, or `None` if the row has no such key.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v)
    }

    fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the row has a key named `field`.
    pub fn contains_key(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Set `field` to `value`.
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        match self.get_mut(&field) {
            Some(slot) => *slot = value,
            None => self.entries.push((field, value)),
        }
    }

    /// Field names in natural order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// `(field, value)` pairs in natural order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl<K: Into<String>, const N: usize> From<[(K, Value); N]> for Row {
    fn from(pairs: [(K, Value); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// In-memory tabular dataset: column metadata plus rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    /// Column descriptors.
    pub schema: Schema,
    /// Rows in source order.
    pub rows: Vec<Row>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
