//! Scalar values, records, and datasets.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single scalar cell value.
///
/// Tagged serialization keeps the JSON self-describing:
/// `{"type": "number", "value": 42.5}`, `{"type": "null"}`, etc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Null, or text that is empty after trimming. Profiling and overlap
    /// detection both skip these.
    pub fn is_null_like(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Human-readable form used for type probing and sample values.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Timestamp(ts) => ts.to_rfc3339(),
            FieldValue::Null => String::new(),
        }
    }

    /// Canonical key for value-overlap comparisons. `None` for null-like
    /// values. Numbers are normalized so `1` and `1.0` compare equal.
    pub fn overlap_key(&self) -> Option<String> {
        if self.is_null_like() {
            return None;
        }
        Some(self.display())
    }

    /// Convert an arbitrary JSON value. Nested arrays and objects are kept
    /// as their JSON text; the profiler will classify them as strings.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => {
                FieldValue::Number(n.as_f64().unwrap_or(f64::NAN))
            }
            serde_json::Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }

    /// Plain JSON form for storage backends (untyped, unlike serde's tagged
    /// representation).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            FieldValue::Null => serde_json::Value::Null,
        }
    }
}

/// Integral floats render without the trailing `.0` so that `1` and `1.0`
/// produce the same overlap key.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One row: a mapping from column name to scalar value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(flatten)]
    pub fields: HashMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(column.into(), value);
        self
    }

    /// Missing keys read as null.
    pub fn get(&self, column: &str) -> FieldValue {
        self.fields.get(column).cloned().unwrap_or(FieldValue::Null)
    }

    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let fields = object
            .iter()
            .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
            .collect();
        Self { fields }
    }
}

/// An ordered sequence of records sharing a column set.
///
/// The column set is determined from the first record; later records may
/// omit keys, which read as null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    /// Build from parsed JSON rows (the ingestion collaborator's output).
    /// Non-object rows are skipped.
    pub fn from_json_rows(rows: &[serde_json::Value]) -> Self {
        let objects: Vec<&serde_json::Map<String, serde_json::Value>> =
            rows.iter().filter_map(|r| r.as_object()).collect();
        let columns = objects
            .first()
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default();
        let rows = objects.into_iter().map(Record::from_json_object).collect();
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at (row, column); out-of-range rows and missing keys read as null.
    pub fn value(&self, row: usize, column: &str) -> FieldValue {
        self.rows
            .get(row)
            .map(|r| r.get(column))
            .unwrap_or(FieldValue::Null)
    }

    /// All values of a column in row order.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = FieldValue> + 'a {
        self.rows.iter().map(move |r| r.get(column))
    }

    pub fn meta(&self, source_kind: impl Into<String>) -> DatasetMeta {
        DatasetMeta {
            source_kind: source_kind.into(),
            row_count: self.rows.len(),
            columns: self.columns.clone(),
        }
    }
}

/// Metadata handed to the pipeline alongside a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub source_kind: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Parse a string against the recognized date/time formats.
///
/// Shared between the column profiler (type detection) and the graph loader
/// (temporal edge comparison) so both agree on what counts as a date.
pub fn parse_temporal(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ts);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.and_hms_opt(0, 0, 0).expect("midnight is valid"));
        }
    }
    None
}
