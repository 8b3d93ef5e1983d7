//! Column profiles produced by type inference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Inferred value type of a column, by decreasing specificity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    String,
    Number,
    Boolean,
    Date,
    Email,
    Url,
    Phone,
    Id,
    Unknown,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::Email => "email",
            ColumnType::Url => "url",
            ColumnType::Phone => "phone",
            ColumnType::Id => "id",
            ColumnType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pattern tags derived from the column name and value shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternTag {
    Identifier,
    Name,
    Email,
    Phone,
    Temporal,
    Address,
    Url,
    Integer,
    Decimal,
    Positive,
    FixedLength,
}

/// Type-dependent column statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric {
        min: f64,
        max: f64,
        mean: f64,
        median: f64,
        std_dev: f64,
    },
    Text {
        min_len: usize,
        max_len: usize,
        avg_len: f64,
    },
    None,
}

/// Statistical and type profile of one column, computed once per job from a
/// bounded sample and immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub column_type: ColumnType,
    pub patterns: BTreeSet<PatternTag>,
    pub stats: ColumnStats,
    /// Rows inspected for this profile (the sample, not the full dataset).
    pub sampled_rows: usize,
    /// Rows in the dataset the sample was drawn from.
    pub total_rows: usize,
    pub null_count: usize,
    pub null_pct: f64,
    pub unique_count: usize,
    /// Up to five example values, stringified.
    pub samples: Vec<String>,
}

impl ColumnProfile {
    /// A column whose values are all distinct and non-null. Uniqueness is
    /// judged against the full dataset's row count, so a column sampled
    /// partially can never be flagged: a duplicate past the sample would
    /// otherwise turn into a store-level unique-index violation at load time.
    pub fn is_unique(&self) -> bool {
        self.total_rows > 0
            && self.null_count == 0
            && self.unique_count == self.total_rows
    }

    pub fn has_pattern(&self, tag: PatternTag) -> bool {
        self.patterns.contains(&tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniqueness_requires_full_distinct_non_null_sample() {
        let mut profile = ColumnProfile {
            name: "id".into(),
            column_type: ColumnType::Number,
            patterns: BTreeSet::new(),
            stats: ColumnStats::None,
            sampled_rows: 3,
            total_rows: 3,
            null_count: 0,
            null_pct: 0.0,
            unique_count: 3,
            samples: vec![],
        };
        assert!(profile.is_unique());

        profile.null_count = 1;
        assert!(!profile.is_unique());

        profile.null_count = 0;
        profile.unique_count = 2;
        assert!(!profile.is_unique());
    }

    #[test]
    fn partially_sampled_column_is_never_unique() {
        // All 100 sampled values distinct, but 150 unsampled rows could hide
        // duplicates.
        let profile = ColumnProfile {
            name: "id".into(),
            column_type: ColumnType::Number,
            patterns: BTreeSet::new(),
            stats: ColumnStats::None,
            sampled_rows: 100,
            total_rows: 250,
            null_count: 0,
            null_pct: 0.0,
            unique_count: 100,
            samples: vec![],
        };
        assert!(!profile.is_unique());
    }

    #[test]
    fn column_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(ColumnType::Unknown).unwrap(),
            serde_json::json!("unknown")
        );
        assert_eq!(ColumnType::Boolean.to_string(), "boolean");
    }
}
