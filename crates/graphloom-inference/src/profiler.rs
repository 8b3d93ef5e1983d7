//! Column type inference and statistical profiling.

use graphloom_core::{
    parse_temporal, ColumnProfile, ColumnStats, ColumnType, Dataset, FieldValue, PatternTag,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;
use url::Url;

/// Rows inspected per job. Profiles describe this sample, not the dataset.
pub const DEFAULT_SAMPLE_LIMIT: usize = 100;

/// Values probed for type classification, per column.
const TYPE_PROBE_LIMIT: usize = 10;

/// Sample values kept on the profile.
const SAMPLE_VALUES_KEPT: usize = 5;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-_]+$").expect("valid id regex"));

const BOOLEAN_WORDS: &[&str] = &["true", "false", "1", "0", "yes", "no"];
const MAX_PHONE_DIGITS: usize = 16;

/// Classifies each column's type and statistical shape from a bounded
/// sample of the dataset.
#[derive(Debug, Clone)]
pub struct ColumnProfiler {
    sample_limit: usize,
}

impl Default for ColumnProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnProfiler {
    pub fn new() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }

    pub fn with_sample_limit(sample_limit: usize) -> Self {
        Self { sample_limit }
    }

    /// Produce one profile per column. A column with no non-null sampled
    /// values profiles as `Unknown` with empty statistics, never an error.
    pub fn profile(&self, dataset: &Dataset) -> Vec<ColumnProfile> {
        let sample_len = dataset.row_count().min(self.sample_limit);
        let sample = &dataset.rows[..sample_len];
        debug!(
            columns = dataset.columns.len(),
            sampled_rows = sample_len,
            "profiling dataset sample"
        );

        dataset
            .columns
            .iter()
            .map(|column| {
                let values: Vec<FieldValue> = sample.iter().map(|r| r.get(column)).collect();
                profile_column(column, &values, dataset.row_count())
            })
            .collect()
    }
}

fn profile_column(name: &str, values: &[FieldValue], total_rows: usize) -> ColumnProfile {
    let non_null: Vec<String> = values
        .iter()
        .filter(|v| !v.is_null_like())
        .map(|v| v.display())
        .collect();
    let null_count = values.len() - non_null.len();

    let column_type = classify(&non_null);
    let stats = compute_stats(column_type, &non_null);

    let mut patterns = name_patterns(name);
    value_patterns(column_type, &non_null, &mut patterns);

    let unique_count = values
        .iter()
        .filter_map(FieldValue::overlap_key)
        .collect::<HashSet<_>>()
        .len();

    let null_pct = if values.is_empty() {
        0.0
    } else {
        null_count as f64 / values.len() as f64 * 100.0
    };

    ColumnProfile {
        name: name.to_string(),
        column_type,
        patterns,
        stats,
        sampled_rows: values.len(),
        total_rows,
        null_count,
        null_pct,
        unique_count,
        samples: non_null.iter().take(SAMPLE_VALUES_KEPT).cloned().collect(),
    }
}

/// Test candidates in strict precedence order, most specific first. A short
/// alphanumeric token is an `Id` before it falls back to `String`.
fn classify(non_null: &[String]) -> ColumnType {
    if non_null.is_empty() {
        return ColumnType::Unknown;
    }
    let probe: Vec<&str> = non_null
        .iter()
        .take(TYPE_PROBE_LIMIT)
        .map(String::as_str)
        .collect();

    if probe.iter().all(|v| is_boolean(v)) {
        ColumnType::Boolean
    } else if probe.iter().all(|v| is_number(v)) {
        ColumnType::Number
    } else if probe.iter().all(|v| parse_temporal(v).is_some()) {
        ColumnType::Date
    } else if probe.iter().all(|v| EMAIL_RE.is_match(v)) {
        ColumnType::Email
    } else if probe.iter().all(|v| Url::parse(v).is_ok()) {
        ColumnType::Url
    } else if probe.iter().all(|v| is_phone(v)) {
        ColumnType::Phone
    } else if probe.iter().all(|v| is_id(v)) {
        ColumnType::Id
    } else {
        ColumnType::String
    }
}

fn is_boolean(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    BOOLEAN_WORDS.contains(&lowered.as_str())
}

fn is_number(value: &str) -> bool {
    parse_finite(value).is_some()
}

fn parse_finite(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_phone(value: &str) -> bool {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = stripped.strip_prefix('+').unwrap_or(&stripped);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && digits.len() <= MAX_PHONE_DIGITS
}

fn is_id(value: &str) -> bool {
    value.len() > 3 && ID_RE.is_match(value)
}

/// Tags derived from the lower-cased column name alone.
fn name_patterns(name: &str) -> BTreeSet<PatternTag> {
    let lowered = name.to_ascii_lowercase();
    let mut tags = BTreeSet::new();
    let mut tag_if = |hit: bool, tag: PatternTag| {
        if hit {
            tags.insert(tag);
        }
    };

    tag_if(
        lowered.contains("id") || lowered.contains("key"),
        PatternTag::Identifier,
    );
    tag_if(lowered.contains("name"), PatternTag::Name);
    tag_if(lowered.contains("mail"), PatternTag::Email);
    tag_if(
        lowered.contains("phone") || lowered.contains("tel"),
        PatternTag::Phone,
    );
    tag_if(
        lowered.contains("date")
            || lowered.contains("time")
            || lowered.contains("created")
            || lowered.contains("updated"),
        PatternTag::Temporal,
    );
    tag_if(
        lowered.contains("address")
            || lowered.contains("street")
            || lowered.contains("city")
            || lowered.contains("zip")
            || lowered.contains("country"),
        PatternTag::Address,
    );
    tag_if(
        lowered.contains("url") || lowered.contains("link") || lowered.contains("website"),
        PatternTag::Url,
    );

    tags
}

/// Tags derived from the sampled values themselves.
fn value_patterns(column_type: ColumnType, non_null: &[String], tags: &mut BTreeSet<PatternTag>) {
    if non_null.is_empty() {
        return;
    }

    if column_type == ColumnType::Number {
        let numbers: Vec<f64> = non_null.iter().filter_map(|v| parse_finite(v)).collect();
        if !numbers.is_empty() {
            if numbers.iter().all(|n| n.fract() == 0.0) {
                tags.insert(PatternTag::Integer);
            } else {
                tags.insert(PatternTag::Decimal);
            }
            if numbers.iter().all(|n| *n > 0.0) {
                tags.insert(PatternTag::Positive);
            }
        }
    }

    let first_len = non_null[0].chars().count();
    if non_null.iter().all(|v| v.chars().count() == first_len) {
        tags.insert(PatternTag::FixedLength);
    }
}

fn compute_stats(column_type: ColumnType, non_null: &[String]) -> ColumnStats {
    match column_type {
        ColumnType::Number => numeric_stats(non_null),
        ColumnType::String => text_stats(non_null),
        _ => ColumnStats::None,
    }
}

fn numeric_stats(non_null: &[String]) -> ColumnStats {
    let mut numbers: Vec<f64> = non_null.iter().filter_map(|v| parse_finite(v)).collect();
    if numbers.is_empty() {
        return ColumnStats::None;
    }
    numbers.sort_by(f64::total_cmp);

    let count = numbers.len() as f64;
    let min = numbers[0];
    let max = numbers[numbers.len() - 1];
    let mean = numbers.iter().sum::<f64>() / count;
    let median = numbers[numbers.len() / 2];
    let variance = numbers.iter().map(|n| (n - mean).powi(2)).sum::<f64>() / count;

    ColumnStats::Numeric {
        min,
        max,
        mean,
        median,
        std_dev: variance.sqrt(),
    }
}

fn text_stats(non_null: &[String]) -> ColumnStats {
    if non_null.is_empty() {
        return ColumnStats::None;
    }
    let lengths: Vec<usize> = non_null.iter().map(|v| v.chars().count()).collect();
    let total: usize = lengths.iter().sum();

    ColumnStats::Text {
        min_len: lengths.iter().copied().min().unwrap_or(0),
        max_len: lengths.iter().copied().max().unwrap_or(0),
        avg_len: total as f64 / lengths.len() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset(rows: Vec<serde_json::Value>) -> Dataset {
        Dataset::from_json_rows(&rows)
    }

    fn profile_one(rows: Vec<serde_json::Value>, column: &str) -> ColumnProfile {
        let profiles = ColumnProfiler::new().profile(&dataset(rows));
        profiles
            .into_iter()
            .find(|p| p.name == column)
            .expect("column profiled")
    }

    #[test]
    fn all_finite_floats_infer_number_never_string() {
        let profile = profile_one(
            vec![
                json!({"amount": 1.5}),
                json!({"amount": "2"}),
                json!({"amount": -3.25}),
            ],
            "amount",
        );
        assert_eq!(profile.column_type, ColumnType::Number);
    }

    #[test]
    fn boolean_takes_precedence_over_number() {
        // "1" and "0" parse as floats too; boolean wins by precedence.
        let profile = profile_one(
            vec![json!({"active": "1"}), json!({"active": "0"}), json!({"active": "yes"})],
            "active",
        );
        assert_eq!(profile.column_type, ColumnType::Boolean);
    }

    #[test]
    fn date_column_is_detected() {
        let profile = profile_one(
            vec![json!({"joined": "2024-01-15"}), json!({"joined": "2024-02-20"})],
            "joined",
        );
        assert_eq!(profile.column_type, ColumnType::Date);
        assert!(profile.has_pattern(PatternTag::FixedLength));
    }

    #[test]
    fn email_url_phone_id_precedence_chain() {
        let email = profile_one(vec![json!({"contact": "ada@example.com"})], "contact");
        assert_eq!(email.column_type, ColumnType::Email);

        let url = profile_one(vec![json!({"site": "https://example.com/a"})], "site");
        assert_eq!(url.column_type, ColumnType::Url);

        let phone = profile_one(vec![json!({"tel": "(555) 123-4567"})], "tel");
        assert_eq!(phone.column_type, ColumnType::Phone);

        let id = profile_one(vec![json!({"code": "AB-1234"})], "code");
        assert_eq!(id.column_type, ColumnType::Id);

        let string = profile_one(vec![json!({"note": "hello there"})], "note");
        assert_eq!(string.column_type, ColumnType::String);
    }

    #[test]
    fn empty_column_yields_unknown_not_error() {
        let profile = profile_one(
            vec![json!({"blank": null, "other": 1}), json!({"blank": "", "other": 2})],
            "blank",
        );
        assert_eq!(profile.column_type, ColumnType::Unknown);
        assert_eq!(profile.stats, ColumnStats::None);
        assert_eq!(profile.null_count, 2);
        assert_eq!(profile.null_pct, 100.0);
        assert!(profile.samples.is_empty());
    }

    #[test]
    fn numeric_stats_match_population_formulas() {
        let profile = profile_one(
            vec![
                json!({"v": 2.0}),
                json!({"v": 4.0}),
                json!({"v": 4.0}),
                json!({"v": 4.0}),
                json!({"v": 5.0}),
                json!({"v": 5.0}),
                json!({"v": 7.0}),
                json!({"v": 9.0}),
            ],
            "v",
        );
        match profile.stats {
            ColumnStats::Numeric {
                min,
                max,
                mean,
                median,
                std_dev,
            } => {
                assert_eq!(min, 2.0);
                assert_eq!(max, 9.0);
                assert_eq!(mean, 5.0);
                assert_eq!(median, 5.0);
                assert!((std_dev - 2.0).abs() < 1e-9);
            }
            other => panic!("expected numeric stats, got {:?}", other),
        }
        assert!(profile.has_pattern(PatternTag::Integer));
        assert!(profile.has_pattern(PatternTag::Positive));
    }

    #[test]
    fn string_stats_cover_lengths() {
        let profile = profile_one(
            vec![json!({"s": "ab cd"}), json!({"s": "a b"}), json!({"s": "abcd efg"})],
            "s",
        );
        match profile.stats {
            ColumnStats::Text {
                min_len,
                max_len,
                avg_len,
            } => {
                assert_eq!(min_len, 3);
                assert_eq!(max_len, 8);
                assert!((avg_len - 16.0 / 3.0).abs() < 1e-9);
            }
            other => panic!("expected text stats, got {:?}", other),
        }
    }

    #[test]
    fn name_patterns_flag_identifier_columns() {
        let profile = profile_one(vec![json!({"user_id": 7})], "user_id");
        assert!(profile.has_pattern(PatternTag::Identifier));

        let profile = profile_one(vec![json!({"created_at": "2024-01-01"})], "created_at");
        assert!(profile.has_pattern(PatternTag::Temporal));
    }

    #[test]
    fn sample_limit_bounds_the_rows_inspected() {
        let rows: Vec<serde_json::Value> = (0..250).map(|i| json!({"n": i})).collect();
        let profiles = ColumnProfiler::new().profile(&dataset(rows));
        assert_eq!(profiles[0].sampled_rows, DEFAULT_SAMPLE_LIMIT);
        assert_eq!(profiles[0].total_rows, 250);
        assert_eq!(profiles[0].unique_count, DEFAULT_SAMPLE_LIMIT);
        // Distinct throughout the sample, but rows 100..250 were never
        // inspected, so the column must not earn a unique constraint.
        assert!(!profiles[0].is_unique());
    }

    #[test]
    fn fully_sampled_distinct_column_is_unique() {
        let rows: Vec<serde_json::Value> = (0..50).map(|i| json!({"n": i})).collect();
        let profiles = ColumnProfiler::new().profile(&dataset(rows));
        assert_eq!(profiles[0].total_rows, 50);
        assert!(profiles[0].is_unique());
    }

    #[test]
    fn unique_count_and_samples_are_bounded() {
        let profile = profile_one(
            vec![
                json!({"t": "x"}),
                json!({"t": "x"}),
                json!({"t": "y"}),
                json!({"t": "z"}),
                json!({"t": "w"}),
                json!({"t": "v"}),
                json!({"t": "u"}),
            ],
            "t",
        );
        assert_eq!(profile.unique_count, 6);
        assert_eq!(profile.samples.len(), 5);
        assert_eq!(profile.samples[0], "x");
    }
}
