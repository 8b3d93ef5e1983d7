//! Relationship discovery between columns.
//!
//! Three independent heuristics run over the full dataset (not the profile
//! sample): value overlap for foreign-key candidates, name pairs for
//! hierarchies, and inferred date types for temporal chains. Candidates are
//! hypotheses only; the compiler decides what becomes an edge type.

use graphloom_core::{
    ColumnProfile, ColumnType, Dataset, FieldValue, PatternTag, RelationshipCandidate,
    RelationshipKind,
};
use std::collections::HashSet;
use tracing::debug;

/// Minimum value-overlap ratio for a foreign-key candidate. At or below
/// this, the pair is dropped entirely.
pub const FOREIGN_KEY_THRESHOLD: f64 = 0.5;

const HIERARCHICAL_CONFIDENCE: f64 = 0.9;
const TEMPORAL_CONFIDENCE: f64 = 0.7;

/// Column-name pairs that suggest a parent/child containment.
const HIERARCHY_PAIRS: &[(&str, &str)] = &[
    ("parent", "child"),
    ("manager", "employee"),
    ("category", "subcategory"),
    ("department", "team"),
    ("company", "division"),
];

#[derive(Debug, Clone, Default)]
pub struct RelationshipDetector;

impl RelationshipDetector {
    pub fn new() -> Self {
        Self
    }

    /// Gather candidates from all heuristics. Profiles must cover the same
    /// columns as the dataset; temporal detection trusts their inferred
    /// types rather than re-parsing values.
    pub fn detect(
        &self,
        dataset: &Dataset,
        profiles: &[ColumnProfile],
    ) -> Vec<RelationshipCandidate> {
        let mut candidates = self.foreign_keys(dataset);
        candidates.extend(self.hierarchies(&dataset.columns));
        candidates.extend(self.temporal_chains(profiles));
        debug!(count = candidates.len(), "relationship candidates detected");
        candidates
    }

    /// Overlap ratio between every ordered column pair:
    /// `|A ∩ B| / min(|A|, |B|)` over distinct non-null values.
    fn foreign_keys(&self, dataset: &Dataset) -> Vec<RelationshipCandidate> {
        let value_sets: Vec<(&str, HashSet<String>)> = dataset
            .columns
            .iter()
            .map(|column| {
                let values: HashSet<String> = dataset
                    .column_values(column)
                    .filter_map(|v| FieldValue::overlap_key(&v))
                    .collect();
                (column.as_str(), values)
            })
            .collect();

        let mut candidates = Vec::new();
        for i in 0..value_sets.len() {
            for j in (i + 1)..value_sets.len() {
                let (source, source_values) = &value_sets[i];
                let (target, target_values) = &value_sets[j];
                let smaller = source_values.len().min(target_values.len());
                if smaller == 0 {
                    continue;
                }
                let shared = source_values.intersection(target_values).count();
                let ratio = shared as f64 / smaller as f64;
                if ratio > FOREIGN_KEY_THRESHOLD {
                    candidates.push(RelationshipCandidate {
                        kind: RelationshipKind::ForeignKey,
                        source: source.to_string(),
                        target: target.to_string(),
                        confidence: ratio,
                        description: format!(
                            "values of '{}' and '{}' overlap ({:.0}%)",
                            source,
                            target,
                            ratio * 100.0
                        ),
                    });
                }
            }
        }
        candidates
    }

    fn hierarchies(&self, columns: &[String]) -> Vec<RelationshipCandidate> {
        let mut candidates = Vec::new();
        for (parent_word, child_word) in HIERARCHY_PAIRS {
            let parent = columns
                .iter()
                .find(|c| c.to_ascii_lowercase().contains(parent_word));
            let child = columns
                .iter()
                .find(|c| c.to_ascii_lowercase().contains(child_word));
            if let (Some(parent), Some(child)) = (parent, child) {
                if parent != child {
                    candidates.push(RelationshipCandidate {
                        kind: RelationshipKind::Hierarchical,
                        source: parent.clone(),
                        target: child.clone(),
                        confidence: HIERARCHICAL_CONFIDENCE,
                        description: format!("'{}' contains '{}'", parent, child),
                    });
                }
            }
        }
        candidates
    }

    /// Every ordered pair of date-typed (or temporally named) columns
    /// becomes a temporal candidate; actual before/after direction is
    /// resolved per row at load time.
    fn temporal_chains(&self, profiles: &[ColumnProfile]) -> Vec<RelationshipCandidate> {
        let date_columns: Vec<&str> = profiles
            .iter()
            .filter(|p| {
                p.column_type == ColumnType::Date || p.has_pattern(PatternTag::Temporal)
            })
            .map(|p| p.name.as_str())
            .collect();

        let mut candidates = Vec::new();
        for i in 0..date_columns.len() {
            for j in (i + 1)..date_columns.len() {
                candidates.push(RelationshipCandidate {
                    kind: RelationshipKind::Temporal,
                    source: date_columns[i].to_string(),
                    target: date_columns[j].to_string(),
                    confidence: TEMPORAL_CONFIDENCE,
                    description: format!(
                        "'{}' and '{}' form a temporal sequence",
                        date_columns[i], date_columns[j]
                    ),
                });
            }
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::ColumnProfiler;
    use serde_json::json;

    fn detect(rows: Vec<serde_json::Value>) -> Vec<RelationshipCandidate> {
        let dataset = Dataset::from_json_rows(&rows);
        let profiles = ColumnProfiler::new().profile(&dataset);
        RelationshipDetector::new().detect(&dataset, &profiles)
    }

    fn of_kind(
        candidates: &[RelationshipCandidate],
        kind: RelationshipKind,
    ) -> Vec<&RelationshipCandidate> {
        candidates.iter().filter(|c| c.kind == kind).collect()
    }

    #[test]
    fn self_reference_overlap_yields_foreign_key() {
        // Classic org chart: every manager id also appears as an employee id.
        let candidates = detect(vec![
            json!({"id": 1, "mgr": 2}),
            json!({"id": 2, "mgr": 3}),
            json!({"id": 3, "mgr": 1}),
        ]);
        let fks = of_kind(&candidates, RelationshipKind::ForeignKey);
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].source, "id");
        assert_eq!(fks[0].target, "mgr");
        assert_eq!(fks[0].confidence, 1.0);
    }

    #[test]
    fn overlap_at_exactly_half_is_dropped() {
        // id: {1,2,3,4}, code: {3,4,9,10} -> 2 shared / min 4 = 0.5, not > 0.5.
        let candidates = detect(vec![
            json!({"id": 1, "code": 3}),
            json!({"id": 2, "code": 4}),
            json!({"id": 3, "code": 9}),
            json!({"id": 4, "code": 10}),
        ]);
        assert!(of_kind(&candidates, RelationshipKind::ForeignKey).is_empty());
    }

    #[test]
    fn overlap_normalizes_numeric_and_text_values() {
        // "1" (text) and 1 (number) count as the same value.
        let candidates = detect(vec![
            json!({"a": "1", "b": 1}),
            json!({"a": "2", "b": 2}),
        ]);
        let fks = of_kind(&candidates, RelationshipKind::ForeignKey);
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].confidence, 1.0);
    }

    #[test]
    fn nulls_are_excluded_from_overlap_sets() {
        let candidates = detect(vec![
            json!({"a": null, "b": ""}),
            json!({"a": 5, "b": 5}),
        ]);
        let fks = of_kind(&candidates, RelationshipKind::ForeignKey);
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].confidence, 1.0);
    }

    #[test]
    fn hierarchy_pairs_detected_by_name() {
        let candidates = detect(vec![
            json!({"manager_name": "ada", "employee_name": "grace", "x": 1}),
        ]);
        let hs = of_kind(&candidates, RelationshipKind::Hierarchical);
        assert_eq!(hs.len(), 1);
        assert_eq!(hs[0].source, "manager_name");
        assert_eq!(hs[0].target, "employee_name");
        assert_eq!(hs[0].confidence, 0.9);
    }

    #[test]
    fn date_columns_pair_into_temporal_candidates() {
        let candidates = detect(vec![
            json!({"start": "2024-01-01", "end": "2024-02-01", "note": "hello world"}),
            json!({"start": "2024-03-01", "end": "2024-04-01", "note": "more text"}),
        ]);
        let ts = of_kind(&candidates, RelationshipKind::Temporal);
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].source, "start");
        assert_eq!(ts[0].target, "end");
        assert_eq!(ts[0].confidence, 0.7);
    }

    #[test]
    fn three_date_columns_yield_three_pairs() {
        let candidates = detect(vec![
            json!({"created": "2024-01-01", "updated": "2024-01-02", "closed": "2024-01-03"}),
        ]);
        assert_eq!(of_kind(&candidates, RelationshipKind::Temporal).len(), 3);
    }

    #[test]
    fn no_candidates_for_unrelated_columns() {
        let candidates = detect(vec![
            json!({"name": "ada lovelace", "note": "pioneer of computing"}),
            json!({"name": "grace hopper", "note": "invented the compiler"}),
        ]);
        assert!(candidates.is_empty());
    }
}
