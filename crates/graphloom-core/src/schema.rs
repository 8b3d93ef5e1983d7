//! Entity/relationship schema assembled from column profiles.

use crate::profile::{ColumnStats, ColumnType, PatternTag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Name of the single synthetic entity representing the tabular source.
pub const MAIN_ENTITY: &str = "Record";

/// Kinds of relationship hypotheses between columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    ForeignKey,
    Hierarchical,
    Temporal,
    Semantic,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::ForeignKey => "foreign_key",
            RelationshipKind::Hierarchical => "hierarchical",
            RelationshipKind::Temporal => "temporal",
            RelationshipKind::Semantic => "semantic",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A relationship hypothesis between two columns. Foreign-key candidates are
/// backed by value overlap; the other kinds come from name/type heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipCandidate {
    pub kind: RelationshipKind,
    pub source: String,
    pub target: String,
    /// In [0, 1]. Overlap ratio for foreign keys, fixed per-kind otherwise.
    pub confidence: f64,
    pub description: String,
}

/// One entity property, mirroring a source column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub column_type: ColumnType,
    pub patterns: BTreeSet<PatternTag>,
    pub nullable: bool,
    pub unique: bool,
    pub stats: ColumnStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    pub properties: Vec<PropertyDef>,
}

/// Uniqueness constraint on one property of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    pub entity: String,
    pub property: String,
}

/// The inferred schema for one dataset: a single conservative entity plus
/// relationship candidates and uniqueness constraints. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub entities: Vec<EntityDef>,
    pub relationships: Vec<RelationshipCandidate>,
    pub constraints: Vec<UniqueConstraint>,
}

impl Schema {
    pub fn main_entity(&self) -> Option<&EntityDef> {
        self.entities.first()
    }
}
