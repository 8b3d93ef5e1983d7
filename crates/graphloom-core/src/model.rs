//! Store-facing graph model compiled from a schema.

use crate::profile::ColumnType;
use crate::schema::RelationshipKind;
use serde::{Deserialize, Serialize};

/// Sanitize an arbitrary column name into a storage field identifier:
/// lowercase, `[a-z0-9_]` only, never starting with a digit.
pub fn field_ident(name: &str) -> String {
    let mut ident: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, 'f');
    }
    ident
}

/// Uppercase variant used in generated relationship type names.
pub fn relationship_ident(name: &str) -> String {
    field_ident(name).to_ascii_uppercase()
}

/// One node property with its index/uniqueness flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProperty {
    /// Original column name.
    pub name: String,
    /// Sanitized storage field.
    pub field: String,
    pub column_type: ColumnType,
    pub indexed: bool,
    pub unique: bool,
}

/// One node label and its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTypeDef {
    pub name: String,
    /// Storage table for this label.
    pub table: String,
    pub properties: Vec<NodeProperty>,
}

impl NodeTypeDef {
    pub fn property(&self, name: &str) -> Option<&NodeProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Uniqueness constraint as the store will enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDef {
    pub node_type: String,
    pub field: String,
}

/// One relationship type, carrying its provenance as edge properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipTypeDef {
    /// Generated name, e.g. `RELATES_TO_ID_MGR`. Collisions are resolved
    /// with a numeric suffix at compile time.
    pub name: String,
    /// Storage edge table (lowercase of `name`).
    pub table: String,
    pub kind: RelationshipKind,
    pub source_column: String,
    pub target_column: String,
    pub source_field: String,
    pub target_field: String,
    pub confidence: f64,
    pub description: String,
}

/// Deterministic compilation target: what the graph store materializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphModel {
    pub node_types: Vec<NodeTypeDef>,
    pub constraints: Vec<ConstraintDef>,
    pub relationship_types: Vec<RelationshipTypeDef>,
}

impl GraphModel {
    /// The single node type compiled from the main entity.
    pub fn primary_node(&self) -> Option<&NodeTypeDef> {
        self.node_types.first()
    }
}
