//! Compilation of a schema into the store-facing graph model.

use graphloom_core::{
    field_ident, relationship_ident, ConstraintDef, GraphModel, NodeProperty, NodeTypeDef,
    PatternTag, RelationshipKind, RelationshipTypeDef, Schema,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

const SEMANTIC_CONFIDENCE: f64 = 0.6;

/// Shared name fragments that suggest two columns describe the same concept.
const SEMANTIC_KEYWORDS: &[&str] = &["id", "name", "type", "status", "date", "time"];

/// Compiles a schema into a `GraphModel`. Pure and deterministic: the same
/// schema always compiles to the same model, so re-running a job cannot
/// produce divergent edge tables.
#[derive(Debug, Clone, Default)]
pub struct GraphModelCompiler;

impl GraphModelCompiler {
    pub fn new() -> Self {
        Self
    }

    pub fn compile(&self, schema: &Schema) -> GraphModel {
        // Sanitization can collapse distinct columns onto one ident ("a b"
        // and "a_b" both give a_b); allocate storage fields up front so every
        // column keeps its own, and constraints and edge types agree on them.
        let mut field_names = NameAllocator::default();
        let fields: HashMap<String, String> = schema
            .entities
            .iter()
            .flat_map(|e| e.properties.iter())
            .map(|p| (p.name.clone(), field_names.allocate(field_ident(&p.name))))
            .collect();

        let constraints: Vec<ConstraintDef> = schema
            .constraints
            .iter()
            .map(|c| ConstraintDef {
                node_type: c.entity.clone(),
                field: resolved_field(&fields, &c.property),
            })
            .collect();

        let mut names = NameAllocator::default();
        let mut relationship_types = Vec::new();

        for candidate in &schema.relationships {
            let base = match candidate.kind {
                RelationshipKind::ForeignKey => format!(
                    "RELATES_TO_{}_{}",
                    relationship_ident(&candidate.source),
                    relationship_ident(&candidate.target)
                ),
                RelationshipKind::Hierarchical => format!(
                    "PARENT_OF_{}_{}",
                    relationship_ident(&candidate.source),
                    relationship_ident(&candidate.target)
                ),
                RelationshipKind::Temporal => format!(
                    "PRECEDES_{}_{}",
                    relationship_ident(&candidate.source),
                    relationship_ident(&candidate.target)
                ),
                RelationshipKind::Semantic => format!(
                    "SHARES_{}_{}",
                    relationship_ident(&candidate.source),
                    relationship_ident(&candidate.target)
                ),
            };
            let name = names.allocate(base);
            relationship_types.push(relationship_type(name, candidate.kind, candidate, &fields));
        }

        relationship_types.extend(self.semantic_types(schema, &mut names, &fields));

        // Columns that participate in any edge type get a secondary index;
        // edge materialization joins on them.
        let join_columns: HashSet<&str> = relationship_types
            .iter()
            .flat_map(|r| [r.source_column.as_str(), r.target_column.as_str()])
            .collect();

        let node_types: Vec<NodeTypeDef> = schema
            .entities
            .iter()
            .map(|entity| NodeTypeDef {
                name: entity.name.clone(),
                table: entity.name.to_ascii_lowercase(),
                properties: entity
                    .properties
                    .iter()
                    .map(|p| NodeProperty {
                        name: p.name.clone(),
                        field: resolved_field(&fields, &p.name),
                        column_type: p.column_type,
                        indexed: p.unique
                            || p.patterns.contains(&PatternTag::Identifier)
                            || join_columns.contains(p.name.as_str()),
                        unique: p.unique,
                    })
                    .collect(),
            })
            .collect();

        debug!(
            node_types = node_types.len(),
            relationship_types = relationship_types.len(),
            "graph model compiled"
        );

        GraphModel {
            node_types,
            constraints,
            relationship_types,
        }
    }

    /// Column pairs sharing a semantic keyword become equality-join edge
    /// types. Pairs already covered by a detected candidate are skipped.
    fn semantic_types(
        &self,
        schema: &Schema,
        names: &mut NameAllocator,
        fields: &HashMap<String, String>,
    ) -> Vec<RelationshipTypeDef> {
        let columns: Vec<&str> = schema
            .entities
            .iter()
            .flat_map(|e| e.properties.iter().map(|p| p.name.as_str()))
            .collect();

        let covered: HashSet<(String, String)> = schema
            .relationships
            .iter()
            .map(|c| (c.source.clone(), c.target.clone()))
            .collect();

        let mut out = Vec::new();
        let mut seen_pairs: HashSet<(String, String)> = HashSet::new();

        for keyword in SEMANTIC_KEYWORDS {
            let matching: Vec<&str> = columns
                .iter()
                .copied()
                .filter(|c| c.to_ascii_lowercase().contains(keyword))
                .collect();

            for i in 0..matching.len() {
                for j in (i + 1)..matching.len() {
                    let (source, target) = (matching[i].to_string(), matching[j].to_string());
                    let pair = (source.clone(), target.clone());
                    if covered.contains(&pair) || !seen_pairs.insert(pair) {
                        continue;
                    }
                    let base = format!(
                        "SHARES_{}_{}_{}",
                        keyword.to_ascii_uppercase(),
                        relationship_ident(&source),
                        relationship_ident(&target)
                    );
                    let candidate = graphloom_core::RelationshipCandidate {
                        kind: RelationshipKind::Semantic,
                        source: source.clone(),
                        target: target.clone(),
                        confidence: SEMANTIC_CONFIDENCE,
                        description: format!(
                            "'{}' and '{}' both reference '{}'",
                            source, target, keyword
                        ),
                    };
                    out.push(relationship_type(
                        names.allocate(base),
                        RelationshipKind::Semantic,
                        &candidate,
                        fields,
                    ));
                }
            }
        }

        // id<->name cross-match: an identifier column and a name column
        // usually describe the same thing from two angles.
        let id_columns: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|c| c.to_ascii_lowercase().contains("id"))
            .collect();
        let name_columns: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|c| c.to_ascii_lowercase().contains("name"))
            .collect();
        for source in &id_columns {
            for target in &name_columns {
                if source == target {
                    continue;
                }
                let pair = (source.to_string(), target.to_string());
                if covered.contains(&pair) || !seen_pairs.insert(pair) {
                    continue;
                }
                let base = format!(
                    "SHARES_ID_NAME_{}_{}",
                    relationship_ident(source),
                    relationship_ident(target)
                );
                let candidate = graphloom_core::RelationshipCandidate {
                    kind: RelationshipKind::Semantic,
                    source: source.to_string(),
                    target: target.to_string(),
                    confidence: SEMANTIC_CONFIDENCE,
                    description: format!(
                        "'{}' and '{}' cross-reference an identifier and a name",
                        source, target
                    ),
                };
                out.push(relationship_type(
                    names.allocate(base),
                    RelationshipKind::Semantic,
                    &candidate,
                    fields,
                ));
            }
        }
        out
    }
}

/// The allocated storage field for a column, falling back to plain
/// sanitization for columns outside the schema.
fn resolved_field(fields: &HashMap<String, String>, column: &str) -> String {
    fields
        .get(column)
        .cloned()
        .unwrap_or_else(|| field_ident(column))
}

fn relationship_type(
    name: String,
    kind: RelationshipKind,
    candidate: &graphloom_core::RelationshipCandidate,
    fields: &HashMap<String, String>,
) -> RelationshipTypeDef {
    RelationshipTypeDef {
        table: name.to_ascii_lowercase(),
        name,
        kind,
        source_column: candidate.source.clone(),
        target_column: candidate.target.clone(),
        source_field: resolved_field(fields, &candidate.source),
        target_field: resolved_field(fields, &candidate.target),
        confidence: candidate.confidence,
        description: candidate.description.clone(),
    }
}

/// Keeps generated identifiers unique by numeric suffix.
#[derive(Default)]
struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    fn allocate(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
