//! Schema assembly from profiles and relationship candidates.

use graphloom_core::{
    ColumnProfile, EntityDef, PropertyDef, RelationshipCandidate, Schema, UniqueConstraint,
    MAIN_ENTITY,
};
use tracing::debug;

/// Assembles the conservative single-entity schema: every column becomes a
/// property of one `Record` entity, and relationship candidates are carried
/// through untouched.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder;

impl SchemaBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(
        &self,
        profiles: &[ColumnProfile],
        relationships: Vec<RelationshipCandidate>,
    ) -> Schema {
        let properties: Vec<PropertyDef> = profiles
            .iter()
            .map(|profile| PropertyDef {
                name: profile.name.clone(),
                column_type: profile.column_type,
                patterns: profile.patterns.clone(),
                nullable: profile.null_count > 0,
                unique: profile.is_unique(),
                stats: profile.stats.clone(),
            })
            .collect();

        let constraints: Vec<UniqueConstraint> = properties
            .iter()
            .filter(|p| p.unique)
            .map(|p| UniqueConstraint {
                entity: MAIN_ENTITY.to_string(),
                property: p.name.clone(),
            })
            .collect();

        debug!(
            properties = properties.len(),
            relationships = relationships.len(),
            constraints = constraints.len(),
            "schema assembled"
        );

        Schema {
            entities: vec![EntityDef {
                name: MAIN_ENTITY.to_string(),
                properties,
            }],
            relationships,
            constraints,
        }
    }
}
