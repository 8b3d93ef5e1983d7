//! SurrealDB-backed `GraphStore`.
//!
//! Node types map to tables, relationship types to edge tables written with
//! `RELATE`, uniqueness constraints to `DEFINE INDEX ... UNIQUE`. Rows get
//! deterministic record ids (`row_<index>`) so re-running a load against the
//! same data is idempotent.

use crate::client::{escape_record_id, SurrealClient};
use async_trait::async_trait;
use graphloom_core::{
    parse_temporal, Dataset, FieldValue, GraphAnalysis, GraphStore, GraphModel, NodeDegree,
    RelationshipKind, RelationshipTypeDef, StoreError, StoreResult,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info};

/// Rows per INSERT statement.
pub const NODE_BATCH_SIZE: usize = 1000;

/// RELATE statements per query.
const RELATE_BATCH_SIZE: usize = 500;

/// Nodes reported in `GraphAnalysis::top_nodes`.
const TOP_NODE_LIMIT: usize = 10;

pub struct SurrealGraphStore {
    client: SurrealClient,
}

impl SurrealGraphStore {
    pub fn new(client: SurrealClient) -> Self {
        Self { client }
    }

    fn row_id(index: usize) -> String {
        format!("row_{}", index)
    }

    /// Run a DDL statement, tolerating re-definition. SurrealDB reports
    /// duplicate definitions as plain query errors, so the match is on the
    /// message text.
    async fn define(&self, sql: &str) -> StoreResult<()> {
        match self.client.query(sql, &[]).await {
            Ok(_) => Ok(()),
            Err(StoreError::Query(message)) if message.contains("already exists") => {
                debug!(sql, "definition already exists, skipping");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl GraphStore for SurrealGraphStore {
    async fn clear(&self, model: &GraphModel) -> StoreResult<()> {
        for rel in &model.relationship_types {
            self.client
                .query(&format!("DELETE {}", rel.table), &[])
                .await?;
        }
        for node in &model.node_types {
            self.client
                .query(&format!("DELETE {}", node.table), &[])
                .await?;
        }
        info!("cleared existing graph data");
        Ok(())
    }

    async fn apply_model(&self, model: &GraphModel) -> StoreResult<()> {
        for node in &model.node_types {
            self.define(&format!("DEFINE TABLE {} SCHEMALESS", node.table))
                .await?;

            for property in node.properties.iter().filter(|p| p.indexed && !p.unique) {
                self.define(&format!(
                    "DEFINE INDEX idx_{field} ON TABLE {table} FIELDS {field}",
                    field = property.field,
                    table = node.table
                ))
                .await?;
            }
        }

        for constraint in &model.constraints {
            let table = model
                .node_types
                .iter()
                .find(|n| n.name == constraint.node_type)
                .map(|n| n.table.as_str())
                .unwrap_or(&constraint.node_type);
            self.define(&format!(
                "DEFINE INDEX uniq_{field} ON TABLE {table} FIELDS {field} UNIQUE",
                field = constraint.field,
                table = table
            ))
            .await?;
        }

        for rel in &model.relationship_types {
            self.define(&format!("DEFINE TABLE {} TYPE RELATION", rel.table))
                .await?;
        }
        Ok(())
    }

    async fn load_nodes(&self, model: &GraphModel, dataset: &Dataset) -> StoreResult<u64> {
        let Some(node) = model.primary_node() else {
            return Ok(0);
        };

        let mut inserted: u64 = 0;
        for (batch_index, batch) in dataset.rows.chunks(NODE_BATCH_SIZE).enumerate() {
            let offset = batch_index * NODE_BATCH_SIZE;
            let payload: Vec<Value> = batch
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    let mut object = serde_json::Map::new();
                    object.insert("id".into(), json!(Self::row_id(offset + i)));
                    for property in &node.properties {
                        object.insert(property.field.clone(), row.get(&property.name).to_json());
                    }
                    Value::Object(object)
                })
                .collect();

            let body = serde_json::to_string(&payload)
                .map_err(|e| StoreError::write(format!("failed to encode batch: {}", e)))?;
            let created = self
                .client
                .query(&format!("INSERT INTO {} {}", node.table, body), &[])
                .await
                .map_err(|e| {
                    StoreError::write(format!("node batch {} failed: {}", batch_index, e))
                })?;
            // INSERT skips rows whose record id already exists; the response
            // holds only the records it actually created.
            inserted += created.len() as u64;
            debug!(batch = batch_index, rows = created.len(), "node batch inserted");
        }

        info!(count = inserted, table = %node.table, "nodes loaded");
        Ok(inserted)
    }

    async fn materialize_relationships(
        &self,
        model: &GraphModel,
        dataset: &Dataset,
    ) -> StoreResult<u64> {
        let Some(node) = model.primary_node() else {
            return Ok(0);
        };

        let mut created: u64 = 0;
        for rel in &model.relationship_types {
            let pairs = edge_pairs(rel, dataset);
            for batch in pairs.chunks(RELATE_BATCH_SIZE) {
                let statements: Vec<String> = batch
                    .iter()
                    .map(|(source, target)| {
                        format!(
                            "RELATE {table}:⟨{src}⟩->{edge}->{table}:⟨{tgt}⟩ \
                             SET kind = '{kind}', confidence = {confidence}, \
                             description = $description",
                            table = node.table,
                            src = escape_record_id(&Self::row_id(*source)),
                            edge = rel.table,
                            tgt = escape_record_id(&Self::row_id(*target)),
                            kind = rel.kind,
                            confidence = rel.confidence,
                        )
                    })
                    .collect();
                // Descriptions quote the column names, so they go through a
                // binding rather than into the statement text.
                self.client
                    .query(
                        &statements.join(";\n"),
                        &[json!({ "description": rel.description.clone() })],
                    )
                    .await
                    .map_err(|e| StoreError::relationship(&rel.name, e.to_string()))?;
            }
            debug!(relationship = %rel.name, edges = pairs.len(), "relationship materialized");
            created += pairs.len() as u64;
        }

        info!(count = created, "relationships materialized");
        Ok(created)
    }

    async fn analyze(&self, model: &GraphModel) -> StoreResult<GraphAnalysis> {
        let node_count = match model.primary_node() {
            Some(node) => {
                let rows = self
                    .client
                    .query(&format!("SELECT count() FROM {} GROUP ALL", node.table), &[])
                    .await?;
                rows.first()
                    .and_then(|r| r.get("count"))
                    .and_then(Value::as_u64)
                    .unwrap_or(0)
            }
            None => 0,
        };

        let mut relationship_count: u64 = 0;
        let mut degrees: HashMap<String, u64> = HashMap::new();
        for rel in &model.relationship_types {
            let rows = self
                .client
                .query(&format!("SELECT in, out FROM {}", rel.table), &[])
                .await?;
            relationship_count += rows.len() as u64;
            for row in &rows {
                for endpoint in ["in", "out"] {
                    if let Some(id) = row.get(endpoint).and_then(Value::as_str) {
                        *degrees.entry(record_key(id).to_string()).or_insert(0) += 1;
                    }
                }
            }
        }

        let mut top_nodes: Vec<NodeDegree> = degrees
            .into_iter()
            .map(|(node_id, degree)| NodeDegree { node_id, degree })
            .collect();
        top_nodes.sort_by(|a, b| b.degree.cmp(&a.degree).then(a.node_id.cmp(&b.node_id)));
        top_nodes.truncate(TOP_NODE_LIMIT);

        Ok(GraphAnalysis {
            node_count,
            relationship_count,
            density: GraphAnalysis::density_for(node_count, relationship_count),
            top_nodes,
        })
    }
}

/// The id part of a `table:id` reference.
fn record_key(reference: &str) -> &str {
    reference
        .find(':')
        .map(|idx| &reference[idx + 1..])
        .unwrap_or(reference)
}

/// Resolve one relationship type to its (source row, target row) index pairs.
///
/// Equality joins (foreign-key, hierarchical, semantic) connect row `i` to
/// row `j` when `i`'s source value equals `j`'s target value. Temporal joins
/// connect rows whose parsed source date is strictly before the target date.
/// Self-loops are always excluded.
fn edge_pairs(rel: &RelationshipTypeDef, dataset: &Dataset) -> Vec<(usize, usize)> {
    match rel.kind {
        RelationshipKind::Temporal => temporal_pairs(rel, dataset),
        _ => equality_pairs(rel, dataset),
    }
}

fn equality_pairs(rel: &RelationshipTypeDef, dataset: &Dataset) -> Vec<(usize, usize)> {
    let mut by_target: HashMap<String, Vec<usize>> = HashMap::new();
    for (j, row) in dataset.rows.iter().enumerate() {
        if let Some(key) = row.get(&rel.target_column).overlap_key() {
            by_target.entry(key).or_default().push(j);
        }
    }

    let mut pairs = Vec::new();
    for (i, row) in dataset.rows.iter().enumerate() {
        let Some(key) = row.get(&rel.source_column).overlap_key() else {
            continue;
        };
        if let Some(targets) = by_target.get(&key) {
            pairs.extend(targets.iter().filter(|&&j| j != i).map(|&j| (i, j)));
        }
    }
    pairs
}

fn temporal_pairs(rel: &RelationshipTypeDef, dataset: &Dataset) -> Vec<(usize, usize)> {
    let parse = |value: FieldValue| {
        if value.is_null_like() {
            None
        } else {
            parse_temporal(&value.display())
        }
    };
    let sources: Vec<_> = dataset
        .rows
        .iter()
        .map(|r| parse(r.get(&rel.source_column)))
        .collect();
    let targets: Vec<_> = dataset
        .rows
        .iter()
        .map(|r| parse(r.get(&rel.target_column)))
        .collect();

    let mut pairs = Vec::new();
    for (i, source) in sources.iter().enumerate() {
        let Some(source) = source else { continue };
        for (j, target) in targets.iter().enumerate() {
            if i == j {
                continue;
            }
            if let Some(target) = target {
                if source < target {
                    pairs.push((i, j));
                }
            }
        }
    }
    pairs
}
