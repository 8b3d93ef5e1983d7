//! Graph store abstraction.
//!
//! Backend crates implement `GraphStore`; the orchestrator only sees this
//! trait, so the SurrealDB loader and the offline demo store are
//! interchangeable.

use crate::error::StoreResult;
use crate::model::GraphModel;
use crate::value::Dataset;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of loading one dataset into the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub node_count: u64,
    pub relationship_count: u64,
    pub demo_mode: bool,
    pub insights: Vec<String>,
}

/// One node and its total (in + out) degree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDegree {
    pub node_id: String,
    pub degree: u64,
}

/// Read-only statistics over the loaded graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphAnalysis {
    pub node_count: u64,
    pub relationship_count: u64,
    /// Actual edges over the maximum possible directed edges, 0 when fewer
    /// than two nodes exist.
    pub density: f64,
    /// Top ten nodes by degree, descending.
    pub top_nodes: Vec<NodeDegree>,
}

impl GraphAnalysis {
    pub fn density_for(node_count: u64, relationship_count: u64) -> f64 {
        if node_count > 1 {
            relationship_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
        } else {
            0.0
        }
    }
}

/// A property-graph backend.
///
/// Operations follow the loading order the orchestrator uses: optional
/// `clear`, `apply_model`, `load_nodes`, `materialize_relationships`,
/// `analyze`. Constraint/index creation inside `apply_model` must be
/// idempotent; node and relationship writes are fatal on failure.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// True for the offline fallback store.
    fn is_demo(&self) -> bool {
        false
    }

    /// Wipe existing data for this model's node and relationship types.
    /// Only called when explicitly configured, never by default.
    async fn clear(&self, model: &GraphModel) -> StoreResult<()>;

    /// Create tables, uniqueness constraints, and secondary indexes.
    async fn apply_model(&self, model: &GraphModel) -> StoreResult<()>;

    /// Insert all records as nodes, in fixed-size batches. Returns the
    /// number of nodes created.
    async fn load_nodes(&self, model: &GraphModel, dataset: &Dataset) -> StoreResult<u64>;

    /// Materialize all relationship types, in model order. A failure aborts
    /// the remaining types. Returns the number of edges created.
    async fn materialize_relationships(
        &self,
        model: &GraphModel,
        dataset: &Dataset,
    ) -> StoreResult<u64>;

    /// Compute statistics over the loaded graph. Read-only.
    async fn analyze(&self, model: &GraphModel) -> StoreResult<GraphAnalysis>;

    /// Illustrative notes about the load, if the backend provides any.
    fn insights(&self) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use std::sync::Mutex;

    /// Minimal in-memory implementation proving the trait is object-safe
    /// and mockable.
    struct CountingStore {
        nodes: Mutex<u64>,
    }

    #[async_trait]
    impl GraphStore for CountingStore {
        async fn clear(&self, _model: &GraphModel) -> StoreResult<()> {
            *self.nodes.lock().unwrap() = 0;
            Ok(())
        }

        async fn apply_model(&self, _model: &GraphModel) -> StoreResult<()> {
            Ok(())
        }

        async fn load_nodes(&self, _model: &GraphModel, dataset: &Dataset) -> StoreResult<u64> {
            let mut nodes = self.nodes.lock().unwrap();
            *nodes += dataset.row_count() as u64;
            Ok(*nodes)
        }

        async fn materialize_relationships(
            &self,
            _model: &GraphModel,
            _dataset: &Dataset,
        ) -> StoreResult<u64> {
            Err(StoreError::relationship("EDGE", "unsupported"))
        }

        async fn analyze(&self, _model: &GraphModel) -> StoreResult<GraphAnalysis> {
            let nodes = *self.nodes.lock().unwrap();
            Ok(GraphAnalysis {
                node_count: nodes,
                relationship_count: 0,
                density: GraphAnalysis::density_for(nodes, 0),
                top_nodes: vec![],
            })
        }
    }

    fn empty_model() -> GraphModel {
        GraphModel {
            node_types: vec![],
            constraints: vec![],
            relationship_types: vec![],
        }
    }

    #[tokio::test]
    async fn trait_object_dispatch_works() {
        let store: Box<dyn GraphStore> = Box::new(CountingStore {
            nodes: Mutex::new(0),
        });
        let dataset = Dataset::from_json_rows(&[serde_json::json!({"a": 1})]);

        assert!(!store.is_demo());
        let count = store.load_nodes(&empty_model(), &dataset).await.unwrap();
        assert_eq!(count, 1);

        let err = store
            .materialize_relationships(&empty_model(), &dataset)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Relationship { .. }));
    }

    #[test]
    fn density_definition() {
        assert_eq!(GraphAnalysis::density_for(0, 0), 0.0);
        assert_eq!(GraphAnalysis::density_for(1, 0), 0.0);
        assert_eq!(GraphAnalysis::density_for(3, 6), 1.0);
        assert_eq!(GraphAnalysis::density_for(3, 3), 0.5);
    }
}
