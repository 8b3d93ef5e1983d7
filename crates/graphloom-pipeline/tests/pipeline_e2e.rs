//! End-to-end pipeline runs against an in-memory SurrealDB store.

use graphloom_core::{Dataset, RelationshipKind, RunStatus, StepName};
use graphloom_pipeline::{PipelineConfig, PipelineService};
use graphloom_surrealdb::{SurrealClient, SurrealGraphStore};
use serde_json::json;
use std::sync::Arc;

async fn memory_service(config: PipelineConfig) -> PipelineService {
    let client = SurrealClient::memory().await.expect("in-memory store");
    PipelineService::new(Arc::new(SurrealGraphStore::new(client)), config)
}

fn org_chart() -> Dataset {
    Dataset::from_json_rows(&[
        json!({"id": 1, "mgr": 2}),
        json!({"id": 2, "mgr": 3}),
        json!({"id": 3, "mgr": 1}),
    ])
}

#[tokio::test]
async fn org_chart_end_to_end() {
    let service = memory_service(PipelineConfig::default()).await;
    let result = service.run_pipeline(&org_chart()).await.unwrap();

    // Structuring: one entity, two columns, a full-overlap foreign key.
    let entity = result.schema.main_entity().unwrap();
    assert_eq!(entity.properties.len(), 2);
    let fk = result
        .schema
        .relationships
        .iter()
        .find(|r| r.kind == RelationshipKind::ForeignKey)
        .unwrap();
    assert_eq!((fk.source.as_str(), fk.target.as_str()), ("id", "mgr"));
    assert_eq!(fk.confidence, 1.0);

    // Modeling: the foreign key compiled into a named edge type.
    assert!(result
        .graph_model
        .relationship_types
        .iter()
        .any(|r| r.name == "RELATES_TO_ID_MGR"));

    // Loading: every row became a node, the management cycle became edges.
    assert!(!result.load.demo_mode);
    assert_eq!(result.load.node_count, 3);
    assert_eq!(result.load.relationship_count, 3);
    assert_eq!(result.analysis.node_count, 3);
    assert_eq!(result.analysis.density, 0.5);
    assert_eq!(result.analysis.top_nodes.len(), 3);

    // Job tracking: three completed steps in order.
    let job = service.job_status(&result.job_id).await.unwrap();
    assert_eq!(job.status, RunStatus::Completed);
    let steps: Vec<StepName> = job.steps.iter().map(|s| s.name).collect();
    assert_eq!(
        steps,
        vec![
            StepName::DataLoading,
            StepName::DataStructuring,
            StepName::GraphModeling
        ]
    );
    assert!(job
        .steps
        .iter()
        .all(|s| s.status == RunStatus::Completed && s.finished_at.is_some()));
}

#[tokio::test]
async fn batch_with_one_bad_dataset() {
    let service = memory_service(PipelineConfig::default()).await;
    let datasets = vec![org_chart(), Dataset::default(), org_chart()];

    let report = service.process_batch(&datasets).await;
    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.successful, 2);
    assert_eq!(report.summary.failed, 1);

    let failed_indexes: Vec<usize> = report.errors.iter().map(|(i, _)| *i).collect();
    assert_eq!(failed_indexes, vec![1]);
    let ok_indexes: Vec<usize> = report.results.iter().map(|(i, _)| *i).collect();
    assert_eq!(ok_indexes, vec![0, 2]);

    // Every attempt, failed included, is in the history (most recent first).
    let history = service.job_history().await;
    assert_eq!(history.len(), 3);
    assert_eq!(history[1].status, RunStatus::Failed);
    assert_eq!(history[0].status, RunStatus::Completed);
}

#[tokio::test]
async fn rerun_with_clear_does_not_accumulate() {
    let service = memory_service(PipelineConfig {
        clear_existing: true,
        ..PipelineConfig::default()
    })
    .await;

    let first = service.run_pipeline(&org_chart()).await.unwrap();
    let second = service.run_pipeline(&org_chart()).await.unwrap();
    assert_eq!(first.analysis.node_count, second.analysis.node_count);
    assert_eq!(
        first.analysis.relationship_count,
        second.analysis.relationship_count
    );
}

#[tokio::test]
async fn dates_produce_temporal_edges() {
    let service = memory_service(PipelineConfig::default()).await;
    let dataset = Dataset::from_json_rows(&[
        json!({"task": "design review", "started": "2024-01-01", "finished": "2024-01-10"}),
        json!({"task": "implementation", "started": "2024-02-01", "finished": "2024-03-01"}),
    ]);

    let result = service.run_pipeline(&dataset).await.unwrap();
    let temporal = result
        .graph_model
        .relationship_types
        .iter()
        .find(|r| r.kind == RelationshipKind::Temporal)
        .unwrap();
    assert_eq!(temporal.source_column, "started");
    assert_eq!(temporal.target_column, "finished");
    assert!(result.load.relationship_count >= 1);
}
