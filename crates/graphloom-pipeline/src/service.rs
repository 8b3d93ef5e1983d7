//! The pipeline service: sequential stages, job tracking, batch runs.

use graphloom_core::{
    Dataset, GraphAnalysis, GraphModel, GraphStore, Job, JobEvent, JobSummary, LoadReport,
    PipelineError, RunStatus, Schema, StepName, StepRecord,
};
use graphloom_inference::{
    ColumnProfiler, GraphModelCompiler, RelationshipDetector, SchemaBuilder,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, warn};

/// Completed jobs retained when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Tuning knobs for one service instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Rows sampled by the column profiler.
    pub sample_limit: usize,
    /// Wipe the model's tables before loading.
    pub clear_existing: bool,
    /// Ring-buffer capacity of the job history.
    pub history_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_limit: graphloom_inference::DEFAULT_SAMPLE_LIMIT,
            clear_existing: false,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Everything one successful run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub job_id: String,
    pub schema: Schema,
    pub graph_model: GraphModel,
    pub load: LoadReport,
    pub analysis: GraphAnalysis,
}

/// Outcome of `process_batch`: successes and failures by input index.
#[derive(Debug)]
pub struct BatchReport {
    pub results: Vec<(usize, PipelineResult)>,
    pub errors: Vec<(usize, String)>,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Orchestrates the three pipeline stages against an injected store.
///
/// Cheap to share behind an `Arc`; all interior state is locked or channel
/// based. Events are broadcast best-effort: a missing or lagging subscriber
/// never blocks a job.
pub struct PipelineService {
    store: Arc<dyn GraphStore>,
    config: PipelineConfig,
    history: RwLock<VecDeque<Job>>,
    events: broadcast::Sender<JobEvent>,
}

impl PipelineService {
    pub fn new(store: Arc<dyn GraphStore>, config: PipelineConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            config,
            history: RwLock::new(VecDeque::new()),
            events,
        }
    }

    pub fn with_defaults(store: Arc<dyn GraphStore>) -> Self {
        Self::new(store, PipelineConfig::default())
    }

    /// Subscribe to per-step status events for all jobs.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// Run the full pipeline on one dataset.
    ///
    /// Stages run strictly in order; the first failure marks the current
    /// step and the job as failed and aborts the run. The job is recorded in
    /// history either way.
    pub async fn run_pipeline(&self, dataset: &Dataset) -> Result<PipelineResult, PipelineError> {
        let mut job = Job::new();
        info!(job_id = %job.id, rows = dataset.row_count(), "pipeline started");

        self.start_step(&mut job, StepName::DataLoading);
        if dataset.is_empty() {
            return Err(self.abort(job, PipelineError::EmptyDataset).await);
        }
        if dataset.columns.is_empty() {
            return Err(self.abort(job, PipelineError::NoColumns).await);
        }
        self.complete_step(
            &mut job,
            format!("{} rows, {} columns", dataset.row_count(), dataset.columns.len()),
        );

        self.start_step(&mut job, StepName::DataStructuring);
        let profiles =
            ColumnProfiler::with_sample_limit(self.config.sample_limit).profile(dataset);
        let candidates = RelationshipDetector::new().detect(dataset, &profiles);
        let schema = SchemaBuilder::new().build(&profiles, candidates);
        self.complete_step(
            &mut job,
            format!(
                "{} properties, {} relationship candidates",
                schema.main_entity().map(|e| e.properties.len()).unwrap_or(0),
                schema.relationships.len()
            ),
        );

        self.start_step(&mut job, StepName::GraphModeling);
        let model = GraphModelCompiler::new().compile(&schema);

        if self.config.clear_existing {
            if let Err(err) = self.store.clear(&model).await {
                return Err(self.abort(job, err.into()).await);
            }
        }
        if let Err(err) = self.store.apply_model(&model).await {
            return Err(self.abort(job, err.into()).await);
        }
        let node_count = match self.store.load_nodes(&model, dataset).await {
            Ok(count) => count,
            Err(err) => return Err(self.abort(job, err.into()).await),
        };
        let relationship_count = match self.store.materialize_relationships(&model, dataset).await
        {
            Ok(count) => count,
            Err(err) => return Err(self.abort(job, err.into()).await),
        };
        let analysis = match self.store.analyze(&model).await {
            Ok(analysis) => analysis,
            Err(err) => return Err(self.abort(job, err.into()).await),
        };
        self.complete_step(
            &mut job,
            format!("{} nodes, {} relationships", node_count, relationship_count),
        );

        job.complete();
        if self.store.is_demo() {
            warn!(job_id = %job.id, "job ran against the demo store");
        }
        info!(job_id = %job.id, node_count, relationship_count, "pipeline completed");

        let result = PipelineResult {
            job_id: job.id.clone(),
            schema,
            graph_model: model,
            load: LoadReport {
                node_count,
                relationship_count,
                demo_mode: self.store.is_demo(),
                insights: self.store.insights(),
            },
            analysis,
        };
        self.push_history(job).await;
        Ok(result)
    }

    /// Run each dataset through the pipeline, strictly in order. One failing
    /// dataset never stops the rest.
    pub async fn process_batch(&self, datasets: &[Dataset]) -> BatchReport {
        let mut results = Vec::new();
        let mut errors = Vec::new();

        for (index, dataset) in datasets.iter().enumerate() {
            match self.run_pipeline(dataset).await {
                Ok(result) => results.push((index, result)),
                Err(err) => {
                    error!(index, error = %err, "batch item failed");
                    errors.push((index, err.to_string()));
                }
            }
        }

        let summary = BatchSummary {
            total: datasets.len(),
            successful: results.len(),
            failed: errors.len(),
        };
        info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            "batch finished"
        );
        BatchReport {
            results,
            errors,
            summary,
        }
    }

    /// Full record of one tracked job.
    pub async fn job_status(&self, job_id: &str) -> Result<Job, PipelineError> {
        self.history
            .read()
            .await
            .iter()
            .find(|job| job.id == job_id)
            .cloned()
            .ok_or_else(|| PipelineError::JobNotFound(job_id.to_string()))
    }

    /// Summaries of tracked jobs, most recent first.
    pub async fn job_history(&self) -> Vec<JobSummary> {
        self.history
            .read()
            .await
            .iter()
            .rev()
            .map(Job::summary)
            .collect()
    }

    fn start_step(&self, job: &mut Job, name: StepName) {
        job.steps.push(StepRecord::start(name));
        self.emit(JobEvent::new(&job.id, name, RunStatus::Started));
    }

    fn complete_step(&self, job: &mut Job, detail: String) {
        if let Some(step) = job.steps.last_mut() {
            step.complete(detail);
            self.emit(JobEvent::new(&job.id, step.name, RunStatus::Completed));
        }
    }

    fn fail_step(&self, job: &mut Job, message: &str) {
        if let Some(step) = job.steps.last_mut() {
            step.fail(message);
            self.emit(
                JobEvent::new(&job.id, step.name, RunStatus::Failed).with_error(message),
            );
        }
    }

    async fn abort(&self, mut job: Job, err: PipelineError) -> PipelineError {
        let message = err.to_string();
        error!(job_id = %job.id, error = %message, "pipeline failed");
        self.fail_step(&mut job, &message);
        job.fail(&message);
        self.push_history(job).await;
        err
    }

    async fn push_history(&self, job: Job) {
        let mut history = self.history.write().await;
        history.push_back(job);
        while history.len() > self.config.history_capacity {
            history.pop_front();
        }
    }

    fn emit(&self, event: JobEvent) {
        // No subscribers is fine; send only fails when nobody listens.
        let _ = self.events.send(event);
    }
}
