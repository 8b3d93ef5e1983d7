//! Job and step tracking types owned by the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Lifecycle status shared by jobs and steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Started,
    Completed,
    Failed,
}

/// The three pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepName {
    DataLoading,
    DataStructuring,
    GraphModeling,
}

impl StepName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::DataLoading => "dataLoading",
            StepName::DataStructuring => "dataStructuring",
            StepName::GraphModeling => "graphModeling",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One pipeline stage's progress, mutated in place as the stage runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: StepName,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Short human-readable result summary on success.
    pub detail: Option<String>,
    pub error: Option<String>,
}

impl StepRecord {
    pub fn start(name: StepName) -> Self {
        Self {
            name,
            status: RunStatus::Started,
            started_at: Utc::now(),
            finished_at: None,
            detail: None,
            error: None,
        }
    }

    pub fn complete(&mut self, detail: impl Into<String>) {
        self.status = RunStatus::Completed;
        self.finished_at = Some(Utc::now());
        self.detail = Some(detail.into());
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error.into());
    }
}

/// One pipeline invocation with its ordered step history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: RunStatus,
    pub steps: Vec<StepRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl Job {
    pub fn new() -> Self {
        Self {
            id: new_job_id(),
            status: RunStatus::Started,
            steps: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            error: None,
        }
    }

    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error.into());
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id.clone(),
            status: self.status,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

/// Compact view for history listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Opaque time-plus-random job id, unique within process lifetime.
pub fn new_job_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("job-{}-{:08x}", millis, rand::random::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_ids_are_distinct() {
        let a = new_job_id();
        let b = new_job_id();
        assert_ne!(a, b);
        assert!(a.starts_with("job-"));
    }

    #[test]
    fn step_transitions_set_timestamps() {
        let mut step = StepRecord::start(StepName::DataLoading);
        assert_eq!(step.status, RunStatus::Started);
        assert!(step.finished_at.is_none());

        step.complete("3 rows");
        assert_eq!(step.status, RunStatus::Completed);
        assert!(step.finished_at.is_some());
        assert_eq!(step.detail.as_deref(), Some("3 rows"));
    }

    #[test]
    fn step_names_use_camel_case_wire_form() {
        let json = serde_json::to_value(StepName::DataStructuring).unwrap();
        assert_eq!(json, serde_json::json!("dataStructuring"));
    }

    #[test]
    fn failing_a_job_records_the_error() {
        let mut job = Job::new();
        job.fail("dataset has no rows");
        assert_eq!(job.status, RunStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("dataset has no rows"));
        assert!(job.finished_at.is_some());
    }
}
