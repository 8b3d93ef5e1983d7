//! Status events broadcast by the orchestrator.
//!
//! External observers (dashboard, logging) subscribe to a
//! `tokio::sync::broadcast` channel rather than hooking a shared event bus;
//! a dropped receiver never blocks the pipeline.

use crate::job::{RunStatus, StepName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Emitted after every step transition of every job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    pub job_id: String,
    pub step: StepName,
    pub status: RunStatus,
    pub at: DateTime<Utc>,
    pub error: Option<String>,
}

impl JobEvent {
    pub fn new(job_id: impl Into<String>, step: StepName, status: RunStatus) -> Self {
        Self {
            job_id: job_id.into(),
            step,
            status,
            at: Utc::now(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
