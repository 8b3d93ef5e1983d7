//! Pipeline orchestration.
//!
//! `PipelineService` wires the structuring stage (graphloom-inference) to an
//! injected `GraphStore` and tracks every run as a job with per-step status,
//! a bounded history, and broadcast status events.

pub mod service;

pub use service::{
    BatchReport, BatchSummary, PipelineConfig, PipelineResult, PipelineService,
    DEFAULT_HISTORY_CAPACITY,
};
