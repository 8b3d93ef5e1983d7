//! Core types and abstractions for the Graphloom pipeline.
//!
//! This crate defines the shared data model (datasets, column profiles,
//! schemas, graph models, jobs) and the `GraphStore` trait that backend
//! crates implement. It deliberately contains no backend dependency:
//! storage implementations are injected by higher-level crates.

pub mod error;
pub mod events;
pub mod job;
pub mod model;
pub mod profile;
pub mod schema;
pub mod store;
pub mod value;

pub use error::{PipelineError, StoreError, StoreResult};
pub use events::JobEvent;
pub use job::{Job, JobSummary, RunStatus, StepName, StepRecord};
pub use model::{
    field_ident, relationship_ident, ConstraintDef, GraphModel, NodeProperty, NodeTypeDef,
    RelationshipTypeDef,
};
pub use profile::{ColumnProfile, ColumnStats, ColumnType, PatternTag};
pub use schema::{
    EntityDef, PropertyDef, RelationshipCandidate, RelationshipKind, Schema, UniqueConstraint,
    MAIN_ENTITY,
};
pub use store::{GraphAnalysis, GraphStore, LoadReport, NodeDegree};
pub use value::{parse_temporal, Dataset, DatasetMeta, FieldValue, Record};
