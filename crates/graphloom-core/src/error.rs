//! Error taxonomy shared across the pipeline.

use thiserror::Error;

/// Errors raised by graph store implementations.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("failed to materialize relationship '{name}': {message}")]
    Relationship { name: String, message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    pub fn relationship(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Relationship {
            name: name.into(),
            message: msg.into(),
        }
    }
}

/// Errors surfaced to pipeline callers.
///
/// Store unavailability at initialization is deliberately absent: the loader
/// downgrades to the offline demo store instead of failing the job.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("dataset has no columns")]
    NoColumns,

    #[error("unknown job id: {0}")]
    JobNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_error_names_the_type() {
        let err = StoreError::relationship("RELATES_TO_ID_MGR", "boom");
        assert_eq!(
            err.to_string(),
            "failed to materialize relationship 'RELATES_TO_ID_MGR': boom"
        );
    }

    #[test]
    fn store_errors_convert_to_pipeline_errors() {
        let err: PipelineError = StoreError::write("batch 3 failed").into();
        assert!(matches!(err, PipelineError::Store(_)));
    }
}
