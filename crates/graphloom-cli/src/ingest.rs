//! JSON file ingestion.
//!
//! The pipeline itself is source-agnostic; this is the one place that turns
//! a file on disk into a `Dataset`.

use anyhow::{bail, Context, Result};
use graphloom_core::Dataset;
use std::path::Path;
use tracing::debug;

/// Read a JSON array of flat objects into a dataset.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let Some(rows) = value.as_array() else {
        bail!("{} must contain a JSON array of records", path.display());
    };

    let dataset = Dataset::from_json_rows(rows);
    let meta = dataset.meta("json-file");
    debug!(
        file = %path.display(),
        rows = meta.row_count,
        columns = meta.columns.len(),
        "dataset ingested"
    );
    Ok(dataset)
}
