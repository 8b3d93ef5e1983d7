//! TOML configuration with CLI-flag overrides.
//!
//! Precedence, lowest to highest: built-in defaults, config file, command
//! line flags.

use anyhow::{Context, Result};
use graphloom_pipeline::PipelineConfig;
use graphloom_surrealdb::SurrealConfig;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub pipeline: PipelineSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSection {
    pub path: Option<String>,
    pub namespace: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineSection {
    pub sample_limit: Option<usize>,
    pub clear_existing: Option<bool>,
    pub history_capacity: Option<usize>,
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn surreal_config(&self, db_path_flag: Option<&str>) -> SurrealConfig {
        let mut config = SurrealConfig::default();
        if let Some(namespace) = &self.store.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(database) = &self.store.database {
            config.database = database.clone();
        }
        if let Some(path) = &self.store.path {
            config.path = path.clone();
        }
        if let Some(path) = db_path_flag {
            config.path = path.to_string();
        }
        config
    }

    pub fn pipeline_config(&self, clear_flag: bool) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        if let Some(sample_limit) = self.pipeline.sample_limit {
            config.sample_limit = sample_limit;
        }
        if let Some(clear_existing) = self.pipeline.clear_existing {
            config.clear_existing = clear_existing;
        }
        if let Some(capacity) = self.pipeline.history_capacity {
            config.history_capacity = capacity;
        }
        if clear_flag {
            config.clear_existing = true;
        }
        config
    }
}
