//! CLI support modules: argument parsing, configuration, ingestion,
//! report printing. The binary in `main.rs` wires these together.

pub mod cli;
pub mod config;
pub mod ingest;
pub mod report;
