//! Structuring stage: column profiling, relationship discovery, schema
//! assembly, and graph-model compilation.
//!
//! All components here are pure: they read a dataset (plus earlier stage
//! outputs) and produce immutable values, leaving persistence to the store
//! crates.

pub mod compiler;
pub mod detector;
pub mod profiler;
pub mod schema_builder;

pub use compiler::GraphModelCompiler;
pub use detector::RelationshipDetector;
pub use profiler::{ColumnProfiler, DEFAULT_SAMPLE_LIMIT};
pub use schema_builder::SchemaBuilder;
