//! Human-readable report printing.

use graphloom_core::JobSummary;
use graphloom_pipeline::{BatchReport, PipelineResult};
use std::path::PathBuf;

pub fn print_result(result: &PipelineResult) {
    println!("job {}", result.job_id);
    if result.load.demo_mode {
        println!("  (demo mode)");
    }

    if let Some(entity) = result.schema.main_entity() {
        println!("\nschema: entity '{}'", entity.name);
        for property in &entity.properties {
            let mut flags = Vec::new();
            if property.unique {
                flags.push("unique");
            }
            if property.nullable {
                flags.push("nullable");
            }
            let suffix = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };
            println!("  {} : {}{}", property.name, property.column_type, suffix);
        }
    }

    println!("\nrelationship types:");
    if result.graph_model.relationship_types.is_empty() {
        println!("  (none)");
    }
    for rel in &result.graph_model.relationship_types {
        println!(
            "  {} ({}, confidence {:.2}): {}",
            rel.name, rel.kind, rel.confidence, rel.description
        );
    }

    println!(
        "\nloaded {} nodes, {} relationships (density {:.4})",
        result.load.node_count, result.load.relationship_count, result.analysis.density
    );

    if !result.analysis.top_nodes.is_empty() {
        println!("top nodes by degree:");
        for node in &result.analysis.top_nodes {
            println!("  {} ({})", node.node_id, node.degree);
        }
    }

    for insight in &result.load.insights {
        println!("note: {}", insight);
    }
}

pub fn print_batch(files: &[PathBuf], report: &BatchReport) {
    println!(
        "batch: {} total, {} successful, {} failed",
        report.summary.total, report.summary.successful, report.summary.failed
    );
    for (index, result) in &report.results {
        println!(
            "  ok   {} -> job {} ({} nodes, {} relationships)",
            files[*index].display(),
            result.job_id,
            result.load.node_count,
            result.load.relationship_count
        );
    }
    for (index, error) in &report.errors {
        println!("  fail {} -> {}", files[*index].display(), error);
    }
}

pub fn print_history(history: &[JobSummary]) {
    println!("\njob history:");
    for job in history {
        let finished = job
            .finished_at
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} {:?} started {} finished {}",
            job.id,
            job.status,
            job.started_at.to_rfc3339(),
            finished
        );
    }
}
