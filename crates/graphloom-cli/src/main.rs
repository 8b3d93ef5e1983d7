use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use graphloom_cli::{
    cli::{Cli, Commands},
    config::CliConfig,
    ingest, report,
};
use graphloom_core::GraphStore;
use graphloom_pipeline::PipelineService;
use graphloom_surrealdb::{connect_or_demo, DemoGraphStore};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let config = CliConfig::load(cli.config.as_deref())?;

    let store: Arc<dyn GraphStore> = if cli.demo {
        info!("demo mode forced, no database will be opened");
        Arc::new(DemoGraphStore::new())
    } else {
        connect_or_demo(config.surreal_config(cli.db_path.as_deref())).await
    };
    let service = PipelineService::new(store, config.pipeline_config(cli.clear));

    match cli.command {
        Commands::Run { file, json } => {
            let dataset = ingest::read_dataset(&file)?;
            let result = service.run_pipeline(&dataset).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                report::print_result(&result);
            }
        }

        Commands::Batch { files } => {
            let mut datasets = Vec::with_capacity(files.len());
            for file in &files {
                datasets.push(ingest::read_dataset(file)?);
            }
            let batch = service.process_batch(&datasets).await;
            report::print_batch(&files, &batch);
            report::print_history(&service.job_history().await);
        }
    }

    Ok(())
}
