use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "graphloom")]
#[command(about = "graphloom - turn tabular JSON into a property graph")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (TOML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// RocksDB directory for persistent storage; omit for in-memory
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Force the offline demo store
    #[arg(long, global = true)]
    pub demo: bool,

    /// Wipe existing graph data before loading
    #[arg(long, global = true)]
    pub clear: bool,

    /// Verbose logging (shortcut for RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline on one JSON file and print the report
    Run {
        /// JSON file containing an array of flat objects
        file: PathBuf,

        /// Print the full result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Run several JSON files sequentially and print a batch summary
    Batch {
        /// JSON files, each an array of flat objects
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}
