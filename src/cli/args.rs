// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::Level;

#[derive(Parser)]
#[command(
    name = "tiergraph",
    version,
    about = "Three-tier architecture graphs from code inventories"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Log at debug level (overrides `RUST_LOG`)
    #[arg(long, short, global = true)]
    pub verbose: bool,
    /// Configuration file (defaults to ./tiergraph.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the graph and write it as JSON
    Build {
        /// Inventory JSON file or directory of shards
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Write the graph here instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Keep only nodes at or above this level
        #[arg(long, value_parser = parse_level)]
        level: Option<Level>,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Run twice, compare outputs and check graph invariants
    Check {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
    /// Attach purpose/responsibilities from a responses file
    Enrich {
        #[arg(value_name = "GRAPH")]
        graph: PathBuf,
        /// JSON object keyed by node id
        #[arg(long, value_name = "FILE")]
        responses: PathBuf,
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn parse_level(s: &str) -> Result<Level, String> {
    Level::parse(s).ok_or_else(|| format!("unknown level '{s}' (business, system, implementation)"))
}
