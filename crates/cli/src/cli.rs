use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub const DEFAULT_CONFIG: &str = "audiodl.toml";

#[derive(Parser, Debug)]
#[command(name = "audiodl", version, about = "Fetch pronunciation recordings from Forvo")]
pub struct Cli {
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Cache index location; overrides the config file.
    #[arg(long, global = true)]
    pub cache: Option<PathBuf>,
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve and download recordings for each query.
    Fetch {
        queries: Vec<String>,
        #[arg(long = "queries-file")]
        queries_file: Option<PathBuf>,
        #[arg(long = "target-dir")]
        target_dir: Option<PathBuf>,
        #[command(flatten)]
        lookup: LookupArgs,
        #[arg(long, action = ArgAction::SetTrue)]
        overwrite: bool,
        /// Highest reference index fetched per query (0 = unlimited).
        #[arg(long = "max-count")]
        max_count: Option<usize>,
        #[arg(long = "delay-ms")]
        delay_ms: Option<u64>,
        #[arg(long = "keep-going", action = ArgAction::SetTrue)]
        keep_going: bool,
    },
    /// Print the references found for a query without downloading.
    Resolve {
        query: String,
        #[command(flatten)]
        lookup: LookupArgs,
    },
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct LookupArgs {
    #[arg(long)]
    pub dialect: Option<String>,
    #[arg(long = "file-type")]
    pub file_type: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    List,
    Show { query: String },
    Forget { query: String },
}
