mod cli;
mod config;
mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, DEFAULT_CONFIG};
use crate::config::{load_config, FetchOverrides};
use crate::run::FetchRequest;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let file_config = load_config(&config_path)?;
    let cache_path = file_config.cache_path(cli.cache.clone());

    match cli.command {
        Command::Fetch {
            queries,
            queries_file,
            target_dir,
            lookup,
            overwrite,
            max_count,
            delay_ms,
            keep_going,
        } => run::fetch(
            &file_config,
            cache_path,
            FetchRequest {
                queries,
                queries_file,
                target_dir,
                overrides: FetchOverrides {
                    lookup,
                    overwrite,
                    max_count,
                    delay_ms,
                },
                keep_going,
            },
        ),
        Command::Resolve { query, lookup } => run::resolve(&file_config, &query, lookup),
        Command::Cache { action } => run::cache(cache_path, action),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
