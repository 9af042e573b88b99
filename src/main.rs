mod cli;
mod client;
mod config;
mod jira;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigPaths, ConfigStore};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let paths = ConfigPaths::resolve()?;
    let mut store = ConfigStore::open(paths).context("Failed to load configuration")?;
    cli.run(&mut store).await
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("info,crutool=debug")
        } else {
            EnvFilter::new("warn,crutool=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
