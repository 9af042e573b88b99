use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::ConfigStore;

use super::commands;

/// Entry point for the `crutool` command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "crutool",
    about = "JIRA issue helper backed by a layered INI configuration",
    version,
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose logging of config and HTTP activity
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Print raw JSON responses instead of formatted lines
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show a single issue.
    Issue {
        /// Issue key, e.g. ABC-123
        key: String,
    },

    /// List the transitions available for an issue.
    Transitions {
        /// Issue key, e.g. ABC-123
        key: String,
    },

    /// Move an issue through a workflow transition.
    Transition(TransitionArgs),

    /// List your open issues, highest priority first.
    Dashboard {
        /// Fetch full details for every issue, not just the first one.
        #[arg(long)]
        all: bool,
    },

    /// Read or change configuration values.
    Config(ConfigArgs),

    /// Interactively store the JIRA URL and credentials.
    Setup,
}

#[derive(Debug, Args)]
pub struct TransitionArgs {
    /// Issue key, e.g. ABC-123
    pub key: String,

    /// Transition id as listed by `crutool transitions`
    pub transition: String,

    /// JSON object of fields to set during the transition
    #[arg(long)]
    pub fields: Option<String>,

    /// JSON object of update operations to apply during the transition
    #[arg(long)]
    pub update: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print a value (user file first, then packaged defaults).
    Get { section: String, key: String },

    /// Store a value in the user file.
    Set {
        section: String,
        key: String,
        value: String,
    },

    /// Show effective values, optionally for a single section.
    List { section: Option<String> },

    /// Show where the config files live.
    Path,
}

impl Cli {
    pub async fn run(self, store: &mut ConfigStore) -> Result<()> {
        commands::run(self, store).await
    }
}
