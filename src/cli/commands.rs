use anyhow::{Context, Result};
use tracing::warn;

use crate::config::ConfigStore;
use crate::jira::JiraClient;

use super::args::{Cli, Command};
use super::config_cmd;
use super::issues;
use super::setup;

pub(crate) async fn run(cli: Cli, store: &mut ConfigStore) -> Result<()> {
    let Some(command) = cli.command else {
        show_welcome_message(store);
        return Ok(());
    };

    let result = dispatch(command, cli.json, store).await;
    if store.is_dirty() {
        warn!("configuration changes were not saved");
    }
    result
}

async fn dispatch(command: Command, json: bool, store: &mut ConfigStore) -> Result<()> {
    match command {
        Command::Setup => setup::run_setup(store),
        Command::Config(args) => config_cmd::handle_config(args.action, store),
        Command::Issue { key } => {
            let tracker = connect(store)?;
            issues::handle_issue(&tracker, store, &key, json).await
        }
        Command::Transitions { key } => {
            let tracker = connect(store)?;
            issues::handle_transitions(&tracker, store, &key, json).await
        }
        Command::Transition(args) => {
            let tracker = connect(store)?;
            issues::handle_transition(&tracker, args).await
        }
        Command::Dashboard { all } => {
            let tracker = connect(store)?;
            issues::handle_dashboard(&tracker, store, all, json).await
        }
    }
}

fn connect(store: &ConfigStore) -> Result<JiraClient> {
    JiraClient::from_store(store)
        .context("JIRA connection is not configured. Run `crutool setup` first")
}

fn show_welcome_message(store: &ConfigStore) {
    let config_exists = store.paths().user_file().exists();

    println!("🚀 crutool - JIRA from your terminal");
    println!();
    println!("📖 Commands:");
    println!("   crutool dashboard [--all]        Your open issues by priority");
    println!("   crutool issue <KEY>              Show one issue");
    println!("   crutool transitions <KEY>        List workflow transitions");
    println!("   crutool transition <KEY> <ID>    Apply a transition");
    println!("   crutool config get|set|list|path Manage configuration");
    println!();

    if !config_exists {
        println!("⚠️  No user configuration found. Let's get you set up!");
        println!("   Run: crutool setup");
        println!();
    }
}
