use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde_json::Value;

use crate::config::ConfigStore;
use crate::jira::{DynIssueTracker, issue_template_data, transition_template_data};

use super::args::TransitionArgs;
use super::util::parse_json_object;

const TEMPLATES_SECTION: &str = "templates";

pub(crate) async fn handle_issue(
    tracker: &DynIssueTracker,
    store: &ConfigStore,
    key: &str,
    json: bool,
) -> Result<()> {
    let issue = match tracker.issue_info(key).await {
        Ok(issue) => issue,
        Err(err) if err.status() == Some(404) => bail!("Issue {key} does not exist"),
        Err(err) => return Err(err).with_context(|| format!("Failed to fetch issue {key}")),
    };

    if json {
        return print_json(&issue);
    }

    println!("{}", render_issue(store, &issue)?);
    Ok(())
}

pub(crate) async fn handle_transitions(
    tracker: &DynIssueTracker,
    store: &ConfigStore,
    key: &str,
    json: bool,
) -> Result<()> {
    let transitions = tracker
        .get_transitions(key)
        .await
        .with_context(|| format!("Failed to list transitions for {key}"))?;

    if json {
        return print_json(&transitions);
    }

    let lines = render_transitions(store, &transitions)?;
    if lines.is_empty() {
        println!("No transitions available for {key}.");
        return Ok(());
    }

    println!("{}", format!("🔀 Transitions for {key}").bold());
    for line in lines {
        println!("   {line}");
    }
    Ok(())
}

pub(crate) async fn handle_transition(
    tracker: &DynIssueTracker,
    args: TransitionArgs,
) -> Result<()> {
    let fields = parse_json_object("fields", args.fields.as_deref())?;
    let update = parse_json_object("update", args.update.as_deref())?;

    tracker
        .transition_issue(&args.key, &args.transition, fields, update)
        .await
        .with_context(|| format!("Failed to transition {}", args.key))?;

    println!(
        "✅ Applied transition {} to {}",
        args.transition,
        args.key.bold()
    );
    Ok(())
}

pub(crate) async fn handle_dashboard(
    tracker: &DynIssueTracker,
    store: &ConfigStore,
    expand_all: bool,
    json: bool,
) -> Result<()> {
    let results = tracker
        .dashboard(expand_all)
        .await
        .context("Failed to load dashboard")?;

    if json {
        return print_json(&results);
    }

    let lines = render_dashboard(store, &results)?;
    if lines.is_empty() {
        println!("🎉 No open issues assigned to you.");
        return Ok(());
    }

    println!("{}", "📋 Your open issues".bold());
    for line in lines {
        println!("   {line}");
    }
    Ok(())
}

pub(crate) fn render_issue(store: &ConfigStore, issue: &Value) -> Result<String> {
    let data = issue_template_data(issue);
    if store.get(TEMPLATES_SECTION, "issue_summary").is_some() {
        return Ok(store.format(TEMPLATES_SECTION, "issue_summary", &data)?);
    }

    Ok(format!(
        "{} [{}] {}",
        data["key"], data["status"], data["summary"]
    ))
}

pub(crate) fn render_transitions(store: &ConfigStore, transitions: &Value) -> Result<Vec<String>> {
    let use_template = store.get(TEMPLATES_SECTION, "transition_line").is_some();
    entries(transitions, "transitions")
        .iter()
        .map(|transition| -> Result<String> {
            let data = transition_template_data(transition);
            if use_template {
                Ok(store.format(TEMPLATES_SECTION, "transition_line", &data)?)
            } else {
                Ok(format!("{}: {}", data["id"], data["name"]))
            }
        })
        .collect()
}

pub(crate) fn render_dashboard(store: &ConfigStore, results: &Value) -> Result<Vec<String>> {
    let use_template = store.get(TEMPLATES_SECTION, "dashboard_line").is_some();
    entries(results, "issues")
        .iter()
        .map(|issue| -> Result<String> {
            let data = issue_template_data(issue);
            if use_template {
                Ok(store.format(TEMPLATES_SECTION, "dashboard_line", &data)?)
            } else {
                Ok(format!("{}  {}", data["key"], data["summary"]))
            }
        })
        .collect()
}

fn entries<'a>(value: &'a Value, field: &str) -> &'a [Value] {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn print_json(value: &Value) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(value).context("Failed to serialize response JSON")?;
    println!("{rendered}");
    Ok(())
}
