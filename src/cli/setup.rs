use anyhow::Result;

use crate::client::DEFAULT_TIMEOUT_SECS;
use crate::config::ConfigStore;
use crate::jira::JIRA_SECTION;

use super::util::{mask_secret, prompt_string_with_default, prompt_u64_with_default};

pub(crate) fn run_setup(store: &mut ConfigStore) -> Result<()> {
    println!("🚀 Welcome to crutool setup!");
    println!("Let's connect to your JIRA instance.\n");

    let url = prompt_string_with_default(
        "🌐 JIRA REST base URL",
        &store.get_or(JIRA_SECTION, "url", ""),
    )?;
    let user = prompt_string_with_default(
        "👤 Username",
        &store.get_or(JIRA_SECTION, "user", ""),
    )?;

    let current_password = store.get_or(JIRA_SECTION, "password", "");
    let password_prompt = if current_password.is_empty() {
        "🔑 Password"
    } else {
        "🔑 Password (leave blank to keep)"
    };
    let password = keep_password_if_blank(
        prompt_string_with_default(password_prompt, "")?,
        current_password,
    );

    let current_timeout = store
        .get(JIRA_SECTION, "timeout_secs")
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let timeout = prompt_u64_with_default("⏱️  Request timeout in seconds", current_timeout)?;

    store.set(JIRA_SECTION, "url", &url)?;
    store.set(JIRA_SECTION, "user", &user)?;
    store.set(JIRA_SECTION, "password", &password)?;
    store.set(JIRA_SECTION, "timeout_secs", &timeout.to_string())?;
    store.save()?;

    println!(
        "\n✅ Configuration saved to {}",
        store.paths().user_file().display()
    );
    println!("📋 Your configuration:");
    println!("   URL: {url}");
    println!("   User: {user}");
    println!("   Password: {}", mask_secret(&password));
    println!("   Timeout: {timeout}s");
    println!("\n🎉 Setup complete! Try:");
    println!("   crutool dashboard");
    println!("   crutool issue ABC-123\n");

    Ok(())
}

fn keep_password_if_blank(input: String, current: String) -> String {
    if input.is_empty() { current } else { input }
}
