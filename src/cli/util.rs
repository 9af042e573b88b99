use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::io::{self, Write};

pub(crate) fn prompt_string_with_default(prompt: &str, default: &str) -> Result<String> {
    if default.is_empty() {
        print!("{prompt}: ");
    } else {
        print!("{prompt} (default: {default}): ");
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();

    if trimmed.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

pub(crate) fn prompt_u64_with_default(prompt: &str, default: u64) -> Result<u64> {
    loop {
        print!("{prompt} (default: {default}): ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Ok(default);
        }

        match trimmed.parse::<u64>() {
            Ok(value) if value > 0 => return Ok(value),
            Ok(_) => println!("❌ Value must be greater than zero."),
            Err(_) => println!("❌ Please enter a valid number."),
        }
    }
}

pub(crate) fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }

    let visible = secret.chars().count().min(2);
    let prefix: String = secret.chars().take(visible).collect();
    format!("{prefix}***")
}

/// Parses an optional `--fields`/`--update` argument into a JSON object.
pub(crate) fn parse_json_object(flag: &str, raw: Option<&str>) -> Result<Option<Value>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let value: Value =
        serde_json::from_str(raw).with_context(|| format!("Failed to parse --{flag} as JSON"))?;
    if !value.is_object() {
        bail!("--{flag} must be a JSON object");
    }
    Ok(Some(value))
}
