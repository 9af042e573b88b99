use anyhow::{Result, anyhow};
use std::{env, path::PathBuf};

use super::constants::{DEFAULT_CONFIG_ENV, USER_CONFIG_ENV};
use super::paths::ConfigPaths;

pub fn apply_env_overrides(mut paths: ConfigPaths) -> Result<ConfigPaths> {
    if let Some(user_file) = env_path(USER_CONFIG_ENV)? {
        paths.user_file = user_file;
    }

    if let Some(default_file) = env_path(DEFAULT_CONFIG_ENV)? {
        paths.default_file = Some(default_file);
    }

    Ok(paths)
}

pub fn env_string(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(anyhow!("{key} contains invalid UTF-8")),
    }
}

pub fn env_path(key: &str) -> Result<Option<PathBuf>> {
    Ok(env_string(key)?
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from))
}
