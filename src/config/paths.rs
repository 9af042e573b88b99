use anyhow::{Context, Result};
use dirs::home_dir;
use std::{
    env,
    path::{Path, PathBuf},
};

use super::constants::{DEFAULT_FILE_NAME, USER_FILE_NAME};
use super::environment::apply_env_overrides;

/// Locations of the two config tiers, resolved once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Packaged defaults; `None` when no install location could be derived.
    pub default_file: Option<PathBuf>,
    pub user_file: PathBuf,
}

impl ConfigPaths {
    pub fn new(default_file: Option<PathBuf>, user_file: impl Into<PathBuf>) -> Self {
        Self {
            default_file,
            user_file: user_file.into(),
        }
    }

    /// Platform locations with `CRUTOOL_CONFIG` / `CRUTOOL_DEFAULT_CONFIG`
    /// applied on top.
    pub fn resolve() -> Result<Self> {
        let paths = Self {
            default_file: Self::packaged_default_file(),
            user_file: Self::user_file_path()?,
        };
        apply_env_overrides(paths)
    }

    pub fn user_file_path() -> Result<PathBuf> {
        let mut path = home_dir().context("Could not determine home directory")?;
        path.push(USER_FILE_NAME);
        Ok(path)
    }

    fn packaged_default_file() -> Option<PathBuf> {
        let exe = env::current_exe().ok()?;
        exe.parent().map(|dir| dir.join(DEFAULT_FILE_NAME))
    }

    pub fn user_file(&self) -> &Path {
        &self.user_file
    }

    pub fn default_file(&self) -> Option<&Path> {
        self.default_file.as_deref()
    }
}
