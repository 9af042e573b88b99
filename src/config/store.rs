use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::error::ConfigError;
use super::escape::{escape, unescape};
use super::ini::IniDocument;
use super::paths::ConfigPaths;
use super::template;

/// Two-tier configuration: read-only packaged defaults overlaid by the
/// editable user file.
///
/// Lookups consult the user tier first, so a user value shadows the default
/// even when it is empty. Only the user tier is ever written, and only by an
/// explicit [`ConfigStore::save`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    paths: ConfigPaths,
    defaults: IniDocument,
    user: IniDocument,
    dirty: bool,
}

impl ConfigStore {
    /// An empty store bound to `paths`; nothing is read until [`load`](Self::load).
    pub fn new(paths: ConfigPaths) -> Self {
        Self {
            paths,
            defaults: IniDocument::new(),
            user: IniDocument::new(),
            dirty: false,
        }
    }

    pub fn open(paths: ConfigPaths) -> Result<Self, ConfigError> {
        let mut store = Self::new(paths);
        store.load()?;
        Ok(store)
    }

    /// Reads both tiers from disk. Missing files yield empty tiers.
    ///
    /// Calling this again throws away unsaved edits to the user tier and
    /// clears the dirty flag; save first to keep them.
    pub fn load(&mut self) -> Result<(), ConfigError> {
        self.defaults = match self.paths.default_file() {
            Some(path) => read_tier(path)?,
            None => IniDocument::new(),
        };
        self.user = read_tier(self.paths.user_file())?;
        self.dirty = false;
        Ok(())
    }

    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.user
            .get(section, key)
            .or_else(|| self.defaults.get(section, key))
            .map(unescape)
    }

    pub fn get_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get(section, key).unwrap_or_else(|| default.to_string())
    }

    pub fn require(&self, section: &str, key: &str) -> Result<String, ConfigError> {
        self.get(section, key).ok_or_else(|| ConfigError::Missing {
            section: section.to_string(),
            key: key.to_string(),
        })
    }

    /// Stores `value` in the user tier. Section and key names must survive
    /// being written to and read back from the user file; the store is left
    /// untouched when they would not.
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        check_section_name(section)?;
        check_key_name(key)?;

        self.user.set(section, key, &escape(value));
        self.dirty = true;
        debug!(section, key, "updated user config value");
        Ok(())
    }

    /// Renders the value at `(section, key)` (empty when unset) with `{name}`
    /// placeholders filled from `data`.
    pub fn format(
        &self,
        section: &str,
        key: &str,
        data: &HashMap<&str, String>,
    ) -> Result<String, ConfigError> {
        let template = self.get_or(section, key, "");
        Ok(template::render(&template, data)?)
    }

    /// Writes the user tier if it has unsaved changes. Returns whether a
    /// write happened.
    pub fn save(&mut self) -> Result<bool, ConfigError> {
        if !self.dirty {
            debug!("user config unchanged, skipping save");
            return Ok(false);
        }

        let path = self.paths.user_file();
        write_atomically(path, &self.user.to_string())?;
        self.dirty = false;
        info!(path = %path.display(), "saved user config");
        Ok(true)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// Section names across both tiers, defaults first.
    pub fn sections(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self
            .defaults
            .section_names()
            .into_iter()
            .chain(self.user.section_names())
        {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Effective, unescaped entries of a section with user values shadowing
    /// defaults.
    pub fn entries(&self, section: &str) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = Vec::new();
        for (key, value) in self
            .defaults
            .entries(section)
            .into_iter()
            .chain(self.user.entries(section))
        {
            let value = unescape(value);
            match merged.iter_mut().find(|(k, _)| k == key) {
                Some(existing) => existing.1 = value,
                None => merged.push((key.to_string(), value)),
            }
        }
        merged
    }
}

fn read_tier(path: &Path) -> Result<IniDocument, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not present");
            return Ok(IniDocument::new());
        }
        Err(err) => return Err(ConfigError::io(path, err)),
    };

    let doc = IniDocument::parse(&contents).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        line: err.line,
        message: err.message,
    })?;
    debug!(path = %path.display(), "loaded config file");
    Ok(doc)
}

fn invalid_name(name: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// A section name has to fit between the brackets of a header line.
fn check_section_name(name: &str) -> Result<(), ConfigError> {
    check_name_shape(name)?;
    if name.contains(['[', ']']) {
        return Err(invalid_name(name, "section names cannot contain brackets"));
    }
    Ok(())
}

/// A key has to read back as the left side of a `key = value` line.
fn check_key_name(name: &str) -> Result<(), ConfigError> {
    check_name_shape(name)?;
    if name.contains(['=', ':']) {
        return Err(invalid_name(name, "keys cannot contain '=' or ':'"));
    }
    if name.starts_with(['[', '#', ';']) {
        return Err(invalid_name(name, "keys cannot start with '[', '#' or ';'"));
    }
    Ok(())
}

fn check_name_shape(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(invalid_name(name, "names cannot be empty"));
    }
    if name.starts_with(char::is_whitespace) || name.ends_with(char::is_whitespace) {
        return Err(invalid_name(name, "names cannot start or end with whitespace"));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid_name(name, "names cannot contain control characters"));
    }
    Ok(())
}

fn write_atomically(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| ConfigError::io(parent, err))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|err| ConfigError::io(parent, err))?;
    temp.write_all(contents.as_bytes())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|err| ConfigError::io(temp.path(), err))?;
    temp.persist(path)
        .map_err(|err| ConfigError::io(path, err.error))?;
    Ok(())
}
