//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/cattree/cattree.toml`
//! 3. Local config: `<project_dir>/.cattree.toml`
//! 4. Environment variables: `CATTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::services::SaveOptions;
use crate::application::ApplicationError;

/// Unified configuration for cattree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Tree document used when no FILE argument is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_file: Option<PathBuf>,
    /// Write the tree back after a successful move
    pub auto_save: bool,
    /// Keep `<file>.bak` when overwriting a tree
    pub backup: bool,
    /// Pretty-print written JSON
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tree_file: None,
            auto_save: true,
            backup: false,
            pretty: true,
        }
    }
}

/// Raw settings for intermediate parsing.
///
/// Every field is optional so that "not specified" can be told apart from
/// an explicit value while merging layers.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub tree_file: Option<PathBuf>,
    pub auto_save: Option<bool>,
    pub backup: Option<bool>,
    pub pretty: Option<bool>,
}

/// Get the XDG config directory for cattree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cattree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cattree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".cattree.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`, then anchor a relative result at `base`.
///
/// Without a base, a relative path stays relative to the working directory.
fn resolve_path(path: &Path, base: Option<&Path>) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .map(|s| PathBuf::from(s.as_ref()))
        .unwrap_or_else(|_| path.to_path_buf());
    match base {
        Some(dir) if expanded.is_relative() => dir.join(expanded),
        _ => expanded,
    }
}

/// Load a TOML file into RawSettings for manual merging.
///
/// A relative `tree_file` resolves against the directory holding the file.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    let mut raw: RawSettings = toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })?;
    raw.tree_file = raw
        .tree_file
        .map(|tree_file| resolve_path(&tree_file, path.parent()));
    Ok(raw)
}

impl Settings {
    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            tree_file: overlay.tree_file.clone().or_else(|| self.tree_file.clone()),
            auto_save: overlay.auto_save.unwrap_or(self.auto_save),
            backup: overlay.backup.unwrap_or(self.backup),
            pretty: overlay.pretty.unwrap_or(self.pretty),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("config: global {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("config: local {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Apply CATTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CATTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("tree_file") {
            settings.tree_file = Some(resolve_path(Path::new(&val), None));
        }
        if let Ok(val) = config.get_bool("auto_save") {
            settings.auto_save = val;
        }
        if let Ok(val) = config.get_bool("backup") {
            settings.backup = val;
        }
        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }

        Ok(settings)
    }

    /// Write options for the category service.
    pub fn save_options(&self) -> SaveOptions {
        SaveOptions {
            pretty: self.pretty,
            backup: self.backup,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# cattree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/cattree/cattree.toml
#   Local:  <project_dir>/.cattree.toml
#   Env:    CATTREE_* environment variables

# Tree document used when no FILE argument is given
# (relative paths resolve against the directory of the config file that sets
# them; CATTREE_TREE_FILE resolves against the working directory)
# tree_file = "categories.json"

# Write the tree back after a successful move
# auto_save = true

# Keep <file>.bak when overwriting a tree
# backup = false

# Pretty-print written JSON
# pretty = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
