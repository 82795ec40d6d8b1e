//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use super::{IconSetting, ToggleConfig};

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML option overrides.
///
/// All fields are optional - anything not specified keeps the value of the
/// layer below. Keys use the camelCase option names (`expandedClass`,
/// `isAccordion`, ...). Used both for `~/.config/houdini/config.toml` and
/// for the `[options]` table of a scenario file.
///
/// Unknown keys never fail parsing; they are collected in `unrecognized` and
/// reported at debug level.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub content_class: Option<String>,
    pub expanded: Option<bool>,
    pub expanded_class: Option<String>,
    pub btn_after: Option<bool>,
    pub btn_class: Option<String>,
    pub btn_attribute: Option<String>,
    pub btn_show: Option<String>,
    pub btn_hide: Option<String>,
    pub is_accordion: Option<bool>,
    pub collapse_others: Option<bool>,
    pub heading_class: Option<String>,
    pub icon: Option<IconSetting>,
    pub icon_class: Option<String>,
    pub icon_attribute: Option<String>,
    pub icon_show: Option<String>,
    pub icon_hide: Option<String>,
    pub emit_events: Option<bool>,
    pub init_class: Option<String>,
    pub stop_media: Option<bool>,
    pub trigger_active_class: Option<String>,
    pub group_attribute: Option<String>,
    pub synthesize_triggers: Option<bool>,
    pub fragment_routing: Option<bool>,

    /// Path to log file for tracing output.
    pub log_file: Option<PathBuf>,

    /// Keys this version does not recognize.
    #[serde(flatten)]
    pub unrecognized: BTreeMap<String, toml::Value>,
}

impl ConfigFile {
    /// Parse overrides from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Layer these overrides onto `base`.
    pub fn apply_to(&self, base: ToggleConfig) -> ToggleConfig {
        for key in self.unrecognized.keys() {
            debug!(key = %key, "Ignoring unrecognized option");
        }

        ToggleConfig {
            content_class: self.content_class.clone().unwrap_or(base.content_class),
            expanded: self.expanded.unwrap_or(base.expanded),
            expanded_class: self.expanded_class.clone().unwrap_or(base.expanded_class),
            btn_after: self.btn_after.unwrap_or(base.btn_after),
            btn_class: self.btn_class.clone().unwrap_or(base.btn_class),
            btn_attribute: self.btn_attribute.clone().unwrap_or(base.btn_attribute),
            btn_show: self.btn_show.clone().unwrap_or(base.btn_show),
            btn_hide: self.btn_hide.clone().unwrap_or(base.btn_hide),
            is_accordion: self.is_accordion.unwrap_or(base.is_accordion),
            collapse_others: self.collapse_others.unwrap_or(base.collapse_others),
            heading_class: self.heading_class.clone().unwrap_or(base.heading_class),
            icon: self.icon.unwrap_or(base.icon),
            icon_class: self.icon_class.clone().unwrap_or(base.icon_class),
            icon_attribute: self.icon_attribute.clone().unwrap_or(base.icon_attribute),
            icon_show: self.icon_show.clone().unwrap_or(base.icon_show),
            icon_hide: self.icon_hide.clone().unwrap_or(base.icon_hide),
            emit_events: self.emit_events.unwrap_or(base.emit_events),
            init_class: self.init_class.clone().unwrap_or(base.init_class),
            stop_media: self.stop_media.unwrap_or(base.stop_media),
            trigger_active_class: self
                .trigger_active_class
                .clone()
                .unwrap_or(base.trigger_active_class),
            group_attribute: self
                .group_attribute
                .clone()
                .unwrap_or(base.group_attribute),
            synthesize_triggers: self
                .synthesize_triggers
                .unwrap_or(base.synthesize_triggers),
            fragment_routing: self.fragment_routing.unwrap_or(base.fragment_routing),
        }
    }
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Controller options.
    pub toggle: ToggleConfig,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            toggle: ToggleConfig::default(),
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/houdini/houdini.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("houdini").join("houdini.log")
    } else {
        PathBuf::from("houdini.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config = ConfigFile::from_toml(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/houdini/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("houdini").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (like CLI `--config`)
/// 2. `HOUDINI_CONFIG` environment variable
/// 3. Default path `~/.config/houdini/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("HOUDINI_CONFIG") {
        if env_path.is_empty() {
            return Err(ConfigError::InvalidPath(
                "HOUDINI_CONFIG is set but empty".to_string(),
            ));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `HOUDINI_LOG_FILE`: Override log file path
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(path) = std::env::var("HOUDINI_LOG_FILE") {
        if !path.is_empty() {
            config.log_file_path = PathBuf::from(path);
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        toggle: config.apply_to(defaults.toggle),
        log_file_path: config.log_file.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    accordion_override: Option<bool>,
    collapse_others_override: Option<bool>,
) -> ResolvedConfig {
    if let Some(accordion) = accordion_override {
        config.toggle.is_accordion = accordion;
    }

    if let Some(collapse_others) = collapse_others_override {
        config.toggle.collapse_others = collapse_others;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
