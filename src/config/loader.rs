//! Configuration file loading with precedence handling.

use crate::template::TemplateError;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LOGWEAVE_CONFIG";

/// Config file looked up in the working directory before the user config dir.
pub const LOCAL_CONFIG_FILE: &str = ".logweave.toml";

/// Errors that can occur while loading, validating or compiling the config.
///
/// All of them are fatal at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A required field is empty or whitespace.
    #[error("'{field}' cannot be blank")]
    Blank {
        /// Config key that was blank.
        field: &'static str,
    },

    /// An error inside one entry of a list section (1-based index).
    #[error("{section} entry {index}: {source}")]
    Entry {
        /// `groups`, `statuses`, `tags` or `groups.tags`.
        section: &'static str,
        /// 1-based entry number.
        index: usize,
        /// What was wrong with the entry.
        source: Box<ConfigError>,
    },

    /// A field holds an expression that does not compile.
    #[error("invalid template in '{field}': {source}")]
    Template {
        /// Config key holding the template.
        field: &'static str,
        /// Compilation failure.
        source: TemplateError,
    },
}

impl ConfigError {
    /// Attribute this error to entry `index` (0-based) of `section`.
    pub fn in_entry(self, section: &'static str, index: usize) -> Self {
        ConfigError::Entry {
            section,
            index: index + 1,
            source: Box::new(self),
        }
    }
}

/// TOML configuration file structure.
///
/// All keys are optional; omitted ones fall back to [`ResolvedConfig::default`].
/// A list section that is present replaces the default list entirely.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Field name or expression yielding the line's level.
    #[serde(default)]
    pub level_field: Option<String>,

    /// Field name or expression yielding the line's message.
    #[serde(default)]
    pub message_field: Option<String>,

    /// Field name or expression yielding the line's RFC 3339 timestamp.
    #[serde(default)]
    pub timestamp_field: Option<String>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Ordered group specs; the first match wins.
    #[serde(default)]
    pub groups: Option<Vec<GroupSection>>,

    /// Ordered status specs; the first non-empty result wins.
    #[serde(default)]
    pub statuses: Option<Vec<StatusSection>>,

    /// Tags applied to every structured line.
    #[serde(default)]
    pub tags: Option<Vec<TagSection>>,
}

/// A `[[groups]]` entry.
///
/// ```toml
/// [[groups]]
/// name = "Request"
/// value_field = "request_id"
/// title_field = "msg"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GroupSection {
    /// Shown as the description of every group this rule creates.
    #[serde(default)]
    pub name: String,
    /// Rule computing the group key; must render non-empty to match.
    #[serde(default)]
    pub value_field: String,
    /// Rule computing the group title; must render non-empty to match.
    #[serde(default)]
    pub title_field: String,
    /// Extra tags for lines in this group, applied after the global tags.
    #[serde(default)]
    pub tags: Vec<TagSection>,
}

/// A `[[statuses]]` entry.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StatusSection {
    /// Rule rendering the status line text.
    #[serde(default)]
    pub display: String,
}

/// A `[[tags]]` / `[[groups.tags]]` entry.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TagSection {
    /// Rule rendering the tag name.
    #[serde(default)]
    pub name: String,
    /// Optional rule rendering the tag value. Without it the tag is name-only.
    #[serde(default)]
    pub source: Option<String>,
}

impl GroupSection {
    fn new(name: &str, value_field: &str, title_field: &str) -> Self {
        Self {
            name: name.to_string(),
            value_field: value_field.to_string(),
            title_field: title_field.to_string(),
            tags: Vec::new(),
        }
    }
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Level rule source.
    pub level_field: String,
    /// Message rule source.
    pub message_field: String,
    /// Timestamp rule source.
    pub timestamp_field: String,
    /// Group specs in declaration order.
    pub groups: Vec<GroupSection>,
    /// Status specs in declaration order.
    pub statuses: Vec<StatusSection>,
    /// Global tag specs.
    pub tags: Vec<TagSection>,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Whether the UI may use colours.
    pub color: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            level_field: "level".to_string(),
            message_field: "msg".to_string(),
            timestamp_field: "time".to_string(),
            groups: vec![
                GroupSection::new("Request", "request_id", "msg"),
                GroupSection::new("Category", "category", "category"),
            ],
            statuses: Vec::new(),
            tags: Vec::new(),
            log_file_path: default_log_path(),
            color: true,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/logweave/logweave.log` on Linux, or the
/// platform equivalent. Falls back to the current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("logweave").join("logweave.log")
    } else {
        PathBuf::from("logweave.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
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

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(Some(config))
}

/// Resolve default config file path (`~/.config/logweave/config.toml` on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("logweave").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `LOGWEAVE_CONFIG` environment variable
/// 3. `./.logweave.toml`, if it exists
/// 4. Default path `~/.config/logweave/config.toml`
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

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return load_config_file(local);
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        level_field: config.level_field.unwrap_or(defaults.level_field),
        message_field: config.message_field.unwrap_or(defaults.message_field),
        timestamp_field: config.timestamp_field.unwrap_or(defaults.timestamp_field),
        groups: config.groups.unwrap_or(defaults.groups),
        statuses: config.statuses.unwrap_or(defaults.statuses),
        tags: config.tags.unwrap_or(defaults.tags),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        color: defaults.color,
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `LOGWEAVE_LEVEL_FIELD`, `LOGWEAVE_MESSAGE_FIELD`, `LOGWEAVE_TIMESTAMP_FIELD`
/// - `NO_COLOR` (any value disables colour)
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(level) = std::env::var("LOGWEAVE_LEVEL_FIELD") {
        config.level_field = level;
    }
    if let Ok(message) = std::env::var("LOGWEAVE_MESSAGE_FIELD") {
        config.message_field = message;
    }
    if let Ok(timestamp) = std::env::var("LOGWEAVE_TIMESTAMP_FIELD") {
        config.timestamp_field = timestamp;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        config.color = false;
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    level_field: Option<String>,
    message_field: Option<String>,
    timestamp_field: Option<String>,
    no_color: bool,
) -> ResolvedConfig {
    if let Some(level) = level_field {
        config.level_field = level;
    }
    if let Some(message) = message_field {
        config.message_field = message;
    }
    if let Some(timestamp) = timestamp_field {
        config.timestamp_field = timestamp;
    }
    if no_color {
        config.color = false;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
