//! Configuration System
//!
//! Layered configuration for rendering, directory walking and logging.
//! Layers in increasing precedence: built-in defaults, an optional config
//! file, then `STRATA__`-prefixed environment variables (`__` separates
//! nested keys, e.g. `STRATA__RENDER__VALUE_MODE=debug`).

use crate::error::LoadError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

mod merge;
mod sources;

pub use sources::environment::{ENV_PREFIX, ENV_SEPARATOR};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrataConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Tree-string rendering
    #[serde(default)]
    pub render: RenderConfig,

    /// Directory walking
    #[serde(default)]
    pub walk: WalkConfig,
}

/// How leaf values appear in tree strings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueMode {
    /// The value's type name
    #[default]
    Type,
    /// The value's `Debug` form
    Debug,
    /// Keys only
    Hidden,
    /// The value's `Display` form; falls back to `Debug` when rendering
    /// through `to_tree_string_with`
    Str,
}

/// How keys appear in tree strings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    /// Plain text, e.g. `key1` or `(a, b)`
    #[default]
    Str,
    /// Quoted the way `Display` on the map quotes them, e.g. `'key1'`
    Repr,
    /// The key's variant: `bool`, `int`, `str` or `tuple`
    Type,
}

/// Tree-string rendering options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Repeated once per level below the first
    #[serde(default = "default_indent")]
    pub indent: String,

    /// Marks every key below the top level
    #[serde(default = "default_branch_marker")]
    pub branch_marker: String,

    #[serde(default)]
    pub key_mode: KeyMode,

    #[serde(default)]
    pub value_mode: ValueMode,
}

fn default_indent() -> String {
    "  ".to_string()
}

fn default_branch_marker() -> String {
    "'-".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            branch_marker: default_branch_marker(),
            key_mode: KeyMode::default(),
            value_mode: ValueMode::default(),
        }
    }
}

/// Directory walking options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Follow symbolic links (default: false)
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Path components to skip, matched exactly or as `*suffix` / `prefix*`
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// NFC-normalise key components
    #[serde(default = "default_true")]
    pub normalize_unicode: bool,
}

fn default_true() -> bool {
    true
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            normalize_unicode: default_true(),
        }
    }
}

impl StrataConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), LoadError> {
        let mut errors = Vec::new();

        if self.render.branch_marker.is_empty() {
            errors.push("render.branch_marker cannot be empty".to_string());
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            errors.push(format!(
                "logging.format '{}' must be 'text' or 'json'",
                self.logging.format
            ));
        }
        if self.walk.ignore_patterns.iter().any(|p| p.is_empty()) {
            errors.push("walk.ignore_patterns cannot contain empty patterns".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(LoadError::Config(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }
}

/// Builds a [`StrataConfig`] from its layers
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then `path` when given, then environment overrides.
    /// The result is validated.
    pub fn load(path: Option<&Path>) -> Result<StrataConfig, LoadError> {
        let mut builder = merge::builder_with_defaults()?;
        if let Some(path) = path {
            builder = sources::config_file::add_to_builder(builder, path)?;
        }
        builder = sources::environment::add_to_builder(builder);

        let config: StrataConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(
            from_file = path.is_some(),
            value_mode = ?config.render.value_mode,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Defaults and a config file, without environment overrides
    pub fn load_from_file(path: &Path) -> Result<StrataConfig, LoadError> {
        let builder = sources::config_file::add_to_builder(merge::builder_with_defaults()?, path)?;
        let config: StrataConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
