//! Configuration loading and validation for Reactree.
//!
//! This module implements the `reactree.yaml` configuration schema and
//! provides utilities for loading, validating, and expanding paths in the
//! configuration.
//!
//! # Configuration File
//!
//! The file is optional. `reactree dump` looks for `reactree.yaml` in the
//! current directory and falls back to built-in defaults when it is missing.
//! Use `--config` to point at another file.
//!
//! # Environment Variable Overrides
//!
//! - `REACTREE_OUTPUT_PATH`: Override the export file path
//! - `REACTREE_ENTRY_FIELD`: Override the entry field (empty disables it)
//! - `REACTREE_MAX_DEPTH`: Override the serializer nesting limit
//! - `REACTREE_FUNCTION_POLICY`: `drop` or `reject`

use reactree_graph::{FunctionPolicy, SerializerConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "reactree.yaml";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read the configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse the YAML configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root configuration structure for `reactree.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReactreeConfig {
    /// Serializer field conventions and limits.
    #[serde(default)]
    pub serializer: SerializerConfig,

    /// Field of the root container holding the tree to export.
    /// `null` exports the root itself.
    #[serde(default = "default_entry_field")]
    pub entry_field: Option<String>,

    /// Export destination settings.
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for ReactreeConfig {
    fn default() -> Self {
        Self {
            serializer: SerializerConfig::default(),
            entry_field: default_entry_field(),
            output: OutputConfig::default(),
        }
    }
}

fn default_entry_field() -> Option<String> {
    Some("current".to_string())
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// File the export is written to.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Wrap the payload as a `data:` URI instead of raw JSON.
    #[serde(default)]
    pub data_uri: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            data_uri: false,
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data.json")
}

impl ReactreeConfig {
    /// Load configuration from the default path (`./reactree.yaml`).
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_FILE_NAME))
    }

    /// Load the default file if present, otherwise use built-in defaults.
    ///
    /// A file that exists but fails to parse or validate is still an error.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::load_default() {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => {
                let mut config = Self::default();
                config.apply_env_overrides()?;
                config.expand_paths()?;
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides()?;

        // Expand paths (~ -> home directory)
        config.expand_paths()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from YAML text without overrides or validation.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty or comment-only file means "all defaults".
        if content.lines().all(|l| {
            let l = l.trim();
            l.is_empty() || l.starts_with('#')
        }) {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply environment variable overrides.
    ///
    /// Variables follow the pattern: `REACTREE_{KEY}`
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(path) = env::var("REACTREE_OUTPUT_PATH") {
            self.output.path = PathBuf::from(path);
        }

        if let Ok(field) = env::var("REACTREE_ENTRY_FIELD") {
            self.entry_field = if field.is_empty() { None } else { Some(field) };
        }

        if let Ok(depth) = env::var("REACTREE_MAX_DEPTH") {
            self.serializer.max_depth = depth.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "REACTREE_MAX_DEPTH must be a non-negative integer, got '{}'",
                    depth
                ))
            })?;
        }

        if let Ok(policy) = env::var("REACTREE_FUNCTION_POLICY") {
            self.serializer.function_policy = policy
                .parse::<FunctionPolicy>()
                .map_err(|e| {
                    ConfigError::ValidationError(format!("REACTREE_FUNCTION_POLICY: {}", e))
                })?;
        }

        Ok(())
    }

    /// Expand `~` in the output path to the home directory.
    fn expand_paths(&mut self) -> Result<(), ConfigError> {
        let path = self.output.path.to_str();
        if path != Some("~") && !path.is_some_and(|s| s.starts_with("~/")) {
            return Ok(());
        }

        let home = dirs::home_dir().ok_or_else(|| {
            ConfigError::ValidationError("Cannot determine home directory".into())
        })?;

        if let Some(rest) = self
            .output
            .path
            .to_str()
            .and_then(|s| s.strip_prefix("~/"))
        {
            self.output.path = home.join(rest);
        } else {
            self.output.path = home;
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let descriptor = &self.serializer.type_descriptor_field;
        let payload = &self.serializer.opaque_payload_field;

        if descriptor.is_empty() {
            return Err(ConfigError::ValidationError(
                "serializer.type_descriptor_field cannot be empty".into(),
            ));
        }

        if payload.is_empty() {
            return Err(ConfigError::ValidationError(
                "serializer.opaque_payload_field cannot be empty".into(),
            ));
        }

        if descriptor == payload {
            return Err(ConfigError::ValidationError(format!(
                "type_descriptor_field and opaque_payload_field must differ (both are '{}')",
                descriptor
            )));
        }

        if self.serializer.max_depth == 0 {
            return Err(ConfigError::ValidationError(
                "serializer.max_depth must be at least 1".into(),
            ));
        }

        if self.entry_field.as_deref() == Some("") {
            return Err(ConfigError::ValidationError(
                "entry_field cannot be empty; use null to export the root itself".into(),
            ));
        }

        if self.output.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "output.path cannot be empty".into(),
            ));
        }

        Ok(())
    }
}
