//! Loading configuration bundles from disk.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::bundle::ConfigBundle;
use crate::error::{ConfigError, ConfigResult};

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

impl ConfigBundle {
    /// Load a bundle from a YAML, JSON or TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;

        let content = fs::read_to_string(path)?;
        debug!("Loading {:?} configuration from {:?}", format, path);

        match format {
            ConfigFormat::Yaml => Self::from_yaml(&content),
            ConfigFormat::Json => Self::from_json(&content),
            ConfigFormat::Toml => Self::from_toml(&content),
        }
    }

    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(yaml).map_err(ConfigError::from)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(ConfigError::from)
    }

    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Serialize the bundle to YAML.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        serde_yaml::to_string(self).map_err(ConfigError::from)
    }
}
