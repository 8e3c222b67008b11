use crate::filter::{ExpressionOptions, FactorType, FilterSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Name of the URL query parameter carrying the encoded filter set.
    pub query_param: String,
    /// Memos are listed under their update time instead of their creation time.
    pub display_with_update_time: bool,
    /// Tags known to exist; TAG filters naming anything else are flagged.
    pub known_tags: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            query_param: "filter".to_string(),
            display_with_update_time: false,
            known_tags: Vec::new(),
        }
    }
}

impl FilterConfig {
    pub fn expression_options(&self) -> ExpressionOptions {
        ExpressionOptions {
            display_with_update_time: self.display_with_update_time,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FilterConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<FilterConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<FilterConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static FilterConfig {
    static DEFAULT_CONFIG: LazyLock<FilterConfig> = LazyLock::new(FilterConfig::default);
    &DEFAULT_CONFIG
}

/// List TAG filters naming tags outside `known_tags`
///
/// Nothing is reported when no tags are configured.
pub fn filter_warnings(set: &FilterSet, cfg: &FilterConfig) -> Vec<String> {
    if cfg.known_tags.is_empty() {
        return Vec::new();
    }

    set.by_factor(FactorType::Tag)
        .into_iter()
        .filter(|entry| !cfg.known_tags.iter().any(|t| t == &entry.value))
        .map(|entry| format!("Unknown tag '{}'", entry.value))
        .collect()
}
