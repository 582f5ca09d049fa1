//! Configuration loaded from `config.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::extract::ChatExtractorConfig;

const APP_DIR: &str = "backlog";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "catalog.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite catalog file
    pub database_path: PathBuf,
    /// Catalog owner used when `--owner` is not given
    pub owner_id: i64,
    pub extractor: ExtractorSettings,
}

/// Chat endpoint used by `extract`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub max_concurrent: usize,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: default_data_dir().join(DATABASE_FILE),
            owner_id: 1,
            extractor: ExtractorSettings::default(),
        }
    }
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        ExtractorSettings {
            base_url: "https://api.moonshot.ai/v1".to_string(),
            model: "kimi-k2-0711-preview".to_string(),
            api_key_env: "KIMI_API_KEY".to_string(),
            max_concurrent: 4,
            timeout_secs: 120,
        }
    }
}

impl ExtractorSettings {
    /// Resolve the API key from the environment and build the client settings
    pub fn client_config(&self) -> ChatExtractorConfig {
        let api_key = std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            log::warn!("{} is not set, calling the extractor without a key", self.api_key_env);
        }

        ChatExtractorConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        if !path.exists() {
            if explicit {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            owner_id = 7

            [extractor]
            model = "local-model"
            max_concurrent = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.owner_id, 7);
        assert_eq!(config.extractor.model, "local-model");
        assert_eq!(config.extractor.max_concurrent, 8);
        assert_eq!(config.extractor.timeout_secs, 120);
        assert!(config.database_path.ends_with("backlog/catalog.db"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/backlog.toml"))).is_err());
    }

    #[test]
    fn test_client_config_uses_settings() {
        let settings = ExtractorSettings {
            api_key_env: "BACKLOG_TEST_UNSET_KEY".into(),
            timeout_secs: 5,
            ..Default::default()
        };
        let client = settings.client_config();
        assert_eq!(client.api_key, None);
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.model, "kimi-k2-0711-preview");
    }
}
