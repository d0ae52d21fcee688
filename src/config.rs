use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{AdspotError, Result};

pub const DEFAULT_DATABASE_URL: &str = "./data/adspot.db";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_FREQUENCY_SECONDS: u64 = 30;
pub const DEFAULT_PROFILE_COUNT: u32 = 1_000_000;
pub const DEFAULT_JITTER_STD_DEV: f64 = 0.01;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneratorConfig {
    pub frequency_seconds: Option<u64>,
    pub profile_count: Option<u32>,
    pub jitter_std_dev: Option<f64>,
    /// CSV with `Latitude`/`Longitude` headers. Falls back to the inventory table.
    pub locations_csv: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub database: Option<DatabaseConfig>,
    pub openai: Option<OpenAiConfig>,
    pub generator: Option<GeneratorConfig>,
    pub server: Option<ServerConfig>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| AdspotError::Config(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| AdspotError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise starts from defaults, then overlays the environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.apply_env())
    }

    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| env::var(key).ok())
    }

    fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(url) = var("ADSPOT_DATABASE_URL") {
            self.database.get_or_insert_with(Default::default).url = Some(url);
        }
        if let Some(key) = var("OPENAI_API_KEY") {
            self.openai.get_or_insert_with(Default::default).api_key = Some(key);
        }
        if let Some(model) = var("OPENAI_MODEL") {
            self.openai.get_or_insert_with(Default::default).model = Some(model);
        }
        if let Some(base_url) = var("OPENAI_BASE_URL") {
            self.openai.get_or_insert_with(Default::default).base_url = Some(base_url);
        }
        self
    }

    pub fn database_url(&self) -> String {
        self.database
            .as_ref()
            .and_then(|db| db.url.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }

    pub fn openai_api_key(&self) -> Result<String> {
        self.openai
            .as_ref()
            .and_then(|openai| openai.api_key.clone())
            .ok_or_else(|| AdspotError::Config("OPENAI_API_KEY is not set".to_string()))
    }

    pub fn generator(&self) -> GeneratorConfig {
        self.generator.clone().unwrap_or_default()
    }
}

impl GeneratorConfig {
    pub fn frequency_seconds(&self) -> u64 {
        self.frequency_seconds
            .unwrap_or(DEFAULT_FREQUENCY_SECONDS)
            .max(1)
    }

    pub fn profile_count(&self) -> u32 {
        self.profile_count.unwrap_or(DEFAULT_PROFILE_COUNT).max(1)
    }

    pub fn jitter_std_dev(&self) -> f64 {
        self.jitter_std_dev.unwrap_or(DEFAULT_JITTER_STD_DEV)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overlays_file_values() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "database": {"url": "./from-file.db"},
            "openai": {"model": "file-model"}
        }))
        .unwrap();
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ADSPOT_DATABASE_URL", "./from-env.db"),
            ("OPENAI_API_KEY", " sk-test "),
            ("OPENAI_BASE_URL", ""),
        ]);
        let config = config.apply_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_url(), "./from-env.db");
        assert_eq!(config.openai_api_key().unwrap(), "sk-test");
        let openai = config.openai.unwrap();
        assert_eq!(openai.model.as_deref(), Some("file-model"));
        assert!(openai.base_url.is_none());
    }

    #[test]
    fn defaults_apply_when_sections_are_missing() {
        let config = Config::default();
        assert_eq!(config.database_url(), DEFAULT_DATABASE_URL);
        assert!(config.openai_api_key().is_err());

        let generator = config.generator();
        assert_eq!(generator.frequency_seconds(), 30);
        assert_eq!(generator.profile_count(), 1_000_000);
        assert_eq!(generator.jitter_std_dev(), 0.01);
    }

    #[test]
    fn frequency_is_never_zero() {
        let generator = GeneratorConfig {
            frequency_seconds: Some(0),
            ..Default::default()
        };
        assert_eq!(generator.frequency_seconds(), 1);
    }
}
