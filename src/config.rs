use crate::model::GenerationParams;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "aditamil.toml";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub model: ModelConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub endpoint: String,
    pub name: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub structured_output: bool,
    pub timeout_secs: u64,
    pub api_key: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            name: "gemini-3-flash-preview".to_string(),
            temperature: params.temperature,
            max_output_tokens: params.max_output_tokens,
            structured_output: params.structured_output,
            timeout_secs: 60,
            api_key: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("Failed to parse {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
    #[error("Invalid setting in {path}: {reason}")]
    Invalid { path: String, reason: String },
}

impl ModelConfig {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            structured_output: self.structured_output,
        }
    }

    /// The environment wins over the file; blank values count as unset.
    pub fn resolve_credential(&self, from_env: Option<String>) -> Option<String> {
        from_env
            .into_iter()
            .chain(self.api_key.clone())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }

    fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("model.endpoint must not be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("model.name must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("model.temperature must be within 0.0..=2.0, got {}", self.temperature));
        }
        if self.max_output_tokens == 0 {
            return Err("model.max_output_tokens must be greater than zero".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("model.timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

pub fn parse_config(contents: &str, origin: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(contents)
        .map_err(|source| ConfigError::Parse { path: origin.to_string(), source })?;
    config
        .model
        .validate()
        .map_err(|reason| ConfigError::Invalid { path: origin.to_string(), reason })?;
    Ok(config)
}

/// Loads `file_path`. A file that does not exist yields the defaults.
pub fn load_config_from_file(file_path: &Path) -> Result<Config, ConfigError> {
    let origin = file_path.display().to_string();
    match fs::read_to_string(file_path) {
        Ok(contents) => parse_config(&contents, &origin),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %origin, "config file not found, using defaults");
            Ok(Config::default())
        }
        Err(source) => Err(ConfigError::Read { path: origin, source }),
    }
}
