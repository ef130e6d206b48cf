//! Configuration management for newsdesk
//!
//! TOML-based configuration with defaults and validation.
//! Location: ~/.newsdesk/config.toml unless a path is given.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::clustering::ClusteringConfig;
use crate::embedding::EmbeddingConfig;
use crate::errors::{NewsdeskError, Result};
use crate::generation::GenerationConfig;
use crate::rag::RetrievalConfig;

/// Complete configuration for newsdesk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub clustering: ClusteringConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub paths: PathsConfig,
}

/// Corpus file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Articles produced by ingestion
    pub input: PathBuf,
    /// Articles annotated with cluster ids
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/articles.json"),
            output: PathBuf::from("data/articles_clustered.json"),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(config_path) => Self::load_from_file(config_path),
            None => Self::load_default(),
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| NewsdeskError::ConfigError(format!("Failed to read config: {}", e)))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| NewsdeskError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }
        Ok(Config::default())
    }

    /// Standard configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".newsdesk").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        self.embedding.validate()?;
        self.retrieval.validate()?;
        self.generation.validate()?;
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                NewsdeskError::ConfigError(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| NewsdeskError::ConfigError(format!("Failed to write config: {}", e)))?;
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| NewsdeskError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingBackend;
    use crate::generation::ProviderKind;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.clustering.threshold, 0.75);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.generation.temperature, 0.2);
        assert_eq!(config.embedding.threads, 1);
        assert_eq!(config.paths.input, PathBuf::from("data/articles.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [clustering]
            threshold = 0.8

            [generation]
            provider = "ollama"
            model = "llama3.1:8b"
            temperature = 0.1
            "#,
        )
        .unwrap();

        assert_eq!(config.clustering.threshold, 0.8);
        assert_eq!(config.generation.provider, ProviderKind::Ollama);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.embedding.backend, EmbeddingBackend::Candle);
        assert_eq!(config.generation.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_config_validation_threshold() {
        let mut config = Config::default();
        config.clustering.threshold = 1.2;
        assert!(matches!(config.validate(), Err(NewsdeskError::ConfigError(_))));
        config.clustering.threshold = -1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_top_k() {
        let mut config = Config::default();
        config.retrieval.top_k = 0;
        assert!(matches!(config.validate(), Err(NewsdeskError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_toml_value_rejected() {
        let result = Config::from_toml("[retrieval]\ntop_k = 0\n");
        assert!(matches!(result, Err(NewsdeskError::ConfigError(_))));

        let result = Config::from_toml("[embedding]\nbackend = \"onnx\"\n");
        assert!(matches!(result, Err(NewsdeskError::ConfigError(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.clustering.threshold = 0.7;
        config.embedding.backend = EmbeddingBackend::Hashing;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.clustering.threshold, 0.7);
        assert_eq!(loaded.embedding.backend, EmbeddingBackend::Hashing);
    }

    #[test]
    fn test_default_path_under_home() {
        if let Some(path) = Config::default_path() {
            assert!(path.ends_with(".newsdesk/config.toml"));
        }
    }
}
