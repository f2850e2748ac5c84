//! Configuration management for supergit.
//!
//! Configuration is loaded from `~/.config/supergit/config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Output and log folders.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Documentation tool settings.
    #[serde(default)]
    pub documentation: DocumentationConfig,
}

/// Backend configuration for LLM providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Ollama local backend.
    Ollama {
        /// Model name (default: qwen2.5-coder:0.5b).
        #[serde(default = "default_ollama_model")]
        model: String,
        /// Ollama host URL (default: http://localhost:11434).
        #[serde(default = "default_ollama_host")]
        host: String,
    },
    /// OpenAI API.
    OpenAI {
        /// Model name (default: gpt-4o-mini).
        #[serde(default = "default_openai_model")]
        model: String,
        /// API key (prefer OPENAI_API_KEY env var).
        #[serde(default)]
        api_key: Option<String>,
    },
    /// Google Gemini API.
    Gemini {
        /// Model name (default: gemini-1.5-pro).
        #[serde(default = "default_gemini_model")]
        model: String,
        /// API key (prefer GEMINI_API_KEY env var).
        #[serde(default)]
        api_key: Option<String>,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Ollama {
            model: default_ollama_model(),
            host: default_ollama_host(),
        }
    }
}

fn default_ollama_model() -> String {
    "qwen2.5-coder:0.5b".to_string()
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-pro".to_string()
}

/// Folders the tools write into, relative to `root` unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_generated")]
    pub generated: PathBuf,
    #[serde(default = "default_optimized")]
    pub optimized: PathBuf,
    #[serde(default = "default_reviews")]
    pub reviews: PathBuf,
    #[serde(default = "default_logs")]
    pub logs: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            generated: default_generated(),
            optimized: default_optimized(),
            reviews: default_reviews(),
            logs: default_logs(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_generated() -> PathBuf {
    PathBuf::from("coder_folder")
}

fn default_optimized() -> PathBuf {
    PathBuf::from("optim")
}

fn default_reviews() -> PathBuf {
    PathBuf::from("reviews")
}

fn default_logs() -> PathBuf {
    PathBuf::from("logs")
}

/// Settings for the repository documentation tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentationConfig {
    /// Per-file character budget when summarizing a directory.
    #[serde(default = "default_max_file_chars")]
    pub max_file_chars: usize,
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            max_file_chars: default_max_file_chars(),
        }
    }
}

fn default_max_file_chars() -> usize {
    3000
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("supergit"))
            .context("Could not determine config directory")
    }

    /// Get the default config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from `path`, using defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Get the backend type as a string.
    pub fn backend_type(&self) -> &'static str {
        match &self.backend {
            BackendConfig::Ollama { .. } => "ollama",
            BackendConfig::OpenAI { .. } => "openai",
            BackendConfig::Gemini { .. } => "gemini",
        }
    }

    /// Get the model name.
    pub fn model_name(&self) -> &str {
        match &self.backend {
            BackendConfig::Ollama { model, .. } => model,
            BackendConfig::OpenAI { model, .. } => model,
            BackendConfig::Gemini { model, .. } => model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(matches!(config.backend, BackendConfig::Ollama { .. }));
        assert_eq!(config.model_name(), "qwen2.5-coder:0.5b");
        assert_eq!(config.paths.generated, PathBuf::from("coder_folder"));
        assert_eq!(config.documentation.max_file_chars, 3000);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("ollama"));
        assert!(toml.contains("coder_folder"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
[backend]
type = "gemini"

[paths]
reviews = "out/reviews"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.backend_type(), "gemini");
        assert_eq!(config.model_name(), "gemini-1.5-pro");
        assert_eq!(config.paths.reviews, PathBuf::from("out/reviews"));
        assert_eq!(config.paths.logs, PathBuf::from("logs"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.backend_type(), "ollama");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut config = Config::default();
        config.documentation.max_file_chars = 42;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.documentation.max_file_chars, 42);
    }
}
