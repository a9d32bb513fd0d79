
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::database::pinecone::normalize_host;

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub timeout_seconds: u64,
    /// Read from the file or `OPENAI_API_KEY`; never written back
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            chat_model: "gpt-4".to_string(),
            timeout_seconds: 60,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScraperConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub snippet_length: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 15,
            user_agent: "Mozilla/5.0".to_string(),
            snippet_length: crate::crawler::extractor::DEFAULT_SNIPPET_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    #[default]
    Pinecone,
    Lancedb,
}

impl VectorBackend {
    pub const ALL: [Self; 2] = [Self::Pinecone, Self::Lancedb];

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pinecone => "pinecone",
            Self::Lancedb => "lancedb",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: VectorBackend,
    pub namespace: String,
    pub top_k: usize,
    /// Index host, e.g. `https://rag-abc123.svc.us-east-1.pinecone.io`
    pub pinecone_host: Option<String>,
    /// Defaults to `<config dir>/vectors`
    pub lancedb_path: Option<PathBuf>,
    /// Read from the file or `PINECONE_API_KEY`; never written back
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackend::default(),
            namespace: "ns1".to_string(),
            top_k: 5,
            pinecone_host: None,
            lancedb_path: None,
            api_key: None,
        }
    }
}

/// Where the retrieved context goes in the completion prompt
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContextRole {
    /// After the user message, as if the model had already said it
    #[default]
    Assistant,
    /// As a second system message ahead of the user message
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChatConfig {
    pub system_prompt: String,
    pub context_role: ContextRole,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You summarize and process URLs for users.".to_string(),
            context_role: ContextRole::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid timeout: {0} (must be between 1 and 300 seconds)")]
    InvalidTimeout(u64),
    #[error("Invalid user agent (cannot be empty)")]
    InvalidUserAgent,
    #[error("Invalid snippet length: {0} (must be between 1 and 10000)")]
    InvalidSnippetLength(usize),
    #[error("Invalid top_k: {0} (must be between 1 and 100)")]
    InvalidTopK(usize),
    #[error("Invalid namespace: '{0}' (cannot be empty)")]
    InvalidNamespace(String),
    #[error("System prompt cannot be empty")]
    EmptySystemPrompt,
    #[error("Missing {0}; set it in config.toml or the environment")]
    MissingSetting(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Default location: `~/.linkrag`
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".linkrag"))
            .or_else(|| dirs::data_dir().map(|data| data.join("linkrag")))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Load `config.toml` from `config_dir`, falling back to defaults when absent
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    /// Load from `config_dir` (or the default directory) and apply environment overrides
    #[inline]
    pub fn load_with_env(config_dir: Option<&Path>) -> Result<Self> {
        let dir = match config_dir {
            Some(dir) => dir.to_path_buf(),
            None => Self::config_dir()?,
        };

        let mut config = Self::load(dir)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config
            .validate()
            .with_context(|| "Configuration validation failed after environment overrides")?;
        Ok(config)
    }

    /// Apply `OPENAI_API_KEY`, `PINECONE_API_KEY`, `PINECONE_HOST` and `LINKRAG_NAMESPACE`
    #[inline]
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(key) = non_empty("PINECONE_API_KEY") {
            self.vector_store.api_key = Some(key);
        }
        if let Some(host) = non_empty("PINECONE_HOST") {
            self.vector_store.pinecone_host = Some(host);
        }
        if let Some(namespace) = non_empty("LINKRAG_NAMESPACE") {
            self.vector_store.namespace = namespace;
        }
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = self.get_base_dir();

        fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join(CONFIG_FILE_NAME)
    }

    /// Directory holding LanceDB tables when that backend is selected
    #[inline]
    pub fn vector_database_path(&self) -> PathBuf {
        self.vector_store
            .lancedb_path
            .clone()
            .unwrap_or_else(|| self.get_base_dir().join("vectors"))
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.openai.validate()?;
        self.scraper.validate()?;
        self.vector_store.validate()?;
        self.chat.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidUrl(self.host.clone()));
        }
        Ok(())
    }

    #[inline]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl OpenAiConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url(&self.base_url)?;

        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.embedding_model.clone()));
        }
        if self.chat_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.chat_model.clone()));
        }
        validate_timeout(self.timeout_seconds)
    }

    /// The API key, or an error naming the setting to provide
    #[inline]
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingSetting("OpenAI API key (OPENAI_API_KEY)"))
    }

    pub fn set_base_url(&mut self, base_url: String) -> Result<(), ConfigError> {
        validate_http_url(&base_url)?;
        self.base_url = base_url;
        Ok(())
    }

    pub fn set_embedding_model(&mut self, model: String) -> Result<(), ConfigError> {
        if model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(model));
        }
        self.embedding_model = model;
        Ok(())
    }

    pub fn set_chat_model(&mut self, model: String) -> Result<(), ConfigError> {
        if model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(model));
        }
        self.chat_model = model;
        Ok(())
    }
}

impl ScraperConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout(self.timeout_seconds)?;

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidUserAgent);
        }
        if !(1..=10_000).contains(&self.snippet_length) {
            return Err(ConfigError::InvalidSnippetLength(self.snippet_length));
        }
        Ok(())
    }
}

impl VectorStoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::InvalidNamespace(self.namespace.clone()));
        }
        if !(1..=100).contains(&self.top_k) {
            return Err(ConfigError::InvalidTopK(self.top_k));
        }
        if let Some(host) = &self.pinecone_host {
            validate_http_url(&normalize_host(host))?;
        }
        Ok(())
    }

    #[inline]
    pub fn require_pinecone_host(&self) -> Result<&str, ConfigError> {
        self.pinecone_host
            .as_deref()
            .ok_or(ConfigError::MissingSetting("Pinecone index host (PINECONE_HOST)"))
    }

    #[inline]
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingSetting("Pinecone API key (PINECONE_API_KEY)"))
    }

    pub fn set_namespace(&mut self, namespace: String) -> Result<(), ConfigError> {
        if namespace.trim().is_empty() {
            return Err(ConfigError::InvalidNamespace(namespace));
        }
        self.namespace = namespace;
        Ok(())
    }

    pub fn set_top_k(&mut self, top_k: usize) -> Result<(), ConfigError> {
        if !(1..=100).contains(&top_k) {
            return Err(ConfigError::InvalidTopK(top_k));
        }
        self.top_k = top_k;
        Ok(())
    }

    pub fn set_pinecone_host(&mut self, host: String) -> Result<(), ConfigError> {
        validate_http_url(&normalize_host(&host))?;
        self.pinecone_host = Some(host);
        Ok(())
    }
}

impl ChatConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system_prompt.trim().is_empty() {
            return Err(ConfigError::EmptySystemPrompt);
        }
        Ok(())
    }
}

fn validate_http_url(value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|_| ConfigError::InvalidUrl(value.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(value.to_string()));
    }
    Ok(())
}

fn validate_timeout(seconds: u64) -> Result<(), ConfigError> {
    if !(1..=300).contains(&seconds) {
        return Err(ConfigError::InvalidTimeout(seconds));
    }
    Ok(())
}
