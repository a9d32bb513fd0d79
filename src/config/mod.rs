// Configuration management module
// TOML settings with environment overrides for credentials

pub mod interactive;
pub mod settings;


pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    ChatConfig, Config, ConfigError, ContextRole, OpenAiConfig, ScraperConfig, ServerConfig,
    VectorBackend, VectorStoreConfig,
};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
