#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::path::Path;

use super::{Config, ContextRole, OpenAiConfig, VectorBackend, VectorStoreConfig};

#[inline]
pub fn run_interactive_config(config_dir: &Path) -> Result<()> {
    eprintln!("{}", style("🔧 linkrag Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config(config_dir)?;

    eprintln!("{}", style("OpenAI").bold().yellow());
    eprintln!("Models used for embeddings and chat completions.");
    eprintln!();
    configure_openai(&mut config.openai)?;

    eprintln!();
    eprintln!("{}", style("Vector store").bold().yellow());
    eprintln!("Where scraped page metadata is indexed.");
    eprintln!();
    configure_vector_store(&mut config.vector_store)?;

    eprintln!();
    let roles = &["assistant", "system"];
    let default_role = usize::from(config.chat.context_role == ContextRole::System);
    let role_index = Select::new()
        .with_prompt("Deliver retrieved context as which role?")
        .default(default_role)
        .items(roles)
        .interact()?;
    config.chat.context_role = if role_index == 1 {
        ContextRole::System
    } else {
        ContextRole::Assistant
    };

    eprintln!();
    report_credentials();

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config(config: &Config) {
    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Server:").bold().yellow());
    eprintln!("  Bind: {}", style(config.server.bind_address()).cyan());

    eprintln!();
    eprintln!("{}", style("OpenAI:").bold().yellow());
    eprintln!("  Base URL: {}", style(&config.openai.base_url).cyan());
    eprintln!(
        "  Embedding model: {}",
        style(&config.openai.embedding_model).cyan()
    );
    eprintln!("  Chat model: {}", style(&config.openai.chat_model).cyan());
    eprintln!(
        "  API key: {}",
        style(mask_secret(config.openai.api_key.as_deref())).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Scraper:").bold().yellow());
    eprintln!(
        "  Timeout: {}s",
        style(config.scraper.timeout_seconds).cyan()
    );
    eprintln!("  User agent: {}", style(&config.scraper.user_agent).cyan());
    eprintln!(
        "  Snippet length: {}",
        style(config.scraper.snippet_length).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Vector store:").bold().yellow());
    let store = &config.vector_store;
    eprintln!("  Backend: {}", style(store.backend.as_str()).cyan());
    eprintln!("  Namespace: {}", style(&store.namespace).cyan());
    eprintln!("  Top K: {}", style(store.top_k).cyan());
    match store.backend {
        VectorBackend::Pinecone => {
            eprintln!(
                "  Host: {}",
                style(store.pinecone_host.as_deref().unwrap_or("<not set>")).cyan()
            );
            eprintln!(
                "  API key: {}",
                style(mask_secret(store.api_key.as_deref())).cyan()
            );
        }
        VectorBackend::Lancedb => {
            eprintln!(
                "  Path: {}",
                style(config.vector_database_path().display()).cyan()
            );
        }
    }

    eprintln!();
    eprintln!("{}", style("Chat:").bold().yellow());
    eprintln!("  System prompt: {}", style(&config.chat.system_prompt).cyan());
    eprintln!(
        "  Context role: {}",
        style(match config.chat.context_role {
            ContextRole::Assistant => "assistant",
            ContextRole::System => "system",
        })
        .cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
}

/// Show only the last four characters of a credential
fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        None => "<not set>".to_string(),
        Some(value) => {
            let chars: Vec<char> = value.chars().collect();
            if chars.len() <= 4 {
                "****".to_string()
            } else {
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("****{}", tail)
            }
        }
    }
}

fn load_existing_config(config_dir: &Path) -> Result<Config> {
    if config_dir.join(super::settings::CONFIG_FILE_NAME).exists() {
        let config = Config::load(config_dir)?;
        eprintln!("{}", style("Found existing configuration.").green());
        Ok(config)
    } else {
        eprintln!(
            "{}",
            style("No existing configuration found. Using defaults.").yellow()
        );
        Ok(Config {
            base_dir: config_dir.to_path_buf(),
            ..Config::default()
        })
    }
}

fn configure_openai(openai: &mut OpenAiConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("API base URL")
        .default(openai.base_url.clone())
        .interact_text()?;

    let embedding_model: String = Input::new()
        .with_prompt("Embedding model")
        .default(openai.embedding_model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let chat_model: String = Input::new()
        .with_prompt("Chat model")
        .default(openai.chat_model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    openai.set_base_url(base_url)?;
    openai.set_embedding_model(embedding_model)?;
    openai.set_chat_model(chat_model)?;

    Ok(())
}

fn configure_vector_store(store: &mut VectorStoreConfig) -> Result<()> {
    let backends: Vec<&str> = VectorBackend::ALL.iter().map(|b| b.as_str()).collect();
    let default_index = VectorBackend::ALL
        .iter()
        .position(|&b| b == store.backend)
        .unwrap_or(0);

    let backend_index = Select::new()
        .with_prompt("Vector store backend")
        .default(default_index)
        .items(&backends)
        .interact()?;
    store.backend = VectorBackend::ALL[backend_index];

    if store.backend == VectorBackend::Pinecone {
        let host: String = Input::new()
            .with_prompt("Pinecone index host")
            .default(store.pinecone_host.clone().unwrap_or_default())
            .interact_text()?;
        store.set_pinecone_host(host)?;
    }

    let namespace: String = Input::new()
        .with_prompt("Namespace")
        .default(store.namespace.clone())
        .interact_text()?;

    let top_k: usize = Input::new()
        .with_prompt("Matches retrieved per question")
        .default(store.top_k)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=100).contains(input) {
                Ok(())
            } else {
                Err("Top K must be between 1 and 100")
            }
        })
        .interact_text()?;

    store.set_namespace(namespace)?;
    store.set_top_k(top_k)?;

    Ok(())
}

fn report_credentials() {
    for key in ["OPENAI_API_KEY", "PINECONE_API_KEY"] {
        if std::env::var(key).is_ok_and(|value| !value.trim().is_empty()) {
            eprintln!("{}", style(format!("✓ {} is set", key)).green());
        } else {
            eprintln!(
                "{}",
                style(format!("⚠ {} is not set; export it before serving", key)).yellow()
            );
        }
    }
}
