use anyhow::Result;
use clap::{Parser, Subcommand};
use linkrag::commands::{ask, ingest, serve};
use linkrag::config::{Config, run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "linkrag")]
#[command(about = "Chat with the pages you link: scrape, embed, retrieve, answer")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml and local vector data (default: ~/.linkrag)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure OpenAI, the vector store and prompt settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Start the chat web server
    Serve {
        /// Address to bind, overriding the configured host
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overriding the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Scrape, embed and store one or more pages
    Ingest {
        /// Page URLs
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Ask a single question using the stored pages as context
    Ask {
        /// The user message; any links in it are ingested first
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_dir = cli.config_dir.as_deref();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&Config::load_with_env(config_dir)?);
            } else {
                let dir = match config_dir {
                    Some(dir) => dir.to_path_buf(),
                    None => Config::config_dir()?,
                };
                run_interactive_config(&dir)?;
            }
        }
        Commands::Serve { host, port } => {
            serve(&Config::load_with_env(config_dir)?, host, port).await?;
        }
        Commands::Ingest { urls } => {
            ingest(&Config::load_with_env(config_dir)?, &urls).await?;
        }
        Commands::Ask { message } => {
            ask(&Config::load_with_env(config_dir)?, &message).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["linkrag", "serve"]).expect("should parse");

        assert!(cli.config_dir.is_none());
        assert!(matches!(
            cli.command,
            Commands::Serve {
                host: None,
                port: None
            }
        ));
    }

    #[test]
    fn serve_with_address() {
        let cli = Cli::try_parse_from(["linkrag", "serve", "--host", "0.0.0.0", "--port", "8080"])
            .expect("should parse");

        if let Commands::Serve { host, port } = cli.command {
            assert_eq!(host.as_deref(), Some("0.0.0.0"));
            assert_eq!(port, Some(8080));
        } else {
            panic!("expected serve command");
        }
    }

    #[test]
    fn ingest_takes_many_urls() {
        let cli = Cli::try_parse_from([
            "linkrag",
            "ingest",
            "https://example.com",
            "https://www.rust-lang.org",
        ])
        .expect("should parse");

        if let Commands::Ingest { urls } = cli.command {
            assert_eq!(urls, vec!["https://example.com", "https://www.rust-lang.org"]);
        } else {
            panic!("expected ingest command");
        }
    }

    #[test]
    fn ingest_requires_a_url() {
        let result = Cli::try_parse_from(["linkrag", "ingest"]);

        assert!(result.is_err());
    }

    #[test]
    fn ask_with_global_config_dir() {
        let cli = Cli::try_parse_from([
            "linkrag",
            "ask",
            "What does https://example.com say?",
            "--config-dir",
            "/tmp/linkrag",
        ])
        .expect("should parse");

        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/linkrag")));
        assert!(matches!(cli.command, Commands::Ask { .. }));
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["linkrag", "config", "--show"]).expect("should parse");

        assert!(matches!(cli.command, Commands::Config { show: true }));
    }

    #[test]
    fn invalid_command() {
        let result = Cli::try_parse_from(["linkrag", "invalid"]);

        assert!(matches!(result, Err(err) if err.kind() == ErrorKind::InvalidSubcommand));
    }

    #[test]
    fn help_message() {
        let result = Cli::try_parse_from(["linkrag", "--help"]);

        assert!(matches!(result, Err(err) if err.kind() == ErrorKind::DisplayHelp));
    }
}
