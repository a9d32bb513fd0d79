use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinkragError>;

#[derive(Error, Debug)]
pub enum LinkragError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Chat completion error: {0}")]
    Chat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub mod commands;
pub mod completion;
pub mod config;
pub mod crawler;
pub mod database;
pub mod embeddings;
pub mod openai;
pub mod pipeline;
pub mod server;
pub mod urls;
