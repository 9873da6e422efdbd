pub mod backend;
pub mod config;
pub mod mcp;
pub mod metrics;
pub mod provision;
pub mod tools;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommanderError {
    #[error("Backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Provisioning failed with HTTP {status}: {body}")]
    Provision { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, CommanderError>;
