use serde::{Deserialize, Serialize};

use crate::{CommanderError, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5294";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_AGENT_NAME: &str = "IncidentCommanderAgent";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransportMode {
    #[serde(rename = "stdio")]
    Stdio,
    #[serde(rename = "sse")]
    Sse,
}

impl Default for TransportMode {
    fn default() -> Self {
        TransportMode::Stdio
    }
}

impl TransportMode {
    /// Parse a transport name, `None` when it is not recognised.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "stdio" => Some(TransportMode::Stdio),
            "sse" | "http" => Some(TransportMode::Sse),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub transport: TransportMode,
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let transport = match lookup("TRANSPORT") {
            Some(raw) => TransportMode::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Unknown TRANSPORT '{}', falling back to stdio", raw);
                TransportMode::Stdio
            }),
            None => TransportMode::Stdio,
        };

        let config = Config {
            backend: BackendConfig {
                base_url: lookup("API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                timeout_secs: parse_var(&lookup, "API_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            server: ServerConfig {
                transport,
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_var(&lookup, "PORT")?.unwrap_or(8000),
            },
        };

        if config.backend.timeout_secs == 0 {
            return Err(CommanderError::Config(
                "API_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            server: ServerConfig {
                transport: TransportMode::Stdio,
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
        }
    }
}

/// Settings for the one-shot agent provisioning command.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub connection_string: String,
    pub model_deployment_name: String,
    pub agent_name: String,
    pub access_token: String,
}

impl ProvisionConfig {
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    CommanderError::Config(format!("{} environment variable is not set.", key))
                })
        };

        Ok(Self {
            connection_string: required("AZURE_AI_FOUNDRY_CONNECTION_STRING")?,
            model_deployment_name: required("AZURE_AI_FOUNDRY_MODEL_DEPLOYMENT_NAME")?,
            agent_name: lookup("AZURE_AI_FOUNDRY_AGENT_NAME")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string()),
            access_token: required("AZURE_AI_FOUNDRY_ACCESS_TOKEN")?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CommanderError::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(None),
    }
}
