//! Agent Provisioning
//!
//! Registers the Incident Commander agent with an Azure AI Foundry project.
//! This runs once during setup; the resulting agent id is configured by hand
//! in the backend afterwards.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::{config::ProvisionConfig, CommanderError, Result};

pub const AGENTS_API_VERSION: &str = "2024-12-01-preview";

pub const AGENT_INSTRUCTIONS: &str = "You are the Incident Commander Agent. Your goal is to help \
diagnose and remediate system incidents. You have access to a Model Context Protocol (MCP) server \
that provides tools for system monitoring, chaos engineering, and remediation. Always be concise, \
professional, and explain your reasoning when taking actions.";

/// Parsed `<host>;<subscription_id>;<resource_group>;<project_name>` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub host: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub project_name: String,
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.trim().split(';').map(str::trim).collect();
        match parts.as_slice() {
            [host, subscription_id, resource_group, project_name]
                if parts.iter().all(|part| !part.is_empty()) =>
            {
                Ok(Self {
                    host: host.to_string(),
                    subscription_id: subscription_id.to_string(),
                    resource_group: resource_group.to_string(),
                    project_name: project_name.to_string(),
                })
            }
            _ => Err(CommanderError::Config(
                "AZURE_AI_FOUNDRY_CONNECTION_STRING must look like \
                 <host>;<subscription_id>;<resource_group>;<project_name>"
                    .to_string(),
            )),
        }
    }

    /// Base URL of the project's agents API
    pub fn agents_endpoint(&self) -> String {
        format!(
            "https://{}/agents/v1.0/subscriptions/{}/resourceGroups/{}/providers/Microsoft.MachineLearningServices/workspaces/{}",
            self.host, self.subscription_id, self.resource_group, self.project_name
        )
    }
}

#[derive(Debug, Serialize)]
struct CreateAgentRequest<'a> {
    model: &'a str,
    name: &'a str,
    instructions: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProvisionedAgent {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

pub struct AgentProvisioner {
    endpoint: String,
    access_token: String,
    client: Client,
}

impl AgentProvisioner {
    pub fn new(config: &ProvisionConfig) -> Result<Self> {
        let connection = ConnectionString::parse(&config.connection_string)?;
        Self::with_endpoint(connection.agents_endpoint(), config.access_token.clone())
    }

    /// Build a provisioner against an explicit agents API base URL.
    pub fn with_endpoint(endpoint: String, access_token: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token,
            client,
        })
    }

    pub async fn create_agent(&self, model: &str, name: &str) -> Result<ProvisionedAgent> {
        let url = format!("{}/assistants", self.endpoint);
        info!("Provisioning Agent: {}...", name);
        debug!(%url, model, "Creating agent");

        let response = self
            .client
            .post(&url)
            .query(&[("api-version", AGENTS_API_VERSION)])
            .bearer_auth(&self.access_token)
            .json(&CreateAgentRequest {
                model,
                name,
                instructions: AGENT_INSTRUCTIONS,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CommanderError::Provision {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
