use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{
    models::{AddLogRequest, ResolveRequest},
    CurrentIncident, IncidentBackend, LogEntry, LogLevel, ResolvedIncident,
};
use crate::{config::BackendConfig, metrics, CommanderError, Result};

/// HTTP client for the incident backend
pub struct BackendClient {
    base_url: String,
    client: Client,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let parsed = Url::parse(&config.base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CommanderError::Config(format!(
                "API_BASE_URL must be an http(s) URL, got {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the JSON body, failing on any non-2xx status
    async fn send<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> Result<T> {
        let outcome = self.execute(request).await;
        metrics::record_backend_request(operation, outcome.is_ok());
        outcome
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Backend request failed with {}: {}", status, body);
            return Err(CommanderError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl IncidentBackend for BackendClient {
    async fn current_incident(&self) -> Result<CurrentIncident> {
        debug!("Fetching current incident");
        self.send(
            "current_incident",
            self.client.get(self.url("/api/incidents/current")),
        )
        .await
    }

    async fn incident_logs(&self, incident_id: i64) -> Result<Vec<LogEntry>> {
        debug!(incident_id, "Fetching incident logs");
        self.send(
            "incident_logs",
            self.client
                .get(self.url(&format!("/api/incidents/{}/logs", incident_id))),
        )
        .await
    }

    async fn resolve_incident(
        &self,
        incident_id: i64,
        resolved_by: &str,
    ) -> Result<ResolvedIncident> {
        debug!(incident_id, resolved_by, "Resolving incident");
        self.send(
            "resolve_incident",
            self.client
                .patch(self.url(&format!("/api/incidents/{}/resolve", incident_id)))
                .json(&ResolveRequest { resolved_by }),
        )
        .await
    }

    async fn add_log(&self, incident_id: i64, level: LogLevel, message: &str) -> Result<LogEntry> {
        debug!(incident_id, %level, "Adding incident log");
        self.send(
            "add_log",
            self.client
                .post(self.url(&format!("/api/incidents/{}/logs", incident_id)))
                .json(&AddLogRequest {
                    level: level.as_wire(),
                    message,
                }),
        )
        .await
    }
}
