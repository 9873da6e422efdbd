//! Incident Backend Module
//!
//! Client side of the incident-management REST API. The dispatcher talks to
//! the backend only through [`IncidentBackend`].

pub mod client;
pub mod models;

use async_trait::async_trait;

use crate::Result;

pub use client::BackendClient;
pub use models::{CurrentIncident, Incident, LogEntry, LogLevel, ResolvedIncident};

/// Operations offered by the incident backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IncidentBackend: Send + Sync {
    /// Fetch the currently active incident, if any
    async fn current_incident(&self) -> Result<CurrentIncident>;

    /// Fetch the log entries of an incident, in backend order
    async fn incident_logs(&self, incident_id: i64) -> Result<Vec<LogEntry>>;

    /// Mark an incident as resolved by `resolved_by`
    async fn resolve_incident(&self, incident_id: i64, resolved_by: &str)
        -> Result<ResolvedIncident>;

    /// Append a log entry to an incident
    async fn add_log(&self, incident_id: i64, level: LogLevel, message: &str) -> Result<LogEntry>;
}
