//! Service Restart Tool
//!
//! Remediates an incident by "restarting" the database service: the restart
//! is recorded in the incident log and the incident is resolved.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    backend::{IncidentBackend, LogLevel},
    Result,
};

pub const SUPPORTED_SERVICE: &str = "database";
pub const RESOLVER: &str = "AI Agent";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RestartReport {
    Rejected {
        status: String,
        message: String,
    },
    Success {
        status: String,
        message: String,
        resolved_at: String,
        resolved_by: String,
    },
}

impl RestartReport {
    pub fn status(&self) -> &str {
        match self {
            RestartReport::Rejected { status, .. } | RestartReport::Success { status, .. } => {
                status
            }
        }
    }
}

/// Restart `service_name` and resolve `incident_id`.
///
/// The service name is checked before anything is written. The three
/// backend calls run in order and are not rolled back: if resolving fails,
/// the initiation log entry stays and no completion entry is written.
pub async fn restart_service(
    backend: &dyn IncidentBackend,
    service_name: &str,
    incident_id: i64,
) -> Result<RestartReport> {
    if !service_name.eq_ignore_ascii_case(SUPPORTED_SERVICE) {
        warn!(service_name, "Rejected restart of unsupported service");
        return Ok(RestartReport::Rejected {
            status: "Error".to_string(),
            message: format!(
                "Unknown service: {}. Only '{}' is supported.",
                service_name, SUPPORTED_SERVICE
            ),
        });
    }

    backend
        .add_log(
            incident_id,
            LogLevel::Info,
            &format!("{} initiated {} service restart", RESOLVER, service_name),
        )
        .await?;

    let resolved = backend.resolve_incident(incident_id, RESOLVER).await?;

    backend
        .add_log(
            incident_id,
            LogLevel::Info,
            &format!("{} service restarted successfully. Incident resolved.", service_name),
        )
        .await?;

    info!(incident_id, service_name, "Service restarted and incident resolved");

    Ok(RestartReport::Success {
        status: "Success".to_string(),
        message: format!(
            "{} service restarted. Incident {} resolved.",
            service_name, incident_id
        ),
        resolved_at: resolved.resolved_at,
        resolved_by: resolved.resolved_by,
    })
}
