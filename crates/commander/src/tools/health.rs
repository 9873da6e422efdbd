//! Health Check Tool
//!
//! Reports whether the backend currently has an active incident.

use serde::Serialize;
use tracing::info;

use crate::{
    backend::{CurrentIncident, IncidentBackend},
    Result,
};

pub const HEALTHY: &str = "Healthy";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HealthReport {
    Healthy {
        status: String,
        message: String,
        details: CurrentIncident,
    },
    Unhealthy {
        status: String,
        message: String,
        incident_id: i64,
        created_at: String,
        details: CurrentIncident,
    },
}

impl HealthReport {
    pub fn status(&self) -> &str {
        match self {
            HealthReport::Healthy { status, .. } | HealthReport::Unhealthy { status, .. } => status,
        }
    }

    pub fn details(&self) -> &CurrentIncident {
        match self {
            HealthReport::Healthy { details, .. } | HealthReport::Unhealthy { details, .. } => {
                details
            }
        }
    }
}

pub async fn check_health(backend: &dyn IncidentBackend) -> Result<HealthReport> {
    let current = backend.current_incident().await?;

    let report = match current.incident.clone() {
        None => HealthReport::Healthy {
            status: HEALTHY.to_string(),
            message: "All systems operational. No active incidents.".to_string(),
            details: current,
        },
        Some(incident) => {
            let label = incident.status_label();
            info!(incident_id = incident.id, status = %label, "Active incident detected");
            HealthReport::Unhealthy {
                status: format!("Unhealthy - {}", label),
                message: format!("Active incident detected: {}", label),
                incident_id: incident.id,
                created_at: incident.created_at,
                details: current,
            }
        }
    };

    Ok(report)
}
