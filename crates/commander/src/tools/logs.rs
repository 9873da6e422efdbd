//! Log Query Tool
//!
//! Returns the log stream of an incident, defaulting to the active one.

use serde::Serialize;
use tracing::debug;

use crate::{
    backend::{IncidentBackend, LogEntry},
    Result,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogsReport {
    NoActiveIncident {
        status: String,
        logs: Vec<LogEntry>,
        message: String,
    },
    Success {
        status: String,
        incident_id: i64,
        log_count: usize,
        logs: Vec<LogEntry>,
    },
}

impl LogsReport {
    fn no_active_incident() -> Self {
        LogsReport::NoActiveIncident {
            status: "No active incident".to_string(),
            logs: Vec::new(),
            message: "No logs available - system is healthy".to_string(),
        }
    }

    fn success(incident_id: i64, logs: Vec<LogEntry>) -> Self {
        LogsReport::Success {
            status: "Success".to_string(),
            incident_id,
            log_count: logs.len(),
            logs,
        }
    }

    pub fn status(&self) -> &str {
        match self {
            LogsReport::NoActiveIncident { status, .. } | LogsReport::Success { status, .. } => {
                status
            }
        }
    }

    pub fn logs(&self) -> &[LogEntry] {
        match self {
            LogsReport::NoActiveIncident { logs, .. } | LogsReport::Success { logs, .. } => logs,
        }
    }
}

pub async fn query_logs(
    backend: &dyn IncidentBackend,
    incident_id: Option<i64>,
) -> Result<LogsReport> {
    let incident_id = match incident_id {
        Some(id) => id,
        None => match backend.current_incident().await?.incident {
            Some(incident) => incident.id,
            None => return Ok(LogsReport::no_active_incident()),
        },
    };

    let logs = backend.incident_logs(incident_id).await?;
    debug!(incident_id, count = logs.len(), "Fetched incident logs");

    Ok(LogsReport::success(incident_id, logs))
}
