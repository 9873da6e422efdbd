//! Wire types for the incident backend.
//!
//! Field names follow the backend's PascalCase contract and must not be
//! renamed. Timestamps are kept as the strings the backend produced, and
//! fields this crate does not model are carried through in `extra` so the
//! payloads can be echoed unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Envelope returned by `GET /api/incidents/current`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CurrentIncident {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub incident: Option<Incident>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CurrentIncident {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn active(incident: Incident) -> Self {
        Self {
            status: Some(incident.status_label()),
            incident: Some(incident),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Incident {
    pub id: i64,
    /// The backend sends this as a name or as its enum ordinal.
    pub status: Value,
    pub created_at: String,
    #[serde(default)]
    pub resolved_at: Option<String>,
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Incident {
    pub fn new(id: i64, status: impl Into<Value>, created_at: impl Into<String>) -> Self {
        Self {
            id,
            status: status.into(),
            created_at: created_at.into(),
            resolved_at: None,
            resolved_by: None,
            extra: Map::new(),
        }
    }

    /// Status rendered as text: strings as-is, anything else as its JSON form.
    pub fn status_label(&self) -> String {
        match &self.status {
            Value::String(name) => name.clone(),
            other => other.to_string(),
        }
    }
}

/// Body returned by `PATCH /api/incidents/{id}/resolve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResolvedIncident {
    pub id: i64,
    pub resolved_at: String,
    pub resolved_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Level exactly as the backend sent it. See [`LogEntry::severity`].
    #[serde(default)]
    pub level: Value,
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            id: None,
            timestamp: None,
            level: Value::from(level.name()),
            message: message.into(),
            extra: Map::new(),
        }
    }

    pub fn severity(&self) -> LogLevel {
        LogLevel::from_value(&self.level)
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddLogRequest<'a> {
    pub level: u8,
    pub message: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResolveRequest<'a> {
    pub resolved_by: &'a str,
}

/// Severity of an incident log entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Map a level name onto a severity. Any name other than `Info`,
    /// `Warning` or `Error` becomes `Info`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Warning" => LogLevel::Warning,
            "Error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    /// Integer encoding used in request bodies.
    pub fn as_wire(self) -> u8 {
        match self {
            LogLevel::Info => 0,
            LogLevel::Warning => 1,
            LogLevel::Error => 2,
        }
    }

    pub fn from_wire(value: u64) -> Option<Self> {
        match value {
            0 => Some(LogLevel::Info),
            1 => Some(LogLevel::Warning),
            2 => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Read a level the backend echoed, either as a name or as the integer
    /// code. Anything unrecognised is Info.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(name) => LogLevel::from_name(name),
            Value::Number(code) => code
                .as_u64()
                .and_then(LogLevel::from_wire)
                .unwrap_or_default(),
            _ => LogLevel::Info,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Info => "Info",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
        }
    }
}

impl From<&str> for LogLevel {
    fn from(name: &str) -> Self {
        LogLevel::from_name(name)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
