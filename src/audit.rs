use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::ProtocolStatus;

/// Immutable record of an automatic transition, appended to the protocol store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum AuditEvent {
    #[serde(rename = "STATUS_CHANGED")]
    StatusChanged(StatusChangedPayload),

    #[serde(rename = "GENERALIZATION_VALIDATED")]
    GeneralizationValidated(GeneralizationValidatedPayload),

    #[serde(rename = "MAINTENANCE_REGRESSION")]
    MaintenanceRegression(MaintenanceRegressionPayload),

    #[serde(rename = "MAINTENANCE_COMPLETED")]
    MaintenanceCompleted(MaintenanceCompletedPayload),
}

impl AuditEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            AuditEvent::StatusChanged(_) => "STATUS_CHANGED",
            AuditEvent::GeneralizationValidated(_) => "GENERALIZATION_VALIDATED",
            AuditEvent::MaintenanceRegression(_) => "MAINTENANCE_REGRESSION",
            AuditEvent::MaintenanceCompleted(_) => "MAINTENANCE_COMPLETED",
        }
    }

    pub fn protocol_id(&self) -> &str {
        match self {
            AuditEvent::StatusChanged(p) => &p.protocol_id,
            AuditEvent::GeneralizationValidated(p) => &p.protocol_id,
            AuditEvent::MaintenanceRegression(p) => &p.protocol_id,
            AuditEvent::MaintenanceCompleted(p) => &p.protocol_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            AuditEvent::StatusChanged(p) => p.timestamp,
            AuditEvent::GeneralizationValidated(p) => p.timestamp,
            AuditEvent::MaintenanceRegression(p) => p.timestamp,
            AuditEvent::MaintenanceCompleted(p) => p.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangedPayload {
    pub protocol_id: String,
    pub from: ProtocolStatus,
    pub to: ProtocolStatus,
    pub warnings: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralizationValidatedPayload {
    pub protocol_id: String,
    pub cells_filled: usize,
    pub cells_passed: usize,
    pub mastery_threshold: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRegressionPayload {
    pub protocol_id: String,
    pub probe_id: String,
    pub week_offset: u32,
    pub score_percent: f64,
    pub regression_threshold: f64,
    pub cancelled_probes: usize,
    pub regression_count: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceCompletedPayload {
    pub protocol_id: String,
    pub probes_passed: usize,
    pub timestamp: DateTime<Utc>,
}
