//! Collaborator contracts.
//!
//! Persistence lives outside the engine. Callers must serialise the
//! read-decide-write sequence per protocol (a lock or a transaction that
//! re-checks status); the engine does not.

pub mod memory;

use thiserror::Error;

use crate::audit::AuditEvent;
use crate::lifecycle::ProtocolRecord;
use crate::probe::{latest_per_cell, GeneralizationProbe, MaintenanceProbe};
use crate::scoring::SessionScoreSeries;

pub use memory::InMemoryStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

pub trait ProtocolStore {
    fn protocol(&self, protocol_id: &str) -> Result<ProtocolRecord, StoreError>;

    fn save_protocol(&self, record: &ProtocolRecord) -> Result<(), StoreError>;

    fn append_audit(&self, event: AuditEvent) -> Result<(), StoreError>;
}

pub trait ProbeStore {
    fn insert_generalization_probe(&self, probe: GeneralizationProbe) -> Result<(), StoreError>;

    /// Every probe for the protocol, in insertion order.
    fn generalization_probes(&self, protocol_id: &str) -> Result<Vec<GeneralizationProbe>, StoreError>;

    /// Most recent probe per (variation, context) cell.
    fn latest_generalization_probes(
        &self,
        protocol_id: &str,
    ) -> Result<Vec<GeneralizationProbe>, StoreError> {
        let probes = self.generalization_probes(protocol_id)?;
        Ok(latest_per_cell(&probes).into_iter().cloned().collect())
    }

    fn insert_maintenance_probe(&self, probe: MaintenanceProbe) -> Result<(), StoreError>;

    fn maintenance_probe(&self, probe_id: &str) -> Result<MaintenanceProbe, StoreError>;

    fn maintenance_probes(&self, protocol_id: &str) -> Result<Vec<MaintenanceProbe>, StoreError>;

    fn pending_maintenance_probes(
        &self,
        protocol_id: &str,
    ) -> Result<Vec<MaintenanceProbe>, StoreError> {
        Ok(self
            .maintenance_probes(protocol_id)?
            .into_iter()
            .filter(MaintenanceProbe::is_pending)
            .collect())
    }

    fn update_maintenance_probe(&self, probe: &MaintenanceProbe) -> Result<(), StoreError>;
}

pub trait SessionHistoryProvider {
    fn session_scores(&self, protocol_id: &str) -> Result<SessionScoreSeries, StoreError>;
}
