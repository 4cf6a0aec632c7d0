use std::collections::HashMap;

use parking_lot::RwLock;

use crate::audit::AuditEvent;
use crate::lifecycle::ProtocolRecord;
use crate::probe::{GeneralizationProbe, MaintenanceProbe};
use crate::scoring::SessionScoreSeries;
use crate::store::{ProbeStore, ProtocolStore, SessionHistoryProvider, StoreError};

#[derive(Debug, Default)]
struct Inner {
    protocols: HashMap<String, ProtocolRecord>,
    generalization: Vec<GeneralizationProbe>,
    maintenance: Vec<MaintenanceProbe>,
    sessions: HashMap<String, SessionScoreSeries>,
    audit: Vec<AuditEvent>,
}

/// Process-local store for tests and the CLI. Not a persistence layer.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_protocol(&self, record: ProtocolRecord) {
        self.inner.write().protocols.insert(record.id.clone(), record);
    }

    pub fn record_session_score(&self, protocol_id: &str, score: f64) {
        self.inner
            .write()
            .sessions
            .entry(protocol_id.to_string())
            .or_default()
            .push(score);
    }

    pub fn audit_events(&self, protocol_id: &str) -> Vec<AuditEvent> {
        self.inner
            .read()
            .audit
            .iter()
            .filter(|event| event.protocol_id() == protocol_id)
            .cloned()
            .collect()
    }
}

impl ProtocolStore for InMemoryStore {
    fn protocol(&self, protocol_id: &str) -> Result<ProtocolRecord, StoreError> {
        self.inner
            .read()
            .protocols
            .get(protocol_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("protocol", protocol_id))
    }

    fn save_protocol(&self, record: &ProtocolRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        match inner.protocols.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("protocol", &record.id)),
        }
    }

    fn append_audit(&self, event: AuditEvent) -> Result<(), StoreError> {
        self.inner.write().audit.push(event);
        Ok(())
    }
}

impl ProbeStore for InMemoryStore {
    fn insert_generalization_probe(&self, probe: GeneralizationProbe) -> Result<(), StoreError> {
        self.inner.write().generalization.push(probe);
        Ok(())
    }

    fn generalization_probes(&self, protocol_id: &str) -> Result<Vec<GeneralizationProbe>, StoreError> {
        Ok(self
            .inner
            .read()
            .generalization
            .iter()
            .filter(|probe| probe.protocol_id == protocol_id)
            .cloned()
            .collect())
    }

    fn insert_maintenance_probe(&self, probe: MaintenanceProbe) -> Result<(), StoreError> {
        self.inner.write().maintenance.push(probe);
        Ok(())
    }

    fn maintenance_probe(&self, probe_id: &str) -> Result<MaintenanceProbe, StoreError> {
        self.inner
            .read()
            .maintenance
            .iter()
            .find(|probe| probe.id == probe_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("maintenance probe", probe_id))
    }

    fn maintenance_probes(&self, protocol_id: &str) -> Result<Vec<MaintenanceProbe>, StoreError> {
        Ok(self
            .inner
            .read()
            .maintenance
            .iter()
            .filter(|probe| probe.protocol_id == protocol_id)
            .cloned()
            .collect())
    }

    fn update_maintenance_probe(&self, probe: &MaintenanceProbe) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let slot = inner
            .maintenance
            .iter_mut()
            .find(|existing| existing.id == probe.id)
            .ok_or_else(|| StoreError::not_found("maintenance probe", &probe.id))?;
        *slot = probe.clone();
        Ok(())
    }
}

impl SessionHistoryProvider for InMemoryStore {
    fn session_scores(&self, protocol_id: &str) -> Result<SessionScoreSeries, StoreError> {
        Ok(self
            .inner
            .read()
            .sessions
            .get(protocol_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn missing_protocol_is_not_found() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.protocol("nope").unwrap_err(),
            StoreError::not_found("protocol", "nope")
        );
    }

    #[test]
    fn pending_query_filters_by_status() {
        let store = InMemoryStore::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut done = MaintenanceProbe::pending("m-1", "p", 2, at);
        done.status = crate::probe::ProbeStatus::Completed;
        store.insert_maintenance_probe(done).unwrap();
        store
            .insert_maintenance_probe(MaintenanceProbe::pending("m-2", "p", 6, at))
            .unwrap();
        store
            .insert_maintenance_probe(MaintenanceProbe::pending("m-3", "other", 6, at))
            .unwrap();

        let pending = store.pending_maintenance_probes("p").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "m-2");
    }

    #[test]
    fn session_history_defaults_to_empty() {
        let store = InMemoryStore::new();
        assert!(store.session_scores("p").unwrap().is_empty());
        store.record_session_score("p", 72.0);
        store.record_session_score("p", 75.0);
        assert_eq!(store.session_scores("p").unwrap().len(), 2);
    }
}
