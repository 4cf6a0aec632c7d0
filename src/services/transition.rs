use tracing::info;

use crate::audit::{AuditEvent, StatusChangedPayload};
use crate::clock::Clock;
use crate::error::ProgressionError;
use crate::lifecycle::{ProtocolStatus, TransitionContext, TransitionOutcome};
use crate::services::generalization::current_grid;
use crate::services::maintenance::cancel_pending_probes;
use crate::store::{ProbeStore, ProtocolStore};

/// Operator-requested status change: validate, stamp, persist, audit.
///
/// The generalization pass count is always taken from the stored probe log.
/// Leaving maintenance cancels the protocol's pending maintenance probes.
pub fn transition_protocol<S>(
    store: &S,
    clock: &dyn Clock,
    protocol_id: &str,
    to: ProtocolStatus,
    mut context: TransitionContext,
) -> Result<TransitionOutcome, ProgressionError>
where
    S: ProtocolStore + ProbeStore + ?Sized,
{
    let mut record = store.protocol(protocol_id)?;
    let now = context.now.unwrap_or_else(|| clock.now());

    context.generalization_cells_passed = if to == ProtocolStatus::MasteredValidated {
        Some(current_grid(store, &record)?.passed())
    } else {
        None
    };

    let outcome = record.transition(to, context, now)?;
    let cancelled = if outcome.from == ProtocolStatus::Maintenance {
        cancel_pending_probes(store, protocol_id)?
    } else {
        0
    };
    store.save_protocol(&record)?;
    store.append_audit(AuditEvent::StatusChanged(StatusChangedPayload {
        protocol_id: protocol_id.to_string(),
        from: outcome.from,
        to: outcome.to,
        warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
        timestamp: now,
    }))?;
    info!(
        protocol_id,
        from = %outcome.from,
        to = %outcome.to,
        warnings = outcome.warnings.len(),
        cancelled,
        "protocol status changed"
    );
    Ok(outcome)
}

/// Same as [`transition_protocol`] with the target given as a label.
pub fn transition_protocol_label<S>(
    store: &S,
    clock: &dyn Clock,
    protocol_id: &str,
    to: &str,
    context: TransitionContext,
) -> Result<TransitionOutcome, ProgressionError>
where
    S: ProtocolStore + ProbeStore + ?Sized,
{
    let to = ProtocolStatus::parse(to)?;
    transition_protocol(store, clock, protocol_id, to, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::lifecycle::{ProtocolRecord, TransitionError};
    use crate::probe::{GeneralizationProbe, MaintenanceProbe, ProbeStatus};
    use crate::scoring::PromptLevel;
    use crate::store::InMemoryStore;
    use chrono::{Duration, TimeZone, Utc};

    fn grid_probe(cell: (u8, u8), score: f64) -> GeneralizationProbe {
        GeneralizationProbe {
            id: format!("g-{}-{}", cell.0, cell.1),
            protocol_id: "p".to_string(),
            variation_index: cell.0,
            context_index: cell.1,
            correct_trials: 0,
            total_trials: 0,
            prompt_level: PromptLevel::Independent,
            score_percent: score,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn persists_status_and_audit() {
        let store = InMemoryStore::new();
        store.insert_protocol(ProtocolRecord::new("p"));
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(now);

        let outcome =
            transition_protocol(&store, &clock, "p", ProtocolStatus::Active, TransitionContext::default())
                .unwrap();
        assert_eq!(outcome.to, ProtocolStatus::Active);

        let record = store.protocol("p").unwrap();
        assert_eq!(record.status, ProtocolStatus::Active);
        assert_eq!(record.activated_at, Some(now));
        assert_eq!(store.audit_events("p")[0].event_type(), "STATUS_CHANGED");
    }

    #[test]
    fn rejection_does_not_persist() {
        let store = InMemoryStore::new();
        store.insert_protocol(ProtocolRecord::new("p").with_status(ProtocolStatus::Active));
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());

        let err = transition_protocol(
            &store,
            &clock,
            "p",
            ProtocolStatus::Discontinued,
            TransitionContext::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProgressionError::Transition(TransitionError::MissingDiscontinuationReason { .. })
        ));
        assert_eq!(store.protocol("p").unwrap().status, ProtocolStatus::Active);
        assert!(store.audit_events("p").is_empty());
    }

    #[test]
    fn suspension_overrun_uses_stored_start() {
        let store = InMemoryStore::new();
        store.insert_protocol(ProtocolRecord::new("p").with_status(ProtocolStatus::Active));
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);

        transition_protocol(&store, &clock, "p", ProtocolStatus::Suspended, TransitionContext::default())
            .unwrap();
        clock.advance(Duration::days(40));
        let outcome =
            transition_protocol(&store, &clock, "p", ProtocolStatus::Active, TransitionContext::default())
                .unwrap();
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn unknown_label_is_invalid_domain() {
        let store = InMemoryStore::new();
        store.insert_protocol(ProtocolRecord::new("p"));
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());
        let err = transition_protocol_label(&store, &clock, "p", "paused", TransitionContext::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ProgressionError::Transition(TransitionError::UnknownStatus(_))
        ));
    }

    #[test]
    fn validated_mastery_ignores_caller_grid_count() {
        let store = InMemoryStore::new();
        store.insert_protocol(ProtocolRecord::new("p").with_status(ProtocolStatus::Generalization));
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());

        let err = transition_protocol(
            &store,
            &clock,
            "p",
            ProtocolStatus::MasteredValidated,
            TransitionContext::default().with_grid_passed(6),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProgressionError::Transition(TransitionError::IncompleteGeneralizationGrid {
                passed: 0,
                ..
            })
        ));
        assert_eq!(store.protocol("p").unwrap().status, ProtocolStatus::Generalization);
    }

    #[test]
    fn validated_mastery_uses_stored_grid() {
        let store = InMemoryStore::new();
        store.insert_protocol(ProtocolRecord::new("p").with_status(ProtocolStatus::Generalization));
        for v in 1..=3 {
            for c in 1..=2 {
                store.insert_generalization_probe(grid_probe((v, c), 90.0)).unwrap();
            }
        }
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());

        let outcome = transition_protocol(
            &store,
            &clock,
            "p",
            ProtocolStatus::MasteredValidated,
            TransitionContext::default(),
        )
        .unwrap();
        assert_eq!(outcome.to, ProtocolStatus::MasteredValidated);
    }

    #[test]
    fn leaving_maintenance_cancels_pending_probes() {
        let store = InMemoryStore::new();
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        store.insert_protocol(ProtocolRecord::new("p").with_status(ProtocolStatus::Maintenance));
        for (id, offset) in [("m-2", 2), ("m-6", 6)] {
            store
                .insert_maintenance_probe(MaintenanceProbe::pending(id, "p", offset, start))
                .unwrap();
        }
        let clock = FixedClock::new(start);

        transition_protocol(&store, &clock, "p", ProtocolStatus::Regression, TransitionContext::default())
            .unwrap();
        assert!(store.pending_maintenance_probes("p").unwrap().is_empty());
        assert!(store
            .maintenance_probes("p")
            .unwrap()
            .iter()
            .all(|p| p.status == ProbeStatus::Cancelled));
    }
}
