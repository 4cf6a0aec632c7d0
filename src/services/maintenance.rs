use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::{AuditEvent, MaintenanceCompletedPayload, MaintenanceRegressionPayload};
use crate::clock::Clock;
use crate::constants::{MAINTENANCE_WEEK_OFFSETS, REGRESSION_THRESHOLD};
use crate::error::ProgressionError;
use crate::lifecycle::{ProtocolRecord, ProtocolStatus, TransitionContext, TransitionOutcome};
use crate::probe::{MaintenanceProbe, ProbeResult, ProbeStatus};
use crate::scoring::trial_percent;
use crate::store::{ProbeStore, ProtocolStore};

/// Create the pending follow-up probes for the current maintenance cycle.
///
/// Offsets that already have a probe in this cycle, in any status, are
/// skipped. A record without an entry timestamp gets one from the clock.
/// Returns the number of probes created.
pub fn schedule_maintenance_probes<S>(
    store: &S,
    clock: &dyn Clock,
    protocol_id: &str,
) -> Result<usize, ProgressionError>
where
    S: ProtocolStore + ProbeStore + ?Sized,
{
    let mut record = store.protocol(protocol_id)?;
    require_maintenance(&record)?;

    let cycle_start = match record.maintenance_started_at {
        Some(start) => start,
        None => {
            let start = clock.now();
            record.maintenance_started_at = Some(start);
            store.save_protocol(&record)?;
            start
        }
    };
    let existing = store.maintenance_probes(protocol_id)?;

    let mut created = 0;
    for week_offset in MAINTENANCE_WEEK_OFFSETS {
        if existing
            .iter()
            .any(|p| p.in_cycle(Some(cycle_start)) && p.week_offset == week_offset)
        {
            continue;
        }
        store.insert_maintenance_probe(MaintenanceProbe::pending(
            Uuid::new_v4().to_string(),
            protocol_id,
            week_offset,
            cycle_start,
        ))?;
        created += 1;
    }

    debug!(protocol_id, created, %cycle_start, "maintenance probes scheduled");
    Ok(created)
}

fn require_maintenance(record: &ProtocolRecord) -> Result<(), ProgressionError> {
    if record.status == ProtocolStatus::Maintenance {
        return Ok(());
    }
    Err(ProgressionError::WrongStatus {
        protocol_id: record.id.clone(),
        expected: ProtocolStatus::Maintenance,
        actual: record.status,
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceEvaluation {
    pub correct_trials: u32,
    pub total_trials: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceOutcome {
    pub probe: MaintenanceProbe,
    pub score_percent: f64,
    pub result: ProbeResult,
    pub regression_triggered: bool,
    pub cancelled_probes: usize,
    pub maintenance_completed: bool,
    pub transition: Option<TransitionOutcome>,
}

/// Evaluate a pending maintenance probe.
///
/// The owning protocol must still be in maintenance. Pass/fail uses the
/// protocol's mastery threshold. Regression fires on the fixed regression
/// threshold alone and cancels every other pending probe.
pub fn evaluate_maintenance_probe<S>(
    store: &S,
    clock: &dyn Clock,
    probe_id: &str,
    evaluation: MaintenanceEvaluation,
) -> Result<MaintenanceOutcome, ProgressionError>
where
    S: ProtocolStore + ProbeStore + ?Sized,
{
    let mut probe = store.maintenance_probe(probe_id)?;
    match probe.status {
        ProbeStatus::Pending => {}
        ProbeStatus::Completed => {
            return Err(ProgressionError::ProbeAlreadyEvaluated {
                probe_id: probe_id.to_string(),
                status: probe.status.as_str(),
            })
        }
        ProbeStatus::Cancelled => {
            return Err(ProgressionError::ProbeCancelled {
                probe_id: probe_id.to_string(),
            })
        }
    }
    if evaluation.correct_trials > evaluation.total_trials {
        return Err(ProgressionError::InvalidInput(format!(
            "correctTrials ({}) exceeds totalTrials ({})",
            evaluation.correct_trials, evaluation.total_trials
        )));
    }

    let mut record = store.protocol(&probe.protocol_id)?;
    require_maintenance(&record)?;
    let now = clock.now();
    let score_percent = trial_percent(evaluation.correct_trials, evaluation.total_trials);
    let result = if score_percent >= record.effective_mastery_threshold() {
        ProbeResult::Passed
    } else {
        ProbeResult::Failed
    };
    let regression_triggered = score_percent < REGRESSION_THRESHOLD;

    // Decided before any write: a rejected transition leaves the probe pending.
    let regression = if regression_triggered {
        Some(record.transition(ProtocolStatus::Regression, TransitionContext::default(), now)?)
    } else {
        None
    };

    probe.status = ProbeStatus::Completed;
    probe.result = Some(result);
    probe.correct_trials = Some(evaluation.correct_trials);
    probe.total_trials = Some(evaluation.total_trials);
    probe.score_percent = Some(score_percent);
    probe.evaluated_at = Some(now);
    store.update_maintenance_probe(&probe)?;

    let protocol_id = probe.protocol_id.clone();
    debug!(
        protocol_id = %protocol_id,
        probe_id,
        week_offset = probe.week_offset,
        score = score_percent,
        ?result,
        "maintenance probe evaluated"
    );

    if let Some(outcome) = regression {
        let cancelled = cancel_pending_probes(store, &protocol_id)?;
        store.save_protocol(&record)?;
        store.append_audit(AuditEvent::MaintenanceRegression(MaintenanceRegressionPayload {
            protocol_id: protocol_id.clone(),
            probe_id: probe.id.clone(),
            week_offset: probe.week_offset,
            score_percent,
            regression_threshold: REGRESSION_THRESHOLD,
            cancelled_probes: cancelled,
            regression_count: record.regression_count,
            timestamp: now,
        }))?;
        warn!(
            protocol_id = %protocol_id,
            score = score_percent,
            cancelled,
            regression_count = record.regression_count,
            "maintenance regression detected"
        );
        return Ok(MaintenanceOutcome {
            probe,
            score_percent,
            result,
            regression_triggered: true,
            cancelled_probes: cancelled,
            maintenance_completed: false,
            transition: Some(outcome),
        });
    }

    let probes: Vec<_> = store
        .maintenance_probes(&protocol_id)?
        .into_iter()
        .filter(|p| p.in_cycle(record.maintenance_started_at))
        .collect();
    let all_scheduled = MAINTENANCE_WEEK_OFFSETS
        .iter()
        .all(|offset| probes.iter().any(|p| p.week_offset == *offset));
    let all_passed = probes
        .iter()
        .all(|p| p.status == ProbeStatus::Completed && p.result == Some(ProbeResult::Passed));

    let mut transition = None;
    if all_scheduled && all_passed {
        let outcome =
            record.transition(ProtocolStatus::Maintained, TransitionContext::default(), now)?;
        store.save_protocol(&record)?;
        store.append_audit(AuditEvent::MaintenanceCompleted(MaintenanceCompletedPayload {
            protocol_id: protocol_id.clone(),
            probes_passed: probes.len(),
            timestamp: now,
        }))?;
        info!(protocol_id = %protocol_id, "all maintenance probes passed, protocol maintained");
        transition = Some(outcome);
    }

    Ok(MaintenanceOutcome {
        probe,
        score_percent,
        result,
        regression_triggered: false,
        cancelled_probes: 0,
        maintenance_completed: transition.is_some(),
        transition,
    })
}

/// Cancel every pending maintenance probe of the protocol. Returns the count.
pub(crate) fn cancel_pending_probes<S>(store: &S, protocol_id: &str) -> Result<usize, ProgressionError>
where
    S: ProbeStore + ?Sized,
{
    let pending = store.pending_maintenance_probes(protocol_id)?;
    for mut probe in pending.iter().cloned() {
        probe.status = ProbeStatus::Cancelled;
        store.update_maintenance_probe(&probe)?;
    }
    Ok(pending.len())
}
