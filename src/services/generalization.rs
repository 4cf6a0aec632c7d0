use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::audit::{AuditEvent, GeneralizationValidatedPayload};
use crate::clock::Clock;
use crate::constants::{
    GENERALIZATION_FIGURE_COMPLETE, GENERALIZATION_FIGURE_PARTIAL, GRID_CELLS, GRID_CONTEXTS,
    GRID_VARIATIONS,
};
use crate::error::ProgressionError;
use crate::lifecycle::{ProtocolRecord, ProtocolStatus, TransitionContext, TransitionOutcome};
use crate::probe::{latest_per_cell, GeneralizationProbe};
use crate::scoring::{trial_percent, PromptLevel};
use crate::store::{ProbeStore, ProtocolStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralizationSubmission {
    pub variation_index: u8,
    pub context_index: u8,
    pub correct_trials: u32,
    pub total_trials: u32,
    pub prompt_level: PromptLevel,
}

impl GeneralizationSubmission {
    fn validate(&self) -> Result<(), ProgressionError> {
        if !(1..=GRID_VARIATIONS).contains(&self.variation_index) {
            return Err(ProgressionError::InvalidInput(format!(
                "variationIndex must be between 1 and {GRID_VARIATIONS}, got {}",
                self.variation_index
            )));
        }
        if !(1..=GRID_CONTEXTS).contains(&self.context_index) {
            return Err(ProgressionError::InvalidInput(format!(
                "contextIndex must be between 1 and {GRID_CONTEXTS}, got {}",
                self.context_index
            )));
        }
        if self.correct_trials > self.total_trials {
            return Err(ProgressionError::InvalidInput(format!(
                "correctTrials ({}) exceeds totalTrials ({})",
                self.correct_trials, self.total_trials
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub variation_index: u8,
    pub context_index: u8,
    pub probe_id: String,
    pub score_percent: f64,
    pub passed: bool,
}

/// Read model over the probe log: the latest probe per (variation, context).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralizationGrid {
    pub mastery_threshold: f64,
    pub cells: Vec<GridCell>,
}

impl GeneralizationGrid {
    pub fn project(probes: &[GeneralizationProbe], mastery_threshold: f64) -> Self {
        let cells = latest_per_cell(probes)
            .into_iter()
            .map(|probe| GridCell {
                variation_index: probe.variation_index,
                context_index: probe.context_index,
                probe_id: probe.id.clone(),
                score_percent: probe.score_percent,
                passed: probe.score_percent >= mastery_threshold,
            })
            .collect();
        Self {
            mastery_threshold,
            cells,
        }
    }

    pub fn cell(&self, variation_index: u8, context_index: u8) -> Option<&GridCell> {
        self.cells
            .iter()
            .find(|c| c.variation_index == variation_index && c.context_index == context_index)
    }

    pub fn filled(&self) -> usize {
        self.cells.len()
    }

    pub fn passed(&self) -> usize {
        self.cells.iter().filter(|c| c.passed).count()
    }

    pub fn is_complete(&self) -> bool {
        self.filled() == GRID_CELLS
    }

    pub fn all_passed(&self) -> bool {
        self.is_complete() && self.passed() == GRID_CELLS
    }

    /// Informational generalization quality. Never persisted as a score.
    pub fn figure(&self) -> f64 {
        if self.all_passed() {
            GENERALIZATION_FIGURE_COMPLETE
        } else {
            GENERALIZATION_FIGURE_PARTIAL
        }
    }
}

/// Grid for the protocol's current generalization phase. Probes logged
/// before the phase was last entered are left out.
pub fn current_grid<S>(store: &S, record: &ProtocolRecord) -> Result<GeneralizationGrid, ProgressionError>
where
    S: ProbeStore + ?Sized,
{
    let mut probes = store.generalization_probes(&record.id)?;
    if let Some(started) = record.generalization_started_at {
        probes.retain(|p| p.created_at >= started);
    }
    Ok(GeneralizationGrid::project(
        &probes,
        record.effective_mastery_threshold(),
    ))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralizationOutcome {
    pub probe: GeneralizationProbe,
    pub cells_filled: usize,
    pub cells_passed: usize,
    pub generalization_figure: f64,
    pub transitioned: bool,
    pub transition: Option<TransitionOutcome>,
}

/// Record a generalization probe and validate mastery once the whole grid passes.
pub fn submit_generalization_probe<S>(
    store: &S,
    clock: &dyn Clock,
    protocol_id: &str,
    submission: GeneralizationSubmission,
) -> Result<GeneralizationOutcome, ProgressionError>
where
    S: ProtocolStore + ProbeStore + ?Sized,
{
    let mut record = store.protocol(protocol_id)?;
    if record.status != ProtocolStatus::Generalization {
        return Err(ProgressionError::WrongStatus {
            protocol_id: protocol_id.to_string(),
            expected: ProtocolStatus::Generalization,
            actual: record.status,
        });
    }
    submission.validate()?;

    let now = clock.now();
    let probe = GeneralizationProbe {
        id: Uuid::new_v4().to_string(),
        protocol_id: protocol_id.to_string(),
        variation_index: submission.variation_index,
        context_index: submission.context_index,
        correct_trials: submission.correct_trials,
        total_trials: submission.total_trials,
        prompt_level: submission.prompt_level,
        score_percent: trial_percent(submission.correct_trials, submission.total_trials),
        created_at: now,
    };
    store.insert_generalization_probe(probe.clone())?;

    let grid = current_grid(store, &record)?;
    debug!(
        protocol_id,
        variation = probe.variation_index,
        context = probe.context_index,
        score = probe.score_percent,
        filled = grid.filled(),
        passed = grid.passed(),
        "generalization grid recomputed"
    );

    let mut transition = None;
    if grid.all_passed() {
        let context = TransitionContext::default().with_grid_passed(grid.passed());
        let outcome = record.transition(ProtocolStatus::MasteredValidated, context, now)?;
        store.save_protocol(&record)?;
        store.append_audit(AuditEvent::GeneralizationValidated(
            GeneralizationValidatedPayload {
                protocol_id: protocol_id.to_string(),
                cells_filled: grid.filled(),
                cells_passed: grid.passed(),
                mastery_threshold: grid.mastery_threshold,
                timestamp: now,
            },
        ))?;
        info!(protocol_id, "generalization grid satisfied, mastery validated");
        transition = Some(outcome);
    }

    Ok(GeneralizationOutcome {
        probe,
        cells_filled: grid.filled(),
        cells_passed: grid.passed(),
        generalization_figure: grid.figure(),
        transitioned: transition.is_some(),
        transition,
    })
}
