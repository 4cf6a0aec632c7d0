use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{GRID_CELLS, GRID_CONTEXTS, GRID_VARIATIONS};
use crate::scoring::PromptLevel;

/// One submitted generalization probe. Append-only; newer probes for the same
/// cell supersede older ones in the grid projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralizationProbe {
    pub id: String,
    pub protocol_id: String,
    pub variation_index: u8,
    pub context_index: u8,
    pub correct_trials: u32,
    pub total_trials: u32,
    pub prompt_level: PromptLevel,
    pub score_percent: f64,
    pub created_at: DateTime<Utc>,
}

impl GeneralizationProbe {
    pub fn cell(&self) -> (u8, u8) {
        (self.variation_index, self.context_index)
    }
}

/// Latest probe for every in-range cell, ordered by variation then context.
/// Ties on `created_at` go to the later entry in the log.
pub fn latest_per_cell(probes: &[GeneralizationProbe]) -> Vec<&GeneralizationProbe> {
    let mut latest = Vec::with_capacity(GRID_CELLS);
    for variation in 1..=GRID_VARIATIONS {
        for context in 1..=GRID_CONTEXTS {
            let newest = probes
                .iter()
                .filter(|p| p.cell() == (variation, context))
                .max_by_key(|p| p.created_at);
            if let Some(probe) = newest {
                latest.push(probe);
            }
        }
    }
    latest
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbeStatus {
    Pending,
    Completed,
    Cancelled,
}

impl ProbeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbeResult {
    Passed,
    Failed,
}

/// A scheduled maintenance check.
///
/// `cycle_started_at` is the maintenance entry the probe was scheduled from;
/// a protocol that regresses and re-enters maintenance starts a new cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceProbe {
    pub id: String,
    pub protocol_id: String,
    pub week_offset: u32,
    pub cycle_started_at: DateTime<Utc>,
    pub scheduled_at: DateTime<Utc>,
    pub status: ProbeStatus,
    pub result: Option<ProbeResult>,
    pub correct_trials: Option<u32>,
    pub total_trials: Option<u32>,
    pub score_percent: Option<f64>,
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl MaintenanceProbe {
    pub fn pending(
        id: impl Into<String>,
        protocol_id: impl Into<String>,
        week_offset: u32,
        cycle_started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            protocol_id: protocol_id.into(),
            week_offset,
            cycle_started_at,
            scheduled_at: cycle_started_at + Duration::weeks(i64::from(week_offset)),
            status: ProbeStatus::Pending,
            result: None,
            correct_trials: None,
            total_trials: None,
            score_percent: None,
            evaluated_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ProbeStatus::Pending
    }

    /// Whether the probe belongs to the cycle entered at `cycle_start`.
    /// An unknown cycle start matches every probe.
    pub fn in_cycle(&self, cycle_start: Option<DateTime<Utc>>) -> bool {
        cycle_start.map_or(true, |start| self.cycle_started_at == start)
    }
}
