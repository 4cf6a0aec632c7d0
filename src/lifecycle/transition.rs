use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::{GRID_CELLS, SUSPENSION_WARNING_DAYS};
use crate::lifecycle::status::ProtocolStatus;

/// Transient input to a transition request.
#[derive(Debug, Clone, Default)]
pub struct TransitionContext {
    pub discontinuation_reason: Option<String>,
    pub suspended_since: Option<DateTime<Utc>>,
    /// Passing cells of the generalization grid, required to validate mastery.
    pub generalization_cells_passed: Option<usize>,
    /// Overrides the wall clock.
    pub now: Option<DateTime<Utc>>,
}

impl TransitionContext {
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            discontinuation_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn suspended_since(mut self, since: DateTime<Utc>) -> Self {
        self.suspended_since = Some(since);
        self
    }

    pub fn with_grid_passed(mut self, passed: usize) -> Self {
        self.generalization_cells_passed = Some(passed);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

/// Non-fatal note attached to an accepted transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionWarning {
    SuspensionOverrun { days_suspended: i64, limit_days: i64 },
}

impl fmt::Display for TransitionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionWarning::SuspensionOverrun {
                days_suspended,
                limit_days,
            } => write!(
                f,
                "protocol has been suspended for {days_suspended} days, exceeding the {limit_days}-day limit"
            ),
        }
    }
}

/// An accepted transition. The caller persists `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: ProtocolStatus,
    pub to: ProtocolStatus,
    pub warnings: Vec<TransitionWarning>,
}

impl TransitionOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("unknown protocol status {0:?}")]
    UnknownStatus(String),
    #[error("transition from {from} to {to} is not allowed")]
    NotAllowed {
        from: ProtocolStatus,
        to: ProtocolStatus,
    },
    #[error("cannot archive a protocol from {from}; only draft or maintained protocols can be archived")]
    ArchiveSourceNotEligible { from: ProtocolStatus },
    #[error("discontinuing a protocol from {from} requires a reason")]
    MissingDiscontinuationReason { from: ProtocolStatus },
    #[error("generalization grid has {passed} of {required} passing cells")]
    IncompleteGeneralizationGrid {
        from: ProtocolStatus,
        passed: usize,
        required: usize,
    },
}

/// Decide whether `from -> to` is legal. Never mutates anything.
pub fn validate_transition(
    from: ProtocolStatus,
    to: ProtocolStatus,
    context: &TransitionContext,
) -> Result<TransitionOutcome, TransitionError> {
    if !from.can_transition_to(to) {
        debug!(%from, %to, "transition rejected by table");
        return Err(TransitionError::NotAllowed { from, to });
    }

    match to {
        ProtocolStatus::Archived => {
            if !matches!(from, ProtocolStatus::Maintained | ProtocolStatus::Draft) {
                return Err(TransitionError::ArchiveSourceNotEligible { from });
            }
        }
        ProtocolStatus::Discontinued => {
            let has_reason = context
                .discontinuation_reason
                .as_deref()
                .is_some_and(|reason| !reason.trim().is_empty());
            if !has_reason {
                return Err(TransitionError::MissingDiscontinuationReason { from });
            }
        }
        ProtocolStatus::MasteredValidated => {
            let passed = context.generalization_cells_passed.unwrap_or(0);
            if passed < GRID_CELLS {
                return Err(TransitionError::IncompleteGeneralizationGrid {
                    from,
                    passed,
                    required: GRID_CELLS,
                });
            }
        }
        ProtocolStatus::Draft
        | ProtocolStatus::Active
        | ProtocolStatus::Mastered
        | ProtocolStatus::Generalization
        | ProtocolStatus::Maintenance
        | ProtocolStatus::Maintained
        | ProtocolStatus::Regression
        | ProtocolStatus::Suspended => {}
    }

    let mut warnings = Vec::new();
    if from == ProtocolStatus::Suspended {
        if let Some(since) = context.suspended_since {
            let days_suspended = (context.now() - since).num_days();
            if days_suspended > SUSPENSION_WARNING_DAYS {
                warn!(%from, %to, days_suspended, "suspension exceeded limit");
                warnings.push(TransitionWarning::SuspensionOverrun {
                    days_suspended,
                    limit_days: SUSPENSION_WARNING_DAYS,
                });
            }
        }
    }

    debug!(%from, %to, warnings = warnings.len(), "transition accepted");
    Ok(TransitionOutcome { from, to, warnings })
}

/// Same as [`validate_transition`] but starting from raw labels.
pub fn validate_transition_labels(
    from: &str,
    to: &str,
    context: &TransitionContext,
) -> Result<TransitionOutcome, TransitionError> {
    let from = ProtocolStatus::parse(from)?;
    let to = ProtocolStatus::parse(to)?;
    validate_transition(from, to, context)
}
