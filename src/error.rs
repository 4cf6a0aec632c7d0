use thiserror::Error;

use crate::lifecycle::{ProtocolStatus, TransitionError};
use crate::store::StoreError;

/// Rejections from the probe evaluators and the transition service.
///
/// Policy rejections (`Transition`) are kept apart from caller/data problems
/// (`WrongStatus`, `ProbeAlreadyEvaluated`, `ProbeCancelled`, `NotFound`,
/// `InvalidInput`).
#[derive(Debug, Error)]
pub enum ProgressionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("protocol {protocol_id} is {actual}, expected {expected}")]
    WrongStatus {
        protocol_id: String,
        expected: ProtocolStatus,
        actual: ProtocolStatus,
    },
    #[error("maintenance probe {probe_id} was already evaluated ({status})")]
    ProbeAlreadyEvaluated {
        probe_id: String,
        status: &'static str,
    },
    #[error("maintenance probe {probe_id} was cancelled")]
    ProbeCancelled { probe_id: String },
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ProgressionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ProgressionError::NotFound { entity, id },
            other => ProgressionError::Store(other),
        }
    }
}

impl ProgressionError {
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ProgressionError::WrongStatus { .. }
                | ProgressionError::ProbeAlreadyEvaluated { .. }
                | ProgressionError::ProbeCancelled { .. }
        )
    }
}
