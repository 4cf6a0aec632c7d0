//! Protocol progression and scoring engine.
//!
//! Pure, synchronous domain logic for a clinical practice manager:
//! - composite clinical-status index from four weighted sub-scores
//! - protocol lifecycle state machine
//! - generalization grid evaluation
//! - maintenance regression detection
//!
//! Persistence, clock and session history are supplied through the traits in
//! [`store`] and [`clock`].

pub mod audit;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod logging;
pub mod probe;
pub mod scoring;
pub mod services;
pub mod store;

pub use error::ProgressionError;
pub use lifecycle::{
    validate_transition, ProtocolRecord, ProtocolStatus, TransitionContext, TransitionError,
    TransitionOutcome, TransitionWarning,
};
pub use scoring::{compute_composite, CompositeScoreResult, ScoreBand, ScoreInputs};
