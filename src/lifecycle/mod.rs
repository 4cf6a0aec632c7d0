//! Protocol lifecycle.
//!
//! `validate_transition` is the decision oracle; `ProtocolRecord` applies an
//! accepted outcome to the fields a protocol store persists.

pub mod record;
pub mod status;
pub mod transition;

pub use record::{ProtocolRecord, StatusChange};
pub use status::ProtocolStatus;
pub use transition::{
    validate_transition, validate_transition_labels, TransitionContext, TransitionError,
    TransitionOutcome, TransitionWarning,
};
