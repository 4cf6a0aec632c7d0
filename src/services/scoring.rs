use crate::error::ProgressionError;
use crate::scoring::{compute_composite, CompositeScoreResult, ScoreInputs};
use crate::store::SessionHistoryProvider;

/// Composite for a protocol, with session history pulled from the provider.
/// Any `session_scores` already on `inputs` are replaced.
pub fn score_protocol<P>(
    history: &P,
    protocol_id: &str,
    mut inputs: ScoreInputs,
) -> Result<CompositeScoreResult, ProgressionError>
where
    P: SessionHistoryProvider + ?Sized,
{
    inputs.session_scores = history.session_scores(protocol_id)?;
    Ok(compute_composite(&inputs))
}
