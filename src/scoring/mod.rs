//! Composite clinical-status index.
//!
//! Four sub-scores, each clamped to [0, 100]:
//! - SAS (Skill Acquisition) - active targets blended with mastered targets
//! - PIS (Prompt Independence) - mean prompt hierarchy level
//! - BSS (Behavioral Stability) - behaviour severity scaled by trend
//! - TCM (Therapeutic Consistency) - variation across recent sessions
//!
//! The composite weights them equally and buckets the result into a band.

pub mod composite;
pub mod primitives;

pub use composite::{
    composite_from_sub_scores, compute_composite, weighted_composite, CompositeScoreResult,
    ScoreBand, ScoreInputs,
};
pub use primitives::{
    behavioral_stability_score, clamp_score, prompt_independence_score, round2,
    skill_acquisition_score, therapeutic_consistency_metric, trial_percent, BehaviorIntensity,
    MasteredTargetRecord, MasteryStatus, PromptLevel, SessionScoreSeries, TargetScore,
};
