use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    BAND_ATTENTION_MIN, BAND_EXCELLENT_MIN, BAND_GOOD_MIN, BSS_WEIGHT, PIS_WEIGHT, SAS_WEIGHT,
    TCM_WEIGHT,
};
use crate::scoring::primitives::{
    behavioral_stability_score, clamp_score, prompt_independence_score, round2,
    skill_acquisition_score, therapeutic_consistency_metric, BehaviorIntensity,
    MasteredTargetRecord, PromptLevel, SessionScoreSeries, TargetScore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Attention,
    Critical,
}

impl ScoreBand {
    /// Bucket an unrounded composite. Lower edges are inclusive.
    pub fn from_composite(composite: f64) -> Self {
        if composite >= BAND_EXCELLENT_MIN {
            Self::Excellent
        } else if composite >= BAND_GOOD_MIN {
            Self::Good
        } else if composite >= BAND_ATTENTION_MIN {
            Self::Attention
        } else {
            Self::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Attention => "attention",
            Self::Critical => "critical",
        }
    }
}

/// Everything needed to compute one composite index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInputs {
    #[serde(default)]
    pub active_targets: Vec<TargetScore>,
    #[serde(default)]
    pub mastered_targets: Vec<MasteredTargetRecord>,
    #[serde(default)]
    pub prompt_levels: Vec<PromptLevel>,
    pub behavior_intensity: BehaviorIntensity,
    #[serde(default = "default_trend_factor")]
    pub trend_factor: f64,
    #[serde(default)]
    pub session_scores: SessionScoreSeries,
}

fn default_trend_factor() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeScoreResult {
    pub sas: f64,
    pub pis: f64,
    pub bss: f64,
    pub tcm: f64,
    pub composite: f64,
    pub band: ScoreBand,
}

impl CompositeScoreResult {
    /// Two-decimal copy for display. The band is kept from the unrounded value.
    pub fn rounded(&self) -> Self {
        Self {
            sas: round2(self.sas),
            pis: round2(self.pis),
            bss: round2(self.bss),
            tcm: round2(self.tcm),
            composite: round2(self.composite),
            band: self.band,
        }
    }
}

/// Weighted sum of the four sub-scores, clamped.
pub fn weighted_composite(sas: f64, pis: f64, bss: f64, tcm: f64) -> f64 {
    clamp_score(SAS_WEIGHT * sas + PIS_WEIGHT * pis + BSS_WEIGHT * bss + TCM_WEIGHT * tcm)
}

/// Build a result from already computed sub-scores.
pub fn composite_from_sub_scores(sas: f64, pis: f64, bss: f64, tcm: f64) -> CompositeScoreResult {
    let (sas, pis, bss, tcm) = (
        clamp_score(sas),
        clamp_score(pis),
        clamp_score(bss),
        clamp_score(tcm),
    );
    let composite = weighted_composite(sas, pis, bss, tcm);
    CompositeScoreResult {
        sas,
        pis,
        bss,
        tcm,
        composite,
        band: ScoreBand::from_composite(composite),
    }
}

pub fn compute_composite(inputs: &ScoreInputs) -> CompositeScoreResult {
    let sas = skill_acquisition_score(&inputs.active_targets, &inputs.mastered_targets);
    let pis = prompt_independence_score(&inputs.prompt_levels);
    let bss = behavioral_stability_score(inputs.behavior_intensity, inputs.trend_factor);
    let tcm = therapeutic_consistency_metric(&inputs.session_scores);

    let result = composite_from_sub_scores(sas, pis, bss, tcm);
    debug!(
        sas = result.sas,
        pis = result.pis,
        bss = result.bss,
        tcm = result.tcm,
        composite = result.composite,
        band = result.band.as_str(),
        "composite score computed"
    );
    result
}
