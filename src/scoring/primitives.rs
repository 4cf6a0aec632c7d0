use serde::{Deserialize, Serialize};

use crate::constants::{
    MAINTAINED_DEFAULT_SCORE, MASTERED_DEFAULT_SCORE, MASTERED_VALIDATED_DEFAULT_SCORE,
    PROMPT_FULL_PHYSICAL, PROMPT_GESTURAL, PROMPT_INDEPENDENT, PROMPT_MODELING,
    PROMPT_PARTIAL_PHYSICAL, PROMPT_VERBAL, SCORE_MAX, SCORE_MIN, SEVERITY_HIGH,
    SEVERITY_MILD, SEVERITY_MODERATE, SEVERITY_SEVERE, TCM_MIN_SESSIONS, TCM_NEUTRAL,
    TCM_WINDOW,
};
use crate::lifecycle::ProtocolStatus;

/// An in-progress skill target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetScore {
    pub percent_score: f64,
    pub trial_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryStatus {
    Maintained,
    MasteredValidated,
    Mastered,
}

impl MasteryStatus {
    pub fn default_score(self) -> f64 {
        match self {
            Self::Maintained => MAINTAINED_DEFAULT_SCORE,
            Self::MasteredValidated => MASTERED_VALIDATED_DEFAULT_SCORE,
            Self::Mastered => MASTERED_DEFAULT_SCORE,
        }
    }
}

impl TryFrom<ProtocolStatus> for MasteryStatus {
    type Error = ProtocolStatus;

    fn try_from(status: ProtocolStatus) -> Result<Self, Self::Error> {
        match status {
            ProtocolStatus::Maintained => Ok(Self::Maintained),
            ProtocolStatus::MasteredValidated => Ok(Self::MasteredValidated),
            ProtocolStatus::Mastered => Ok(Self::Mastered),
            other => Err(other),
        }
    }
}

/// A target that has left acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteredTargetRecord {
    pub mastery_status: MasteryStatus,
    #[serde(default)]
    pub override_score: Option<f64>,
}

impl MasteredTargetRecord {
    pub fn new(mastery_status: MasteryStatus) -> Self {
        Self {
            mastery_status,
            override_score: None,
        }
    }

    pub fn with_override(mastery_status: MasteryStatus, score: f64) -> Self {
        Self {
            mastery_status,
            override_score: Some(score),
        }
    }

    pub fn effective_score(&self) -> f64 {
        self.override_score
            .unwrap_or_else(|| self.mastery_status.default_score())
    }
}

/// Assistance needed on a trial, from none to full physical guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptLevel {
    Independent,
    Gestural,
    Verbal,
    Modeling,
    PartialPhysical,
    FullPhysical,
}

impl PromptLevel {
    pub fn scale_value(self) -> f64 {
        match self {
            Self::Independent => PROMPT_INDEPENDENT,
            Self::Gestural => PROMPT_GESTURAL,
            Self::Verbal => PROMPT_VERBAL,
            Self::Modeling => PROMPT_MODELING,
            Self::PartialPhysical => PROMPT_PARTIAL_PHYSICAL,
            Self::FullPhysical => PROMPT_FULL_PHYSICAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorIntensity {
    Mild,
    Moderate,
    High,
    Severe,
}

impl BehaviorIntensity {
    pub fn severity_value(self) -> f64 {
        match self {
            Self::Mild => SEVERITY_MILD,
            Self::Moderate => SEVERITY_MODERATE,
            Self::High => SEVERITY_HIGH,
            Self::Severe => SEVERITY_SEVERE,
        }
    }
}

/// Historical per-session scores for one protocol, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionScoreSeries(Vec<f64>);

impl SessionScoreSeries {
    pub fn new(scores: Vec<f64>) -> Self {
        Self(scores)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, score: f64) {
        self.0.push(score);
    }

    /// The most recent sessions that count towards consistency.
    pub fn recent(&self) -> &[f64] {
        let start = self.0.len().saturating_sub(TCM_WINDOW);
        &self.0[start..]
    }
}

impl From<Vec<f64>> for SessionScoreSeries {
    fn from(scores: Vec<f64>) -> Self {
        Self(scores)
    }
}

/// Clamp into the score range. NaN collapses to the floor.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return SCORE_MIN;
    }
    value.clamp(SCORE_MIN, SCORE_MAX)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of correct trials rounded to two decimals; zero trials score 0.
pub fn trial_percent(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(correct as f64 / total as f64 * 100.0)
}

/// Skill Acquisition Score.
///
/// Active targets contribute as one aggregate unit (their trial-weighted mean),
/// each mastered record as one unit. The blend leans towards the mastered side
/// as more targets are mastered.
pub fn skill_acquisition_score(active: &[TargetScore], mastered: &[MasteredTargetRecord]) -> f64 {
    if active.is_empty() && mastered.is_empty() {
        return 0.0;
    }

    let active_score = weighted_active_mean(active);

    let active_units = if active.is_empty() { 0.0 } else { 1.0 };
    let mastered_units = mastered.len() as f64;
    let mastery_rate = mastered_units / (active_units + mastered_units);

    let mastery_score = if mastered.is_empty() {
        0.0
    } else {
        mastered.iter().map(|m| m.effective_score()).sum::<f64>() / mastered_units
    };

    clamp_score(active_score * (1.0 - mastery_rate) + mastery_score * mastery_rate)
}

fn weighted_active_mean(active: &[TargetScore]) -> f64 {
    let total_trials: f64 = active.iter().map(|t| t.trial_count as f64).sum();
    if total_trials <= 0.0 {
        return 0.0;
    }
    active
        .iter()
        .map(|t| t.percent_score * t.trial_count as f64)
        .sum::<f64>()
        / total_trials
}

/// Prompt Independence Score: mean prompt scale value as a percentage.
pub fn prompt_independence_score(levels: &[PromptLevel]) -> f64 {
    if levels.is_empty() {
        return 0.0;
    }
    let sum: f64 = levels.iter().map(|l| l.scale_value()).sum();
    clamp_score(sum / levels.len() as f64 * 100.0)
}

/// Behavioral Stability Score. `trend_factor` is caller supplied; values that
/// push the product past 100 are absorbed by the clamp.
pub fn behavioral_stability_score(intensity: BehaviorIntensity, trend_factor: f64) -> f64 {
    clamp_score(100.0 * (1.0 - intensity.severity_value()) * trend_factor)
}

/// Therapeutic Consistency Metric: `100 × (1 − CV)` over the last five sessions.
pub fn therapeutic_consistency_metric(history: &SessionScoreSeries) -> f64 {
    if history.len() < TCM_MIN_SESSIONS {
        return TCM_NEUTRAL;
    }

    let recent = history.recent();
    let n = recent.len() as f64;
    let mean = recent.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }

    let variance = recent.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let cv = variance.sqrt() / mean;
    clamp_score(100.0 * (1.0 - cv))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(percent_score: f64, trial_count: u32) -> TargetScore {
        TargetScore {
            percent_score,
            trial_count,
        }
    }

    #[test]
    fn sas_empty_is_zero() {
        assert_eq!(skill_acquisition_score(&[], &[]), 0.0);
    }

    #[test]
    fn sas_active_only_is_trial_weighted_mean() {
        let active = [target(50.0, 10), target(100.0, 30)];
        let sas = skill_acquisition_score(&active, &[]);
        assert!((sas - 87.5).abs() < 1e-9);
    }

    #[test]
    fn sas_mastered_only_uses_status_defaults() {
        let mastered = [
            MasteredTargetRecord::new(MasteryStatus::Maintained),
            MasteredTargetRecord::new(MasteryStatus::Mastered),
        ];
        let sas = skill_acquisition_score(&[], &mastered);
        assert!((sas - 87.5).abs() < 1e-9);
    }

    #[test]
    fn sas_blends_active_aggregate_with_mastered_units() {
        // rate = 1 / (1 + 1) = 0.5
        let active = [target(60.0, 5)];
        let mastered = [MasteredTargetRecord::new(MasteryStatus::MasteredValidated)];
        let sas = skill_acquisition_score(&active, &mastered);
        assert!((sas - 72.5).abs() < 1e-9);
    }

    #[test]
    fn sas_override_supersedes_default() {
        let mastered = [MasteredTargetRecord::with_override(MasteryStatus::Mastered, 40.0)];
        assert!((skill_acquisition_score(&[], &mastered) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn sas_out_of_range_input_is_clamped() {
        let active = [target(250.0, 4)];
        assert_eq!(skill_acquisition_score(&active, &[]), 100.0);
    }

    #[test]
    fn sas_zero_trials_counts_as_zero_active() {
        let active = [target(90.0, 0)];
        assert_eq!(skill_acquisition_score(&active, &[]), 0.0);
    }

    #[test]
    fn pis_mean_of_scale_values() {
        let levels = [
            PromptLevel::Independent,
            PromptLevel::Gestural,
            PromptLevel::Verbal,
        ];
        assert!((prompt_independence_score(&levels) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn pis_empty_is_zero() {
        assert_eq!(prompt_independence_score(&[]), 0.0);
    }

    #[test]
    fn pis_full_physical_only_is_zero() {
        assert_eq!(prompt_independence_score(&[PromptLevel::FullPhysical; 4]), 0.0);
    }

    #[test]
    fn bss_reference_points() {
        assert_eq!(behavioral_stability_score(BehaviorIntensity::Severe, 1.7), 0.0);
        assert_eq!(behavioral_stability_score(BehaviorIntensity::Mild, 1.0), 75.0);
    }

    #[test]
    fn bss_large_trend_factor_is_absorbed() {
        assert_eq!(behavioral_stability_score(BehaviorIntensity::Mild, 3.0), 100.0);
    }

    #[test]
    fn bss_negative_trend_factor_floors_at_zero() {
        assert_eq!(behavioral_stability_score(BehaviorIntensity::Moderate, -1.0), 0.0);
    }

    #[test]
    fn tcm_short_history_is_neutral() {
        assert_eq!(therapeutic_consistency_metric(&SessionScoreSeries::default()), 75.0);
        assert_eq!(therapeutic_consistency_metric(&vec![42.0].into()), 75.0);
    }

    #[test]
    fn tcm_identical_scores_is_perfect() {
        let series: SessionScoreSeries = vec![80.0; 5].into();
        assert_eq!(therapeutic_consistency_metric(&series), 100.0);
    }

    #[test]
    fn tcm_only_uses_last_five() {
        let series: SessionScoreSeries = vec![0.0, 5.0, 70.0, 70.0, 70.0, 70.0, 70.0].into();
        assert_eq!(series.recent().len(), 5);
        assert_eq!(therapeutic_consistency_metric(&series), 100.0);
    }

    #[test]
    fn tcm_zero_mean_is_zero() {
        let series: SessionScoreSeries = vec![0.0, 0.0, 0.0].into();
        assert_eq!(therapeutic_consistency_metric(&series), 0.0);
    }

    #[test]
    fn tcm_uses_population_deviation() {
        // mean 50, population sd 10 -> cv 0.2
        let series: SessionScoreSeries = vec![40.0, 60.0].into();
        assert!((therapeutic_consistency_metric(&series) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn trial_percent_rounds_and_handles_zero_total() {
        assert_eq!(trial_percent(0, 0), 0.0);
        assert_eq!(trial_percent(2, 3), 66.67);
        assert_eq!(trial_percent(6999, 10000), 69.99);
    }

    #[test]
    fn clamp_score_maps_nan_to_floor() {
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(-3.0), 0.0);
        assert_eq!(clamp_score(130.0), 100.0);
    }

    #[test]
    fn mastery_status_from_protocol_status() {
        assert_eq!(
            MasteryStatus::try_from(ProtocolStatus::MasteredValidated),
            Ok(MasteryStatus::MasteredValidated)
        );
        assert_eq!(
            MasteryStatus::try_from(ProtocolStatus::Active),
            Err(ProtocolStatus::Active)
        );
    }
}
