//! Fixed clinical constants.
//!
//! Every weight and threshold used by the engine lives here. None of these are
//! configurable per tenant; the composite index is a single clinical standard.

/// Weight of the Skill Acquisition Score in the composite.
pub const SAS_WEIGHT: f64 = 0.25;
/// Weight of the Prompt Independence Score in the composite.
pub const PIS_WEIGHT: f64 = 0.25;
/// Weight of the Behavioral Stability Score in the composite.
pub const BSS_WEIGHT: f64 = 0.25;
/// Weight of the Therapeutic Consistency Metric in the composite.
pub const TCM_WEIGHT: f64 = 0.25;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

// Band lower edges, inclusive.
pub const BAND_EXCELLENT_MIN: f64 = 85.0;
pub const BAND_GOOD_MIN: f64 = 70.0;
pub const BAND_ATTENTION_MIN: f64 = 50.0;

// Prompt hierarchy scale, most to least independent.
pub const PROMPT_INDEPENDENT: f64 = 1.00;
pub const PROMPT_GESTURAL: f64 = 0.80;
pub const PROMPT_VERBAL: f64 = 0.60;
pub const PROMPT_MODELING: f64 = 0.40;
pub const PROMPT_PARTIAL_PHYSICAL: f64 = 0.20;
pub const PROMPT_FULL_PHYSICAL: f64 = 0.00;

// Behaviour severity scale.
pub const SEVERITY_MILD: f64 = 0.25;
pub const SEVERITY_MODERATE: f64 = 0.50;
pub const SEVERITY_HIGH: f64 = 0.75;
pub const SEVERITY_SEVERE: f64 = 1.00;

// Default scores for mastered targets without an override.
pub const MAINTAINED_DEFAULT_SCORE: f64 = 100.0;
pub const MASTERED_VALIDATED_DEFAULT_SCORE: f64 = 85.0;
pub const MASTERED_DEFAULT_SCORE: f64 = 75.0;

/// TCM value when there is not enough history to measure variation.
pub const TCM_NEUTRAL: f64 = 75.0;
/// Number of most recent sessions considered by TCM.
pub const TCM_WINDOW: usize = 5;
pub const TCM_MIN_SESSIONS: usize = 2;

/// Mastery threshold used when a protocol has none configured.
pub const DEFAULT_MASTERY_THRESHOLD: f64 = 80.0;

/// Maintenance probes scoring below this percentage force the protocol into
/// regression. Kept separate from the mastery threshold on purpose.
pub const REGRESSION_THRESHOLD: f64 = 70.0;

/// Suspensions longer than this many days raise an operator warning.
pub const SUSPENSION_WARNING_DAYS: i64 = 30;

/// Week offsets, relative to maintenance entry, of the scheduled probes.
pub const MAINTENANCE_WEEK_OFFSETS: [u32; 3] = [2, 6, 12];

pub const GRID_VARIATIONS: u8 = 3;
pub const GRID_CONTEXTS: u8 = 2;
pub const GRID_CELLS: usize = (GRID_VARIATIONS as usize) * (GRID_CONTEXTS as usize);

// Informational generalization figures returned to callers.
pub const GENERALIZATION_FIGURE_COMPLETE: f64 = 100.0;
pub const GENERALIZATION_FIGURE_PARTIAL: f64 = 75.0;
