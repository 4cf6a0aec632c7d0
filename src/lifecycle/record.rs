use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MASTERY_THRESHOLD;
use crate::lifecycle::status::ProtocolStatus;
use crate::lifecycle::transition::{
    validate_transition, TransitionContext, TransitionError, TransitionOutcome,
};

const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub from: ProtocolStatus,
    pub to: ProtocolStatus,
    pub at: DateTime<Utc>,
}

/// The protocol fields the engine reads and stamps. Owned by the protocol store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolRecord {
    pub id: String,
    pub status: ProtocolStatus,
    pub mastery_threshold: Option<f64>,
    pub regression_count: u32,
    pub activated_at: Option<DateTime<Utc>>,
    pub mastered_at: Option<DateTime<Utc>>,
    pub generalization_started_at: Option<DateTime<Utc>>,
    pub mastery_validated_at: Option<DateTime<Utc>>,
    pub maintenance_started_at: Option<DateTime<Utc>>,
    pub maintained_at: Option<DateTime<Utc>>,
    pub regressed_at: Option<DateTime<Utc>>,
    pub suspended_at: Option<DateTime<Utc>>,
    pub discontinued_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub discontinuation_reason: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub history: Vec<StatusChange>,
}

impl ProtocolRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ProtocolStatus::Draft,
            mastery_threshold: None,
            regression_count: 0,
            activated_at: None,
            mastered_at: None,
            generalization_started_at: None,
            mastery_validated_at: None,
            maintenance_started_at: None,
            maintained_at: None,
            regressed_at: None,
            suspended_at: None,
            discontinued_at: None,
            archived_at: None,
            discontinuation_reason: None,
            updated_at: None,
            history: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: ProtocolStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_mastery_threshold(mut self, threshold: f64) -> Self {
        self.mastery_threshold = Some(threshold);
        self
    }

    pub fn effective_mastery_threshold(&self) -> f64 {
        self.mastery_threshold.unwrap_or(DEFAULT_MASTERY_THRESHOLD)
    }

    /// Fill context fields the record already knows about.
    pub fn enrich_context(&self, mut context: TransitionContext) -> TransitionContext {
        if context.suspended_since.is_none() && self.status == ProtocolStatus::Suspended {
            context.suspended_since = self.suspended_at;
        }
        context
    }

    /// Validate against the current status and apply on success.
    pub fn transition(
        &mut self,
        to: ProtocolStatus,
        context: TransitionContext,
        at: DateTime<Utc>,
    ) -> Result<TransitionOutcome, TransitionError> {
        let context = self.enrich_context(context.at(at));
        let outcome = validate_transition(self.status, to, &context)?;
        self.apply(&outcome, &context, at);
        Ok(outcome)
    }

    /// Record an already validated outcome.
    pub fn apply(&mut self, outcome: &TransitionOutcome, context: &TransitionContext, at: DateTime<Utc>) {
        match outcome.to {
            ProtocolStatus::Draft => {}
            ProtocolStatus::Active => self.activated_at = Some(at),
            ProtocolStatus::Mastered => self.mastered_at = Some(at),
            ProtocolStatus::Generalization => self.generalization_started_at = Some(at),
            ProtocolStatus::MasteredValidated => self.mastery_validated_at = Some(at),
            ProtocolStatus::Maintenance => self.maintenance_started_at = Some(at),
            ProtocolStatus::Maintained => self.maintained_at = Some(at),
            ProtocolStatus::Regression => {
                self.regressed_at = Some(at);
                self.regression_count = self.regression_count.saturating_add(1);
            }
            ProtocolStatus::Suspended => self.suspended_at = Some(at),
            ProtocolStatus::Discontinued => {
                self.discontinued_at = Some(at);
                self.discontinuation_reason = context
                    .discontinuation_reason
                    .as_ref()
                    .map(|reason| reason.trim().to_string());
            }
            ProtocolStatus::Archived => self.archived_at = Some(at),
        }

        if outcome.from == ProtocolStatus::Suspended {
            self.suspended_at = None;
        }

        self.status = outcome.to;
        self.updated_at = Some(at);
        self.history.push(StatusChange {
            from: outcome.from,
            to: outcome.to,
            at,
        });

        if self.history.len() > HISTORY_LIMIT {
            let extra = self.history.len() - HISTORY_LIMIT;
            self.history.drain(0..extra);
        }
    }
}
