use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::lifecycle::transition::TransitionError;

/// Lifecycle status of a therapy protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolStatus {
    Draft,
    Active,
    Mastered,
    Generalization,
    MasteredValidated,
    Maintenance,
    Maintained,
    Regression,
    Suspended,
    Discontinued,
    Archived,
}

impl ProtocolStatus {
    pub const ALL: [ProtocolStatus; 11] = [
        ProtocolStatus::Draft,
        ProtocolStatus::Active,
        ProtocolStatus::Mastered,
        ProtocolStatus::Generalization,
        ProtocolStatus::MasteredValidated,
        ProtocolStatus::Maintenance,
        ProtocolStatus::Maintained,
        ProtocolStatus::Regression,
        ProtocolStatus::Suspended,
        ProtocolStatus::Discontinued,
        ProtocolStatus::Archived,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ProtocolStatus::Draft => "draft",
            ProtocolStatus::Active => "active",
            ProtocolStatus::Mastered => "mastered",
            ProtocolStatus::Generalization => "generalization",
            ProtocolStatus::MasteredValidated => "mastered_validated",
            ProtocolStatus::Maintenance => "maintenance",
            ProtocolStatus::Maintained => "maintained",
            ProtocolStatus::Regression => "regression",
            ProtocolStatus::Suspended => "suspended",
            ProtocolStatus::Discontinued => "discontinued",
            ProtocolStatus::Archived => "archived",
        }
    }

    /// Parse a status label. Case, `-` and spaces are tolerated.
    pub fn parse(label: &str) -> Result<Self, TransitionError> {
        let normalized = label.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| TransitionError::UnknownStatus(label.to_string()))
    }

    /// Destinations reachable in one step. Exhaustive so a new status cannot
    /// slip in without a decision about its edges.
    pub const fn allowed_targets(self) -> &'static [ProtocolStatus] {
        use ProtocolStatus::*;
        match self {
            Draft => &[Active, Archived],
            Active => &[Mastered, Suspended, Discontinued],
            Mastered => &[Generalization, Regression],
            Generalization => &[MasteredValidated, Regression],
            MasteredValidated => &[Maintenance, Regression],
            Maintenance => &[Maintained, Regression],
            Maintained => &[Archived, Regression],
            Regression => &[Active],
            Suspended => &[Active, Discontinued],
            Discontinued => &[],
            Archived => &[],
        }
    }

    pub fn can_transition_to(self, target: ProtocolStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }
}

impl fmt::Display for ProtocolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolStatus {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
