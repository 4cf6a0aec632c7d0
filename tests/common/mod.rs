#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use protocol_engine::clock::FixedClock;
use protocol_engine::lifecycle::{ProtocolRecord, ProtocolStatus};
use protocol_engine::scoring::PromptLevel;
use protocol_engine::services::{GeneralizationSubmission, MaintenanceEvaluation};
use protocol_engine::store::InMemoryStore;

pub const PROTOCOL_ID: &str = "protocol-1";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 9, 30, 0).unwrap()
}

pub fn clock() -> FixedClock {
    FixedClock::new(start_time())
}

pub fn store_with(status: ProtocolStatus, threshold: Option<f64>) -> InMemoryStore {
    let store = InMemoryStore::new();
    let mut record = ProtocolRecord::new(PROTOCOL_ID).with_status(status);
    record.mastery_threshold = threshold;
    if status == ProtocolStatus::Maintenance {
        record.maintenance_started_at = Some(start_time());
    }
    store.insert_protocol(record);
    store
}

/// Submission scoring `percent` out of 100 trials.
pub fn probe_at(variation: u8, context: u8, percent: u32) -> GeneralizationSubmission {
    GeneralizationSubmission {
        variation_index: variation,
        context_index: context,
        correct_trials: percent,
        total_trials: 100,
        prompt_level: PromptLevel::Independent,
    }
}

pub fn grid_cells() -> Vec<(u8, u8)> {
    (1..=3u8)
        .flat_map(|v| (1..=2u8).map(move |c| (v, c)))
        .collect()
}

pub fn evaluation(correct: u32, total: u32) -> MaintenanceEvaluation {
    MaintenanceEvaluation {
        correct_trials: correct,
        total_trials: total,
    }
}
