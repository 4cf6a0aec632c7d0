//! Property-Based Tests for the protocol lifecycle
//!
//! Invariants:
//! - The oracle accepts exactly the table edges (guards satisfied)
//! - Terminal states are absorbing
//! - Random walks through accepted transitions stay consistent with the record

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use protocol_engine::lifecycle::{
    validate_transition, ProtocolRecord, ProtocolStatus, TransitionContext, TransitionError,
};

fn arb_status() -> impl Strategy<Value = ProtocolStatus> {
    proptest::sample::select(ProtocolStatus::ALL.to_vec())
}

fn permissive_context() -> TransitionContext {
    TransitionContext::with_reason("clinical decision").with_grid_passed(6)
}

proptest! {
    /// PBT-1: acceptance equals table membership when guards are satisfied
    #[test]
    fn oracle_matches_table(from in arb_status(), to in arb_status()) {
        let accepted = validate_transition(from, to, &permissive_context()).is_ok();
        prop_assert_eq!(accepted, from.can_transition_to(to));
    }

    /// PBT-2: rejections outside the table always name both endpoints
    #[test]
    fn table_rejections_carry_endpoints(from in arb_status(), to in arb_status()) {
        prop_assume!(!from.can_transition_to(to));
        let err = validate_transition(from, to, &permissive_context()).unwrap_err();
        prop_assert_eq!(err, TransitionError::NotAllowed { from, to });
    }

    /// PBT-3: blank reasons never discontinue
    #[test]
    fn blank_reason_never_discontinues(spaces in "[ \t\n]{0,8}") {
        let ctx = TransitionContext { discontinuation_reason: Some(spaces), ..Default::default() };
        for from in [ProtocolStatus::Active, ProtocolStatus::Suspended] {
            let rejected = matches!(
                validate_transition(from, ProtocolStatus::Discontinued, &ctx),
                Err(TransitionError::MissingDiscontinuationReason { .. })
            );
            prop_assert!(rejected);
        }
    }

    /// PBT-4: suspension warning iff elapsed days exceed 30
    #[test]
    fn suspension_warning_threshold(days in 0i64..=120) {
        let now = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();
        let ctx = TransitionContext::default()
            .at(now)
            .suspended_since(now - Duration::days(days));
        let outcome = validate_transition(ProtocolStatus::Suspended, ProtocolStatus::Active, &ctx).unwrap();
        prop_assert_eq!(outcome.warnings.len(), usize::from(days > 30));
    }

    /// PBT-5: random walks keep history and status in sync
    #[test]
    fn random_walk_is_consistent(choices in proptest::collection::vec(0usize..4, 0..40)) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut record = ProtocolRecord::new("walk");
        let mut regressions = 0u32;

        for (step, choice) in choices.into_iter().enumerate() {
            let targets = record.status.allowed_targets();
            if targets.is_empty() {
                break;
            }
            let to = targets[choice % targets.len()];
            let at = start + Duration::hours(step as i64);
            let from = record.status;
            record.transition(to, permissive_context(), at).unwrap();
            if to == ProtocolStatus::Regression {
                regressions += 1;
            }
            let last = record.history.last().unwrap();
            prop_assert_eq!((last.from, last.to), (from, to));
            prop_assert_eq!(record.status, to);
        }
        prop_assert_eq!(record.regression_count, regressions);
    }
}

#[test]
fn terminal_states_are_absorbing() {
    for terminal in [ProtocolStatus::Discontinued, ProtocolStatus::Archived] {
        for to in ProtocolStatus::ALL {
            assert!(validate_transition(terminal, to, &permissive_context()).is_err());
        }
    }
}
