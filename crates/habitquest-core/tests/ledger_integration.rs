//! Integration tests for the event history ledger.

use chrono::{TimeZone, Utc};
use habitquest_core::{
    complete_event, CompletionOutcome, CoreError, EventAward, LevelCurve, ProgressState, WeekKey,
};
use proptest::prelude::*;

#[test]
fn test_double_completion_awards_once() {
    let mut state = ProgressState::new();
    let award = EventAward::new("e1", 50);
    let at = Utc.with_ymd_and_hms(2024, 3, 8, 20, 0, 0).unwrap();

    complete_event(&mut state, "2024-W10", &award, at).unwrap();
    complete_event(&mut state, "2024-W10", &award, at).unwrap();

    assert_eq!(state.event_history.len(), 1);
    assert_eq!(state.xp, 50);
}

#[test]
fn test_recorded_entry_survives_catalog_change() {
    let mut state = ProgressState::new();
    let at = Utc.with_ymd_and_hms(2024, 3, 8, 20, 0, 0).unwrap();
    complete_event(&mut state, "2024-W10", &EventAward::new("old", 40), at).unwrap();

    let outcome = complete_event(&mut state, "2024-W10", &EventAward::new("new", 90), at).unwrap();
    let CompletionOutcome::AlreadyRecorded { entry, mismatch } = outcome else {
        panic!("expected an existing entry");
    };
    assert_eq!(entry.event_id, "old");
    assert!(mismatch.is_some());
    let err: CoreError = mismatch.unwrap().into();
    assert!(!err.is_fatal());
    assert_eq!(state.xp, 40);
}

#[test]
fn test_non_canonical_week_keys_are_rejected() {
    let mut state = ProgressState::new();
    let at = Utc.with_ymd_and_hms(2024, 3, 8, 20, 0, 0).unwrap();
    for key in [" 2024-W10", "+2024-W10", "02024-W10"] {
        let err = complete_event(&mut state, key, &EventAward::new("e1", 50), at).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)), "accepted {key:?}");
    }
    assert!(state.event_history.is_empty());
    assert_eq!(state.xp, 0);
}

#[test]
fn test_history_serializes_by_week_key() {
    let mut state = ProgressState::new();
    let at = Utc.with_ymd_and_hms(2024, 3, 8, 20, 0, 0).unwrap();
    complete_event(&mut state, "2024-W10", &EventAward::new("e1", 50), at).unwrap();

    let json: serde_json::Value = serde_json::from_str(&state.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["eventHistory"]["2024-W10"]["eventId"], "e1");
    assert_eq!(json["eventHistory"]["2024-W10"]["xpAwarded"], 50);
    assert_eq!(json["xp"], 50);
}

proptest! {
    #[test]
    fn prop_repeated_completion_is_idempotent(
        weeks in proptest::collection::vec(1u32..=52, 1..30),
        xp in 0u32..500,
    ) {
        let mut state = ProgressState::new();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let curve = LevelCurve::default();
        let mut last_level = curve.level_for(state.xp).unwrap();

        for week in &weeks {
            let key = format!("2024-W{week:02}");
            complete_event(&mut state, &key, &EventAward::new("e", xp), at).unwrap();
            let level = curve.level_for(state.xp).unwrap();
            prop_assert!(level >= last_level);
            last_level = level;
        }

        let distinct: std::collections::BTreeSet<_> = weeks.iter().collect();
        prop_assert_eq!(state.event_history.len(), distinct.len());
        prop_assert_eq!(state.xp, i64::from(xp) * distinct.len() as i64);
        for week in distinct {
            let key = WeekKey::parse(&format!("2024-W{week:02}")).unwrap();
            prop_assert!(state.event_history.contains(&key));
        }
    }
}
