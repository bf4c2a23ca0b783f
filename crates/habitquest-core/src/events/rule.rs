//! Completion rules for weekly events.

use serde::{Deserialize, Serialize};

use crate::calendar::DayKey;
use crate::error::{CoreError, Result};
use crate::state::DayActivity;

/// Threshold rule evaluated over one week of activity.
///
/// Every rule measures a count that can only grow as records are added,
/// which keeps weekly progress monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompletionRule {
    /// Days with any tracked activity
    ActiveDays { required: u32 },
    /// Sum of habit check-ins
    CheckIns { required: u32 },
    /// Sum of active minutes
    ActiveMinutes { required: u32 },
    /// Days with a journal entry
    JournalDays { required: u32 },
    /// Longest run of consecutive active days
    Streak { required: u32 },
    /// Days with at least `min_check_ins` check-ins
    StrongDays { required: u32, min_check_ins: u32 },
}

impl CompletionRule {
    pub fn required(&self) -> u32 {
        match *self {
            CompletionRule::ActiveDays { required }
            | CompletionRule::CheckIns { required }
            | CompletionRule::ActiveMinutes { required }
            | CompletionRule::JournalDays { required }
            | CompletionRule::Streak { required }
            | CompletionRule::StrongDays { required, .. } => required,
        }
    }

    pub fn validate(&self, event_id: &str) -> Result<()> {
        if self.required() == 0 {
            return Err(CoreError::invalid_value(
                format!("events.{event_id}.rule.required"),
                "must be at least 1",
            ));
        }
        if let CompletionRule::StrongDays { min_check_ins: 0, .. } = self {
            return Err(CoreError::invalid_value(
                format!("events.{event_id}.rule.min_check_ins"),
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Measure the rule over a week, given in day order.
    pub fn measure(&self, week: &[(DayKey, Option<&DayActivity>)]) -> u32 {
        let days = || week.iter().filter_map(|(_, activity)| *activity);
        match *self {
            CompletionRule::ActiveDays { .. } => count(days().filter(|d| d.is_active())),
            CompletionRule::CheckIns { .. } => days().fold(0u32, |acc, d| acc.saturating_add(d.check_ins)),
            CompletionRule::ActiveMinutes { .. } => {
                days().fold(0u32, |acc, d| acc.saturating_add(d.active_minutes))
            }
            CompletionRule::JournalDays { .. } => count(days().filter(|d| d.journaled)),
            CompletionRule::Streak { .. } => longest_run(week),
            CompletionRule::StrongDays { min_check_ins, .. } => {
                count(days().filter(|d| d.check_ins >= min_check_ins))
            }
        }
    }
}

fn count<'a>(days: impl Iterator<Item = &'a DayActivity>) -> u32 {
    u32::try_from(days.count()).unwrap_or(u32::MAX)
}

fn longest_run(week: &[(DayKey, Option<&DayActivity>)]) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;
    let mut previous: Option<&DayKey> = None;

    for (day, activity) in week {
        let active = activity.is_some_and(DayActivity::is_active);
        let continues = previous.is_some_and(|p| p.is_followed_by(day));
        run = match (active, continues) {
            (false, _) => 0,
            (true, true) => run + 1,
            (true, false) => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week_of(records: &[Option<DayActivity>]) -> Vec<(DayKey, Option<DayActivity>)> {
        records
            .iter()
            .enumerate()
            .map(|(i, r)| (DayKey::parse(&format!("2024-03-{:02}", 4 + i)).unwrap(), r.clone()))
            .collect()
    }

    fn measure(rule: CompletionRule, records: &[Option<DayActivity>]) -> u32 {
        let owned = week_of(records);
        let week: Vec<_> = owned.iter().map(|(d, a)| (*d, a.as_ref())).collect();
        rule.measure(&week)
    }

    fn active() -> Option<DayActivity> {
        Some(DayActivity { check_ins: 1, ..Default::default() })
    }

    #[test]
    fn active_days_counts_tracked_days() {
        let records = [active(), None, active(), Some(DayActivity::default()), active(), None, None];
        assert_eq!(measure(CompletionRule::ActiveDays { required: 3 }, &records), 3);
    }

    #[test]
    fn streak_resets_on_gaps() {
        let records = [active(), active(), None, active(), active(), active(), None];
        assert_eq!(measure(CompletionRule::Streak { required: 5 }, &records), 3);
    }

    #[test]
    fn streak_needs_consecutive_dates() {
        let a = DayActivity { check_ins: 1, ..Default::default() };
        let week = vec![
            (DayKey::parse("2024-03-04").unwrap(), Some(&a)),
            (DayKey::parse("2024-03-06").unwrap(), Some(&a)),
        ];
        assert_eq!(CompletionRule::Streak { required: 2 }.measure(&week), 1);
    }

    #[test]
    fn sums_and_strong_days() {
        let records = [
            Some(DayActivity { check_ins: 4, active_minutes: 20, ..Default::default() }),
            Some(DayActivity { check_ins: 2, active_minutes: 40, journaled: true, mood: None }),
            Some(DayActivity { check_ins: 3, ..Default::default() }),
        ];
        assert_eq!(measure(CompletionRule::CheckIns { required: 10 }, &records), 9);
        assert_eq!(measure(CompletionRule::ActiveMinutes { required: 60 }, &records), 60);
        assert_eq!(measure(CompletionRule::JournalDays { required: 1 }, &records), 1);
        assert_eq!(
            measure(CompletionRule::StrongDays { required: 2, min_check_ins: 3 }, &records),
            2
        );
    }

    #[test]
    fn zero_thresholds_are_rejected() {
        assert!(CompletionRule::ActiveDays { required: 0 }.validate("x").is_err());
        assert!(CompletionRule::StrongDays { required: 2, min_check_ins: 0 }.validate("x").is_err());
        assert!(CompletionRule::Streak { required: 1 }.validate("x").is_ok());
    }

    #[test]
    fn rules_deserialize_from_tagged_tables() {
        let rule: CompletionRule =
            toml::from_str("type = \"strong_days\"\nrequired = 3\nmin_check_ins = 2").unwrap();
        assert_eq!(rule, CompletionRule::StrongDays { required: 3, min_check_ins: 2 });
    }
}
