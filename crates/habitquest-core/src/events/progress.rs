//! Weekly event progress calculation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::catalog::WeeklyEvent;
use crate::calendar::DayKey;
use crate::error::Result;
use crate::state::ActivityLog;

/// Completion percentage of the active weekly event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventProgress {
    /// 0..=100, and 100 only when completed
    pub percent: u8,
    pub completed: bool,
}

impl EventProgress {
    /// Progress for `achieved` out of `required` units.
    ///
    /// Partial progress is rounded but capped at 99 so that 100 always means
    /// completed.
    pub fn from_counts(achieved: u32, required: u32) -> Self {
        if achieved >= required {
            return Self {
                percent: 100,
                completed: true,
            };
        }
        let ratio = f64::from(achieved) * 100.0 / f64::from(required);
        Self {
            percent: (ratio.round() as u8).min(99),
            completed: false,
        }
    }

    /// Progress of an already recorded week.
    pub fn recorded() -> Self {
        Self {
            percent: 100,
            completed: true,
        }
    }
}

/// Evaluate `event`'s rule against the records of `day_keys`.
///
/// Records for days outside `day_keys` are ignored and a day listed twice
/// counts once. A malformed record inside the week fails the whole
/// computation.
pub fn compute_event_progress(
    day_keys: &[DayKey],
    days: &ActivityLog,
    event: &WeeklyEvent,
) -> Result<EventProgress> {
    let unique: BTreeSet<DayKey> = day_keys.iter().copied().collect();
    let week: Vec<_> = unique.into_iter().map(|day| (day, days.get(&day))).collect();

    for (day, activity) in &week {
        if let Some(activity) = activity {
            activity.validate(day)?;
        }
    }

    let achieved = event.rule.measure(&week);
    Ok(EventProgress::from_counts(achieved, event.rule.required()))
}
