//! The state snapshot the engine reads and mutates.
//!
//! Loading and saving the snapshot is the caller's business; the engine only
//! works on an in-memory value. The JSON shape uses camelCase keys
//! (`days`, `eventHistory`, `xp`, `counters`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calendar::{DayKey, WeekKey};
use crate::error::{CoreError, Result};
use crate::ledger::{EventHistory, EventHistoryEntry, LedgerStore};

/// What the user did on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DayActivity {
    /// Habits checked off
    pub check_ins: u32,
    /// Minutes of tracked activity
    pub active_minutes: u32,
    /// Whether a journal entry was written
    pub journaled: bool,
    /// Mood rating 1..=5
    pub mood: Option<u8>,
}

impl DayActivity {
    /// A day counts as active once anything was tracked.
    pub fn is_active(&self) -> bool {
        self.check_ins > 0 || self.active_minutes > 0 || self.journaled
    }

    pub fn validate(&self, day: &DayKey) -> Result<()> {
        match self.mood {
            Some(mood) if !(1..=5).contains(&mood) => Err(CoreError::invalid_value(
                format!("days.{day}.mood"),
                format!("{mood} is outside 1..=5"),
            )),
            _ => Ok(()),
        }
    }
}

/// Per-day activity records keyed by day.
pub type ActivityLog = BTreeMap<DayKey, DayActivity>;

/// Snapshot of everything the progress engine needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressState {
    pub days: ActivityLog,
    pub event_history: EventHistory,
    /// Experience total. Signed so that corrupted snapshots are detectable.
    pub xp: i64,
    /// Other achievement-relevant counters, maintained by the application.
    pub counters: BTreeMap<String, u64>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let state: ProgressState = serde_json::from_str(json)
            .map_err(|e| CoreError::invalid_value("state", e.to_string()))?;
        state.validate()?;
        Ok(state)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every activity record and the experience total.
    pub fn validate(&self) -> Result<()> {
        for (day, activity) in &self.days {
            activity.validate(day)?;
        }
        self.experience()?;
        Ok(())
    }

    /// The experience total, rejecting negative values.
    pub fn experience(&self) -> Result<u64> {
        u64::try_from(self.xp)
            .map_err(|_| CoreError::InvalidState(format!("negative experience total {}", self.xp)))
    }

    /// Record or replace one day's activity.
    pub fn record_day(&mut self, day: DayKey, activity: DayActivity) -> Result<()> {
        activity.validate(&day)?;
        self.days.insert(day, activity);
        Ok(())
    }

    pub fn counter(&self, key: &str) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }
}

impl LedgerStore for ProgressState {
    fn history_entry(&self, week: &WeekKey) -> Option<&EventHistoryEntry> {
        self.event_history.get(week)
    }

    fn insert_if_absent(
        &mut self,
        week: WeekKey,
        entry: EventHistoryEntry,
    ) -> Result<Option<EventHistoryEntry>> {
        if let Some(existing) = self.event_history.get(&week) {
            return Ok(Some(existing.clone()));
        }

        let current = self.experience()?;
        let next = current
            .checked_add(u64::from(entry.xp_awarded))
            .and_then(|xp| i64::try_from(xp).ok())
            .ok_or_else(|| CoreError::InvalidState("experience total overflow".to_string()))?;

        // Both writes happen under the same exclusive borrow.
        self.event_history.insert_new(week, entry);
        self.xp = next;
        Ok(None)
    }
}
