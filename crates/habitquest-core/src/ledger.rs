//! Event history ledger.
//!
//! Records, once per week, that the weekly event was completed and how much
//! experience it granted. The first write for a week wins; later calls are
//! no-ops even when they name a different event or reward.

use std::collections::btree_map::{BTreeMap, Entry};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::WeekKey;
use crate::error::{CoreError, Result};

/// A recorded completion. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHistoryEntry {
    pub event_id: String,
    pub xp_awarded: u32,
    pub completed_at: DateTime<Utc>,
}

/// Completed weekly events keyed by week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventHistory {
    entries: BTreeMap<WeekKey, EventHistoryEntry>,
}

impl EventHistory {
    pub fn get(&self, week: &WeekKey) -> Option<&EventHistoryEntry> {
        self.entries.get(week)
    }

    pub fn contains(&self, week: &WeekKey) -> bool {
        self.entries.contains_key(week)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in week order, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&WeekKey, &EventHistoryEntry)> {
        self.entries.iter()
    }

    /// Sum of all awarded experience.
    pub fn total_xp(&self) -> u64 {
        self.entries.values().map(|e| u64::from(e.xp_awarded)).sum()
    }

    /// Fails with [`CoreError::CatalogMismatch`] when the week was recorded
    /// under a different event than `selected_id`. Not fatal: the recorded
    /// entry stays authoritative.
    pub fn ensure_matches(&self, week: &WeekKey, selected_id: &str) -> Result<()> {
        match self.entries.get(week) {
            Some(entry) if entry.event_id != selected_id => Err(CatalogMismatch {
                week: *week,
                recorded: entry.event_id.clone(),
                selected: selected_id.to_string(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    /// Insert unless the week already has an entry; never overwrites.
    pub(crate) fn insert_new(&mut self, week: WeekKey, entry: EventHistoryEntry) -> bool {
        match self.entries.entry(week) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
            Entry::Occupied(_) => false,
        }
    }
}

/// The event and reward a caller wants to record for a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAward {
    pub id: String,
    pub xp: u32,
}

impl EventAward {
    pub fn new(id: impl Into<String>, xp: u32) -> Self {
        Self { id: id.into(), xp }
    }
}

/// A recorded event id that differs from the currently selected one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogMismatch {
    pub week: WeekKey,
    pub recorded: String,
    pub selected: String,
}

impl From<CatalogMismatch> for CoreError {
    fn from(m: CatalogMismatch) -> Self {
        CoreError::CatalogMismatch {
            week: m.week.to_string(),
            recorded: m.recorded,
            selected: m.selected,
        }
    }
}

/// Result of [`complete_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// A new entry was written and its experience awarded.
    Recorded(EventHistoryEntry),
    /// The week was already recorded; nothing changed.
    AlreadyRecorded {
        entry: EventHistoryEntry,
        mismatch: Option<CatalogMismatch>,
    },
}

impl CompletionOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, CompletionOutcome::Recorded(_))
    }

    pub fn entry(&self) -> &EventHistoryEntry {
        match self {
            CompletionOutcome::Recorded(entry) => entry,
            CompletionOutcome::AlreadyRecorded { entry, .. } => entry,
        }
    }
}

/// Storage seam for the ledger.
///
/// `insert_if_absent` must write the entry and add its experience as one
/// atomic step, or change nothing.
pub trait LedgerStore {
    fn history_entry(&self, week: &WeekKey) -> Option<&EventHistoryEntry>;

    /// Returns the existing entry when the week is already recorded.
    fn insert_if_absent(
        &mut self,
        week: WeekKey,
        entry: EventHistoryEntry,
    ) -> Result<Option<EventHistoryEntry>>;
}

/// Record completion of the event for `week_key`, at most once per week.
pub fn complete_event<S>(
    store: &mut S,
    week_key: &str,
    award: &EventAward,
    completed_at: DateTime<Utc>,
) -> Result<CompletionOutcome>
where
    S: LedgerStore + ?Sized,
{
    let week = WeekKey::parse(week_key)?;
    complete_event_for(store, week, award, completed_at)
}

/// Same as [`complete_event`] for an already parsed week.
pub fn complete_event_for<S>(
    store: &mut S,
    week: WeekKey,
    award: &EventAward,
    completed_at: DateTime<Utc>,
) -> Result<CompletionOutcome>
where
    S: LedgerStore + ?Sized,
{
    if award.id.trim().is_empty() {
        return Err(CoreError::invalid_value("event id", "must not be empty"));
    }

    let entry = EventHistoryEntry {
        event_id: award.id.clone(),
        xp_awarded: award.xp,
        completed_at,
    };

    match store.insert_if_absent(week, entry.clone())? {
        None => {
            tracing::info!(week = %week, event_id = %entry.event_id, xp = entry.xp_awarded, "recorded weekly event completion");
            Ok(CompletionOutcome::Recorded(entry))
        }
        Some(existing) => {
            let mismatch = (existing.event_id != award.id).then(|| CatalogMismatch {
                week,
                recorded: existing.event_id.clone(),
                selected: award.id.clone(),
            });
            match &mismatch {
                Some(m) => tracing::warn!(
                    week = %week,
                    recorded = %m.recorded,
                    selected = %m.selected,
                    "weekly event already recorded under a different id"
                ),
                None => tracing::debug!(week = %week, "weekly event already recorded"),
            }
            Ok(CompletionOutcome::AlreadyRecorded {
                entry: existing,
                mismatch,
            })
        }
    }
}
