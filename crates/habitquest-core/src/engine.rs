//! Progress engine facade.
//!
//! Wires the calendar, event catalog, ledger, chains and level curve
//! together the way the application's dashboard consumes them: compute this
//! week's status, record a completion once it happens, list chains, and
//! resolve the level and next reward.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::calendar::{WeekKey, WeekRange};
use crate::chains::{compute_chains, top_chain, ChainCatalog, ChainProgress};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::events::{compute_event_progress, EventCatalog, EventProgress, WeeklyEvent};
use crate::ledger::{complete_event_for, CompletionOutcome, EventAward, EventHistoryEntry};
use crate::level::{LevelCurve, LevelProgress, RewardMilestone, RewardTrack};
use crate::locale::PRIMARY_LOCALE;
use crate::state::ProgressState;

/// Everything the dashboard shows about the current week's event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyStatus {
    pub week: WeekRange,
    pub event: WeeklyEvent,
    /// Progress computed from this week's activity
    pub progress: EventProgress,
    /// Ledger entry, when the week was already recorded
    pub recorded: Option<EventHistoryEntry>,
    /// Computed or recorded completion
    pub completed: bool,
    pub events_enabled: bool,
}

impl WeeklyStatus {
    /// Percentage to display; a recorded week always shows as done.
    pub fn display_percent(&self) -> u8 {
        if self.recorded.is_some() {
            EventProgress::recorded().percent
        } else {
            self.progress.percent
        }
    }

    /// Completed but not in the ledger yet.
    pub fn needs_recording(&self) -> bool {
        self.events_enabled && self.progress.completed && self.recorded.is_none()
    }
}

/// A ledger entry joined with its catalog definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchivedEvent {
    pub week_key: WeekKey,
    pub entry: EventHistoryEntry,
    /// Localized title, `None` when the id is no longer in the catalog
    pub title: Option<String>,
}

/// The progress engine with its catalogs and settings.
#[derive(Debug, Clone)]
pub struct ProgressEngine {
    events: EventCatalog,
    chains: ChainCatalog,
    levels: LevelCurve,
    rewards: RewardTrack,
    events_enabled: bool,
    locale: String,
}

impl Default for ProgressEngine {
    fn default() -> Self {
        Self::new(
            EventCatalog::builtin(),
            ChainCatalog::builtin(),
            LevelCurve::default(),
            RewardTrack::builtin(),
        )
    }
}

impl ProgressEngine {
    pub fn new(
        events: EventCatalog,
        chains: ChainCatalog,
        levels: LevelCurve,
        rewards: RewardTrack,
    ) -> Self {
        Self {
            events,
            chains,
            levels,
            rewards,
            events_enabled: true,
            locale: PRIMARY_LOCALE.to_string(),
        }
    }

    /// Build from configuration, loading a custom event catalog if configured.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let events = match &config.catalog_path {
            Some(path) => {
                let catalog = EventCatalog::load(path)?;
                tracing::debug!(path = %path.display(), version = %catalog.version(), "loaded custom event catalog");
                catalog
            }
            None => EventCatalog::builtin(),
        };

        Ok(Self::new(events, ChainCatalog::builtin(), config.level, RewardTrack::builtin())
            .with_events_enabled(config.events_enabled)
            .with_locale(&config.locale))
    }

    pub fn with_events_enabled(mut self, enabled: bool) -> Self {
        self.events_enabled = enabled;
        self
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }

    pub fn events(&self) -> &EventCatalog {
        &self.events
    }

    pub fn levels(&self) -> &LevelCurve {
        &self.levels
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Status of the week containing `now`.
    pub fn weekly_status<Tz: TimeZone>(
        &self,
        state: &ProgressState,
        now: &DateTime<Tz>,
    ) -> Result<WeeklyStatus> {
        let week = WeekRange::for_timestamp(now)?;
        self.status_for_week(state, week)
    }

    /// Status of an explicit week.
    pub fn status_for_week(&self, state: &ProgressState, week: WeekRange) -> Result<WeeklyStatus> {
        let event = self.events.select(&week.week_key);
        let progress = compute_event_progress(&week.day_keys, &state.days, event)?;
        let recorded = state.event_history.get(&week.week_key).cloned();

        if let Err(mismatch) = state.event_history.ensure_matches(&week.week_key, &event.id) {
            tracing::warn!(error = %mismatch, "keeping recorded weekly event");
        }

        Ok(WeeklyStatus {
            completed: progress.completed || recorded.is_some(),
            week,
            event: event.clone(),
            progress,
            recorded,
            events_enabled: self.events_enabled,
        })
    }

    /// Record this week's event if it was just completed.
    ///
    /// Returns the new ledger entry exactly when the week went from
    /// unrecorded to recorded; callers use that as their celebration signal.
    pub fn sync_weekly_completion<Tz: TimeZone>(
        &self,
        state: &mut ProgressState,
        now: &DateTime<Tz>,
    ) -> Result<Option<EventHistoryEntry>> {
        if !self.events_enabled {
            return Ok(None);
        }

        let status = self.weekly_status(state, now)?;
        if !status.needs_recording() {
            return Ok(None);
        }

        let award = EventAward::new(status.event.id.clone(), status.event.xp);
        let outcome = complete_event_for(state, status.week.week_key, &award, now.with_timezone(&Utc))?;
        Ok(match outcome {
            CompletionOutcome::Recorded(entry) => Some(entry),
            CompletionOutcome::AlreadyRecorded { .. } => None,
        })
    }

    /// Recorded events, newest week first.
    pub fn event_archive(&self, state: &ProgressState) -> Vec<ArchivedEvent> {
        state
            .event_history
            .iter()
            .rev()
            .map(|(week, entry)| {
                let title = self.events.get(&entry.event_id).map(|e| e.title(&self.locale).to_string());
                if title.is_none() {
                    tracing::debug!(week = %week, event_id = %entry.event_id, "archived event not in catalog");
                }
                ArchivedEvent {
                    week_key: *week,
                    entry: entry.clone(),
                    title,
                }
            })
            .collect()
    }

    pub fn chains(&self, state: &ProgressState) -> Result<Vec<ChainProgress>> {
        compute_chains(&self.chains, state, &self.levels, &self.locale)
    }

    /// The chain to tease on the dashboard.
    pub fn top_chain(&self, state: &ProgressState) -> Result<Option<ChainProgress>> {
        let chains = self.chains(state)?;
        Ok(top_chain(&chains).cloned())
    }

    pub fn level(&self, state: &ProgressState) -> Result<LevelProgress> {
        self.levels.progress(state.xp)
    }

    pub fn next_reward(&self, state: &ProgressState) -> Result<Option<&RewardMilestone>> {
        let level = self.levels.level_for(state.xp)?;
        Ok(self.rewards.next_reward(level))
    }
}
