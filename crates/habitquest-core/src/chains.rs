//! Achievement chains.
//!
//! A chain is an ordered list of steps. Step `k` only counts once steps
//! `0..k` are complete, so a satisfied condition further down the chain is
//! ignored until its predecessors catch up. Chains share nothing but the
//! read-only snapshot they are evaluated against.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::calendar::DayKey;
use crate::error::{CoreError, Result, ValidationError};
use crate::level::LevelCurve;
use crate::locale::LocalizedText;
use crate::state::ProgressState;

/// Condition of a chain step, evaluated against the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepCondition {
    /// Total days with any tracked activity
    ActiveDays { required: u64 },
    /// Total habit check-ins
    CheckIns { required: u64 },
    /// Longest run of consecutive active days
    LongestStreak { required: u64 },
    /// Total days with a journal entry
    JournalDays { required: u64 },
    /// Weekly events recorded in the ledger
    EventsCompleted { required: u64 },
    /// Experience total
    Experience { required: u64 },
    /// Current level
    Level { required: u64 },
    /// An application-maintained counter
    Counter { key: String, required: u64 },
}

impl StepCondition {
    pub fn required(&self) -> u64 {
        match self {
            StepCondition::ActiveDays { required }
            | StepCondition::CheckIns { required }
            | StepCondition::LongestStreak { required }
            | StepCondition::JournalDays { required }
            | StepCondition::EventsCompleted { required }
            | StepCondition::Experience { required }
            | StepCondition::Level { required }
            | StepCondition::Counter { required, .. } => *required,
        }
    }

    /// The measured value this condition compares against `required`.
    pub fn current(&self, stats: &SnapshotStats<'_>) -> u64 {
        match self {
            StepCondition::ActiveDays { .. } => stats.active_days,
            StepCondition::CheckIns { .. } => stats.check_ins,
            StepCondition::LongestStreak { .. } => stats.longest_streak,
            StepCondition::JournalDays { .. } => stats.journal_days,
            StepCondition::EventsCompleted { .. } => stats.events_completed,
            StepCondition::Experience { .. } => stats.experience,
            StepCondition::Level { .. } => u64::from(stats.level),
            StepCondition::Counter { key, .. } => stats.counters.get(key).copied().unwrap_or(0),
        }
    }

    pub fn is_satisfied(&self, stats: &SnapshotStats<'_>) -> bool {
        self.current(stats) >= self.required()
    }

    /// Progress toward this condition, 0.0..=100.0.
    pub fn percent(&self, stats: &SnapshotStats<'_>) -> f64 {
        let required = self.required().max(1) as f64;
        (self.current(stats) as f64 * 100.0 / required).min(100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStep {
    pub title: LocalizedText,
    pub condition: StepCondition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDefinition {
    pub id: String,
    pub title: LocalizedText,
    pub steps: Vec<ChainStep>,
}

/// Progress along one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainProgress {
    pub id: String,
    pub title: String,
    /// Length of the completed prefix
    pub completed: usize,
    pub total: usize,
    /// Progress toward step `completed`, 100 when the chain is done
    pub next_percent: f64,
    pub next_title: Option<String>,
}

impl ChainProgress {
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Aggregates over a snapshot, computed once per evaluation.
#[derive(Debug, Clone)]
pub struct SnapshotStats<'a> {
    pub active_days: u64,
    pub check_ins: u64,
    pub journal_days: u64,
    pub longest_streak: u64,
    pub events_completed: u64,
    pub experience: u64,
    pub level: u32,
    pub counters: &'a BTreeMap<String, u64>,
}

impl<'a> SnapshotStats<'a> {
    pub fn collect(state: &'a ProgressState, levels: &LevelCurve) -> Result<Self> {
        let experience = state.experience()?;

        let mut active_days = 0u64;
        let mut check_ins = 0u64;
        let mut journal_days = 0u64;
        let mut longest_streak = 0u64;
        let mut run = 0u64;
        let mut previous: Option<&DayKey> = None;

        // The log is ordered by day, so runs can be counted in one pass.
        for (day, activity) in &state.days {
            activity.validate(day)?;
            check_ins += u64::from(activity.check_ins);
            if activity.journaled {
                journal_days += 1;
            }

            if activity.is_active() {
                active_days += 1;
                run = match previous {
                    Some(prev) if prev.is_followed_by(day) => run + 1,
                    _ => 1,
                };
                previous = Some(day);
                longest_streak = longest_streak.max(run);
            } else {
                run = 0;
                previous = None;
            }
        }

        Ok(Self {
            active_days,
            check_ins,
            journal_days,
            longest_streak,
            events_completed: state.event_history.len() as u64,
            experience,
            level: levels.level_for_xp(experience),
            counters: &state.counters,
        })
    }
}

/// The ordered set of chains the application defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainCatalog {
    chains: Vec<ChainDefinition>,
}

impl ChainCatalog {
    /// Build a catalog, rejecting empty chains, duplicate ids and zero thresholds.
    pub fn new(chains: Vec<ChainDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for chain in &chains {
            if !seen.insert(chain.id.as_str()) {
                return Err(ValidationError::DuplicateId {
                    collection: "chain catalog".to_string(),
                    id: chain.id.clone(),
                }
                .into());
            }
            if chain.steps.is_empty() {
                return Err(ValidationError::EmptyCollection(format!("chain '{}'", chain.id)).into());
            }
            if let Some(index) = chain.steps.iter().position(|s| s.condition.required() == 0) {
                return Err(CoreError::invalid_value(
                    format!("chains.{}.steps[{index}].required", chain.id),
                    "must be at least 1",
                ));
            }
        }
        Ok(Self { chains })
    }

    pub fn chains(&self) -> &[ChainDefinition] {
        &self.chains
    }

    pub fn builtin() -> Self {
        Self {
            chains: builtin_chains(),
        }
    }
}

impl Default for ChainCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Evaluate one chain against precomputed stats.
pub fn evaluate_chain(chain: &ChainDefinition, stats: &SnapshotStats<'_>, locale: &str) -> ChainProgress {
    let completed = chain
        .steps
        .iter()
        .take_while(|step| step.condition.is_satisfied(stats))
        .count();

    let (next_percent, next_title) = match chain.steps.get(completed) {
        Some(next) => (next.condition.percent(stats), Some(next.title.get(locale).to_string())),
        None => (100.0, None),
    };

    ChainProgress {
        id: chain.id.clone(),
        title: chain.title.get(locale).to_string(),
        completed,
        total: chain.steps.len(),
        next_percent,
        next_title,
    }
}

/// Evaluate every chain of `catalog`, in catalog order.
pub fn compute_chains(
    catalog: &ChainCatalog,
    state: &ProgressState,
    levels: &LevelCurve,
    locale: &str,
) -> Result<Vec<ChainProgress>> {
    let stats = SnapshotStats::collect(state, levels)?;
    Ok(catalog
        .chains
        .iter()
        .map(|chain| evaluate_chain(chain, &stats, locale))
        .collect())
}

/// The unfinished chain closest to its next step. Earlier chains win ties.
pub fn top_chain(chains: &[ChainProgress]) -> Option<&ChainProgress> {
    chains
        .iter()
        .filter(|c| !c.is_complete())
        .fold(None, |best: Option<&ChainProgress>, c| match best {
            Some(b) if b.next_percent >= c.next_percent => Some(b),
            _ => Some(c),
        })
}

fn step(de: &str, en: &str, condition: StepCondition) -> ChainStep {
    ChainStep {
        title: LocalizedText::new([("de", de), ("en", en)]),
        condition,
    }
}

fn chain(id: &str, de: &str, en: &str, steps: Vec<ChainStep>) -> ChainDefinition {
    ChainDefinition {
        id: id.to_string(),
        title: LocalizedText::new([("de", de), ("en", en)]),
        steps,
    }
}

fn builtin_chains() -> Vec<ChainDefinition> {
    use StepCondition::*;

    vec![
        chain(
            "consistency",
            "Beständigkeit",
            "Consistency",
            vec![
                step("Erster Schritt", "First step", ActiveDays { required: 1 }),
                step("Eine Woche dabei", "One week in", ActiveDays { required: 7 }),
                step("Ein Monat dabei", "One month in", ActiveDays { required: 30 }),
                step("Hundert Tage", "Hundred days", ActiveDays { required: 100 }),
            ],
        ),
        chain(
            "streaks",
            "Serien",
            "Streaks",
            vec![
                step("Drei am Stück", "Three in a row", LongestStreak { required: 3 }),
                step("Eine Woche am Stück", "A week in a row", LongestStreak { required: 7 }),
                step("Zwei Wochen am Stück", "Two weeks in a row", LongestStreak { required: 14 }),
                step("Ein Monat am Stück", "A month in a row", LongestStreak { required: 30 }),
            ],
        ),
        chain(
            "habits",
            "Gewohnheiten",
            "Habits",
            vec![
                step("10 abgehakt", "10 checked off", CheckIns { required: 10 }),
                step("100 abgehakt", "100 checked off", CheckIns { required: 100 }),
                step("500 abgehakt", "500 checked off", CheckIns { required: 500 }),
                step("1000 abgehakt", "1000 checked off", CheckIns { required: 1000 }),
            ],
        ),
        chain(
            "weekly_events",
            "Wochen-Events",
            "Weekly events",
            vec![
                step("Erstes Event", "First event", EventsCompleted { required: 1 }),
                step("Vier Events", "Four events", EventsCompleted { required: 4 }),
                step("Zwölf Events", "Twelve events", EventsCompleted { required: 12 }),
                step("Halbes Jahr", "Half a year", EventsCompleted { required: 26 }),
            ],
        ),
        chain(
            "journal",
            "Tagebuch",
            "Journal",
            vec![
                step("Erster Eintrag", "First entry", JournalDays { required: 1 }),
                step("Zehn Einträge", "Ten entries", JournalDays { required: 10 }),
                step("Fünfzig Einträge", "Fifty entries", JournalDays { required: 50 }),
            ],
        ),
        chain(
            "ascent",
            "Aufstieg",
            "Ascent",
            vec![
                step("Level 5", "Level 5", Level { required: 5 }),
                step("Level 10", "Level 10", Level { required: 10 }),
                step("Level 25", "Level 25", Level { required: 25 }),
                step("Level 50", "Level 50", Level { required: 50 }),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DayActivity;

    fn state_with_days(days: &[&str]) -> ProgressState {
        let mut state = ProgressState::new();
        for d in days {
            state
                .record_day(DayKey::parse(d).unwrap(), DayActivity { check_ins: 1, ..Default::default() })
                .unwrap();
        }
        state
    }

    fn three_step_chain() -> ChainDefinition {
        chain(
            "test",
            "Test",
            "Test",
            vec![
                step("Eins", "One", StepCondition::ActiveDays { required: 1 }),
                step("Serie", "Streak", StepCondition::LongestStreak { required: 5 }),
                step("Drei", "Three", StepCondition::CheckIns { required: 3 }),
            ],
        )
    }

    #[test]
    fn satisfied_step_after_gap_does_not_count() {
        // Steps 0 and 2 satisfied, step 1 (streak of 5) only at 2
        let state = state_with_days(&["2024-03-04", "2024-03-05", "2024-03-08"]);
        let catalog = ChainCatalog::new(vec![three_step_chain()]).unwrap();

        let progress = compute_chains(&catalog, &state, &LevelCurve::default(), "de").unwrap();

        assert_eq!(progress.len(), 1);
        let p = &progress[0];
        assert_eq!(p.completed, 1);
        assert_eq!(p.total, 3);
        assert_eq!(p.next_title.as_deref(), Some("Serie"));
        assert!((p.next_percent - 40.0).abs() < 1e-9);
    }

    #[test]
    fn completed_chain_has_no_next_step() {
        let state = state_with_days(&[
            "2024-03-04", "2024-03-05", "2024-03-06", "2024-03-07", "2024-03-08",
        ]);
        let catalog = ChainCatalog::new(vec![three_step_chain()]).unwrap();
        let progress = compute_chains(&catalog, &state, &LevelCurve::default(), "en").unwrap();

        assert_eq!(progress[0].completed, 3);
        assert!(progress[0].is_complete());
        assert_eq!(progress[0].next_percent, 100.0);
        assert_eq!(progress[0].next_title, None);
        assert_eq!(progress[0].title, "Test");
    }

    #[test]
    fn empty_state_starts_every_chain_at_zero() {
        let progress = compute_chains(
            &ChainCatalog::builtin(),
            &ProgressState::new(),
            &LevelCurve::default(),
            "de",
        )
        .unwrap();
        assert_eq!(progress.len(), ChainCatalog::builtin().chains().len());
        for p in &progress {
            assert_eq!(p.completed, 0);
            assert!(p.next_title.is_some());
        }
    }

    #[test]
    fn stats_count_streaks_across_weeks() {
        let state = state_with_days(&["2024-03-09", "2024-03-10", "2024-03-11", "2024-03-13"]);
        let stats = SnapshotStats::collect(&state, &LevelCurve::default()).unwrap();
        assert_eq!(stats.active_days, 4);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.check_ins, 4);
    }

    #[test]
    fn inactive_day_breaks_streak() {
        let mut state = state_with_days(&["2024-03-04", "2024-03-06"]);
        state.record_day(DayKey::parse("2024-03-05").unwrap(), DayActivity::default()).unwrap();
        let stats = SnapshotStats::collect(&state, &LevelCurve::default()).unwrap();
        assert_eq!(stats.longest_streak, 1);
    }

    #[test]
    fn counter_and_level_conditions() {
        let mut state = ProgressState::new();
        state.counters.insert("water_goals".to_string(), 2);
        state.xp = 240;
        let stats = SnapshotStats::collect(&state, &LevelCurve::default()).unwrap();

        let counter = StepCondition::Counter { key: "water_goals".to_string(), required: 4 };
        assert_eq!(counter.percent(&stats), 50.0);
        assert!(!counter.is_satisfied(&stats));
        assert!(StepCondition::Level { required: 3 }.is_satisfied(&stats));
        assert!(StepCondition::Experience { required: 240 }.is_satisfied(&stats));
    }

    #[test]
    fn negative_experience_fails_evaluation() {
        let state = ProgressState { xp: -3, ..Default::default() };
        let result = compute_chains(&ChainCatalog::builtin(), &state, &LevelCurve::default(), "de");
        assert!(matches!(result, Err(CoreError::InvalidState(_))));
    }

    #[test]
    fn catalog_validation() {
        assert!(ChainCatalog::new(ChainCatalog::builtin().chains().to_vec()).is_ok());

        let mut empty = three_step_chain();
        empty.steps.clear();
        assert!(ChainCatalog::new(vec![empty]).is_err());

        assert!(ChainCatalog::new(vec![three_step_chain(), three_step_chain()]).is_err());

        let mut zero = three_step_chain();
        zero.steps[1].condition = StepCondition::LongestStreak { required: 0 };
        assert!(ChainCatalog::new(vec![zero]).is_err());
    }

    #[test]
    fn top_chain_prefers_highest_next_percent() {
        let p = |id: &str, completed, total, next_percent| ChainProgress {
            id: id.to_string(),
            title: id.to_string(),
            completed,
            total,
            next_percent,
            next_title: None,
        };
        let chains = vec![p("a", 1, 3, 20.0), p("b", 3, 3, 100.0), p("c", 0, 2, 60.0), p("d", 0, 2, 60.0)];
        assert_eq!(top_chain(&chains).unwrap().id, "c");
        assert!(top_chain(&[p("done", 2, 2, 100.0)]).is_none());
    }
}
