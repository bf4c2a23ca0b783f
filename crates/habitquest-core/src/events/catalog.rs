//! Versioned catalog of weekly events and the per-week selector.
//!
//! Selection is `week index mod catalog size`: every week maps to exactly one
//! event, the same week always maps to the same event for an unchanged
//! catalog, and an event repeats exactly every `len` weeks. Catalogs should
//! only ever be appended to; any change shifts the mapping of weeks that have
//! not been recorded in the ledger yet.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::rule::CompletionRule;
use crate::calendar::WeekKey;
use crate::error::{CoreError, Result, ValidationError};
use crate::locale::LocalizedText;

/// Version tag of [`EventCatalog::builtin`].
pub const BUILTIN_CATALOG_VERSION: &str = "2024.1";

/// An immutable weekly challenge definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyEvent {
    pub id: String,
    pub title: LocalizedText,
    pub description: LocalizedText,
    /// Experience granted on completion
    pub xp: u32,
    /// Bonus as a fraction (0.1 = 10 %)
    #[serde(default)]
    pub bonus_percent: f64,
    pub rule: CompletionRule,
}

impl WeeklyEvent {
    pub fn title(&self, locale: &str) -> &str {
        self.title.get(locale)
    }

    pub fn description(&self, locale: &str) -> &str {
        self.description.get(locale)
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(CoreError::invalid_value("events.id", "must not be empty"));
        }
        if self.title.is_empty() {
            return Err(CoreError::invalid_value(
                format!("events.{}.title", self.id),
                "needs at least one translation",
            ));
        }
        if !self.bonus_percent.is_finite() || self.bonus_percent < 0.0 {
            return Err(CoreError::invalid_value(
                format!("events.{}.bonus_percent", self.id),
                format!("{} is not a non-negative fraction", self.bonus_percent),
            ));
        }
        self.rule.validate(&self.id)
    }
}

/// Ordered list of weekly events with a version tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventCatalog {
    version: String,
    events: Vec<WeeklyEvent>,
}

#[derive(Deserialize)]
struct CatalogFile {
    version: String,
    #[serde(default)]
    events: Vec<WeeklyEvent>,
}

impl EventCatalog {
    /// Build a catalog, rejecting empty catalogs, duplicate ids and invalid rules.
    pub fn new(version: impl Into<String>, events: Vec<WeeklyEvent>) -> Result<Self> {
        if events.is_empty() {
            return Err(ValidationError::EmptyCollection("event catalog".to_string()).into());
        }

        let mut seen = HashSet::new();
        for event in &events {
            event.validate()?;
            if !seen.insert(event.id.as_str()) {
                return Err(ValidationError::DuplicateId {
                    collection: "event catalog".to_string(),
                    id: event.id.clone(),
                }
                .into());
            }
        }

        Ok(Self {
            version: version.into(),
            events,
        })
    }

    /// Parse a catalog from TOML (`version = "..."` plus `[[events]]` tables).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.version, file.events)
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The event active during `week`.
    pub fn select(&self, week: &WeekKey) -> &WeeklyEvent {
        // `new` guarantees a non-empty catalog, so the index is in bounds.
        let len = self.events.len() as i64;
        let slot = week.index().rem_euclid(len) as usize;
        &self.events[slot]
    }

    pub fn get(&self, id: &str) -> Option<&WeeklyEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn events(&self) -> &[WeeklyEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The catalog shipped with the application. Append-only.
    pub fn builtin() -> Self {
        Self {
            version: BUILTIN_CATALOG_VERSION.to_string(),
            events: builtin_events(),
        }
    }
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn event(
    id: &str,
    title: [(&str, &str); 2],
    description: [(&str, &str); 2],
    xp: u32,
    bonus_percent: f64,
    rule: CompletionRule,
) -> WeeklyEvent {
    WeeklyEvent {
        id: id.to_string(),
        title: LocalizedText::new(title),
        description: LocalizedText::new(description),
        xp,
        bonus_percent,
        rule,
    }
}

fn builtin_events() -> Vec<WeeklyEvent> {
    vec![
        event(
            "active_week",
            [("de", "Aktive Woche"), ("en", "Active week")],
            [
                ("de", "Sei an 3 Tagen dieser Woche aktiv."),
                ("en", "Be active on 3 days this week."),
            ],
            50,
            0.05,
            CompletionRule::ActiveDays { required: 3 },
        ),
        event(
            "habit_marathon",
            [("de", "Gewohnheits-Marathon"), ("en", "Habit marathon")],
            [
                ("de", "Hake diese Woche 15 Gewohnheiten ab."),
                ("en", "Check off 15 habits this week."),
            ],
            60,
            0.1,
            CompletionRule::CheckIns { required: 15 },
        ),
        event(
            "journal_week",
            [("de", "Schreibwoche"), ("en", "Journal week")],
            [
                ("de", "Schreibe an 4 Tagen einen Tagebucheintrag."),
                ("en", "Write a journal entry on 4 days."),
            ],
            40,
            0.05,
            CompletionRule::JournalDays { required: 4 },
        ),
        event(
            "five_in_a_row",
            [("de", "Fünf am Stück"), ("en", "Five in a row")],
            [
                ("de", "Sei 5 Tage hintereinander aktiv."),
                ("en", "Be active 5 days in a row."),
            ],
            80,
            0.15,
            CompletionRule::Streak { required: 5 },
        ),
        event(
            "move_minutes",
            [("de", "Aktive Minuten"), ("en", "Active minutes")],
            [
                ("de", "Sammle diese Woche 150 aktive Minuten."),
                ("en", "Collect 150 active minutes this week."),
            ],
            70,
            0.1,
            CompletionRule::ActiveMinutes { required: 150 },
        ),
        event(
            "strong_days",
            [("de", "Starke Tage"), ("en", "Strong days")],
            [
                ("de", "Erreiche an 3 Tagen mindestens 3 Gewohnheiten."),
                ("en", "Complete at least 3 habits on 3 days."),
            ],
            75,
            0.1,
            CompletionRule::StrongDays { required: 3, min_check_ins: 3 },
        ),
        event(
            "almost_perfect",
            [("de", "Fast perfekt"), ("en", "Almost perfect")],
            [
                ("de", "Sei an 6 Tagen dieser Woche aktiv."),
                ("en", "Be active on 6 days this week."),
            ],
            100,
            0.2,
            CompletionRule::ActiveDays { required: 6 },
        ),
        event(
            "full_week",
            [("de", "Volle Woche"), ("en", "Full week")],
            [
                ("de", "Sei jeden Tag dieser Woche aktiv."),
                ("en", "Be active every day this week."),
            ],
            120,
            0.25,
            CompletionRule::Streak { required: 7 },
        ),
    ]
}
