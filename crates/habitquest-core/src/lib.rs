//! # habitquest Core Library
//!
//! This library provides the gamification logic of the habitquest habit
//! tracker. Every computation is a synchronous function over an in-memory
//! state snapshot; loading and saving that snapshot is left to the caller.
//!
//! ## Architecture
//!
//! - **Calendar**: maps a timestamp to its ISO week key and seven day keys
//! - **Events**: a versioned catalog of weekly challenges, one selected per
//!   week, and the completion percentage of the selected challenge
//! - **Ledger**: records each week's completion once and awards experience
//! - **Chains**: ordered achievement steps that complete strictly in order
//! - **Level**: fixed experience thresholds and the reward track
//!
//! ## Key Components
//!
//! - [`ProgressEngine`]: Facade used by the dashboard
//! - [`ProgressState`]: The snapshot the engine reads and mutates
//! - [`EventCatalog`]: Weekly event definitions and selection
//! - [`EngineConfig`]: TOML configuration

pub mod calendar;
pub mod chains;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod level;
pub mod locale;
pub mod state;

pub use calendar::{Clock, DayKey, FixedClock, SystemClock, WeekKey, WeekRange};
pub use chains::{
    compute_chains, top_chain, ChainCatalog, ChainDefinition, ChainProgress, ChainStep,
    StepCondition,
};
pub use config::{data_dir, EngineConfig};
pub use engine::{ArchivedEvent, ProgressEngine, WeeklyStatus};
pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use events::{compute_event_progress, CompletionRule, EventCatalog, EventProgress, WeeklyEvent};
pub use ledger::{
    complete_event, complete_event_for, CatalogMismatch, CompletionOutcome, EventAward,
    EventHistory, EventHistoryEntry, LedgerStore,
};
pub use level::{LevelCurve, LevelProgress, RewardMilestone, RewardTrack};
pub use locale::LocalizedText;
pub use state::{ActivityLog, DayActivity, ProgressState};
