//! Weekly events: the rotating catalog and per-week progress.

mod catalog;
mod progress;
mod rule;

pub use catalog::{EventCatalog, WeeklyEvent, BUILTIN_CATALOG_VERSION};
pub use progress::{compute_event_progress, EventProgress};
pub use rule::CompletionRule;
