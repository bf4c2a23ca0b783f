//! Calendar mapping from timestamps to ISO weeks and their days.
//!
//! Weeks are ISO-8601 weeks (Monday first). A timestamp is mapped using the
//! calendar date in its own offset, so the result only depends on the date.

mod clock;
mod week;

pub use clock::{Clock, FixedClock, SystemClock};
pub use week::{DayKey, WeekKey, WeekRange};
