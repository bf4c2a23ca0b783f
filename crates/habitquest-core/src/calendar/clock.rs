//! Injectable wall clock.

use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::error::{CoreError, Result};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The system clock, seen either from the local timezone or a fixed offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    /// Local timezone of the process.
    pub fn local() -> Self {
        Self { offset: None }
    }

    /// A fixed offset east of UTC, in minutes.
    pub fn with_offset_minutes(minutes: i32) -> Result<Self> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                CoreError::invalid_value("utc_offset_minutes", format!("{minutes} is out of range"))
            })?;
        Ok(Self {
            offset: Some(offset),
        })
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset),
            None => Local::now().fixed_offset(),
        }
    }
}

/// A clock frozen at one instant, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_returns_its_instant() {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 6, 12, 0, 0)
            .unwrap();
        assert_eq!(FixedClock(at).now(), at);
    }

    #[test]
    fn offset_clock_reports_configured_offset() {
        let clock = SystemClock::with_offset_minutes(90).unwrap();
        assert_eq!(clock.now().offset().local_minus_utc(), 90 * 60);
    }

    #[test]
    fn offset_out_of_range_is_rejected() {
        assert!(SystemClock::with_offset_minutes(24 * 60).is_err());
        assert!(SystemClock::with_offset_minutes(i32::MAX).is_err());
    }
}
