//! Experience to level resolution and the level reward track.

mod rewards;

pub use rewards::{RewardMilestone, RewardTrack};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Upper bound for a configured level cap.
pub const MAX_LEVEL_CAP: u32 = 10_000;

/// Fixed experience thresholds for levels.
///
/// Level 1 starts at 0 XP. Going from level `L` to `L + 1` costs
/// `base_xp + step_xp * (L - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCurve {
    #[serde(default = "default_base_xp")]
    pub base_xp: u64,
    #[serde(default = "default_step_xp")]
    pub step_xp: u64,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
}

fn default_base_xp() -> u64 {
    100
}
fn default_step_xp() -> u64 {
    25
}
fn default_max_level() -> u32 {
    100
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            base_xp: default_base_xp(),
            step_xp: default_step_xp(),
            max_level: default_max_level(),
        }
    }
}

/// Where an experience total sits on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    pub xp: u64,
    /// Experience at which `level` was reached
    pub level_floor_xp: u64,
    /// Experience needed for the next level, `None` at the cap
    pub next_level_xp: Option<u64>,
    /// Progress from this level to the next, 0..=100
    pub percent: u8,
}

impl LevelCurve {
    pub fn new(base_xp: u64, step_xp: u64, max_level: u32) -> Result<Self> {
        let curve = Self {
            base_xp,
            step_xp,
            max_level,
        };
        curve.validate()?;
        Ok(curve)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_xp == 0 {
            return Err(CoreError::invalid_value("level.base_xp", "must be at least 1"));
        }
        if !(1..=MAX_LEVEL_CAP).contains(&self.max_level) {
            return Err(CoreError::invalid_value(
                "level.max_level",
                format!("must be between 1 and {MAX_LEVEL_CAP}"),
            ));
        }
        Ok(())
    }

    /// Total experience required to reach `level`. Saturates instead of overflowing.
    pub fn threshold(&self, level: u32) -> u64 {
        let steps = u64::from(level.saturating_sub(1));
        let linear = self.base_xp.saturating_mul(steps);
        let triangular = steps.saturating_mul(steps.saturating_sub(1)) / 2;
        linear.saturating_add(self.step_xp.saturating_mul(triangular))
    }

    /// Level for an experience total. Negative totals are corrupted state.
    pub fn level_for(&self, xp: i64) -> Result<u32> {
        let xp = non_negative(xp)?;
        Ok(self.level_for_xp(xp))
    }

    /// Level for a validated experience total.
    pub fn level_for_xp(&self, xp: u64) -> u32 {
        let mut level = 1;
        while level < self.max_level && self.threshold(level + 1) <= xp {
            level += 1;
        }
        level
    }

    pub fn progress(&self, xp: i64) -> Result<LevelProgress> {
        let xp = non_negative(xp)?;
        let level = self.level_for_xp(xp);
        let level_floor_xp = self.threshold(level);
        let next_level_xp = (level < self.max_level).then(|| self.threshold(level + 1));

        let percent = match next_level_xp {
            Some(next) if next > level_floor_xp => {
                let gained = (xp - level_floor_xp) as f64;
                let span = (next - level_floor_xp) as f64;
                ((gained * 100.0 / span).floor() as u8).min(99)
            }
            _ => 100,
        };

        Ok(LevelProgress {
            level,
            xp,
            level_floor_xp,
            next_level_xp,
            percent,
        })
    }
}

fn non_negative(xp: i64) -> Result<u64> {
    u64::try_from(xp).map_err(|_| CoreError::InvalidState(format!("negative experience total {xp}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn thresholds_follow_the_curve() {
        let curve = LevelCurve::default();
        assert_eq!(curve.threshold(1), 0);
        assert_eq!(curve.threshold(2), 100);
        assert_eq!(curve.threshold(3), 225);
        assert_eq!(curve.threshold(4), 375);
    }

    #[test]
    fn level_boundaries() {
        let curve = LevelCurve::default();
        assert_eq!(curve.level_for(0).unwrap(), 1);
        assert_eq!(curve.level_for(99).unwrap(), 1);
        assert_eq!(curve.level_for(100).unwrap(), 2);
        assert_eq!(curve.level_for(224).unwrap(), 2);
        assert_eq!(curve.level_for(225).unwrap(), 3);
    }

    #[test]
    fn level_is_capped() {
        let curve = LevelCurve::new(10, 0, 5).unwrap();
        assert_eq!(curve.level_for(1_000_000).unwrap(), 5);
        let progress = curve.progress(1_000_000).unwrap();
        assert_eq!(progress.next_level_xp, None);
        assert_eq!(progress.percent, 100);
    }

    #[test]
    fn negative_experience_is_invalid_state() {
        let curve = LevelCurve::default();
        assert!(matches!(curve.level_for(-1), Err(CoreError::InvalidState(_))));
        assert!(matches!(curve.progress(-1), Err(CoreError::InvalidState(_))));
    }

    #[test]
    fn progress_within_level() {
        let progress = LevelCurve::default().progress(150).unwrap();
        assert_eq!(progress.level, 2);
        assert_eq!(progress.level_floor_xp, 100);
        assert_eq!(progress.next_level_xp, Some(225));
        assert_eq!(progress.percent, 40);
    }

    #[test]
    fn invalid_curves_are_rejected() {
        assert!(LevelCurve::new(0, 25, 100).is_err());
        assert!(LevelCurve::new(100, 25, 0).is_err());
        assert!(LevelCurve::new(100, 25, MAX_LEVEL_CAP + 1).is_err());
    }

    proptest! {
        #[test]
        fn level_never_decreases(a in 0i64..5_000_000, b in 0i64..5_000_000) {
            let curve = LevelCurve::default();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(curve.level_for(low).unwrap() <= curve.level_for(high).unwrap());
        }
    }
}
