//! Rewards unlocked at level milestones.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::locale::LocalizedText;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardMilestone {
    pub level: u32,
    pub title: LocalizedText,
}

/// Milestones in ascending level order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardTrack {
    milestones: Vec<RewardMilestone>,
}

impl RewardTrack {
    pub fn new(mut milestones: Vec<RewardMilestone>) -> Result<Self> {
        milestones.sort_by_key(|m| m.level);
        if let Some(pair) = milestones.windows(2).find(|w| w[0].level == w[1].level) {
            return Err(CoreError::invalid_value(
                "rewards.level",
                format!("level {} has more than one reward", pair[0].level),
            ));
        }
        Ok(Self { milestones })
    }

    pub fn builtin() -> Self {
        let milestone = |level, de: &str, en: &str| RewardMilestone {
            level,
            title: LocalizedText::new([("de", de), ("en", en)]),
        };
        Self {
            milestones: vec![
                milestone(10, "Erweiterte Statistiken", "Extended statistics"),
                milestone(25, "Golden Pink Theme", "Golden pink theme"),
                milestone(50, "VIP-Chat", "VIP chat"),
                milestone(75, "Premium Insights", "Premium insights"),
                milestone(100, "Legendärer Status", "Legendary status"),
            ],
        }
    }

    /// The first milestone above `level`, if any is left.
    pub fn next_reward(&self, level: u32) -> Option<&RewardMilestone> {
        self.milestones.iter().find(|m| level < m.level)
    }

    /// Milestones already reached at `level`.
    pub fn unlocked(&self, level: u32) -> impl Iterator<Item = &RewardMilestone> {
        self.milestones.iter().take_while(move |m| m.level <= level)
    }

    pub fn milestones(&self) -> &[RewardMilestone] {
        &self.milestones
    }
}

impl Default for RewardTrack {
    fn default() -> Self {
        Self::builtin()
    }
}
