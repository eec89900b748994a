//! Achievements: stat thresholds that pay out gold once claimed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::ActionError;
use super::state::FarmState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementStatus {
    #[default]
    Locked,
    Ready,
    Claimed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AchievementStat {
    Harvested,
    GoldEarned,
    Discovered,
    DishesCooked,
    QuestsCompleted,
}

impl AchievementStat {
    pub fn read(&self, state: &FarmState) -> u64 {
        match self {
            AchievementStat::Harvested => state.stats.total_harvested,
            AchievementStat::GoldEarned => state.stats.total_gold_earned,
            AchievementStat::Discovered => state.ledger.discovered_count() as u64,
            AchievementStat::DishesCooked => state.stats.dishes_cooked,
            AchievementStat::QuestsCompleted => state.stats.quests_completed,
        }
    }
}

pub struct Achievement {
    pub key: &'static str,
    pub name: &'static str,
    pub stat: AchievementStat,
    pub threshold: u64,
    pub reward: u64,
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement { key: "first_harvest", name: "First Harvest", stat: AchievementStat::Harvested, threshold: 1, reward: 50 },
    Achievement { key: "green_thumb", name: "Green Thumb", stat: AchievementStat::Harvested, threshold: 100, reward: 500 },
    Achievement { key: "harvest_master", name: "Harvest Master", stat: AchievementStat::Harvested, threshold: 1000, reward: 5000 },
    Achievement { key: "pocket_money", name: "Pocket Money", stat: AchievementStat::GoldEarned, threshold: 1000, reward: 100 },
    Achievement { key: "tycoon", name: "Tycoon", stat: AchievementStat::GoldEarned, threshold: 100_000, reward: 10_000 },
    Achievement { key: "botanist", name: "Botanist", stat: AchievementStat::Discovered, threshold: 5, reward: 300 },
    Achievement { key: "herbarium", name: "Complete Herbarium", stat: AchievementStat::Discovered, threshold: 11, reward: 20_000 },
    Achievement { key: "home_cook", name: "Home Cook", stat: AchievementStat::DishesCooked, threshold: 1, reward: 100 },
    Achievement { key: "head_chef", name: "Head Chef", stat: AchievementStat::DishesCooked, threshold: 50, reward: 3000 },
    Achievement { key: "good_neighbor", name: "Good Neighbor", stat: AchievementStat::QuestsCompleted, threshold: 10, reward: 1000 },
];

/// Per-achievement status keyed by achievement key. Missing means locked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementBook {
    statuses: BTreeMap<String, AchievementStatus>,
}

impl AchievementBook {
    pub fn status(&self, index: usize) -> AchievementStatus {
        ACHIEVEMENTS
            .get(index)
            .and_then(|a| self.statuses.get(a.key).copied())
            .unwrap_or_default()
    }

    fn set(&mut self, index: usize, status: AchievementStatus) {
        if let Some(a) = ACHIEVEMENTS.get(index) {
            self.statuses.insert(a.key.to_string(), status);
        }
    }

    pub fn ready_count(&self) -> usize {
        (0..ACHIEVEMENTS.len())
            .filter(|i| self.status(*i) == AchievementStatus::Ready)
            .count()
    }

    pub fn claimed_count(&self) -> usize {
        (0..ACHIEVEMENTS.len())
            .filter(|i| self.status(*i) == AchievementStatus::Claimed)
            .count()
    }

    /// Drop entries for achievements that no longer exist.
    pub fn retain_known(&mut self) {
        self.statuses
            .retain(|k, _| ACHIEVEMENTS.iter().any(|a| a.key == k.as_str()));
    }
}

/// Flip every locked achievement whose threshold is met to ready.
/// Returns how many became ready.
pub fn check_achievements(state: &mut FarmState) -> usize {
    let newly: Vec<usize> = ACHIEVEMENTS
        .iter()
        .enumerate()
        .filter(|(i, a)| {
            state.achievements.status(*i) == AchievementStatus::Locked
                && a.stat.read(state) >= a.threshold
        })
        .map(|(i, _)| i)
        .collect();
    for &i in &newly {
        state.achievements.set(i, AchievementStatus::Ready);
        state.add_log(&format!("🏆 Achievement ready: {}", ACHIEVEMENTS[i].name), true);
    }
    newly.len()
}

/// Claim one ready achievement. Returns the reward.
pub fn claim_achievement(state: &mut FarmState, index: usize) -> Result<u64, ActionError> {
    if state.achievements.status(index) != AchievementStatus::Ready {
        return Err(ActionError::AchievementNotReady(index));
    }
    let achievement = &ACHIEVEMENTS[index];
    state.achievements.set(index, AchievementStatus::Claimed);
    state.earn_gold(achievement.reward);
    state.add_log(
        &format!("🏆 {} claimed! +{}G", achievement.name, achievement.reward),
        true,
    );
    log::info!("achievement {} claimed", achievement.key);
    Ok(achievement.reward)
}

/// Claim everything that is ready. Returns the total reward.
pub fn claim_all_achievements(state: &mut FarmState) -> Result<u64, ActionError> {
    let ready: Vec<usize> = (0..ACHIEVEMENTS.len())
        .filter(|i| state.achievements.status(*i) == AchievementStatus::Ready)
        .collect();
    if ready.is_empty() {
        return Err(ActionError::NothingToClaim);
    }
    let mut total = 0;
    for i in &ready {
        state.achievements.set(*i, AchievementStatus::Claimed);
        total += ACHIEVEMENTS[*i].reward;
    }
    state.earn_gold(total);
    state.add_log(
        &format!("🏆 {} achievements claimed! +{}G", ready.len(), total),
        true,
    );
    Ok(total)
}
