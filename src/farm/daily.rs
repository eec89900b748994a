//! Seven-day login streak.

use serde::{Deserialize, Serialize};

use super::error::ActionError;
use super::state::FarmState;
use super::tuning::MS_PER_DAY;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyReward {
    pub gold: u64,
    pub growth_potions: u32,
    pub seed_bombs: u32,
}

impl DailyReward {
    const fn gold(gold: u64) -> Self {
        Self { gold, growth_potions: 0, seed_bombs: 0 }
    }

    pub fn label(&self) -> String {
        let mut parts = Vec::new();
        if self.gold > 0 {
            parts.push(format!("{}G", self.gold));
        }
        if self.growth_potions > 0 {
            parts.push(format!("🧪x{}", self.growth_potions));
        }
        if self.seed_bombs > 0 {
            parts.push(format!("💣x{}", self.seed_bombs));
        }
        parts.join(" + ")
    }
}

pub const DAILY_REWARDS: [DailyReward; 7] = [
    DailyReward::gold(500),
    DailyReward::gold(1000),
    DailyReward { gold: 0, growth_potions: 1, seed_bombs: 0 },
    DailyReward::gold(2000),
    DailyReward { gold: 0, growth_potions: 0, seed_bombs: 1 },
    DailyReward { gold: 0, growth_potions: 2, seed_bombs: 0 },
    DailyReward { gold: 5000, growth_potions: 0, seed_bombs: 3 },
];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyStreak {
    /// Streak day of the last claim, 1..=7 (0 before the first claim).
    pub day: u32,
    /// UTC day number of the last claim.
    pub last_claim_day: Option<u64>,
}

impl DailyStreak {
    /// Streak day the next claim at `now` would pay out.
    pub fn next_day(&self, now: u64) -> u32 {
        let today = now / MS_PER_DAY;
        match self.last_claim_day {
            Some(last) if last.checked_add(1) == Some(today) => self.day % 7 + 1,
            Some(last) if last == today => self.day.max(1),
            _ => 1,
        }
    }

    pub fn claimed_today(&self, now: u64) -> bool {
        self.last_claim_day == Some(now / MS_PER_DAY)
    }
}

/// Claim today's reward.
pub fn claim_daily(state: &mut FarmState, now: u64) -> Result<DailyReward, ActionError> {
    if state.daily.claimed_today(now) {
        return Err(ActionError::AlreadyClaimedToday);
    }
    let day = state.daily.next_day(now);
    let reward = DAILY_REWARDS[(day as usize - 1) % DAILY_REWARDS.len()];

    state.daily.day = day;
    state.daily.last_claim_day = Some(now / MS_PER_DAY);
    if reward.gold > 0 {
        state.earn_gold(reward.gold);
    }
    state.consumables.growth_potion += reward.growth_potions;
    state.consumables.seed_bomb += reward.seed_bombs;
    state.add_log(&format!("📅 Day {} reward: {}", day, reward.label()), true);
    Ok(reward)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = MS_PER_DAY;

    #[test]
    fn consecutive_days_extend_streak() {
        let mut state = FarmState::new();
        assert_eq!(claim_daily(&mut state, 10 * DAY).unwrap().gold, 500);
        assert_eq!(claim_daily(&mut state, 11 * DAY + 5).unwrap().gold, 1000);
        let day3 = claim_daily(&mut state, 12 * DAY).unwrap();
        assert_eq!(day3.growth_potions, 1);
        assert_eq!(state.daily.day, 3);
        assert_eq!(state.consumables.growth_potion, 1);
    }

    #[test]
    fn same_day_claim_fails() {
        let mut state = FarmState::new();
        claim_daily(&mut state, 3 * DAY).unwrap();
        let gold = state.ledger.gold;
        assert_eq!(
            claim_daily(&mut state, 3 * DAY + DAY - 1),
            Err(ActionError::AlreadyClaimedToday)
        );
        assert_eq!(state.ledger.gold, gold);
    }

    #[test]
    fn gap_resets_streak() {
        let mut state = FarmState::new();
        claim_daily(&mut state, DAY).unwrap();
        claim_daily(&mut state, 2 * DAY).unwrap();
        claim_daily(&mut state, 5 * DAY).unwrap();
        assert_eq!(state.daily.day, 1);
    }

    #[test]
    fn last_claim_at_end_of_time_restarts_streak() {
        let mut state = FarmState::new();
        state.daily = DailyStreak { day: 4, last_claim_day: Some(u64::MAX) };
        assert_eq!(state.daily.next_day(9 * DAY), 1);
        assert_eq!(claim_daily(&mut state, 9 * DAY).unwrap().gold, 500);
        assert_eq!(state.daily.day, 1);
    }

    #[test]
    fn streak_wraps_after_seven() {
        let mut state = FarmState::new();
        for d in 0..7 {
            claim_daily(&mut state, (d + 1) * DAY).unwrap();
        }
        assert_eq!(state.daily.day, 7);
        assert_eq!(state.consumables.seed_bomb, 1 + 3);
        claim_daily(&mut state, 8 * DAY).unwrap();
        assert_eq!(state.daily.day, 1);
    }
}
