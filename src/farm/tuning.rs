//! Balance constants for the plant farm.
//!
//! Every formula that turns a level or a counter into a number lives here so
//! the rest of the game reads like rules, not arithmetic.

/// Real-time length of one simulation tick.
pub const TICK_INTERVAL_MS: u64 = 1000;

/// Chance that a tick spawns a plant before food, buffs and pity apply.
pub const BASE_SPAWN_PROBABILITY: f64 = 0.01;

/// Added to the spawn chance for every consecutive failed attempt.
pub const PITY_STEP: f64 = 0.01;

/// Gold a brand new farm starts with.
pub const STARTING_GOLD: u64 = 50;

// ── Grid ────────────────────────────────────────────────────────

pub const BASE_SLOTS: usize = 25;
pub const SLOTS_PER_LAND_LEVEL: usize = 5;
pub const MAX_LAND_LEVEL: u32 = 5;

/// Number of slots for a given land capacity level.
pub fn slot_capacity(land_level: u32) -> usize {
    BASE_SLOTS + land_level.min(MAX_LAND_LEVEL) as usize * SLOTS_PER_LAND_LEVEL
}

// ── Growth ──────────────────────────────────────────────────────

pub const BASE_GROWTH_MS: u64 = 60_000;
pub const GROWTH_MS_PER_LEVEL: u64 = 3_000;
pub const MIN_GROWTH_MS: u64 = 5_000;

/// Time a fresh baby plant needs to mature, shortened by the growth upgrade.
pub fn growth_duration_ms(growth_speed_level: u32) -> u64 {
    BASE_GROWTH_MS
        .saturating_sub(GROWTH_MS_PER_LEVEL * growth_speed_level as u64)
        .max(MIN_GROWTH_MS)
}

// ── Rarity ──────────────────────────────────────────────────────

/// Extra weight per rarity level for every non-common plant.
pub const RARITY_WEIGHT_PER_LEVEL: f64 = 0.1;
pub const MAX_RARITY_LEVEL: u32 = 20;

/// Weight multiplier applied to non-common plants at a rarity level.
pub fn rarity_weight_multiplier(rarity_level: u32) -> f64 {
    1.0 + rarity_level.saturating_sub(1) as f64 * RARITY_WEIGHT_PER_LEVEL
}

// ── Upgrade costs ───────────────────────────────────────────────

pub fn growth_speed_cost(level: u32) -> u64 {
    100 + 50 * level as u64
}

pub fn rarity_cost(level: u32) -> u64 {
    (1000.0 * 2f64.powi(level.saturating_sub(1) as i32)).floor() as u64
}

pub fn fertilizer_cost(level: u32) -> u64 {
    1000 + 500 * level as u64
}

pub fn land_capacity_cost(level: u32) -> u64 {
    2000 * (level as u64 + 1)
}

/// Food duration bonus from the fertilizer upgrade.
pub fn fertilizer_duration_multiplier(level: u32) -> f64 {
    1.0 + level as f64 * 0.1
}

// ── Shop ────────────────────────────────────────────────────────

pub const UNLOCK_COST: u64 = 500;
pub const LUCKY_BOX_COST: u64 = 300;

// ── Quests ──────────────────────────────────────────────────────

pub const QUEST_BOARD_SIZE: usize = 3;
pub const QUEST_REFRESH_MS: u64 = 10 * 60 * 1000;
pub const QUEST_REFRESH_COST: u64 = 500;

// ── Offline / frame pacing ──────────────────────────────────────

/// Frame deltas above this are treated as time away rather than ticked.
pub const MAX_FRAME_DELTA_MS: f64 = 5_000.0;

/// Ticks between unconditional autosaves.
pub const AUTOSAVE_INTERVAL_TICKS: u32 = 30;

pub const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_duration_floors_at_minimum() {
        assert_eq!(growth_duration_ms(0), 60_000);
        assert_eq!(growth_duration_ms(5), 45_000);
        assert_eq!(growth_duration_ms(18), 6_000);
        assert_eq!(growth_duration_ms(19), 5_000);
        assert_eq!(growth_duration_ms(500), 5_000);
    }

    #[test]
    fn rarity_cost_doubles() {
        assert_eq!(rarity_cost(1), 1000);
        assert_eq!(rarity_cost(2), 2000);
        assert_eq!(rarity_cost(5), 16000);
    }

    #[test]
    fn rarity_multiplier_starts_at_one() {
        assert!((rarity_weight_multiplier(1) - 1.0).abs() < 1e-9);
        assert!((rarity_weight_multiplier(11) - 2.0).abs() < 1e-9);
        // Level 0 only shows up in corrupt saves; it must not shrink weights.
        assert!((rarity_weight_multiplier(0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn capacity_grows_in_steps() {
        assert_eq!(slot_capacity(0), 25);
        assert_eq!(slot_capacity(2), 35);
        assert_eq!(slot_capacity(99), slot_capacity(MAX_LAND_LEVEL));
    }
}
