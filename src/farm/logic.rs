//! The simulation tick.
//!
//! One call advances the farm by exactly one [`TICK_INTERVAL_MS`]: buffs
//! expire, food is checked, a spawn may be attempted and every baby grows.
//! Nothing here can fail for a valid state.

use super::achievements::check_achievements;
use super::catalog::{Catalog, PlantKey, Rarity};
use super::quests::refresh_if_due;
use super::random::RandomSource;
use super::selector::select_plant;
use super::state::{FarmState, FoodState, Stage};
use super::tuning::{BASE_SPAWN_PROBABILITY, TICK_INTERVAL_MS};

/// What one tick did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub spawned: Option<(usize, PlantKey)>,
    pub matured: usize,
    pub expired_buffs: usize,
    pub food_expired: bool,
    /// A spawn roll happened (a slot was free and food was out).
    pub attempted: bool,
    pub quests_refreshed: bool,
    pub achievements_ready: usize,
}

impl TickReport {
    /// Whether something the player can see happened.
    ///
    /// Pity and growth progress move on almost every tick and are left to the
    /// periodic autosave.
    pub fn changed(&self) -> bool {
        self.spawned.is_some()
            || self.matured > 0
            || self.expired_buffs > 0
            || self.food_expired
            || self.quests_refreshed
            || self.achievements_ready > 0
    }
}

/// Chance that a spawn attempt succeeds right now, pity included.
pub fn spawn_probability(state: &FarmState) -> f64 {
    state.pity.gated_probability(base_spawn_chance(state))
}

/// Spawn chance from food and buffs alone.
pub fn base_spawn_chance(state: &FarmState) -> f64 {
    BASE_SPAWN_PROBABILITY * state.food.multiplier * state.buffs.spawn_rate_multiplier()
}

/// Growth a baby gains per tick under the current food and buffs.
pub fn growth_per_tick(state: &FarmState) -> f64 {
    TICK_INTERVAL_MS as f64 * state.food.multiplier * state.buffs.speed_multiplier()
}

/// Advance the farm by one tick at wall-clock time `now`.
pub fn tick(
    state: &mut FarmState,
    catalog: &Catalog,
    now: u64,
    rng: &mut impl RandomSource,
) -> TickReport {
    let mut report = step_farm(state, catalog, now, rng);
    report.quests_refreshed = refresh_if_due(state, catalog, now, rng);
    report.achievements_ready = check_achievements(state);
    state.last_seen_at = now;
    report
}

fn step_farm(
    state: &mut FarmState,
    catalog: &Catalog,
    now: u64,
    rng: &mut impl RandomSource,
) -> TickReport {
    let mut report = TickReport::default();

    report.expired_buffs = state.expire_buffs(now);

    // No food: the farm is frozen.
    if !state.food.active {
        return report;
    }
    if state.food.end_time <= now {
        state.food = FoodState::default();
        report.food_expired = true;
        state.add_log("🍽️ The food ran out. Nothing will grow until you feed the farm.", true);
        log::debug!("food expired at {}", now);
        return report;
    }

    let empty = state.empty_slots();
    if !empty.is_empty() {
        report.attempted = true;
        let probability = spawn_probability(state);
        if rng.roll() < probability {
            let slot = empty[rng.pick(empty.len())];
            match select_plant(catalog, state.upgrades.rarity, &state.buffs, rng) {
                Ok(plant) => {
                    state.place_plant(slot, plant.key.clone(), now, Stage::Baby);
                    state.pity.on_attempt(true);
                    if plant.rarity >= Rarity::Rare {
                        state.add_log(
                            &format!("✨ A {} {} sprouted! ({})", plant.emoji, plant.name, plant.rarity.name()),
                            plant.rarity >= Rarity::Epic,
                        );
                    }
                    log::debug!("spawned {} in slot {} (p={:.3})", plant.key, slot, probability);
                    report.spawned = Some((slot, plant.key.clone()));
                }
                // A catalog bug; the tick goes on without a spawn.
                Err(e) => log::error!("spawn skipped: {}", e),
            }
        } else {
            state.pity.on_attempt(false);
        }
    }

    let growth = growth_per_tick(state);
    for plant in state.grid.iter_mut().flatten() {
        if plant.grow(growth) {
            report.matured += 1;
        }
    }
    if report.matured > 0 {
        state.add_log(&format!("🌼 {} plant(s) ready to harvest", report.matured), false);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farm::buffs::Buff;
    use crate::farm::random::ScriptedRolls;
    use crate::farm::state::{FoodKind, Plant};

    fn fed(multiplier_kind: FoodKind) -> FarmState {
        let mut state = FarmState::new();
        state.food = FoodState::start(multiplier_kind, 0, 1_000_000);
        state
    }

    fn fill_all_but(state: &mut FarmState, keep_empty: usize) {
        for i in 0..state.grid.len() {
            if i != keep_empty {
                state.place_plant(i, "sprout".into(), 0, Stage::Adult);
            }
        }
    }

    #[test]
    fn no_food_no_change() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = FarmState::new();
        let mut rng = ScriptedRolls::new(&[0.0]);
        let report = tick(&mut state, &catalog, 1000, &mut rng);
        assert!(state.grid.iter().all(|s| s.is_none()));
        assert_eq!(state.pity.failures(), 0);
        assert!(report.spawned.is_none());
        assert!(!report.attempted);
    }

    #[test]
    fn draw_below_probability_spawns_and_resets_pity() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = fed(FoodKind::Normal);
        fill_all_but(&mut state, 7);
        // gate roll, slot pick, plant pick
        let mut rng = ScriptedRolls::new(&[0.009_999, 0.0, 0.0]);
        let report = tick(&mut state, &catalog, 1000, &mut rng);
        assert_eq!(report.spawned, Some((7, "button_mushroom".into())));
        assert_eq!(state.pity.failures(), 0);
        let plant = state.grid[7].as_ref().unwrap();
        assert_eq!(plant.stage, Stage::Baby);
        assert_eq!(plant.growth_duration, 60_000);
    }

    #[test]
    fn draw_at_probability_fails_and_raises_pity() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = fed(FoodKind::Normal);
        fill_all_but(&mut state, 7);
        let mut rng = ScriptedRolls::new(&[0.01]);
        let report = tick(&mut state, &catalog, 1000, &mut rng);
        assert!(report.spawned.is_none());
        assert!(report.attempted);
        assert!(state.grid[7].is_none());
        assert_eq!(state.pity.failures(), 1);
    }

    #[test]
    fn full_grid_does_not_accrue_pity() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = fed(FoodKind::Normal);
        for i in 0..state.grid.len() {
            state.place_plant(i, "sprout".into(), 0, Stage::Adult);
        }
        let mut rng = ScriptedRolls::new(&[0.99]);
        let report = tick(&mut state, &catalog, 1000, &mut rng);
        assert!(!report.attempted);
        assert_eq!(state.pity.failures(), 0);
    }

    #[test]
    fn baby_matures_on_exact_boundary() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = fed(FoodKind::Normal);
        fill_all_but(&mut state, 0);
        let mut baby = Plant::baby("herb".into(), 99, 0, 5000);
        baby.growth_progress = 4000.0;
        state.grid[0] = Some(baby);

        let mut rng = ScriptedRolls::new(&[0.99]);
        let report = tick(&mut state, &catalog, 1000, &mut rng);
        let plant = state.grid[0].as_ref().unwrap();
        assert_eq!(plant.stage, Stage::Adult);
        assert!((plant.growth_progress - 5000.0).abs() < 1e-9);
        assert_eq!(report.matured, 1);
    }

    #[test]
    fn food_and_speed_scale_growth() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = fed(FoodKind::Speed);
        fill_all_but(&mut state, 0);
        state.grid[0] = Some(Plant::baby("herb".into(), 99, 0, 60_000));
        state.buffs.apply(Buff::Speed { value: 0.5, end_time: 1_000_000 });

        let mut rng = ScriptedRolls::new(&[0.99]);
        tick(&mut state, &catalog, 1000, &mut rng);
        // 1000 * 2.0 * 1.5
        let plant = state.grid[0].as_ref().unwrap();
        assert!((plant.growth_progress - 3000.0).abs() < 1e-9);
    }

    #[test]
    fn expired_food_is_cleared_and_freezes_growth() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = FarmState::new();
        state.food = FoodState::start(FoodKind::Speed, 0, 5000);
        state.grid[0] = Some(Plant::baby("herb".into(), 1, 0, 60_000));

        let mut rng = ScriptedRolls::new(&[0.0]);
        let report = tick(&mut state, &catalog, 5000, &mut rng);
        assert!(report.food_expired);
        assert!(!state.food.active);
        assert!((state.food.multiplier - 1.0).abs() < 1e-9);
        assert!((state.grid[0].as_ref().unwrap().growth_progress - 0.0).abs() < 1e-9);
        assert_eq!(state.empty_slots().len(), 24);
    }

    #[test]
    fn stale_buffs_expire_before_aggregation() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = fed(FoodKind::Normal);
        fill_all_but(&mut state, 0);
        state.grid[0] = Some(Plant::baby("herb".into(), 1, 0, 60_000));
        state.buffs.apply(Buff::Speed { value: 5.0, end_time: 1000 });

        let mut rng = ScriptedRolls::new(&[0.99]);
        let report = tick(&mut state, &catalog, 1000, &mut rng);
        assert_eq!(report.expired_buffs, 1);
        assert!((state.grid[0].as_ref().unwrap().growth_progress - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn tick_stamps_last_seen() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = FarmState::new();
        let mut rng = ScriptedRolls::new(&[0.5]);
        tick(&mut state, &catalog, 42_000, &mut rng);
        assert_eq!(state.last_seen_at, 42_000);
    }
}
