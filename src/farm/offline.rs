//! Offline catch-up.
//!
//! Approximates the ticks missed while the page was closed or hidden. Spawns
//! are rolled without pity and land directly as adults, existing babies get
//! one bulk growth step, and only the part of the gap during which the food
//! was still out counts. This is an estimate, not a replay of online play.

use super::catalog::Catalog;
use super::logic::{base_spawn_chance, growth_per_tick};
use super::random::RandomSource;
use super::selector::select_plant;
use super::state::{FarmState, Stage};
use super::tuning::TICK_INTERVAL_MS;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OfflineReport {
    pub elapsed_ms: u64,
    /// Portion of the gap during which food was active.
    pub window_ms: u64,
    pub attempts: u64,
    pub spawned: usize,
    pub matured: usize,
}

/// Catch up from `state.last_seen_at` to `now`.
///
/// Returns `None` when there is nothing to catch up (first run, or the clock
/// went backwards).
pub fn catch_up(
    state: &mut FarmState,
    catalog: &Catalog,
    now: u64,
    rng: &mut impl RandomSource,
) -> Option<OfflineReport> {
    let last_seen = state.last_seen_at;
    if last_seen == 0 || now <= last_seen {
        state.last_seen_at = now;
        return None;
    }
    let elapsed = now - last_seen;
    state.expire_buffs(now);

    let mut report = OfflineReport {
        elapsed_ms: elapsed,
        ..OfflineReport::default()
    };
    if !state.food.active {
        state.last_seen_at = now;
        return Some(report);
    }

    let window = elapsed.min(state.food.end_time.saturating_sub(last_seen));
    report.window_ms = window;
    report.attempts = window / TICK_INTERVAL_MS;

    // Babies already in the ground grow through the whole window at once.
    let growth = growth_per_tick(state) * (window as f64 / TICK_INTERVAL_MS as f64);
    for plant in state.grid.iter_mut().flatten() {
        if plant.grow(growth) {
            report.matured += 1;
        }
    }

    let probability = base_spawn_chance(state).clamp(0.0, 1.0);
    let mut empty = state.empty_slots();
    for _ in 0..report.attempts {
        if empty.is_empty() {
            break;
        }
        if rng.roll() >= probability {
            continue;
        }
        let slot = empty.swap_remove(rng.pick(empty.len()));
        match select_plant(catalog, state.upgrades.rarity, &state.buffs, rng) {
            Ok(plant) => {
                state.place_plant(slot, plant.key.clone(), now, Stage::Adult);
                report.spawned += 1;
            }
            Err(e) => {
                log::error!("offline spawn skipped: {}", e);
                break;
            }
        }
    }

    state.last_seen_at = now;
    if report.spawned > 0 || report.matured > 0 {
        state.add_log(
            &format!(
                "🌙 While you were away ({}m): {} new plants, {} grew up",
                elapsed / 60_000,
                report.spawned,
                report.matured
            ),
            true,
        );
    }
    log::info!(
        "offline catch-up: elapsed={}ms window={}ms attempts={} spawned={} matured={}",
        elapsed,
        window,
        report.attempts,
        report.spawned,
        report.matured
    );
    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farm::random::ScriptedRolls;
    use crate::farm::state::{FoodKind, FoodState, Plant};

    fn farm_seen_at(t: u64) -> FarmState {
        let mut state = FarmState::new();
        state.last_seen_at = t;
        state
    }

    #[test]
    fn first_run_has_nothing_to_catch_up() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = FarmState::new();
        let mut rng = ScriptedRolls::new(&[0.0]);
        assert_eq!(catch_up(&mut state, &catalog, 5_000, &mut rng), None);
        assert_eq!(state.last_seen_at, 5_000);
    }

    #[test]
    fn no_food_means_no_spawns() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = farm_seen_at(1_000);
        let mut rng = ScriptedRolls::new(&[0.0]);
        let report = catch_up(&mut state, &catalog, 1_000_000, &mut rng).unwrap();
        assert_eq!(report.attempts, 0);
        assert_eq!(report.spawned, 0);
        assert!(state.grid.iter().all(|s| s.is_none()));
    }

    #[test]
    fn successes_land_as_adults_bounded_by_slots() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = farm_seen_at(1_000);
        state.food = FoodState::start(FoodKind::Normal, 1_000, 300_000);
        // Every roll succeeds; grid has 25 slots, window allows 100 attempts.
        let mut rng = ScriptedRolls::new(&[0.0]);
        let report = catch_up(&mut state, &catalog, 101_000, &mut rng).unwrap();
        assert_eq!(report.attempts, 100);
        assert_eq!(report.spawned, 25);
        assert_eq!(state.adult_count(), 25);
        assert_eq!(state.pity.failures(), 0);
    }

    #[test]
    fn window_clipped_to_food_end() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = farm_seen_at(10_000);
        state.food = FoodState::start(FoodKind::Speed, 0, 40_000);
        let mut rng = ScriptedRolls::new(&[0.99]);
        let report = catch_up(&mut state, &catalog, 3_600_000, &mut rng).unwrap();
        assert_eq!(report.window_ms, 30_000);
        assert_eq!(report.attempts, 30);
    }

    #[test]
    fn failures_do_not_touch_pity() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = farm_seen_at(1_000);
        state.food = FoodState::start(FoodKind::Normal, 1_000, 300_000);
        let mut rng = ScriptedRolls::new(&[0.5]);
        let report = catch_up(&mut state, &catalog, 51_000, &mut rng).unwrap();
        assert_eq!(report.spawned, 0);
        assert_eq!(state.pity.failures(), 0);
    }

    #[test]
    fn babies_get_bulk_growth() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = farm_seen_at(1_000);
        state.food = FoodState::start(FoodKind::Normal, 1_000, 300_000);
        state.grid[0] = Some(Plant::baby("herb".into(), 1, 0, 60_000));
        state.grid[1] = Some(Plant::baby("herb".into(), 2, 0, 60_000));
        state.grid[1].as_mut().unwrap().growth_progress = 50_000.0;
        let mut rng = ScriptedRolls::new(&[0.99]);
        let report = catch_up(&mut state, &catalog, 21_000, &mut rng).unwrap();
        assert_eq!(report.matured, 1);
        assert!((state.grid[0].as_ref().unwrap().growth_progress - 20_000.0).abs() < 1e-6);
        assert!(state.grid[1].as_ref().unwrap().is_adult());
    }
}
