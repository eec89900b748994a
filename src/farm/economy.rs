//! Harvesting, selling and every purchase that spends gold.
//!
//! Each command checks all of its preconditions before it mutates anything,
//! so an `Err` always leaves the farm as it was.

use super::catalog::{Catalog, PlantKey, Rarity};
use super::error::ActionError;
use super::random::RandomSource;
use super::selector::select_plant;
use super::state::{
    ConsumableKind, FarmState, FoodKind, FoodState, InventoryEntry, Stage, Unlock, UpgradeKind,
};
use super::tuning;

/// `floor(unit_value * amount * gold_multiplier)`.
pub fn sale_value(unit_value: u64, amount: u32, gold_multiplier: f64) -> u64 {
    (unit_value as f64 * amount as f64 * gold_multiplier).floor() as u64
}

/// What a successful harvest produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Harvested {
    pub key: PlantKey,
    pub emoji: &'static str,
    pub name: &'static str,
    pub rarity: Rarity,
    pub first_discovery: bool,
}

/// Move the adult plant in `slot` into the inventory.
pub fn harvest(
    state: &mut FarmState,
    catalog: &Catalog,
    slot: usize,
    now: u64,
) -> Result<Harvested, ActionError> {
    let plant = match state.grid.get(slot) {
        None => return Err(ActionError::InvalidSlot(slot)),
        Some(None) => return Err(ActionError::NotHarvestable(slot)),
        Some(Some(p)) if !p.is_adult() => return Err(ActionError::NotHarvestable(slot)),
        Some(Some(p)) => p,
    };
    let plant_type = catalog
        .get(&plant.kind)
        .ok_or_else(|| ActionError::UnknownItem(plant.kind.to_string()))?;
    let key = plant_type.key.clone();

    state.grid[slot] = None;
    let entry = state
        .ledger
        .inventory
        .entry(key.clone())
        .or_insert_with(|| InventoryEntry::empty_for(plant_type));
    entry.count = entry.count.saturating_add(1);
    let first_discovery = state
        .ledger
        .collection
        .entry(key.clone())
        .or_default()
        .record(now);
    state.stats.total_harvested += 1;

    if first_discovery {
        state.add_log(
            &format!("📖 New discovery: {} {}!", plant_type.emoji, plant_type.name),
            true,
        );
        log::info!("discovered {} ({})", key, plant_type.rarity.name());
    }

    Ok(Harvested {
        key,
        emoji: plant_type.emoji,
        name: plant_type.name,
        rarity: plant_type.rarity,
        first_discovery,
    })
}

/// Harvest every adult plant at once.
pub fn harvest_all(
    state: &mut FarmState,
    catalog: &Catalog,
    now: u64,
) -> Result<Vec<Harvested>, ActionError> {
    if !state.unlocks.has(Unlock::HarvestAll) {
        return Err(ActionError::Locked(Unlock::HarvestAll.name()));
    }
    let ready: Vec<usize> = state
        .grid
        .iter()
        .enumerate()
        .filter_map(|(i, s)| match s {
            Some(p) if p.is_adult() && catalog.contains(&p.kind) => Some(i),
            _ => None,
        })
        .collect();
    if ready.is_empty() {
        return Err(ActionError::NothingToHarvest);
    }
    let mut out = Vec::with_capacity(ready.len());
    for slot in ready {
        out.push(harvest(state, catalog, slot, now)?);
    }
    state.add_log(&format!("🧺 Harvested {} plants", out.len()), false);
    Ok(out)
}

/// Sell `amount` units of one inventory entry. Returns the gold credited.
pub fn sell(state: &mut FarmState, key: &PlantKey, amount: u32, now: u64) -> Result<u64, ActionError> {
    if amount == 0 {
        return Err(ActionError::ZeroAmount);
    }
    let have = state.ledger.stock(key);
    if have < amount {
        return Err(ActionError::InsufficientStock {
            item: key.to_string(),
            have,
            need: amount,
        });
    }

    state.expire_buffs(now);
    let multiplier = state.buffs.gold_multiplier();
    let entry = state.ledger.take_stock(key, amount)?;
    let gold = sale_value(entry.value, amount, multiplier);
    state.earn_gold(gold);
    state.stats.total_sold += amount as u64;
    state.add_log(
        &format!("💰 Sold {}x {} for {}G", amount, entry.emoji, gold),
        false,
    );
    Ok(gold)
}

/// Sell the whole inventory in one step. Returns the total credited.
pub fn sell_all(state: &mut FarmState, now: u64) -> Result<u64, ActionError> {
    if state.ledger.inventory.is_empty() {
        return Err(ActionError::NothingToSell);
    }

    state.expire_buffs(now);
    let multiplier = state.buffs.gold_multiplier();
    let inventory = std::mem::take(&mut state.ledger.inventory);
    let mut total = 0u64;
    let mut units = 0u64;
    for entry in inventory.values() {
        total = total.saturating_add(sale_value(entry.value, entry.count, multiplier));
        units += entry.count as u64;
    }
    state.earn_gold(total);
    state.stats.total_sold += units;
    state.add_log(&format!("💰 Sold everything ({} items) for {}G", units, total), false);
    Ok(total)
}

/// Buy one level of an upgrade. Returns the new level.
pub fn buy_upgrade(state: &mut FarmState, kind: UpgradeKind) -> Result<u32, ActionError> {
    let level = state.upgrades.level(kind);
    if kind.max_level().is_some_and(|max| level >= max) {
        return Err(ActionError::MaxLevel(kind.name()));
    }
    state.ledger.spend(kind.cost(level))?;

    let slot = state.upgrades.level_mut(kind);
    *slot += 1;
    let new_level = *slot;
    if kind == UpgradeKind::LandCapacity {
        state.ensure_capacity();
    }
    state.add_log(&format!("⬆️ {} Lv.{}", kind.name(), new_level), false);
    log::info!("upgrade {} -> {}", kind.name(), new_level);
    Ok(new_level)
}

/// Food duration after the fertilizer bonus.
pub fn food_duration_ms(kind: FoodKind, fertilizer_level: u32) -> u64 {
    (kind.base_duration_ms() as f64 * tuning::fertilizer_duration_multiplier(fertilizer_level)).floor()
        as u64
}

pub fn activate_food(state: &mut FarmState, kind: FoodKind, now: u64) -> Result<(), ActionError> {
    // Food past its end time but not yet ticked off counts as gone.
    if state.food.active && state.food.end_time > now {
        return Err(ActionError::FoodAlreadyActive);
    }
    state.ledger.spend(kind.cost())?;
    let duration = food_duration_ms(kind, state.upgrades.fertilizer);
    state.food = FoodState::start(kind, now, duration);
    state.add_log(
        &format!("🍽️ {} put out ({}s, x{})", kind.name(), duration / 1000, kind.multiplier()),
        false,
    );
    Ok(())
}

/// Take the food away early. Nothing is refunded.
pub fn cancel_food(state: &mut FarmState) -> Result<(), ActionError> {
    if !state.food.active {
        return Err(ActionError::NoFoodActive);
    }
    state.food = FoodState::default();
    state.add_log("Food cleared", false);
    Ok(())
}

pub fn buy_unlock(state: &mut FarmState, unlock: Unlock) -> Result<(), ActionError> {
    if state.unlocks.has(unlock) {
        return Err(ActionError::AlreadyUnlocked(unlock.name()));
    }
    state.ledger.spend(tuning::UNLOCK_COST)?;
    state.unlocks.set(unlock);
    state.add_log(&format!("🔓 {} unlocked", unlock.name()), true);
    Ok(())
}

pub fn buy_consumable(state: &mut FarmState, kind: ConsumableKind) -> Result<(), ActionError> {
    state.ledger.spend(kind.cost())?;
    let count = state.consumables.count_mut(kind);
    *count = count.saturating_add(1);
    state.add_log(&format!("Bought {} {}", kind.emoji(), kind.name()), false);
    Ok(())
}

/// Use one consumable. Returns how many slots it affected.
pub fn use_consumable(
    state: &mut FarmState,
    catalog: &Catalog,
    kind: ConsumableKind,
    now: u64,
    rng: &mut impl RandomSource,
) -> Result<usize, ActionError> {
    let have = state.consumables.count(kind);
    if have == 0 {
        return Err(ActionError::InsufficientStock {
            item: kind.name().to_string(),
            have,
            need: 1,
        });
    }

    let affected = match kind {
        ConsumableKind::SeedBomb => {
            let empty = state.empty_slots();
            if empty.is_empty() {
                return Err(ActionError::NoEffect(kind.name()));
            }
            state.expire_buffs(now);
            let mut placed = 0;
            for slot in empty {
                match select_plant(catalog, state.upgrades.rarity, &state.buffs, rng) {
                    Ok(plant) => {
                        state.place_plant(slot, plant.key.clone(), now, Stage::Adult);
                        placed += 1;
                    }
                    Err(e) => log::error!("seed bomb could not pick a plant: {}", e),
                }
            }
            placed
        }
        ConsumableKind::GrowthPotion => {
            if state.baby_count() == 0 {
                return Err(ActionError::NoEffect(kind.name()));
            }
            state.mature_all_babies()
        }
    };

    *state.consumables.count_mut(kind) -= 1;
    state.add_log(
        &format!("{} {} used ({} plants)", kind.emoji(), kind.name(), affected),
        true,
    );
    Ok(affected)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_sell_conserves(stock in 1u32..50, amount in 1u32..60, bonus in 0.0f64..2.0) {
            let catalog = Catalog::builtin().unwrap();
            let mut state = FarmState::new();
            let plant = catalog.get(&"herb".into()).unwrap();
            let mut entry = InventoryEntry::empty_for(plant);
            entry.count = stock;
            state.ledger.inventory.insert("herb".into(), entry);
            state.buffs.apply(crate::farm::buffs::Buff::Gold { value: bonus, end_time: u64::MAX });
            let gold_before = state.ledger.gold;

            let result = sell(&mut state, &"herb".into(), amount, 0);
            if amount <= stock {
                let expected = sale_value(plant.value, amount, 1.0 + bonus);
                prop_assert_eq!(result, Ok(expected));
                prop_assert_eq!(state.ledger.gold, gold_before + expected);
                prop_assert_eq!(state.ledger.stock(&"herb".into()), stock - amount);
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(state.ledger.gold, gold_before);
                prop_assert_eq!(state.ledger.stock(&"herb".into()), stock);
            }
        }
    }
}
