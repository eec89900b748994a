//! Plant farm save/load.
//!
//! ## Format
//!
//! A save is one flat JSON object with a key per piece of state. Every key is
//! decoded on its own: a missing or malformed key falls back to its default
//! and the rest of the save still loads. Only a document that is not an
//! object at all, or one older than `MIN_COMPATIBLE_VERSION`, is thrown away.
//!
//! ## Versioning
//!
//! - `SAVE_VERSION`: bump when keys are added.
//! - `MIN_COMPATIBLE_VERSION`: bump only when an existing key changes meaning.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::catalog::Catalog;
use super::error::{SnapshotError, StoreError};
use super::kitchen;
use super::quests::QuestTarget;
use super::state::{FarmState, FoodState, Plant};
use super::tuning;

pub const SAVE_VERSION: u32 = 1;
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// Where snapshots live.
pub trait SaveStore {
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&mut self, json: &str) -> Result<(), StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Keeps the snapshot in memory. Used off the browser and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with(json: &str) -> Self {
        Self { data: Some(json.to_string()) }
    }

    #[cfg(test)]
    pub fn contents(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl SaveStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.data.clone())
    }

    fn save(&mut self, json: &str) -> Result<(), StoreError> {
        self.data = Some(json.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.data = None;
        Ok(())
    }
}

/// Browser localStorage.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "plant_farm_save";

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorage {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(STORAGE_KEY)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))
    }

    fn save(&mut self, json: &str) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(STORAGE_KEY, json)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        Self::storage()?
            .remove_item(STORAGE_KEY)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))
    }
}

fn put<T: Serialize + ?Sized>(
    map: &mut Map<String, Value>,
    key: &str,
    value: &T,
) -> Result<(), serde_json::Error> {
    map.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(())
}

/// Serialize the persistent part of `state`.
pub fn encode(state: &FarmState) -> Result<String, serde_json::Error> {
    let mut map = Map::new();
    put(&mut map, "version", &SAVE_VERSION)?;
    put(&mut map, "gold", &state.ledger.gold)?;
    put(&mut map, "plants", &state.grid)?;
    put(&mut map, "inventory", &state.ledger.inventory)?;
    put(&mut map, "collection", &state.ledger.collection)?;
    put(&mut map, "pantry", &state.ledger.pantry)?;
    put(&mut map, "buffs", &state.buffs)?;
    put(&mut map, "pity", &state.pity)?;
    put(&mut map, "food", &state.food)?;
    put(&mut map, "upgrades", &state.upgrades)?;
    put(&mut map, "unlocks", &state.unlocks)?;
    put(&mut map, "consumables", &state.consumables)?;
    put(&mut map, "cooking", &state.cooking)?;
    put(&mut map, "quests", &state.quests)?;
    put(&mut map, "achievements", &state.achievements)?;
    put(&mut map, "daily", &state.daily)?;
    put(&mut map, "stats", &state.stats)?;
    put(&mut map, "next_plant_id", &state.next_plant_id)?;
    put(&mut map, "last_seen_at", &state.last_seen_at)?;
    serde_json::to_string(&Value::Object(map))
}

/// Decode one key, or `None` (with a warning if it was present but bad).
fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("save key `{}` is corrupt, using default: {}", key, e);
            None
        }
    }
}

/// Rebuild a farm from a snapshot.
pub fn decode(json: &str, catalog: &Catalog) -> Result<FarmState, SnapshotError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| SnapshotError::Unparsable(e.to_string()))?;
    let map = match value {
        Value::Object(map) => map,
        _ => return Err(SnapshotError::NotAnObject),
    };

    let version: u32 = field(&map, "version").unwrap_or(SAVE_VERSION);
    if version < MIN_COMPATIBLE_VERSION {
        return Err(SnapshotError::IncompatibleVersion {
            found: version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }

    let mut state = FarmState::new();
    state.log.clear();
    if let Some(v) = field(&map, "gold") {
        state.ledger.gold = v;
    }
    if let Some(v) = field(&map, "plants") {
        state.grid = v;
    }
    if let Some(v) = field(&map, "inventory") {
        state.ledger.inventory = v;
    }
    if let Some(v) = field(&map, "collection") {
        state.ledger.collection = v;
    }
    if let Some(v) = field(&map, "pantry") {
        state.ledger.pantry = v;
    }
    if let Some(v) = field(&map, "buffs") {
        state.buffs = v;
    }
    if let Some(v) = field(&map, "pity") {
        state.pity = v;
    }
    if let Some(v) = field(&map, "food") {
        state.food = v;
    }
    if let Some(v) = field(&map, "upgrades") {
        state.upgrades = v;
    }
    if let Some(v) = field(&map, "unlocks") {
        state.unlocks = v;
    }
    if let Some(v) = field(&map, "consumables") {
        state.consumables = v;
    }
    if let Some(v) = field(&map, "cooking") {
        state.cooking = v;
    }
    if let Some(v) = field(&map, "quests") {
        state.quests = v;
    }
    if let Some(v) = field(&map, "achievements") {
        state.achievements = v;
    }
    if let Some(v) = field(&map, "daily") {
        state.daily = v;
    }
    if let Some(v) = field(&map, "stats") {
        state.stats = v;
    }
    if let Some(v) = field(&map, "next_plant_id") {
        state.next_plant_id = v;
    }
    if let Some(v) = field(&map, "last_seen_at") {
        state.last_seen_at = v;
    }

    sanitize(&mut state, catalog);
    Ok(state)
}

fn plant_is_sound(plant: &Plant, catalog: &Catalog) -> bool {
    catalog.contains(&plant.kind)
        && plant.id != u64::MAX
        && plant.growth_duration > 0
        && plant.growth_progress.is_finite()
        && plant.growth_progress >= 0.0
}

/// Clamp a decoded state back inside its invariants.
fn sanitize(state: &mut FarmState, catalog: &Catalog) {
    let upgrades = &mut state.upgrades;
    upgrades.rarity = upgrades.rarity.clamp(1, tuning::MAX_RARITY_LEVEL);
    upgrades.land_capacity = upgrades.land_capacity.min(tuning::MAX_LAND_LEVEL);

    let capacity = state.capacity();
    if state.grid.len() != capacity {
        log::warn!(
            "saved grid has {} slots but land level allows {}; clearing it",
            state.grid.len(),
            capacity
        );
        state.grid = vec![None; capacity];
    }
    for slot in state.grid.iter_mut() {
        if slot.as_ref().is_some_and(|p| !plant_is_sound(p, catalog)) {
            log::warn!("dropping unreadable plant from the grid");
            *slot = None;
        }
    }
    let max_id = state.grid.iter().flatten().map(|p| p.id).max().unwrap_or(0);
    state.next_plant_id = state.next_plant_id.max(max_id.saturating_add(1));

    state
        .ledger
        .inventory
        .retain(|k, e| catalog.contains(k) && e.count > 0);
    state.ledger.collection.retain(|k, _| catalog.contains(k));
    state
        .ledger
        .pantry
        .retain(|k, n| kitchen::recipe(k).is_some() && *n > 0);

    if !state.buffs.iter().all(|b| b.value().is_finite()) {
        log::warn!("saved buffs contain invalid values; dropping them");
        state.buffs = Default::default();
    }

    match state.food.kind {
        Some(kind) if state.food.active => state.food.multiplier = kind.multiplier(),
        _ => state.food = FoodState::default(),
    }

    if state
        .cooking
        .job
        .as_ref()
        .is_some_and(|j| kitchen::recipe(&j.dish).is_none())
    {
        state.cooking.job = None;
    }
    state.cooking.discovered.retain(|k| kitchen::recipe(k).is_some());

    let quests_ok = state.quests.quests.iter().all(|q| match &q.target {
        QuestTarget::Plant { key } => catalog.contains(key),
        QuestTarget::Dish { key } => kitchen::recipe(key).is_some(),
    });
    if !quests_ok || state.quests.quests.len() > tuning::QUEST_BOARD_SIZE {
        state.quests = Default::default();
    }

    state.achievements.retain_known();
}

/// Load the farm from `store`, falling back to a fresh one.
pub fn load_game(store: &mut dyn SaveStore, catalog: &Catalog) -> FarmState {
    let json = match store.load() {
        Ok(Some(json)) => json,
        Ok(None) => return FarmState::new(),
        Err(e) => {
            log::warn!("could not read save: {}", e);
            return FarmState::new();
        }
    };

    match decode(&json, catalog) {
        Ok(mut state) => {
            state.add_log("Welcome back!", false);
            log::info!("save loaded");
            state
        }
        Err(e) => {
            log::warn!("save discarded: {}", e);
            if let Err(e) = store.clear() {
                log::warn!("could not clear broken save: {}", e);
            }
            let mut state = FarmState::new();
            state.add_log("⚠️ Save data was unreadable, so the farm starts fresh.", true);
            state
        }
    }
}

/// Write a snapshot. Failures are logged and otherwise ignored.
pub fn save_game(store: &mut dyn SaveStore, state: &FarmState) -> bool {
    let json = match encode(state) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("could not serialize save: {}", e);
            return false;
        }
    };
    match store.save(&json) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("could not write save: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farm::buffs::{Buff, RarityScope};
    use crate::farm::catalog::Rarity;
    use crate::farm::kitchen::CookingJob;
    use crate::farm::state::{FoodKind, InventoryEntry, Stage};

    fn busy_farm(catalog: &Catalog) -> FarmState {
        let mut state = FarmState::new();
        state.ledger.gold = 12_345;
        state.place_plant(0, "rose".into(), 1000, Stage::Adult);
        state.place_plant(7, "sprout".into(), 2000, Stage::Baby);
        state.grid[7].as_mut().unwrap().growth_progress = 1234.5;
        let mut entry = InventoryEntry::empty_for(catalog.get(&"tulip".into()).unwrap());
        entry.count = 4;
        state.ledger.inventory.insert("tulip".into(), entry);
        state.ledger.collection.entry("tulip".into()).or_default().record(500);
        state.ledger.pantry.insert("sunny_tea".into(), 2);
        state.buffs.apply(Buff::RarityBoost {
            target: RarityScope::Only(Rarity::Epic),
            value: 3.0,
            end_time: 90_000,
        });
        state.buffs.apply(Buff::Gold { value: 0.25, end_time: 80_000 });
        state.pity.on_attempt(false);
        state.pity.on_attempt(false);
        state.food = FoodState::start(FoodKind::Long, 1000, 600_000);
        state.upgrades.rarity = 6;
        state.upgrades.growth_speed = 3;
        state.unlocks.statistics = true;
        state.consumables.seed_bomb = 2;
        state.cooking.job = Some(CookingJob {
            dish: "rose_jam".into(),
            started_at: 5000,
            duration_ms: 90_000,
        });
        state.cooking.discovered.insert("mushroom_soup".into());
        state.stats.total_harvested = 77;
        state.last_seen_at = 123_456;
        state
    }

    #[test]
    fn round_trip_preserves_state() {
        let catalog = Catalog::builtin().unwrap();
        let original = busy_farm(&catalog);
        let json = encode(&original).unwrap();
        let restored = decode(&json, &catalog).unwrap();

        assert_eq!(restored.grid, original.grid);
        assert_eq!(restored.ledger, original.ledger);
        assert_eq!(restored.buffs, original.buffs);
        assert_eq!(restored.pity, original.pity);
        assert_eq!(restored.food, original.food);
        assert_eq!(restored.upgrades, original.upgrades);
        assert_eq!(restored.unlocks, original.unlocks);
        assert_eq!(restored.consumables, original.consumables);
        assert_eq!(restored.cooking, original.cooking);
        assert_eq!(restored.stats, original.stats);
        assert_eq!(restored.next_plant_id, original.next_plant_id);
        assert_eq!(restored.last_seen_at, original.last_seen_at);
    }

    #[test]
    fn snapshot_is_flat() {
        let catalog = Catalog::builtin().unwrap();
        let json = encode(&busy_farm(&catalog)).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let map = value.as_object().unwrap();
        for key in ["version", "gold", "plants", "inventory", "buffs", "pity", "food", "upgrades"] {
            assert!(map.contains_key(key), "missing {}", key);
        }
    }

    #[test]
    fn missing_keys_use_defaults() {
        let catalog = Catalog::builtin().unwrap();
        let state = decode(r#"{"version":1,"gold":777}"#, &catalog).unwrap();
        assert_eq!(state.ledger.gold, 777);
        assert_eq!(state.grid.len(), 25);
        assert_eq!(state.upgrades.rarity, 1);
        assert!(!state.food.active);
    }

    #[test]
    fn corrupt_key_does_not_spoil_the_rest() {
        let catalog = Catalog::builtin().unwrap();
        let state = decode(r#"{"version":1,"gold":"lots","pity":4}"#, &catalog).unwrap();
        assert_eq!(state.ledger.gold, tuning::STARTING_GOLD);
        assert_eq!(state.pity.failures(), 4);
    }

    #[test]
    fn wrong_grid_length_resets_grid() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = busy_farm(&catalog);
        state.grid.truncate(10);
        let restored = decode(&encode(&state).unwrap(), &catalog).unwrap();
        assert_eq!(restored.grid.len(), 25);
        assert!(restored.grid.iter().all(|s| s.is_none()));
        // Unrelated fields survive
        assert_eq!(restored.ledger.gold, 12_345);
    }

    #[test]
    fn rarity_level_zero_becomes_one() {
        let catalog = Catalog::builtin().unwrap();
        let state = decode(r#"{"upgrades":{"rarity":0}}"#, &catalog).unwrap();
        assert_eq!(state.upgrades.rarity, 1);
    }

    #[test]
    fn plant_with_largest_id_is_dropped() {
        let catalog = Catalog::builtin().unwrap();
        let plant = r#"{"kind":"sprout","id":18446744073709551615,"stage":"adult","planted_at":0,"growth_progress":60000.0,"growth_duration":60000}"#;
        let mut slots = vec![plant.to_string()];
        slots.extend(std::iter::repeat("null".to_string()).take(24));
        let json = format!(r#"{{"version":1,"plants":[{}]}}"#, slots.join(","));

        let mut state = decode(&json, &catalog).unwrap();
        assert!(state.grid.iter().all(|s| s.is_none()));
        let id = state.allocate_plant_id();
        assert!(id >= 1 && id < u64::MAX);
    }

    #[test]
    fn next_plant_id_stays_above_saved_ids() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = FarmState::new();
        state.place_plant(2, "herb".into(), 0, Stage::Adult);
        state.grid[2].as_mut().unwrap().id = u64::MAX - 1;
        state.next_plant_id = 5;
        let restored = decode(&encode(&state).unwrap(), &catalog).unwrap();
        assert_eq!(restored.next_plant_id, u64::MAX);
    }

    #[test]
    fn far_future_daily_claim_still_loads_and_claims() {
        let catalog = Catalog::builtin().unwrap();
        let json = r#"{"version":1,"daily":{"day":3,"last_claim_day":18446744073709551615}}"#;
        let mut state = decode(json, &catalog).unwrap();
        let now = 20_000 * tuning::MS_PER_DAY;
        assert_eq!(state.daily.next_day(now), 1);
        assert!(crate::farm::daily::claim_daily(&mut state, now).is_ok());
        assert_eq!(state.daily.day, 1);
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let catalog = Catalog::builtin().unwrap();
        let json = r#"{
            "inventory": {"dragonfruit": {"emoji":"🐉","name":"x","rarity":"mythic","value":1,"count":3}},
            "collection": {"dragonfruit": {"discovered": true, "count": 3}},
            "pantry": {"nope": 2, "rose_jam": 1}
        }"#;
        let state = decode(json, &catalog).unwrap();
        assert!(state.ledger.inventory.is_empty());
        assert!(state.ledger.collection.is_empty());
        assert_eq!(state.ledger.dish_count("rose_jam"), 1);
        assert_eq!(state.ledger.dish_count("nope"), 0);
    }

    #[test]
    fn top_level_garbage_is_rejected() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(decode("[1,2,3]", &catalog).unwrap_err(), SnapshotError::NotAnObject);
        assert!(matches!(decode("{not json", &catalog), Err(SnapshotError::Unparsable(_))));
        assert_eq!(
            decode(r#"{"version":0}"#, &catalog).unwrap_err(),
            SnapshotError::IncompatibleVersion { found: 0, min: MIN_COMPATIBLE_VERSION }
        );
    }

    #[test]
    fn load_game_clears_broken_save() {
        let catalog = Catalog::builtin().unwrap();
        let mut store = MemoryStore::with("\"just a string\"");
        let state = load_game(&mut store, &catalog);
        assert_eq!(state.ledger.gold, tuning::STARTING_GOLD);
        assert!(store.contents().is_none());
        assert!(state.log.iter().any(|l| l.is_important));
    }

    #[test]
    fn save_then_load_through_store() {
        let catalog = Catalog::builtin().unwrap();
        let mut store = MemoryStore::new();
        let original = busy_farm(&catalog);
        assert!(save_game(&mut store, &original));
        let loaded = load_game(&mut store, &catalog);
        assert_eq!(loaded.ledger, original.ledger);
        assert_eq!(loaded.grid, original.grid);
    }

    #[test]
    fn empty_store_starts_fresh() {
        let catalog = Catalog::builtin().unwrap();
        let mut store = MemoryStore::new();
        let state = load_game(&mut store, &catalog);
        assert_eq!(state.ledger.gold, tuning::STARTING_GOLD);
        assert_eq!(state.last_seen_at, 0);
    }
}
