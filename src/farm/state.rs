//! Plant farm game state definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::achievements::AchievementBook;
use super::buffs::BuffRegistry;
use super::catalog::{PlantKey, PlantType, Rarity};
use super::daily::DailyStreak;
use super::error::ActionError;
use super::kitchen::CookingState;
use super::pity::PityCounter;
use super::quests::QuestBoard;
use super::tuning;

/// Lifecycle stage of a plant in a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Baby,
    Adult,
}

/// A plant living in one grid slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub kind: PlantKey,
    pub id: u64,
    pub stage: Stage,
    pub planted_at: u64,
    /// Accumulated growth in milliseconds.
    pub growth_progress: f64,
    /// Growth required to become an adult, in milliseconds.
    pub growth_duration: u64,
}

impl Plant {
    pub fn baby(kind: PlantKey, id: u64, now: u64, growth_duration: u64) -> Self {
        Self {
            kind,
            id,
            stage: Stage::Baby,
            planted_at: now,
            growth_progress: 0.0,
            growth_duration,
        }
    }

    pub fn adult(kind: PlantKey, id: u64, now: u64, growth_duration: u64) -> Self {
        Self {
            kind,
            id,
            stage: Stage::Adult,
            planted_at: now,
            growth_progress: growth_duration as f64,
            growth_duration,
        }
    }

    pub fn is_adult(&self) -> bool {
        self.stage == Stage::Adult
    }

    /// Add growth and promote to adult once the duration is reached.
    /// Returns true if this call promoted the plant.
    pub fn grow(&mut self, amount_ms: f64) -> bool {
        if self.stage != Stage::Baby || amount_ms <= 0.0 {
            return false;
        }
        self.growth_progress += amount_ms;
        if self.growth_progress >= self.growth_duration as f64 {
            self.mature();
            return true;
        }
        false
    }

    /// Force adulthood; progress is clamped to the duration.
    pub fn mature(&mut self) {
        self.stage = Stage::Adult;
        self.growth_progress = self.growth_duration as f64;
    }

    /// Growth fraction in `[0, 1]`.
    pub fn progress_ratio(&self) -> f64 {
        if self.growth_duration == 0 {
            return 1.0;
        }
        (self.growth_progress / self.growth_duration as f64).clamp(0.0, 1.0)
    }
}

// ── Food ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodKind {
    Free,
    Speed,
    Normal,
    Long,
}

impl FoodKind {
    pub fn all() -> &'static [FoodKind] {
        &[FoodKind::Free, FoodKind::Speed, FoodKind::Normal, FoodKind::Long]
    }

    pub fn name(&self) -> &'static str {
        match self {
            FoodKind::Free => "Free Scraps",
            FoodKind::Speed => "Speed Feed",
            FoodKind::Normal => "Plain Feed",
            FoodKind::Long => "Slow Compost",
        }
    }

    pub fn base_duration_ms(&self) -> u64 {
        match self {
            FoodKind::Free => 180_000,
            FoodKind::Speed => 60_000,
            FoodKind::Normal => 300_000,
            FoodKind::Long => 600_000,
        }
    }

    /// Growth and spawn multiplier while this food is active.
    pub fn multiplier(&self) -> f64 {
        match self {
            FoodKind::Free => 0.5,
            FoodKind::Speed => 2.0,
            FoodKind::Normal => 1.0,
            FoodKind::Long => 0.7,
        }
    }

    pub fn cost(&self) -> u64 {
        match self {
            FoodKind::Free => 0,
            FoodKind::Speed => 200,
            FoodKind::Normal => 150,
            FoodKind::Long => 350,
        }
    }
}

/// Only one food can be active; without food nothing spawns or grows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodState {
    pub active: bool,
    pub end_time: u64,
    pub kind: Option<FoodKind>,
    pub multiplier: f64,
}

impl Default for FoodState {
    fn default() -> Self {
        Self {
            active: false,
            end_time: 0,
            kind: None,
            multiplier: 1.0,
        }
    }
}

impl FoodState {
    pub fn start(kind: FoodKind, now: u64, duration_ms: u64) -> Self {
        Self {
            active: true,
            end_time: now.saturating_add(duration_ms),
            kind: Some(kind),
            multiplier: kind.multiplier(),
        }
    }

    pub fn remaining_ms(&self, now: u64) -> u64 {
        if self.active {
            self.end_time.saturating_sub(now)
        } else {
            0
        }
    }
}

// ── Upgrades ────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeKind {
    GrowthSpeed,
    Rarity,
    Fertilizer,
    LandCapacity,
}

impl UpgradeKind {
    pub fn all() -> &'static [UpgradeKind] {
        &[
            UpgradeKind::GrowthSpeed,
            UpgradeKind::Rarity,
            UpgradeKind::Fertilizer,
            UpgradeKind::LandCapacity,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            UpgradeKind::GrowthSpeed => "Growth Speed",
            UpgradeKind::Rarity => "Rarity",
            UpgradeKind::Fertilizer => "Fertilizer",
            UpgradeKind::LandCapacity => "Land",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UpgradeKind::GrowthSpeed => "new plants mature 3s sooner",
            UpgradeKind::Rarity => "rarer plants show up more often",
            UpgradeKind::Fertilizer => "food lasts 10% longer",
            UpgradeKind::LandCapacity => "5 more slots",
        }
    }

    pub fn max_level(&self) -> Option<u32> {
        match self {
            UpgradeKind::GrowthSpeed | UpgradeKind::Fertilizer => None,
            UpgradeKind::Rarity => Some(tuning::MAX_RARITY_LEVEL),
            UpgradeKind::LandCapacity => Some(tuning::MAX_LAND_LEVEL),
        }
    }

    pub fn cost(&self, level: u32) -> u64 {
        match self {
            UpgradeKind::GrowthSpeed => tuning::growth_speed_cost(level),
            UpgradeKind::Rarity => tuning::rarity_cost(level),
            UpgradeKind::Fertilizer => tuning::fertilizer_cost(level),
            UpgradeKind::LandCapacity => tuning::land_capacity_cost(level),
        }
    }
}

/// Purchased upgrade levels. Never decrease.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub growth_speed: u32,
    /// Starts at 1.
    pub rarity: u32,
    pub fertilizer: u32,
    pub land_capacity: u32,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            growth_speed: 0,
            rarity: 1,
            fertilizer: 0,
            land_capacity: 0,
        }
    }
}

impl Upgrades {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::GrowthSpeed => self.growth_speed,
            UpgradeKind::Rarity => self.rarity,
            UpgradeKind::Fertilizer => self.fertilizer,
            UpgradeKind::LandCapacity => self.land_capacity,
        }
    }

    pub fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::GrowthSpeed => &mut self.growth_speed,
            UpgradeKind::Rarity => &mut self.rarity,
            UpgradeKind::Fertilizer => &mut self.fertilizer,
            UpgradeKind::LandCapacity => &mut self.land_capacity,
        }
    }
}

// ── Unlocks & consumables ───────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unlock {
    Statistics,
    HarvestAll,
}

impl Unlock {
    pub fn all() -> &'static [Unlock] {
        &[Unlock::Statistics, Unlock::HarvestAll]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Unlock::Statistics => "Statistics",
            Unlock::HarvestAll => "Harvest All",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Unlocks {
    pub statistics: bool,
    pub harvest_all: bool,
}

impl Unlocks {
    pub fn has(&self, unlock: Unlock) -> bool {
        match unlock {
            Unlock::Statistics => self.statistics,
            Unlock::HarvestAll => self.harvest_all,
        }
    }

    pub fn set(&mut self, unlock: Unlock) {
        match unlock {
            Unlock::Statistics => self.statistics = true,
            Unlock::HarvestAll => self.harvest_all = true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsumableKind {
    SeedBomb,
    GrowthPotion,
}

impl ConsumableKind {
    pub fn all() -> &'static [ConsumableKind] {
        &[ConsumableKind::SeedBomb, ConsumableKind::GrowthPotion]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConsumableKind::SeedBomb => "Seed Bomb",
            ConsumableKind::GrowthPotion => "Growth Potion",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ConsumableKind::SeedBomb => "💣",
            ConsumableKind::GrowthPotion => "🧪",
        }
    }

    pub fn cost(&self) -> u64 {
        match self {
            ConsumableKind::SeedBomb => 2000,
            ConsumableKind::GrowthPotion => 800,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Consumables {
    pub seed_bomb: u32,
    pub growth_potion: u32,
}

impl Consumables {
    pub fn count(&self, kind: ConsumableKind) -> u32 {
        match kind {
            ConsumableKind::SeedBomb => self.seed_bomb,
            ConsumableKind::GrowthPotion => self.growth_potion,
        }
    }

    pub fn count_mut(&mut self, kind: ConsumableKind) -> &mut u32 {
        match kind {
            ConsumableKind::SeedBomb => &mut self.seed_bomb,
            ConsumableKind::GrowthPotion => &mut self.growth_potion,
        }
    }
}

// ── Ledger ──────────────────────────────────────────────────────

/// A stack of harvested plants with the metadata needed to sell it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub emoji: String,
    pub name: String,
    pub rarity: Rarity,
    pub value: u64,
    pub count: u32,
}

impl InventoryEntry {
    pub fn empty_for(plant: &PlantType) -> Self {
        Self {
            emoji: plant.emoji.to_string(),
            name: plant.name.to_string(),
            rarity: plant.rarity,
            value: plant.value,
            count: 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionEntry {
    pub discovered: bool,
    pub count: u32,
    pub first_discovered_at: Option<u64>,
}

impl CollectionEntry {
    /// Count one more harvest, stamping the discovery time the first time.
    pub fn record(&mut self, now: u64) -> bool {
        let first = !self.discovered;
        if first {
            self.discovered = true;
            self.first_discovered_at = Some(now);
        }
        self.count = self.count.saturating_add(1);
        first
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ledger {
    pub gold: u64,
    pub inventory: BTreeMap<PlantKey, InventoryEntry>,
    pub collection: BTreeMap<PlantKey, CollectionEntry>,
    /// Cooked dishes by recipe output key.
    pub pantry: BTreeMap<String, u32>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            gold: tuning::STARTING_GOLD,
            inventory: BTreeMap::new(),
            collection: BTreeMap::new(),
            pantry: BTreeMap::new(),
        }
    }
}

impl Ledger {
    /// Take `cost` gold or fail without touching the balance.
    pub fn spend(&mut self, cost: u64) -> Result<(), ActionError> {
        if self.gold < cost {
            return Err(ActionError::InsufficientGold { cost });
        }
        self.gold -= cost;
        Ok(())
    }

    pub fn stock(&self, key: &PlantKey) -> u32 {
        self.inventory.get(key).map_or(0, |e| e.count)
    }

    pub fn dish_count(&self, key: &str) -> u32 {
        self.pantry.get(key).copied().unwrap_or(0)
    }

    /// Remove `amount` of a plant, dropping the entry at zero.
    pub fn take_stock(&mut self, key: &PlantKey, amount: u32) -> Result<InventoryEntry, ActionError> {
        let have = self.stock(key);
        if have < amount || have == 0 {
            return Err(ActionError::InsufficientStock {
                item: key.to_string(),
                have,
                need: amount,
            });
        }
        let entry = self
            .inventory
            .get_mut(key)
            .ok_or_else(|| ActionError::UnknownItem(key.to_string()))?;
        entry.count -= amount;
        let snapshot = entry.clone();
        if entry.count == 0 {
            self.inventory.remove(key);
        }
        Ok(snapshot)
    }

    pub fn take_dish(&mut self, key: &str, amount: u32) -> Result<(), ActionError> {
        let have = self.dish_count(key);
        if have < amount || have == 0 {
            return Err(ActionError::InsufficientStock {
                item: key.to_string(),
                have,
                need: amount,
            });
        }
        if have == amount {
            self.pantry.remove(key);
        } else {
            self.pantry.insert(key.to_string(), have - amount);
        }
        Ok(())
    }

    pub fn discovered_count(&self) -> usize {
        self.collection.values().filter(|c| c.discovered).count()
    }
}

/// Lifetime counters that achievements read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_harvested: u64,
    pub total_gold_earned: u64,
    pub total_sold: u64,
    pub dishes_cooked: u64,
    pub quests_completed: u64,
    pub spawns: u64,
}

/// Log entry for the farm game.
#[derive(Clone, Debug)]
pub struct FarmLogEntry {
    pub text: String,
    pub is_important: bool,
}

const LOG_CAPACITY: usize = 50;

/// Full state of a plant farm.
#[derive(Clone, Debug)]
pub struct FarmState {
    /// One entry per slot; `None` is an empty slot.
    pub grid: Vec<Option<Plant>>,
    pub ledger: Ledger,
    pub buffs: BuffRegistry,
    pub pity: PityCounter,
    pub food: FoodState,
    pub upgrades: Upgrades,
    pub unlocks: Unlocks,
    pub consumables: Consumables,
    pub cooking: CookingState,
    pub quests: QuestBoard,
    pub achievements: AchievementBook,
    pub daily: DailyStreak,
    pub stats: Stats,
    pub next_plant_id: u64,
    /// Last time the simulation observed the clock (0 = never).
    pub last_seen_at: u64,
    pub log: Vec<FarmLogEntry>,
}

impl FarmState {
    pub fn new() -> Self {
        Self {
            grid: vec![None; tuning::slot_capacity(0)],
            ledger: Ledger::default(),
            buffs: BuffRegistry::new(),
            pity: PityCounter::new(),
            food: FoodState::default(),
            upgrades: Upgrades::default(),
            unlocks: Unlocks::default(),
            consumables: Consumables::default(),
            cooking: CookingState::default(),
            quests: QuestBoard::default(),
            achievements: AchievementBook::default(),
            daily: DailyStreak::default(),
            stats: Stats::default(),
            next_plant_id: 1,
            last_seen_at: 0,
            log: vec![FarmLogEntry {
                text: "Welcome to the farm! Put out some food to get things growing.".into(),
                is_important: true,
            }],
        }
    }

    pub fn capacity(&self) -> usize {
        tuning::slot_capacity(self.upgrades.land_capacity)
    }

    /// Grow the grid to the current capacity. Never shrinks.
    pub fn ensure_capacity(&mut self) {
        let capacity = self.capacity();
        if self.grid.len() < capacity {
            self.grid.resize(capacity, None);
        }
    }

    pub fn empty_slots(&self) -> Vec<usize> {
        self.grid
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn adult_count(&self) -> usize {
        self.grid.iter().flatten().filter(|p| p.is_adult()).count()
    }

    pub fn baby_count(&self) -> usize {
        self.grid.iter().flatten().filter(|p| !p.is_adult()).count()
    }

    /// Hand out a fresh plant id.
    pub fn allocate_plant_id(&mut self) -> u64 {
        let id = self.next_plant_id;
        self.next_plant_id = self.next_plant_id.wrapping_add(1).max(1);
        id
    }

    /// Put a new plant of `kind` into the empty `slot`.
    pub fn place_plant(&mut self, slot: usize, kind: PlantKey, now: u64, stage: Stage) {
        let duration = tuning::growth_duration_ms(self.upgrades.growth_speed);
        let id = self.allocate_plant_id();
        let plant = match stage {
            Stage::Baby => Plant::baby(kind, id, now, duration),
            Stage::Adult => Plant::adult(kind, id, now, duration),
        };
        if let Some(cell) = self.grid.get_mut(slot) {
            *cell = Some(plant);
            self.stats.spawns += 1;
        }
    }

    /// Promote every baby to adult. Returns how many matured.
    pub fn mature_all_babies(&mut self) -> usize {
        let mut matured = 0;
        for plant in self.grid.iter_mut().flatten() {
            if !plant.is_adult() {
                plant.mature();
                matured += 1;
            }
        }
        matured
    }

    /// Drop buffs that ran out by `now`, noting each one in the log.
    /// Returns how many expired.
    pub fn expire_buffs(&mut self, now: u64) -> usize {
        let expired = self.buffs.expire_stale(now);
        for buff in &expired {
            self.add_log(&format!("{} wore off", buff.description()), false);
        }
        expired.len()
    }

    /// Credit gold that counts toward lifetime earnings.
    pub fn earn_gold(&mut self, amount: u64) {
        self.ledger.gold = self.ledger.gold.saturating_add(amount);
        self.stats.total_gold_earned = self.stats.total_gold_earned.saturating_add(amount);
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(FarmLogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > LOG_CAPACITY {
            self.log.remove(0);
        }
    }
}

impl Default for FarmState {
    fn default() -> Self {
        Self::new()
    }
}
