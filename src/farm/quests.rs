//! NPC request board.

use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, PlantKey, Rarity};
use super::error::ActionError;
use super::kitchen::{self, RECIPES};
use super::random::RandomSource;
use super::state::FarmState;
use super::tuning::{QUEST_BOARD_SIZE, QUEST_REFRESH_COST, QUEST_REFRESH_MS};

/// (emoji, name) of the villagers who post requests.
pub const NPCS: &[(&str, &str)] = &[
    ("👵", "Grandma Rose"),
    ("🧑‍🍳", "Chef Basil"),
    ("🧙", "Old Sage"),
    ("👧", "Little Fern"),
    ("🧔", "Farmer Oak"),
];

/// Chance that a fresh quest asks for a dish instead of a plant.
const DISH_QUEST_CHANCE: f64 = 0.25;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestTarget {
    Plant { key: PlantKey },
    Dish { key: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub npc: usize,
    pub target: QuestTarget,
    pub count: u32,
    pub reward: u64,
}

impl Quest {
    pub fn npc_label(&self) -> String {
        let (emoji, name) = NPCS.get(self.npc).copied().unwrap_or(("🙂", "Villager"));
        format!("{} {}", emoji, name)
    }

    pub fn target_label(&self, catalog: &Catalog) -> String {
        match &self.target {
            QuestTarget::Plant { key } => match catalog.get(key) {
                Some(p) => format!("{} {}", p.emoji, p.name),
                None => key.to_string(),
            },
            QuestTarget::Dish { key } => match kitchen::recipe(key) {
                Some(r) => format!("{} {}", r.emoji, r.name),
                None => key.clone(),
            },
        }
    }

    /// Whether the ledger holds enough to hand this quest in.
    pub fn can_complete(&self, state: &FarmState) -> bool {
        held(state, &self.target) >= self.count
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestBoard {
    pub quests: Vec<Quest>,
    /// Board regenerates once `now` reaches this.
    pub next_refresh_at: u64,
}

fn held(state: &FarmState, target: &QuestTarget) -> u32 {
    match target {
        QuestTarget::Plant { key } => state.ledger.stock(key),
        QuestTarget::Dish { key } => state.ledger.dish_count(key),
    }
}

/// `2 * value * count`, plus half again for dishes.
pub fn quest_reward(value: u64, count: u32, is_dish: bool) -> u64 {
    let base = 2 * value * count as u64;
    if is_dish {
        base + base / 2
    } else {
        base
    }
}

/// Roll one quest that can be fulfilled at `rarity_level`.
pub fn generate_quest(catalog: &Catalog, rarity_level: u32, rng: &mut impl RandomSource) -> Quest {
    let npc = rng.pick(NPCS.len());

    // Only dishes whose every ingredient can spawn right now.
    let dishes: Vec<&kitchen::Recipe> = RECIPES
        .iter()
        .filter(|r| {
            r.ingredients.iter().all(|i| {
                catalog
                    .get(&PlantKey::from(*i))
                    .is_some_and(|p| p.rarity.is_unlocked(rarity_level))
            })
        })
        .collect();
    if !dishes.is_empty() && rng.roll() < DISH_QUEST_CHANCE {
        let recipe = dishes[rng.pick(dishes.len())];
        return Quest {
            npc,
            target: QuestTarget::Dish { key: recipe.key.to_string() },
            count: 1,
            reward: quest_reward(recipe.value, 1, true),
        };
    }

    let plants: Vec<_> = catalog.spawnable(rarity_level).collect();
    let plant = plants[rng.pick(plants.len())];
    let (min, max) = match plant.rarity {
        Rarity::Common => (3, 8),
        Rarity::Rare => (2, 4),
        _ => (1, 2),
    };
    let count = min + rng.pick((max - min + 1) as usize) as u32;
    Quest {
        npc,
        target: QuestTarget::Plant { key: plant.key.clone() },
        count,
        reward: quest_reward(plant.value, count, false),
    }
}

fn regenerate(state: &mut FarmState, catalog: &Catalog, now: u64, rng: &mut impl RandomSource) {
    let level = state.upgrades.rarity;
    state.quests.quests = (0..QUEST_BOARD_SIZE)
        .map(|_| generate_quest(catalog, level, rng))
        .collect();
    state.quests.next_refresh_at = now.saturating_add(QUEST_REFRESH_MS);
}

/// Regenerate the board if its timer has run out. Returns true if it did.
pub fn refresh_if_due(
    state: &mut FarmState,
    catalog: &Catalog,
    now: u64,
    rng: &mut impl RandomSource,
) -> bool {
    if now < state.quests.next_refresh_at {
        return false;
    }
    let first = state.quests.quests.is_empty();
    regenerate(state, catalog, now, rng);
    if !first {
        state.add_log("📜 New requests on the quest board", false);
    }
    true
}

/// Pay to regenerate the board now.
pub fn refresh_quests(
    state: &mut FarmState,
    catalog: &Catalog,
    now: u64,
    rng: &mut impl RandomSource,
) -> Result<(), ActionError> {
    state.ledger.spend(QUEST_REFRESH_COST)?;
    regenerate(state, catalog, now, rng);
    state.add_log("📜 Quest board refreshed", false);
    Ok(())
}

/// Hand in quest `index`. Returns the reward.
pub fn complete_quest(
    state: &mut FarmState,
    catalog: &Catalog,
    index: usize,
    rng: &mut impl RandomSource,
) -> Result<u64, ActionError> {
    let quest = state
        .quests
        .quests
        .get(index)
        .cloned()
        .ok_or(ActionError::InvalidQuest(index))?;
    let have = held(state, &quest.target);
    if have < quest.count {
        let item = match &quest.target {
            QuestTarget::Plant { key } => key.to_string(),
            QuestTarget::Dish { key } => key.clone(),
        };
        return Err(ActionError::InsufficientStock { item, have, need: quest.count });
    }

    match &quest.target {
        QuestTarget::Plant { key } => {
            state.ledger.take_stock(key, quest.count)?;
        }
        QuestTarget::Dish { key } => state.ledger.take_dish(key, quest.count)?,
    }
    state.earn_gold(quest.reward);
    state.stats.quests_completed += 1;
    state.quests.quests[index] = generate_quest(catalog, state.upgrades.rarity, rng);
    state.add_log(
        &format!("🎉 {} is delighted! +{}G", quest.npc_label(), quest.reward),
        true,
    );
    log::info!("quest {} completed for {}G", index, quest.reward);
    Ok(quest.reward)
}
