//! Kitchen: three harvested plants go in, a dish comes out after a while.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::buffs::{Buff, BuffEffect, RarityScope};
use super::catalog::{Catalog, PlantKey, Rarity};
use super::economy::sale_value;
use super::error::{ActionError, CatalogError};
use super::state::{ConsumableKind, FarmState};

/// What eating a dish does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DishEffect {
    Buff { effect: BuffEffect, duration_ms: u64 },
    Consumable { kind: ConsumableKind, amount: u32 },
    InstantGrowth,
    Nothing,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Recipe {
    pub key: &'static str,
    pub emoji: &'static str,
    pub name: &'static str,
    pub ingredients: [&'static str; 3],
    pub value: u64,
    pub cook_ms: u64,
    pub effect: DishEffect,
}

impl Recipe {
    pub fn effect_text(&self) -> String {
        match self.effect {
            DishEffect::Buff { effect, duration_ms } => {
                let secs = duration_ms / 1000;
                match effect {
                    BuffEffect::Speed(v) => format!("growth +{:.0}% for {}s", v * 100.0, secs),
                    BuffEffect::Gold(v) => format!("gold +{:.0}% for {}s", v * 100.0, secs),
                    BuffEffect::SpawnRate(v) => format!("spawn +{:.0}% for {}s", v * 100.0, secs),
                    BuffEffect::RarityBoost { target, factor } => {
                        format!("{} rarity x{:.0} for {}s", target.label(), factor, secs)
                    }
                }
            }
            DishEffect::Consumable { kind, amount } => format!("+{} {}", amount, kind.name()),
            DishEffect::InstantGrowth => "all babies grow up".into(),
            DishEffect::Nothing => "no effect".into(),
        }
    }
}

const MINUTE: u64 = 60_000;

pub const RECIPES: &[Recipe] = &[
    Recipe {
        key: "mushroom_soup",
        emoji: "🍲",
        name: "Mushroom Soup",
        ingredients: ["button_mushroom", "button_mushroom", "button_mushroom"],
        value: 50,
        cook_ms: 30_000,
        effect: DishEffect::Buff { effect: BuffEffect::Speed(0.5), duration_ms: 5 * MINUTE },
    },
    Recipe {
        key: "garden_salad",
        emoji: "🥗",
        name: "Garden Salad",
        ingredients: ["button_mushroom", "herb", "sprout"],
        value: 60,
        cook_ms: 30_000,
        effect: DishEffect::Buff { effect: BuffEffect::SpawnRate(0.5), duration_ms: 5 * MINUTE },
    },
    Recipe {
        key: "sunny_tea",
        emoji: "🍵",
        name: "Sunny Tea",
        ingredients: ["sunflower", "sunflower", "tulip"],
        value: 200,
        cook_ms: 60_000,
        effect: DishEffect::Buff { effect: BuffEffect::Gold(0.25), duration_ms: 10 * MINUTE },
    },
    Recipe {
        key: "flower_pie",
        emoji: "🥧",
        name: "Flower Pie",
        ingredients: ["rose", "tulip", "sunflower"],
        value: 400,
        cook_ms: 90_000,
        effect: DishEffect::Buff {
            effect: BuffEffect::RarityBoost { target: RarityScope::All, factor: 2.0 },
            duration_ms: 5 * MINUTE,
        },
    },
    Recipe {
        key: "cactus_taco",
        emoji: "🌮",
        name: "Cactus Taco",
        ingredients: ["cactus", "cactus", "herb"],
        value: 180,
        cook_ms: 60_000,
        effect: DishEffect::Consumable { kind: ConsumableKind::SeedBomb, amount: 1 },
    },
    Recipe {
        key: "lucky_dumpling",
        emoji: "🥟",
        name: "Lucky Dumpling",
        ingredients: ["lotus", "clover", "rose"],
        value: 2000,
        cook_ms: 120_000,
        effect: DishEffect::InstantGrowth,
    },
    Recipe {
        key: "rose_jam",
        emoji: "🍯",
        name: "Rose Jam",
        ingredients: ["rose", "rose", "rose"],
        value: 700,
        cook_ms: 90_000,
        effect: DishEffect::Buff {
            effect: BuffEffect::RarityBoost { target: RarityScope::Only(Rarity::Epic), factor: 3.0 },
            duration_ms: 5 * MINUTE,
        },
    },
];

/// What any unknown combination turns into.
pub const MYSTERY_MUSH: Recipe = Recipe {
    key: "mystery_mush",
    emoji: "🫕",
    name: "Mystery Mush",
    ingredients: ["", "", ""],
    value: 1,
    cook_ms: 10_000,
    effect: DishEffect::Nothing,
};

/// Check that every recipe names real plants and that no two recipes share
/// an ingredient set.
pub fn validate_recipes(catalog: &Catalog) -> Result<(), CatalogError> {
    let mut seen = BTreeSet::new();
    for recipe in RECIPES {
        for ingredient in recipe.ingredients {
            if !catalog.contains(&PlantKey::from(ingredient)) {
                return Err(CatalogError::UnknownPlant {
                    context: format!("recipe `{}`", recipe.key),
                    key: ingredient.to_string(),
                });
            }
        }
        if !seen.insert(sorted(recipe.ingredients)) {
            return Err(CatalogError::DuplicateKey(recipe.key.to_string()));
        }
    }
    Ok(())
}

fn sorted(ingredients: [&'static str; 3]) -> [&'static str; 3] {
    let mut out = ingredients;
    out.sort_unstable();
    out
}

/// Recipe matching an ingredient multiset, or Mystery Mush.
pub fn find_recipe(ingredients: &[PlantKey]) -> &'static Recipe {
    let mut wanted: Vec<&str> = ingredients.iter().map(PlantKey::as_str).collect();
    wanted.sort_unstable();
    RECIPES
        .iter()
        .find(|r| sorted(r.ingredients).as_slice() == wanted.as_slice())
        .unwrap_or(&MYSTERY_MUSH)
}

/// Look up a dish by key, Mystery Mush included.
pub fn recipe(key: &str) -> Option<&'static Recipe> {
    if key == MYSTERY_MUSH.key {
        return Some(&MYSTERY_MUSH);
    }
    RECIPES.iter().find(|r| r.key == key)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookingJob {
    pub dish: String,
    pub started_at: u64,
    pub duration_ms: u64,
}

impl CookingJob {
    pub fn ready_at(&self) -> u64 {
        self.started_at.saturating_add(self.duration_ms)
    }

    pub fn is_ready(&self, now: u64) -> bool {
        now >= self.ready_at()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookingState {
    pub job: Option<CookingJob>,
    /// Recipe keys the player has claimed at least once.
    pub discovered: BTreeSet<String>,
}

pub fn start_cooking(
    state: &mut FarmState,
    ingredients: &[PlantKey],
    now: u64,
) -> Result<&'static Recipe, ActionError> {
    if ingredients.len() != 3 {
        return Err(ActionError::WrongIngredientCount);
    }
    if state.cooking.job.is_some() {
        return Err(ActionError::KitchenBusy);
    }

    // Check the whole multiset before touching the inventory.
    let mut needed: Vec<(&PlantKey, u32)> = Vec::new();
    for key in ingredients {
        match needed.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => needed.push((key, 1)),
        }
    }
    for (key, need) in &needed {
        let have = state.ledger.stock(key);
        if have < *need {
            return Err(ActionError::InsufficientStock {
                item: key.to_string(),
                have,
                need: *need,
            });
        }
    }
    for (key, need) in &needed {
        state.ledger.take_stock(key, *need)?;
    }

    let recipe = find_recipe(ingredients);
    state.cooking.job = Some(CookingJob {
        dish: recipe.key.to_string(),
        started_at: now,
        duration_ms: recipe.cook_ms,
    });
    state.add_log(&format!("🔥 Cooking... ({}s)", recipe.cook_ms / 1000), false);
    log::debug!("cooking {} from {:?}", recipe.key, ingredients);
    Ok(recipe)
}

/// Move a finished dish into the pantry.
pub fn claim_dish(state: &mut FarmState, now: u64) -> Result<&'static Recipe, ActionError> {
    let job = state.cooking.job.as_ref().ok_or(ActionError::NothingCooking)?;
    if !job.is_ready(now) {
        return Err(ActionError::DishNotReady);
    }
    let recipe = recipe(&job.dish).ok_or_else(|| ActionError::UnknownItem(job.dish.clone()))?;

    state.cooking.job = None;
    *state.ledger.pantry.entry(recipe.key.to_string()).or_insert(0) += 1;
    state.stats.dishes_cooked += 1;
    let first = state.cooking.discovered.insert(recipe.key.to_string());
    if first && recipe.key != MYSTERY_MUSH.key {
        state.add_log(&format!("📖 New recipe: {} {}!", recipe.emoji, recipe.name), true);
        log::info!("recipe discovered: {}", recipe.key);
    } else {
        state.add_log(&format!("{} {} is ready", recipe.emoji, recipe.name), false);
    }
    Ok(recipe)
}

/// Eat one dish from the pantry and apply its effect.
pub fn use_dish(state: &mut FarmState, key: &str, now: u64) -> Result<&'static Recipe, ActionError> {
    let recipe = recipe(key).ok_or_else(|| ActionError::UnknownItem(key.to_string()))?;
    let have = state.ledger.dish_count(key);
    if have == 0 {
        return Err(ActionError::InsufficientStock { item: key.to_string(), have, need: 1 });
    }

    match recipe.effect {
        DishEffect::Nothing => return Err(ActionError::NoEffect(recipe.name)),
        DishEffect::InstantGrowth if state.baby_count() == 0 => {
            return Err(ActionError::NoEffect(recipe.name))
        }
        DishEffect::InstantGrowth => {
            let n = state.mature_all_babies();
            state.add_log(&format!("{} {} plants grew up at once!", recipe.emoji, n), true);
        }
        DishEffect::Buff { effect, duration_ms } => {
            state.expire_buffs(now);
            let started = Buff::start(effect, now, duration_ms);
            let text = started.description();
            if state.buffs.apply(started).is_some() {
                state.add_log(&format!("{} refreshed: {}", recipe.name, text), false);
            } else {
                state.add_log(&format!("{} {}", recipe.emoji, text), true);
            }
        }
        DishEffect::Consumable { kind, amount } => {
            let count = state.consumables.count_mut(kind);
            *count = count.saturating_add(amount);
            state.add_log(&format!("{} +{} {}", recipe.emoji, amount, kind.name()), false);
        }
    }

    state.ledger.take_dish(key, 1)?;
    Ok(recipe)
}

/// Sell dishes from the pantry. Returns the gold credited.
pub fn sell_dish(state: &mut FarmState, key: &str, amount: u32, now: u64) -> Result<u64, ActionError> {
    if amount == 0 {
        return Err(ActionError::ZeroAmount);
    }
    let recipe = recipe(key).ok_or_else(|| ActionError::UnknownItem(key.to_string()))?;
    state.ledger.take_dish(key, amount)?;
    state.expire_buffs(now);
    let gold = sale_value(recipe.value, amount, state.buffs.gold_multiplier());
    state.earn_gold(gold);
    state.stats.total_sold += amount as u64;
    state.add_log(&format!("Sold {}x {} for {}G", amount, recipe.name, gold), false);
    Ok(gold)
}
