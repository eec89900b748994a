//! Static plant catalog.
//!
//! Plants are identified by a stable [`PlantKey`] slug. The emoji is display
//! only. The catalog is validated once at startup; a bad table is a
//! [`CatalogError`] and the game refuses to run with it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::CatalogError;
use super::kitchen;

/// Ordinal rarity tier, common < rare < epic < legendary < mythic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Mythic => "Mythic",
        }
    }

    /// Rarity level the player needs before this tier can spawn at all.
    pub fn min_level(&self) -> u32 {
        match self {
            Rarity::Common | Rarity::Rare => 1,
            Rarity::Epic => 5,
            Rarity::Legendary => 10,
            Rarity::Mythic => 15,
        }
    }

    pub fn is_unlocked(&self, rarity_level: u32) -> bool {
        rarity_level >= self.min_level()
    }
}

/// Stable identifier of a plant type.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlantKey(String);

impl PlantKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlantKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for PlantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authoring form of a catalog row.
pub struct PlantSpec {
    pub key: &'static str,
    pub emoji: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    pub weight: f64,
    pub value: u64,
}

pub const PLANTS: &[PlantSpec] = &[
    PlantSpec { key: "button_mushroom", emoji: "🍄", name: "Button Mushroom", description: "Pops up wherever there is food.", rarity: Rarity::Common, weight: 100.0, value: 10 },
    PlantSpec { key: "sprout", emoji: "🌱", name: "Sprout", description: "Small, green, hopeful.", rarity: Rarity::Common, weight: 80.0, value: 12 },
    PlantSpec { key: "herb", emoji: "🌿", name: "Wild Herb", description: "Smells faintly of soup.", rarity: Rarity::Common, weight: 70.0, value: 15 },
    PlantSpec { key: "tulip", emoji: "🌷", name: "Tulip", description: "A tidy little cup of petals.", rarity: Rarity::Rare, weight: 30.0, value: 40 },
    PlantSpec { key: "sunflower", emoji: "🌻", name: "Sunflower", description: "Always facing the light.", rarity: Rarity::Rare, weight: 25.0, value: 50 },
    PlantSpec { key: "cactus", emoji: "🌵", name: "Cactus", description: "Prickly but loyal.", rarity: Rarity::Rare, weight: 20.0, value: 60 },
    PlantSpec { key: "rose", emoji: "🌹", name: "Rose", description: "Worth the thorns.", rarity: Rarity::Epic, weight: 8.0, value: 200 },
    PlantSpec { key: "lotus", emoji: "🪷", name: "Lotus", description: "Blooms above still water.", rarity: Rarity::Epic, weight: 6.0, value: 250 },
    PlantSpec { key: "clover", emoji: "🍀", name: "Four-leaf Clover", description: "Luck, in plant form.", rarity: Rarity::Legendary, weight: 2.0, value: 1000 },
    PlantSpec { key: "hibiscus", emoji: "🌺", name: "Hibiscus", description: "A festival in one flower.", rarity: Rarity::Legendary, weight: 1.5, value: 1200 },
    PlantSpec { key: "crystal_bloom", emoji: "🔮", name: "Crystal Bloom", description: "Nobody has seen it grow twice.", rarity: Rarity::Mythic, weight: 0.5, value: 5000 },
];

/// A validated catalog entry.
#[derive(Clone, Debug, PartialEq)]
pub struct PlantType {
    pub key: PlantKey,
    pub emoji: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    pub base_weight: f64,
    pub value: u64,
}

#[derive(Clone, Debug)]
pub struct Catalog {
    plants: Vec<PlantType>,
    index: BTreeMap<PlantKey, usize>,
}

impl Catalog {
    /// The game's own tables, plants plus the recipes that reference them.
    pub fn builtin() -> Result<Self, CatalogError> {
        let catalog = Self::from_specs(PLANTS)?;
        kitchen::validate_recipes(&catalog)?;
        Ok(catalog)
    }

    pub fn from_specs(specs: &[PlantSpec]) -> Result<Self, CatalogError> {
        if specs.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let mut plants = Vec::with_capacity(specs.len());
        let mut index = BTreeMap::new();
        for spec in specs {
            let key = PlantKey::new(spec.key);
            if !(spec.weight > 0.0) || !spec.weight.is_finite() {
                return Err(CatalogError::NonPositive {
                    key: spec.key.to_string(),
                    field: "weight",
                });
            }
            if spec.value == 0 {
                return Err(CatalogError::NonPositive {
                    key: spec.key.to_string(),
                    field: "value",
                });
            }
            if index.insert(key.clone(), plants.len()).is_some() {
                return Err(CatalogError::DuplicateKey(spec.key.to_string()));
            }
            plants.push(PlantType {
                key,
                emoji: spec.emoji,
                name: spec.name,
                description: spec.description,
                rarity: spec.rarity,
                base_weight: spec.weight,
                value: spec.value,
            });
        }

        // The selector must always have something to draw from.
        if !plants.iter().any(|p| p.rarity.is_unlocked(1)) {
            return Err(CatalogError::NothingSpawnable);
        }

        Ok(Self { plants, index })
    }

    /// All plants in stable catalog order.
    pub fn plants(&self) -> &[PlantType] {
        &self.plants
    }

    pub fn get(&self, key: &PlantKey) -> Option<&PlantType> {
        self.index.get(key).map(|&i| &self.plants[i])
    }

    pub fn contains(&self, key: &PlantKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    /// Plants whose rarity gate is open at `rarity_level`.
    pub fn spawnable(&self, rarity_level: u32) -> impl Iterator<Item = &PlantType> {
        self.plants
            .iter()
            .filter(move |p| p.rarity.is_unlocked(rarity_level))
    }
}
