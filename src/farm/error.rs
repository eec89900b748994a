//! Error types for the farm.
//!
//! `CatalogError` is a data authoring bug and stops the game at startup.
//! `ActionError` is a command whose precondition did not hold; the state is
//! left exactly as it was. `StoreError` and `SnapshotError` come from the
//! save layer and never reach the simulation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("plant catalog is empty")]
    EmptyCatalog,
    #[error("duplicate plant key `{0}`")]
    DuplicateKey(String),
    #[error("plant `{key}` has a non-positive {field}")]
    NonPositive { key: String, field: &'static str },
    #[error("no plant can spawn at rarity level 1")]
    NothingSpawnable,
    #[error("{context} references unknown plant `{key}`")]
    UnknownPlant { context: String, key: String },
    #[error("weighted candidate set is empty")]
    EmptyCandidates,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("not enough gold (requires {cost})")]
    InsufficientGold { cost: u64 },
    #[error("not enough {item} (have {have}, need {need})")]
    InsufficientStock { item: String, have: u32, need: u32 },
    #[error("slot {0} does not exist")]
    InvalidSlot(usize),
    #[error("nothing ready to harvest in slot {0}")]
    NotHarvestable(usize),
    #[error("unknown item `{0}`")]
    UnknownItem(String),
    #[error("amount must be at least 1")]
    ZeroAmount,
    #[error("nothing to sell")]
    NothingToSell,
    #[error("food is already active")]
    FoodAlreadyActive,
    #[error("no food is active")]
    NoFoodActive,
    #[error("{0} is locked")]
    Locked(&'static str),
    #[error("{0} already unlocked")]
    AlreadyUnlocked(&'static str),
    #[error("{0} is at max level")]
    MaxLevel(&'static str),
    #[error("the kitchen is busy")]
    KitchenBusy,
    #[error("a recipe needs exactly 3 ingredients")]
    WrongIngredientCount,
    #[error("nothing is cooking")]
    NothingCooking,
    #[error("the dish is not ready yet")]
    DishNotReady,
    #[error("no adult plant to harvest")]
    NothingToHarvest,
    #[error("{0} would have no effect")]
    NoEffect(&'static str),
    #[error("quest {0} does not exist")]
    InvalidQuest(usize),
    #[error("achievement {0} is not ready")]
    AchievementNotReady(usize),
    #[error("nothing to claim")]
    NothingToClaim,
    #[error("daily reward already claimed today")]
    AlreadyClaimedToday,
}

/// Failure of the storage backend. Logged; the in-memory state stays
/// authoritative.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A saved snapshot too broken to salvage field by field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("save data is not valid JSON: {0}")]
    Unparsable(String),
    #[error("save data is not a JSON object")]
    NotAnObject,
    #[error("save version {found} is older than the oldest supported version {min}")]
    IncompatibleVersion { found: u32, min: u32 },
}
