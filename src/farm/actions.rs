//! Semantic action IDs for plant farm click targets.
//!
//! Render registers these against screen rows; `FarmGame::handle_click`
//! turns them back into commands. `*_BASE` ids are offset by a list index.

// ── Tab navigation ──────────────────────────────────────────────
pub const TAB_FARM: u16 = 10;
pub const TAB_INVENTORY: u16 = 11;
pub const TAB_SHOP: u16 = 12;
pub const TAB_KITCHEN: u16 = 13;
pub const TAB_QUESTS: u16 = 14;
pub const TAB_COLLECTION: u16 = 15;
pub const TAB_STATS: u16 = 16;

// ── Farm ────────────────────────────────────────────────────────
/// + slot index.
pub const HARVEST_SLOT_BASE: u16 = 100;
pub const HARVEST_ALL: u16 = 90;
pub const GRID_SCROLL_UP: u16 = 91;
pub const GRID_SCROLL_DOWN: u16 = 92;

// ── Inventory (+ display index) ─────────────────────────────────
pub const SELL_ONE_BASE: u16 = 200;
pub const SELL_STACK_BASE: u16 = 300;
pub const SELL_ALL: u16 = 399;

// ── Shop ────────────────────────────────────────────────────────
/// + `UpgradeKind::all()` index.
pub const BUY_UPGRADE_BASE: u16 = 400;
/// + `Unlock::all()` index.
pub const BUY_UNLOCK_BASE: u16 = 420;
/// + `FoodKind::all()` index.
pub const ACTIVATE_FOOD_BASE: u16 = 450;
pub const CANCEL_FOOD: u16 = 460;
/// + `ConsumableKind::all()` index.
pub const BUY_CONSUMABLE_BASE: u16 = 470;
pub const USE_CONSUMABLE_BASE: u16 = 480;
pub const LUCKY_BOX: u16 = 490;
pub const DAILY_REWARD: u16 = 491;

// ── Kitchen ─────────────────────────────────────────────────────
/// + inventory display index: add one unit to the pot.
pub const KITCHEN_ADD_BASE: u16 = 500;
pub const KITCHEN_CLEAR: u16 = 590;
pub const START_COOKING: u16 = 591;
pub const CLAIM_DISH: u16 = 592;
/// + pantry display index.
pub const USE_DISH_BASE: u16 = 600;
pub const SELL_DISH_BASE: u16 = 650;

// ── Quests & achievements ───────────────────────────────────────
pub const COMPLETE_QUEST_BASE: u16 = 700;
pub const REFRESH_QUESTS: u16 = 710;
pub const CLAIM_ACHIEVEMENT_BASE: u16 = 720;
pub const CLAIM_ALL_ACHIEVEMENTS: u16 = 799;
