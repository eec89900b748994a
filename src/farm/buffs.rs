//! Time-bounded modifiers and their aggregation.
//!
//! At most one buff exists per [`BuffSlot`]; applying another buff to the same
//! slot replaces it. Expired buffs are removed lazily by
//! [`BuffRegistry::expire_stale`], which the tick runs before anything reads
//! an aggregate.

use serde::{Deserialize, Serialize};

use super::catalog::Rarity;

/// Which rarities a rarity boost applies to. Common plants are never boosted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RarityScope {
    All,
    Only(Rarity),
}

impl RarityScope {
    pub fn covers(&self, rarity: Rarity) -> bool {
        match self {
            RarityScope::All => rarity != Rarity::Common,
            RarityScope::Only(r) => *r == rarity,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RarityScope::All => "all",
            RarityScope::Only(r) => r.name(),
        }
    }
}

/// Effect channel a buff feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuffKind {
    Speed,
    Gold,
    SpawnRate,
    RarityBoost,
}

/// Replacement key: one live buff per slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuffSlot {
    Speed,
    Gold,
    SpawnRate,
    RarityBoost(RarityScope),
}

/// A buff before it is started, as carried by dishes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BuffEffect {
    /// Additive growth-speed bonus (0.5 = +50%).
    Speed(f64),
    /// Additive gold bonus on sales.
    Gold(f64),
    /// Additive spawn-chance bonus.
    SpawnRate(f64),
    /// Multiplicative weight factor for the targeted rarities.
    RarityBoost { target: RarityScope, factor: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Buff {
    Speed { value: f64, end_time: u64 },
    Gold { value: f64, end_time: u64 },
    SpawnRate { value: f64, end_time: u64 },
    RarityBoost { target: RarityScope, value: f64, end_time: u64 },
}

impl Buff {
    /// Start `effect` at `now` for `duration_ms`.
    pub fn start(effect: BuffEffect, now: u64, duration_ms: u64) -> Self {
        let end_time = now.saturating_add(duration_ms);
        match effect {
            BuffEffect::Speed(value) => Buff::Speed { value, end_time },
            BuffEffect::Gold(value) => Buff::Gold { value, end_time },
            BuffEffect::SpawnRate(value) => Buff::SpawnRate { value, end_time },
            BuffEffect::RarityBoost { target, factor } => Buff::RarityBoost {
                target,
                value: factor,
                end_time,
            },
        }
    }

    pub fn end_time(&self) -> u64 {
        match self {
            Buff::Speed { end_time, .. }
            | Buff::Gold { end_time, .. }
            | Buff::SpawnRate { end_time, .. }
            | Buff::RarityBoost { end_time, .. } => *end_time,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Buff::Speed { value, .. }
            | Buff::Gold { value, .. }
            | Buff::SpawnRate { value, .. }
            | Buff::RarityBoost { value, .. } => *value,
        }
    }

    pub fn kind(&self) -> BuffKind {
        match self {
            Buff::Speed { .. } => BuffKind::Speed,
            Buff::Gold { .. } => BuffKind::Gold,
            Buff::SpawnRate { .. } => BuffKind::SpawnRate,
            Buff::RarityBoost { .. } => BuffKind::RarityBoost,
        }
    }

    pub fn slot(&self) -> BuffSlot {
        match self {
            Buff::Speed { .. } => BuffSlot::Speed,
            Buff::Gold { .. } => BuffSlot::Gold,
            Buff::SpawnRate { .. } => BuffSlot::SpawnRate,
            Buff::RarityBoost { target, .. } => BuffSlot::RarityBoost(*target),
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.end_time() <= now
    }

    pub fn description(&self) -> String {
        match self {
            Buff::Speed { value, .. } => format!("⚡ Growth +{:.0}%", value * 100.0),
            Buff::Gold { value, .. } => format!("💰 Gold +{:.0}%", value * 100.0),
            Buff::SpawnRate { value, .. } => format!("🎲 Spawn +{:.0}%", value * 100.0),
            Buff::RarityBoost { target, value, .. } => {
                format!("✨ {} x{:.1}", target.label(), value)
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuffRegistry {
    buffs: Vec<Buff>,
}

impl BuffRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `buff`, replacing any live buff in the same slot.
    /// Returns the buff that was replaced.
    pub fn apply(&mut self, buff: Buff) -> Option<Buff> {
        let slot = buff.slot();
        match self.buffs.iter().position(|b| b.slot() == slot) {
            Some(i) => Some(std::mem::replace(&mut self.buffs[i], buff)),
            None => {
                self.buffs.push(buff);
                None
            }
        }
    }

    /// Drop every buff with `end_time <= now`, returning what was removed.
    pub fn expire_stale(&mut self, now: u64) -> Vec<Buff> {
        let (expired, live): (Vec<Buff>, Vec<Buff>) =
            self.buffs.drain(..).partition(|b| b.is_expired(now));
        self.buffs = live;
        expired
    }

    /// Multiplier for a channel: `1 + sum` for speed and spawn rate, `1 + value`
    /// of the single gold buff, and the product of `All`-scoped factors for
    /// rarity boosts.
    pub fn aggregate(&self, kind: BuffKind) -> f64 {
        match kind {
            BuffKind::Speed | BuffKind::SpawnRate => {
                1.0 + self
                    .buffs
                    .iter()
                    .filter(|b| b.kind() == kind)
                    .map(Buff::value)
                    .sum::<f64>()
            }
            BuffKind::Gold => self
                .buffs
                .iter()
                .find(|b| b.kind() == BuffKind::Gold)
                .map_or(1.0, |b| 1.0 + b.value()),
            BuffKind::RarityBoost => self
                .buffs
                .iter()
                .filter_map(|b| match b {
                    Buff::RarityBoost {
                        target: RarityScope::All,
                        value,
                        ..
                    } => Some(*value),
                    _ => None,
                })
                .product(),
        }
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.aggregate(BuffKind::Speed)
    }

    pub fn spawn_rate_multiplier(&self) -> f64 {
        self.aggregate(BuffKind::SpawnRate)
    }

    pub fn gold_multiplier(&self) -> f64 {
        self.aggregate(BuffKind::Gold)
    }

    /// Product of every rarity boost whose scope covers `rarity`.
    pub fn rarity_multiplier(&self, rarity: Rarity) -> f64 {
        self.buffs
            .iter()
            .filter_map(|b| match b {
                Buff::RarityBoost { target, value, .. } if target.covers(rarity) => Some(*value),
                _ => None,
            })
            .product()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buff> {
        self.buffs.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }
}
