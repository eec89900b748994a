//! Weighted random selection.
//!
//! Common plants keep their base weight at every rarity level. Every other
//! plant is scaled by the rarity upgrade and by any rarity boosts covering its
//! tier. Plants whose tier is still gated are left out entirely.

use super::buffs::BuffRegistry;
use super::catalog::{Catalog, PlantType, Rarity};
use super::error::CatalogError;
use super::random::RandomSource;
use super::tuning::rarity_weight_multiplier;

/// Index into `weights` chosen by walking the running total down with `roll`.
///
/// `roll` is uniform in `[0, 1)`. Entries with non-positive weight are never
/// chosen. Returns `None` when no entry has positive weight.
pub fn weighted_index(weights: &[f64], roll: f64) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if !(total > 0.0) {
        return None;
    }

    let mut remaining = roll * total;
    let mut last_positive = None;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        last_positive = Some(i);
        remaining -= w;
        if remaining <= 0.0 {
            return Some(i);
        }
    }
    // Floating point can leave a sliver past the last entry.
    last_positive
}

/// Effective weight of `plant`, or `None` if its tier is gated.
pub fn effective_weight(plant: &PlantType, rarity_level: u32, buffs: &BuffRegistry) -> Option<f64> {
    if !plant.rarity.is_unlocked(rarity_level) {
        return None;
    }
    let weight = match plant.rarity {
        Rarity::Common => plant.base_weight,
        rarity => {
            plant.base_weight
                * rarity_weight_multiplier(rarity_level)
                * buffs.rarity_multiplier(rarity)
        }
    };
    Some(weight)
}

/// Draw one plant type.
pub fn select_plant<'a>(
    catalog: &'a Catalog,
    rarity_level: u32,
    buffs: &BuffRegistry,
    rng: &mut impl RandomSource,
) -> Result<&'a PlantType, CatalogError> {
    let candidates: Vec<(&PlantType, f64)> = catalog
        .plants()
        .iter()
        .filter_map(|p| effective_weight(p, rarity_level, buffs).map(|w| (p, w)))
        .collect();
    let weights: Vec<f64> = candidates.iter().map(|(_, w)| *w).collect();

    weighted_index(&weights, rng.roll())
        .map(|i| candidates[i].0)
        .ok_or(CatalogError::EmptyCandidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farm::buffs::{Buff, RarityScope};
    use crate::farm::random::ScriptedRolls;

    #[test]
    fn weighted_index_walks_in_order() {
        let weights = [1.0, 2.0, 1.0];
        assert_eq!(weighted_index(&weights, 0.0), Some(0));
        assert_eq!(weighted_index(&weights, 0.24), Some(0));
        // 0.25 * 4 = 1.0 → running total hits exactly zero on the first entry
        assert_eq!(weighted_index(&weights, 0.25), Some(0));
        assert_eq!(weighted_index(&weights, 0.26), Some(1));
        assert_eq!(weighted_index(&weights, 0.74), Some(1));
        assert_eq!(weighted_index(&weights, 0.76), Some(2));
        assert_eq!(weighted_index(&weights, 0.999_999), Some(2));
    }

    #[test]
    fn weighted_index_skips_zero_weights() {
        assert_eq!(weighted_index(&[0.0, 3.0, 0.0], 0.0), Some(1));
        assert_eq!(weighted_index(&[0.0, 3.0, 0.0], 0.99), Some(1));
    }

    #[test]
    fn weighted_index_empty_total() {
        assert_eq!(weighted_index(&[], 0.5), None);
        assert_eq!(weighted_index(&[0.0, 0.0], 0.5), None);
    }

    #[test]
    fn gated_tiers_are_excluded() {
        let catalog = Catalog::builtin().unwrap();
        let buffs = BuffRegistry::new();
        let rose = catalog.get(&"rose".into()).unwrap();
        assert_eq!(effective_weight(rose, 4, &buffs), None);
        assert!(effective_weight(rose, 5, &buffs).is_some());
    }

    #[test]
    fn common_weight_is_not_scaled() {
        let catalog = Catalog::builtin().unwrap();
        let mut buffs = BuffRegistry::new();
        buffs.apply(Buff::RarityBoost {
            target: RarityScope::All,
            value: 5.0,
            end_time: u64::MAX,
        });
        let mushroom = catalog.get(&"button_mushroom".into()).unwrap();
        assert_eq!(effective_weight(mushroom, 12, &buffs), Some(100.0));
    }

    #[test]
    fn rare_weight_scales_with_level_and_boost() {
        let catalog = Catalog::builtin().unwrap();
        let mut buffs = BuffRegistry::new();
        buffs.apply(Buff::RarityBoost {
            target: RarityScope::Only(Rarity::Rare),
            value: 2.0,
            end_time: u64::MAX,
        });
        let tulip = catalog.get(&"tulip".into()).unwrap();
        // 30 * (1 + 10 * 0.1) * 2
        let w = effective_weight(tulip, 11, &buffs).unwrap();
        assert!((w - 120.0).abs() < 1e-9);
    }

    #[test]
    fn select_first_and_last() {
        let catalog = Catalog::builtin().unwrap();
        let buffs = BuffRegistry::new();
        let first = select_plant(&catalog, 1, &buffs, &mut ScriptedRolls::new(&[0.0])).unwrap();
        assert_eq!(first.key.as_str(), "button_mushroom");
        let last = select_plant(&catalog, 1, &buffs, &mut ScriptedRolls::new(&[0.999_999])).unwrap();
        // Cactus is the last plant open at level 1.
        assert_eq!(last.key.as_str(), "cactus");
    }

    #[test]
    fn zero_boost_can_empty_the_candidates() {
        use crate::farm::catalog::PlantSpec;
        let specs = [PlantSpec {
            key: "t",
            emoji: "🌷",
            name: "T",
            description: "",
            rarity: Rarity::Rare,
            weight: 1.0,
            value: 1,
        }];
        let catalog = Catalog::from_specs(&specs).unwrap();
        let mut buffs = BuffRegistry::new();
        buffs.apply(Buff::RarityBoost {
            target: RarityScope::All,
            value: 0.0,
            end_time: u64::MAX,
        });
        let result = select_plant(&catalog, 1, &buffs, &mut ScriptedRolls::new(&[0.3]));
        assert_eq!(result.unwrap_err(), CatalogError::EmptyCandidates);
    }
}
