//! Lucky box gamble.

use super::error::ActionError;
use super::random::RandomSource;
use super::selector::weighted_index;
use super::state::{ConsumableKind, FarmState};
use super::tuning::LUCKY_BOX_COST;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LuckyOutcome {
    Trash,
    Gold(u64),
    Item(ConsumableKind),
    Jackpot(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Prize {
    Trash,
    Small,
    Big,
    Item,
    Jackpot,
}

const PRIZES: &[(Prize, f64)] = &[
    (Prize::Trash, 35.0),
    (Prize::Small, 35.0),
    (Prize::Big, 20.0),
    (Prize::Item, 8.0),
    (Prize::Jackpot, 2.0),
];

/// Pay for a box and apply whatever comes out.
pub fn open_lucky_box(
    state: &mut FarmState,
    rng: &mut impl RandomSource,
) -> Result<LuckyOutcome, ActionError> {
    state.ledger.spend(LUCKY_BOX_COST)?;

    let weights: Vec<f64> = PRIZES.iter().map(|(_, w)| *w).collect();
    let prize = weighted_index(&weights, rng.roll())
        .map(|i| PRIZES[i].0)
        .unwrap_or(Prize::Trash);
    let outcome = match prize {
        Prize::Trash => LuckyOutcome::Trash,
        Prize::Small => LuckyOutcome::Gold(150),
        Prize::Big => LuckyOutcome::Gold(600),
        Prize::Item => {
            let kinds = ConsumableKind::all();
            LuckyOutcome::Item(kinds[rng.pick(kinds.len())])
        }
        Prize::Jackpot => LuckyOutcome::Jackpot(5000),
    };

    match outcome {
        LuckyOutcome::Trash => state.add_log("🎁 Just some old leaves...", false),
        LuckyOutcome::Gold(g) => {
            state.earn_gold(g);
            state.add_log(&format!("🎁 Found {}G!", g), false);
        }
        LuckyOutcome::Item(kind) => {
            *state.consumables.count_mut(kind) += 1;
            state.add_log(&format!("🎁 Found a {} {}!", kind.emoji(), kind.name()), true);
        }
        LuckyOutcome::Jackpot(g) => {
            state.earn_gold(g);
            state.add_log(&format!("🎰 JACKPOT! +{}G", g), true);
            log::info!("lucky box jackpot");
        }
    }
    Ok(outcome)
}
