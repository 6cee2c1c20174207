//! Scoring engine.
//!
//! The contract is the application order. Score = chips x mult where:
//!
//! 1. The hand evaluation seeds (chips, mult) at the category's level.
//! 2. Each scoring card's modifier effect fires in played order,
//!    repeated `1 + retrigger` times (Red seal). Within one
//!    application: chips, then +mult, then x mult, then money.
//! 3. Steel cards held in hand multiply mult by 1.5 each.
//! 4. Each joker fires in hold order and sees the running totals left
//!    by its predecessors. `(base + add) x factor` is not
//!    `(base x factor) + add`; reordering jokers changes the score.
//! 5. Final score = floor(chips x mult).

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::card::{Card, Edition, Enhancement, Seal};
use crate::error::HandError;
use crate::hand::{evaluate_hand, HandResult};
use crate::joker::JokerInstance;
use crate::rank::HandType;
use crate::state::GameState;

/// Effect of a single card's modifiers. One application's worth;
/// retriggers repeat the application.
#[derive(Debug, Clone, PartialEq)]
pub struct CardEffect {
    pub card: Card,
    pub chips: u64,
    pub mult: u64,
    pub mult_mult: f64,
    pub money: i64,
    pub retrigger: usize,
    pub destroyed: bool,
}

impl CardEffect {
    fn new(card: Card) -> Self {
        Self {
            card,
            chips: 0,
            mult: 0,
            mult_mult: 1.0,
            money: 0,
            retrigger: 0,
            destroyed: false,
        }
    }
}

/// One joker's recorded contribution, in firing order.
#[derive(Debug, Clone, PartialEq)]
pub struct JokerContribution {
    pub name: String,
    pub chips: u64,
    pub mult: f64,
    pub mult_mult: f64,
    pub retrigger: usize,
}

/// Full audit record of a score calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringBreakdown {
    pub hand_type: HandType,
    pub base_chips: u64,
    pub base_mult: u64,
    pub card_effects: Vec<CardEffect>,
    pub joker_effects: Vec<JokerContribution>,
    pub money_earned: i64,
    pub destroyed_cards: Vec<Card>,
    pub final_chips: u64,
    pub final_mult: f64,
    pub final_score: u64,
}

/// Context handed to each joker effect in the chain. `current_chips`
/// and `current_mult` are the running totals after all preceding
/// jokers.
#[derive(Debug)]
pub struct ScoringContext<'a> {
    pub played_cards: &'a [Card],
    pub scoring_cards: &'a [Card],
    pub cards_in_hand: &'a [Card],
    pub hand_result: &'a HandResult,
    pub game_state: &'a GameState,
    pub current_chips: u64,
    pub current_mult: f64,
}

/// Modifier effect of one card. The RNG drives Glass destruction and
/// Lucky triggers; pass `None` for the deterministic expectation
/// (no random outcomes fire).
pub fn apply_card_modifiers(card: &Card, rng: Option<&mut StdRng>) -> CardEffect {
    let mut effect = CardEffect::new(*card);
    let mut rng = rng;

    match card.enhancement {
        Some(Enhancement::Bonus) => effect.chips += 30,
        Some(Enhancement::Mult) => effect.mult += 4,
        Some(Enhancement::Glass) => {
            effect.mult_mult *= 2.0;
            if let Some(rng) = rng.as_deref_mut() {
                if rng.gen_bool(0.25) {
                    effect.destroyed = true;
                }
            }
        }
        // Steel fires from the held pass, Stone chips are already in
        // the base, Gold pays out at end of round.
        Some(Enhancement::Steel) | Some(Enhancement::Stone) | Some(Enhancement::Gold) => {}
        Some(Enhancement::Lucky) => {
            if let Some(rng) = rng.as_deref_mut() {
                if rng.gen_bool(0.2) {
                    effect.mult += 20;
                }
                if rng.gen_bool(1.0 / 15.0) {
                    effect.money += 20;
                }
            }
        }
        Some(Enhancement::Wild) | None => {}
    }

    match card.edition {
        Edition::Foil => effect.chips += 50,
        Edition::Holographic => effect.mult += 10,
        Edition::Polychrome => effect.mult_mult *= 1.5,
        Edition::Base | Edition::Negative => {}
    }

    match card.seal {
        Some(Seal::Gold) => effect.money += 3,
        Some(Seal::Red) => effect.retrigger += 1,
        Some(Seal::Blue) | Some(Seal::Purple) | None => {}
    }

    effect
}

/// Mult multiplier from Steel cards still held in hand; they stack
/// multiplicatively.
fn steel_multiplier(cards_in_hand: &[Card]) -> f64 {
    cards_in_hand
        .iter()
        .filter(|c| c.enhancement == Some(Enhancement::Steel))
        .fold(1.0, |acc, _| acc * 1.5)
}

/// Score a played hand with card and joker effects.
///
/// Pure for a given `(played, held, jokers, state, rng_seed)`: repeated
/// calls return identical breakdowns.
pub fn calculate_score(
    played_cards: &[Card],
    jokers: &[JokerInstance],
    game_state: &GameState,
    cards_in_hand: &[Card],
    rng_seed: Option<u64>,
) -> Result<ScoringBreakdown, HandError> {
    let mut rng = rng_seed.map(StdRng::seed_from_u64);

    // First pass learns the category, second applies its level.
    let mut hand_result = evaluate_hand(played_cards, 1)?;
    let level = game_state.level(hand_result.hand_type);
    if level != 1 {
        hand_result = evaluate_hand(played_cards, level)?;
    }

    let mut breakdown = ScoringBreakdown {
        hand_type: hand_result.hand_type,
        base_chips: hand_result.base_chips,
        base_mult: hand_result.base_mult,
        card_effects: Vec::new(),
        joker_effects: Vec::new(),
        money_earned: 0,
        destroyed_cards: Vec::new(),
        final_chips: 0,
        final_mult: 0.0,
        final_score: 0,
    };

    let mut total_chips = hand_result.base_chips;
    let mut total_mult = hand_result.base_mult as f64;
    let mut total_money: i64 = 0;

    // Per-scoring-card modifiers, in played order, with retriggers.
    for card in &hand_result.scoring_cards {
        let effect = apply_card_modifiers(card, rng.as_mut());
        let triggers = 1 + effect.retrigger;
        for _ in 0..triggers {
            total_chips += effect.chips;
            total_mult += effect.mult as f64;
            total_mult *= effect.mult_mult;
            total_money += effect.money;
        }
        if effect.destroyed {
            breakdown.destroyed_cards.push(*card);
        }
        breakdown.card_effects.push(effect);
    }

    // Held-in-hand pass.
    let steel = steel_multiplier(cards_in_hand);
    if steel != 1.0 {
        total_mult *= steel;
    }

    // Joker chain, in hold order. Each effect is applied chips, +mult,
    // x mult; the context is refreshed so the next joker sees the
    // running totals.
    for joker in jokers {
        let ctx = ScoringContext {
            played_cards,
            scoring_cards: &hand_result.scoring_cards,
            cards_in_hand,
            hand_result: &hand_result,
            game_state,
            current_chips: total_chips,
            current_mult: total_mult,
        };
        let effect = joker.calculate_effect(&ctx);
        if effect.is_some() {
            total_chips += effect.add_chips;
            total_mult += effect.add_mult;
            if effect.mult_mult != 1.0 {
                total_mult *= effect.mult_mult;
            }
            total_money += effect.money;

            breakdown.joker_effects.push(JokerContribution {
                name: joker.name().to_string(),
                chips: effect.add_chips,
                mult: effect.add_mult,
                mult_mult: effect.mult_mult,
                retrigger: effect.retrigger,
            });
        }
    }

    breakdown.money_earned = total_money;
    breakdown.final_chips = total_chips;
    breakdown.final_mult = total_mult;
    breakdown.final_score = (total_chips as f64 * total_mult).floor() as u64;

    Ok(breakdown)
}

/// Just the final score, with no jokers and a default state.
pub fn quick_score(played_cards: &[Card]) -> Result<u64, HandError> {
    let state = GameState::default();
    Ok(calculate_score(played_cards, &[], &state, &[], None)?.final_score)
}

/// Survey the scores available from every playable subset of the hand,
/// best first. Used for analysis and logging, not the hot path.
pub fn estimate_hand_potential(
    hand: &[Card],
    jokers: &[JokerInstance],
    game_state: &GameState,
) -> Vec<(String, u64)> {
    let mut results = Vec::new();

    for n in 1..=hand.len().min(5) {
        for indices in (0..hand.len()).combinations(n) {
            let cards: Vec<Card> = indices.iter().map(|i| hand[*i]).collect();
            let remaining: Vec<Card> = hand
                .iter()
                .enumerate()
                .filter(|(i, _)| !indices.contains(i))
                .map(|(_, c)| *c)
                .collect();

            if let Ok(breakdown) = calculate_score(&cards, jokers, game_state, &remaining, None) {
                let label = format!(
                    "{}: {}",
                    breakdown.hand_type,
                    cards.iter().map(|c| c.to_string()).join(", ")
                );
                results.push((label, breakdown.final_score));
            }
        }
    }

    results.sort_by(|a, b| b.1.cmp(&a.1));
    results
}
