//! Deep decision engine.
//!
//! Decision flow:
//! 1. If any play is lethal, play the safest lethal hand and return.
//! 2. Otherwise compute EV for every play and (probability-weighted)
//!    discard, penalize variance by game phase, filter discards that
//!    fail the safety margin, charge deck damage, apply tie-breakers,
//!    and take the best.

use itertools::Itertools;
use tracing::{debug, info};

use crate::card::{Card, Rank, Suit};
use crate::deck::DeckTracker;
use crate::hand::find_best_hand;
use crate::heuristics::ActionType;
use crate::joker::{JokerId, JokerInstance};
use crate::probability::{calculate_all_completion_probabilities, CompletionProbabilities};
use crate::rank::HandType;
use crate::scoring::{calculate_score, ScoringBreakdown};
use crate::state::GameState;

/// Weights and thresholds for the decision pipeline.
#[derive(Debug, Clone)]
pub struct DecisionConfig {
    // Variance weights by game phase
    pub early_game_variance_weight: f64,
    pub mid_game_variance_weight: f64,
    pub late_game_variance_weight: f64,
    pub lethal_range_variance_weight: f64,

    // Safety margins for discard decisions
    pub base_safety_margin: f64,
    pub low_discard_margin_multiplier: f64,
    pub boss_blind_margin_multiplier: f64,
    pub near_lethal_margin_multiplier: f64,

    // Deck health penalties
    pub rare_rank_loss_weight: f64,
    pub suit_imbalance_weight: f64,
    pub joker_trigger_value_weight: f64,

    // Tie-breakers
    pub prefer_play_over_discard: f64,
    pub prefer_fewer_cards: f64,
    pub prefer_deterministic: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            early_game_variance_weight: 0.1,
            mid_game_variance_weight: 0.3,
            late_game_variance_weight: 0.5,
            lethal_range_variance_weight: 1.0,
            base_safety_margin: 50.0,
            low_discard_margin_multiplier: 1.5,
            boss_blind_margin_multiplier: 2.0,
            near_lethal_margin_multiplier: 3.0,
            rare_rank_loss_weight: 20.0,
            suit_imbalance_weight: 10.0,
            joker_trigger_value_weight: 1.0,
            prefer_play_over_discard: 10.0,
            prefer_fewer_cards: 5.0,
            prefer_deterministic: 20.0,
        }
    }
}

/// A candidate action with its full evaluation.
#[derive(Debug, Clone)]
pub struct EvaluatedAction {
    pub action_type: ActionType,
    pub card_indices: Vec<usize>,
    pub cards: Vec<Card>,
    pub expected_score: f64,
    pub variance: f64,
    pub hand_type: Option<HandType>,
    pub breakdown: Option<ScoringBreakdown>,
    pub is_lethal: bool,
    pub is_deterministic: bool,
    pub final_score: f64,
    pub reasoning: Vec<String>,
}

impl EvaluatedAction {
    fn add_reason(&mut self, reason: impl Into<String>) {
        self.reasoning.push(reason.into());
    }
}

/// The decision engine. Holds only configuration; every `decide` call
/// owns its own tracker and state snapshot.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    pub config: DecisionConfig,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    /// Pick the best action for the current round snapshot.
    #[allow(clippy::too_many_arguments)]
    pub fn decide(
        &self,
        hand: &[Card],
        jokers: &[JokerInstance],
        game_state: &GameState,
        blind_chips: u64,
        current_chips: u64,
        hands_remaining: usize,
        discards_remaining: usize,
        deck_tracker: Option<DeckTracker>,
        is_boss_blind: bool,
    ) -> EvaluatedAction {
        let chips_needed = blind_chips.saturating_sub(current_chips);
        let mut tracker =
            deck_tracker.unwrap_or_else(|| DeckTracker::from_known_cards(hand, &[], &[]));

        let play_actions =
            self.evaluate_all_plays(hand, jokers, game_state, chips_needed, hands_remaining);

        // Gate 1: lethality. Winning now beats everything else.
        let lethal_plays: Vec<&EvaluatedAction> =
            play_actions.iter().filter(|a| a.is_lethal).collect();
        if !lethal_plays.is_empty() {
            let mut best = Self::find_safest_lethal(&lethal_plays).clone();
            best.add_reason("LETHAL - playing safe winning hand");
            info!(
                hand_type = ?best.hand_type,
                score = best.expected_score,
                needed = chips_needed,
                "lethal found"
            );
            return best;
        }

        let mut all_actions = play_actions;
        if discards_remaining > 0 {
            all_actions.extend(self.evaluate_all_discards(
                hand,
                jokers,
                game_state,
                &mut tracker,
                chips_needed,
                discards_remaining,
                is_boss_blind,
            ));
        }

        let variance_weight =
            self.variance_weight(chips_needed, hands_remaining, blind_chips);

        for action in &mut all_actions {
            action.final_score = action.expected_score;
            action.final_score -= variance_weight * action.variance;

            if action.action_type == ActionType::Play {
                action.final_score += self.config.prefer_play_over_discard;
            }
            if action.is_deterministic {
                action.final_score += self.config.prefer_deterministic;
            }
            action.final_score -= action.cards.len() as f64 * self.config.prefer_fewer_cards;
        }

        all_actions.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

        match all_actions.into_iter().next() {
            Some(best) => {
                info!(
                    action = ?best.action_type,
                    hand_type = ?best.hand_type,
                    score = best.final_score,
                    reasons = %best.reasoning.join(", "),
                    "decision"
                );
                best
            }
            None => {
                // Fallback: play the first card
                EvaluatedAction {
                    action_type: ActionType::Play,
                    card_indices: vec![0],
                    cards: hand.first().copied().into_iter().collect(),
                    expected_score: 0.0,
                    variance: 0.0,
                    hand_type: None,
                    breakdown: None,
                    is_lethal: false,
                    is_deterministic: true,
                    final_score: 0.0,
                    reasoning: vec!["no valid actions, playing first card".to_string()],
                }
            }
        }
    }

    /// Every possible play, scored deterministically.
    fn evaluate_all_plays(
        &self,
        hand: &[Card],
        jokers: &[JokerInstance],
        game_state: &GameState,
        chips_needed: u64,
        _hands_remaining: usize,
    ) -> Vec<EvaluatedAction> {
        let mut actions = Vec::new();

        for n in 1..=hand.len().min(5) {
            for indices in (0..hand.len()).combinations(n) {
                let cards: Vec<Card> = indices.iter().map(|&i| hand[i]).collect();
                let remaining: Vec<Card> = hand
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !indices.contains(i))
                    .map(|(_, c)| *c)
                    .collect();

                let breakdown =
                    match calculate_score(&cards, jokers, game_state, &remaining, None) {
                        Ok(breakdown) => breakdown,
                        Err(_) => continue,
                    };

                let is_lethal = breakdown.final_score >= chips_needed;
                let mut action = EvaluatedAction {
                    action_type: ActionType::Play,
                    card_indices: indices,
                    cards,
                    expected_score: breakdown.final_score as f64,
                    variance: 0.0, // plays are deterministic
                    hand_type: Some(breakdown.hand_type),
                    breakdown: Some(breakdown),
                    is_lethal,
                    is_deterministic: true,
                    final_score: 0.0,
                    reasoning: Vec::new(),
                };
                action.add_reason(
                    action
                        .hand_type
                        .map(|ht| ht.to_string())
                        .unwrap_or_default(),
                );
                if is_lethal {
                    action.add_reason("LETHAL");
                }
                actions.push(action);
            }
        }
        actions
    }

    /// Every discard with probability-weighted EV; candidates that fail
    /// the safety margin against the best immediate play are dropped.
    #[allow(clippy::too_many_arguments)]
    fn evaluate_all_discards(
        &self,
        hand: &[Card],
        jokers: &[JokerInstance],
        game_state: &GameState,
        tracker: &mut DeckTracker,
        chips_needed: u64,
        discards_remaining: usize,
        is_boss_blind: bool,
    ) -> Vec<EvaluatedAction> {
        let mut actions = Vec::new();

        // Reference point: what the best hand scores if played now
        let current_score = find_best_hand(hand)
            .ok()
            .and_then(|(_, result)| {
                calculate_score(&result.scoring_cards, jokers, game_state, &[], None).ok()
            })
            .map(|b| b.final_score as f64)
            .unwrap_or(0.0);

        let safety_margin = self.safety_margin(
            chips_needed,
            current_score,
            discards_remaining,
            is_boss_blind,
        );

        for n in 1..=hand.len().min(5) {
            for indices in (0..hand.len()).combinations(n) {
                let cards_to_discard: Vec<Card> = indices.iter().map(|&i| hand[i]).collect();
                let cards_to_keep: Vec<Card> = hand
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !indices.contains(i))
                    .map(|(_, c)| *c)
                    .collect();

                let probs =
                    calculate_all_completion_probabilities(&cards_to_keep, tracker, n);
                let (ev, variance) =
                    self.estimate_discard_ev(&cards_to_keep, &probs, jokers, game_state);
                let deck_damage = self.deck_damage(&cards_to_discard, tracker, jokers);
                let adjusted_ev = ev - deck_damage;

                // Only worth it when clearly better than playing now
                if adjusted_ev <= current_score + safety_margin {
                    continue;
                }

                let (best_improvement, best_prob) = probs.best_improvement();
                let mut action = EvaluatedAction {
                    action_type: ActionType::Discard,
                    card_indices: indices,
                    cards: cards_to_discard,
                    expected_score: adjusted_ev,
                    variance,
                    hand_type: None,
                    breakdown: None,
                    is_lethal: false,
                    is_deterministic: false,
                    final_score: 0.0,
                    reasoning: Vec::new(),
                };
                action.add_reason(format!("discard {n}"));
                action.add_reason(format!("P({best_improvement})={:.1}%", best_prob * 100.0));
                action.add_reason(format!("EV={adjusted_ev:.0}"));
                actions.push(action);
            }
        }
        actions
    }

    /// Safest lethal: highest score for margin, then fewest cards, then
    /// category strength. Lexicographic.
    fn find_safest_lethal<'a>(lethal_plays: &[&'a EvaluatedAction]) -> &'a EvaluatedAction {
        lethal_plays
            .iter()
            .copied()
            .max_by(|a, b| {
                a.expected_score
                    .total_cmp(&b.expected_score)
                    .then_with(|| b.cards.len().cmp(&a.cards.len()))
                    .then_with(|| {
                        let sa = a.hand_type.map(|h| h.strength()).unwrap_or(0);
                        let sb = b.hand_type.map(|h| h.strength()).unwrap_or(0);
                        sa.cmp(&sb)
                    })
            })
            .expect("lethal_plays is non-empty")
    }

    /// Variance weight by game phase: heavier penalties near the
    /// finish line and when hands run short.
    fn variance_weight(
        &self,
        chips_needed: u64,
        hands_remaining: usize,
        blind_total: u64,
    ) -> f64 {
        if (chips_needed as f64) < blind_total as f64 * 0.3 {
            return self.config.lethal_range_variance_weight;
        }
        if hands_remaining <= 2 {
            return self.config.late_game_variance_weight;
        }
        if hands_remaining <= 3 {
            return self.config.mid_game_variance_weight;
        }
        self.config.early_game_variance_weight
    }

    /// Safety margin a discard's EV must clear. Multipliers compose.
    fn safety_margin(
        &self,
        chips_needed: u64,
        current_hand_score: f64,
        discards_remaining: usize,
        is_boss_blind: bool,
    ) -> f64 {
        let mut margin = self.config.base_safety_margin;

        if current_hand_score >= chips_needed as f64 * 0.8 {
            margin *= self.config.near_lethal_margin_multiplier;
        }
        if discards_remaining <= 1 {
            margin *= self.config.low_discard_margin_multiplier;
        }
        if is_boss_blind {
            margin *= self.config.boss_blind_margin_multiplier;
        }
        margin
    }

    /// Outcome-weighted EV and variance for a discard, from completion
    /// probabilities and representative per-category scores.
    fn estimate_discard_ev(
        &self,
        kept_cards: &[Card],
        probs: &CompletionProbabilities,
        jokers: &[JokerInstance],
        game_state: &GameState,
    ) -> (f64, f64) {
        let mut outcomes: Vec<(f64, f64)> = Vec::new();

        let candidates = [
            (probs.best_flush(), HandType::Flush),
            (probs.straight, HandType::Straight),
            (probs.three_of_a_kind, HandType::ThreeOfAKind),
            (probs.full_house, HandType::FullHouse),
            (probs.four_of_a_kind, HandType::FourOfAKind),
        ];
        for (probability, hand_type) in candidates {
            if probability > 0.01 {
                let score =
                    self.estimate_hand_score(hand_type, kept_cards, jokers, game_state);
                outcomes.push((probability, score));
            }
        }

        let improve_mass: f64 = outcomes.iter().map(|(p, _)| p).sum();
        let no_improve = 1.0 - improve_mass;
        if no_improve > 0.0 {
            let score = self.estimate_kept_cards_score(kept_cards, jokers, game_state);
            outcomes.push((no_improve, score));
        }

        if outcomes.is_empty() {
            return (0.0, 0.0);
        }

        let ev: f64 = outcomes.iter().map(|(p, s)| p * s).sum();
        let variance: f64 = outcomes.iter().map(|(p, s)| p * (s - ev).powi(2)).sum();
        (ev, variance)
    }

    /// Representative score for reaching a category with the current
    /// joker configuration. An estimator, not the scoring engine: it
    /// uses flat +10 chips per level and a normalized joker factor.
    fn estimate_hand_score(
        &self,
        hand_type: HandType,
        kept_cards: &[Card],
        jokers: &[JokerInstance],
        game_state: &GameState,
    ) -> f64 {
        let level = game_state.level(hand_type);
        let chips = hand_type.base_chips() as f64 + (level.saturating_sub(1) as f64) * 10.0;
        let mult = hand_type.base_mult() as f64 + level.saturating_sub(1) as f64;

        let joker_mult = estimate_joker_bonus(kept_cards, hand_type, jokers).max(1.0);
        chips * mult * joker_mult
    }

    /// Score estimate when the draw does not improve the kept cards.
    fn estimate_kept_cards_score(
        &self,
        kept_cards: &[Card],
        jokers: &[JokerInstance],
        game_state: &GameState,
    ) -> f64 {
        match find_best_hand(kept_cards) {
            Ok((_, result)) => {
                self.estimate_hand_score(result.hand_type, kept_cards, jokers, game_state)
            }
            Err(_) => 0.0,
        }
    }

    /// Penalty for hurting the future deck: rare ranks, suits already
    /// short, cards a held joker wants.
    fn deck_damage(
        &self,
        cards_to_discard: &[Card],
        tracker: &mut DeckTracker,
        jokers: &[JokerInstance],
    ) -> f64 {
        let mut damage = 0.0;

        for card in cards_to_discard {
            if matches!(
                card.rank,
                Rank::Ace | Rank::King | Rank::Queen | Rank::Jack
            ) {
                damage += self.config.rare_rank_loss_weight;
            }
        }

        let distribution = tracker.suit_distribution();
        if !distribution.is_empty() {
            let average =
                distribution.values().sum::<usize>() as f64 / distribution.len() as f64;
            for card in cards_to_discard {
                if (distribution.get(&card.suit).copied().unwrap_or(0) as f64) < average {
                    damage += self.config.suit_imbalance_weight;
                }
            }
        }

        for joker in jokers {
            for card in cards_to_discard {
                if card_synergizes_with_joker(card, joker.id) {
                    damage += self.config.joker_trigger_value_weight * 10.0;
                }
            }
        }

        debug!(damage, "deck damage for discard candidate");
        damage
    }
}

/// Whether a card feeds one of the held joker's predicates.
fn card_synergizes_with_joker(card: &Card, id: JokerId) -> bool {
    match id {
        JokerId::GreedyJoker => card.suit == Suit::Diamond,
        JokerId::LustyJoker => card.suit == Suit::Heart,
        JokerId::WrathfulJoker => card.suit == Suit::Spade,
        JokerId::GluttonousJoker => card.suit == Suit::Club,
        JokerId::ScaryFace | JokerId::SmileyFace => card.is_face(),
        JokerId::EvenSteven => card.is_even(),
        JokerId::OddTodd => card.is_odd(),
        JokerId::Fibonacci => matches!(
            card.rank,
            Rank::Two | Rank::Three | Rank::Five | Rank::Eight | Rank::Ace
        ),
        JokerId::Scholar => card.rank == Rank::Ace,
        JokerId::WalkieTalkie => matches!(card.rank, Rank::Ten | Rank::Four),
        JokerId::Hack => matches!(
            card.rank,
            Rank::Two | Rank::Three | Rank::Four | Rank::Five
        ),
        _ => false,
    }
}

/// Rough multiplier the held jokers add over a plain hand of the given
/// category. Normalized so an empty joker set is 1.0.
fn estimate_joker_bonus(cards: &[Card], hand_type: HandType, jokers: &[JokerInstance]) -> f64 {
    let mut multiplier = 1.0;
    let mut add_mult = 0.0;

    for joker in jokers {
        match joker.id {
            JokerId::Joker => add_mult += 4.0,
            JokerId::JollyJoker
                if matches!(
                    hand_type,
                    HandType::Pair | HandType::TwoPair | HandType::FullHouse
                ) =>
            {
                add_mult += 8.0;
            }
            JokerId::ZanyJoker
                if matches!(
                    hand_type,
                    HandType::ThreeOfAKind | HandType::FullHouse | HandType::FourOfAKind
                ) =>
            {
                add_mult += 12.0;
            }
            JokerId::MadJoker if hand_type == HandType::TwoPair => add_mult += 10.0,
            JokerId::CrazyJoker
                if matches!(hand_type, HandType::Straight | HandType::StraightFlush) =>
            {
                add_mult += 12.0;
            }
            JokerId::DrollJoker
                if matches!(
                    hand_type,
                    HandType::Flush | HandType::FlushHouse | HandType::FlushFive
                ) =>
            {
                add_mult += 10.0;
            }
            JokerId::GreedyJoker => {
                add_mult += cards.iter().filter(|c| c.suit == Suit::Diamond).count() as f64 * 3.0;
            }
            JokerId::LustyJoker => {
                add_mult += cards.iter().filter(|c| c.suit == Suit::Heart).count() as f64 * 3.0;
            }
            JokerId::WrathfulJoker => {
                add_mult += cards.iter().filter(|c| c.suit == Suit::Spade).count() as f64 * 3.0;
            }
            JokerId::GluttonousJoker => {
                add_mult += cards.iter().filter(|c| c.suit == Suit::Club).count() as f64 * 3.0;
            }
            JokerId::HalfJoker if cards.len() <= 3 => add_mult += 20.0,
            JokerId::TheDuo
                if matches!(
                    hand_type,
                    HandType::Pair | HandType::TwoPair | HandType::FullHouse
                ) =>
            {
                multiplier *= 2.0;
            }
            JokerId::TheTrio
                if matches!(
                    hand_type,
                    HandType::ThreeOfAKind | HandType::FullHouse | HandType::FourOfAKind
                ) =>
            {
                multiplier *= 3.0;
            }
            JokerId::TheFamily
                if matches!(hand_type, HandType::FourOfAKind | HandType::FiveOfAKind) =>
            {
                multiplier *= 4.0;
            }
            JokerId::TheOrder
                if matches!(hand_type, HandType::Straight | HandType::StraightFlush) =>
            {
                multiplier *= 3.0;
            }
            JokerId::TheTribe
                if matches!(
                    hand_type,
                    HandType::Flush
                        | HandType::FlushHouse
                        | HandType::FlushFive
                        | HandType::StraightFlush
                ) =>
            {
                multiplier *= 2.0;
            }
            _ => {}
        }
    }

    // Normalize against a plain 10-chip, 2-mult baseline
    10.0 * (2.0 + add_mult) * multiplier / 20.0
}
