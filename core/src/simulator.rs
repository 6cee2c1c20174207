//! Deterministic round state machine.
//!
//! Phase flow: BlindSelect -> Playing -> (plays and discards until the
//! blind is beaten or hands run out) -> Shop -> BlindSelect -> ... ->
//! GameOver. Supports byte-independent cloning (joker state maps, deck
//! piles, RNG state) for MCTS.

use std::collections::HashMap;

use itertools::Itertools;
use tracing::{debug, info};

use crate::card::{create_standard_deck, Card, Enhancement, Rank};
use crate::config::Config;
use crate::error::GameError;
use crate::joker::registry::{self, HookEvent, HookTiming};
use crate::joker::{total_economy_effect, EconomyContext, EffectTiming, JokerId, JokerInstance};
use crate::rank::HandType;
use crate::rng::GameRng;
use crate::scoring::{calculate_score, ScoringBreakdown};
use crate::state::GameState;

/// Current phase of the run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    BlindSelect,
    Playing,
    Shop,
    GameOver,
}

/// The three blinds of an ante.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlindKind {
    Small,
    Big,
    Boss,
}

impl BlindKind {
    pub fn base_chips(&self) -> u64 {
        match self {
            Self::Small => 300,
            Self::Big => 450,
            Self::Boss => 600,
        }
    }

    pub fn reward(&self) -> i64 {
        match self {
            Self::Small => 3,
            Self::Big => 4,
            Self::Boss => 5,
        }
    }

    /// Blind progress within the ante, 0..=2.
    pub fn progress(&self) -> usize {
        match self {
            Self::Small => 0,
            Self::Big => 1,
            Self::Boss => 2,
        }
    }
}

/// Chip-requirement scaling per ante.
pub fn ante_scaling(ante: usize) -> f64 {
    match ante {
        0 | 1 => 1.0,
        2 => 1.5,
        3 => 2.0,
        4 => 3.0,
        5 => 4.0,
        6 => 6.0,
        7 => 9.0,
        8 => 15.0,
        n => 15.0 + (n - 8) as f64 * 5.0,
    }
}

/// Result of a successful play.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayOutcome {
    pub score: u64,
    pub breakdown: ScoringBreakdown,
    pub blind_beaten: bool,
    pub game_over: bool,
    pub won: bool,
}

/// Deterministic game simulator. `clone` yields a fully independent
/// copy: the clone's RNG carries the parent's current state and will
/// produce the same sequence unless subsequently altered.
#[derive(Debug, Clone)]
pub struct GameSimulator {
    pub deck: Vec<Card>,
    pub hand: Vec<Card>,
    pub played_this_round: Vec<Card>,

    /// Hold order is scoring order.
    pub jokers: Vec<JokerInstance>,

    pub money: i64,
    pub ante: usize,
    pub blind: BlindKind,
    pub hands_remaining: usize,
    pub discards_remaining: usize,
    pub current_chips: u64,
    pub blind_chips: u64,
    pub phase: GamePhase,
    pub hand_levels: HashMap<HandType, usize>,

    // Run statistics, read by economy effects.
    pub hands_played: usize,
    pub boss_blinds_defeated: usize,
    pub blinds_skipped: usize,

    pub config: Config,
    pub rng: GameRng,
}

impl GameSimulator {
    pub fn new(config: Config, rng: GameRng) -> Self {
        let mut simulator = Self {
            deck: Vec::new(),
            hand: Vec::new(),
            played_this_round: Vec::new(),
            jokers: Vec::new(),
            money: config.money_start,
            ante: config.ante_start,
            blind: BlindKind::Small,
            hands_remaining: config.hands,
            discards_remaining: config.discards,
            current_chips: 0,
            blind_chips: 0,
            phase: GamePhase::BlindSelect,
            hand_levels: GameState::default().hand_levels,
            hands_played: 0,
            boss_blinds_defeated: 0,
            blinds_skipped: 0,
            config,
            rng,
        };
        simulator.reset_deck();
        simulator.blind_chips = simulator.required_chips();
        simulator
    }

    /// Seeded simulator with default configuration.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(Config::default(), GameRng::deterministic(seed))
    }

    fn reset_deck(&mut self) {
        self.deck = create_standard_deck();
        self.rng.shuffle(&mut self.deck);
    }

    fn required_chips(&self) -> u64 {
        (self.blind.base_chips() as f64 * ante_scaling(self.ante)) as u64
    }

    /// Ambient state snapshot for scoring and decision calls.
    pub fn game_state(&self) -> GameState {
        GameState {
            hand_levels: self.hand_levels.clone(),
            hands_remaining: self.hands_remaining,
            discards_remaining: self.discards_remaining,
            money: self.money,
            ante: self.ante,
            blind_requirement: self.blind_chips,
            current_chips: self.current_chips,
        }
    }

    /// Count of nines across the whole deck (draw pile, hand, played).
    fn nines_in_deck(&self) -> usize {
        self.deck
            .iter()
            .chain(&self.hand)
            .chain(&self.played_this_round)
            .filter(|c| c.rank == Rank::Nine)
            .count()
    }

    fn economy_context(&self, discarded: &[Card]) -> EconomyContext {
        EconomyContext {
            money: self.money,
            ante: self.ante,
            boss_blinds_defeated: self.boss_blinds_defeated,
            blinds_skipped: self.blinds_skipped,
            hands_played: self.hands_played,
            hands_remaining: self.hands_remaining,
            discards_used: self.config.discards.saturating_sub(self.discards_remaining),
            discards_remaining: self.discards_remaining,
            deck_size: self.deck.len(),
            nines_in_deck: self.nines_in_deck(),
            discarded_cards: discarded.to_vec(),
        }
    }

    fn apply_state_hooks(&mut self, timing: HookTiming, event: &HookEvent) {
        for joker in &mut self.jokers {
            for hook in registry::state_hooks(joker.id) {
                if hook.timing == timing {
                    hook.transition.apply(joker, event);
                }
            }
        }
    }

    fn draw_to_hand_size(&mut self) -> usize {
        let mut drawn = 0;
        while self.hand.len() < self.config.hand_size {
            match self.deck.pop() {
                Some(card) => {
                    self.hand.push(card);
                    drawn += 1;
                }
                None => break,
            }
        }
        debug!(drawn, hand = self.hand.len(), "drew to hand size");
        drawn
    }

    // ------------------------------------------------------------------
    // Blind flow
    // ------------------------------------------------------------------

    /// Enter the current blind: reset round resources and draw.
    pub fn start_blind(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::BlindSelect {
            return Err(GameError::InvalidPhase);
        }

        self.phase = GamePhase::Playing;
        self.hands_remaining = self.config.hands;
        self.discards_remaining = self.config.discards;
        self.current_chips = 0;
        self.blind_chips = self.required_chips();
        self.played_this_round.clear();
        self.draw_to_hand_size();

        info!(
            ante = self.ante,
            blind = ?self.blind,
            requirement = self.blind_chips,
            "started blind"
        );
        Ok(())
    }

    /// Skip a non-boss blind for a small reward.
    pub fn skip_blind(&mut self) -> Result<i64, GameError> {
        if self.phase != GamePhase::BlindSelect {
            return Err(GameError::InvalidPhase);
        }
        if self.blind == BlindKind::Boss {
            return Err(GameError::CannotSkipBoss);
        }

        let reward = self.config.skip_reward;
        self.money += reward;
        self.blinds_skipped += 1;
        self.advance_blind();
        Ok(reward)
    }

    fn advance_blind(&mut self) {
        match self.blind {
            BlindKind::Small => {
                self.blind = BlindKind::Big;
                self.phase = GamePhase::BlindSelect;
            }
            BlindKind::Big => {
                self.blind = BlindKind::Boss;
                self.phase = GamePhase::BlindSelect;
            }
            BlindKind::Boss => {
                self.ante += 1;
                self.blind = BlindKind::Small;
                if self.ante > self.config.ante_end {
                    self.phase = GamePhase::GameOver;
                } else {
                    self.phase = GamePhase::Shop;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Round actions
    // ------------------------------------------------------------------

    fn validate_indices(&self, indices: &[usize]) -> Result<(), GameError> {
        if indices.is_empty() {
            return Err(GameError::InvalidHand(crate::error::HandError::NoCards));
        }
        if indices.len() > 5 {
            return Err(GameError::InvalidHand(
                crate::error::HandError::TooManyCards,
            ));
        }
        for &i in indices {
            if i >= self.hand.len() {
                return Err(GameError::IndexOutOfRange(i));
            }
        }
        if indices.iter().duplicates().next().is_some() {
            return Err(GameError::DuplicateIndices);
        }
        Ok(())
    }

    /// Remove the selected cards from hand, ascending-index order.
    fn take_cards(&mut self, indices: &[usize]) -> Vec<Card> {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable();
        let cards: Vec<Card> = sorted.iter().map(|&i| self.hand[i]).collect();
        for &i in sorted.iter().rev() {
            self.hand.remove(i);
        }
        cards
    }

    /// Play 1-5 cards from hand and score them.
    pub fn play_hand(&mut self, indices: &[usize]) -> Result<PlayOutcome, GameError> {
        if self.phase != GamePhase::Playing {
            return Err(GameError::InvalidPhase);
        }
        if self.hands_remaining == 0 {
            return Err(GameError::NoRemainingHands);
        }
        self.validate_indices(indices)?;

        let played = self.take_cards(indices);

        let state = self.game_state();
        let seed = self.rng.gen_u64();
        let breakdown = match calculate_score(&played, &self.jokers, &state, &self.hand, Some(seed))
        {
            Ok(breakdown) => breakdown,
            Err(err) => {
                // Precondition failures must leave the hand untouched
                for card in played.into_iter().rev() {
                    self.hand.push(card);
                }
                return Err(err.into());
            }
        };

        let event = HookEvent::HandPlayed {
            played: &played,
            hand_type: breakdown.hand_type,
        };
        self.apply_state_hooks(HookTiming::OnHandPlayed, &event);

        self.money += breakdown.money_earned;
        self.current_chips += breakdown.final_score;
        self.hands_remaining -= 1;
        self.hands_played += 1;

        // Destroyed glass cards leave the run; the rest go to the
        // played pile and return to the deck after the blind.
        for card in &played {
            if !breakdown.destroyed_cards.contains(card) {
                self.played_this_round.push(*card);
            }
        }

        info!(
            hand_type = %breakdown.hand_type,
            score = breakdown.final_score,
            total = self.current_chips,
            requirement = self.blind_chips,
            "played hand"
        );

        if self.current_chips >= self.blind_chips {
            return Ok(self.handle_blind_beaten(breakdown));
        }

        if self.hands_remaining == 0 {
            self.phase = GamePhase::GameOver;
            return Ok(PlayOutcome {
                score: breakdown.final_score,
                breakdown,
                blind_beaten: false,
                game_over: true,
                won: false,
            });
        }

        self.draw_to_hand_size();
        Ok(PlayOutcome {
            score: breakdown.final_score,
            breakdown,
            blind_beaten: false,
            game_over: false,
            won: false,
        })
    }

    fn handle_blind_beaten(&mut self, breakdown: ScoringBreakdown) -> PlayOutcome {
        if self.blind == BlindKind::Boss {
            self.boss_blinds_defeated += 1;
        }

        // Blind reward plus interest on held money.
        let reward = self.blind.reward();
        let base_interest =
            (self.money / self.config.interest_divisor).clamp(0, self.config.interest_cap);

        // End-of-round economy pass over the held sequence, plus gold
        // cards still in hand.
        let ctx = self.economy_context(&[]);
        let mut economy_money = 0;
        let mut extra_interest = 0;
        for joker in &mut self.jokers {
            let effect = joker.calculate_economy_effect(&ctx, EffectTiming::EndOfRound);
            economy_money += effect.money;
            extra_interest +=
                effect.interest_bonus * (ctx.money / self.config.interest_divisor).max(0);
            if effect.sell_value_change != 0 {
                let bonus = joker.state_value("sell_bonus") + effect.sell_value_change as f64;
                joker.state.insert("sell_bonus".to_string(), bonus);
            }
        }
        let gold_cards = self
            .hand
            .iter()
            .filter(|c| c.enhancement == Some(Enhancement::Gold))
            .count() as i64;

        self.money += reward + base_interest + economy_money + extra_interest + gold_cards * 3;

        // Everything comes back to the deck for the next blind.
        self.deck.append(&mut self.played_this_round);
        self.deck.append(&mut self.hand);
        let mut deck = std::mem::take(&mut self.deck);
        self.rng.shuffle(&mut deck);
        self.deck = deck;

        let won = self.blind == BlindKind::Boss && self.ante >= self.config.ante_end;
        if won {
            self.phase = GamePhase::GameOver;
            // Keep ante past the end so is_won() can tell a win from a loss
            self.ante += 1;
            info!(score = breakdown.final_score, "final boss beaten, run won");
        } else {
            self.advance_blind();
            info!(
                score = breakdown.final_score,
                money = self.money,
                "blind beaten"
            );
        }

        PlayOutcome {
            score: breakdown.final_score,
            breakdown,
            blind_beaten: true,
            game_over: won,
            won,
        }
    }

    /// Discard 1-5 cards and redraw.
    pub fn discard(&mut self, indices: &[usize]) -> Result<usize, GameError> {
        if self.phase != GamePhase::Playing {
            return Err(GameError::InvalidPhase);
        }
        if self.discards_remaining == 0 {
            return Err(GameError::NoRemainingDiscards);
        }
        self.validate_indices(indices)?;

        let discarded = self.take_cards(indices);

        let event = HookEvent::Discarded { cards: &discarded };
        self.apply_state_hooks(HookTiming::OnDiscard, &event);

        // On-discard economy effects fire on the frozen pre-decrement
        // context.
        let ctx = self.economy_context(&discarded);
        let economy = total_economy_effect(&self.jokers, &ctx, EffectTiming::OnDiscard);
        self.money += economy.money;

        self.discards_remaining -= 1;
        self.played_this_round.extend(discarded);
        let drawn = self.draw_to_hand_size();
        Ok(drawn)
    }

    // ------------------------------------------------------------------
    // Shop actions
    // ------------------------------------------------------------------

    /// Maximum debt allowed by held jokers (Credit Card).
    fn debt_limit(&self) -> i64 {
        let ctx = self.economy_context(&[]);
        self.jokers
            .iter()
            .map(|j| j.calculate_economy_effect(&ctx, EffectTiming::OnShop).debt_limit)
            .max()
            .unwrap_or(0)
    }

    pub fn buy_joker(&mut self, id: JokerId, cost: i64) -> Result<(), GameError> {
        if self.phase != GamePhase::Shop {
            return Err(GameError::InvalidPhase);
        }
        if self.money - cost < -self.debt_limit() {
            return Err(GameError::InsufficientFunds {
                cost,
                have: self.money,
            });
        }
        if self.jokers.len() >= self.config.joker_slots {
            return Err(GameError::JokerSlotsFull(self.config.joker_slots));
        }

        self.money -= cost;
        self.jokers.push(JokerInstance::new(id));
        Ok(())
    }

    pub fn sell_joker(&mut self, index: usize) -> Result<i64, GameError> {
        if self.phase != GamePhase::Shop {
            return Err(GameError::InvalidPhase);
        }
        if index >= self.jokers.len() {
            return Err(GameError::NoJokerAtIndex(index));
        }
        let joker = self.jokers.remove(index);
        let price = joker.sell_value();
        self.money += price;
        Ok(price)
    }

    /// Reorder the held sequence; order affects scoring.
    pub fn reorder_jokers(&mut self, order: &[usize]) -> Result<(), GameError> {
        if self.phase != GamePhase::Shop {
            return Err(GameError::InvalidPhase);
        }
        let mut sorted: Vec<usize> = order.to_vec();
        sorted.sort_unstable();
        if sorted != (0..self.jokers.len()).collect::<Vec<_>>() {
            return Err(GameError::InvalidJokerOrder);
        }
        self.jokers = order.iter().map(|&i| self.jokers[i].clone()).collect();
        Ok(())
    }

    pub fn end_shop(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Shop {
            return Err(GameError::InvalidPhase);
        }
        self.phase = GamePhase::BlindSelect;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Every non-empty subset of the hand up to 5 cards.
    pub fn legal_plays(&self) -> Vec<Vec<usize>> {
        if self.phase != GamePhase::Playing || self.hands_remaining == 0 {
            return Vec::new();
        }
        subsets_up_to_five(self.hand.len())
    }

    pub fn legal_discards(&self) -> Vec<Vec<usize>> {
        if self.phase != GamePhase::Playing || self.discards_remaining == 0 {
            return Vec::new();
        }
        subsets_up_to_five(self.hand.len())
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_won(&self) -> bool {
        self.phase == GamePhase::GameOver && self.ante > self.config.ante_end
    }
}

fn subsets_up_to_five(hand_len: usize) -> Vec<Vec<usize>> {
    let mut subsets = Vec::new();
    for n in 1..=hand_len.min(5) {
        for combo in (0..hand_len).combinations(n) {
            subsets.push(combo);
        }
    }
    subsets
}

impl Default for GameSimulator {
    fn default() -> Self {
        Self::new(Config::default(), GameRng::secure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_sim(seed: u64) -> GameSimulator {
        let mut sim = GameSimulator::with_seed(seed);
        sim.start_blind().unwrap();
        sim
    }

    #[test]
    fn test_start_blind_draws_full_hand() {
        let sim = playing_sim(42);
        assert_eq!(sim.phase, GamePhase::Playing);
        assert_eq!(sim.hand.len(), 8);
        assert_eq!(sim.deck.len(), 44);
        assert_eq!(sim.hands_remaining, 4);
        assert_eq!(sim.discards_remaining, 3);
    }

    #[test]
    fn test_blind_requirements_scale() {
        let mut sim = GameSimulator::with_seed(1);
        assert_eq!(sim.blind_chips, 300);
        sim.ante = 2;
        sim.blind = BlindKind::Boss;
        sim.start_blind().unwrap();
        assert_eq!(sim.blind_chips, 900);
    }

    #[test]
    fn test_play_hand_scores_and_redraws() {
        let mut sim = playing_sim(42);
        let outcome = sim.play_hand(&[0, 1]).unwrap();
        assert!(outcome.score > 0);
        assert_eq!(sim.hands_remaining, 3);
        assert_eq!(sim.hand.len(), 8);
        assert_eq!(sim.played_this_round.len(), 2);
        assert_eq!(sim.hands_played, 1);
    }

    #[test]
    fn test_play_precondition_failures_leave_state() {
        let mut sim = playing_sim(42);
        let hand_before = sim.hand.clone();

        assert!(matches!(
            sim.play_hand(&[]),
            Err(GameError::InvalidHand(_))
        ));
        assert!(matches!(
            sim.play_hand(&[0, 0]),
            Err(GameError::DuplicateIndices)
        ));
        assert!(matches!(
            sim.play_hand(&[99]),
            Err(GameError::IndexOutOfRange(99))
        ));
        assert!(matches!(
            sim.play_hand(&[0, 1, 2, 3, 4, 5]),
            Err(GameError::InvalidHand(_))
        ));

        assert_eq!(sim.hand, hand_before);
        assert_eq!(sim.hands_remaining, 4);
    }

    #[test]
    fn test_wrong_phase_rejected() {
        let mut sim = GameSimulator::with_seed(42);
        assert_eq!(sim.play_hand(&[0]), Err(GameError::InvalidPhase));
        assert_eq!(sim.discard(&[0]), Err(GameError::InvalidPhase));
        assert_eq!(sim.end_shop(), Err(GameError::InvalidPhase));
        assert_eq!(
            sim.buy_joker(JokerId::Joker, 2),
            Err(GameError::InvalidPhase)
        );
    }

    #[test]
    fn test_discard_flow() {
        let mut sim = playing_sim(42);
        let drawn = sim.discard(&[0, 1, 2]).unwrap();
        assert_eq!(drawn, 3);
        assert_eq!(sim.discards_remaining, 2);
        assert_eq!(sim.hand.len(), 8);

        sim.discard(&[0]).unwrap();
        sim.discard(&[0]).unwrap();
        assert_eq!(sim.discard(&[0]), Err(GameError::NoRemainingDiscards));
    }

    #[test]
    fn test_skip_blind() {
        let mut sim = GameSimulator::with_seed(42);
        let money = sim.money;
        sim.skip_blind().unwrap();
        assert_eq!(sim.money, money + 1);
        assert_eq!(sim.blind, BlindKind::Big);
        assert_eq!(sim.blinds_skipped, 1);

        sim.skip_blind().unwrap();
        assert_eq!(sim.blind, BlindKind::Boss);
        assert_eq!(sim.skip_blind(), Err(GameError::CannotSkipBoss));
    }

    #[test]
    fn test_game_over_on_exhausted_hands() {
        let mut sim = playing_sim(42);
        sim.blind_chips = u64::MAX; // unbeatable
        for _ in 0..3 {
            let outcome = sim.play_hand(&[0]).unwrap();
            assert!(!outcome.game_over);
        }
        let outcome = sim.play_hand(&[0]).unwrap();
        assert!(outcome.game_over);
        assert!(!outcome.won);
        assert_eq!(sim.phase, GamePhase::GameOver);
        assert!(!sim.is_won());
    }

    #[test]
    fn test_blind_beaten_awards_and_advances() {
        let mut sim = playing_sim(42);
        sim.blind_chips = 1; // any play beats it
        sim.money = 12;
        let outcome = sim.play_hand(&[0]).unwrap();
        assert!(outcome.blind_beaten);
        // Reward 3 + interest min(12/5, 5) = 2
        assert_eq!(sim.money, 12 + 3 + 2);
        assert_eq!(sim.blind, BlindKind::Big);
        assert_eq!(sim.phase, GamePhase::BlindSelect);
        // Cards returned to the deck
        assert_eq!(sim.deck.len(), 52);
        assert!(sim.hand.is_empty());
    }

    #[test]
    fn test_golden_joker_pays_at_round_end() {
        let mut sim = playing_sim(42);
        sim.jokers.push(JokerInstance::new(JokerId::GoldenJoker));
        sim.blind_chips = 1;
        sim.money = 0;
        sim.play_hand(&[0]).unwrap();
        // Reward 3, no interest, +4 golden joker
        assert_eq!(sim.money, 7);
    }

    #[test]
    fn test_scaling_joker_state_updates_on_play_and_discard() {
        let mut sim = playing_sim(42);
        sim.jokers.push(JokerInstance::new(JokerId::GreenJoker));
        sim.blind_chips = u64::MAX;

        sim.play_hand(&[0]).unwrap();
        assert_eq!(sim.jokers[0].state_value("mult"), 1.0);
        sim.play_hand(&[0]).unwrap();
        assert_eq!(sim.jokers[0].state_value("mult"), 2.0);
        sim.discard(&[0]).unwrap();
        assert_eq!(sim.jokers[0].state_value("mult"), 1.0);
    }

    #[test]
    fn test_trading_card_pays_on_single_discard() {
        let mut sim = playing_sim(42);
        sim.jokers.push(JokerInstance::new(JokerId::TradingCard));
        let money = sim.money;

        sim.discard(&[0]).unwrap();
        assert_eq!(sim.money, money + 3);

        // Multi-card discards pay nothing
        sim.discard(&[0, 1]).unwrap();
        assert_eq!(sim.money, money + 3);
    }

    #[test]
    fn test_shop_actions() {
        let mut sim = GameSimulator::with_seed(42);
        sim.phase = GamePhase::Shop;
        sim.money = 10;

        sim.buy_joker(JokerId::Joker, 2).unwrap();
        assert_eq!(sim.money, 8);
        assert_eq!(sim.jokers.len(), 1);

        assert_eq!(
            sim.buy_joker(JokerId::TheDuo, 100),
            Err(GameError::InsufficientFunds {
                cost: 100,
                have: 8
            })
        );

        sim.buy_joker(JokerId::GreedyJoker, 5).unwrap();
        sim.reorder_jokers(&[1, 0]).unwrap();
        assert_eq!(sim.jokers[0].id, JokerId::GreedyJoker);
        assert_eq!(
            sim.reorder_jokers(&[0, 0]),
            Err(GameError::InvalidJokerOrder)
        );

        let price = sim.sell_joker(0).unwrap();
        assert_eq!(price, 2); // greedy joker costs 5, sells for 2
        assert_eq!(sim.jokers.len(), 1);
        assert_eq!(sim.sell_joker(5), Err(GameError::NoJokerAtIndex(5)));

        sim.end_shop().unwrap();
        assert_eq!(sim.phase, GamePhase::BlindSelect);
    }

    #[test]
    fn test_credit_card_allows_debt() {
        let mut sim = GameSimulator::with_seed(42);
        sim.phase = GamePhase::Shop;
        sim.money = 0;
        sim.jokers.push(JokerInstance::new(JokerId::CreditCard));
        sim.buy_joker(JokerId::Joker, 2).unwrap();
        assert_eq!(sim.money, -2);
    }

    #[test]
    fn test_joker_slot_limit() {
        let mut sim = GameSimulator::with_seed(42);
        sim.phase = GamePhase::Shop;
        sim.money = 100;
        for _ in 0..5 {
            sim.buy_joker(JokerId::Joker, 2).unwrap();
        }
        assert_eq!(
            sim.buy_joker(JokerId::Joker, 2),
            Err(GameError::JokerSlotsFull(5))
        );
    }

    #[test]
    fn test_legal_actions() {
        let sim = playing_sim(42);
        let plays = sim.legal_plays();
        // C(8,1..5) = 8 + 28 + 56 + 70 + 56
        assert_eq!(plays.len(), 218);
        assert_eq!(sim.legal_discards().len(), 218);

        let mut done = sim.clone();
        done.phase = GamePhase::GameOver;
        assert!(done.legal_plays().is_empty());
    }

    #[test]
    fn test_clone_independence() {
        let mut sim = playing_sim(42);
        sim.jokers.push(JokerInstance::new(JokerId::GreenJoker));
        sim.jokers[0].state.insert("mult".to_string(), 3.0);

        let mut clone = sim.clone();
        clone.play_hand(&[0, 1]).unwrap();
        clone.jokers[0].state.insert("mult".to_string(), 9.0);

        // Parent untouched, including joker state
        assert_eq!(sim.hands_remaining, 4);
        assert_eq!(sim.hand.len(), 8);
        assert_eq!(sim.jokers[0].state_value("mult"), 3.0);
        assert_eq!(clone.jokers[0].state_value("mult"), 9.0);
    }

    #[test]
    fn test_clone_rng_reproduces_parent_sequence() {
        let sim = playing_sim(7);
        let mut a = sim.clone();
        let mut b = sim.clone();
        let outcome_a = a.play_hand(&[0, 1, 2]).unwrap();
        let outcome_b = b.play_hand(&[0, 1, 2]).unwrap();
        assert_eq!(outcome_a.score, outcome_b.score);
        assert_eq!(a.hand, b.hand);
    }

    #[test]
    fn test_win_on_final_boss() {
        let mut sim = GameSimulator::with_seed(42);
        sim.ante = 8;
        sim.blind = BlindKind::Boss;
        sim.start_blind().unwrap();
        sim.blind_chips = 1;
        let outcome = sim.play_hand(&[0]).unwrap();
        assert!(outcome.won);
        assert!(sim.is_won());
        assert_eq!(sim.boss_blinds_defeated, 1);
    }

    #[test]
    fn test_ante_scaling_table() {
        assert_eq!(ante_scaling(1), 1.0);
        assert_eq!(ante_scaling(8), 15.0);
        assert_eq!(ante_scaling(10), 25.0);
    }
}
