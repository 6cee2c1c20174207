//! Fast rule-based action ranking.
//!
//! Produces a cheap scalar per candidate play or discard, used by the
//! decision engine as a filter and by MCTS as its rollout policy. The
//! weights favor lethal plays absolutely, then hand quality and chip
//! efficiency, with synergy bonuses for cards the held jokers care
//! about.

use itertools::Itertools;

use crate::card::{Card, Suit};
use crate::hand::find_best_hand;
use crate::joker::{JokerId, JokerInstance};
use crate::rank::HandType;
use crate::scoring::calculate_score;
use crate::simulator::{GamePhase, GameSimulator};
use crate::state::GameState;

/// Type of a ranked action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    Play,
    Discard,
}

/// An action with its heuristic score, higher is better.
#[derive(Debug, Clone)]
pub struct ScoredAction {
    pub action_type: ActionType,
    pub card_indices: Vec<usize>,
    pub score: f64,
    pub expected_chips: u64,
    pub reasoning: String,
    pub is_lethal: bool,
}

/// Heuristic weights.
#[derive(Debug, Clone)]
pub struct HeuristicConfig {
    pub lethal_bonus: f64,
    pub hand_type_weight: f64,
    pub chip_efficiency_weight: f64,
    pub joker_synergy_weight: f64,
    pub discard_improvement_weight: f64,
    pub keep_high_cards_weight: f64,
    pub keep_synergy_cards_weight: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            lethal_bonus: 10_000.0,
            hand_type_weight: 100.0,
            chip_efficiency_weight: 1.0,
            joker_synergy_weight: 50.0,
            discard_improvement_weight: 200.0,
            keep_high_cards_weight: 10.0,
            keep_synergy_cards_weight: 30.0,
        }
    }
}

fn subsets_up_to_five(len: usize) -> impl Iterator<Item = Vec<usize>> {
    (1..=len.min(5)).flat_map(move |n| (0..len).combinations(n))
}

/// Rank every possible play, best first.
pub fn evaluate_plays(
    hand: &[Card],
    jokers: &[JokerInstance],
    game_state: &GameState,
    blind_chips: u64,
    current_chips: u64,
    hands_remaining: usize,
    config: &HeuristicConfig,
) -> Vec<ScoredAction> {
    let chips_needed = blind_chips.saturating_sub(current_chips);
    let mut actions = Vec::new();

    for indices in subsets_up_to_five(hand.len()) {
        let cards_to_play: Vec<Card> = indices.iter().map(|&i| hand[i]).collect();
        let remaining: Vec<Card> = hand
            .iter()
            .enumerate()
            .filter(|(i, _)| !indices.contains(i))
            .map(|(_, c)| *c)
            .collect();

        let breakdown = match calculate_score(&cards_to_play, jokers, game_state, &remaining, None)
        {
            Ok(breakdown) => breakdown,
            Err(_) => continue,
        };

        let mut score = 0.0;
        let mut reasons: Vec<String> = Vec::new();

        let is_lethal = breakdown.final_score >= chips_needed;
        if is_lethal {
            score += config.lethal_bonus;
            reasons.push("LETHAL".to_string());
        }

        score += breakdown.hand_type.strength() as f64 * config.hand_type_weight;
        reasons.push(breakdown.hand_type.to_string());

        let efficiency = breakdown.final_score as f64 / cards_to_play.len() as f64;
        score += efficiency * config.chip_efficiency_weight;

        let synergy = joker_synergy(&cards_to_play, jokers, config);
        score += synergy;
        if synergy > 0.0 {
            reasons.push(format!("+{synergy:.0} synergy"));
        }

        // Urgency: weigh raw score harder when hands run short
        if hands_remaining <= 2 && !is_lethal {
            score += breakdown.final_score as f64 * 0.1;
            reasons.push("urgent".to_string());
        }

        // Card conservation: a lethal that burns many cards is worse
        if is_lethal && cards_to_play.len() > 2 {
            score -= cards_to_play.len() as f64 * 10.0;
            reasons.push("card conservation".to_string());
        }

        actions.push(ScoredAction {
            action_type: ActionType::Play,
            card_indices: indices,
            score,
            expected_chips: breakdown.final_score,
            reasoning: reasons.join(", "),
            is_lethal,
        });
    }

    actions.sort_by(|a, b| b.score.total_cmp(&a.score));
    actions
}

/// Rank every possible discard, best first.
pub fn evaluate_discards(
    hand: &[Card],
    jokers: &[JokerInstance],
    _game_state: &GameState,
    config: &HeuristicConfig,
) -> Vec<ScoredAction> {
    let mut actions = Vec::new();

    // Cards in the current best pattern are worth protecting
    let best_hand_cards: Vec<Card> = find_best_hand(hand)
        .map(|(_, result)| result.scoring_cards)
        .unwrap_or_default();

    for indices in subsets_up_to_five(hand.len()) {
        let cards_to_discard: Vec<Card> = indices.iter().map(|&i| hand[i]).collect();
        let cards_to_keep: Vec<Card> = hand
            .iter()
            .enumerate()
            .filter(|(i, _)| !indices.contains(i))
            .map(|(_, c)| *c)
            .collect();

        let mut score = 0.0;
        let mut reasons: Vec<String> = Vec::new();

        if cards_to_discard
            .iter()
            .any(|c| best_hand_cards.contains(c))
        {
            score -= 500.0;
            reasons.push("breaks best hand".to_string());
        }

        let kept_potential = kept_cards_potential(&cards_to_keep);
        score += kept_potential * config.discard_improvement_weight;

        let low_card_bonus: f64 = cards_to_discard
            .iter()
            .map(|c| (14 - c.rank.value()) as f64)
            .sum::<f64>()
            * config.keep_high_cards_weight;
        score += low_card_bonus;
        if low_card_bonus > 50.0 {
            reasons.push("discarding low cards".to_string());
        }

        let kept_synergy = kept_card_synergy(&cards_to_keep, jokers, config);
        score += kept_synergy;
        if kept_synergy > 0.0 {
            reasons.push(format!("+{kept_synergy:.0} kept synergy"));
        }

        // Half the synergy of discarded cards is lost value
        score -= joker_synergy(&cards_to_discard, jokers, config) * 0.5;

        score -= cards_to_discard.len() as f64 * 5.0;
        reasons.push(format!("keep {} cards", cards_to_keep.len()));

        actions.push(ScoredAction {
            action_type: ActionType::Discard,
            card_indices: indices,
            score,
            expected_chips: 0,
            reasoning: reasons.join(", "),
            is_lethal: false,
        });
    }

    actions.sort_by(|a, b| b.score.total_cmp(&a.score));
    actions
}

/// Synergy between a card set and the held jokers.
fn joker_synergy(cards: &[Card], jokers: &[JokerInstance], config: &HeuristicConfig) -> f64 {
    let mut bonus = 0.0;

    let mut rank_counts = [0usize; 15];
    for card in cards {
        rank_counts[card.rank.value() as usize] += 1;
    }
    let max_count = rank_counts.iter().copied().max().unwrap_or(0);

    for joker in jokers {
        match joker.id {
            JokerId::GreedyJoker => {
                bonus += cards.iter().filter(|c| c.suit == Suit::Diamond).count() as f64
                    * config.joker_synergy_weight;
            }
            JokerId::LustyJoker => {
                bonus += cards.iter().filter(|c| c.suit == Suit::Heart).count() as f64
                    * config.joker_synergy_weight;
            }
            JokerId::WrathfulJoker => {
                bonus += cards.iter().filter(|c| c.suit == Suit::Spade).count() as f64
                    * config.joker_synergy_weight;
            }
            JokerId::GluttonousJoker => {
                bonus += cards.iter().filter(|c| c.suit == Suit::Club).count() as f64
                    * config.joker_synergy_weight;
            }
            JokerId::JollyJoker | JokerId::SlyJoker | JokerId::TheDuo => {
                if max_count >= 2 {
                    bonus += config.joker_synergy_weight;
                }
            }
            JokerId::ZanyJoker | JokerId::WilyJoker | JokerId::TheTrio => {
                if max_count >= 3 {
                    bonus += config.joker_synergy_weight * 1.5;
                }
            }
            JokerId::HalfJoker => {
                if cards.len() <= 3 {
                    bonus += config.joker_synergy_weight * 2.0;
                }
            }
            _ => {}
        }
    }
    bonus
}

/// Synergy of the cards we would keep in hand.
fn kept_card_synergy(cards: &[Card], jokers: &[JokerInstance], config: &HeuristicConfig) -> f64 {
    let mut bonus = 0.0;
    for joker in jokers {
        match joker.id {
            JokerId::Blackboard => {
                if cards
                    .iter()
                    .all(|c| matches!(c.suit, Suit::Spade | Suit::Club))
                {
                    bonus += config.keep_synergy_cards_weight * 3.0;
                }
            }
            JokerId::RaisedFist => {
                if let Some(lowest) = cards.iter().map(|c| c.rank.value()).min() {
                    bonus += lowest as f64 * 2.0;
                }
            }
            _ => {}
        }
    }
    bonus
}

/// Potential of a kept card set: made pairs and trips, four-flush and
/// four-straight draws, high cards.
fn kept_cards_potential(cards: &[Card]) -> f64 {
    if cards.is_empty() {
        return 0.0;
    }

    let mut rank_counts = [0usize; 15];
    let mut suit_counts = [0usize; 4];
    for card in cards {
        rank_counts[card.rank.value() as usize] += 1;
        suit_counts[card.suit as usize] += 1;
    }

    let mut score = 0.0;
    score += rank_counts.iter().filter(|&&c| c >= 2).count() as f64 * 50.0;
    score += rank_counts.iter().filter(|&&c| c >= 3).count() as f64 * 100.0;

    if suit_counts.iter().any(|&c| c >= 4) {
        score += 80.0;
    }

    let mut values: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    values.sort_unstable();
    values.dedup();
    let mut max_connected = 1;
    let mut connected = 1;
    for pair in values.windows(2) {
        if pair[1] - pair[0] == 1 {
            connected += 1;
            max_connected = max_connected.max(connected);
        } else {
            connected = 1;
        }
    }
    if max_connected >= 4 {
        score += 60.0;
    }

    score += cards.iter().filter(|c| c.rank.value() >= 10).count() as f64 * 10.0;
    score
}

/// Top-ranked play, if any.
pub fn get_best_play(
    hand: &[Card],
    jokers: &[JokerInstance],
    game_state: &GameState,
    blind_chips: u64,
    current_chips: u64,
    hands_remaining: usize,
) -> Option<ScoredAction> {
    evaluate_plays(
        hand,
        jokers,
        game_state,
        blind_chips,
        current_chips,
        hands_remaining,
        &HeuristicConfig::default(),
    )
    .into_iter()
    .next()
}

/// Top-ranked discard, if any.
pub fn get_best_discard(
    hand: &[Card],
    jokers: &[JokerInstance],
    game_state: &GameState,
) -> Option<ScoredAction> {
    evaluate_discards(hand, jokers, game_state, &HeuristicConfig::default())
        .into_iter()
        .next()
}

/// True when discarding beats playing: no lethal, hands to spare,
/// nothing better than a weak pair, a positive-score discard exists
/// and the best play falls well short of the requirement.
#[allow(clippy::too_many_arguments)]
pub fn should_discard(
    hand: &[Card],
    jokers: &[JokerInstance],
    game_state: &GameState,
    blind_chips: u64,
    current_chips: u64,
    hands_remaining: usize,
    discards_remaining: usize,
) -> bool {
    if discards_remaining == 0 {
        return false;
    }

    let best_play = match get_best_play(
        hand,
        jokers,
        game_state,
        blind_chips,
        current_chips,
        hands_remaining,
    ) {
        Some(play) => play,
        None => return false,
    };

    if best_play.is_lethal {
        return false;
    }
    if hands_remaining <= 1 {
        return false;
    }

    let current_best = match find_best_hand(hand) {
        Ok((_, result)) => result,
        Err(_) => return true,
    };

    if current_best.hand_type <= HandType::Pair {
        if let Some(best_discard) = get_best_discard(hand, jokers, game_state) {
            if best_discard.score > 0.0 {
                let chips_needed = blind_chips.saturating_sub(current_chips);
                if (best_play.expected_chips as f64) < chips_needed as f64 * 0.5 {
                    return true;
                }
            }
        }
    }

    false
}

/// Cumulative self-play statistics.
#[derive(Debug, Clone, Default)]
pub struct PlayerStats {
    pub games_played: usize,
    pub games_won: usize,
    pub best_ante: usize,
    pub hands_played: usize,
    pub discards_used: usize,
}

/// Rule-based player able to drive complete games. Used as the MCTS
/// rollout policy and for baseline benchmarking.
#[derive(Debug, Clone, Default)]
pub struct HeuristicPlayer {
    pub config: HeuristicConfig,
    pub stats: PlayerStats,
}

impl HeuristicPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play through one blind; true when it was beaten.
    pub fn play_blind(&mut self, game: &mut GameSimulator) -> bool {
        while game.phase == GamePhase::Playing {
            let state = game.game_state();

            if should_discard(
                &game.hand,
                &game.jokers,
                &state,
                game.blind_chips,
                game.current_chips,
                game.hands_remaining,
                game.discards_remaining,
            ) {
                if let Some(discard) = get_best_discard(&game.hand, &game.jokers, &state) {
                    if game.discard(&discard.card_indices).is_ok() {
                        self.stats.discards_used += 1;
                        continue;
                    }
                }
            }

            let best = match get_best_play(
                &game.hand,
                &game.jokers,
                &state,
                game.blind_chips,
                game.current_chips,
                game.hands_remaining,
            ) {
                Some(play) => play,
                None => break,
            };

            match game.play_hand(&best.card_indices) {
                Ok(outcome) => {
                    self.stats.hands_played += 1;
                    if outcome.blind_beaten {
                        return true;
                    }
                    if outcome.game_over {
                        return false;
                    }
                }
                Err(_) => break,
            }
        }
        game.current_chips >= game.blind_chips
    }

    /// Drive a complete run; true on a win.
    pub fn play_game(&mut self, game: &mut GameSimulator) -> bool {
        self.stats.games_played += 1;

        while !game.is_game_over() {
            match game.phase {
                GamePhase::BlindSelect => {
                    let _ = game.start_blind();
                }
                GamePhase::Playing => {
                    self.play_blind(game);
                }
                GamePhase::Shop => {
                    let _ = game.end_shop();
                }
                GamePhase::GameOver => break,
            }
            self.stats.best_ante = self.stats.best_ante.max(game.ante);
        }

        if game.is_won() {
            self.stats.games_won += 1;
            return true;
        }
        false
    }

    pub fn win_rate(&self) -> f64 {
        if self.stats.games_played == 0 {
            return 0.0;
        }
        self.stats.games_won as f64 / self.stats.games_played as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(specs: &[&str]) -> Vec<Card> {
        specs.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_lethal_play_ranks_first() {
        let hand = cards(&["AS", "AH", "AC", "AD", "KS", "2C", "3D", "7H"]);
        let state = GameState::default();
        let actions = evaluate_plays(&hand, &[], &state, 100, 0, 4, &HeuristicConfig::default());

        let best = &actions[0];
        assert!(best.is_lethal);
        assert!(best.reasoning.contains("LETHAL"));
    }

    #[test]
    fn test_plays_sorted_descending() {
        let hand = cards(&["AS", "AH", "KD", "2C", "9H"]);
        let state = GameState::default();
        let actions =
            evaluate_plays(&hand, &[], &state, 5000, 0, 4, &HeuristicConfig::default());
        for pair in actions.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_discard_protects_best_hand() {
        let hand = cards(&["AS", "AH", "2C", "3D", "5H"]);
        let state = GameState::default();
        let actions = evaluate_discards(&hand, &[], &state, &HeuristicConfig::default());

        let best = &actions[0];
        // Best discard never throws away the pair of aces
        assert!(!best.card_indices.contains(&0));
        assert!(!best.card_indices.contains(&1));
    }

    #[test]
    fn test_suit_joker_synergy_counts_cards() {
        let diamonds = cards(&["2D", "5D"]);
        let greedy = vec![JokerInstance::new(JokerId::GreedyJoker)];
        let config = HeuristicConfig::default();
        assert_eq!(joker_synergy(&diamonds, &greedy, &config), 100.0);

        let spades = cards(&["2S", "5S"]);
        assert_eq!(joker_synergy(&spades, &greedy, &config), 0.0);
    }

    #[test]
    fn test_kept_cards_potential_values() {
        // A pair is worth 50, a high card 10 each
        let pair = cards(&["KS", "KH"]);
        assert_eq!(kept_cards_potential(&pair), 50.0 + 20.0);

        // Four to a flush
        let flush_draw = cards(&["2H", "5H", "8H", "JH"]);
        assert_eq!(kept_cards_potential(&flush_draw), 80.0 + 10.0);

        // Four connected ranks
        let run = cards(&["4S", "5H", "6D", "7C"]);
        assert_eq!(kept_cards_potential(&run), 60.0);
    }

    #[test]
    fn test_should_discard_refuses_on_lethal() {
        let hand = cards(&["AS", "AH", "AC", "AD", "KS"]);
        let state = GameState::default();
        assert!(!should_discard(&hand, &[], &state, 100, 0, 4, 3));
    }

    #[test]
    fn test_should_discard_refuses_on_last_hand() {
        let hand = cards(&["2S", "5H", "7C", "9D", "JH"]);
        let state = GameState::default();
        assert!(!should_discard(&hand, &[], &state, 5000, 0, 1, 3));
        assert!(!should_discard(&hand, &[], &state, 5000, 0, 4, 0));
    }

    #[test]
    fn test_should_discard_weak_hand_far_from_target() {
        // Junk hand against a big requirement with resources to spare
        let hand = cards(&["2S", "5H", "7C", "9D", "JH", "3C", "8S", "QD"]);
        let state = GameState::default();
        assert!(should_discard(&hand, &[], &state, 100_000, 0, 4, 3));
    }

    #[test]
    fn test_heuristic_player_beats_easy_blind() {
        let mut game = GameSimulator::with_seed(42);
        game.start_blind().unwrap();
        game.blind_chips = 10;

        let mut player = HeuristicPlayer::new();
        assert!(player.play_blind(&mut game));
        assert!(player.stats.hands_played >= 1);
    }

    #[test]
    fn test_heuristic_player_full_game_terminates() {
        let mut game = GameSimulator::with_seed(7);
        let mut player = HeuristicPlayer::new();
        player.play_game(&mut game);
        assert!(game.is_game_over());
        assert!(player.stats.games_played == 1);
        assert!(player.stats.best_ante >= 1);
    }
}
