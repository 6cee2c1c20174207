//! Wire types for the live bridge.
//!
//! Newline-delimited JSON: each inbound line is a full game snapshot
//! from the game-side mod, each outbound line is an action
//! recommendation. Unknown joker ids on the wire are logged and
//! dropped from the held sequence, never fatal.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::card::{Card, Edition, Enhancement, Rank, Seal, Suit};
use crate::deck::DeckTracker;
use crate::joker::{JokerId, JokerInstance};
use crate::rank::HandType;
use crate::state::GameState;

fn default_rank() -> u8 {
    2
}

fn default_suit() -> String {
    "Spades".to_string()
}

fn default_hands() -> usize {
    4
}

fn default_discards() -> usize {
    3
}

fn default_hand_size() -> usize {
    8
}

fn default_ante() -> usize {
    1
}

fn default_stake() -> usize {
    1
}

fn default_reroll_cost() -> i64 {
    5
}

fn default_nines() -> usize {
    4
}

fn default_blind_type() -> String {
    "Small".to_string()
}

/// A card as reported by the live game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveCard {
    #[serde(default = "default_suit")]
    pub suit: String,
    #[serde(default = "default_rank")]
    pub rank: u8,
    #[serde(default)]
    pub rank_name: String,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub enhancement: Option<String>,
    #[serde(default)]
    pub seal: Option<String>,
    /// Either an edition name or an object of boolean flags,
    /// depending on the mod version.
    #[serde(default)]
    pub edition: Option<serde_json::Value>,
    #[serde(default)]
    pub debuff: bool,
    #[serde(default)]
    pub highlighted: bool,
}

impl LiveCard {
    /// Convert to the engine's card model. Unknown field values fall
    /// back to an unmodified card rather than failing the snapshot.
    pub fn to_card(&self) -> Card {
        let rank = Rank::from_value(self.rank).unwrap_or(Rank::Two);
        let suit = match self.suit.as_str() {
            "Hearts" => Suit::Heart,
            "Clubs" => Suit::Club,
            "Diamonds" => Suit::Diamond,
            _ => Suit::Spade,
        };
        let mut card = Card::new(rank, suit);

        if let Some(enhancement) = self.enhancement.as_deref().and_then(parse_enhancement) {
            card = card.with_enhancement(enhancement);
        }
        if let Some(seal) = self.seal.as_deref().and_then(parse_seal) {
            card = card.with_seal(seal);
        }
        if let Some(edition) = self.edition.as_ref().and_then(parse_edition) {
            card = card.with_edition(edition);
        }
        card
    }
}

fn parse_enhancement(name: &str) -> Option<Enhancement> {
    match name.to_lowercase().as_str() {
        "bonus" => Some(Enhancement::Bonus),
        "mult" => Some(Enhancement::Mult),
        "wild" => Some(Enhancement::Wild),
        "glass" => Some(Enhancement::Glass),
        "steel" => Some(Enhancement::Steel),
        "stone" => Some(Enhancement::Stone),
        "gold" => Some(Enhancement::Gold),
        "lucky" => Some(Enhancement::Lucky),
        _ => None,
    }
}

fn parse_seal(name: &str) -> Option<Seal> {
    match name.to_lowercase().as_str() {
        "gold" => Some(Seal::Gold),
        "red" => Some(Seal::Red),
        "blue" => Some(Seal::Blue),
        "purple" => Some(Seal::Purple),
        _ => None,
    }
}

fn parse_edition(value: &serde_json::Value) -> Option<Edition> {
    match value {
        serde_json::Value::String(name) => match name.to_lowercase().as_str() {
            "foil" => Some(Edition::Foil),
            "holo" | "holographic" => Some(Edition::Holographic),
            "polychrome" => Some(Edition::Polychrome),
            "negative" => Some(Edition::Negative),
            _ => None,
        },
        serde_json::Value::Object(flags) => {
            let set = |key: &str| flags.get(key).and_then(|v| v.as_bool()).unwrap_or(false);
            if set("foil") {
                Some(Edition::Foil)
            } else if set("holo") || set("holographic") {
                Some(Edition::Holographic)
            } else if set("polychrome") {
                Some(Edition::Polychrome)
            } else if set("negative") {
                Some(Edition::Negative)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// A joker as reported by the live game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveJoker {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub sell_cost: i64,
    #[serde(default)]
    pub edition: Option<serde_json::Value>,
    #[serde(default)]
    pub debuff: bool,
    #[serde(default)]
    pub state: HashMap<String, serde_json::Value>,
}

impl LiveJoker {
    /// Resolve against the catalog; `None` (with a log line) for ids
    /// the engine does not know.
    pub fn to_instance(&self) -> Option<JokerInstance> {
        let mut normalized = self.id.to_lowercase().replace([' ', '-'], "_");
        if let Some(stripped) = normalized.strip_prefix("j_") {
            normalized = stripped.to_string();
        }

        let id = [self.id.as_str(), normalized.as_str()]
            .into_iter()
            .find_map(|candidate| JokerId::from_str(candidate).ok());

        match id {
            Some(id) => {
                let mut instance = JokerInstance::new(id);
                for (key, value) in &self.state {
                    if let Some(number) = value.as_f64() {
                        instance.state.insert(key.clone(), number);
                    }
                }
                Some(instance)
            }
            None => {
                warn!(id = %self.id, name = %self.name, "unknown joker id on the wire, dropping");
                None
            }
        }
    }
}

/// Blind information from the live game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveBlind {
    #[serde(default)]
    pub name: String,
    pub chips_required: u64,
    #[serde(default)]
    pub chips_scored: u64,
    #[serde(default)]
    pub boss_id: Option<String>,
    #[serde(default = "default_blind_type")]
    pub blind_type: String,
}

/// An item offered in the shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveShopItem {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cost: i64,
    #[serde(default, alias = "type")]
    pub item_type: String,
    #[serde(default)]
    pub joker_id: Option<String>,
    #[serde(default)]
    pub suit: Option<String>,
    #[serde(default)]
    pub rank: Option<u8>,
    #[serde(default)]
    pub edition: Option<String>,
}

/// The shop as reported by the live game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveShop {
    #[serde(default)]
    pub items: Vec<LiveShopItem>,
    #[serde(default)]
    pub vouchers: Vec<LiveShopItem>,
    #[serde(default)]
    pub boosters: Vec<LiveShopItem>,
    #[serde(default = "default_reroll_cost")]
    pub reroll_cost: i64,
}

/// Deck composition counts; exact identities are unknown on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveDeckInfo {
    #[serde(default)]
    pub cards_in_deck: usize,
    #[serde(default)]
    pub cards_in_hand: usize,
    #[serde(default)]
    pub cards_in_discard: usize,
    #[serde(default = "default_nines")]
    pub nines_in_deck: usize,
    #[serde(default)]
    pub deck_name: Option<String>,
}

impl Default for LiveDeckInfo {
    fn default() -> Self {
        Self {
            cards_in_deck: 0,
            cards_in_hand: 0,
            cards_in_discard: 0,
            nines_in_deck: default_nines(),
            deck_name: None,
        }
    }
}

/// Run statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveStats {
    #[serde(default)]
    pub hands_played: usize,
    #[serde(default)]
    pub cards_discarded: usize,
    #[serde(default)]
    pub boss_blinds_defeated: usize,
    #[serde(default)]
    pub blinds_skipped: usize,
}

/// One full inbound snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveState {
    pub phase_name: String,
    #[serde(default = "default_ante")]
    pub ante: usize,
    #[serde(default)]
    pub round: usize,
    #[serde(default = "default_stake")]
    pub stake: usize,
    #[serde(default)]
    pub money: i64,
    #[serde(default = "default_hands")]
    pub hands_remaining: usize,
    #[serde(default = "default_discards")]
    pub discards_remaining: usize,
    #[serde(default = "default_hand_size")]
    pub hand_size: usize,
    #[serde(default)]
    pub hand: Vec<LiveCard>,
    #[serde(default)]
    pub jokers: Vec<LiveJoker>,
    #[serde(default)]
    pub consumables: Vec<serde_json::Value>,
    #[serde(default)]
    pub blind: Option<LiveBlind>,
    #[serde(default)]
    pub shop: Option<LiveShop>,
    #[serde(default)]
    pub deck_info: LiveDeckInfo,
    #[serde(default)]
    pub stats: LiveStats,
    #[serde(default)]
    pub hand_levels: HashMap<String, usize>,
    #[serde(default)]
    pub vouchers_owned: Vec<String>,
    #[serde(default)]
    pub seed: Option<String>,
}

impl LiveState {
    pub fn cards(&self) -> Vec<Card> {
        self.hand.iter().map(|c| c.to_card()).collect()
    }

    /// Known jokers in wire order; unknown ids are dropped.
    pub fn joker_instances(&self) -> Vec<JokerInstance> {
        self.jokers.iter().filter_map(|j| j.to_instance()).collect()
    }

    pub fn blind_chips(&self) -> u64 {
        self.blind.as_ref().map(|b| b.chips_required).unwrap_or(300)
    }

    pub fn chips_scored(&self) -> u64 {
        self.blind.as_ref().map(|b| b.chips_scored).unwrap_or(0)
    }

    pub fn is_boss_blind(&self) -> bool {
        self.blind
            .as_ref()
            .map(|b| b.blind_type == "Boss")
            .unwrap_or(false)
    }

    /// Engine-side state snapshot.
    pub fn game_state(&self) -> GameState {
        let mut state = GameState {
            hands_remaining: self.hands_remaining,
            discards_remaining: self.discards_remaining,
            money: self.money,
            ante: self.ante,
            blind_requirement: self.blind_chips(),
            current_chips: self.chips_scored(),
            ..GameState::default()
        };
        for (name, level) in &self.hand_levels {
            if let Some(hand_type) = hand_type_from_name(name) {
                state.hand_levels.insert(hand_type, *level);
            }
        }
        state
    }

    /// Approximate deck tracker from the reported composition counts.
    pub fn deck_tracker(&self) -> DeckTracker {
        DeckTracker::from_distribution(self.deck_info.cards_in_deck, None, None)
    }
}

fn hand_type_from_name(name: &str) -> Option<HandType> {
    let normalized = name.to_lowercase().replace([' ', '_'], "");
    match normalized.as_str() {
        "highcard" => Some(HandType::HighCard),
        "pair" => Some(HandType::Pair),
        "twopair" => Some(HandType::TwoPair),
        "threeofakind" => Some(HandType::ThreeOfAKind),
        "straight" => Some(HandType::Straight),
        "flush" => Some(HandType::Flush),
        "fullhouse" => Some(HandType::FullHouse),
        "fourofakind" => Some(HandType::FourOfAKind),
        "straightflush" => Some(HandType::StraightFlush),
        "royalflush" => Some(HandType::RoyalFlush),
        "fiveofakind" => Some(HandType::FiveOfAKind),
        "flushhouse" => Some(HandType::FlushHouse),
        "flushfive" => Some(HandType::FlushFive),
        _ => None,
    }
}

/// One outbound action line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveAction {
    pub action_type: String,
    pub card_indices: Vec<usize>,
    pub skip: bool,
    pub reroll: bool,
    pub buy_index: Option<usize>,
    pub consumable_index: Option<usize>,
    pub confidence: f64,
    pub reasoning: String,
}

impl LiveAction {
    fn base(action_type: &str) -> Self {
        Self {
            action_type: action_type.to_string(),
            card_indices: Vec::new(),
            skip: false,
            reroll: false,
            buy_index: None,
            consumable_index: None,
            confidence: 0.0,
            reasoning: String::new(),
        }
    }

    pub fn wait(reasoning: impl Into<String>) -> Self {
        Self {
            reasoning: reasoning.into(),
            ..Self::base("wait")
        }
    }

    pub fn play(indices: Vec<usize>, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            card_indices: indices,
            confidence,
            reasoning: reasoning.into(),
            ..Self::base("play")
        }
    }

    pub fn discard(indices: Vec<usize>, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            card_indices: indices,
            confidence,
            reasoning: reasoning.into(),
            ..Self::base("discard")
        }
    }

    pub fn shop_buy(index: usize, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            buy_index: Some(index),
            confidence,
            reasoning: reasoning.into(),
            ..Self::base("shop")
        }
    }

    pub fn shop_reroll(confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            reroll: true,
            confidence,
            reasoning: reasoning.into(),
            ..Self::base("shop")
        }
    }

    pub fn shop_skip(confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            skip: true,
            confidence,
            reasoning: reasoning.into(),
            ..Self::base("shop")
        }
    }

    pub fn blind(skip: bool, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            skip,
            confidence,
            reasoning: reasoning.into(),
            ..Self::base("blind")
        }
    }

    pub fn pack_skip(reasoning: impl Into<String>) -> Self {
        Self {
            skip: true,
            confidence: 0.5,
            reasoning: reasoning.into(),
            ..Self::base("pack")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "phase_name": "SELECTING_HAND",
        "ante": 2,
        "round": 4,
        "stake": 1,
        "money": 12,
        "hands_remaining": 3,
        "discards_remaining": 2,
        "hand_size": 8,
        "hand": [
            {"suit": "Hearts", "rank": 14, "rank_name": "A", "index": 0},
            {"suit": "Spades", "rank": 14, "rank_name": "A", "index": 1, "enhancement": "glass", "seal": "red"},
            {"suit": "Diamonds", "rank": 10, "rank_name": "10", "index": 2, "edition": "foil"}
        ],
        "jokers": [
            {"id": "j_greedy_joker", "name": "Greedy Joker", "position": 0, "cost": 5, "sell_cost": 2},
            {"id": "some_modded_joker", "name": "Modded", "position": 1},
            {"id": "green_joker", "name": "Green Joker", "position": 2, "state": {"mult": 3}}
        ],
        "consumables": [],
        "blind": {"name": "Small Blind", "chips_required": 450, "chips_scored": 100, "blind_type": "Small"},
        "deck_info": {"cards_in_deck": 41, "cards_in_hand": 3, "cards_in_discard": 8, "nines_in_deck": 4},
        "hand_levels": {"Pair": 2, "Two Pair": 1},
        "vouchers_owned": [],
        "stats": {"hands_played": 10, "cards_discarded": 12, "boss_blinds_defeated": 1, "blinds_skipped": 0}
    }"#;

    #[test]
    fn test_snapshot_parses() {
        let state: LiveState = serde_json::from_str(SNAPSHOT).unwrap();
        assert_eq!(state.phase_name, "SELECTING_HAND");
        assert_eq!(state.ante, 2);
        assert_eq!(state.hand.len(), 3);
        assert_eq!(state.blind_chips(), 450);
        assert_eq!(state.chips_scored(), 100);
        assert!(!state.is_boss_blind());
        assert_eq!(state.deck_info.cards_in_deck, 41);
    }

    #[test]
    fn test_card_conversion_with_modifiers() {
        let state: LiveState = serde_json::from_str(SNAPSHOT).unwrap();
        let cards = state.cards();

        assert_eq!(cards[0], Card::new(Rank::Ace, Suit::Heart));

        assert_eq!(cards[1].rank, Rank::Ace);
        assert_eq!(cards[1].suit, Suit::Spade);
        assert_eq!(cards[1].enhancement, Some(Enhancement::Glass));
        assert_eq!(cards[1].seal, Some(Seal::Red));

        assert_eq!(cards[2].edition, Edition::Foil);
    }

    #[test]
    fn test_edition_object_form() {
        let card: LiveCard = serde_json::from_str(
            r#"{"suit": "Clubs", "rank": 5, "edition": {"polychrome": true}}"#,
        )
        .unwrap();
        assert_eq!(card.to_card().edition, Edition::Polychrome);
    }

    #[test]
    fn test_unknown_joker_dropped() {
        let state: LiveState = serde_json::from_str(SNAPSHOT).unwrap();
        let jokers = state.joker_instances();

        // Three on the wire, one unknown
        assert_eq!(jokers.len(), 2);
        assert_eq!(jokers[0].id, JokerId::GreedyJoker);
        assert_eq!(jokers[1].id, JokerId::GreenJoker);
        // Wire state carried over
        assert_eq!(jokers[1].state_value("mult"), 3.0);
    }

    #[test]
    fn test_joker_id_normalization() {
        let joker = LiveJoker {
            id: "J_Ride-The-Bus".to_string(),
            name: String::new(),
            position: 0,
            cost: 0,
            sell_cost: 0,
            edition: None,
            debuff: false,
            state: HashMap::new(),
        };
        assert_eq!(joker.to_instance().unwrap().id, JokerId::RideTheBus);
    }

    #[test]
    fn test_hand_levels_parsed() {
        let state: LiveState = serde_json::from_str(SNAPSHOT).unwrap();
        let game_state = state.game_state();
        assert_eq!(game_state.level(HandType::Pair), 2);
        assert_eq!(game_state.level(HandType::TwoPair), 1);
        assert_eq!(game_state.level(HandType::Flush), 1);
    }

    #[test]
    fn test_minimal_snapshot_defaults() {
        let state: LiveState = serde_json::from_str(r#"{"phase_name": "SHOP"}"#).unwrap();
        assert_eq!(state.hands_remaining, 4);
        assert_eq!(state.discards_remaining, 3);
        assert_eq!(state.hand_size, 8);
        assert_eq!(state.ante, 1);
        assert_eq!(state.blind_chips(), 300);
    }

    #[test]
    fn test_action_serialization_shape() {
        let action = LiveAction::play(vec![0, 2], 0.8, "Pair (A, A)");
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action_type"], "play");
        assert_eq!(json["card_indices"][1], 2);
        assert_eq!(json["skip"], false);
        assert_eq!(json["buy_index"], serde_json::Value::Null);
        assert_eq!(json["confidence"], 0.8);
    }

    #[test]
    fn test_deck_tracker_from_counts() {
        let state: LiveState = serde_json::from_str(SNAPSHOT).unwrap();
        let tracker = state.deck_tracker();
        assert_eq!(tracker.total_remaining(), 41);
    }
}
