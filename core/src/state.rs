use std::collections::HashMap;

use strum::IntoEnumIterator;

use crate::rank::HandType;

/// Snapshot of the ambient game state the scoring engine and decision
/// engine need: per-category hand levels plus the round resources that
/// context-dependent joker effects read.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Hand level upgrades, from planet cards. Missing entries mean
    /// level 1.
    pub hand_levels: HashMap<HandType, usize>,
    pub hands_remaining: usize,
    pub discards_remaining: usize,
    pub money: i64,
    pub ante: usize,
    pub blind_requirement: u64,
    pub current_chips: u64,
}

impl GameState {
    pub fn level(&self, hand_type: HandType) -> usize {
        self.hand_levels.get(&hand_type).copied().unwrap_or(1)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            hand_levels: HandType::iter().map(|ht| (ht, 1)).collect(),
            hands_remaining: 4,
            discards_remaining: 3,
            money: 4,
            ante: 1,
            blind_requirement: 300,
            current_chips: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_levels() {
        let state = GameState::default();
        assert_eq!(state.level(HandType::Pair), 1);
        assert_eq!(state.level(HandType::FlushFive), 1);
    }

    #[test]
    fn test_missing_level_defaults_to_one() {
        let mut state = GameState::default();
        state.hand_levels.clear();
        assert_eq!(state.level(HandType::Straight), 1);

        state.hand_levels.insert(HandType::Straight, 3);
        assert_eq!(state.level(HandType::Straight), 3);
    }
}
