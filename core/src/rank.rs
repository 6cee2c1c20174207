use std::fmt;
use strum::EnumIter;

/// All the different poker hand categories, ordered weakest to
/// strongest. Includes the two Balatro secret hands: FlushHouse (full
/// house, all one suit) and FlushFive (five of a kind, all one suit).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, EnumIter)]
pub enum HandType {
    HighCard = 1,
    Pair = 2,
    TwoPair = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
    FiveOfAKind = 11,
    FlushHouse = 12,
    FlushFive = 13,
}

impl HandType {
    /// Base chips at level 1.
    pub fn base_chips(&self) -> u64 {
        match self {
            Self::HighCard => 5,
            Self::Pair => 10,
            Self::TwoPair => 20,
            Self::ThreeOfAKind => 30,
            Self::Straight => 30,
            Self::Flush => 35,
            Self::FullHouse => 40,
            Self::FourOfAKind => 60,
            Self::StraightFlush => 100,
            Self::RoyalFlush => 100,
            Self::FiveOfAKind => 120,
            Self::FlushHouse => 140,
            Self::FlushFive => 160,
        }
    }

    /// Base mult at level 1.
    pub fn base_mult(&self) -> u64 {
        match self {
            Self::HighCard => 1,
            Self::Pair => 2,
            Self::TwoPair => 2,
            Self::ThreeOfAKind => 3,
            Self::Straight => 4,
            Self::Flush => 4,
            Self::FullHouse => 4,
            Self::FourOfAKind => 7,
            Self::StraightFlush => 8,
            Self::RoyalFlush => 8,
            Self::FiveOfAKind => 12,
            Self::FlushHouse => 14,
            Self::FlushFive => 16,
        }
    }

    /// Strength rank used by heuristic weighting (1 = HighCard).
    pub fn strength(&self) -> u64 {
        *self as u64
    }
}

impl fmt::Display for HandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighCard => write!(f, "High Card"),
            Self::Pair => write!(f, "Pair"),
            Self::TwoPair => write!(f, "Two Pair"),
            Self::ThreeOfAKind => write!(f, "Three of a Kind"),
            Self::Straight => write!(f, "Straight"),
            Self::Flush => write!(f, "Flush"),
            Self::FullHouse => write!(f, "Full House"),
            Self::FourOfAKind => write!(f, "Four of a Kind"),
            Self::StraightFlush => write!(f, "Straight Flush"),
            Self::RoyalFlush => write!(f, "Royal Flush"),
            Self::FiveOfAKind => write!(f, "Five of a Kind"),
            Self::FlushHouse => write!(f, "Flush House"),
            Self::FlushFive => write!(f, "Flush Five"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_ordering() {
        assert!(HandType::FlushFive > HandType::FlushHouse);
        assert!(HandType::RoyalFlush > HandType::StraightFlush);
        assert!(HandType::Pair > HandType::HighCard);
    }

    #[test]
    fn test_base_values() {
        assert_eq!(HandType::HighCard.base_chips(), 5);
        assert_eq!(HandType::HighCard.base_mult(), 1);
        assert_eq!(HandType::Flush.base_chips(), 35);
        assert_eq!(HandType::Flush.base_mult(), 4);
        assert_eq!(HandType::FlushFive.base_chips(), 160);
        assert_eq!(HandType::FlushFive.base_mult(), 16);
    }

    #[test]
    fn test_thirteen_categories() {
        assert_eq!(HandType::iter().count(), 13);
    }
}
