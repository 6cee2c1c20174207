use std::fmt;
use std::str::FromStr;

use crate::error::ParseCardError;

// Useful balatro docs: https://balatrogame.fandom.com/wiki/Card_Ranks

/// Card rank. Discriminants match the in-game numeric rank (Ace high).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, PartialOrd, Eq, Ord, Debug, Clone, Copy, Hash)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

/// Constant of all the ranks, lowest to highest.
/// This is what `Rank::ranks()` returns.
const RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

impl Rank {
    pub const fn ranks() -> [Self; 13] {
        RANKS
    }

    /// Numeric rank value, 2..=14 with Ace = 14.
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Convert from a numeric rank value (2..=14).
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Jack),
            12 => Some(Rank::Queen),
            13 => Some(Rank::King),
            14 => Some(Rank::Ace),
            _ => None,
        }
    }

    /// Base chip contribution when this rank scores:
    /// pips at face value, face cards 10, Ace 11.
    pub fn chip_value(&self) -> u64 {
        match self {
            Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
            r => r.value() as u64,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rank::Ten => write!(f, "10"),
            Rank::Jack => write!(f, "J"),
            Rank::Queen => write!(f, "Q"),
            Rank::King => write!(f, "K"),
            Rank::Ace => write!(f, "A"),
            r => write!(f, "{}", r.value()),
        }
    }
}

/// Enum for the four different suits.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, PartialOrd, Eq, Ord, Debug, Clone, Copy, Hash)]
pub enum Suit {
    Spade = 0,
    Heart = 1,
    Club = 2,
    Diamond = 3,
}

/// All of the `Suit`'s. This is what `Suit::suits()` returns.
const SUITS: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Club, Suit::Diamond];

impl Suit {
    pub const fn suits() -> [Self; 4] {
        SUITS
    }

    pub fn unicode(&self) -> &str {
        match self {
            Self::Spade => "♤",
            Self::Heart => "♡",
            Self::Club => "♧",
            Self::Diamond => "♢",
        }
    }
}

impl From<Suit> for char {
    fn from(suit: Suit) -> Self {
        match suit {
            Suit::Spade => 'S',
            Suit::Heart => 'H',
            Suit::Club => 'C',
            Suit::Diamond => 'D',
        }
    }
}

/// Enum for card enhancements.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, PartialOrd, Eq, Ord, Debug, Clone, Copy, Hash)]
pub enum Enhancement {
    /// +30 chips when scored
    Bonus,
    /// +4 mult when scored
    Mult,
    /// Counts as every suit
    Wild,
    /// x2 mult, 1 in 4 chance to destroy
    Glass,
    /// x1.5 mult while held in hand
    Steel,
    /// +50 chips, no rank or suit, always scores
    Stone,
    /// $3 if held in hand at end of round
    Gold,
    /// 1 in 5 chance of +20 mult, 1 in 15 chance of $20
    Lucky,
}

/// Enum for card editions.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, PartialOrd, Eq, Ord, Debug, Clone, Copy, Hash)]
pub enum Edition {
    Base,
    /// +50 chips
    Foil,
    /// +10 mult
    Holographic,
    /// x1.5 mult
    Polychrome,
    /// +1 slot, no scoring effect
    Negative,
}

/// Enum for card seals.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, PartialOrd, Eq, Ord, Debug, Clone, Copy, Hash)]
pub enum Seal {
    /// $3 when played and scored
    Gold,
    /// Retrigger once
    Red,
    /// No scoring effect
    Blue,
    /// No scoring effect
    Purple,
}

/// A playing card with rank, suit and optional modifiers.
///
/// Cards are immutable values; modifier-changing operations return a new
/// card. The three modifier axes are independent: enhancement, edition
/// and seal.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, PartialOrd, Eq, Ord, Clone, Copy, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
    pub enhancement: Option<Enhancement>,
    pub edition: Edition,
    pub seal: Option<Seal>,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self {
            rank,
            suit,
            enhancement: None,
            edition: Edition::Base,
            seal: None,
        }
    }

    pub fn with_enhancement(self, enhancement: Enhancement) -> Self {
        Self {
            enhancement: Some(enhancement),
            ..self
        }
    }

    pub fn with_edition(self, edition: Edition) -> Self {
        Self { edition, ..self }
    }

    pub fn with_seal(self, seal: Seal) -> Self {
        Self {
            seal: Some(seal),
            ..self
        }
    }

    /// Wild cards count as every suit.
    pub fn is_wild(&self) -> bool {
        self.enhancement == Some(Enhancement::Wild)
    }

    /// Stone cards have no rank or suit for pattern purposes but
    /// always score.
    pub fn is_stone(&self) -> bool {
        self.enhancement == Some(Enhancement::Stone)
    }

    /// Suit match considering modifiers: stone matches nothing, wild
    /// matches everything.
    pub fn has_suit(&self, suit: Suit) -> bool {
        if self.is_stone() {
            return false;
        }
        if self.is_wild() {
            return true;
        }
        self.suit == suit
    }

    pub fn is_face(&self) -> bool {
        matches!(self.rank, Rank::Jack | Rank::Queen | Rank::King)
    }

    pub fn is_even(&self) -> bool {
        !self.is_face() && self.rank != Rank::Ace && self.rank.value() % 2 == 0
    }

    pub fn is_odd(&self) -> bool {
        self.rank == Rank::Ace || (!self.is_face() && self.rank.value() % 2 == 1)
    }

    /// Base chip contribution when scored; 50 for stone cards,
    /// otherwise rank-derived. Modifier bonuses (Foil etc.) are
    /// applied by the scoring engine, not here.
    pub fn chips(&self) -> u64 {
        if self.is_stone() {
            50
        } else {
            self.rank.chip_value()
        }
    }
}

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parse the compact form used for test seeding: `"AS"`, `"10H"`, `"KD"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();
        if s.len() < 2 {
            return Err(ParseCardError::Empty);
        }
        let suit_char = s.chars().last().expect("len checked above");
        let rank_str = &s[..s.len() - suit_char.len_utf8()];

        let suit = match suit_char {
            'S' => Suit::Spade,
            'H' => Suit::Heart,
            'C' => Suit::Club,
            'D' => Suit::Diamond,
            c => return Err(ParseCardError::InvalidSuit(c)),
        };
        let rank = match rank_str {
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "10" | "T" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "A" => Rank::Ace,
            other => return Err(ParseCardError::InvalidRank(other.to_string())),
        };
        Ok(Card::new(rank, suit))
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Card({}{})", self.rank, self.suit.unicode())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit.unicode())
    }
}

/// Create the standard 52-card deck, unmodified.
pub fn create_standard_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(52);
    for suit in &Suit::suits() {
        for rank in &Rank::ranks() {
            cards.push(Card::new(*rank, *suit));
        }
    }
    cards
}
