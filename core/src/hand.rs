use itertools::Itertools;

use crate::card::{Card, Rank, Suit};
use crate::error::HandError;
use crate::rank::HandType;

/// Result of evaluating a played hand: the category, the subset of
/// played cards that score, and the level-adjusted base values.
///
/// Invariant: stone-enhanced cards are always scoring cards, even when
/// they take no part in the pattern.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandResult {
    pub hand_type: HandType,
    pub scoring_cards: Vec<Card>,
    pub base_chips: u64,
    pub base_mult: u64,
}

impl HandResult {
    /// Base score before any joker effects: chips x mult.
    pub fn base_score(&self) -> u64 {
        self.base_chips * self.base_mult
    }
}

/// Evaluate 1-5 played cards into the best matching category.
///
/// Stone cards are split out first: they never shape the pattern but
/// always join the scoring cards. Wild cards complete any flush. The
/// straight predicate accepts the wheel (A-2-3-4-5) and Broadway
/// (10-J-Q-K-A).
pub fn evaluate_hand(cards: &[Card], level: usize) -> Result<HandResult, HandError> {
    if cards.is_empty() {
        return Err(HandError::NoCards);
    }
    if cards.len() > 5 {
        return Err(HandError::TooManyCards);
    }

    let (stone_cards, normal_cards): (Vec<Card>, Vec<Card>) =
        cards.iter().copied().partition(|c| c.is_stone());

    // Rank histogram over non-stone cards, indexed by rank value.
    let mut rank_counts = [0u8; 15];
    for card in &normal_cards {
        rank_counts[card.rank.value() as usize] += 1;
    }

    let mut sorted_ranks: Vec<Rank> = normal_cards.iter().map(|c| c.rank).collect();
    sorted_ranks.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = check_flush(&normal_cards);
    let is_straight = check_straight(&sorted_ranks);

    // Rank frequencies, largest first.
    let mut count_values: Vec<u8> = rank_counts.iter().copied().filter(|&c| c > 0).collect();
    count_values.sort_unstable_by(|a, b| b.cmp(a));

    let (hand_type, mut scoring_cards) = identify_hand(
        &normal_cards,
        &rank_counts,
        &count_values,
        is_flush,
        is_straight,
        &sorted_ranks,
    );

    // Stone cards always score in addition to the pattern cards.
    scoring_cards.extend(stone_cards);

    // One extra copy of base chips per level above 1, +1 mult per level.
    let mut base_chips = hand_type.base_chips();
    base_chips += (level.saturating_sub(1) as u64) * hand_type.base_chips();
    for card in &scoring_cards {
        base_chips += card.chips();
    }
    let base_mult = hand_type.base_mult() + level.saturating_sub(1) as u64;

    Ok(HandResult {
        hand_type,
        scoring_cards,
        base_chips,
        base_mult,
    })
}

/// Flush check over non-stone cards: a wild card completes any suit.
fn check_flush(cards: &[Card]) -> bool {
    if cards.len() < 5 {
        return false;
    }

    let wild_count = cards.iter().filter(|c| c.is_wild()).count();
    let non_wild: Vec<&Card> = cards.iter().filter(|c| !c.is_wild()).collect();

    // All wild cards make a flush in any suit.
    if non_wild.is_empty() {
        return true;
    }

    Suit::suits()
        .iter()
        .any(|s| non_wild.iter().filter(|c| c.suit == *s).count() + wild_count >= 5)
}

/// Straight check over ranks sorted descending.
fn check_straight(sorted_ranks: &[Rank]) -> bool {
    if sorted_ranks.len() < 5 {
        return false;
    }

    if sorted_ranks
        .windows(2)
        .all(|w| w[0].value() == w[1].value() + 1)
    {
        return true;
    }

    // Wheel: A-5-4-3-2 when sorted descending with Ace high.
    matches!(
        sorted_ranks,
        [Rank::Ace, Rank::Five, Rank::Four, Rank::Three, Rank::Two]
    )
}

/// Apply the category predicates in order, strongest first, and select
/// the scoring cards for the winning category.
fn identify_hand(
    cards: &[Card],
    rank_counts: &[u8; 15],
    count_values: &[u8],
    is_flush: bool,
    is_straight: bool,
    sorted_ranks: &[Rank],
) -> (HandType, Vec<Card>) {
    let top_count = count_values.first().copied().unwrap_or(0);
    let full_house = count_values.len() >= 2 && count_values[0] == 3 && count_values[1] == 2;

    let of_a_kind = |n: u8| -> Vec<Card> {
        cards
            .iter()
            .filter(|c| rank_counts[c.rank.value() as usize] == n)
            .copied()
            .collect()
    };

    if top_count == 5 && is_flush {
        return (HandType::FlushFive, cards.to_vec());
    }
    if top_count == 5 {
        return (HandType::FiveOfAKind, cards.to_vec());
    }
    if is_flush && is_straight {
        if sorted_ranks.first() == Some(&Rank::Ace) && sorted_ranks.last() == Some(&Rank::Ten) {
            return (HandType::RoyalFlush, cards.to_vec());
        }
        return (HandType::StraightFlush, cards.to_vec());
    }
    if top_count == 4 {
        return (HandType::FourOfAKind, of_a_kind(4));
    }
    if full_house && is_flush {
        return (HandType::FlushHouse, cards.to_vec());
    }
    if full_house {
        return (HandType::FullHouse, cards.to_vec());
    }
    if is_flush {
        return (HandType::Flush, cards.to_vec());
    }
    if is_straight {
        return (HandType::Straight, cards.to_vec());
    }
    if top_count == 3 {
        return (HandType::ThreeOfAKind, of_a_kind(3));
    }
    if count_values.len() >= 2 && count_values[0] == 2 && count_values[1] == 2 {
        return (HandType::TwoPair, of_a_kind(2));
    }
    if top_count == 2 {
        return (HandType::Pair, of_a_kind(2));
    }

    // High card: only the single highest-ranked card scores.
    match cards.iter().max_by_key(|c| c.rank) {
        Some(high) => (HandType::HighCard, vec![*high]),
        None => (HandType::HighCard, Vec::new()),
    }
}

/// Find the best 5-card play from a larger set by exhaustive C(N,5)
/// enumeration, ordered by category first and base score as tie-break.
pub fn find_best_hand(cards: &[Card]) -> Result<(Vec<Card>, HandResult), HandError> {
    if cards.is_empty() {
        return Err(HandError::NoCards);
    }
    if cards.len() <= 5 {
        let result = evaluate_hand(cards, 1)?;
        return Ok((cards.to_vec(), result));
    }

    let mut best: Option<(Vec<Card>, HandResult)> = None;
    for combo in cards.iter().copied().combinations(5) {
        let result = evaluate_hand(&combo, 1)?;
        let better = match &best {
            None => true,
            Some((_, current)) => {
                (result.hand_type, result.base_score())
                    > (current.hand_type, current.base_score())
            }
        };
        if better {
            best = Some((combo, result));
        }
    }
    Ok(best.expect("at least one 5-card combination"))
}
