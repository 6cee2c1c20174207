//! Hypergeometric probability and hand-completion estimators.
//!
//! Draws from the deck are without replacement, so completion odds are
//! hypergeometric over the tracker's exact remaining counts. The
//! multi-card straight estimator is a deliberate product-of-at-least-one
//! upper bound; its formula is pinned by tests because the decision
//! engine's discard EV is built on it.

use indexmap::IndexMap;

use crate::card::{Card, Rank, Suit};
use crate::deck::DeckTracker;
use crate::rank::HandType;

const STRAIGHT_SEQUENCES: [[u8; 5]; 10] = [
    [14, 2, 3, 4, 5],
    [2, 3, 4, 5, 6],
    [3, 4, 5, 6, 7],
    [4, 5, 6, 7, 8],
    [5, 6, 7, 8, 9],
    [6, 7, 8, 9, 10],
    [7, 8, 9, 10, 11],
    [8, 9, 10, 11, 12],
    [9, 10, 11, 12, 13],
    [10, 11, 12, 13, 14],
];

/// Binomial coefficient as f64. Population sizes here stay at deck
/// scale, well inside f64 precision.
fn choose(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut result = 1.0;
    for i in 0..k {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result
}

/// P(X = k) for the hypergeometric distribution: k successes in
/// `draws` draws from a population of `population` containing
/// `successes` successes. Impossible configurations yield 0.
pub fn hypergeometric_pmf(
    successes: usize,
    population: usize,
    draws: usize,
    k: usize,
) -> f64 {
    if draws > population || k > successes || k > draws {
        return 0.0;
    }
    if draws - k > population - successes {
        return 0.0;
    }

    let denominator = choose(population, draws);
    if denominator == 0.0 {
        return 0.0;
    }
    choose(successes, k) * choose(population - successes, draws - k) / denominator
}

/// P(X >= k) = 1 - sum of P(X = i) for i < k. Non-positive k yields 1.
pub fn hypergeometric_cdf_at_least(
    successes: usize,
    population: usize,
    draws: usize,
    k: usize,
) -> f64 {
    if k == 0 {
        return 1.0;
    }
    let below: f64 = (0..k)
        .map(|i| hypergeometric_pmf(successes, population, draws, i))
        .sum();
    1.0 - below
}

/// Per-suit flush completion probability. Wild cards in hand count
/// toward every suit.
pub fn flush_completion_probability(
    hand: &[Card],
    tracker: &mut DeckTracker,
    draws: usize,
) -> IndexMap<Suit, f64> {
    let mut results = IndexMap::new();
    let total_remaining = tracker.total_remaining();

    for suit in Suit::suits() {
        let in_hand = hand.iter().filter(|c| c.has_suit(suit)).count();
        let needed = 5usize.saturating_sub(in_hand);

        let probability = if needed == 0 {
            1.0
        } else if total_remaining == 0 || draws == 0 || needed > draws {
            0.0
        } else {
            hypergeometric_cdf_at_least(tracker.suit_count(suit), total_remaining, draws, needed)
        };
        results.insert(suit, probability);
    }
    results
}

/// Probability of completing any straight after `draws` draws.
///
/// Exact for hands one card away; multi-card completion uses the
/// product of per-rank at-least-one probabilities with the population
/// decremented between factors. That product is an upper bound, but it
/// is monotonic in draws and exact at the need = 0 / need = 1 /
/// need > draws boundaries.
pub fn straight_completion_probability(
    hand: &[Card],
    tracker: &mut DeckTracker,
    draws: usize,
) -> f64 {
    let total_remaining = tracker.total_remaining();
    if has_straight(hand) {
        return 1.0;
    }
    if total_remaining == 0 || draws == 0 {
        return 0.0;
    }

    let mut have_rank = [false; 15];
    for card in hand.iter().filter(|c| !c.is_stone()) {
        have_rank[card.rank.value() as usize] = true;
    }

    let mut best = 0.0f64;
    for seq in &STRAIGHT_SEQUENCES {
        let have = seq.iter().filter(|v| have_rank[**v as usize]).count();
        let needed = 5 - have;

        if needed == 0 {
            return 1.0;
        }
        if needed > draws {
            continue;
        }

        let missing: Vec<Rank> = seq
            .iter()
            .filter(|v| !have_rank[**v as usize])
            .map(|v| Rank::from_value(*v).expect("sequence ranks are valid"))
            .collect();

        let probability = if missing.len() == 1 {
            hypergeometric_cdf_at_least(tracker.rank_count(missing[0]), total_remaining, draws, 1)
        } else {
            sequence_completion_probability(&missing, tracker, total_remaining, draws)
        };
        best = best.max(probability);
    }
    best
}

fn sequence_completion_probability(
    missing: &[Rank],
    tracker: &mut DeckTracker,
    total_remaining: usize,
    draws: usize,
) -> f64 {
    let mut probability = 1.0;
    let mut remaining = total_remaining;

    for rank in missing {
        let available = tracker.rank_count(*rank);
        if available == 0 {
            return 0.0;
        }
        if remaining < draws {
            return 0.0;
        }
        let p_none = choose(remaining - available, draws) / choose(remaining, draws);
        probability *= 1.0 - p_none;
        remaining -= 1;
    }
    probability
}

/// Whether the hand already contains a 5-card straight.
fn has_straight(hand: &[Card]) -> bool {
    if hand.len() < 5 {
        return false;
    }
    let mut values: Vec<u8> = hand
        .iter()
        .filter(|c| !c.is_stone())
        .map(|c| c.rank.value())
        .collect();
    values.sort_unstable();
    values.dedup();

    if values.windows(5).any(|w| w[4] - w[0] == 4) {
        return true;
    }
    // Wheel
    [14u8, 2, 3, 4, 5].iter().all(|v| values.contains(v))
}

/// Probability of upgrading held pairs/trips into the target category.
pub fn pair_upgrade_probability(
    hand: &[Card],
    tracker: &mut DeckTracker,
    draws: usize,
    target: HandType,
) -> f64 {
    let total_remaining = tracker.total_remaining();
    if total_remaining == 0 || draws == 0 {
        return 0.0;
    }

    let mut rank_counts = [0usize; 15];
    for card in hand.iter().filter(|c| !c.is_stone()) {
        rank_counts[card.rank.value() as usize] += 1;
    }
    let ranks_with = |predicate: fn(usize) -> bool| -> Vec<Rank> {
        Rank::ranks()
            .iter()
            .filter(|r| predicate(rank_counts[r.value() as usize]))
            .copied()
            .collect()
    };

    match target {
        HandType::ThreeOfAKind => {
            let pairs = ranks_with(|c| c == 2);
            pairs
                .iter()
                .map(|rank| {
                    hypergeometric_cdf_at_least(
                        tracker.rank_count(*rank),
                        total_remaining,
                        draws,
                        1,
                    )
                })
                .fold(0.0, f64::max)
        }
        HandType::FullHouse => {
            let trips = ranks_with(|c| c >= 3);
            let pairs = ranks_with(|c| c >= 2);

            if !trips.is_empty() && pairs.len() >= 2 {
                return 1.0;
            }
            if !trips.is_empty() {
                // Have trips, need to pair one of the singles
                let singles = ranks_with(|c| c == 1);
                return singles
                    .iter()
                    .map(|rank| {
                        hypergeometric_cdf_at_least(
                            tracker.rank_count(*rank),
                            total_remaining,
                            draws,
                            1,
                        )
                    })
                    .fold(0.0, f64::max);
            }
            if !pairs.is_empty() {
                // Upgrade the most-available pair to trips
                let best_pair = pairs
                    .iter()
                    .max_by_key(|rank| tracker.rank_count(**rank))
                    .copied()
                    .expect("pairs is non-empty");
                return hypergeometric_cdf_at_least(
                    tracker.rank_count(best_pair),
                    total_remaining,
                    draws,
                    1,
                );
            }
            0.0
        }
        HandType::FourOfAKind => {
            let trips = ranks_with(|c| c >= 3);
            let pairs = ranks_with(|c| c >= 2);
            let mut best = 0.0f64;

            for rank in &trips {
                let needed = 4 - rank_counts[rank.value() as usize].min(4);
                best = best.max(hypergeometric_cdf_at_least(
                    tracker.rank_count(*rank),
                    total_remaining,
                    draws,
                    needed,
                ));
            }
            if draws >= 2 {
                for rank in &pairs {
                    if trips.contains(rank) {
                        continue;
                    }
                    let needed = 4 - rank_counts[rank.value() as usize].min(4);
                    best = best.max(hypergeometric_cdf_at_least(
                        tracker.rank_count(*rank),
                        total_remaining,
                        draws,
                        needed,
                    ));
                }
            }
            best
        }
        _ => 0.0,
    }
}

/// Completion probabilities for the named improvement targets.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionProbabilities {
    pub flush: IndexMap<Suit, f64>,
    pub straight: f64,
    pub three_of_a_kind: f64,
    pub full_house: f64,
    pub four_of_a_kind: f64,
}

impl CompletionProbabilities {
    /// Best flush probability across the four suits.
    pub fn best_flush(&self) -> f64 {
        self.flush.values().copied().fold(0.0, f64::max)
    }

    /// The most likely improvement and its probability.
    pub fn best_improvement(&self) -> (&'static str, f64) {
        let options = [
            ("flush", self.best_flush()),
            ("straight", self.straight),
            ("three_of_a_kind", self.three_of_a_kind),
            ("full_house", self.full_house),
            ("four_of_a_kind", self.four_of_a_kind),
        ];
        options
            .into_iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .expect("options is non-empty")
    }
}

/// Calculate completion probabilities for all improvement targets.
pub fn calculate_all_completion_probabilities(
    hand: &[Card],
    tracker: &mut DeckTracker,
    draws: usize,
) -> CompletionProbabilities {
    CompletionProbabilities {
        flush: flush_completion_probability(hand, tracker, draws),
        straight: straight_completion_probability(hand, tracker, draws),
        three_of_a_kind: pair_upgrade_probability(hand, tracker, draws, HandType::ThreeOfAKind),
        full_house: pair_upgrade_probability(hand, tracker, draws, HandType::FullHouse),
        four_of_a_kind: pair_upgrade_probability(hand, tracker, draws, HandType::FourOfAKind),
    }
}
