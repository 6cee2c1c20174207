use indexmap::IndexMap;

use crate::card::{create_standard_deck, Card, Rank, Suit};

/// The 10 canonical 5-rank straight sequences, wheel through Broadway.
/// Ace is 14 in the wheel entry.
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

/// Aggregate straight-draw analysis over the canonical sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StraightPotential {
    /// Draws missing one card at either end of a sequence.
    pub open_ended: usize,
    /// Draws missing one inner card, or two cards with three held.
    pub gutshot: usize,
    /// Best remaining-deck count for any single missing rank.
    pub best_outs: usize,
}

/// Tracks the composition of the remaining draw pile so the
/// probability module can work over exact counts.
///
/// Invariant: remaining + played + discarded equals the starting deck
/// by multiplicity, except across an explicit `reset`.
#[derive(Debug, Clone)]
pub struct DeckTracker {
    remaining: Vec<Card>,
    played: Vec<Card>,
    discarded: Vec<Card>,

    // Count caches, recomputed lazily after mutations.
    suit_counts: [usize; 4],
    rank_counts: [usize; 15],
    dirty: bool,
}

impl DeckTracker {
    /// Fresh standard 52-card deck, nothing seen.
    pub fn new() -> Self {
        let mut tracker = Self {
            remaining: create_standard_deck(),
            played: Vec::new(),
            discarded: Vec::new(),
            suit_counts: [0; 4],
            rank_counts: [0; 15],
            dirty: true,
        };
        tracker.update_counts();
        tracker
    }

    /// Build from known cards: everything seen (hand, played,
    /// discarded) is subtracted from a fresh standard deck.
    pub fn from_known_cards(hand: &[Card], played: &[Card], discarded: &[Card]) -> Self {
        let mut remaining = create_standard_deck();
        for seen in hand.iter().chain(played).chain(discarded) {
            if let Some(pos) = remaining
                .iter()
                .position(|c| c.rank == seen.rank && c.suit == seen.suit)
            {
                remaining.remove(pos);
            }
        }
        let mut tracker = Self {
            remaining,
            played: played.to_vec(),
            discarded: discarded.to_vec(),
            suit_counts: [0; 4],
            rank_counts: [0; 15],
            dirty: true,
        };
        tracker.update_counts();
        tracker
    }

    /// Approximate construction from distribution counts, for use when
    /// exact card identities are unknown (the live bridge). Builds a
    /// representative deck matching the given totals; defaults to an
    /// even spread.
    pub fn from_distribution(
        total_remaining: usize,
        suit_counts: Option<IndexMap<Suit, usize>>,
        rank_counts: Option<IndexMap<Rank, usize>>,
    ) -> Self {
        let suit_counts = suit_counts.unwrap_or_else(|| {
            let per_suit = total_remaining / 4;
            let mut counts: IndexMap<Suit, usize> =
                Suit::suits().iter().map(|s| (*s, per_suit)).collect();
            for (i, suit) in Suit::suits().iter().enumerate() {
                if i < total_remaining % 4 {
                    *counts.get_mut(suit).expect("all suits present") += 1;
                }
            }
            counts
        });
        let mut rank_counts = rank_counts.unwrap_or_else(|| {
            let per_rank = total_remaining / 13;
            let mut counts: IndexMap<Rank, usize> =
                Rank::ranks().iter().map(|r| (*r, per_rank)).collect();
            for (i, rank) in Rank::ranks().iter().enumerate() {
                if i < total_remaining % 13 {
                    *counts.get_mut(rank).expect("all ranks present") += 1;
                }
            }
            counts
        });

        let mut remaining = Vec::with_capacity(total_remaining);
        for suit in Suit::suits() {
            let mut suit_need = suit_counts.get(&suit).copied().unwrap_or(0);
            for rank in Rank::ranks() {
                if suit_need == 0 {
                    break;
                }
                let rank_need = rank_counts.get(&rank).copied().unwrap_or(0);
                if rank_need > 0 {
                    remaining.push(Card::new(rank, suit));
                    suit_need -= 1;
                    *rank_counts.get_mut(&rank).expect("all ranks present") -= 1;
                }
            }
        }

        let mut tracker = Self {
            remaining,
            played: Vec::new(),
            discarded: Vec::new(),
            suit_counts: [0; 4],
            rank_counts: [0; 15],
            dirty: true,
        };
        tracker.update_counts();
        tracker
    }

    fn update_counts(&mut self) {
        self.suit_counts = [0; 4];
        self.rank_counts = [0; 15];
        for card in &self.remaining {
            self.suit_counts[card.suit as usize] += 1;
            self.rank_counts[card.rank.value() as usize] += 1;
        }
        self.dirty = false;
    }

    fn refresh(&mut self) {
        if self.dirty {
            self.update_counts();
        }
    }

    /// Remove one matching card (by rank and suit) from the remaining
    /// pile. Returns false when no match exists.
    pub fn remove_card(&mut self, card: &Card, played: bool) -> bool {
        match self
            .remaining
            .iter()
            .position(|c| c.rank == card.rank && c.suit == card.suit)
        {
            Some(pos) => {
                let removed = self.remaining.remove(pos);
                if played {
                    self.played.push(removed);
                } else {
                    self.discarded.push(removed);
                }
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Batched removal; returns how many were actually removed.
    pub fn remove_cards(&mut self, cards: &[Card], played: bool) -> usize {
        cards
            .iter()
            .filter(|c| self.remove_card(c, played))
            .count()
    }

    /// Restore the full standard composition.
    pub fn reset(&mut self) {
        self.remaining = create_standard_deck();
        self.played.clear();
        self.discarded.clear();
        self.dirty = true;
    }

    pub fn total_remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn total_seen(&self) -> usize {
        self.played.len() + self.discarded.len()
    }

    pub fn remaining(&self) -> &[Card] {
        &self.remaining
    }

    pub fn played(&self) -> &[Card] {
        &self.played
    }

    pub fn discarded(&self) -> &[Card] {
        &self.discarded
    }

    pub fn suit_count(&mut self, suit: Suit) -> usize {
        self.refresh();
        self.suit_counts[suit as usize]
    }

    pub fn rank_count(&mut self, rank: Rank) -> usize {
        self.refresh();
        self.rank_counts[rank.value() as usize]
    }

    /// Count of one specific card remaining (0 or 1 in a standard deck).
    pub fn card_count(&self, rank: Rank, suit: Suit) -> usize {
        self.remaining
            .iter()
            .filter(|c| c.rank == rank && c.suit == suit)
            .count()
    }

    pub fn suit_distribution(&mut self) -> IndexMap<Suit, usize> {
        self.refresh();
        Suit::suits()
            .iter()
            .map(|s| (*s, self.suit_counts[*s as usize]))
            .collect()
    }

    pub fn rank_distribution(&mut self) -> IndexMap<Rank, usize> {
        self.refresh();
        Rank::ranks()
            .iter()
            .map(|r| (*r, self.rank_counts[r.value() as usize]))
            .collect()
    }

    /// Remaining count of ranks 10 through Ace.
    pub fn high_card_count(&mut self) -> usize {
        [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace]
            .iter()
            .map(|r| self.rank_count(*r))
            .sum()
    }

    /// Remaining count of J, Q, K.
    pub fn face_card_count(&mut self) -> usize {
        [Rank::Jack, Rank::Queen, Rank::King]
            .iter()
            .map(|r| self.rank_count(*r))
            .sum()
    }

    /// Straight-draw analysis for a set of held ranks: for each
    /// canonical sequence, one missing rank counts as open-ended when
    /// it sits at either end, otherwise gutshot; two missing with
    /// three held counts as gutshot.
    pub fn straight_potential(&mut self, ranks_in_hand: &[Rank]) -> StraightPotential {
        let mut have_rank = [false; 15];
        for rank in ranks_in_hand {
            have_rank[rank.value() as usize] = true;
        }

        let mut potential = StraightPotential::default();
        for seq in &STRAIGHT_SEQUENCES {
            let have = seq.iter().filter(|v| have_rank[**v as usize]).count();
            let need = 5 - have;

            if need == 1 {
                let missing = seq
                    .iter()
                    .find(|v| !have_rank[**v as usize])
                    .expect("exactly one missing");
                let rank = Rank::from_value(*missing).expect("sequence ranks are valid");
                let outs = self.rank_count(rank);
                potential.best_outs = potential.best_outs.max(outs);

                if *missing == seq[0] || *missing == seq[4] {
                    potential.open_ended += 1;
                } else {
                    potential.gutshot += 1;
                }
            } else if need == 2 && have >= 3 {
                potential.gutshot += 1;
            }
        }
        potential
    }
}

impl Default for DeckTracker {
    fn default() -> Self {
        Self::new()
    }
}
