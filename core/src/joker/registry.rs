//! Dispatch tables for joker effects.
//!
//! Three `once_cell` tables: id -> scoring rule, (id, timing) ->
//! economy rule, id -> state-transition hooks. Every published effect
//! is one of a closed set of rule classes; evaluation is a match over
//! the rule variant, so adding a joker is a table entry, not code.
//! A missing entry is a no-op, never an error.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::card::{Card, Rank, Suit};
use crate::joker::{EconomyContext, EconomyEffect, EffectTiming, JokerDef, JokerEffect, JokerId, JokerInstance, Rarity};
use crate::rank::HandType;
use crate::scoring::ScoringContext;

const FIBONACCI_RANKS: [Rank; 5] = [Rank::Two, Rank::Three, Rank::Five, Rank::Eight, Rank::Ace];
const WALKIE_TALKIE_RANKS: [Rank; 2] = [Rank::Ten, Rank::Four];
const SCHOLAR_RANKS: [Rank; 1] = [Rank::Ace];
const HACK_RANKS: [Rank; 4] = [Rank::Two, Rank::Three, Rank::Four, Rank::Five];
const BLACKBOARD_SUITS: [Suit; 2] = [Suit::Spade, Suit::Club];

/// Predicate over a single scoring card. Stone cards only match `Any`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardFilter {
    Suit(Suit),
    Face,
    Even,
    Odd,
    Ranks(&'static [Rank]),
    Any,
}

impl CardFilter {
    pub fn matches(&self, card: &Card) -> bool {
        match self {
            Self::Any => true,
            Self::Suit(suit) => card.has_suit(*suit),
            Self::Face => !card.is_stone() && card.is_face(),
            Self::Even => !card.is_stone() && card.is_even(),
            Self::Odd => !card.is_stone() && card.is_odd(),
            Self::Ranks(ranks) => !card.is_stone() && ranks.contains(&card.rank),
        }
    }
}

/// Predicate over the whole scoring context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandCondition {
    Always,
    ContainsPair,
    ContainsTwoPair,
    ContainsTrips,
    ContainsQuads,
    IsStraight,
    IsFlush,
    AtMostCardsPlayed(usize),
    NoDiscardsRemaining,
    HeldAllOf(&'static [Suit]),
}

impl HandCondition {
    pub fn matches(&self, ctx: &ScoringContext) -> bool {
        match self {
            Self::Always => true,
            Self::ContainsPair => max_rank_count(ctx.played_cards) >= 2,
            Self::ContainsTrips => max_rank_count(ctx.played_cards) >= 3,
            Self::ContainsQuads => max_rank_count(ctx.played_cards) >= 4,
            Self::ContainsTwoPair => {
                rank_counts(ctx.played_cards)
                    .iter()
                    .filter(|&&c| c >= 2)
                    .count()
                    >= 2
            }
            Self::IsStraight => matches!(
                ctx.hand_result.hand_type,
                HandType::Straight | HandType::StraightFlush | HandType::RoyalFlush
            ),
            Self::IsFlush => matches!(
                ctx.hand_result.hand_type,
                HandType::Flush
                    | HandType::FlushHouse
                    | HandType::FlushFive
                    | HandType::StraightFlush
                    | HandType::RoyalFlush
            ),
            Self::AtMostCardsPlayed(n) => ctx.played_cards.len() <= *n,
            Self::NoDiscardsRemaining => ctx.game_state.discards_remaining == 0,
            Self::HeldAllOf(suits) => ctx
                .cards_in_hand
                .iter()
                .all(|c| suits.iter().any(|s| c.has_suit(*s))),
        }
    }
}

fn rank_counts(cards: &[Card]) -> [u8; 15] {
    let mut counts = [0u8; 15];
    for card in cards.iter().filter(|c| !c.is_stone()) {
        counts[card.rank.value() as usize] += 1;
    }
    counts
}

fn max_rank_count(cards: &[Card]) -> u8 {
    rank_counts(cards).into_iter().max().unwrap_or(0)
}

/// The closed set of scoring effect classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoringRule {
    FlatMult(f64),
    FlatChips(u64),
    ConditionalMult { when: HandCondition, mult: f64 },
    ConditionalChips { when: HandCondition, chips: u64 },
    /// Additive effect proportional to matching scoring cards.
    PerCard { filter: CardFilter, chips: u64, mult: f64 },
    /// Resource-coupled chips (Banner).
    ChipsPerDiscardRemaining(u64),
    /// Reads accumulated mult from the instance state.
    ScalingMult { key: &'static str },
    /// Reads accumulated chips from the instance state.
    ScalingChips { key: &'static str },
    /// Mult from the lowest held card rank (Raised Fist).
    LowestHeldRankMult { factor: f64 },
    TimesMult { when: HandCondition, factor: f64 },
    /// Announces extra triggers for matching scoring cards.
    Retrigger { filter: CardFilter, times: usize },
}

impl ScoringRule {
    pub fn evaluate(&self, instance: &JokerInstance, ctx: &ScoringContext) -> JokerEffect {
        let mut effect = JokerEffect::default();
        match self {
            Self::FlatMult(mult) => effect.add_mult = *mult,
            Self::FlatChips(chips) => effect.add_chips = *chips,
            Self::ConditionalMult { when, mult } => {
                if when.matches(ctx) {
                    effect.add_mult = *mult;
                }
            }
            Self::ConditionalChips { when, chips } => {
                if when.matches(ctx) {
                    effect.add_chips = *chips;
                }
            }
            Self::PerCard { filter, chips, mult } => {
                let count = ctx
                    .scoring_cards
                    .iter()
                    .filter(|c| filter.matches(c))
                    .count() as u64;
                effect.add_chips = chips * count;
                effect.add_mult = *mult * count as f64;
            }
            Self::ChipsPerDiscardRemaining(chips) => {
                effect.add_chips = chips * ctx.game_state.discards_remaining as u64;
            }
            Self::ScalingMult { key } => effect.add_mult = instance.state_value(key),
            Self::ScalingChips { key } => {
                effect.add_chips = instance.state_value(key).max(0.0) as u64;
            }
            Self::LowestHeldRankMult { factor } => {
                if let Some(lowest) = ctx
                    .cards_in_hand
                    .iter()
                    .filter(|c| !c.is_stone())
                    .map(|c| c.rank.value())
                    .min()
                {
                    effect.add_mult = factor * lowest as f64;
                }
            }
            Self::TimesMult { when, factor } => {
                if when.matches(ctx) {
                    effect.mult_mult = *factor;
                }
            }
            Self::Retrigger { filter, times } => {
                let count = ctx
                    .scoring_cards
                    .iter()
                    .filter(|c| filter.matches(c))
                    .count();
                effect.retrigger = times * count;
            }
        }
        effect
    }
}

/// The closed set of economy effect classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EconomyRule {
    FlatMoney(i64),
    MoneyPerBossDefeated { base: i64, per: i64 },
    MoneyPerNineInDeck(i64),
    /// Paid only when no discard was used this round.
    MoneyPerUnusedDiscard(i64),
    MoneyIfSingleDiscard(i64),
    MoneyIfFacesDiscarded { min: usize, money: i64 },
    InterestBonus(i64),
    DebtLimit(i64),
    SellValueGain(i64),
}

impl EconomyRule {
    pub fn evaluate(&self, ctx: &EconomyContext) -> EconomyEffect {
        let mut effect = EconomyEffect::default();
        match self {
            Self::FlatMoney(money) => effect.money = *money,
            Self::MoneyPerBossDefeated { base, per } => {
                effect.money = base + per * ctx.boss_blinds_defeated as i64;
            }
            Self::MoneyPerNineInDeck(per) => {
                effect.money = per * ctx.nines_in_deck as i64;
            }
            Self::MoneyPerUnusedDiscard(per) => {
                if ctx.discards_used == 0 {
                    effect.money = per * ctx.discards_remaining as i64;
                }
            }
            Self::MoneyIfSingleDiscard(money) => {
                if ctx.discarded_cards.len() == 1 {
                    effect.money = *money;
                }
            }
            Self::MoneyIfFacesDiscarded { min, money } => {
                let faces = ctx
                    .discarded_cards
                    .iter()
                    .filter(|c| c.is_face())
                    .count();
                if faces >= *min {
                    effect.money = *money;
                }
            }
            Self::InterestBonus(bonus) => effect.interest_bonus = *bonus,
            Self::DebtLimit(limit) => effect.debt_limit = *limit,
            Self::SellValueGain(gain) => effect.sell_value_change = *gain,
        }
        effect
    }
}

/// Timing of a state-transition hook, matched by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookTiming {
    OnHandPlayed,
    OnDiscard,
    EndOfRound,
}

/// Event data handed to a transition by the simulator.
#[derive(Debug, Clone, Copy)]
pub enum HookEvent<'a> {
    HandPlayed {
        played: &'a [Card],
        hand_type: HandType,
    },
    Discarded {
        cards: &'a [Card],
    },
    RoundEnded,
}

/// Pure state transition over an instance's state map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateTransition {
    Add { key: &'static str, amount: f64 },
    SubFloorZero { key: &'static str, amount: f64 },
    /// Accumulate while no face card is played; reset on one.
    AddUnlessFacePlayed { key: &'static str, amount: f64 },
    /// Accumulate when exactly `count` cards were played.
    AddIfCardCount {
        key: &'static str,
        count: usize,
        amount: f64,
    },
    /// Accumulate when the played category is a straight.
    AddIfStraight { key: &'static str, amount: f64 },
}

impl StateTransition {
    pub fn apply(&self, instance: &mut JokerInstance, event: &HookEvent) {
        match self {
            Self::Add { key, amount } => {
                let value = instance.state_value(key) + amount;
                instance.state.insert((*key).to_string(), value);
            }
            Self::SubFloorZero { key, amount } => {
                let value = (instance.state_value(key) - amount).max(0.0);
                instance.state.insert((*key).to_string(), value);
            }
            Self::AddUnlessFacePlayed { key, amount } => {
                if let HookEvent::HandPlayed { played, .. } = event {
                    let has_face = played.iter().any(|c| !c.is_stone() && c.is_face());
                    let value = if has_face {
                        0.0
                    } else {
                        instance.state_value(key) + amount
                    };
                    instance.state.insert((*key).to_string(), value);
                }
            }
            Self::AddIfCardCount { key, count, amount } => {
                if let HookEvent::HandPlayed { played, .. } = event {
                    if played.len() == *count {
                        let value = instance.state_value(key) + amount;
                        instance.state.insert((*key).to_string(), value);
                    }
                }
            }
            Self::AddIfStraight { key, amount } => {
                if let HookEvent::HandPlayed { hand_type, .. } = event {
                    if matches!(
                        hand_type,
                        HandType::Straight | HandType::StraightFlush | HandType::RoyalFlush
                    ) {
                        let value = instance.state_value(key) + amount;
                        instance.state.insert((*key).to_string(), value);
                    }
                }
            }
        }
    }
}

/// A transition bound to its timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateHook {
    pub timing: HookTiming,
    pub transition: StateTransition,
}

static DEFINITIONS: Lazy<HashMap<JokerId, JokerDef>> = Lazy::new(|| {
    use EffectTiming::*;
    use JokerId::*;
    use Rarity::*;

    let defs = [
        JokerDef { id: Joker, name: "Joker", description: "+4 Mult", rarity: Common, base_cost: 2, timing: OnScore },
        JokerDef { id: JollyJoker, name: "Jolly Joker", description: "+8 Mult if played hand contains a Pair", rarity: Common, base_cost: 3, timing: OnScore },
        JokerDef { id: ZanyJoker, name: "Zany Joker", description: "+12 Mult if played hand contains a Three of a Kind", rarity: Common, base_cost: 4, timing: OnScore },
        JokerDef { id: MadJoker, name: "Mad Joker", description: "+10 Mult if played hand contains a Two Pair", rarity: Common, base_cost: 4, timing: OnScore },
        JokerDef { id: CrazyJoker, name: "Crazy Joker", description: "+12 Mult if played hand contains a Straight", rarity: Common, base_cost: 4, timing: OnScore },
        JokerDef { id: DrollJoker, name: "Droll Joker", description: "+10 Mult if played hand contains a Flush", rarity: Common, base_cost: 4, timing: OnScore },
        JokerDef { id: SlyJoker, name: "Sly Joker", description: "+50 Chips if played hand contains a Pair", rarity: Common, base_cost: 3, timing: OnScore },
        JokerDef { id: WilyJoker, name: "Wily Joker", description: "+100 Chips if played hand contains a Three of a Kind", rarity: Common, base_cost: 4, timing: OnScore },
        JokerDef { id: CleverJoker, name: "Clever Joker", description: "+80 Chips if played hand contains a Two Pair", rarity: Common, base_cost: 4, timing: OnScore },
        JokerDef { id: DeviousJoker, name: "Devious Joker", description: "+100 Chips if played hand contains a Straight", rarity: Common, base_cost: 4, timing: OnScore },
        JokerDef { id: CraftyJoker, name: "Crafty Joker", description: "+80 Chips if played hand contains a Flush", rarity: Common, base_cost: 4, timing: OnScore },
        JokerDef { id: HalfJoker, name: "Half Joker", description: "+20 Mult if played hand has 3 or fewer cards", rarity: Common, base_cost: 5, timing: OnScore },
        JokerDef { id: MysticSummit, name: "Mystic Summit", description: "+15 Mult when 0 discards remaining", rarity: Common, base_cost: 5, timing: OnScore },
        JokerDef { id: Banner, name: "Banner", description: "+30 Chips per remaining discard", rarity: Common, base_cost: 5, timing: OnScore },
        JokerDef { id: GreedyJoker, name: "Greedy Joker", description: "Played Diamond cards give +3 Mult when scored", rarity: Common, base_cost: 5, timing: OnCardScore },
        JokerDef { id: LustyJoker, name: "Lusty Joker", description: "Played Heart cards give +3 Mult when scored", rarity: Common, base_cost: 5, timing: OnCardScore },
        JokerDef { id: WrathfulJoker, name: "Wrathful Joker", description: "Played Spade cards give +3 Mult when scored", rarity: Common, base_cost: 5, timing: OnCardScore },
        JokerDef { id: GluttonousJoker, name: "Gluttonous Joker", description: "Played Club cards give +3 Mult when scored", rarity: Common, base_cost: 5, timing: OnCardScore },
        JokerDef { id: EvenSteven, name: "Even Steven", description: "Played even cards give +4 Mult when scored", rarity: Common, base_cost: 4, timing: OnCardScore },
        JokerDef { id: OddTodd, name: "Odd Todd", description: "Played odd cards give +31 Chips when scored", rarity: Common, base_cost: 4, timing: OnCardScore },
        JokerDef { id: Scholar, name: "Scholar", description: "Played Aces give +20 Chips and +4 Mult when scored", rarity: Common, base_cost: 4, timing: OnCardScore },
        JokerDef { id: Fibonacci, name: "Fibonacci", description: "Played 2, 3, 5, 8 or Ace gives +8 Mult when scored", rarity: Uncommon, base_cost: 8, timing: OnCardScore },
        JokerDef { id: ScaryFace, name: "Scary Face", description: "Played face cards give +30 Chips when scored", rarity: Common, base_cost: 4, timing: OnCardScore },
        JokerDef { id: SmileyFace, name: "Smiley Face", description: "Played face cards give +5 Mult when scored", rarity: Common, base_cost: 4, timing: OnCardScore },
        JokerDef { id: WalkieTalkie, name: "Walkie Talkie", description: "Played 10s and 4s give +10 Chips and +4 Mult when scored", rarity: Common, base_cost: 4, timing: OnCardScore },
        JokerDef { id: GreenJoker, name: "Green Joker", description: "+1 Mult per hand played, -1 Mult per discard", rarity: Common, base_cost: 4, timing: OnScore },
        JokerDef { id: RideTheBus, name: "Ride the Bus", description: "+1 Mult per consecutive hand without a scoring face card", rarity: Common, base_cost: 6, timing: OnScore },
        JokerDef { id: IceCream, name: "Ice Cream", description: "+100 Chips, melting -5 Chips per hand played", rarity: Common, base_cost: 5, timing: OnScore },
        JokerDef { id: SquareJoker, name: "Square Joker", description: "+4 Chips for every exactly-4-card hand played", rarity: Common, base_cost: 4, timing: OnScore },
        JokerDef { id: Runner, name: "Runner", description: "+15 Chips for every Straight played", rarity: Common, base_cost: 5, timing: OnScore },
        JokerDef { id: RaisedFist, name: "Raised Fist", description: "Adds double the rank of lowest card held in hand to Mult", rarity: Common, base_cost: 5, timing: OnScore },
        JokerDef { id: Blackboard, name: "Blackboard", description: "x3 Mult if all cards held in hand are Spades or Clubs", rarity: Uncommon, base_cost: 6, timing: OnScore },
        JokerDef { id: TheDuo, name: "The Duo", description: "x2 Mult if played hand contains a Pair", rarity: Rare, base_cost: 8, timing: OnScore },
        JokerDef { id: TheTrio, name: "The Trio", description: "x3 Mult if played hand contains a Three of a Kind", rarity: Rare, base_cost: 8, timing: OnScore },
        JokerDef { id: TheFamily, name: "The Family", description: "x4 Mult if played hand contains a Four of a Kind", rarity: Rare, base_cost: 8, timing: OnScore },
        JokerDef { id: TheOrder, name: "The Order", description: "x3 Mult if played hand contains a Straight", rarity: Rare, base_cost: 8, timing: OnScore },
        JokerDef { id: TheTribe, name: "The Tribe", description: "x2 Mult if played hand contains a Flush", rarity: Rare, base_cost: 8, timing: OnScore },
        JokerDef { id: Hack, name: "Hack", description: "Retrigger each played 2, 3, 4 or 5", rarity: Uncommon, base_cost: 6, timing: OnCardScore },
        JokerDef { id: GoldenJoker, name: "Golden Joker", description: "Earn $4 at end of round", rarity: Common, base_cost: 6, timing: EndOfRound },
        JokerDef { id: Rocket, name: "Rocket", description: "Earn $1 at end of round, plus $2 per Boss Blind defeated", rarity: Uncommon, base_cost: 6, timing: EndOfRound },
        JokerDef { id: CloudNine, name: "Cloud 9", description: "Earn $1 for each 9 in your full deck at end of round", rarity: Uncommon, base_cost: 7, timing: EndOfRound },
        JokerDef { id: DelayedGratification, name: "Delayed Gratification", description: "Earn $2 per discard if no discards used by end of round", rarity: Common, base_cost: 4, timing: EndOfRound },
        JokerDef { id: TradingCard, name: "Trading Card", description: "If first discard of round has only 1 card, earn $3", rarity: Uncommon, base_cost: 6, timing: OnDiscard },
        JokerDef { id: FacelessJoker, name: "Faceless Joker", description: "Earn $5 when 3 or more face cards are discarded together", rarity: Common, base_cost: 4, timing: OnDiscard },
        JokerDef { id: ToTheMoon, name: "To the Moon", description: "Earn an extra $1 of interest per $5 at end of round", rarity: Uncommon, base_cost: 5, timing: EndOfRound },
        JokerDef { id: CreditCard, name: "Credit Card", description: "Go up to -$20 in debt", rarity: Common, base_cost: 1, timing: OnShop },
        JokerDef { id: Egg, name: "Egg", description: "Gains $3 of sell value at end of round", rarity: Common, base_cost: 4, timing: EndOfRound },
    ];
    defs.into_iter().map(|d| (d.id, d)).collect()
});

static SCORING_RULES: Lazy<HashMap<JokerId, ScoringRule>> = Lazy::new(|| {
    use CardFilter as F;
    use HandCondition as C;
    use JokerId::*;
    use ScoringRule::*;

    HashMap::from([
        (Joker, FlatMult(4.0)),
        (JollyJoker, ConditionalMult { when: C::ContainsPair, mult: 8.0 }),
        (ZanyJoker, ConditionalMult { when: C::ContainsTrips, mult: 12.0 }),
        (MadJoker, ConditionalMult { when: C::ContainsTwoPair, mult: 10.0 }),
        (CrazyJoker, ConditionalMult { when: C::IsStraight, mult: 12.0 }),
        (DrollJoker, ConditionalMult { when: C::IsFlush, mult: 10.0 }),
        (SlyJoker, ConditionalChips { when: C::ContainsPair, chips: 50 }),
        (WilyJoker, ConditionalChips { when: C::ContainsTrips, chips: 100 }),
        (CleverJoker, ConditionalChips { when: C::ContainsTwoPair, chips: 80 }),
        (DeviousJoker, ConditionalChips { when: C::IsStraight, chips: 100 }),
        (CraftyJoker, ConditionalChips { when: C::IsFlush, chips: 80 }),
        (HalfJoker, ConditionalMult { when: C::AtMostCardsPlayed(3), mult: 20.0 }),
        (MysticSummit, ConditionalMult { when: C::NoDiscardsRemaining, mult: 15.0 }),
        (Banner, ChipsPerDiscardRemaining(30)),
        (GreedyJoker, PerCard { filter: F::Suit(Suit::Diamond), chips: 0, mult: 3.0 }),
        (LustyJoker, PerCard { filter: F::Suit(Suit::Heart), chips: 0, mult: 3.0 }),
        (WrathfulJoker, PerCard { filter: F::Suit(Suit::Spade), chips: 0, mult: 3.0 }),
        (GluttonousJoker, PerCard { filter: F::Suit(Suit::Club), chips: 0, mult: 3.0 }),
        (EvenSteven, PerCard { filter: F::Even, chips: 0, mult: 4.0 }),
        (OddTodd, PerCard { filter: F::Odd, chips: 31, mult: 0.0 }),
        (Scholar, PerCard { filter: F::Ranks(&SCHOLAR_RANKS), chips: 20, mult: 4.0 }),
        (Fibonacci, PerCard { filter: F::Ranks(&FIBONACCI_RANKS), chips: 0, mult: 8.0 }),
        (ScaryFace, PerCard { filter: F::Face, chips: 30, mult: 0.0 }),
        (SmileyFace, PerCard { filter: F::Face, chips: 0, mult: 5.0 }),
        (WalkieTalkie, PerCard { filter: F::Ranks(&WALKIE_TALKIE_RANKS), chips: 10, mult: 4.0 }),
        (GreenJoker, ScalingMult { key: "mult" }),
        (RideTheBus, ScalingMult { key: "mult" }),
        (IceCream, ScalingChips { key: "chips" }),
        (SquareJoker, ScalingChips { key: "chips" }),
        (Runner, ScalingChips { key: "chips" }),
        (RaisedFist, LowestHeldRankMult { factor: 2.0 }),
        (Blackboard, TimesMult { when: C::HeldAllOf(&BLACKBOARD_SUITS), factor: 3.0 }),
        (TheDuo, TimesMult { when: C::ContainsPair, factor: 2.0 }),
        (TheTrio, TimesMult { when: C::ContainsTrips, factor: 3.0 }),
        (TheFamily, TimesMult { when: C::ContainsQuads, factor: 4.0 }),
        (TheOrder, TimesMult { when: C::IsStraight, factor: 3.0 }),
        (TheTribe, TimesMult { when: C::IsFlush, factor: 2.0 }),
        (Hack, Retrigger { filter: F::Ranks(&HACK_RANKS), times: 1 }),
    ])
});

static ECONOMY_RULES: Lazy<HashMap<(JokerId, EffectTiming), EconomyRule>> = Lazy::new(|| {
    use EconomyRule::*;
    use EffectTiming::*;
    use JokerId::*;

    HashMap::from([
        ((GoldenJoker, EndOfRound), FlatMoney(4)),
        ((Rocket, EndOfRound), MoneyPerBossDefeated { base: 1, per: 2 }),
        ((CloudNine, EndOfRound), MoneyPerNineInDeck(1)),
        ((DelayedGratification, EndOfRound), MoneyPerUnusedDiscard(2)),
        ((TradingCard, OnDiscard), MoneyIfSingleDiscard(3)),
        ((FacelessJoker, OnDiscard), MoneyIfFacesDiscarded { min: 3, money: 5 }),
        ((ToTheMoon, EndOfRound), InterestBonus(1)),
        ((CreditCard, OnShop), DebtLimit(20)),
        ((Egg, EndOfRound), SellValueGain(3)),
    ])
});

static STATE_HOOKS: Lazy<HashMap<JokerId, Vec<StateHook>>> = Lazy::new(|| {
    use HookTiming::*;
    use JokerId::*;
    use StateTransition::*;

    HashMap::from([
        (
            GreenJoker,
            vec![
                StateHook { timing: OnHandPlayed, transition: Add { key: "mult", amount: 1.0 } },
                StateHook { timing: OnDiscard, transition: SubFloorZero { key: "mult", amount: 1.0 } },
            ],
        ),
        (
            RideTheBus,
            vec![StateHook {
                timing: OnHandPlayed,
                transition: AddUnlessFacePlayed { key: "mult", amount: 1.0 },
            }],
        ),
        (
            IceCream,
            vec![StateHook {
                timing: OnHandPlayed,
                transition: SubFloorZero { key: "chips", amount: 5.0 },
            }],
        ),
        (
            SquareJoker,
            vec![StateHook {
                timing: OnHandPlayed,
                transition: AddIfCardCount { key: "chips", count: 4, amount: 4.0 },
            }],
        ),
        (
            Runner,
            vec![StateHook {
                timing: OnHandPlayed,
                transition: AddIfStraight { key: "chips", amount: 15.0 },
            }],
        ),
    ])
});

/// Catalog definition lookup. Every shipped `JokerId` has an entry.
pub fn definition(id: JokerId) -> &'static JokerDef {
    DEFINITIONS.get(&id).expect("every JokerId has a definition")
}

/// Scoring rule lookup; `None` means the joker contributes nothing
/// during scoring.
pub fn scoring_rule(id: JokerId) -> Option<&'static ScoringRule> {
    SCORING_RULES.get(&id)
}

/// Economy rule lookup by id and timing.
pub fn economy_rule(id: JokerId, timing: EffectTiming) -> Option<&'static EconomyRule> {
    ECONOMY_RULES.get(&(id, timing))
}

/// State-transition hooks for an id; empty for stateless jokers.
pub fn state_hooks(id: JokerId) -> &'static [StateHook] {
    STATE_HOOKS.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
}

/// Initial state map for a freshly created instance.
pub fn initial_state(id: JokerId) -> HashMap<String, f64> {
    match id {
        JokerId::IceCream => HashMap::from([("chips".to_string(), 100.0)]),
        _ => HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::evaluate_hand;
    use crate::state::GameState;

    fn cards(specs: &[&str]) -> Vec<Card> {
        specs.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn context<'a>(
        played: &'a [Card],
        held: &'a [Card],
        result: &'a crate::hand::HandResult,
        state: &'a GameState,
    ) -> ScoringContext<'a> {
        ScoringContext {
            played_cards: played,
            scoring_cards: &result.scoring_cards,
            cards_in_hand: held,
            hand_result: result,
            game_state: state,
            current_chips: 0,
            current_mult: 0.0,
        }
    }

    #[test]
    fn test_per_card_counts_scoring_cards_only() {
        // Pair of kings plus a diamond kicker: the kicker does not
        // score, so Greedy Joker sees no diamonds
        let played = cards(&["KS", "KH", "2D"]);
        let result = evaluate_hand(&played, 1).unwrap();
        let state = GameState::default();
        let ctx = context(&played, &[], &result, &state);

        let greedy = JokerInstance::new(JokerId::GreedyJoker);
        assert_eq!(greedy.calculate_effect(&ctx).add_mult, 0.0);

        let wrathful = JokerInstance::new(JokerId::WrathfulJoker);
        assert_eq!(wrathful.calculate_effect(&ctx).add_mult, 3.0);
    }

    #[test]
    fn test_per_card_mult_per_diamond() {
        let played = cards(&["AD", "KD", "QD", "JD", "9D"]);
        let result = evaluate_hand(&played, 1).unwrap();
        let state = GameState::default();
        let ctx = context(&played, &[], &result, &state);

        let greedy = JokerInstance::new(JokerId::GreedyJoker);
        assert_eq!(greedy.calculate_effect(&ctx).add_mult, 15.0);
    }

    #[test]
    fn test_conditional_contains_pair() {
        let played = cards(&["KS", "KH", "KD", "2C", "3C"]);
        let result = evaluate_hand(&played, 1).unwrap();
        let state = GameState::default();
        let ctx = context(&played, &[], &result, &state);

        // Trips contain a pair
        let jolly = JokerInstance::new(JokerId::JollyJoker);
        assert_eq!(jolly.calculate_effect(&ctx).add_mult, 8.0);
        let zany = JokerInstance::new(JokerId::ZanyJoker);
        assert_eq!(zany.calculate_effect(&ctx).add_mult, 12.0);
        // But not two pair
        let mad = JokerInstance::new(JokerId::MadJoker);
        assert_eq!(mad.calculate_effect(&ctx).add_mult, 0.0);
    }

    #[test]
    fn test_times_mult_conditions() {
        let played = cards(&["2D", "4D", "6D", "8D", "10D"]);
        let result = evaluate_hand(&played, 1).unwrap();
        let state = GameState::default();
        let ctx = context(&played, &[], &result, &state);

        let tribe = JokerInstance::new(JokerId::TheTribe);
        assert_eq!(tribe.calculate_effect(&ctx).mult_mult, 2.0);
        let order = JokerInstance::new(JokerId::TheOrder);
        assert_eq!(order.calculate_effect(&ctx).mult_mult, 1.0);
    }

    #[test]
    fn test_scaling_reads_state() {
        let played = cards(&["AS", "AH"]);
        let result = evaluate_hand(&played, 1).unwrap();
        let state = GameState::default();
        let ctx = context(&played, &[], &result, &state);

        let mut green = JokerInstance::new(JokerId::GreenJoker);
        assert_eq!(green.calculate_effect(&ctx).add_mult, 0.0);
        green.state.insert("mult".to_string(), 7.0);
        assert_eq!(green.calculate_effect(&ctx).add_mult, 7.0);

        // Ice Cream starts at 100 chips
        let ice = JokerInstance::new(JokerId::IceCream);
        assert_eq!(ice.calculate_effect(&ctx).add_chips, 100);
    }

    #[test]
    fn test_banner_scales_with_discards() {
        let played = cards(&["AS", "AH"]);
        let result = evaluate_hand(&played, 1).unwrap();
        let mut state = GameState::default();
        state.discards_remaining = 2;
        let ctx = context(&played, &[], &result, &state);

        let banner = JokerInstance::new(JokerId::Banner);
        assert_eq!(banner.calculate_effect(&ctx).add_chips, 60);

        let summit = JokerInstance::new(JokerId::MysticSummit);
        assert_eq!(summit.calculate_effect(&ctx).add_mult, 0.0);

        state.discards_remaining = 0;
        let ctx = context(&played, &[], &result, &state);
        let summit = JokerInstance::new(JokerId::MysticSummit);
        assert_eq!(summit.calculate_effect(&ctx).add_mult, 15.0);
    }

    #[test]
    fn test_raised_fist_uses_lowest_held_rank() {
        let played = cards(&["AS", "AH"]);
        let held = cards(&["3C", "KD"]);
        let result = evaluate_hand(&played, 1).unwrap();
        let state = GameState::default();
        let ctx = context(&played, &held, &result, &state);

        let fist = JokerInstance::new(JokerId::RaisedFist);
        assert_eq!(fist.calculate_effect(&ctx).add_mult, 6.0);
    }

    #[test]
    fn test_blackboard_held_suits() {
        let played = cards(&["AS", "AH"]);
        let result = evaluate_hand(&played, 1).unwrap();
        let state = GameState::default();

        let spades_clubs = cards(&["3S", "KC"]);
        let ctx = context(&played, &spades_clubs, &result, &state);
        let board = JokerInstance::new(JokerId::Blackboard);
        assert_eq!(board.calculate_effect(&ctx).mult_mult, 3.0);

        let with_heart = cards(&["3S", "KH"]);
        let ctx = context(&played, &with_heart, &result, &state);
        assert_eq!(board.calculate_effect(&ctx).mult_mult, 1.0);
    }

    #[test]
    fn test_hack_announces_retriggers() {
        let played = cards(&["2S", "2H", "9C"]);
        let result = evaluate_hand(&played, 1).unwrap();
        let state = GameState::default();
        let ctx = context(&played, &[], &result, &state);

        let hack = JokerInstance::new(JokerId::Hack);
        // Both scoring twos match; the nine does not score
        assert_eq!(hack.calculate_effect(&ctx).retrigger, 2);
    }

    #[test]
    fn test_economy_dispatch() {
        let ctx = EconomyContext {
            boss_blinds_defeated: 2,
            nines_in_deck: 3,
            discards_remaining: 3,
            discards_used: 0,
            discarded_cards: cards(&["2S"]),
            ..EconomyContext::default()
        };

        let golden = JokerInstance::new(JokerId::GoldenJoker);
        assert_eq!(
            golden
                .calculate_economy_effect(&ctx, EffectTiming::EndOfRound)
                .money,
            4
        );
        // Wrong timing is a no-op
        assert!(!golden
            .calculate_economy_effect(&ctx, EffectTiming::OnDiscard)
            .is_some());

        let rocket = JokerInstance::new(JokerId::Rocket);
        assert_eq!(
            rocket
                .calculate_economy_effect(&ctx, EffectTiming::EndOfRound)
                .money,
            5
        );

        let cloud = JokerInstance::new(JokerId::CloudNine);
        assert_eq!(
            cloud
                .calculate_economy_effect(&ctx, EffectTiming::EndOfRound)
                .money,
            3
        );

        let trading = JokerInstance::new(JokerId::TradingCard);
        assert_eq!(
            trading
                .calculate_economy_effect(&ctx, EffectTiming::OnDiscard)
                .money,
            3
        );

        let gratification = JokerInstance::new(JokerId::DelayedGratification);
        assert_eq!(
            gratification
                .calculate_economy_effect(&ctx, EffectTiming::EndOfRound)
                .money,
            6
        );
    }

    #[test]
    fn test_scoring_jokers_are_economy_noops() {
        let ctx = EconomyContext::default();
        let joker = JokerInstance::new(JokerId::Joker);
        for timing in [
            EffectTiming::EndOfRound,
            EffectTiming::OnDiscard,
            EffectTiming::OnShop,
        ] {
            assert!(!joker.calculate_economy_effect(&ctx, timing).is_some());
        }
    }

    #[test]
    fn test_state_hooks_green_joker() {
        let mut green = JokerInstance::new(JokerId::GreenJoker);
        let played = cards(&["AS", "AH"]);
        let event = HookEvent::HandPlayed {
            played: &played,
            hand_type: HandType::Pair,
        };
        for hook in state_hooks(JokerId::GreenJoker) {
            if hook.timing == HookTiming::OnHandPlayed {
                hook.transition.apply(&mut green, &event);
            }
        }
        assert_eq!(green.state_value("mult"), 1.0);

        let discarded = cards(&["2C"]);
        let event = HookEvent::Discarded { cards: &discarded };
        for hook in state_hooks(JokerId::GreenJoker) {
            if hook.timing == HookTiming::OnDiscard {
                hook.transition.apply(&mut green, &event);
            }
        }
        assert_eq!(green.state_value("mult"), 0.0);

        // Floor at zero
        let event = HookEvent::Discarded { cards: &discarded };
        for hook in state_hooks(JokerId::GreenJoker) {
            if hook.timing == HookTiming::OnDiscard {
                hook.transition.apply(&mut green, &event);
            }
        }
        assert_eq!(green.state_value("mult"), 0.0);
    }

    #[test]
    fn test_ride_the_bus_resets_on_face() {
        let mut bus = JokerInstance::new(JokerId::RideTheBus);
        let no_face = cards(&["2S", "3H"]);
        let event = HookEvent::HandPlayed {
            played: &no_face,
            hand_type: HandType::HighCard,
        };
        for hook in state_hooks(JokerId::RideTheBus) {
            hook.transition.apply(&mut bus, &event);
        }
        for hook in state_hooks(JokerId::RideTheBus) {
            hook.transition.apply(&mut bus, &event);
        }
        assert_eq!(bus.state_value("mult"), 2.0);

        let with_face = cards(&["KS", "3H"]);
        let event = HookEvent::HandPlayed {
            played: &with_face,
            hand_type: HandType::HighCard,
        };
        for hook in state_hooks(JokerId::RideTheBus) {
            hook.transition.apply(&mut bus, &event);
        }
        assert_eq!(bus.state_value("mult"), 0.0);
    }

    #[test]
    fn test_ice_cream_melts_with_floor() {
        let mut ice = JokerInstance::new(JokerId::IceCream);
        let played = cards(&["AS"]);
        let event = HookEvent::HandPlayed {
            played: &played,
            hand_type: HandType::HighCard,
        };
        for _ in 0..25 {
            for hook in state_hooks(JokerId::IceCream) {
                hook.transition.apply(&mut ice, &event);
            }
        }
        assert_eq!(ice.state_value("chips"), 0.0);
    }

    #[test]
    fn test_runner_and_square_joker_hooks() {
        let mut runner = JokerInstance::new(JokerId::Runner);
        let straight = cards(&["2S", "3H", "4D", "5C", "6H"]);
        let event = HookEvent::HandPlayed {
            played: &straight,
            hand_type: HandType::Straight,
        };
        for hook in state_hooks(JokerId::Runner) {
            hook.transition.apply(&mut runner, &event);
        }
        assert_eq!(runner.state_value("chips"), 15.0);

        let mut square = JokerInstance::new(JokerId::SquareJoker);
        let four = cards(&["2S", "3H", "4D", "5C"]);
        let event = HookEvent::HandPlayed {
            played: &four,
            hand_type: HandType::HighCard,
        };
        for hook in state_hooks(JokerId::SquareJoker) {
            hook.transition.apply(&mut square, &event);
        }
        assert_eq!(square.state_value("chips"), 4.0);

        // Five-card hand does not trigger Square Joker
        let event = HookEvent::HandPlayed {
            played: &straight,
            hand_type: HandType::Straight,
        };
        for hook in state_hooks(JokerId::SquareJoker) {
            hook.transition.apply(&mut square, &event);
        }
        assert_eq!(square.state_value("chips"), 4.0);
    }
}
