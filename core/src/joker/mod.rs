//! Joker model: identities, static catalog entries and live instances.
//!
//! A `JokerInstance` is a catalog reference plus a freely mutable state
//! map used by scaling effects. Hold order is meaningful: the scoring
//! engine walks the instance sequence left to right and each effect
//! sees the running totals left by its predecessors.

pub mod registry;

use std::collections::HashMap;
use std::fmt;

use crate::card::Card;
use crate::scoring::ScoringContext;

/// Joker identities. The wire form is the snake_case name
/// (`greedy_joker`), which `FromStr` parses; unknown wire ids fail to
/// parse and the caller drops them.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum JokerId {
    Joker,
    JollyJoker,
    ZanyJoker,
    MadJoker,
    CrazyJoker,
    DrollJoker,
    SlyJoker,
    WilyJoker,
    CleverJoker,
    DeviousJoker,
    CraftyJoker,
    HalfJoker,
    MysticSummit,
    Banner,
    GreedyJoker,
    LustyJoker,
    WrathfulJoker,
    GluttonousJoker,
    EvenSteven,
    OddTodd,
    Scholar,
    Fibonacci,
    ScaryFace,
    SmileyFace,
    WalkieTalkie,
    GreenJoker,
    RideTheBus,
    IceCream,
    SquareJoker,
    Runner,
    RaisedFist,
    Blackboard,
    TheDuo,
    TheTrio,
    TheFamily,
    TheOrder,
    TheTribe,
    Hack,
    GoldenJoker,
    Rocket,
    CloudNine,
    DelayedGratification,
    TradingCard,
    FacelessJoker,
    ToTheMoon,
    CreditCard,
    Egg,
}

/// Joker rarity tiers.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// When a joker's effect is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectTiming {
    OnScore,
    OnCardScore,
    OnHandPlayed,
    OnDiscard,
    EndOfRound,
    OnShop,
    OnBlindSelect,
}

/// Static catalog entry for a joker type. Read-only after
/// initialization; shared freely across threads.
#[derive(Debug, Clone)]
pub struct JokerDef {
    pub id: JokerId,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    pub base_cost: i64,
    pub timing: EffectTiming,
}

/// Result of a joker's scoring effect. Applied in order: chips, then
/// +mult, then x mult; money accumulates separately.
#[derive(Debug, Clone, PartialEq)]
pub struct JokerEffect {
    pub add_chips: u64,
    pub add_mult: f64,
    pub mult_mult: f64,
    /// Announced extra card triggers. Recorded in the breakdown but
    /// not consumed by the card loop; see DESIGN.md.
    pub retrigger: usize,
    pub money: i64,
}

impl Default for JokerEffect {
    fn default() -> Self {
        Self {
            add_chips: 0,
            add_mult: 0.0,
            mult_mult: 1.0,
            retrigger: 0,
            money: 0,
        }
    }
}

impl JokerEffect {
    /// True when the effect does anything at all.
    pub fn is_some(&self) -> bool {
        self.add_chips != 0
            || self.add_mult != 0.0
            || self.mult_mult != 1.0
            || self.retrigger > 0
            || self.money != 0
    }
}

/// Frozen context for economy-timed effects, assembled by the caller
/// from the round state. Pure inputs only; state mutation happens in
/// the simulator's hook pass.
#[derive(Debug, Clone, Default)]
pub struct EconomyContext {
    pub money: i64,
    pub ante: usize,
    pub boss_blinds_defeated: usize,
    pub blinds_skipped: usize,
    pub hands_played: usize,
    pub hands_remaining: usize,
    pub discards_used: usize,
    pub discards_remaining: usize,
    pub deck_size: usize,
    pub nines_in_deck: usize,
    /// Cards being discarded, for on-discard effects.
    pub discarded_cards: Vec<Card>,
}

/// Result of an economy-timed effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EconomyEffect {
    pub money: i64,
    pub sell_value_change: i64,
    pub interest_bonus: i64,
    pub debt_limit: i64,
}

impl EconomyEffect {
    pub fn is_some(&self) -> bool {
        self.money != 0
            || self.sell_value_change != 0
            || self.interest_bonus != 0
            || self.debt_limit != 0
    }
}

/// A held joker: catalog id plus mutable scaling state. Cloning
/// deep-copies the state map.
#[derive(Debug, Clone, PartialEq)]
pub struct JokerInstance {
    pub id: JokerId,
    pub state: HashMap<String, f64>,
}

impl JokerInstance {
    /// Create an instance with its initial state.
    pub fn new(id: JokerId) -> Self {
        Self {
            id,
            state: registry::initial_state(id),
        }
    }

    /// Catalog definition. Every shipped id has one.
    pub fn def(&self) -> &'static JokerDef {
        registry::definition(self.id)
    }

    pub fn name(&self) -> &'static str {
        self.def().name
    }

    pub fn base_cost(&self) -> i64 {
        self.def().base_cost
    }

    /// Sell price: half the base cost, adjusted by accumulated sell
    /// value changes (Egg).
    pub fn sell_value(&self) -> i64 {
        let bonus = self.state.get("sell_bonus").copied().unwrap_or(0.0) as i64;
        self.base_cost() / 2 + bonus
    }

    pub fn state_value(&self, key: &str) -> f64 {
        self.state.get(key).copied().unwrap_or(0.0)
    }

    /// Scoring effect for the current context. Ids without a scoring
    /// rule are no-ops, never errors.
    pub fn calculate_effect(&self, ctx: &ScoringContext) -> JokerEffect {
        match registry::scoring_rule(self.id) {
            Some(rule) => rule.evaluate(self, ctx),
            None => JokerEffect::default(),
        }
    }

    /// Economy effect for the given timing. Missing entries are no-ops.
    pub fn calculate_economy_effect(
        &self,
        ctx: &EconomyContext,
        timing: EffectTiming,
    ) -> EconomyEffect {
        match registry::economy_rule(self.id, timing) {
            Some(rule) => rule.evaluate(ctx),
            None => EconomyEffect::default(),
        }
    }
}

impl fmt::Display for JokerInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Sum economy effects across a held sequence for one timing.
pub fn total_economy_effect(
    jokers: &[JokerInstance],
    ctx: &EconomyContext,
    timing: EffectTiming,
) -> EconomyEffect {
    let mut total = EconomyEffect::default();
    for joker in jokers {
        let effect = joker.calculate_economy_effect(ctx, timing);
        total.money += effect.money;
        total.sell_value_change += effect.sell_value_change;
        total.interest_bonus += effect.interest_bonus;
        total.debt_limit += effect.debt_limit;
    }
    total
}
