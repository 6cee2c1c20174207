const DEFAULT_HANDS: usize = 4;
const DEFAULT_DISCARDS: usize = 3;
const DEFAULT_HAND_SIZE: usize = 8;
const DEFAULT_JOKER_SLOTS: usize = 5;
const DEFAULT_MONEY_START: i64 = 4;
const DEFAULT_ANTE_START: usize = 1;
const DEFAULT_ANTE_END: usize = 8;
const DEFAULT_INTEREST_DIVISOR: i64 = 5;
const DEFAULT_INTEREST_CAP: i64 = 5;
const DEFAULT_SKIP_REWARD: i64 = 1;

/// Tunable game constants. Defaults match the standard run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub hands: usize,
    pub discards: usize,
    pub hand_size: usize,
    pub joker_slots: usize,
    pub money_start: i64,
    pub ante_start: usize,
    pub ante_end: usize,
    /// $1 of interest per this many dollars held.
    pub interest_divisor: i64,
    pub interest_cap: i64,
    pub skip_reward: i64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            hands: DEFAULT_HANDS,
            discards: DEFAULT_DISCARDS,
            hand_size: DEFAULT_HAND_SIZE,
            joker_slots: DEFAULT_JOKER_SLOTS,
            money_start: DEFAULT_MONEY_START,
            ante_start: DEFAULT_ANTE_START,
            ante_end: DEFAULT_ANTE_END,
            interest_divisor: DEFAULT_INTEREST_DIVISOR,
            interest_cap: DEFAULT_INTEREST_CAP,
            skip_reward: DEFAULT_SKIP_REWARD,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
