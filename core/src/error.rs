use thiserror::Error;

/// Errors from the hand evaluator preconditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandError {
    #[error("played hand contains no cards")]
    NoCards,
    #[error("played hand contains more than 5 cards")]
    TooManyCards,
}

/// Errors from parsing the compact card form ("AS", "10H").
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCardError {
    #[error("empty card string")]
    Empty,
    #[error("invalid rank: {0}")]
    InvalidRank(String),
    #[error("invalid suit: {0}")]
    InvalidSuit(char),
}

/// Errors from simulator actions. Precondition violations leave the
/// state unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("action not legal in current phase")]
    InvalidPhase,
    #[error("no remaining hands")]
    NoRemainingHands,
    #[error("no remaining discards")]
    NoRemainingDiscards,
    #[error("card index {0} out of range")]
    IndexOutOfRange(usize),
    #[error("duplicate card indices")]
    DuplicateIndices,
    #[error("cannot skip a boss blind")]
    CannotSkipBoss,
    #[error("not enough money: need ${cost}, have ${have}")]
    InsufficientFunds { cost: i64, have: i64 },
    #[error("joker slots full ({0})")]
    JokerSlotsFull(usize),
    #[error("no joker at index {0}")]
    NoJokerAtIndex(usize),
    #[error("joker order is not a permutation")]
    InvalidJokerOrder,
    #[error("invalid hand played")]
    InvalidHand(#[from] HandError),
}
