pub mod card;
pub mod config;
pub mod deck;
pub mod engine;
pub mod error;
pub mod hand;
pub mod heuristics;
pub mod joker;
pub mod mcts;
pub mod probability;
#[cfg(feature = "serde")]
pub mod protocol;
pub mod rank;
pub mod rng;
pub mod scoring;
#[cfg(feature = "serde")]
pub mod server;
pub mod simulator;
pub mod state;
