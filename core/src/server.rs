//! Live TCP bridge.
//!
//! Accepts connections from the game-side mod, reads newline-delimited
//! JSON snapshots, routes each to the right decision path by phase and
//! writes back one action line. Each connection gets its own handler
//! thread and every request decides on its own tracker and state
//! snapshot, so connections never share mutable state.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use tracing::{error, info, warn};

use crate::engine::DecisionEngine;
use crate::heuristics::ActionType;
use crate::protocol::{LiveAction, LiveShopItem, LiveState};

/// Phase-routing decision engine for live snapshots.
#[derive(Debug, Default)]
pub struct LiveEngine {
    engine: DecisionEngine,
}

impl LiveEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide one snapshot.
    pub fn decide(&self, state: &LiveState) -> LiveAction {
        match state.phase_name.as_str() {
            "SELECTING_HAND" => self.decide_hand(state),
            "SHOP" => self.decide_shop(state),
            "BLIND_SELECT" => self.decide_blind(state),
            "TAROT_PACK" | "PLANET_PACK" | "SPECTRAL_PACK" | "STANDARD_PACK" | "BUFFOON_PACK" => {
                LiveAction::pack_skip("pack selection not implemented")
            }
            _ => LiveAction::wait("not at a decision point"),
        }
    }

    fn decide_hand(&self, state: &LiveState) -> LiveAction {
        let cards = state.cards();
        if cards.is_empty() {
            return LiveAction::wait("no cards in hand");
        }

        let jokers = state.joker_instances();
        let game_state = state.game_state();
        let tracker = state.deck_tracker();

        let decision = self.engine.decide(
            &cards,
            &jokers,
            &game_state,
            state.blind_chips(),
            state.chips_scored(),
            state.hands_remaining,
            state.discards_remaining,
            Some(tracker),
            state.is_boss_blind(),
        );

        let confidence = (decision.expected_score / 1000.0).min(1.0);
        let reasoning = decision.reasoning.join(", ");
        match decision.action_type {
            ActionType::Play => LiveAction::play(decision.card_indices, confidence, reasoning),
            ActionType::Discard => {
                LiveAction::discard(decision.card_indices, 0.6, reasoning)
            }
        }
    }

    fn decide_shop(&self, state: &LiveState) -> LiveAction {
        let Some(shop) = &state.shop else {
            return LiveAction::wait("waiting for shop to load");
        };

        let all_items: Vec<&LiveShopItem> = shop
            .items
            .iter()
            .chain(&shop.vouchers)
            .chain(&shop.boosters)
            .collect();
        if all_items.is_empty() {
            return LiveAction::wait(format!("shop loading | ${}", state.money));
        }

        // Jokers first while slots are open, then planets, then tarots
        if state.jokers.len() < 5 {
            if let Some(item) = all_items
                .iter()
                .copied()
                .find(|i| i.item_type == "Joker" && i.cost <= state.money)
            {
                return LiveAction::shop_buy(
                    item.index,
                    0.8,
                    format!("BUY {} (${}) | ${}", item.name, item.cost, state.money),
                );
            }
        }

        for kind in ["Planet", "Tarot"] {
            if let Some(item) = all_items
                .iter()
                .copied()
                .find(|i| i.item_type == kind && i.cost <= state.money)
            {
                return LiveAction::shop_buy(
                    item.index,
                    if kind == "Planet" { 0.6 } else { 0.5 },
                    format!("BUY {} (${}) | ${}", item.name, item.cost, state.money),
                );
            }
        }

        // Nothing worth buying: reroll with spare money, else leave
        if state.money >= shop.reroll_cost + 5 {
            return LiveAction::shop_reroll(
                0.4,
                format!("REROLL (${}) | ${}", shop.reroll_cost, state.money),
            );
        }

        LiveAction::shop_skip(0.8, format!("SKIP | ${}", state.money))
    }

    fn decide_blind(&self, state: &LiveState) -> LiveAction {
        // Skip early non-boss blinds for tag value once a joker core
        // exists; boss blinds are never skippable
        if !state.is_boss_blind() && state.jokers.len() >= 3 && state.ante <= 3 {
            return LiveAction::blind(true, 0.5, "skipping blind for tag reward");
        }
        LiveAction::blind(false, 0.8, "playing blind")
    }
}

/// TCP server speaking the newline-delimited JSON protocol.
#[derive(Debug, Clone)]
pub struct LiveServer {
    pub host: String,
    pub port: u16,
}

impl LiveServer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Bind and serve until the process exits. One thread per
    /// connection.
    pub fn run(&self) -> std::io::Result<()> {
        let address = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&address)?;
        info!(%address, "live server listening");

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Ok(peer) = stream.peer_addr() {
                        info!(%peer, "client connected");
                    }
                    thread::spawn(move || {
                        if let Err(err) = handle_connection(stream) {
                            warn!(%err, "connection closed with error");
                        }
                    });
                }
                Err(err) => error!(%err, "failed to accept connection"),
            }
        }
        Ok(())
    }
}

fn handle_connection(stream: TcpStream) -> std::io::Result<()> {
    let engine = LiveEngine::new();
    let reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let action = decide_line(&engine, &line);
        let mut response = serde_json::to_string(&action)
            .unwrap_or_else(|_| r#"{"action_type":"wait"}"#.to_string());
        response.push('\n');
        writer.write_all(response.as_bytes())?;
    }

    info!("client disconnected");
    Ok(())
}

/// Decide a single protocol line. Malformed input produces a `wait`
/// reply and a log line; it never advances anything.
pub fn decide_line(engine: &LiveEngine, line: &str) -> LiveAction {
    match serde_json::from_str::<LiveState>(line) {
        Ok(state) => {
            info!(
                phase = %state.phase_name,
                ante = state.ante,
                money = state.money,
                cards = state.hand.len(),
                jokers = state.jokers.len(),
                "snapshot received"
            );
            engine.decide(&state)
        }
        Err(err) => {
            error!(%err, "invalid snapshot json");
            LiveAction::wait(format!("invalid snapshot: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_snapshot() -> String {
        r#"{
            "phase_name": "SELECTING_HAND",
            "ante": 1,
            "money": 4,
            "hands_remaining": 4,
            "discards_remaining": 3,
            "hand_size": 8,
            "hand": [
                {"suit": "Spades", "rank": 14, "rank_name": "A", "index": 0},
                {"suit": "Hearts", "rank": 14, "rank_name": "A", "index": 1},
                {"suit": "Clubs", "rank": 7, "rank_name": "7", "index": 2},
                {"suit": "Diamonds", "rank": 2, "rank_name": "2", "index": 3}
            ],
            "jokers": [],
            "blind": {"name": "Small Blind", "chips_required": 60, "chips_scored": 0, "blind_type": "Small"},
            "deck_info": {"cards_in_deck": 48, "cards_in_hand": 4, "cards_in_discard": 0}
        }"#
        .to_string()
    }

    #[test]
    fn test_hand_decision_is_lethal_play() {
        let engine = LiveEngine::new();
        let action = decide_line(&engine, &hand_snapshot());
        // Pair of aces scores 64 >= 60: lethal play of the two aces
        assert_eq!(action.action_type, "play");
        assert_eq!(action.card_indices, vec![0, 1]);
        assert!(action.reasoning.contains("LETHAL"));
    }

    #[test]
    fn test_invalid_json_yields_wait() {
        let engine = LiveEngine::new();
        let action = decide_line(&engine, "{not json");
        assert_eq!(action.action_type, "wait");
        assert!(action.reasoning.contains("invalid snapshot"));
    }

    #[test]
    fn test_empty_hand_waits() {
        let engine = LiveEngine::new();
        let action = decide_line(
            &engine,
            r#"{"phase_name": "SELECTING_HAND", "hand": []}"#,
        );
        assert_eq!(action.action_type, "wait");
    }

    #[test]
    fn test_unknown_phase_waits() {
        let engine = LiveEngine::new();
        let action = decide_line(&engine, r#"{"phase_name": "SPLASH"}"#);
        assert_eq!(action.action_type, "wait");
    }

    #[test]
    fn test_pack_phase_skips() {
        let engine = LiveEngine::new();
        let action = decide_line(&engine, r#"{"phase_name": "TAROT_PACK"}"#);
        assert_eq!(action.action_type, "pack");
        assert!(action.skip);
    }

    #[test]
    fn test_shop_buys_affordable_joker() {
        let engine = LiveEngine::new();
        let action = decide_line(
            &engine,
            r#"{
                "phase_name": "SHOP",
                "money": 10,
                "shop": {
                    "items": [
                        {"index": 0, "name": "Greedy Joker", "cost": 5, "item_type": "Joker"},
                        {"index": 1, "name": "Mercury", "cost": 3, "item_type": "Planet"}
                    ],
                    "vouchers": [],
                    "boosters": [],
                    "reroll_cost": 5
                }
            }"#,
        );
        assert_eq!(action.action_type, "shop");
        assert_eq!(action.buy_index, Some(0));
    }

    #[test]
    fn test_shop_falls_back_to_planet_then_skip() {
        let engine = LiveEngine::new();
        // Joker too expensive, planet affordable
        let action = decide_line(
            &engine,
            r#"{
                "phase_name": "SHOP",
                "money": 4,
                "shop": {
                    "items": [
                        {"index": 0, "name": "The Family", "cost": 8, "item_type": "Joker"},
                        {"index": 1, "name": "Mercury", "cost": 3, "item_type": "Planet"}
                    ],
                    "reroll_cost": 5
                }
            }"#,
        );
        assert_eq!(action.buy_index, Some(1));

        // Nothing affordable and no spare reroll money: skip
        let action = decide_line(
            &engine,
            r#"{
                "phase_name": "SHOP",
                "money": 1,
                "shop": {
                    "items": [{"index": 0, "name": "The Family", "cost": 8, "item_type": "Joker"}],
                    "reroll_cost": 5
                }
            }"#,
        );
        assert!(action.skip);
    }

    #[test]
    fn test_shop_rerolls_with_spare_money() {
        let engine = LiveEngine::new();
        let action = decide_line(
            &engine,
            r#"{
                "phase_name": "SHOP",
                "money": 20,
                "shop": {
                    "items": [{"index": 0, "name": "The Family", "cost": 99, "item_type": "Joker"}],
                    "reroll_cost": 5
                }
            }"#,
        );
        assert!(action.reroll);
    }

    #[test]
    fn test_blind_select_routes() {
        let engine = LiveEngine::new();
        let action = decide_line(&engine, r#"{"phase_name": "BLIND_SELECT", "ante": 1}"#);
        assert_eq!(action.action_type, "blind");
        assert!(!action.skip);

        // Three jokers early: skip for the tag
        let action = decide_line(
            &engine,
            r#"{
                "phase_name": "BLIND_SELECT",
                "ante": 2,
                "jokers": [
                    {"id": "joker", "name": "Joker"},
                    {"id": "greedy_joker", "name": "Greedy Joker"},
                    {"id": "banner", "name": "Banner"}
                ]
            }"#,
        );
        assert!(action.skip);
    }
}
