//! Decision engine and simulator working together.

use balatro_bot::card::{Card, Rank};
use balatro_bot::engine::DecisionEngine;
use balatro_bot::heuristics::ActionType;
use balatro_bot::joker::{JokerId, JokerInstance};
use balatro_bot::rank::HandType;
use balatro_bot::simulator::{GamePhase, GameSimulator};
use balatro_bot::state::GameState;

fn cards(specs: &[&str]) -> Vec<Card> {
    specs.iter().map(|s| s.parse().unwrap()).collect()
}

#[test]
// Four aces and a king against a 100-chip requirement: the lethal gate
// fires and the safest-lethal rule picks exactly the four aces (the
// king would not score, so the bigger play gains nothing and burns a
// card)
fn lethal_gate_picks_exactly_the_aces() {
    let hand = cards(&["AS", "AH", "AC", "AD", "KS"]);
    let engine = DecisionEngine::default();
    let decision = engine.decide(
        &hand,
        &[],
        &GameState::default(),
        100,
        0,
        4,
        3,
        None,
        false,
    );

    assert_eq!(decision.action_type, ActionType::Play);
    assert!(decision.is_lethal);
    assert_eq!(decision.hand_type, Some(HandType::FourOfAKind));
    assert_eq!(decision.cards.len(), 4);
    assert!(decision.cards.iter().all(|c| c.rank == Rank::Ace));
    assert_eq!(decision.expected_score, 728.0);
}

#[test]
// The engine's chosen action must be legal on the simulator it was
// derived from
fn engine_decisions_apply_cleanly() {
    let mut game = GameSimulator::with_seed(11);
    game.start_blind().unwrap();
    let engine = DecisionEngine::default();

    for _ in 0..4 {
        if game.phase != GamePhase::Playing {
            break;
        }
        let state = game.game_state();
        let decision = engine.decide(
            &game.hand,
            &game.jokers,
            &state,
            game.blind_chips,
            game.current_chips,
            game.hands_remaining,
            game.discards_remaining,
            None,
            false,
        );

        match decision.action_type {
            ActionType::Play => {
                game.play_hand(&decision.card_indices).unwrap();
            }
            ActionType::Discard => {
                game.discard(&decision.card_indices).unwrap();
            }
        }
    }
}

#[test]
// Joker hold order must flow from the simulator through the engine:
// reordering [+mult, xmult] changes which play wins a tight lethal
fn hold_order_reaches_the_decision() {
    let hand = cards(&["AS", "AH"]);
    let state = GameState::default();
    let engine = DecisionEngine::default();

    // (2 + 4) x 2 = 12 -> 384: lethal at 384
    let forward = vec![
        JokerInstance::new(JokerId::Joker),
        JokerInstance::new(JokerId::TheDuo),
    ];
    let decision = engine.decide(&hand, &forward, &state, 384, 0, 4, 3, None, false);
    assert!(decision.is_lethal);

    // Reversed: 2 x 2 + 4 = 8 -> 256, short of 384
    let reversed = vec![
        JokerInstance::new(JokerId::TheDuo),
        JokerInstance::new(JokerId::Joker),
    ];
    let decision = engine.decide(&hand, &reversed, &state, 384, 0, 4, 3, None, false);
    assert!(!decision.is_lethal);
}

#[test]
// A cloned simulator can be driven through a whole blind without
// touching the parent, jokers and all
fn clone_independence_through_a_blind() {
    let mut parent = GameSimulator::with_seed(5);
    parent.jokers.push(JokerInstance::new(JokerId::GreenJoker));
    parent.start_blind().unwrap();

    let snapshot_hand = parent.hand.clone();
    let snapshot_money = parent.money;

    let mut clone = parent.clone();
    clone.play_hand(&[0, 1, 2]).unwrap();
    clone.discard(&[0]).unwrap();
    clone.jokers[0].state.insert("mult".to_string(), 40.0);

    assert_eq!(parent.hand, snapshot_hand);
    assert_eq!(parent.money, snapshot_money);
    assert_eq!(parent.hands_remaining, 4);
    assert_eq!(parent.discards_remaining, 3);
    assert_eq!(parent.jokers[0].state_value("mult"), 0.0);
}
