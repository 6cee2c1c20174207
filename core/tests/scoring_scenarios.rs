//! End-to-end scoring scenarios with literal expected values.

use balatro_bot::card::{Card, Edition, Enhancement, Rank, Seal, Suit};
use balatro_bot::joker::{JokerId, JokerInstance};
use balatro_bot::rank::HandType;
use balatro_bot::scoring::calculate_score;
use balatro_bot::state::GameState;

fn cards(specs: &[&str]) -> Vec<Card> {
    specs.iter().map(|s| s.parse().unwrap()).collect()
}

#[test]
// Pair of aces, no jokers: 10 + 11 + 11 chips at x2
fn pair_scoring() {
    let breakdown = calculate_score(
        &cards(&["AS", "AH"]),
        &[],
        &GameState::default(),
        &[],
        None,
    )
    .unwrap();

    assert_eq!(breakdown.hand_type, HandType::Pair);
    assert_eq!(breakdown.base_chips, 32);
    assert_eq!(breakdown.base_mult, 2);
    assert_eq!(breakdown.final_score, 64);
}

#[test]
// Diamond flush with a +3-mult-per-diamond joker: 85 x 19
fn flush_of_diamonds_with_per_diamond_joker() {
    let greedy = JokerInstance::new(JokerId::GreedyJoker);
    let breakdown = calculate_score(
        &cards(&["AD", "KD", "QD", "JD", "9D"]),
        &[greedy],
        &GameState::default(),
        &[],
        None,
    )
    .unwrap();

    assert_eq!(breakdown.hand_type, HandType::Flush);
    assert_eq!(breakdown.final_chips, 85);
    assert_eq!(breakdown.final_mult, 19.0);
    assert_eq!(breakdown.final_score, 1615);
}

#[test]
// [+4 mult, x2 mult] vs the reverse: (2+4)x2 = 12 against 2x2+4 = 8
fn joker_order_sensitivity() {
    let hand = cards(&["AS", "AH"]);
    let state = GameState::default();
    let plus_four = JokerInstance::new(JokerId::Joker);
    let times_two = JokerInstance::new(JokerId::TheDuo);

    let forward = calculate_score(
        &hand,
        &[plus_four.clone(), times_two.clone()],
        &state,
        &[],
        None,
    )
    .unwrap();
    assert_eq!(forward.final_mult, 12.0);
    assert_eq!(forward.final_score, 384);

    let reversed = calculate_score(&hand, &[times_two, plus_four], &state, &[], None).unwrap();
    assert_eq!(reversed.final_mult, 8.0);
    assert_eq!(reversed.final_score, 256);
}

#[test]
// Foil ace with a Red seal: the +50 chips fire twice
fn red_seal_retrigger_on_foil() {
    let ace = Card::new(Rank::Ace, Suit::Spade)
        .with_edition(Edition::Foil)
        .with_seal(Seal::Red);
    let breakdown =
        calculate_score(&[ace], &[], &GameState::default(), &[], None).unwrap();

    assert_eq!(breakdown.hand_type, HandType::HighCard);
    assert_eq!(breakdown.final_chips, 116);
    assert_eq!(breakdown.final_mult, 1.0);
    assert_eq!(breakdown.final_score, 116);
}

#[test]
// Steel king held, plain ace played: 16 x 1.5 floored
fn steel_held_in_hand() {
    let held = vec![Card::new(Rank::King, Suit::Heart).with_enhancement(Enhancement::Steel)];
    let breakdown = calculate_score(
        &cards(&["AS"]),
        &[],
        &GameState::default(),
        &held,
        None,
    )
    .unwrap();

    assert_eq!(breakdown.final_chips, 16);
    assert_eq!(breakdown.final_mult, 1.5);
    assert_eq!(breakdown.final_score, 24);
}

#[test]
// Repeated calls with identical inputs return identical breakdowns
fn scoring_is_deterministic() {
    let hand = vec![
        Card::new(Rank::Ace, Suit::Spade).with_enhancement(Enhancement::Lucky),
        Card::new(Rank::Ace, Suit::Heart).with_enhancement(Enhancement::Glass),
        Card::new(Rank::King, Suit::Diamond).with_seal(Seal::Gold),
    ];
    let held = cards(&["2C", "9H"]);
    let jokers = vec![
        JokerInstance::new(JokerId::Joker),
        JokerInstance::new(JokerId::TheDuo),
    ];
    let state = GameState::default();

    let first = calculate_score(&hand, &jokers, &state, &held, Some(7)).unwrap();
    let second = calculate_score(&hand, &jokers, &state, &held, Some(7)).unwrap();
    assert_eq!(first, second);
}
