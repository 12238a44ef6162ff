//! Replays a raw JSON event script through the reducer and checks that
//! card conservation holds at every step.

use uno_core::ledger::DECK_SIZE;
use uno_core::model::{Color, PlayerId};
use uno_core::state::RoundState;

const SCRIPT: &[&str] = &[
    // Dealt seven cards.
    r#"{"type": "cards_received", "cards": [
        {"color": "red", "number": 1},
        {"color": "red", "number": 5},
        {"color": "blue", "number": 3},
        {"color": "green", "number": 7},
        {"color": "yellow", "number": 2},
        {"color": "black", "special": "wild"},
        {"color": "black", "special": "wild_draw_4"}
    ]}"#,
    r#"{"type": "round_started",
        "seating_order": ["p1", "p2", "me", "p4"],
        "first_card": {"color": "blue", "number": 6},
        "first_player": "p1"}"#,
    // p1 opens with a draw two aimed at us.
    r#"{"type": "card_played", "player": "p1",
        "card": {"color": "blue", "special": "draw_2"}}"#,
    r#"{"type": "turn_started",
        "hand_sizes": {"p1": 6, "p2": 7, "me": 7, "p4": 7},
        "my_hand": [
            {"color": "red", "number": 1},
            {"color": "red", "number": 5},
            {"color": "blue", "number": 3},
            {"color": "green", "number": 7},
            {"color": "yellow", "number": 2},
            {"color": "black", "special": "wild"},
            {"color": "black", "special": "wild_draw_4"}
        ],
        "discard_top": {"color": "blue", "special": "draw_2"},
        "draw_reason": "draw_2",
        "must_draw": true}"#,
    // We pay the two cards; the next broadcast itemizes them.
    r#"{"type": "card_drawn", "player": "me"}"#,
    r#"{"type": "turn_started",
        "hand_sizes": {"p1": 6, "p2": 7, "me": 9, "p4": 7},
        "my_hand": [
            {"color": "red", "number": 1},
            {"color": "red", "number": 5},
            {"color": "blue", "number": 3},
            {"color": "green", "number": 7},
            {"color": "green", "number": 0},
            {"color": "yellow", "number": 2},
            {"color": "yellow", "number": 9},
            {"color": "black", "special": "wild"},
            {"color": "black", "special": "wild_draw_4"}
        ],
        "discard_top": {"color": "blue", "special": "draw_2"}}"#,
    r#"{"type": "card_played", "player": "me",
        "card": {"color": "blue", "number": 3}}"#,
    // p4 reverses play direction.
    r#"{"type": "card_played", "player": "p4",
        "card": {"color": "blue", "special": "reverse"}}"#,
    r#"{"type": "card_played", "player": "p2",
        "card": {"color": "blue", "number": 9}}"#,
    // p1 cannot answer blue and draws.
    r#"{"type": "card_drawn", "player": "p1"}"#,
    r#"{"type": "turn_started",
        "hand_sizes": {"p1": 7, "p2": 6, "me": 8, "p4": 6},
        "my_hand": [
            {"color": "red", "number": 1},
            {"color": "red", "number": 5},
            {"color": "green", "number": 7},
            {"color": "green", "number": 0},
            {"color": "yellow", "number": 2},
            {"color": "yellow", "number": 9},
            {"color": "black", "special": "wild"},
            {"color": "black", "special": "wild_draw_4"}
        ],
        "discard_top": {"color": "blue", "number": 9}}"#,
];

#[test]
fn replayed_round_conserves_every_card() {
    let mut state = RoundState::new(PlayerId::from("me"));
    for payload in SCRIPT {
        state.apply_json(payload).unwrap();
        assert_eq!(
            state.accounted_cards(),
            i64::from(DECK_SIZE),
            "conservation broke on payload {payload}"
        );
    }
    assert_eq!(state.desync_repairs(), 0);
}

#[test]
fn replayed_round_rebuilds_the_table_view() {
    let mut state = RoundState::new(PlayerId::from("me"));
    for payload in SCRIPT {
        state.apply_json(payload).unwrap();
    }

    assert_eq!(state.hand().len(), 8);
    assert_eq!(state.hand_count_of(&"p1".into()), 7);
    assert_eq!(state.hand_count_of(&"p2".into()), 6);
    // Opening deal took 29 cards, our effect draw two, p1's draw one.
    assert_eq!(state.deck_remaining(), 80);
    // The reverse flipped the direction, so p2 acts after us now.
    assert_eq!(state.next_player(), Some(&"p2".into()));
    // p1 drew while blue was on top.
    assert_eq!(
        state.history().last_unmatched_color(&"p1".into()),
        Some(Color::Blue)
    );
}
