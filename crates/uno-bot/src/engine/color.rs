use crate::engine::PlayMode;
use crate::policy::PolicyContext;
use uno_core::model::{Color, PlayerId};

/// The color to declare after a wild.
///
/// Attacking, we keep our options open: the color we hold the most of,
/// ties broken toward the scarcer color in the unseen pool. Under
/// pressure, we aim the color at the most dangerous opponent instead:
/// one they provably failed to match recently, falling back to global
/// scarcity.
pub fn choose_color(ctx: &PolicyContext<'_>, mode: PlayMode) -> Color {
    match mode {
        PlayMode::Offensive | PlayMode::Fallback => most_held_color(ctx),
        PlayMode::Defensive | PlayMode::Uno(_) => {
            match lowest_hand_opponent(ctx)
                .and_then(|player| ctx.state.history().last_unmatched_color(&player))
            {
                Some(color) => color,
                None => scarcest_color(ctx),
            }
        }
    }
}

fn most_held_color(ctx: &PolicyContext<'_>) -> Color {
    let hand = ctx.state.hand();
    let ledger = ctx.state.ledger();
    let mut best = Color::Red;
    for color in Color::ALL {
        let count = hand.color_count(color);
        let best_count = hand.color_count(best);
        if count > best_count {
            best = color;
        } else if count == best_count && ledger.color_count(color) < ledger.color_count(best) {
            best = color;
        }
    }
    best
}

fn scarcest_color(ctx: &PolicyContext<'_>) -> Color {
    let ledger = ctx.state.ledger();
    Color::ALL
        .into_iter()
        .min_by_key(|color| (ledger.color_count(*color), color.index()))
        .unwrap_or(Color::Red)
}

fn lowest_hand_opponent(ctx: &PolicyContext<'_>) -> Option<PlayerId> {
    let tracker = ctx.state.tracker()?;
    tracker
        .opponents()
        .min_by_key(|player| ctx.state.hand_count_of(player))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::choose_color;
    use crate::engine::PlayMode;
    use crate::policy::PolicyContext;
    use uno_core::event::GameEvent;
    use uno_core::model::{Card, Color, PlayerId, Rank};
    use uno_core::state::RoundState;
    use uno_core::stats::MatchStats;

    fn state_with_hand(cards: Vec<Card>) -> RoundState {
        let mut state = RoundState::new(PlayerId::from("me"));
        state.apply(&GameEvent::CardsReceived { cards });
        state.apply(&GameEvent::RoundStarted {
            seating_order: ["a", "b", "me", "d"].map(PlayerId::from).to_vec(),
            first_card: Card::numeral(Color::Green, Rank::Seven),
            first_player: "a".into(),
        });
        state
    }

    #[test]
    fn offensive_color_is_the_most_held() {
        let state = state_with_hand(vec![
            Card::numeral(Color::Yellow, Rank::One),
            Card::numeral(Color::Yellow, Rank::Two),
            Card::numeral(Color::Red, Rank::Three),
        ]);
        let stats = MatchStats::new();
        let ctx = PolicyContext {
            state: &state,
            stats: &stats,
        };
        assert_eq!(choose_color(&ctx, PlayMode::Offensive), Color::Yellow);
    }

    #[test]
    fn defensive_color_targets_the_unmatched_record() {
        let mut state = state_with_hand(vec![Card::numeral(Color::Red, Rank::Three)]);
        // "d" drew with blue on top, so blue is safe against them.
        state.apply(&GameEvent::CardPlayed {
            player: "a".into(),
            card: Card::numeral(Color::Blue, Rank::Four),
            declared_uno: false,
        });
        state.apply(&GameEvent::CardDrawn { player: "d".into() });
        // Make "d" the shortest hand so they are the defensive target.
        state.apply(&GameEvent::TurnStarted {
            hand_sizes: [("a", 7u8), ("b", 7), ("me", 1), ("d", 2)]
                .map(|(id, count)| (PlayerId::from(id), count))
                .into_iter()
                .collect(),
            my_hand: vec![Card::numeral(Color::Red, Rank::Three)],
            discard_top: Card::numeral(Color::Blue, Rank::Four),
            draw_reason: Default::default(),
            must_draw: false,
        });
        let stats = MatchStats::new();
        let ctx = PolicyContext {
            state: &state,
            stats: &stats,
        };
        assert_eq!(choose_color(&ctx, PlayMode::Defensive), Color::Blue);
    }
}
