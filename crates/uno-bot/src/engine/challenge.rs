use crate::policy::PolicyContext;
use tracing::{Level, event};
use uno_core::model::{Card, RelativePosition, TopCard, WildKind};
use uno_core::prob::{ChallengeThresholds, probability_holds_any};

/// Whether a revealed card could have answered the pre-draw-four top
/// legally. A draw four does not count; holding one is exactly the claim
/// being challenged.
fn answers(card: Card, top: &TopCard) -> bool {
    match card {
        Card::Wild(WildKind::WildDrawFour) => false,
        Card::Wild(_) => true,
        _ => card.matches(top),
    }
}

/// Challenge verdict against the previous player's draw four.
///
/// Memory beats math: if their revealed hand still holds an answer to the
/// card the draw four covered, challenge unconditionally. Otherwise gate
/// on accumulated history, then on the hypergeometric bar.
pub fn should_challenge(ctx: &PolicyContext<'_>, thresholds: &ChallengeThresholds) -> bool {
    let state = ctx.state;
    let Some(tracker) = state.tracker() else {
        return false;
    };
    let before = tracker.player_at(RelativePosition::Previous).clone();
    let Some(pre_top) = state.pre_draw_four_top().copied() else {
        return false;
    };

    if state
        .revealed_cards(&before)
        .iter()
        .any(|&card| answers(card, &pre_top))
    {
        event!(
            target: "uno_bot::challenge",
            Level::INFO,
            opponent = %before,
            verdict = true,
            reason = "revealed hand still answers the covered top"
        );
        return true;
    }

    if ctx.stats.rounds() > thresholds.min_rounds {
        let record = ctx.stats.ledger_for(&before);
        if let Some(rate) = record.success_rate() {
            if rate <= thresholds.min_success_rate {
                event!(
                    target: "uno_bot::challenge",
                    Level::INFO,
                    opponent = %before,
                    verdict = false,
                    success_rate = rate,
                    reason = "history gate"
                );
                return false;
            }
        }
    }

    let Some(color) = pre_top.color else {
        return false;
    };
    let matching = state.ledger().answer_count(color);
    let concealed = state.opponent_card_total();
    let pool = (state.deck_remaining() + concealed as i32).max(0) as u32;
    let hand = u32::from(state.hand_count_of(&before));

    match probability_holds_any(pool, matching, hand) {
        Ok(p) => {
            let verdict = p >= thresholds.bar_for_hand(hand);
            event!(
                target: "uno_bot::challenge",
                Level::INFO,
                opponent = %before,
                verdict,
                probability = p,
                pool,
                matching,
                hand,
            );
            verdict
        }
        Err(error) => {
            tracing::warn!(target: "uno_bot::challenge", %error, "probability query failed");
            false
        }
    }
}

/// Whether to commit a wild draw four instead of a safer card.
pub fn should_play_draw_four(ctx: &PolicyContext<'_>, thresholds: &ChallengeThresholds, legal: &[Card]) -> bool {
    let state = ctx.state;

    // Nothing else to play: the claim is honest by definition.
    if !legal.is_empty() && legal.iter().all(|card| card.is_draw_four()) {
        return true;
    }
    if state.challenged_successfully() {
        return false;
    }
    let Some(tracker) = state.tracker() else {
        return false;
    };
    let next = tracker.player_at(RelativePosition::Next).clone();

    if ctx.stats.rounds() > thresholds.min_rounds {
        let record = ctx.stats.ledger_for(&next);
        if let Some(rate) = record.challenge_rate() {
            if rate >= thresholds.challenge_rate_veto {
                return false;
            }
            if rate <= thresholds.challenge_rate_free_pass {
                return true;
            }
        }
        if let Some(rate) = record.counter_success_rate() {
            if rate >= thresholds.counter_success_veto {
                return false;
            }
        }
    }

    let Some(top) = state.discard_top() else {
        return false;
    };
    let Some(color) = top.color else {
        return false;
    };

    // Our own hand counts toward the answers, since we are asking whether
    // a hand like ours would hold one; the unseen pool does not include
    // our cards.
    let mut matching = state.ledger().answer_count(color);
    for &card in state.hand().cards() {
        match card {
            Card::Wild(WildKind::WildDrawFour) => {}
            Card::Wild(_) => matching += 1,
            _ if card.color() == Some(color) => matching += 1,
            _ => {}
        }
    }

    let own = state.hand().len() as u32;
    let next_count = u32::from(state.hand_count_of(&next));
    let others: u32 = tracker
        .opponents()
        .filter(|player| **player != next)
        .map(|player| u32::from(state.hand_count_of(player)))
        .sum();
    // The next player gets half weight: their cards are the ones the
    // challenge verdict is actually about.
    let pool = (state.deck_remaining() + (own + others + next_count / 2) as i32).max(0) as u32;

    match probability_holds_any(pool, matching, own) {
        Ok(p) => {
            let verdict = p < thresholds.bar_for_hand(own);
            event!(
                target: "uno_bot::challenge",
                Level::INFO,
                next = %next,
                verdict,
                probability = p,
                pool,
                matching,
                reason = "draw-four commitment"
            );
            verdict
        }
        Err(error) => {
            tracing::warn!(target: "uno_bot::challenge", %error, "probability query failed");
            false
        }
    }
}
