//! Event reducer: folds inbound events into [`RoundState`].
//!
//! Every update is fail-soft. A malformed payload is reported and dropped;
//! a ledger miscount is repaired by trusting the next hand-size broadcast
//! instead of crashing the round.

use crate::event::{EventShapeError, GameEvent, parse_event};
use crate::history::ColorReason;
use crate::ledger::UnseenLedger;
use crate::model::{ActionKind, Card, PlayerId, TopCard, WildKind};
use crate::state::{HAND_CAP, RoundState, TurnPrompt};
use crate::tracker::TurnTracker;
use std::collections::HashMap;

impl RoundState {
    /// Parses a raw payload and applies it.
    pub fn apply_json(&mut self, payload: &str) -> Result<(), EventShapeError> {
        let event = parse_event(payload)?;
        self.apply(&event);
        Ok(())
    }

    /// Applies one event. Infallible: inconsistencies are absorbed and
    /// counted in [`RoundState::desync_repairs`].
    pub fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::CardsReceived { cards } => self.on_cards_received(cards),
            GameEvent::RoundStarted {
                seating_order,
                first_card,
                first_player: _,
            } => self.on_round_started(seating_order, *first_card),
            GameEvent::ColorRequested => {}
            GameEvent::ColorUpdated { color, player } => {
                self.on_color_updated(*color, player.as_ref());
            }
            GameEvent::ShuffleOccurred {
                hand_sizes,
                new_hand,
            } => self.on_shuffle(hand_sizes, new_hand),
            GameEvent::TurnStarted {
                hand_sizes,
                my_hand,
                discard_top,
                draw_reason,
                must_draw,
            } => {
                self.on_turn_started(
                    hand_sizes,
                    my_hand,
                    *discard_top,
                    TurnPrompt {
                        draw_reason: *draw_reason,
                        must_draw: *must_draw,
                    },
                );
            }
            GameEvent::CardPlayed {
                player,
                card,
                declared_uno,
            } => self.on_card_played(player, *card, *declared_uno),
            GameEvent::CardDrawn { player } => self.on_card_drawn(player),
            GameEvent::DrawnCardPlayed {
                player,
                card,
                is_played,
                declared_uno,
            } => {
                if *is_played {
                    if let Some(card) = card {
                        self.on_card_played(player, *card, *declared_uno);
                    }
                }
            }
            GameEvent::ChallengeResult {
                challenger,
                target,
                did_challenge,
                succeeded,
            } => self.on_challenge_result(challenger, target, *did_challenge, *succeeded),
            GameEvent::HandRevealed { player, cards } => {
                if player != &self.self_id {
                    self.revealed.insert(player.clone(), cards.clone());
                }
            }
            GameEvent::MissedUnoPointed { .. } => {}
            GameEvent::PenaltyApplied { player, draw_count } => {
                self.clear_uno(player);
                self.draw_cards(player, *draw_count, true);
            }
            GameEvent::RoundFinished { .. } | GameEvent::MatchFinished => {
                self.finished = true;
            }
        }
    }

    fn on_cards_received(&mut self, cards: &[Card]) {
        for &card in cards {
            self.hand.add(card);
            self.observe_or_repair(card);
        }
    }

    fn on_round_started(&mut self, seating_order: &[PlayerId], first_card: Card) {
        match TurnTracker::initialize(seating_order, &self.self_id) {
            Ok(tracker) => self.tracker = Some(tracker),
            Err(_) => {
                self.desync_repairs += 1;
                return;
            }
        }
        for player in seating_order {
            self.hand_counts.insert(player.clone(), 7);
        }
        self.discard.push(TopCard::colored(first_card));
        self.observe_or_repair(first_card);
        self.field_count = 1;
        self.deck_remaining = crate::ledger::DECK_SIZE as i32 - 4 * 7 - 1;
        if matches!(
            first_card,
            Card::Action {
                kind: ActionKind::Reverse,
                ..
            }
        ) {
            if let Some(tracker) = self.tracker.as_mut() {
                tracker.reverse();
            }
        }
    }

    fn on_color_updated(&mut self, color: crate::model::Color, player: Option<&PlayerId>) {
        if let Some(top) = self.discard.last_mut() {
            top.color = Some(color);
        }
        if let Some(player) = player {
            if player != &self.self_id {
                self.history
                    .record_color(player, color, ColorReason::DeclaredAfterWild);
            }
        }
    }

    fn on_shuffle(&mut self, hand_sizes: &HashMap<PlayerId, u8>, new_hand: &[Card]) {
        // The shuffle wild itself stays on the field; everything else we
        // held goes back into the unseen pool.
        let old_hand: Vec<Card> = self.hand.cards().to_vec();
        for card in old_hand {
            if card != Card::Wild(WildKind::WildShuffle) {
                self.release_or_repair(card);
            }
        }
        for &card in new_hand {
            self.observe_or_repair(card);
        }
        self.hand.replace(new_hand.to_vec());
        self.revealed.clear();
        self.sync_counts(hand_sizes);
        self.uno_declarations.clear();
        for (player, count) in hand_sizes {
            if *count == 1 {
                self.uno_declarations.insert(player.clone());
            }
        }
    }

    fn on_turn_started(
        &mut self,
        hand_sizes: &HashMap<PlayerId, u8>,
        my_hand: &[Card],
        discard_top: Card,
        prompt: TurnPrompt,
    ) {
        // Declarations for players no longer at one card are stale.
        self.uno_declarations
            .retain(|player| hand_sizes.get(player).is_none_or(|count| *count == 1));
        self.sync_counts(hand_sizes);

        // Cards drawn since our last turn arrive unnamed; the broadcast
        // hand is the first place we see them.
        for card in self.hand.multiset_new(my_hand) {
            self.observe_or_repair(card);
        }
        self.hand.replace(my_hand.to_vec());

        match self.discard.last_mut() {
            Some(top) if top.card == discard_top => {}
            Some(_) | None => self.discard.push(TopCard::colored(discard_top)),
        }

        self.turn_prompt = Some(prompt);
        self.recompute_deck_remaining();
        if self.deck_remaining <= 0 {
            self.resync_exhausted_deck();
        }
    }

    fn on_card_played(&mut self, player: &PlayerId, card: Card, declared_uno: bool) {
        if declared_uno {
            self.uno_declarations.insert(player.clone());
            if player == &self.self_id {
                self.my_uno = true;
            } else if let Some(tracker) = self.tracker.as_mut() {
                tracker.mark_uno(player);
            }
        }

        // A shuffle wild does not shrink the hand here; the shuffle event
        // redistributes all counts right after.
        if card != Card::Wild(WildKind::WildShuffle) {
            let count = self.hand_counts.entry(player.clone()).or_insert(0);
            *count = count.saturating_sub(1);
        }

        let top = if card == Card::Wild(WildKind::WhiteWild) {
            // A white wild never declares; it inherits the color under it.
            let inherited = self.discard.last().and_then(|top| top.color);
            TopCard::new(card, inherited)
        } else {
            TopCard::colored(card)
        };
        self.discard.push(top);
        self.field_count += 1;
        self.draw_effect_armed = true;

        let count_after = self.hand_count_of(player);
        if player == &self.self_id {
            if !self.hand.remove(card) {
                // A card drawn and played in the same turn never reached a
                // hand broadcast; the play is the first time we see it.
                self.observe_or_repair(card);
            }
        } else {
            self.history.record_play(player, card, count_after);
            self.observe_or_repair(card);
            if let Some(open) = self.revealed.get_mut(player) {
                if let Some(at) = open.iter().position(|held| *held == card) {
                    open.remove(at);
                }
            }
        }

        if matches!(
            card,
            Card::Action {
                kind: ActionKind::Reverse,
                ..
            }
        ) {
            if let Some(tracker) = self.tracker.as_mut() {
                tracker.reverse();
            }
        }
    }

    fn on_card_drawn(&mut self, player: &PlayerId) {
        self.clear_uno(player);

        let top = self.discard.last().map(|top| top.card);
        let top_color = self.discard.last().and_then(|top| top.color);
        let deferred = self
            .deferred_white_draws
            .get(player)
            .copied()
            .unwrap_or(0);

        let (count, forced) = if self.draw_effect_armed {
            match top {
                Some(Card::Wild(WildKind::WhiteWild)) => {
                    self.draw_effect_armed = false;
                    *self
                        .deferred_white_draws
                        .entry(player.clone())
                        .or_insert(0) += 1;
                    (1, true)
                }
                Some(Card::Action {
                    kind: ActionKind::DrawTwo,
                    ..
                }) => {
                    self.draw_effect_armed = false;
                    (2, true)
                }
                Some(Card::Wild(WildKind::WildDrawFour)) => {
                    self.draw_effect_armed = false;
                    (4, true)
                }
                _ => self.voluntary_draw(player, top_color, deferred),
            }
        } else {
            self.voluntary_draw(player, top_color, deferred)
        };

        self.draw_cards(player, count, !forced);
    }

    /// A draw with no armed effect on top: either a deferred white-wild
    /// payment or a genuine "nothing to play".
    fn voluntary_draw(
        &mut self,
        player: &PlayerId,
        top_color: Option<crate::model::Color>,
        deferred: u8,
    ) -> (u8, bool) {
        if deferred > 0 {
            self.deferred_white_draws
                .insert(player.clone(), deferred - 1);
            (1, true)
        } else {
            if player != &self.self_id {
                if let Some(color) = top_color {
                    self.history
                        .record_color(player, color, ColorReason::CouldNotMatch);
                }
            }
            (1, false)
        }
    }

    /// Moves `count` cards from the deck to `player`, clamping at the hand
    /// cap when the draw is not a forced effect.
    fn draw_cards(&mut self, player: &PlayerId, count: u8, capped: bool) {
        let held = self.hand_count_of(player);
        let count = if capped {
            count.min(HAND_CAP.saturating_sub(held))
        } else {
            count
        };
        self.deck_remaining -= i32::from(count);
        self.hand_counts.insert(player.clone(), held + count);
        if self.deck_remaining <= 0 {
            self.resync_exhausted_deck();
        }
    }

    fn on_challenge_result(
        &mut self,
        challenger: &PlayerId,
        target: &PlayerId,
        did_challenge: bool,
        succeeded: bool,
    ) {
        if !did_challenge {
            // Declined: the draw-four effect resolves normally.
            self.on_card_drawn(challenger);
            return;
        }
        if succeeded {
            if target == &self.self_id {
                self.challenged_successfully = true;
            }
            // The target takes 4 as a penalty and the draw-four goes back
            // to their hand; the prior top is in play again.
            self.draw_cards(target, 4, true);
            if let Some(returned) = self.discard.pop() {
                self.field_count -= 1;
                let held = self.hand_count_of(target);
                self.hand_counts.insert(target.clone(), held + 1);
                if target == &self.self_id {
                    self.hand.add(returned.card);
                } else {
                    self.release_or_repair(returned.card);
                }
            }
            self.draw_effect_armed = false;
        } else {
            // Failed: the challenger eats the draw-four plus a two-card
            // penalty.
            self.on_card_drawn(challenger);
            self.draw_cards(challenger, 2, true);
        }
    }

    fn clear_uno(&mut self, player: &PlayerId) {
        self.uno_declarations.remove(player);
        if player == &self.self_id {
            self.my_uno = false;
        } else if let Some(tracker) = self.tracker.as_mut() {
            tracker.clear_uno(player);
        }
    }

    fn sync_counts(&mut self, hand_sizes: &HashMap<PlayerId, u8>) {
        for (player, count) in hand_sizes {
            self.hand_counts.insert(player.clone(), *count);
        }
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.sync_uno_flags(hand_sizes);
        }
        if let Some(own) = hand_sizes.get(&self.self_id) {
            self.my_uno = *own == 1;
        }
    }

    /// Deck size is derived, not broadcast: unseen cards minus what the
    /// opponents hold.
    fn recompute_deck_remaining(&mut self) {
        let unseen = i32::try_from(self.ledger.total()).unwrap_or(0);
        let concealed = i32::try_from(self.opponent_card_total()).unwrap_or(0);
        self.deck_remaining = unseen - concealed;
    }

    /// The draw pile ran dry: the field (minus its top card) is reshuffled
    /// into a fresh deck, and the ledger is rebuilt around what we can see.
    fn resync_exhausted_deck(&mut self) {
        let mut visible: Vec<Card> = self.hand.cards().to_vec();
        if let Some(top) = self.discard.last() {
            visible.push(top.card);
        }
        let mut rebuilt = UnseenLedger::new();
        match rebuilt.observe_all(&visible) {
            Ok(()) => self.ledger = rebuilt,
            Err(_) => self.desync_repairs += 1,
        }
        self.deck_remaining += self.field_count - 1;
        self.field_count = 1;
    }

    fn observe_or_repair(&mut self, card: Card) {
        if self.ledger.observe(card).is_err() {
            self.desync_repairs += 1;
        }
    }

    fn release_or_repair(&mut self, card: Card) {
        if self.ledger.release(card).is_err() {
            self.desync_repairs += 1;
        }
    }

    /// Conservation check: unseen cards (deck plus concealed hands) plus
    /// our own hand plus the cards played to the field account for the
    /// whole deck while state is consistent.
    pub fn accounted_cards(&self) -> i64 {
        i64::from(self.ledger.total()) + self.hand.len() as i64 + i64::from(self.field_count)
    }
}

#[cfg(test)]
mod tests {
    use crate::event::GameEvent;
    use crate::ledger::DECK_SIZE;
    use crate::model::{ActionKind, Card, Color, PlayerId, Rank, RelativePosition, WildKind};
    use crate::state::RoundState;
    use std::collections::HashMap;

    fn me() -> PlayerId {
        PlayerId::from("me")
    }

    fn seating() -> Vec<PlayerId> {
        ["a", "b", "me", "d"].map(PlayerId::from).to_vec()
    }

    fn dealt_hand() -> Vec<Card> {
        vec![
            Card::numeral(Color::Red, Rank::One),
            Card::numeral(Color::Red, Rank::Two),
            Card::numeral(Color::Blue, Rank::Three),
            Card::numeral(Color::Green, Rank::Four),
            Card::numeral(Color::Yellow, Rank::Five),
            Card::action(Color::Blue, ActionKind::DrawTwo),
            Card::Wild(WildKind::WildShuffle),
        ]
    }

    fn started() -> RoundState {
        let mut state = RoundState::new(me());
        state.apply(&GameEvent::CardsReceived {
            cards: dealt_hand(),
        });
        state.apply(&GameEvent::RoundStarted {
            seating_order: seating(),
            first_card: Card::numeral(Color::Red, Rank::Seven),
            first_player: "a".into(),
        });
        state
    }

    fn sizes(entries: &[(&str, u8)]) -> HashMap<PlayerId, u8> {
        entries
            .iter()
            .map(|(id, count)| (PlayerId::from(*id), *count))
            .collect()
    }

    #[test]
    fn round_start_accounts_for_the_whole_deck() {
        let state = started();
        assert_eq!(state.accounted_cards(), i64::from(DECK_SIZE));
        assert_eq!(state.deck_remaining(), 83);
        assert_eq!(state.hand_count_of(&"a".into()), 7);
        assert_eq!(
            state.tracker().unwrap().player_at(RelativePosition::Next),
            &PlayerId::from("d")
        );
    }

    #[test]
    fn first_card_reverse_flips_the_order() {
        let mut state = RoundState::new(me());
        state.apply(&GameEvent::RoundStarted {
            seating_order: seating(),
            first_card: Card::action(Color::Red, ActionKind::Reverse),
            first_player: "a".into(),
        });
        assert_eq!(
            state.tracker().unwrap().player_at(RelativePosition::Next),
            &PlayerId::from("b")
        );
    }

    #[test]
    fn opponent_play_updates_ledger_counts_and_history() {
        let mut state = started();
        let card = Card::numeral(Color::Green, Rank::Seven);
        state.apply(&GameEvent::CardPlayed {
            player: "d".into(),
            card,
            declared_uno: false,
        });

        assert_eq!(state.hand_count_of(&"d".into()), 6);
        assert_eq!(state.ledger().count_of(card), 1);
        assert_eq!(state.discard_top().unwrap().card, card);
        let plays = state.history().recent_plays(&"d".into(), 1);
        assert_eq!(plays[0].hand_size_after, 6);
        assert_eq!(state.accounted_cards(), i64::from(DECK_SIZE));
    }

    #[test]
    fn own_play_shrinks_the_hand_without_reobserving() {
        let mut state = started();
        let card = Card::numeral(Color::Red, Rank::One);
        let before = state.ledger().count_of(card);
        state.apply(&GameEvent::CardPlayed {
            player: me(),
            card,
            declared_uno: false,
        });
        assert_eq!(state.hand().len(), 6);
        assert_eq!(state.ledger().count_of(card), before);
        assert_eq!(state.accounted_cards(), i64::from(DECK_SIZE));
    }

    #[test]
    fn reverse_swaps_next_and_previous() {
        let mut state = started();
        state.apply(&GameEvent::CardPlayed {
            player: "a".into(),
            card: Card::action(Color::Blue, ActionKind::Reverse),
            declared_uno: false,
        });
        let tracker = state.tracker().unwrap();
        assert_eq!(
            tracker.player_at(RelativePosition::Next),
            &PlayerId::from("b")
        );
        assert_eq!(
            tracker.player_at(RelativePosition::Across),
            &PlayerId::from("a")
        );
    }

    #[test]
    fn white_wild_inherits_the_previous_color() {
        let mut state = started();
        state.apply(&GameEvent::CardPlayed {
            player: "d".into(),
            card: Card::Wild(WildKind::WhiteWild),
            declared_uno: false,
        });
        let top = state.discard_top().unwrap();
        assert_eq!(top.card, Card::Wild(WildKind::WhiteWild));
        assert_eq!(top.color, Some(Color::Red));
    }

    #[test]
    fn draw_two_effect_is_consumed_by_one_draw() {
        let mut state = started();
        state.apply(&GameEvent::CardPlayed {
            player: "d".into(),
            card: Card::action(Color::Blue, ActionKind::DrawTwo),
            declared_uno: false,
        });
        state.apply(&GameEvent::CardDrawn { player: "a".into() });
        assert_eq!(state.hand_count_of(&"a".into()), 9);
        assert_eq!(state.deck_remaining(), 81);

        // Effect spent; the next draw is a voluntary single card and
        // records the color the player failed to match.
        state.apply(&GameEvent::CardDrawn { player: "b".into() });
        assert_eq!(state.hand_count_of(&"b".into()), 8);
        assert_eq!(
            state.history().last_unmatched_color(&"b".into()),
            Some(Color::Blue)
        );
    }

    #[test]
    fn white_wild_defers_a_second_draw() {
        let mut state = started();
        state.apply(&GameEvent::CardPlayed {
            player: "d".into(),
            card: Card::Wild(WildKind::WhiteWild),
            declared_uno: false,
        });
        state.apply(&GameEvent::CardDrawn { player: "a".into() });
        assert_eq!(state.hand_count_of(&"a".into()), 8);

        // Later voluntary-looking draw pays the deferred card and must not
        // log an unmatched color.
        state.apply(&GameEvent::CardDrawn { player: "a".into() });
        assert_eq!(state.hand_count_of(&"a".into()), 9);
        assert_eq!(state.history().last_unmatched_color(&"a".into()), None);
    }

    #[test]
    fn successful_challenge_rolls_the_draw_four_back() {
        let mut state = started();
        state.apply(&GameEvent::CardPlayed {
            player: "d".into(),
            card: Card::Wild(WildKind::WildDrawFour),
            declared_uno: false,
        });
        assert_eq!(state.ledger().wild_count(WildKind::WildDrawFour), 3);

        state.apply(&GameEvent::ChallengeResult {
            challenger: me(),
            target: "d".into(),
            did_challenge: true,
            succeeded: true,
        });

        // 7 dealt - 1 played + 4 penalty + 1 returned.
        assert_eq!(state.hand_count_of(&"d".into()), 11);
        assert_eq!(state.ledger().wild_count(WildKind::WildDrawFour), 4);
        assert_eq!(
            state.discard_top().unwrap().card,
            Card::numeral(Color::Red, Rank::Seven)
        );
        assert_eq!(state.deck_remaining(), 79);
    }

    #[test]
    fn successful_challenge_against_us_sets_the_flag() {
        let mut state = started();
        let draw_four = Card::Wild(WildKind::WildDrawFour);
        state.apply(&GameEvent::CardsReceived {
            cards: vec![draw_four],
        });
        state.apply(&GameEvent::CardPlayed {
            player: me(),
            card: draw_four,
            declared_uno: false,
        });
        assert!(!state.challenged_successfully());

        state.apply(&GameEvent::ChallengeResult {
            challenger: "d".into(),
            target: me(),
            did_challenge: true,
            succeeded: true,
        });
        assert!(state.challenged_successfully());
        // The draw-four came back to our hand, not to the unseen pool.
        assert!(state.hand().contains(draw_four));
        assert_eq!(state.ledger().wild_count(WildKind::WildDrawFour), 3);
    }

    #[test]
    fn failed_challenge_costs_four_plus_two() {
        let mut state = started();
        state.apply(&GameEvent::CardPlayed {
            player: "d".into(),
            card: Card::Wild(WildKind::WildDrawFour),
            declared_uno: false,
        });
        state.apply(&GameEvent::ChallengeResult {
            challenger: "a".into(),
            target: "d".into(),
            did_challenge: false,
            succeeded: false,
        });
        assert_eq!(state.hand_count_of(&"a".into()), 11);

        let mut state = started();
        state.apply(&GameEvent::CardPlayed {
            player: "d".into(),
            card: Card::Wild(WildKind::WildDrawFour),
            declared_uno: false,
        });
        state.apply(&GameEvent::ChallengeResult {
            challenger: "a".into(),
            target: "d".into(),
            did_challenge: true,
            succeeded: false,
        });
        assert_eq!(state.hand_count_of(&"a".into()), 13);
    }

    #[test]
    fn shuffle_releases_everything_but_the_shuffle_wild() {
        let mut state = started();
        let unseen_before = state.ledger().total();
        let new_hand = vec![
            Card::numeral(Color::Green, Rank::Nine),
            Card::numeral(Color::Yellow, Rank::One),
        ];
        state.apply(&GameEvent::ShuffleOccurred {
            hand_sizes: sizes(&[("a", 9), ("b", 9), ("me", 2), ("d", 8)]),
            new_hand: new_hand.clone(),
        });

        // Six of our seven dealt cards went back (the shuffle wild stays on
        // the field) and the two replacements came out.
        assert_eq!(state.ledger().total(), unseen_before + 6 - 2);
        assert_eq!(state.hand().cards(), new_hand.as_slice());
        assert_eq!(state.hand_count_of(&"a".into()), 9);
    }

    #[test]
    fn shuffle_rederives_uno_flags() {
        let mut state = started();
        state.apply(&GameEvent::CardPlayed {
            player: "b".into(),
            card: Card::numeral(Color::Red, Rank::Eight),
            declared_uno: true,
        });
        assert!(state.tracker().unwrap().uno_declared(&"b".into()));

        state.apply(&GameEvent::ShuffleOccurred {
            hand_sizes: sizes(&[("a", 1), ("b", 9), ("me", 9), ("d", 9)]),
            new_hand: dealt_hand(),
        });
        let tracker = state.tracker().unwrap();
        assert!(tracker.uno_declared(&"a".into()));
        assert!(!tracker.uno_declared(&"b".into()));
        assert_eq!(state.undeclared_uno_opponent(), None);
    }

    #[test]
    fn turn_started_observes_newly_drawn_cards() {
        let mut state = started();
        state.apply(&GameEvent::CardDrawn { player: me() });

        let drawn = Card::numeral(Color::Green, Rank::Six);
        let mut my_hand = dealt_hand();
        my_hand.push(drawn);
        let before = state.ledger().count_of(drawn);
        state.apply(&GameEvent::TurnStarted {
            hand_sizes: sizes(&[("a", 7), ("b", 7), ("me", 8), ("d", 7)]),
            my_hand,
            discard_top: Card::numeral(Color::Red, Rank::Seven),
            draw_reason: Default::default(),
            must_draw: false,
        });
        assert_eq!(state.ledger().count_of(drawn), before - 1);
        assert_eq!(state.hand().len(), 8);
        // 112 unseen - 8 own - 1 top = 103; minus 21 concealed = 82.
        assert_eq!(state.deck_remaining(), 82);
    }

    #[test]
    fn a_drawn_card_played_at_once_leaves_the_unseen_pool() {
        let mut state = started();
        state.apply(&GameEvent::CardDrawn { player: me() });

        let drawn = Card::numeral(Color::Green, Rank::Six);
        let before = state.ledger().count_of(drawn);
        state.apply(&GameEvent::DrawnCardPlayed {
            player: me(),
            card: Some(drawn),
            is_played: true,
            declared_uno: false,
        });
        assert_eq!(state.ledger().count_of(drawn), before - 1);
        assert_eq!(state.discard_top().unwrap().card, drawn);
        assert_eq!(state.accounted_cards(), i64::from(DECK_SIZE));
    }

    #[test]
    fn deck_exhaustion_resyncs_the_ledger_idempotently() {
        let mut state = started();
        let event = GameEvent::TurnStarted {
            hand_sizes: sizes(&[("a", 40), ("b", 40), ("me", 7), ("d", 25)]),
            my_hand: dealt_hand(),
            discard_top: Card::numeral(Color::Red, Rank::Seven),
            draw_reason: Default::default(),
            must_draw: false,
        };
        state.apply(&event);
        let after_first = state.ledger().clone();
        // Own hand and the discard top stay excluded.
        assert_eq!(after_first.total(), DECK_SIZE - 8);
        assert_eq!(
            after_first.count_of(Card::numeral(Color::Red, Rank::Seven)),
            1
        );

        state.apply(&event);
        assert_eq!(state.ledger(), &after_first);
    }

    #[test]
    fn voluntary_draws_respect_the_hand_cap() {
        let mut state = started();
        state.apply(&GameEvent::TurnStarted {
            hand_sizes: sizes(&[("a", 25), ("b", 7), ("me", 7), ("d", 7)]),
            my_hand: dealt_hand(),
            discard_top: Card::numeral(Color::Red, Rank::Seven),
            draw_reason: Default::default(),
            must_draw: false,
        });
        let deck_before = state.deck_remaining();
        state.apply(&GameEvent::CardDrawn { player: "a".into() });
        assert_eq!(state.hand_count_of(&"a".into()), 25);
        assert_eq!(state.deck_remaining(), deck_before);
    }

    #[test]
    fn missed_uno_is_detectable_until_declared() {
        let mut state = started();
        state.apply(&GameEvent::TurnStarted {
            hand_sizes: sizes(&[("a", 7), ("b", 1), ("me", 7), ("d", 7)]),
            my_hand: dealt_hand(),
            discard_top: Card::numeral(Color::Red, Rank::Seven),
            draw_reason: Default::default(),
            must_draw: false,
        });
        assert_eq!(state.undeclared_uno_opponent(), Some(&PlayerId::from("b")));

        state.apply(&GameEvent::CardPlayed {
            player: "b".into(),
            card: Card::numeral(Color::Red, Rank::Eight),
            declared_uno: true,
        });
        assert_eq!(state.undeclared_uno_opponent(), None);
    }

    #[test]
    fn conservation_holds_across_random_play_sequences() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let mut rng = SmallRng::seed_from_u64(0x4d5f_0042);
        let opponents = ["a", "b", "d"].map(PlayerId::from);
        let mut state = started();

        for step in 0..150 {
            if step % 5 == 4 {
                let player = opponents[rng.gen_range(0..3)].clone();
                state.apply(&GameEvent::CardDrawn { player });
            } else {
                let unseen: Vec<Card> = state
                    .ledger()
                    .unseen_cards()
                    .map(|(card, _)| card)
                    .collect();
                if unseen.is_empty() {
                    break;
                }
                let card = unseen[rng.gen_range(0..unseen.len())];
                let player = opponents[rng.gen_range(0..3)].clone();
                state.apply(&GameEvent::CardPlayed {
                    player,
                    card,
                    declared_uno: false,
                });
            }
            assert_eq!(state.accounted_cards(), i64::from(DECK_SIZE));
            assert_eq!(state.desync_repairs(), 0);
        }
    }

    #[test]
    fn malformed_payloads_do_not_touch_state() {
        let mut state = started();
        let snapshot = state.ledger().clone();
        assert!(state.apply_json(r#"{"type": "card_played"}"#).is_err());
        assert_eq!(state.ledger(), &snapshot);
    }

    #[test]
    fn ledger_underflow_is_absorbed_not_fatal() {
        let mut state = started();
        let card = Card::numeral(Color::Green, Rank::Zero);
        for _ in 0..3 {
            state.apply(&GameEvent::CardPlayed {
                player: "d".into(),
                card,
                declared_uno: false,
            });
        }
        // Only one green zero exists; the extra observations are counted
        // as repairs and the count floors at zero.
        assert_eq!(state.ledger().count_of(card), 0);
        assert_eq!(state.desync_repairs(), 2);
    }
}
