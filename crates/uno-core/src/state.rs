//! Per-round state. One instance per round, never shared across rounds.

use crate::event::DrawReason;
use crate::history::OpponentHistory;
use crate::ledger::UnseenLedger;
use crate::model::{Card, Hand, PlayerId, RelativePosition, TopCard};
use crate::tracker::TurnTracker;
use std::collections::{HashMap, HashSet};

/// Nobody's hand may grow past this through non-forced draws.
pub const HAND_CAP: u8 = 25;

/// What the dealer told us when our turn opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnPrompt {
    pub draw_reason: DrawReason,
    pub must_draw: bool,
}

/// Everything we can reconstruct about the current round from the event
/// stream: our hand, the discard pile, the unseen-card ledger, seat
/// tracking, per-opponent history and counts.
#[derive(Debug, Clone)]
pub struct RoundState {
    pub(crate) self_id: PlayerId,
    pub(crate) hand: Hand,
    pub(crate) discard: Vec<TopCard>,
    pub(crate) ledger: UnseenLedger,
    pub(crate) tracker: Option<TurnTracker>,
    pub(crate) history: OpponentHistory,
    pub(crate) hand_counts: HashMap<PlayerId, u8>,
    pub(crate) deck_remaining: i32,
    pub(crate) field_count: i32,
    pub(crate) revealed: HashMap<PlayerId, Vec<Card>>,
    /// Whether the discard top's draw effect is still unconsumed.
    pub(crate) draw_effect_armed: bool,
    /// White-wild draws still owed per player, paid on later turns.
    pub(crate) deferred_white_draws: HashMap<PlayerId, u8>,
    /// A draw-four challenge against us succeeded this round.
    pub(crate) challenged_successfully: bool,
    pub(crate) my_uno: bool,
    /// Players who actually called uno, as opposed to merely sitting at one
    /// card. Missed-uno pointing compares the two.
    pub(crate) uno_declarations: HashSet<PlayerId>,
    pub(crate) turn_prompt: Option<TurnPrompt>,
    pub(crate) finished: bool,
    /// Ledger underflows papered over by trusting the broadcast instead.
    pub(crate) desync_repairs: u32,
}

impl RoundState {
    pub fn new(self_id: PlayerId) -> Self {
        Self {
            self_id,
            hand: Hand::new(),
            discard: Vec::new(),
            ledger: UnseenLedger::new(),
            tracker: None,
            history: OpponentHistory::new(),
            hand_counts: HashMap::new(),
            deck_remaining: 0,
            field_count: 0,
            revealed: HashMap::new(),
            draw_effect_armed: true,
            deferred_white_draws: HashMap::new(),
            challenged_successfully: false,
            my_uno: false,
            uno_declarations: HashSet::new(),
            turn_prompt: None,
            finished: false,
            desync_repairs: 0,
        }
    }

    pub fn self_id(&self) -> &PlayerId {
        &self.self_id
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn ledger(&self) -> &UnseenLedger {
        &self.ledger
    }

    pub fn tracker(&self) -> Option<&TurnTracker> {
        self.tracker.as_ref()
    }

    pub fn history(&self) -> &OpponentHistory {
        &self.history
    }

    pub fn discard_top(&self) -> Option<&TopCard> {
        self.discard.last()
    }

    /// The top that a draw-four was played onto, used to judge whether its
    /// player could have answered legally instead. Colorless entries are
    /// skipped; the legality question needs a concrete color.
    pub fn pre_draw_four_top(&self) -> Option<&TopCard> {
        let len = self.discard.len();
        self.discard[..len.saturating_sub(1)]
            .iter()
            .rev()
            .find(|top| top.color.is_some())
    }

    pub fn hand_count_of(&self, player: &PlayerId) -> u8 {
        self.hand_counts.get(player).copied().unwrap_or(0)
    }

    pub const fn deck_remaining(&self) -> i32 {
        self.deck_remaining
    }

    pub fn revealed_cards(&self, player: &PlayerId) -> &[Card] {
        self.revealed.get(player).map_or(&[], Vec::as_slice)
    }

    pub const fn challenged_successfully(&self) -> bool {
        self.challenged_successfully
    }

    pub const fn my_uno(&self) -> bool {
        self.my_uno
    }

    pub const fn turn_prompt(&self) -> Option<TurnPrompt> {
        self.turn_prompt
    }

    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    pub const fn desync_repairs(&self) -> u32 {
        self.desync_repairs
    }

    /// The opponent who acts right after us in the current direction.
    pub fn next_player(&self) -> Option<&PlayerId> {
        self.tracker
            .as_ref()
            .map(|tracker| tracker.player_at(RelativePosition::Next))
    }

    /// Concealed cards across all three opponents.
    pub fn opponent_card_total(&self) -> u32 {
        self.tracker
            .as_ref()
            .map(|tracker| {
                tracker
                    .opponents()
                    .map(|player| u32::from(self.hand_count_of(player)))
                    .sum()
            })
            .unwrap_or(0)
    }

    /// First opponent sitting at exactly one card without having called uno.
    pub fn undeclared_uno_opponent(&self) -> Option<&PlayerId> {
        let tracker = self.tracker.as_ref()?;
        tracker.opponents().find(|player| {
            self.hand_count_of(player) == 1 && !self.uno_declarations.contains(*player)
        })
    }
}
