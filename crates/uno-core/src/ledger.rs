//! Count ledger for every card we have not yet seen this round.
//!
//! The full deck is 112 cards: per color one zero, two each of ranks 1-9,
//! two each of draw-two, skip and reverse (25 a color, 100 total), plus
//! four wilds, four wild draw fours, one shuffle wild and three white
//! wilds. Cards leave the ledger when they become visible to us and
//! return when a shuffle or reshuffle hides them again.

use crate::model::{ActionKind, Card, Color, Rank, WildKind};
use thiserror::Error;

/// Per-color slot layout: ranks 0-9, then the three action kinds.
const SLOTS_PER_COLOR: usize = 13;
const SLOT_DRAW_TWO: usize = 10;
const SLOT_SKIP: usize = 11;
const SLOT_REVERSE: usize = 12;

/// The full deck holds this many cards.
pub const DECK_SIZE: u32 = 112;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// A card was observed more times than the deck contains copies.
    #[error("unseen count underflow for {card}")]
    CountUnderflow { card: Card },
    /// A card was released past its deck copy count.
    #[error("unseen count overflow for {card}")]
    CountOverflow { card: Card },
}

/// Remaining unseen copies of every card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnseenLedger {
    colors: [[u8; SLOTS_PER_COLOR]; 4],
    wilds: [u8; 4],
}

impl Default for UnseenLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl UnseenLedger {
    /// Ledger for a fresh round: the whole deck is unseen.
    pub fn new() -> Self {
        let mut slots = [0u8; SLOTS_PER_COLOR];
        for rank in Rank::ORDERED {
            slots[rank.value() as usize] = rank.copies_per_color();
        }
        slots[SLOT_DRAW_TWO] = 2;
        slots[SLOT_SKIP] = 2;
        slots[SLOT_REVERSE] = 2;

        let mut wilds = [0u8; 4];
        for kind in WildKind::ALL {
            wilds[kind.index()] = kind.copies();
        }

        Self {
            colors: [slots; 4],
            wilds,
        }
    }

    /// Empty ledger, used as the base when resynchronizing.
    pub fn empty() -> Self {
        Self {
            colors: [[0; SLOTS_PER_COLOR]; 4],
            wilds: [0; 4],
        }
    }

    fn slot(&self, card: Card) -> &u8 {
        match card {
            Card::Numeral { color, rank } => {
                &self.colors[color.index()][rank.value() as usize]
            }
            Card::Action { color, kind } => {
                &self.colors[color.index()][action_slot(kind)]
            }
            Card::Wild(kind) => &self.wilds[kind.index()],
        }
    }

    fn slot_mut(&mut self, card: Card) -> &mut u8 {
        match card {
            Card::Numeral { color, rank } => {
                &mut self.colors[color.index()][rank.value() as usize]
            }
            Card::Action { color, kind } => {
                &mut self.colors[color.index()][action_slot(kind)]
            }
            Card::Wild(kind) => &mut self.wilds[kind.index()],
        }
    }

    const fn deck_copies(card: Card) -> u8 {
        match card {
            Card::Numeral { rank, .. } => rank.copies_per_color(),
            Card::Action { .. } => 2,
            Card::Wild(kind) => kind.copies(),
        }
    }

    /// Marks one copy of `card` as seen.
    pub fn observe(&mut self, card: Card) -> Result<(), LedgerError> {
        let slot = self.slot_mut(card);
        if *slot == 0 {
            return Err(LedgerError::CountUnderflow { card });
        }
        *slot -= 1;
        Ok(())
    }

    pub fn observe_all(&mut self, cards: &[Card]) -> Result<(), LedgerError> {
        for &card in cards {
            self.observe(card)?;
        }
        Ok(())
    }

    /// Returns one copy of `card` to the unseen pool.
    pub fn release(&mut self, card: Card) -> Result<(), LedgerError> {
        let copies = Self::deck_copies(card);
        let slot = self.slot_mut(card);
        if *slot >= copies {
            return Err(LedgerError::CountOverflow { card });
        }
        *slot += 1;
        Ok(())
    }

    pub fn release_all(&mut self, cards: &[Card]) -> Result<(), LedgerError> {
        for &card in cards {
            self.release(card)?;
        }
        Ok(())
    }

    /// Rebuilds the ledger when the draw pile runs dry: everything not in
    /// front of us goes back into the unseen pool. `visible` is our own hand
    /// plus the discard top and any open revealed cards.
    pub fn resync_on_exhaustion(&mut self, visible: &[Card]) -> Result<(), LedgerError> {
        *self = Self::new();
        self.observe_all(visible)
    }

    pub fn count_of(&self, card: Card) -> u32 {
        u32::from(*self.slot(card))
    }

    /// All unseen cards printed in `color`, wilds excluded.
    pub fn color_count(&self, color: Color) -> u32 {
        self.colors[color.index()]
            .iter()
            .map(|count| u32::from(*count))
            .sum()
    }

    /// Unseen numerals in `color`.
    pub fn numeral_count(&self, color: Color) -> u32 {
        self.colors[color.index()][..=Rank::Nine.value() as usize]
            .iter()
            .map(|count| u32::from(*count))
            .sum()
    }

    /// Unseen numerals of `rank` across all colors.
    pub fn rank_count(&self, rank: Rank) -> u32 {
        Color::ALL
            .into_iter()
            .map(|color| self.count_of(Card::numeral(color, rank)))
            .sum()
    }

    /// Unseen action cards of `kind` across all colors.
    pub fn action_count(&self, kind: ActionKind) -> u32 {
        Color::ALL
            .into_iter()
            .map(|color| self.count_of(Card::action(color, kind)))
            .sum()
    }

    pub fn wild_count(&self, kind: WildKind) -> u32 {
        u32::from(self.wilds[kind.index()])
    }

    /// Unseen cards an opponent could legally answer `color` with: every
    /// card of that color plus the wilds. Wild draw four is excluded since
    /// holding one does not stop a player from claiming they cannot match.
    pub fn answer_count(&self, color: Color) -> u32 {
        self.color_count(color)
            + self.wild_count(WildKind::Wild)
            + self.wild_count(WildKind::WildShuffle)
            + self.wild_count(WildKind::WhiteWild)
    }

    pub fn total(&self) -> u32 {
        let colored: u32 = Color::ALL
            .into_iter()
            .map(|color| self.color_count(color))
            .sum();
        let wilds: u32 = self.wilds.iter().map(|count| u32::from(*count)).sum();
        colored + wilds
    }

    /// Iterates every distinct card with at least one unseen copy, in
    /// color-then-slot order.
    pub fn unseen_cards(&self) -> impl Iterator<Item = (Card, u32)> + '_ {
        let colored = Color::ALL.into_iter().flat_map(move |color| {
            let numerals = Rank::ORDERED
                .into_iter()
                .map(move |rank| Card::numeral(color, rank));
            let actions = ActionKind::ALL
                .into_iter()
                .map(move |kind| Card::action(color, kind));
            numerals.chain(actions)
        });
        let wilds = WildKind::ALL.into_iter().map(Card::Wild);
        colored
            .chain(wilds)
            .map(|card| (card, self.count_of(card)))
            .filter(|(_, count)| *count > 0)
    }
}

const fn action_slot(kind: ActionKind) -> usize {
    match kind {
        ActionKind::DrawTwo => SLOT_DRAW_TWO,
        ActionKind::Skip => SLOT_SKIP,
        ActionKind::Reverse => SLOT_REVERSE,
    }
}
