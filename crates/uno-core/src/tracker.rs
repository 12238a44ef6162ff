//! Seat tracking for the three opponents relative to us.

use crate::model::{PlayerId, RelativePosition};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("seating order must contain exactly 4 players, got {0}")]
    WrongSeatCount(usize),
    #[error("own id {0} missing from the seating order")]
    SelfNotSeated(PlayerId),
}

#[derive(Debug, Clone)]
struct Seat {
    player: PlayerId,
    uno: bool,
}

/// Maps each opponent to a relative position that follows the current play
/// direction. Seats are stored in dealt order starting one step after us, so
/// a direction reversal only flips how indexes are read.
#[derive(Debug, Clone)]
pub struct TurnTracker {
    seats: [Seat; 3],
    reversed: bool,
}

impl TurnTracker {
    /// Builds the tracker from the dealt seating order.
    pub fn initialize(seating_order: &[PlayerId], self_id: &PlayerId) -> Result<Self, TrackerError> {
        if seating_order.len() != 4 {
            return Err(TrackerError::WrongSeatCount(seating_order.len()));
        }
        let self_at = seating_order
            .iter()
            .position(|player| player == self_id)
            .ok_or_else(|| TrackerError::SelfNotSeated(self_id.clone()))?;
        let seat = |steps: usize| Seat {
            player: seating_order[(self_at + steps) % 4].clone(),
            uno: false,
        };
        Ok(Self {
            seats: [seat(1), seat(2), seat(3)],
            reversed: false,
        })
    }

    /// Flips the play direction. Next and Previous swap; Across stays.
    pub fn reverse(&mut self) {
        self.reversed = !self.reversed;
    }

    pub const fn is_reversed(&self) -> bool {
        self.reversed
    }

    fn seat_index(&self, position: RelativePosition) -> usize {
        let position = if self.reversed {
            position.flipped()
        } else {
            position
        };
        match position {
            RelativePosition::Next => 0,
            RelativePosition::Across => 1,
            RelativePosition::Previous => 2,
        }
    }

    pub fn player_at(&self, position: RelativePosition) -> &PlayerId {
        &self.seats[self.seat_index(position)].player
    }

    pub fn position_of(&self, player: &PlayerId) -> Option<RelativePosition> {
        RelativePosition::ALL
            .into_iter()
            .find(|&position| self.player_at(position) == player)
    }

    pub fn opponents(&self) -> impl Iterator<Item = &PlayerId> {
        self.seats.iter().map(|seat| &seat.player)
    }

    pub fn mark_uno(&mut self, player: &PlayerId) {
        if let Some(seat) = self.seats.iter_mut().find(|seat| &seat.player == player) {
            seat.uno = true;
        }
    }

    pub fn clear_uno(&mut self, player: &PlayerId) {
        if let Some(seat) = self.seats.iter_mut().find(|seat| &seat.player == player) {
            seat.uno = false;
        }
    }

    pub fn uno_declared(&self, player: &PlayerId) -> bool {
        self.seats
            .iter()
            .any(|seat| &seat.player == player && seat.uno)
    }

    /// Rederives every uno flag from a hand-size broadcast: exactly one card
    /// sets the flag, anything else clears it. Players absent from the
    /// broadcast keep their current flag.
    pub fn sync_uno_flags(&mut self, hand_sizes: &HashMap<PlayerId, u8>) {
        for seat in &mut self.seats {
            if let Some(count) = hand_sizes.get(&seat.player) {
                seat.uno = *count == 1;
            }
        }
    }

    /// Opponents currently on uno, with their positions in the current
    /// direction.
    pub fn uno_players(&self) -> Vec<(&PlayerId, RelativePosition)> {
        RelativePosition::ALL
            .into_iter()
            .filter_map(|position| {
                let seat = &self.seats[self.seat_index(position)];
                seat.uno.then_some((&seat.player, position))
            })
            .collect()
    }
}
