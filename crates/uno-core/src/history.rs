//! Append-only per-opponent play history.

use crate::model::{Card, Color, PlayerId};
use std::collections::HashMap;

/// Why a color entered an opponent's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorReason {
    /// They chose this color after playing a wild.
    DeclaredAfterWild,
    /// They drew with this color on top, so they provably lacked it then.
    CouldNotMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRecord {
    pub card: Card,
    pub hand_size_after: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorNote {
    pub color: Color,
    pub reason: ColorReason,
}

#[derive(Debug, Clone, Default)]
struct PlayerLog {
    plays: Vec<PlayRecord>,
    colors: Vec<ColorNote>,
}

/// What each opponent has done this round. Only the reducer appends.
#[derive(Debug, Clone, Default)]
pub struct OpponentHistory {
    logs: HashMap<PlayerId, PlayerLog>,
}

impl OpponentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_play(&mut self, player: &PlayerId, card: Card, hand_size_after: u8) {
        self.logs
            .entry(player.clone())
            .or_default()
            .plays
            .push(PlayRecord {
                card,
                hand_size_after,
            });
    }

    pub fn record_color(&mut self, player: &PlayerId, color: Color, reason: ColorReason) {
        self.logs
            .entry(player.clone())
            .or_default()
            .colors
            .push(ColorNote { color, reason });
    }

    /// The color this player most recently failed to match, if any.
    pub fn last_unmatched_color(&self, player: &PlayerId) -> Option<Color> {
        self.last_color_with(player, ColorReason::CouldNotMatch)
    }

    /// The color this player most recently declared after a wild.
    pub fn last_declared_color(&self, player: &PlayerId) -> Option<Color> {
        self.last_color_with(player, ColorReason::DeclaredAfterWild)
    }

    fn last_color_with(&self, player: &PlayerId, reason: ColorReason) -> Option<Color> {
        self.logs.get(player).and_then(|log| {
            log.colors
                .iter()
                .rev()
                .find(|note| note.reason == reason)
                .map(|note| note.color)
        })
    }

    /// The most recent `n` plays, newest last.
    pub fn recent_plays(&self, player: &PlayerId, n: usize) -> &[PlayRecord] {
        match self.logs.get(player) {
            Some(log) => {
                let start = log.plays.len().saturating_sub(n);
                &log.plays[start..]
            }
            None => &[],
        }
    }

    pub fn play_count(&self, player: &PlayerId) -> usize {
        self.logs.get(player).map_or(0, |log| log.plays.len())
    }
}
