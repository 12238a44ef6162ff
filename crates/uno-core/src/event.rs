//! Boundary event and action types.
//!
//! The transport layer hands the core one `GameEvent` at a time, in game
//! order, and carries one `AgentAction` back. Wire payloads are JSON; a
//! payload that does not fit any event shape is an [`EventShapeError`] and
//! gets dropped, never a crash.

use crate::model::{Card, Color, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventShapeError {
    #[error("malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Why the current player must draw at the start of their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    #[serde(rename = "draw_2")]
    Draw2,
    #[serde(rename = "wild_draw_4")]
    WildDraw4,
    /// The previous player's white wild binds a single deferred draw.
    #[serde(rename = "bind_2")]
    Bind2,
    #[serde(rename = "skip_bind_2")]
    SkipBind2,
    #[default]
    Nothing,
}

/// Everything the dealer can tell us.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    CardsReceived {
        cards: Vec<Card>,
    },
    RoundStarted {
        seating_order: Vec<PlayerId>,
        first_card: Card,
        first_player: PlayerId,
    },
    ColorRequested,
    ColorUpdated {
        color: Color,
        #[serde(default)]
        player: Option<PlayerId>,
    },
    ShuffleOccurred {
        hand_sizes: HashMap<PlayerId, u8>,
        new_hand: Vec<Card>,
    },
    TurnStarted {
        hand_sizes: HashMap<PlayerId, u8>,
        my_hand: Vec<Card>,
        discard_top: Card,
        #[serde(default)]
        draw_reason: DrawReason,
        #[serde(default)]
        must_draw: bool,
    },
    CardPlayed {
        player: PlayerId,
        card: Card,
        #[serde(default)]
        declared_uno: bool,
    },
    CardDrawn {
        player: PlayerId,
    },
    DrawnCardPlayed {
        player: PlayerId,
        #[serde(default)]
        card: Option<Card>,
        is_played: bool,
        #[serde(default)]
        declared_uno: bool,
    },
    ChallengeResult {
        challenger: PlayerId,
        target: PlayerId,
        did_challenge: bool,
        succeeded: bool,
    },
    HandRevealed {
        player: PlayerId,
        cards: Vec<Card>,
    },
    MissedUnoPointed {
        target: PlayerId,
    },
    PenaltyApplied {
        player: PlayerId,
        draw_count: u8,
    },
    RoundFinished {
        #[serde(default)]
        scores: HashMap<PlayerId, i64>,
    },
    MatchFinished,
}

/// Everything the agent can tell the dealer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentAction {
    PlayCard {
        card: Card,
        uno_declared: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color_choice: Option<Color>,
    },
    DrawCard,
    PlayDrawnCard {
        is_play: bool,
        uno_declared: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color_choice: Option<Color>,
    },
    Challenge {
        do_challenge: bool,
    },
    RequestColor {
        color: Color,
    },
    PointOutMissedUno {
        target: PlayerId,
    },
}

/// Parses a raw JSON payload into an event.
pub fn parse_event(payload: &str) -> Result<GameEvent, EventShapeError> {
    Ok(serde_json::from_str(payload)?)
}
