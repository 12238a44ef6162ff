//! Per-turn decision engine.
//!
//! Stateless over the round: every decision reads a [`PolicyContext`]
//! snapshot and returns one outbound action. The engine classifies the
//! table into a play mode, asks the configured ranking policy for an
//! ordered list, then applies the draw-four commitment gate on top.

mod challenge;
mod color;
mod filter;

pub use challenge::{should_challenge, should_play_draw_four};
pub use color::choose_color;
pub use filter::legal_plays;

use crate::policy::{PolicyContext, RankPolicy, StrategyConfig};
use tracing::{Level, event};
use uno_core::event::{AgentAction, DrawReason};
use uno_core::model::{Card, WildKind};
use uno_core::prob::ChallengeThresholds;

/// Hand-size cut-offs for mode classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeThresholds {
    /// Below this many cards (ours or an opponent's) the endgame logic
    /// kicks in.
    pub tight_hand: usize,
    /// An opponent at or below this is treated as about to go out.
    pub danger_count: usize,
    /// Trailing the shortest hand by at least this much forces defense.
    pub defensive_gap: usize,
    /// With roomy hands all around, defense starts at this multiple of
    /// the shortest hand.
    pub defensive_ratio: usize,
    /// Holding the shuffle wild with a hand this big dumps it outright.
    pub shuffle_dump_threshold: usize,
    /// Hand size at which a play is accompanied by the uno call.
    pub uno_hand_size: usize,
}

impl Default for ModeThresholds {
    fn default() -> Self {
        Self {
            tight_hand: 5,
            danger_count: 2,
            defensive_gap: 4,
            defensive_ratio: 2,
            shuffle_dump_threshold: 7,
            uno_hand_size: 2,
        }
    }
}

/// How the table looks from our seat this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// That many opponents sit on a declared uno.
    Uno(usize),
    Offensive,
    Defensive,
    /// No legal play; the turn resolves by drawing.
    Fallback,
}

/// One resolved turn: the action to send and the mode that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnDecision {
    pub action: AgentAction,
    pub mode: PlayMode,
}

pub struct DecisionEngine {
    modes: ModeThresholds,
    thresholds: ChallengeThresholds,
    policy: Box<dyn RankPolicy>,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(StrategyConfig::default())
    }
}

impl DecisionEngine {
    pub fn new(strategy: StrategyConfig) -> Self {
        Self {
            modes: ModeThresholds::default(),
            thresholds: ChallengeThresholds::default(),
            policy: strategy.build(),
        }
    }

    pub fn with_thresholds(
        strategy: StrategyConfig,
        modes: ModeThresholds,
        thresholds: ChallengeThresholds,
    ) -> Self {
        Self {
            modes,
            thresholds,
            policy: strategy.build(),
        }
    }

    /// Classifies the table. Uno opponents dominate everything; otherwise
    /// the relation between our hand and the shortest opponent hand picks
    /// the side.
    pub fn classify_mode(&self, ctx: &PolicyContext<'_>) -> PlayMode {
        let state = ctx.state;
        let Some(tracker) = state.tracker() else {
            return PlayMode::Offensive;
        };
        let uno_count = tracker.uno_players().len();
        if uno_count > 0 {
            return PlayMode::Uno(uno_count);
        }

        let own = state.hand().len();
        let min_opp = tracker
            .opponents()
            .map(|player| usize::from(state.hand_count_of(player)))
            .min()
            .unwrap_or(usize::MAX);

        if min_opp < self.modes.tight_hand || own < self.modes.tight_hand {
            if own > min_opp {
                if min_opp <= self.modes.danger_count
                    || own - min_opp >= self.modes.defensive_gap
                {
                    PlayMode::Defensive
                } else {
                    PlayMode::Offensive
                }
            } else {
                PlayMode::Offensive
            }
        } else if own >= min_opp * self.modes.defensive_ratio {
            PlayMode::Defensive
        } else {
            PlayMode::Offensive
        }
    }

    /// Resolves our whole turn into one action.
    pub fn decide_turn(&self, ctx: &PolicyContext<'_>) -> TurnDecision {
        let state = ctx.state;
        let mode = self.classify_mode(ctx);

        if let Some(prompt) = state.turn_prompt() {
            if prompt.draw_reason == DrawReason::WildDraw4 {
                if should_challenge(ctx, &self.thresholds) {
                    return TurnDecision {
                        action: AgentAction::Challenge { do_challenge: true },
                        mode,
                    };
                }
                return self.draw(mode);
            }
            if prompt.must_draw {
                return self.draw(mode);
            }
        }

        let hand = state.hand();
        let shuffle = Card::Wild(WildKind::WildShuffle);
        if hand.len() >= self.modes.shuffle_dump_threshold && hand.contains(shuffle) {
            return self.play(ctx, mode, shuffle, "shuffle dump");
        }

        let Some(top) = state.discard_top() else {
            return self.draw(mode);
        };
        let legal = legal_plays(hand, top);
        if legal.is_empty() {
            return self.draw(PlayMode::Fallback);
        }

        let ranked = match self.policy.rank_legal_plays(ctx, mode, &legal) {
            Ok(ranked) => ranked,
            Err(fault) => {
                tracing::warn!(target: "uno_bot::play", %fault, "ranking fell back to filter order");
                legal.clone()
            }
        };
        if ranked.is_empty() {
            // The policy held its cards back; drawing is cheaper.
            return self.draw(mode);
        }

        let mut chosen = ranked[0];
        if chosen.is_draw_four() && !should_play_draw_four(ctx, &self.thresholds, &legal) {
            match ranked.iter().find(|card| !card.is_draw_four()) {
                Some(&fallback) => chosen = fallback,
                None => return self.draw(mode),
            }
        }

        self.play(ctx, mode, chosen, "ranked")
    }

    /// Whether to play the card we just drew. Attacking keeps a drawn
    /// shuffle wild in hand (the draw already ended our tempo); defense
    /// never reveals the drawn card.
    pub fn decide_drawn_card(
        &self,
        ctx: &PolicyContext<'_>,
        mode: PlayMode,
        drawn: Card,
        can_play: bool,
    ) -> AgentAction {
        let play = can_play
            && match mode {
                PlayMode::Offensive => drawn != Card::Wild(WildKind::WildShuffle),
                PlayMode::Defensive => false,
                PlayMode::Uno(_) | PlayMode::Fallback => true,
            };
        if !play {
            return AgentAction::PlayDrawnCard {
                is_play: false,
                uno_declared: false,
                color_choice: None,
            };
        }
        let uno_declared = ctx.state.hand().len() == self.modes.uno_hand_size;
        let color_choice = matches!(
            drawn,
            Card::Wild(WildKind::Wild) | Card::Wild(WildKind::WildDrawFour)
        )
        .then(|| choose_color(ctx, mode));
        AgentAction::PlayDrawnCard {
            is_play: true,
            uno_declared,
            color_choice,
        }
    }

    /// Color we would request when prompted after a wild.
    pub fn decide_color(&self, ctx: &PolicyContext<'_>) -> AgentAction {
        let mode = self.classify_mode(ctx);
        AgentAction::RequestColor {
            color: choose_color(ctx, mode),
        }
    }

    /// Points out the first opponent who forgot to call uno, if any.
    pub fn decide_missed_uno(&self, ctx: &PolicyContext<'_>) -> Option<AgentAction> {
        ctx.state
            .undeclared_uno_opponent()
            .map(|target| AgentAction::PointOutMissedUno {
                target: target.clone(),
            })
    }

    fn draw(&self, mode: PlayMode) -> TurnDecision {
        TurnDecision {
            action: AgentAction::DrawCard,
            mode,
        }
    }

    fn play(
        &self,
        ctx: &PolicyContext<'_>,
        mode: PlayMode,
        card: Card,
        reason: &str,
    ) -> TurnDecision {
        let uno_declared = ctx.state.hand().len() == self.modes.uno_hand_size;
        let color_choice = matches!(
            card,
            Card::Wild(WildKind::Wild) | Card::Wild(WildKind::WildDrawFour)
        )
        .then(|| choose_color(ctx, mode));
        log_play_decision(ctx, mode, card, reason);
        TurnDecision {
            action: AgentAction::PlayCard {
                card,
                uno_declared,
                color_choice,
            },
            mode,
        }
    }
}

fn log_play_decision(ctx: &PolicyContext<'_>, mode: PlayMode, chosen: Card, reason: &str) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    event!(
        target: "uno_bot::play",
        Level::INFO,
        mode = ?mode,
        chosen = %chosen,
        hand_size = ctx.state.hand().len(),
        unseen = ctx.state.ledger().total(),
        deck = ctx.state.deck_remaining(),
        reason,
    );
}
