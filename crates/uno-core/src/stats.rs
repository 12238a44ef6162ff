//! Cross-round opponent statistics.
//!
//! Lives longer than any [`crate::state::RoundState`]: the match owner keeps
//! one `MatchStats` and feeds it the same event stream, so challenge
//! tendencies accumulate across rounds.

use crate::event::GameEvent;
use crate::model::PlayerId;
use std::collections::HashMap;

/// Challenge bookkeeping against a single opponent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChallengeLedger {
    /// Draw-four challenges we raised against them.
    pub challenges_made: u32,
    pub challenges_won: u32,
    /// Draw-fours we played while they were next to act.
    pub draw_fours_played: u32,
    /// How many of those they challenged.
    pub challenges_faced: u32,
    /// How many of their challenges stuck.
    pub challenges_lost: u32,
}

impl ChallengeLedger {
    /// Our hit rate when challenging them.
    pub fn success_rate(&self) -> Option<f64> {
        ratio(self.challenges_won, self.challenges_made)
    }

    /// How often they challenge our draw-fours.
    pub fn challenge_rate(&self) -> Option<f64> {
        ratio(self.challenges_faced, self.draw_fours_played)
    }

    /// How often their challenges succeed.
    pub fn counter_success_rate(&self) -> Option<f64> {
        ratio(self.challenges_lost, self.challenges_faced)
    }
}

fn ratio(numerator: u32, denominator: u32) -> Option<f64> {
    (denominator > 0).then(|| f64::from(numerator) / f64::from(denominator))
}

#[derive(Debug, Clone, Default)]
pub struct MatchStats {
    rounds: u32,
    by_opponent: HashMap<PlayerId, ChallengeLedger>,
}

impl MatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn ledger_for(&self, opponent: &PlayerId) -> ChallengeLedger {
        self.by_opponent.get(opponent).copied().unwrap_or_default()
    }

    /// Folds one event into the stats. `next_player` identifies who acts
    /// after us in the current direction; it attributes draw-fours we play
    /// to the opponent positioned to challenge them.
    pub fn record_event(
        &mut self,
        event: &GameEvent,
        self_id: &PlayerId,
        next_player: Option<&PlayerId>,
    ) {
        match event {
            GameEvent::ChallengeResult {
                challenger,
                target,
                did_challenge: true,
                succeeded,
            } => {
                if challenger == self_id {
                    let ledger = self.by_opponent.entry(target.clone()).or_default();
                    ledger.challenges_made += 1;
                    if *succeeded {
                        ledger.challenges_won += 1;
                    }
                } else if target == self_id {
                    let ledger = self.by_opponent.entry(challenger.clone()).or_default();
                    ledger.challenges_faced += 1;
                    if *succeeded {
                        ledger.challenges_lost += 1;
                    }
                }
            }
            GameEvent::CardPlayed { player, card, .. }
            | GameEvent::DrawnCardPlayed {
                player,
                card: Some(card),
                is_played: true,
                ..
            } => {
                if player == self_id && card.is_draw_four() {
                    if let Some(next) = next_player {
                        self.by_opponent
                            .entry(next.clone())
                            .or_default()
                            .draw_fours_played += 1;
                    }
                }
            }
            GameEvent::RoundFinished { .. } => self.rounds += 1,
            _ => {}
        }
    }
}
