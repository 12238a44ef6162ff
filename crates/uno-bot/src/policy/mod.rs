//! Ranking policies: given the legal plays and the current mode, produce
//! the order in which the engine should try to play them.

mod standard;

pub use standard::StandardPolicy;

use crate::engine::PlayMode;
use thiserror::Error;
use uno_core::model::Card;
use uno_core::state::RoundState;
use uno_core::stats::MatchStats;

/// Read-only view of everything a policy may consult.
pub struct PolicyContext<'a> {
    pub state: &'a RoundState,
    pub stats: &'a MatchStats,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankingFault {
    /// The mode needs seat information that the round has not provided.
    #[error("seat tracking unavailable for ranking")]
    MissingSeatContext,
}

/// Strategy seam. The engine falls back to plain filter order when a
/// policy faults, so implementations may fail instead of guessing.
pub trait RankPolicy {
    fn rank_legal_plays(
        &self,
        ctx: &PolicyContext<'_>,
        mode: PlayMode,
        legal: &[Card],
    ) -> Result<Vec<Card>, RankingFault>;
}

/// Which ranking policy the engine runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrategyConfig {
    #[default]
    Standard,
}

impl StrategyConfig {
    pub fn build(self) -> Box<dyn RankPolicy> {
        match self {
            StrategyConfig::Standard => Box::new(StandardPolicy),
        }
    }
}
