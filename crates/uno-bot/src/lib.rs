#![deny(warnings)]
pub mod engine;
pub mod policy;

pub use engine::{DecisionEngine, ModeThresholds, PlayMode, TurnDecision};
pub use policy::{PolicyContext, RankPolicy, RankingFault, StandardPolicy, StrategyConfig};
