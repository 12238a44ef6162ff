//! Hypergeometric probability for "does that hand hold at least one?".

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ProbabilityError {
    /// The query asks about more cards than the pool contains.
    #[error("impossible query: pool {pool}, matching {matching}, hand {hand}")]
    ImpossibleQuery { pool: u32, matching: u32, hand: u32 },
    /// Accounting drift produced a value outside [0, 1].
    #[error("probability {value} out of range")]
    OutOfRange { value: f64 },
}

/// `C(n, k)` by the multiplicative formula. Every intermediate division is
/// exact because the running product after `i` steps is divisible by `i!`.
/// The deck tops out at 112 cards, so `C(112, 56)` (about 1e33) fits u128
/// with room for the next multiplication.
fn binomial(n: u32, k: u32) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..u128::from(k) {
        result = result * (u128::from(n) - i) / (i + 1);
    }
    result
}

/// Probability that a hand of `hand` cards drawn uniformly from a pool of
/// `pool` unseen cards contains at least one of the `matching` cards:
/// `1 - C(pool - matching, hand) / C(pool, hand)`.
///
/// Disjoint match categories must be summed into one `matching` count before
/// the call.
pub fn probability_holds_any(
    pool: u32,
    matching: u32,
    hand: u32,
) -> Result<f64, ProbabilityError> {
    if matching > pool || hand > pool {
        return Err(ProbabilityError::ImpossibleQuery {
            pool,
            matching,
            hand,
        });
    }
    let all = binomial(pool, hand);
    let none = binomial(pool - matching, hand);
    // `all` is nonzero whenever hand <= pool.
    let value = 1.0 - (none as f64) / (all as f64);
    if !(0.0..=1.0).contains(&value) {
        return Err(ProbabilityError::OutOfRange { value });
    }
    Ok(value)
}

/// Tuned cut-offs for challenge and draw-four commitment decisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChallengeThresholds {
    /// Hand sizes at or above this use the lenient probability bar.
    pub large_hand: u32,
    pub large_hand_probability: f64,
    pub small_hand_probability: f64,
    /// History gating only applies once this many rounds are on record.
    pub min_rounds: u32,
    /// Past success rate at or below this vetoes challenging that opponent.
    pub min_success_rate: f64,
    /// An opponent challenging at least this share of draw-fours vetoes
    /// playing one into them.
    pub challenge_rate_veto: f64,
    /// An opponent challenging at most this share lets a draw-four through
    /// without computing the probability.
    pub challenge_rate_free_pass: f64,
    /// Their challenges succeeding at least this often vetoes the draw-four.
    pub counter_success_veto: f64,
}

impl Default for ChallengeThresholds {
    fn default() -> Self {
        Self {
            large_hand: 6,
            large_hand_probability: 0.5,
            small_hand_probability: 0.8,
            min_rounds: 200,
            min_success_rate: 0.3,
            challenge_rate_veto: 0.9,
            challenge_rate_free_pass: 0.05,
            counter_success_veto: 0.8,
        }
    }
}

impl ChallengeThresholds {
    /// The probability bar for a hand of the given size.
    pub fn bar_for_hand(&self, hand: u32) -> f64 {
        if hand >= self.large_hand {
            self.large_hand_probability
        } else {
            self.small_hand_probability
        }
    }
}
