//! The error taxonomy shared by every rating function in this crate.
//!
//! Every public rating function returns a [`RatingResult`]. There are no
//! retries and no silent coercions: a call either succeeds and returns a
//! freshly constructed list of posteriors, or it fails with one of the
//! variants below. Empty interactions are *not* an error anywhere in this
//! crate; priors are returned unchanged in that case.

use thiserror::Error;

/// The result type returned by every public rating function.
pub type RatingResult<T> = Result<T, RatingError>;

/// Everything that can go wrong when rating a population.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RatingError {
    /// `len(ratings) != len(players)`, or an interaction's `players` and
    /// `outcomes` vectors differ in length.
    #[error("arity mismatch: expected {expected}, got {got} ({context})")]
    ArityMismatch {
        /// The length that was expected.
        expected: usize,
        /// The length that was actually found.
        got: usize,
        /// Human-readable description of what was being compared.
        context: &'static str,
    },

    /// An interaction refers to a player identifier that isn't present in
    /// the `players` list passed to the rating function.
    #[error("player {player:?} appears in an interaction but not in the player list")]
    UnknownPlayer {
        /// The offending identifier.
        player: String,
    },

    /// An outcome fell outside the domain the algorithm accepts (for
    /// example Elo without `wdl` seeing a value other than 0, 0.5 or 1).
    #[error("malformed outcome in {algorithm}: {detail}")]
    MalformedOutcome {
        /// The algorithm that rejected the outcome.
        algorithm: &'static str,
        /// What was wrong with it.
        detail: String,
    },

    /// A rating specialization mismatch: either the wrong variant was
    /// passed to an algorithm that needs a more specific one (`Rate` where
    /// `EloRate` was required), or ratings in the same call disagree on a
    /// shared parameter (`base`, `spread`, `k`).
    #[error("incompatible rate: {0}")]
    IncompatibleRate(String),

    /// An iterative solver (BayesElo's Minorization-Maximization loop,
    /// TrueSkill's expectation-propagation loop) did not reach its
    /// tolerance within the iteration budget. Only returned when the
    /// caller opted into strict convergence checking; otherwise the last
    /// iterate is returned and a warning is logged.
    #[error("{algorithm} failed to converge after {iterations} iterations (last delta {last_delta:e}, tolerance {tolerance:e})")]
    NonConvergent {
        /// The algorithm that failed to converge.
        algorithm: &'static str,
        /// How many iterations were run.
        iterations: usize,
        /// The magnitude of change observed on the final iteration.
        last_delta: f64,
        /// The tolerance that was not reached.
        tolerance: f64,
    },

    /// A TrueSkill truncation factor produced an out-of-range weight
    /// (`w_win`/`w_draw` outside `(0, 1)`), which signals that the inputs
    /// drove the Gaussian approximation out of its valid domain.
    #[error("numeric failure in {algorithm}: {detail}")]
    NumericFailure {
        /// The algorithm where the failure occurred.
        algorithm: &'static str,
        /// A description of the offending quantity.
        detail: String,
    },
}
