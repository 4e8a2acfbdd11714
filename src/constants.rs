//! Named default hyperparameters for every algorithm, collected in one
//! place so the `*Config::default()` impls all point here and a reader
//! can compare defaults across algorithms at a glance.

// ---- Elo ----------------------------------------------------------------

/// Default K-factor: how much a single game can move a rating.
pub const ELO_K: f64 = 20.0;
/// Default logarithmic base of the Elo scale.
pub const ELO_BASE: f64 = 10.0;
/// Default spread: rating-point difference corresponding to one order of
/// magnitude of odds under `ELO_BASE`.
pub const ELO_SPREAD: f64 = 400.0;
/// Default starting rating for a player with no prior.
pub const ELO_DEFAULT_RATING: f64 = 1500.0;

// ---- BayesElo -------------------------------------------------------------

/// Default Elo-scale advantage granted to the first-listed player in an
/// interaction (home field advantage).
pub const BAYESELO_ELO_ADVANTAGE: f64 = 32.8;
/// Default Elo-scale draw spread.
pub const BAYESELO_ELO_DRAW: f64 = 97.3;
/// Default Minorization-Maximization iteration budget.
pub const BAYESELO_ITERATIONS: usize = 10_000;
/// Default Minorization-Maximization convergence tolerance.
pub const BAYESELO_TOLERANCE: f64 = 1e-5;
/// Default Dirichlet-style prior pseudo-count added to every pairwise
/// win/loss/draw tally before the MM solver runs, keeping the system
/// well-posed for players who haven't played each other yet.
pub const BAYESELO_DRAW_PRIOR: f64 = 2.0;

// ---- Glicko / Glicko-2 ----------------------------------------------------

/// Default starting rating on the original (non-internal) Glicko scale.
pub const GLICKO_DEFAULT_RATING: f64 = 1500.0;
/// Default starting rating deviation on the original Glicko scale.
pub const GLICKO_DEFAULT_DEVIATION: f64 = 350.0;
/// Rating deviation a player's uncertainty saturates at after long
/// periods of inactivity.
pub const GLICKO_MAX_DEVIATION: f64 = 350.0;
/// Per-period increase applied to a player's deviation before a rating
/// period is processed, modelling growing uncertainty over time.
pub const GLICKO_UNCERTAINTY_INCREASE: f64 = 34.6;

/// Conversion ratio between the public Glicko scale and the internal
/// Glicko-2 scale ("Step 2." / "Step 8." of Glickman's paper).
pub const GLICKO2_RATING_SCALING_RATIO: f64 = 173.7178;
/// Default starting volatility on the internal Glicko-2 scale.
pub const GLICKO2_DEFAULT_VOLATILITY: f64 = 0.06;
/// Default system constant ("tau"), constraining how much volatility can
/// change over time. Reasonable values lie between 0.3 and 1.2.
pub const GLICKO2_VOLATILITY_CHANGE: f64 = 0.5;
/// Default convergence tolerance for the Illinois algorithm used to
/// solve for the new volatility ("Step 5.1.").
pub const GLICKO2_CONVERGENCE_TOLERANCE: f64 = 1e-6;
/// Fail-safe maximum number of iterations for the Illinois solver.
pub const GLICKO2_MAX_ITERATIONS: u32 = 10_000;
/// Anchor rating the internal Glicko-2 scale is centered on when
/// converting back to the public scale.
pub const GLICKO2_ANCHOR_MU: f64 = 1500.0;

// ---- TrueSkill ------------------------------------------------------------

/// Default prior mean skill.
pub const TRUESKILL_MU: f64 = 25.0;
/// Default prior skill standard deviation, conventionally `MU / 3`.
pub const TRUESKILL_SIGMA: f64 = TRUESKILL_MU / 3.0;
/// Default performance variance scale ("beta"), conventionally `SIGMA / 2`.
pub const TRUESKILL_BETA: f64 = TRUESKILL_SIGMA / 2.0;
/// Default per-game additive variance ("dynamic factor" / "tau"),
/// modelling skill drift between games.
pub const TRUESKILL_TAU: f64 = TRUESKILL_SIGMA / 100.0;
/// Default probability of a draw.
pub const TRUESKILL_DRAW_PROBABILITY: f64 = 0.1;
/// Default expectation-propagation iteration budget for graphs with more
/// than two teams.
pub const TRUESKILL_MAX_ITERATIONS: usize = 10;
/// Default expectation-propagation convergence tolerance.
pub const TRUESKILL_TOLERANCE: f64 = 1e-4;

// ---- multidimensional Elo (mElo) -------------------------------------------

/// Default learning rate for the scalar Elo-like rating component.
pub const MELO_LEARNING_RATE_1: f64 = 16.0;
/// Default learning rate for the cyclic (non-transitive) rating
/// dimensions.
pub const MELO_LEARNING_RATE_2: f64 = 1.0;
/// Default number of passes over the interaction history per call.
pub const MELO_ITERATIONS: usize = 100;
/// Default total number of cyclic rating dimensions (`2k` for mElo order
/// `k = 1`).
pub const MELO_K_DIMENSIONS: usize = 2;

// ---- Nash average -----------------------------------------------------------

/// Default number of fictitious-play iterations run by the default
/// [`NashSolver`](crate::nash::solver::NashSolver) implementation.
pub const NASH_FICTITIOUS_PLAY_ITERATIONS: usize = 10_000;

// ---- Laplacian rating -------------------------------------------------------

/// Default teleportation damping factor, matching networkx's
/// `directed_laplacian_matrix` default `alpha`. Keeps the implied random
/// walk irreducible even when some player has never lost a game.
pub const LAPLACIAN_DAMPING: f64 = 0.95;
