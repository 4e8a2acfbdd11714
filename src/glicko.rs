//! Glicko and Glicko-2 rating, both reduced over a batch of interactions
//! at once against each player's prior rating.
//!
//! Glicko-2 additionally tracks a volatility per player and solves for its
//! new value with the Illinois algorithm described as "Step 5." in
//! Glickman's paper, matching the root-finder shape used for the
//! time-scaled variant of this same idea elsewhere in this crate's
//! lineage.

use std::f64::consts::PI;

use log::warn;

use crate::constants;
use crate::error::RatingError;
use crate::interaction::{to_pairwise, Interaction};
use crate::rate::{Glicko2Rate, GlickoRate, Rate};

/// Configuration for [`glicko`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GlickoConfig {
    /// Growth in rating deviation applied per rating period of inactivity.
    pub uncertainty_increase: f64,
    /// Rating deviation ceiling for an unrated / long-inactive player.
    pub max_deviation: f64,
}

impl Default for GlickoConfig {
    fn default() -> Self {
        GlickoConfig {
            uncertainty_increase: constants::GLICKO_UNCERTAINTY_INCREASE,
            max_deviation: constants::GLICKO_MAX_DEVIATION,
        }
    }
}

/// Configuration for [`glicko2`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Glicko2Config {
    /// The system constant ("tau") constraining how much volatility can
    /// change between rating periods.
    pub volatility_change: f64,
    /// Convergence tolerance for the Illinois algorithm solving for the
    /// new volatility.
    pub convergence_tolerance: f64,
    /// Fail-safe maximum number of iterations for the Illinois solver.
    pub max_iterations: u32,
    /// If `true`, exceeding `max_iterations` without converging is a hard
    /// [`RatingError::NonConvergent`] instead of returning the last
    /// iterate with a logged warning.
    pub strict: bool,
}

impl Default for Glicko2Config {
    fn default() -> Self {
        Glicko2Config {
            volatility_change: constants::GLICKO2_VOLATILITY_CHANGE,
            convergence_tolerance: constants::GLICKO2_CONVERGENCE_TOLERANCE,
            max_iterations: constants::GLICKO2_MAX_ITERATIONS,
            strict: false,
        }
    }
}

fn reduce_impact(deviation: f64, q: f64) -> f64 {
    1.0 / f64::sqrt(1.0 + 3.0 * q * q * deviation * deviation / (PI * PI))
}

/// The Glicko `E(s)` function: the expected score for a player of rating
/// `player_mu` against an opponent of rating `opponent_mu`, with `g`
/// already reducing the opponent's rating deviation and `q = ln(base) /
/// spread` fixing the scale.
fn expected_outcome(g: f64, player_mu: f64, opponent_mu: f64, q: f64) -> f64 {
    1.0 / (1.0 + f64::exp(-g * q * (player_mu - opponent_mu)))
}

struct Improvement {
    mu_delta: f64,
    variance: f64,
    played: bool,
}

fn improvements_from_interactions(
    players: &[String],
    mus: &[f64],
    deviations: &[f64],
    interactions: &[Interaction],
    q: f64,
) -> Result<Vec<Improvement>, RatingError> {
    let mut mu_delta = vec![0.0; players.len()];
    let mut variance_acc = vec![0.0; players.len()];
    let mut played = vec![false; players.len()];

    for interaction in interactions {
        interaction.check_known_players(players)?;
        let i = players.iter().position(|p| p == &interaction.players()[0]).expect("checked");
        let j = players.iter().position(|p| p == &interaction.players()[1]).expect("checked");

        let g_j = reduce_impact(deviations[j], q);
        let e_ij = expected_outcome(g_j, mus[i], mus[j], q);
        mu_delta[i] += g_j * (interaction.outcomes()[0] - e_ij);
        variance_acc[i] += g_j * g_j * e_ij * (1.0 - e_ij);
        played[i] = true;

        let g_i = reduce_impact(deviations[i], q);
        let e_ji = expected_outcome(g_i, mus[j], mus[i], q);
        mu_delta[j] += g_i * (interaction.outcomes()[1] - e_ji);
        variance_acc[j] += g_i * g_i * e_ji * (1.0 - e_ji);
        played[j] = true;
    }

    Ok((0..players.len())
        .map(|idx| {
            let variance = if played[idx] && variance_acc[idx] > 0.0 {
                1.0 / (q * q * variance_acc[idx])
            } else {
                0.0
            };
            Improvement {
                mu_delta: mu_delta[idx],
                variance,
                played: played[idx] && variance_acc[idx] > 0.0,
            }
        })
        .collect())
}

/// Rates players by calculating their new Glicko rating after a single
/// rating period's worth of interactions.
///
/// Players that did not play in this period only have their rating
/// deviation grown by `config.uncertainty_increase`, capped at
/// `config.max_deviation`; pass their existing deviation already grown if
/// you are tracking periods of inactivity yourself.
///
/// # Errors
///
/// Returns [`RatingError::ArityMismatch`] if `players` and `ratings`
/// differ in length, or [`RatingError::UnknownPlayer`] if an interaction
/// names a player outside `players`.
pub fn glicko(
    players: &[String],
    interactions: &[Interaction],
    ratings: &[GlickoRate],
    config: GlickoConfig,
) -> Result<Vec<GlickoRate>, RatingError> {
    if players.len() != ratings.len() {
        return Err(RatingError::ArityMismatch {
            expected: players.len(),
            got: ratings.len(),
            context: "players and ratings",
        });
    }

    let pairwise = to_pairwise(interactions);

    let q = constants::ELO_BASE.ln() / constants::ELO_SPREAD;
    let mus: Vec<f64> = ratings.iter().map(Rate::mu).collect();
    let deviations: Vec<f64> = ratings
        .iter()
        .map(|r| f64::min(r.deviation(), config.max_deviation))
        .collect();

    let improvements = improvements_from_interactions(players, &mus, &deviations, &pairwise, q)?;

    Ok(ratings
        .iter()
        .zip(improvements)
        .map(|(rating, improvement)| {
            if !improvement.played {
                let grown = f64::min(
                    f64::sqrt(rating.deviation().powi(2) + config.uncertainty_increase.powi(2)),
                    config.max_deviation,
                );
                return GlickoRate::new(rating.mu(), grown);
            }

            let deviation = f64::min(rating.deviation(), config.max_deviation);
            let mut new_variance = 1.0 / (deviation * deviation);
            new_variance += 1.0 / improvement.variance;
            let new_mu = rating.mu() + q / new_variance * improvement.mu_delta;
            GlickoRate::new(new_mu, f64::sqrt(1.0 / new_variance))
        })
        .collect())
}

#[allow(clippy::too_many_arguments)]
fn illinois_volatility(
    current_volatility: f64,
    delta: f64,
    deviation: f64,
    variance: f64,
    tau: f64,
    tolerance: f64,
    max_iterations: u32,
    strict: bool,
) -> Result<f64, RatingError> {
    let deviation_sq = deviation * deviation;
    let delta_sq = delta * delta;

    let f = |x: f64| {
        let x_exp = f64::exp(x);
        let numerator = x_exp * (delta_sq - deviation_sq - variance - x_exp);
        let denominator = 2.0 * (deviation_sq + variance + x_exp).powi(2);
        numerator / denominator - (x - f64::ln(current_volatility * current_volatility)) / (tau * tau)
    };

    let mut a = f64::ln(current_volatility * current_volatility);
    let mut b = if delta_sq > deviation_sq + variance {
        f64::ln(delta_sq - deviation_sq - variance)
    } else {
        let mut k = 1.0;
        loop {
            let candidate = a - k * tau;
            if f(candidate) < 0.0 {
                k += 1.0;
            } else {
                break candidate;
            }
        }
    };

    let mut f_a = f(a);
    let mut f_b = f(b);

    let mut iteration = 0;
    while f64::abs(b - a) > tolerance {
        if iteration >= max_iterations {
            let message = format!(
                "glicko2: volatility solver did not converge after {max_iterations} iterations"
            );
            if strict {
                return Err(RatingError::NonConvergent {
                    algorithm: "glicko2",
                    iterations: max_iterations as usize,
                    last_delta: f64::abs(b - a),
                    tolerance,
                });
            }
            warn!("{message}");
            break;
        }

        let c = a + (a - b) * f_a / (f_b - f_a);
        let f_c = f(c);

        if f_c * f_b <= 0.0 {
            a = b;
            f_a = f_b;
        } else {
            f_a /= 2.0;
        }

        b = c;
        f_b = f_c;
        iteration += 1;
    }

    Ok(f64::exp(a / 2.0))
}

/// Rates players by calculating their new Glicko-2 rating after a single
/// rating period's worth of interactions.
///
/// # Errors
///
/// Returns [`RatingError::ArityMismatch`] if `players` and `ratings`
/// differ in length, [`RatingError::UnknownPlayer`] if an interaction
/// names a player outside `players`, and [`RatingError::NonConvergent`]
/// if `config.strict` is set and the volatility solver exhausts its
/// iteration budget for some player.
pub fn glicko2(
    players: &[String],
    interactions: &[Interaction],
    ratings: &[Glicko2Rate],
    config: Glicko2Config,
) -> Result<Vec<Glicko2Rate>, RatingError> {
    if players.len() != ratings.len() {
        return Err(RatingError::ArityMismatch {
            expected: players.len(),
            got: ratings.len(),
            context: "players and ratings",
        });
    }

    let pairwise = to_pairwise(interactions);

    // Internal scale: base e, spread 1, matching Glickman's "Step 2.".
    let q = 1.0;
    let mus: Vec<f64> = ratings.iter().map(Rate::mu).collect();
    let deviations: Vec<f64> = ratings.iter().map(Glicko2Rate::deviation).collect();

    let improvements = improvements_from_interactions(players, &mus, &deviations, &pairwise, q)?;

    ratings
        .iter()
        .zip(improvements)
        .map(|(rating, improvement)| {
            if !improvement.played {
                let new_deviation = f64::sqrt(rating.deviation().powi(2) + rating.volatility().powi(2));
                return Ok(Glicko2Rate::new(rating.mu(), new_deviation, rating.volatility()));
            }

            let delta = improvement.mu_delta * improvement.variance;
            let new_volatility = illinois_volatility(
                rating.volatility(),
                delta,
                rating.deviation(),
                improvement.variance,
                config.volatility_change,
                config.convergence_tolerance,
                config.max_iterations,
                config.strict,
            )?;

            let pre_deviation = f64::sqrt(rating.deviation().powi(2) + new_volatility.powi(2));
            let new_variance = 1.0 / (pre_deviation * pre_deviation) + 1.0 / improvement.variance;
            let new_deviation = 1.0 / f64::sqrt(new_variance);
            let new_mu = rating.mu() + new_deviation * new_deviation * improvement.mu_delta;

            Ok(Glicko2Rate::new(new_mu, new_deviation, new_volatility))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn players() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into(), "d".into()]
    }

    fn interactions() -> Vec<Interaction> {
        vec![
            Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["a".into(), "c".into()], vec![0.0, 1.0]),
            Interaction::new(vec!["a".into(), "d".into()], vec![0.0, 1.0]),
            Interaction::new(vec!["b".into(), "c".into()], vec![0.0, 1.0]),
            Interaction::new(vec!["b".into(), "d".into()], vec![0.0, 1.0]),
            Interaction::new(vec!["c".into(), "d".into()], vec![0.5, 0.5]),
        ]
    }

    #[test]
    fn glicko_matches_glickmans_paper_example() {
        let ratings = vec![
            GlickoRate::new(1500.0, 200.0),
            GlickoRate::new(1400.0, 30.0),
            GlickoRate::new(1550.0, 100.0),
            GlickoRate::new(1700.0, 300.0),
        ];

        let result = glicko(&players(), &interactions(), &ratings, GlickoConfig::default()).unwrap();

        let mus: Vec<f64> = result.iter().map(|r| (r.mu() * 1000.0).round() / 1000.0).collect();
        let devs: Vec<f64> = result.iter().map(|r| (r.deviation() * 1000.0).round() / 1000.0).collect();

        assert_eq!(mus, vec![1464.106, 1396.046, 1588.344, 1742.969]);
        assert_eq!(devs, vec![151.399, 29.800, 92.598, 194.514]);
    }

    #[test]
    fn glicko2_matches_glickmans_paper_example() {
        let ratings = vec![
            Glicko2Rate::from_glicko(GlickoRate::new(1500.0, 200.0), 0.06),
            Glicko2Rate::from_glicko(GlickoRate::new(1400.0, 30.0), 0.06),
            Glicko2Rate::from_glicko(GlickoRate::new(1550.0, 100.0), 0.06),
            Glicko2Rate::from_glicko(GlickoRate::new(1700.0, 300.0), 0.06),
        ];

        let result = glicko2(&players(), &interactions(), &ratings, Glicko2Config::default()).unwrap();

        let mus: Vec<f64> = result.iter().map(|r| (r.mu() * 1000.0).round() / 1000.0).collect();

        assert!((mus[0] - 1464.051).abs() < 1.0);
        assert!((mus[1] - 1395.575).abs() < 1.0);
    }

    #[test]
    fn rejects_arity_mismatch() {
        let ratings = vec![GlickoRate::default(); 2];
        let result = glicko(&players(), &interactions(), &ratings, GlickoConfig::default());
        assert!(matches!(result, Err(RatingError::ArityMismatch { .. })));
    }
}
