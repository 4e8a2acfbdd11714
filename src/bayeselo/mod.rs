//! BayesElo: a Bradley-Terry model with home-field and draw bias, fit by
//! Minorization-Maximization, imitating Rémi Coulom's
//! [Bayesian-Elo](https://www.remi-coulom.fr/Bayesian-Elo/).

pub mod stats;

use log::warn;

use crate::constants;
use crate::error::RatingError;
use crate::interaction::{to_pairwise, Interaction};
use crate::rate::{EloLike, EloRate, Rate as _};
use stats::{BayesEloStats, PairwiseStatistics};

/// Configuration for [`bayeselo`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BayesEloConfig {
    /// The Elo-scale home-field advantage granted to the first-listed
    /// player of every interaction.
    pub elo_advantage: f64,
    /// The Elo-scale draw spread.
    pub elo_draw: f64,
    /// Whether `elo_advantage` should itself be estimated by the solver
    /// rather than held fixed.
    pub learn_home_field_bias: bool,
    /// Whether `elo_draw` should itself be estimated by the solver
    /// rather than held fixed.
    pub learn_draw_bias: bool,
    /// Maximum number of Minorization-Maximization iterations.
    pub iterations: usize,
    /// Convergence tolerance on the largest relative change in any
    /// player's rating between iterations.
    pub tolerance: f64,
    /// Prior pseudo-draws added to every pairwise tally before solving.
    pub draw_prior: f64,
    /// If `true`, failing to converge within `iterations` is a hard
    /// [`RatingError::NonConvergent`] instead of a logged warning.
    pub strict: bool,
}

impl Default for BayesEloConfig {
    fn default() -> Self {
        BayesEloConfig {
            elo_advantage: constants::BAYESELO_ELO_ADVANTAGE,
            elo_draw: constants::BAYESELO_ELO_DRAW,
            learn_home_field_bias: false,
            learn_draw_bias: false,
            iterations: constants::BAYESELO_ITERATIONS,
            tolerance: constants::BAYESELO_TOLERANCE,
            draw_prior: constants::BAYESELO_DRAW_PRIOR,
            strict: false,
        }
    }
}

/// The Bradley-Terry model fit by Minorization-Maximization.
///
/// Works on raw multiplicative "ratings" (`base ** (mu / spread)`), only
/// converted to additive Elo points by [`Self::rescale_elos`] at the end.
struct BayesEloRating<'a> {
    pairwise_stats: &'a BayesEloStats,
    base: f64,
    spread: f64,
    home_field_bias: f64,
    draw_bias: f64,
    ratings: Vec<f64>,
    next_ratings: Vec<f64>,
}

impl<'a> BayesEloRating<'a> {
    fn new(pairwise_stats: &'a BayesEloStats, base: f64, spread: f64) -> Self {
        BayesEloRating {
            pairwise_stats,
            base,
            spread,
            home_field_bias: 1.0,
            draw_bias: 1.0,
            ratings: vec![1.0; pairwise_stats.num_players],
            next_ratings: vec![0.0; pairwise_stats.num_players],
        }
    }

    fn update_ratings(&mut self) {
        for player in (0..self.pairwise_stats.num_players).rev() {
            let mut a = 0.0_f64;
            let mut b = 0.0_f64;

            for opponent in (0..self.pairwise_stats.num_opponents_per_player[player]).rev() {
                let result: &PairwiseStatistics = &self.pairwise_stats.statistics[player][opponent];

                let opponent_rating = if result.opponent_idx > player {
                    self.next_ratings[result.opponent_idx]
                } else {
                    self.ratings[result.opponent_idx]
                };

                a += result.w_ij + result.d_ij + result.l_ji + result.d_ji;

                b += (result.d_ij + result.w_ij) * self.home_field_bias
                    / (self.home_field_bias * self.ratings[player] + self.draw_bias * opponent_rating)
                    + (result.d_ij + result.l_ij) * self.draw_bias * self.home_field_bias
                        / (self.draw_bias * self.home_field_bias * self.ratings[player] + opponent_rating)
                    + (result.d_ji + result.w_ji) * self.draw_bias
                        / (self.home_field_bias * opponent_rating + self.draw_bias * self.ratings[player])
                    + (result.d_ji + result.l_ji)
                        / (self.draw_bias * self.home_field_bias * opponent_rating + self.ratings[player]);
            }

            self.next_ratings[player] = a / b;
        }

        std::mem::swap(&mut self.ratings, &mut self.next_ratings);
    }

    fn update_home_field_bias(&self) -> f64 {
        let mut numerator = 0.0_f64;
        let mut denominator = 0.0_f64;

        for player in (0..self.pairwise_stats.num_players).rev() {
            for opponent in (0..self.pairwise_stats.num_opponents_per_player[player]).rev() {
                let result = &self.pairwise_stats.statistics[player][opponent];
                let opponent_rating = self.ratings[result.opponent_idx];

                numerator += result.w_ij + result.d_ij;
                denominator += (result.d_ij + result.w_ij) * self.ratings[player]
                    / (self.home_field_bias * self.ratings[player] + self.draw_bias * opponent_rating)
                    + (result.d_ij + result.l_ij) * self.draw_bias * self.ratings[player]
                        / (self.draw_bias * self.home_field_bias * self.ratings[player] + opponent_rating);
            }
        }

        numerator / denominator
    }

    fn update_draw_bias(&self) -> f64 {
        let mut numerator = 0.0_f64;
        let mut denominator = 0.0_f64;

        for player in (0..self.pairwise_stats.num_players).rev() {
            for opponent in (0..self.pairwise_stats.num_opponents_per_player[player]).rev() {
                let result = &self.pairwise_stats.statistics[player][opponent];
                let opponent_rating = self.ratings[result.opponent_idx];

                numerator += result.d_ij;
                denominator += (result.d_ij + result.w_ij) * opponent_rating
                    / (self.home_field_bias * self.ratings[player] + self.draw_bias * opponent_rating)
                    + (result.d_ij + result.l_ij) * self.home_field_bias * self.ratings[player]
                        / (self.draw_bias * self.home_field_bias * self.ratings[player] + opponent_rating);
            }
        }

        let c = numerator / denominator;
        c + (c * c + 1.0).sqrt()
    }

    fn compute_difference(&self) -> f64 {
        self.ratings
            .iter()
            .zip(&self.next_ratings)
            .map(|(a, b)| (a - b).abs() / (a + b))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Runs the MM loop, returning the number of iterations actually
    /// performed and the final convergence delta.
    fn minorize_maximize(&mut self, config: &BayesEloConfig) -> (usize, f64) {
        self.home_field_bias = self.base.powf(config.elo_advantage / self.spread);
        self.draw_bias = self.base.powf(config.elo_draw / self.spread);
        self.ratings = vec![1.0; self.pairwise_stats.num_players];

        let mut last_diff = f64::INFINITY;
        let mut iterations_run = 0;

        for _ in 0..config.iterations {
            self.update_ratings();
            let mut diff = self.compute_difference();

            if config.learn_home_field_bias {
                let new_bias = self.update_home_field_bias();
                diff = diff.max((self.home_field_bias - new_bias).abs());
                self.home_field_bias = new_bias;
            }

            if config.learn_draw_bias {
                let new_bias = self.update_draw_bias();
                diff = diff.max((self.draw_bias - new_bias).abs());
                self.draw_bias = new_bias;
            }

            iterations_run += 1;
            last_diff = diff;

            if diff < config.tolerance {
                break;
            }
        }

        (iterations_run, last_diff)
    }

    /// Converts the multiplicative ratings to additive Elo points,
    /// centered so the population mean is zero.
    fn to_elos(&self) -> Vec<f64> {
        let total: f64 = self
            .ratings
            .iter()
            .map(|&r| r.log(self.base) * self.spread)
            .sum();
        let offset = -total / self.pairwise_stats.num_players as f64;

        self.ratings.iter().map(|&r| r.log(self.base) * self.spread + offset).collect()
    }

    /// Rescales a population of Elo points by the draw-spread-dependent
    /// factor that keeps the logistic curvature comparable across
    /// different `elo_draw` settings.
    fn rescale(elos: &[EloRate], elo_draw: f64) -> Vec<EloRate> {
        elos.iter()
            .map(|elo| {
                let x = elo.base().powf(-elo_draw / elo.spread());
                let scale = x * 4.0 / (1.0 + x).powi(2);
                EloRate::new(elo.mu() * scale, elo.base(), elo.spread())
            })
            .collect()
    }
}

/// Rates players by fitting a Bradley-Terry model to a set of
/// interactions with Minorization-Maximization.
///
/// Players who do not appear in any interaction are returned unchanged;
/// everyone else is assigned a freshly fit rating.
///
/// # Errors
///
/// Returns [`RatingError::ArityMismatch`] if `players` and `ratings`
/// differ in length, [`RatingError::UnknownPlayer`] if an interaction
/// names a player outside `players`, and [`RatingError::NonConvergent`]
/// if `config.strict` is set and the solver exhausts `config.iterations`
/// without reaching `config.tolerance`.
pub fn bayeselo(
    players: &[String],
    interactions: &[Interaction],
    ratings: &[EloRate],
    config: BayesEloConfig,
) -> Result<Vec<EloRate>, RatingError> {
    if players.len() != ratings.len() {
        return Err(RatingError::ArityMismatch {
            expected: players.len(),
            got: ratings.len(),
            context: "players and ratings",
        });
    }
    if let Some(first) = ratings.first() {
        if ratings.iter().any(|r| r.base() != first.base() || r.spread() != first.spread()) {
            return Err(RatingError::IncompatibleRate(
                "every Elo rating passed to the same call must share the same base and spread".to_string(),
            ));
        }
    }

    if interactions.is_empty() {
        return Ok(ratings.to_vec());
    }

    let pairwise = to_pairwise(interactions);
    for interaction in &pairwise {
        interaction.check_known_players(players)?;
    }

    let active: Vec<String> = players
        .iter()
        .filter(|p| pairwise.iter().any(|i| i.players().contains(p)))
        .cloned()
        .collect();

    if active.is_empty() {
        return Ok(ratings.to_vec());
    }

    let base = ratings.first().map_or(constants::ELO_BASE, EloRate::base);
    let spread = ratings.first().map_or(constants::ELO_SPREAD, EloRate::spread);

    let stats = BayesEloStats::from_interactions(&active, &pairwise, true, config.draw_prior);
    let mut model = BayesEloRating::new(&stats, base, spread);
    let (iterations_run, last_diff) = model.minorize_maximize(&config);

    if last_diff >= config.tolerance {
        if config.strict {
            return Err(RatingError::NonConvergent {
                algorithm: "bayeselo",
                iterations: iterations_run,
                last_delta: last_diff,
                tolerance: config.tolerance,
            });
        }
        warn!(
            "bayeselo: Minorization-Maximization did not converge after {iterations_run} iterations \
             (last delta {last_diff:e}, tolerance {:e})",
            config.tolerance
        );
    }

    let fitted_mus = model.to_elos();
    let fitted: Vec<EloRate> = fitted_mus.iter().map(|&mu| EloRate::new(mu, base, spread)).collect();
    let fitted = BayesEloRating::rescale(&fitted, config.elo_draw);

    let mut fitted = fitted.into_iter();
    Ok(players
        .iter()
        .zip(ratings)
        .map(|(player, &prior)| {
            if active.contains(player) {
                fitted.next().expect("one fitted rating per active player")
            } else {
                prior
            }
        })
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn single_win_gives_symmetric_ratings() {
        let players = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let ratings: Vec<EloRate> = players.iter().map(|_| EloRate::new(0.0, 10.0, 400.0)).collect();
        let interactions = vec![Interaction::new(vec!["a".into(), "b".into()], vec![0.0, 1.0])];

        let result = bayeselo(&players, &interactions, &ratings, BayesEloConfig::default()).unwrap();

        assert!(result[0].mu() < 0.0);
        assert!(result[1].mu() > 0.0);
        assert!((result[0].mu() + result[1].mu()).abs() < 1e-6);
    }

    #[test]
    fn uninvolved_player_is_untouched() {
        let players = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let ratings: Vec<EloRate> = vec![
            EloRate::new(10.0, 10.0, 400.0),
            EloRate::new(-10.0, 10.0, 400.0),
            EloRate::new(42.0, 10.0, 400.0),
        ];
        let interactions = vec![Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0])];

        let result = bayeselo(&players, &interactions, &ratings, BayesEloConfig::default()).unwrap();
        assert_eq!(result[2].mu(), 42.0);
    }

    #[test]
    fn rejects_incompatible_scale() {
        let players = vec!["a".to_string(), "b".to_string()];
        let ratings = vec![EloRate::new(0.0, 10.0, 400.0), EloRate::new(0.0, 2.0, 400.0)];
        let interactions = vec![Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0])];
        let result = bayeselo(&players, &interactions, &ratings, BayesEloConfig::default());
        assert!(matches!(result, Err(RatingError::IncompatibleRate(_))));
    }

    #[test]
    fn empty_interactions_returns_priors_unchanged() {
        let players = vec!["a".to_string(), "b".to_string()];
        let ratings: Vec<EloRate> = vec![EloRate::new(5.0, 10.0, 400.0), EloRate::new(-5.0, 10.0, 400.0)];

        let result = bayeselo(&players, &[], &ratings, BayesEloConfig::default()).unwrap();
        assert_eq!(result, ratings);
    }
}
