//! Nash average: rates players by the equilibrium strategy of the
//! symmetric zero-sum game implied by their head-to-head record, rather
//! than by any notion of accumulated score. Captures non-transitive
//! ("rock-paper-scissors") relationships that a scalar rating cannot.

pub mod solver;

use crate::constants;
use crate::error::RatingError;
use crate::interaction::{to_pairwise, Interaction};
use crate::matrix::{empirical_log_odds_matrix, raw_payoff_matrix};
use crate::rate::GenericRate;
use solver::{FictitiousPlay, NashSolver};

/// Configuration for [`nash_avg`] and [`nash_avg_bipartite`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct NashConfig {
    /// If `true`, negative entries of the empirical payoff matrix are
    /// clamped to zero before solving (the "rectified" Nash average),
    /// which discounts lopsided losing matchups rather than letting
    /// them pull the equilibrium away from a win.
    pub rectify: bool,
    /// Number of fictitious-play iterations run by the solver.
    pub iterations: usize,
}

impl Default for NashConfig {
    fn default() -> Self {
        NashConfig {
            rectify: false,
            iterations: constants::NASH_FICTITIOUS_PLAY_ITERATIONS,
        }
    }
}

/// Rates players by the Nash equilibrium of the symmetric zero-sum game
/// whose payoff matrix is the antisymmetric log-odds of their pairwise
/// win rate (see [`crate::matrix::empirical_log_odds_matrix`]).
///
/// Interactions with more than two players are decomposed into pairs via
/// [`Interaction::as_pairs`] first. The returned ratings are each
/// player's equilibrium play probability, which sum to `1` across the
/// population rather than living on an open-ended scale.
///
/// # Errors
///
/// Returns [`RatingError::UnknownPlayer`] if an interaction names a
/// player outside `players`.
pub fn nash_avg(players: &[String], interactions: &[Interaction], config: NashConfig) -> Result<Vec<GenericRate>, RatingError> {
    for interaction in interactions {
        interaction.check_known_players(players)?;
    }

    let pairwise = to_pairwise(interactions);
    let mut payoff = empirical_log_odds_matrix(players, &pairwise);
    if config.rectify {
        payoff.rectify();
    }

    let solver = FictitiousPlay::new(config.iterations);
    let (row_dist, col_dist) = solver.solve(&payoff);

    Ok(row_dist
        .iter()
        .zip(&col_dist)
        .map(|(&r, &c)| GenericRate::new((r + c) / 2.0, 0.0))
        .collect())
}

/// Rates players against a separate pool of opponents (e.g. tasks or
/// environments rather than peers) by the Nash equilibrium of the
/// asymmetric zero-sum game implied by raw interaction outcomes, the
/// "player-vs-task" variant of [`nash_avg`].
///
/// Every interaction is expected to name exactly one player (from
/// `players`) followed by exactly one opponent (from `opponents`), with
/// `outcomes[0]` already a real-valued zero-sum payoff rather than a
/// categorical win/draw/loss result.
///
/// # Errors
///
/// Returns [`RatingError::UnknownPlayer`] if an interaction names
/// someone outside the relevant pool, or
/// [`RatingError::MalformedOutcome`] if an interaction doesn't name
/// exactly two participants.
pub fn nash_avg_bipartite(
    players: &[String],
    opponents: &[String],
    interactions: &[Interaction],
    config: NashConfig,
) -> Result<(Vec<GenericRate>, Vec<GenericRate>), RatingError> {
    for interaction in interactions {
        if interaction.len() != 2 {
            return Err(RatingError::MalformedOutcome {
                algorithm: "nash_avg_bipartite",
                detail: "every interaction must name exactly one player and one opponent".to_string(),
            });
        }
        if !players.contains(&interaction.players()[0]) {
            return Err(RatingError::UnknownPlayer {
                player: interaction.players()[0].clone(),
            });
        }
        if !opponents.contains(&interaction.players()[1]) {
            return Err(RatingError::UnknownPlayer {
                player: interaction.players()[1].clone(),
            });
        }
    }

    let mut payoff = raw_payoff_matrix(players, opponents, interactions);
    if config.rectify {
        payoff.rectify();
    }

    let solver = FictitiousPlay::new(config.iterations);
    let (player_dist, opponent_dist) = solver.solve(&payoff);

    Ok((
        player_dist.into_iter().map(|p| GenericRate::new(p, 0.0)).collect(),
        opponent_dist.into_iter().map(|p| GenericRate::new(p, 0.0)).collect(),
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rate::Rate;

    fn rock_paper_scissors() -> (Vec<String>, Vec<Interaction>) {
        let players = vec!["rock".to_string(), "paper".to_string(), "scissors".to_string()];
        let interactions = vec![
            Interaction::new(vec!["paper".into(), "rock".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["scissors".into(), "paper".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["rock".into(), "scissors".into()], vec![1.0, 0.0]),
        ];
        (players, interactions)
    }

    #[test]
    fn symmetric_cycle_rates_everyone_equally() {
        let (players, interactions) = rock_paper_scissors();
        let config = NashConfig {
            iterations: 2_000,
            ..NashConfig::default()
        };
        let result = nash_avg(&players, &interactions, config).unwrap();

        let sum: f64 = result.iter().map(Rate::mu).sum();
        assert!((sum - 1.0).abs() < 1e-6);
        for rate in &result {
            assert!((rate.mu() - 1.0 / 3.0).abs() < 0.1);
        }
    }

    #[test]
    fn rejects_unknown_player() {
        let (players, _) = rock_paper_scissors();
        let bad = vec![Interaction::new(vec!["rock".into(), "lizard".into()], vec![1.0, 0.0])];
        let result = nash_avg(&players, &bad, NashConfig::default());
        assert!(matches!(result, Err(RatingError::UnknownPlayer { .. })));
    }

    #[test]
    fn bipartite_rates_sum_to_one_on_each_side() {
        let players = vec!["a".to_string(), "b".to_string()];
        let tasks = vec!["easy".to_string(), "hard".to_string()];
        let interactions = vec![
            Interaction::new(vec!["a".into(), "easy".into()], vec![1.0, -1.0]),
            Interaction::new(vec!["b".into(), "hard".into()], vec![-1.0, 1.0]),
        ];
        let (player_dist, task_dist) = nash_avg_bipartite(&players, &tasks, &interactions, NashConfig::default()).unwrap();

        let player_sum: f64 = player_dist.iter().map(Rate::mu).sum();
        let task_sum: f64 = task_dist.iter().map(Rate::mu).sum();
        assert!((player_sum - 1.0).abs() < 1e-6);
        assert!((task_sum - 1.0).abs() < 1e-6);
    }
}
