//! Multidimensional Elo (mElo): an Elo-like rating augmented with a small
//! number of orthogonal dimensions that capture non-transitive
//! ("rock-paper-scissors") relationships a single scalar rating cannot.
//!
//! Ratings are fit by stochastic gradient descent over many shuffled
//! passes through the interaction history rather than a closed-form
//! update, so unlike [`crate::elo`] there is no aggregate/stream
//! distinction: every pass already sees every interaction.

use rand::seq::SliceRandom;

use crate::constants;
use crate::error::RatingError;
use crate::interaction::{to_pairwise, Interaction};
use crate::math::sigmoid;
use crate::rate::{MultidimEloRate, Rate};

/// Configuration for [`melo`] and [`melo_bipartite`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MeloConfig {
    /// Learning rate applied to the scalar rating component.
    pub learning_rate_1: f64,
    /// Learning rate applied to the cyclic (non-transitive) components.
    pub learning_rate_2: f64,
    /// Number of shuffled passes over the full interaction history.
    pub iterations: usize,
}

impl Default for MeloConfig {
    fn default() -> Self {
        MeloConfig {
            learning_rate_1: constants::MELO_LEARNING_RATE_1,
            learning_rate_2: constants::MELO_LEARNING_RATE_2,
            iterations: constants::MELO_ITERATIONS,
        }
    }
}

/// `a^T * Omega * b`, where `Omega` is the `2k x 2k` matrix with
/// alternating `+1`/`-1` off-diagonal pairs mElo uses to represent
/// cyclic dominance. Computed directly from the pairing structure rather
/// than by building the (mostly zero) matrix.
fn omega_term(a: &[f64], b: &[f64]) -> f64 {
    a.chunks_exact(2)
        .zip(b.chunks_exact(2))
        .map(|(ai, bi)| ai[0] * bi[1] - ai[1] * bi[0])
        .sum()
}

/// `Omega * v`.
fn omega_mul(v: &[f64]) -> Vec<f64> {
    v.chunks_exact(2).flat_map(|pair| [pair[1], -pair[0]]).collect()
}

/// The mElo win probability of `player` over `opponent`.
#[must_use]
pub fn expected_outcome(player: &MultidimEloRate, opponent: &MultidimEloRate) -> f64 {
    sigmoid(player.mu() - opponent.mu() + omega_term(player.dims(), opponent.dims()))
}

fn check_same_k(ratings: &[MultidimEloRate]) -> Result<(), RatingError> {
    let Some(first) = ratings.first() else { return Ok(()) };
    let k = first.dims().len();
    if ratings.iter().any(|r| r.dims().len() != k) {
        return Err(RatingError::IncompatibleRate(
            "every mElo rating passed to the same call must share the same k".to_string(),
        ));
    }
    Ok(())
}

/// Rates players by fitting multidimensional Elo over a set of
/// interactions, which capture non-transitive ("rock-paper-scissors")
/// relationships a plain Elo rating cannot.
///
/// Interactions with more than two players are decomposed into pairs via
/// [`Interaction::as_pairs`] first.
///
/// # Errors
///
/// Returns [`RatingError::ArityMismatch`] if `players` and `ratings`
/// differ in length, [`RatingError::UnknownPlayer`] if an interaction
/// names a player outside `players`, or [`RatingError::IncompatibleRate`]
/// if the ratings don't all share the same dimensionality.
pub fn melo(
    players: &[String],
    interactions: &[Interaction],
    ratings: &[MultidimEloRate],
    config: MeloConfig,
) -> Result<Vec<MultidimEloRate>, RatingError> {
    if players.len() != ratings.len() {
        return Err(RatingError::ArityMismatch {
            expected: players.len(),
            got: ratings.len(),
            context: "players and ratings",
        });
    }
    check_same_k(ratings)?;

    let pairwise = to_pairwise(interactions);
    for interaction in &pairwise {
        interaction.check_known_players(players)?;
    }

    let mut rates: Vec<f64> = ratings.iter().map(Rate::mu).collect();
    let mut cyclic: Vec<Vec<f64>> = ratings.iter().map(|r| r.dims().to_vec()).collect();

    let mut rng = rand::rng();
    let mut shuffled = pairwise;

    for _ in 0..config.iterations {
        shuffled.shuffle(&mut rng);

        for interaction in &shuffled {
            let i = players.iter().position(|p| p == &interaction.players()[0]).expect("checked");
            let j = players.iter().position(|p| p == &interaction.players()[1]).expect("checked");

            let expected = sigmoid(rates[i] - rates[j] + omega_term(&cyclic[i], &cyclic[j]));
            let delta = interaction.outcomes()[0] - expected;

            rates[i] += config.learning_rate_1 * delta;
            rates[j] -= config.learning_rate_1 * delta;

            let update_i = omega_mul(&cyclic[j]);
            let update_j = omega_mul(&cyclic[i]);

            for (c, u) in cyclic[i].iter_mut().zip(&update_i) {
                *c += config.learning_rate_2 * delta * u;
            }
            for (c, u) in cyclic[j].iter_mut().zip(&update_j) {
                *c -= config.learning_rate_2 * delta * u;
            }
        }
    }

    Ok(ratings
        .iter()
        .zip(rates)
        .zip(cyclic)
        .map(|((prior, mu), dims)| {
            let mut updated = MultidimEloRate::new(mu, prior.dims().len());
            updated.dims_mut().copy_from_slice(&dims);
            updated
        })
        .collect())
}

/// Rates players against a separate pool of opponents (e.g. tasks or
/// environments rather than peers), the "player-vs-task" variant of
/// [`melo`].
///
/// Every interaction is expected to name exactly one player (from
/// `players`) followed by exactly one opponent (from `opponents`).
///
/// # Errors
///
/// Returns [`RatingError::ArityMismatch`] if either pool and its ratings
/// differ in length, [`RatingError::UnknownPlayer`] if an interaction
/// names someone outside the relevant pool, or
/// [`RatingError::IncompatibleRate`] if a pool's ratings don't all share
/// the same dimensionality.
pub fn melo_bipartite(
    players: &[String],
    opponents: &[String],
    interactions: &[Interaction],
    player_ratings: &[MultidimEloRate],
    opponent_ratings: &[MultidimEloRate],
    config: MeloConfig,
) -> Result<(Vec<MultidimEloRate>, Vec<MultidimEloRate>), RatingError> {
    if players.len() != player_ratings.len() {
        return Err(RatingError::ArityMismatch {
            expected: players.len(),
            got: player_ratings.len(),
            context: "players and player_ratings",
        });
    }
    if opponents.len() != opponent_ratings.len() {
        return Err(RatingError::ArityMismatch {
            expected: opponents.len(),
            got: opponent_ratings.len(),
            context: "opponents and opponent_ratings",
        });
    }
    check_same_k(player_ratings)?;
    check_same_k(opponent_ratings)?;

    for interaction in interactions {
        if interaction.len() != 2 {
            return Err(RatingError::MalformedOutcome {
                algorithm: "melo_bipartite",
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

    let mut player_rates: Vec<f64> = player_ratings.iter().map(Rate::mu).collect();
    let mut opponent_rates: Vec<f64> = opponent_ratings.iter().map(Rate::mu).collect();
    let mut player_cyclic: Vec<Vec<f64>> = player_ratings.iter().map(|r| r.dims().to_vec()).collect();
    let mut opponent_cyclic: Vec<Vec<f64>> = opponent_ratings.iter().map(|r| r.dims().to_vec()).collect();

    let mut rng = rand::rng();
    let mut shuffled = interactions.to_vec();

    for _ in 0..config.iterations {
        shuffled.shuffle(&mut rng);

        for interaction in &shuffled {
            let p = players.iter().position(|x| x == &interaction.players()[0]).expect("checked");
            let o = opponents.iter().position(|x| x == &interaction.players()[1]).expect("checked");

            let expected = sigmoid(player_rates[p] - opponent_rates[o] + omega_term(&player_cyclic[p], &opponent_cyclic[o]));
            let delta = interaction.outcomes()[0] - expected;

            player_rates[p] += config.learning_rate_1 * delta;
            opponent_rates[o] -= config.learning_rate_1 * delta;

            let player_update = omega_mul(&opponent_cyclic[o]);
            let opponent_update = omega_mul(&player_cyclic[p]);

            for (c, u) in player_cyclic[p].iter_mut().zip(&player_update) {
                *c += config.learning_rate_2 * delta * u;
            }
            for (c, u) in opponent_cyclic[o].iter_mut().zip(&opponent_update) {
                *c -= config.learning_rate_2 * delta * u;
            }
        }
    }

    let rated_players = player_ratings
        .iter()
        .zip(player_rates)
        .zip(player_cyclic)
        .map(|((prior, mu), dims)| {
            let mut updated = MultidimEloRate::new(mu, prior.dims().len());
            updated.dims_mut().copy_from_slice(&dims);
            updated
        })
        .collect();

    let rated_opponents = opponent_ratings
        .iter()
        .zip(opponent_rates)
        .zip(opponent_cyclic)
        .map(|((prior, mu), dims)| {
            let mut updated = MultidimEloRate::new(mu, prior.dims().len());
            updated.dims_mut().copy_from_slice(&dims);
            updated
        })
        .collect();

    Ok((rated_players, rated_opponents))
}

#[cfg(test)]
mod test {
    use super::*;

    fn rock_paper_scissors() -> (Vec<String>, Vec<Interaction>, Vec<MultidimEloRate>) {
        let players = vec!["rock".to_string(), "paper".to_string(), "scissors".to_string()];
        let mut interactions = Vec::new();
        for _ in 0..100 {
            interactions.push(Interaction::new(vec!["paper".into(), "rock".into()], vec![1.0, 0.0]));
            interactions.push(Interaction::new(vec!["scissors".into(), "paper".into()], vec![1.0, 0.0]));
            interactions.push(Interaction::new(vec!["rock".into(), "scissors".into()], vec![1.0, 0.0]));
        }
        let ratings = vec![
            MultidimEloRate::new(0.0, 2),
            MultidimEloRate::new(0.0, 2),
            MultidimEloRate::new(0.0, 2),
        ];
        (players, interactions, ratings)
    }

    #[test]
    fn captures_non_transitive_cycle() {
        let (players, interactions, ratings) = rock_paper_scissors();
        let config = MeloConfig {
            learning_rate_1: 1.0,
            learning_rate_2: 0.1,
            iterations: 100,
        };
        let result = melo(&players, &interactions, &ratings, config).unwrap();

        assert!(expected_outcome(&result[1], &result[0]) > 0.9);
        assert!(expected_outcome(&result[2], &result[1]) > 0.9);
        assert!(expected_outcome(&result[0], &result[2]) > 0.9);

        assert!((result[0].mu() - result[1].mu()).abs() < 1.0);
        assert!((result[1].mu() - result[2].mu()).abs() < 1.0);
    }

    #[test]
    fn rejects_arity_mismatch() {
        let (players, interactions, ratings) = rock_paper_scissors();
        let result = melo(&players, &interactions, &ratings[..2], MeloConfig::default());
        assert!(matches!(result, Err(RatingError::ArityMismatch { .. })));
    }

    #[test]
    fn bipartite_rates_players_against_tasks() {
        let players = vec!["a".to_string(), "b".to_string()];
        let tasks = vec!["easy".to_string(), "hard".to_string()];
        let mut interactions = Vec::new();
        for _ in 0..50 {
            interactions.push(Interaction::new(vec!["a".into(), "easy".into()], vec![1.0, 0.0]));
            interactions.push(Interaction::new(vec!["a".into(), "hard".into()], vec![0.0, 1.0]));
            interactions.push(Interaction::new(vec!["b".into(), "easy".into()], vec![1.0, 0.0]));
            interactions.push(Interaction::new(vec!["b".into(), "hard".into()], vec![1.0, 0.0]));
        }
        let player_ratings = vec![MultidimEloRate::new(0.0, 2), MultidimEloRate::new(0.0, 2)];
        let task_ratings = vec![MultidimEloRate::new(0.0, 2), MultidimEloRate::new(0.0, 2)];

        let (players_out, tasks_out) = melo_bipartite(
            &players,
            &tasks,
            &interactions,
            &player_ratings,
            &task_ratings,
            MeloConfig::default(),
        )
        .unwrap();

        assert!(players_out[1].mu() > players_out[0].mu());
        assert!(tasks_out[1].mu() > tasks_out[0].mu());
    }
}
