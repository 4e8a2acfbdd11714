//! Laplacian rating: a directed-graph generalization of the Markov,
//! Massey and Colley ranking methods, unified by Devlin & Treloar's
//! diffusion-ranking framework (Journal of Quantitative Analysis in
//! Sports, 2018).
//!
//! Every loss is treated as the loser casting a vote, weighted by games
//! played, for the winner. Players are nodes in a directed graph and a
//! small teleportation term (as in a PageRank-style Google matrix) keeps
//! the walk irreducible even when some player never lost a game. The
//! rating is the resulting random walk's stationary distribution: the
//! left null vector of `I - G`, extracted via SVD.

use nalgebra::{DMatrix, SVD};

use crate::constants;
use crate::error::RatingError;
use crate::interaction::{to_pairwise, Interaction};
use crate::matrix::win_count_matrix;
use crate::rate::{GenericRate, Rate};

/// Configuration for [`laplacian`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LaplacianConfig {
    /// Probability mass that follows the recorded loss graph rather than
    /// teleporting uniformly to a random player; keeps the walk
    /// irreducible. Must be in `(0, 1]`.
    pub damping: f64,
}

impl Default for LaplacianConfig {
    fn default() -> Self {
        LaplacianConfig {
            damping: constants::LAPLACIAN_DAMPING,
        }
    }
}

/// Rates players by the stationary distribution of the directed-graph
/// random walk built from their head-to-head record.
///
/// There is no notion of a prior rating to carry forward: this is a
/// structural property of the interaction history alone, recomputed from
/// scratch every call. The returned ratings sum to `1` across the
/// population, like a probability distribution.
///
/// # Errors
///
/// Returns [`RatingError::UnknownPlayer`] if an interaction names a
/// player outside `players`, or [`RatingError::NumericFailure`] if no
/// stationary distribution could be extracted.
pub fn laplacian(
    players: &[String],
    interactions: &[Interaction],
    config: LaplacianConfig,
) -> Result<Vec<GenericRate>, RatingError> {
    for interaction in interactions {
        interaction.check_known_players(players)?;
    }

    let n = players.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let pairwise = to_pairwise(interactions);
    // `losses[j][i]` is the number of times `j` lost to `i`: the weight
    // of the edge along which `j` casts its vote for `i`.
    let losses = win_count_matrix(players, &pairwise).transpose();

    let uniform = 1.0 / n as f64;
    let mut google = DMatrix::<f64>::zeros(n, n);
    for j in 0..n {
        let out_degree: f64 = losses.row(j).iter().sum();
        for i in 0..n {
            let followed = if out_degree > 0.0 {
                losses.get(j, i) / out_degree
            } else {
                uniform
            };
            google[(j, i)] = config.damping * followed + (1.0 - config.damping) * uniform;
        }
    }

    let mut lap = DMatrix::<f64>::identity(n, n);
    lap -= &google;

    let svd = SVD::new(lap.transpose(), false, true);
    let v_t = svd.v_t.expect("right singular vectors were requested");
    let singular_values = svd.singular_values;

    let null_idx = (0..singular_values.len())
        .min_by(|&a, &b| singular_values[a].partial_cmp(&singular_values[b]).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| RatingError::NumericFailure {
            algorithm: "laplacian",
            detail: "empty player set has no singular value decomposition".to_string(),
        })?;

    if singular_values[null_idx] > 1e-6 {
        return Err(RatingError::NumericFailure {
            algorithm: "laplacian",
            detail: format!(
                "graph Laplacian has no null space (smallest singular value {})",
                singular_values[null_idx]
            ),
        });
    }

    let mut rates: Vec<f64> = v_t.row(null_idx).iter().copied().collect();

    // Fix the scale ambiguity of a null vector by the sign of its
    // largest-magnitude entry, not its largest value.
    let argmax = (0..rates.len())
        .max_by(|&a, &b| rates[a].abs().partial_cmp(&rates[b].abs()).unwrap_or(std::cmp::Ordering::Equal))
        .expect("n > 0, checked above");
    if rates[argmax] < 0.0 {
        for rate in &mut rates {
            *rate = -*rate;
        }
    }

    let sum: f64 = rates.iter().sum();
    if sum.abs() > f64::EPSILON {
        for rate in &mut rates {
            *rate /= sum;
        }
    }

    Ok(rates.into_iter().map(|rate| GenericRate::new(rate, 0.0)).collect())
}

/// Ranks players by their Laplacian rating, highest first.
///
/// Since the null vector's scale is fixed only up to sign, the ranking
/// rather than the raw values is the output that's meaningful to compare
/// across runs.
#[must_use]
pub fn rank(ratings: &[GenericRate]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ratings.len()).collect();
    order.sort_by(|&a, &b| {
        ratings[b]
            .mu()
            .partial_cmp(&ratings[a].mu())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rate::Rate;

    #[test]
    fn symmetric_cycle_gives_equal_ratings() {
        let players = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let interactions = vec![
            Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["b".into(), "c".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["c".into(), "a".into()], vec![1.0, 0.0]),
        ];
        let result = laplacian(&players, &interactions, LaplacianConfig::default()).unwrap();

        for rate in &result {
            assert!((rate.mu() - result[0].mu()).abs() < 1e-6);
        }
    }

    #[test]
    fn dominant_player_outranks_weaker_ones() {
        let players = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut interactions = Vec::new();
        for _ in 0..5 {
            interactions.push(Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]));
            interactions.push(Interaction::new(vec!["a".into(), "c".into()], vec![1.0, 0.0]));
            interactions.push(Interaction::new(vec!["b".into(), "c".into()], vec![1.0, 0.0]));
        }
        let result = laplacian(&players, &interactions, LaplacianConfig::default()).unwrap();

        assert!(result[0].mu() > result[1].mu());
        assert!(result[1].mu() > result[2].mu());
    }

    #[test]
    fn ratings_sum_to_one() {
        let players = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let interactions = vec![
            Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["b".into(), "c".into()], vec![1.0, 0.0]),
        ];
        let result = laplacian(&players, &interactions, LaplacianConfig::default()).unwrap();
        let sum: f64 = result.iter().map(Rate::mu).sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rank_orders_by_descending_mu() {
        let players = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut interactions = Vec::new();
        for _ in 0..5 {
            interactions.push(Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]));
            interactions.push(Interaction::new(vec!["a".into(), "c".into()], vec![1.0, 0.0]));
            interactions.push(Interaction::new(vec!["b".into(), "c".into()], vec![1.0, 0.0]));
        }
        let result = laplacian(&players, &interactions, LaplacianConfig::default()).unwrap();
        assert_eq!(rank(&result), vec![0, 1, 2]);
    }

    #[test]
    fn rejects_unknown_player() {
        let players = vec!["a".to_string(), "b".to_string()];
        let interactions = vec![Interaction::new(vec!["a".into(), "z".into()], vec![1.0, 0.0])];
        let result = laplacian(&players, &interactions, LaplacianConfig::default());
        assert!(matches!(result, Err(RatingError::UnknownPlayer { .. })));
    }
}
