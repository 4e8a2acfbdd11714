//! Dense player-by-player matrices built from interaction histories:
//! win counts, raw payoffs, and the log-odds transform that turns a win
//! count into an antisymmetric zero-sum payoff. Shared by [`crate::nash`]
//! and [`crate::laplacian`].

use crate::interaction::Interaction;

/// A dense, row-major matrix of `f64`.
#[derive(Clone, PartialEq, Debug)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a `rows x cols` matrix of zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The entry at `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    /// Sets the entry at `(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] = value;
    }

    fn add(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] += value;
    }

    /// The `i`-th row.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Transposes the matrix.
    #[must_use]
    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t.set(j, i, self.get(i, j));
            }
        }
        t
    }

    /// Clamps every entry below zero to zero (a ReLU applied
    /// element-wise), the "rectified" variant of a payoff matrix.
    pub fn rectify(&mut self) {
        for value in &mut self.data {
            *value = value.max(0.0);
        }
    }
}

/// Builds a `players.len() x players.len()` matrix of win counts:
/// `matrix[i][j]` is the number of times `players[i]` beat `players[j]`
/// across `interactions`. Interactions not between exactly two known
/// players are ignored; callers that need that enforced should validate
/// interactions before calling this.
#[must_use]
pub fn win_count_matrix(players: &[String], interactions: &[Interaction]) -> Matrix {
    let mut matrix = Matrix::zeros(players.len(), players.len());

    for interaction in interactions {
        if interaction.len() != 2 {
            continue;
        }
        let (Some(i), Some(j)) = (
            players.iter().position(|p| p == &interaction.players()[0]),
            players.iter().position(|p| p == &interaction.players()[1]),
        ) else {
            continue;
        };

        let outcomes = interaction.outcomes();
        if outcomes[0] > outcomes[1] {
            matrix.add(i, j, 1.0);
        } else if outcomes[1] > outcomes[0] {
            matrix.add(j, i, 1.0);
        }
    }

    matrix
}

/// Builds the antisymmetric log-odds empirical payoff matrix Nash
/// average plays as a symmetric zero-sum game: a Laplace-smoothed win
/// rate, logit-transformed so that an even record is `0` and
/// `matrix[i][j] == -matrix[j][i]` exactly.
#[must_use]
pub fn empirical_log_odds_matrix(players: &[String], interactions: &[Interaction]) -> Matrix {
    let wins = win_count_matrix(players, interactions);
    let n = players.len();
    let mut result = Matrix::zeros(n, n);

    for i in 0..n {
        for j in 0..n {
            let w_ij = wins.get(i, j) + 1.0;
            let w_ji = wins.get(j, i) + 1.0;
            result.set(i, j, (w_ij / (w_ij + w_ji)).ln());
        }
    }

    result
}

/// How [`to_payoff_matrix`] combines repeated interactions between the
/// same pair of players.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reduction {
    /// Accumulate every interaction's outcome.
    Sum,
    /// Accumulate, then divide by the number of interactions contributing
    /// to that cell.
    Avg,
}

/// Builds a `players.len() x players.len()` payoff matrix: `matrix[i][j]`
/// accumulates `outcome_i` for every pairwise interaction of `i` against
/// `j`, and `matrix[j][i]` accumulates `outcome_j` the same way.
/// Interactions with more than two players are decomposed into pairs via
/// [`crate::interaction::to_pairwise`] first.
#[must_use]
pub fn to_payoff_matrix(players: &[String], interactions: &[Interaction], reduction: Reduction) -> Matrix {
    use crate::interaction::to_pairwise;

    let n = players.len();
    let mut matrix = Matrix::zeros(n, n);
    let mut counts = Matrix::zeros(n, n);

    for interaction in to_pairwise(interactions) {
        let (Some(i), Some(j)) = (
            players.iter().position(|p| p == &interaction.players()[0]),
            players.iter().position(|p| p == &interaction.players()[1]),
        ) else {
            continue;
        };

        let outcomes = interaction.outcomes();
        matrix.add(i, j, outcomes[0]);
        matrix.add(j, i, outcomes[1]);
        counts.add(i, j, 1.0);
        counts.add(j, i, 1.0);
    }

    if reduction == Reduction::Avg {
        for i in 0..n {
            for j in 0..n {
                let count = counts.get(i, j);
                if count > 0.0 {
                    matrix.set(i, j, matrix.get(i, j) / count);
                }
            }
        }
    }

    matrix
}

/// Builds a `players.len() x players.len()` win matrix: `matrix[i][j]` is
/// the number of times `players[i]` beat `players[j]` (strict outcome
/// comparison) across `interactions`, decomposed into pairs first. If
/// `normalize` is set, every nonzero `matrix[i][j] + matrix[j][i]` pair is
/// divided down to `i`'s win rate against `j`.
#[must_use]
pub fn to_win_matrix(players: &[String], interactions: &[Interaction], normalize: bool) -> Matrix {
    use crate::interaction::to_pairwise;

    let pairwise = to_pairwise(interactions);
    let mut matrix = win_count_matrix(players, &pairwise);

    if normalize {
        let n = players.len();
        let raw = matrix.clone();
        for i in 0..n {
            for j in 0..n {
                let total = raw.get(i, j) + raw.get(j, i);
                if total > 0.0 {
                    matrix.set(i, j, raw.get(i, j) / total);
                }
            }
        }
    }

    matrix
}

/// Builds the margin matrix `W - Wᵀ` from [`to_win_matrix`]'s
/// (unnormalized) win counts: `matrix[i][j]` is `i`'s win count over `j`
/// minus `j`'s win count over `i`.
#[must_use]
pub fn to_margin_matrix(players: &[String], interactions: &[Interaction]) -> Matrix {
    let wins = to_win_matrix(players, interactions, false);
    let transposed = wins.transpose();
    let n = players.len();
    let mut margin = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            margin.set(i, j, wins.get(i, j) - transposed.get(i, j));
        }
    }
    margin
}

/// Builds a raw payoff matrix by directly summing `outcomes[0]` of every
/// `(row_players[i], col_players[j])` interaction, with no win-counting
/// or normalization. Used where outcomes are already real-valued
/// zero-sum payoffs rather than categorical win/draw/loss results.
#[must_use]
pub fn raw_payoff_matrix(row_players: &[String], col_players: &[String], interactions: &[Interaction]) -> Matrix {
    let mut matrix = Matrix::zeros(row_players.len(), col_players.len());

    for interaction in interactions {
        if interaction.len() != 2 {
            continue;
        }
        let Some(i) = row_players.iter().position(|p| p == &interaction.players()[0]) else {
            continue;
        };
        let Some(j) = col_players.iter().position(|p| p == &interaction.players()[1]) else {
            continue;
        };
        matrix.add(i, j, interaction.outcomes()[0]);
    }

    matrix
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn win_count_matrix_counts_each_direction() {
        let players = vec!["a".to_string(), "b".to_string()];
        let interactions = vec![
            Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["b".into(), "a".into()], vec![1.0, 0.0]),
        ];
        let matrix = win_count_matrix(&players, &interactions);
        assert_eq!(matrix.get(0, 1), 2.0);
        assert_eq!(matrix.get(1, 0), 1.0);
    }

    #[test]
    fn to_payoff_matrix_sums_both_sides() {
        let players = vec!["a".to_string(), "b".to_string()];
        let interactions = vec![
            Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["a".into(), "b".into()], vec![0.5, 0.5]),
        ];
        let summed = to_payoff_matrix(&players, &interactions, Reduction::Sum);
        assert_eq!(summed.get(0, 1), 1.5);
        assert_eq!(summed.get(1, 0), 0.5);

        let averaged = to_payoff_matrix(&players, &interactions, Reduction::Avg);
        assert_eq!(averaged.get(0, 1), 0.75);
        assert_eq!(averaged.get(1, 0), 0.25);
    }

    #[test]
    fn to_win_matrix_normalizes_to_a_win_rate() {
        let players = vec!["a".to_string(), "b".to_string()];
        let interactions = vec![
            Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["a".into(), "b".into()], vec![0.0, 1.0]),
        ];
        let raw = to_win_matrix(&players, &interactions, false);
        assert_eq!(raw.get(0, 1), 2.0);
        assert_eq!(raw.get(1, 0), 1.0);

        let normalized = to_win_matrix(&players, &interactions, true);
        assert!((normalized.get(0, 1) - 2.0 / 3.0).abs() < 1e-12);
        assert!((normalized.get(1, 0) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn to_margin_matrix_is_antisymmetric() {
        let players = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let interactions = vec![
            Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["b".into(), "c".into()], vec![1.0, 0.0]),
        ];
        let margin = to_margin_matrix(&players, &interactions);
        assert_eq!(margin.get(0, 1), 2.0);
        assert_eq!(margin.get(1, 0), -2.0);
        for i in 0..3 {
            for j in 0..3 {
                assert!((margin.get(i, j) + margin.get(j, i)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn log_odds_matrix_is_antisymmetric() {
        let players = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let interactions = vec![
            Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]),
            Interaction::new(vec!["b".into(), "c".into()], vec![1.0, 0.0]),
        ];
        let matrix = empirical_log_odds_matrix(&players, &interactions);
        for i in 0..3 {
            for j in 0..3 {
                assert!((matrix.get(i, j) + matrix.get(j, i)).abs() < 1e-12);
            }
        }
    }
}
