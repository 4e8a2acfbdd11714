//! Equilibrium solvers for two-player zero-sum games.
//!
//! [`FictitiousPlay`] is the only implementation today, but the
//! [`NashSolver`] trait keeps the rest of [`super`] independent of how
//! the equilibrium is actually computed, should a more exact method
//! (vertex enumeration, Lemke-Howson) be worth adding later.

use crate::matrix::Matrix;

/// Finds a Nash equilibrium of a two-player zero-sum game given its
/// payoff matrix from the row player's perspective (the column player's
/// payoff is the negated transpose).
pub trait NashSolver {
    /// Returns `(row_strategy, col_strategy)`, each a probability
    /// distribution over that player's strategies.
    fn solve(&self, payoff: &Matrix) -> (Vec<f64>, Vec<f64>);
}

/// Finds an approximate equilibrium by fictitious play: each player
/// repeatedly best-responds to the other's empirical strategy so far,
/// and the time-averaged play converges to a Nash equilibrium for
/// two-player zero-sum games.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct FictitiousPlay {
    /// Number of best-response rounds to run.
    pub iterations: usize,
}

impl FictitiousPlay {
    /// Creates a new fictitious-play solver.
    #[must_use]
    pub fn new(iterations: usize) -> Self {
        FictitiousPlay { iterations }
    }
}

impl Default for FictitiousPlay {
    fn default() -> Self {
        FictitiousPlay::new(crate::constants::NASH_FICTITIOUS_PLAY_ITERATIONS)
    }
}

fn normalize(counts: &[f64]) -> Vec<f64> {
    let sum: f64 = counts.iter().sum();
    counts.iter().map(|c| c / sum).collect()
}

fn best_response_row(payoff: &Matrix, col_dist: &[f64]) -> usize {
    (0..payoff.rows())
        .map(|i| {
            let utility: f64 = (0..payoff.cols()).map(|j| payoff.get(i, j) * col_dist[j]).sum();
            (i, utility)
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map_or(0, |(i, _)| i)
}

fn best_response_col(payoff: &Matrix, row_dist: &[f64]) -> usize {
    (0..payoff.cols())
        .map(|j| {
            let utility: f64 = (0..payoff.rows()).map(|i| -payoff.get(i, j) * row_dist[i]).sum();
            (j, utility)
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map_or(0, |(j, _)| j)
}

impl NashSolver for FictitiousPlay {
    fn solve(&self, payoff: &Matrix) -> (Vec<f64>, Vec<f64>) {
        if payoff.rows() == 0 || payoff.cols() == 0 {
            return (Vec::new(), Vec::new());
        }

        let mut row_counts = vec![1.0; payoff.rows()];
        let mut col_counts = vec![1.0; payoff.cols()];

        for _ in 0..self.iterations {
            let col_dist = normalize(&col_counts);
            row_counts[best_response_row(payoff, &col_dist)] += 1.0;

            let row_dist = normalize(&row_counts);
            col_counts[best_response_col(payoff, &row_dist)] += 1.0;
        }

        (normalize(&row_counts), normalize(&col_counts))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn matching_pennies_converges_to_uniform() {
        let mut payoff = Matrix::zeros(2, 2);
        payoff.set(0, 0, 1.0);
        payoff.set(0, 1, -1.0);
        payoff.set(1, 0, -1.0);
        payoff.set(1, 1, 1.0);

        let solver = FictitiousPlay::new(5_000);
        let (row, col) = solver.solve(&payoff);

        assert!((row[0] - 0.5).abs() < 0.05);
        assert!((col[0] - 0.5).abs() < 0.05);
    }
}
