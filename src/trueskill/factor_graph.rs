//! The Gaussian factor graph TrueSkill's expectation-propagation update
//! runs over: a prior per rating, a likelihood linking rating to
//! per-game performance, sum factors aggregating team performance and
//! team-performance differences, and a truncation factor folding in the
//! observed win/draw/loss outcome.
//!
//! Variables are addressed by index into a [`FactorGraph`] rather than
//! shared pointers, and each factor remembers the last message it sent to
//! each of its variables, mirroring the per-`(variable, factor)` message
//! store of the reference implementation without needing interior
//! mutability.

use crate::math::{normal_cdf, normal_pdf};

/// A Gaussian in canonical (precision, precision-adjusted mean) form,
/// which makes both multiplication and division between Gaussians a
/// simple addition/subtraction of their parameters.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub(crate) struct Gaussian {
    pi: f64,
    tau: f64,
}

impl Gaussian {
    pub(crate) fn from_pi_tau(pi: f64, tau: f64) -> Self {
        Gaussian { pi, tau }
    }

    pub(crate) fn from_mu_sigma(mu: f64, sigma: f64) -> Self {
        let pi = 1.0 / (sigma * sigma);
        Gaussian { pi, tau: pi * mu }
    }

    pub(crate) fn mu(self) -> f64 {
        if self.pi == 0.0 {
            0.0
        } else {
            self.tau / self.pi
        }
    }

    pub(crate) fn sigma(self) -> f64 {
        (1.0 / self.pi).sqrt()
    }

    fn mul(self, other: Gaussian) -> Gaussian {
        Gaussian::from_pi_tau(self.pi + other.pi, self.tau + other.tau)
    }

    fn div(self, other: Gaussian) -> Gaussian {
        Gaussian::from_pi_tau(self.pi - other.pi, self.tau - other.tau)
    }
}

fn delta(a: Gaussian, b: Gaussian) -> f64 {
    let pi_delta = (a.pi - b.pi).abs();
    if pi_delta.is_infinite() {
        return 0.0;
    }
    f64::max((a.tau - b.tau).abs(), pi_delta.sqrt())
}

/// The factor graph: a flat arena of Gaussian-valued variables plus,
/// for each variable, the last message received from each incident
/// factor (keyed by that factor's id).
pub(crate) struct FactorGraph {
    variables: Vec<Gaussian>,
    messages: Vec<Vec<(usize, Gaussian)>>,
    next_factor_id: usize,
}

impl FactorGraph {
    pub(crate) fn new() -> Self {
        FactorGraph {
            variables: Vec::new(),
            messages: Vec::new(),
            next_factor_id: 0,
        }
    }

    pub(crate) fn new_variable(&mut self) -> usize {
        self.variables.push(Gaussian::default());
        self.messages.push(Vec::new());
        self.variables.len() - 1
    }

    pub(crate) fn new_factor_id(&mut self) -> usize {
        let id = self.next_factor_id;
        self.next_factor_id += 1;
        id
    }

    pub(crate) fn marginal(&self, var: usize) -> Gaussian {
        self.variables[var]
    }

    fn message(&self, var: usize, factor: usize) -> Gaussian {
        self.messages[var]
            .iter()
            .find(|(id, _)| *id == factor)
            .map_or_else(Gaussian::default, |(_, msg)| *msg)
    }

    fn set_message(&mut self, var: usize, factor: usize, msg: Gaussian) {
        if let Some(slot) = self.messages[var].iter_mut().find(|(id, _)| *id == factor) {
            slot.1 = msg;
        } else {
            self.messages[var].push((factor, msg));
        }
    }

    /// Directly sets `var`'s marginal to `value`, recording the implied
    /// message from `factor` and returning how far the marginal moved.
    fn update_value(&mut self, var: usize, factor: usize, value: Gaussian) -> f64 {
        let old_message = self.message(var, factor);
        let current = self.variables[var];
        let new_message = value.mul(old_message).div(current);
        self.set_message(var, factor, new_message);
        let moved = delta(current, value);
        self.variables[var] = value;
        moved
    }

    /// Updates the message `factor` sends to `var` to `(pi, tau)`, then
    /// recomputes `var`'s marginal from its (now updated) incoming
    /// messages and returns how far the marginal moved.
    fn update_message(&mut self, var: usize, factor: usize, pi: f64, tau: f64) -> f64 {
        let message = Gaussian::from_pi_tau(pi, tau);
        let old_message = self.message(var, factor);
        self.set_message(var, factor, message);
        let current = self.variables[var];
        let new_value = current.div(old_message).mul(message);
        let moved = delta(current, new_value);
        self.variables[var] = new_value;
        moved
    }
}

/// A Gaussian prior on a player's rating, with an added per-period
/// dynamic variance modelling skill drift.
pub(crate) struct PriorFactor {
    variable: usize,
    factor_id: usize,
    mu: f64,
    sigma: f64,
    dynamic_variance: f64,
}

impl PriorFactor {
    pub(crate) fn new(graph: &mut FactorGraph, variable: usize, mu: f64, sigma: f64, dynamic_variance: f64) -> Self {
        PriorFactor {
            variable,
            factor_id: graph.new_factor_id(),
            mu,
            sigma,
            dynamic_variance,
        }
    }

    pub(crate) fn pass_message_down(&self, graph: &mut FactorGraph) -> f64 {
        let sigma = (self.sigma * self.sigma + self.dynamic_variance * self.dynamic_variance).sqrt();
        let value = Gaussian::from_mu_sigma(self.mu, sigma);
        graph.update_value(self.variable, self.factor_id, value)
    }
}

/// Links a rating variable to a per-game performance variable through a
/// fixed performance variance (`beta^2`).
pub(crate) struct LikelihoodFactor {
    mean: usize,
    value: usize,
    factor_id: usize,
    variance: f64,
}

impl LikelihoodFactor {
    pub(crate) fn new(graph: &mut FactorGraph, mean: usize, value: usize, variance: f64) -> Self {
        LikelihoodFactor {
            mean,
            value,
            factor_id: graph.new_factor_id(),
            variance,
        }
    }

    pub(crate) fn pass_message_down(&self, graph: &mut FactorGraph) -> f64 {
        let msg = graph.marginal(self.mean).div(graph.message(self.mean, self.factor_id));
        let a = 1.0 / (1.0 + self.variance * msg.pi);
        graph.update_message(self.value, self.factor_id, a * msg.pi, a * msg.tau)
    }

    pub(crate) fn pass_message_up(&self, graph: &mut FactorGraph) -> f64 {
        let msg = graph.marginal(self.value).div(graph.message(self.value, self.factor_id));
        let a = 1.0 / (1.0 + self.variance * msg.pi);
        graph.update_message(self.mean, self.factor_id, a * msg.pi, a * msg.tau)
    }
}

impl FactorGraph {
    fn message_at(&self, var: usize, factor: usize) -> Gaussian {
        self.message(var, factor)
    }
}

/// Sums (or differences) a set of term variables into a `sum` variable,
/// weighted per term. With weight `1` per term this is a plain sum;
/// team-difference factors use weights `[1, -1]`.
pub(crate) struct SumFactor {
    sum: usize,
    terms: Vec<usize>,
    weights: Vec<f64>,
    factor_id: usize,
}

impl SumFactor {
    pub(crate) fn new(graph: &mut FactorGraph, sum: usize, terms: Vec<usize>, weights: Vec<f64>) -> Self {
        SumFactor {
            sum,
            terms,
            weights,
            factor_id: graph.new_factor_id(),
        }
    }

    pub(crate) fn pass_message_down(&self, graph: &mut FactorGraph) -> f64 {
        let msgs: Vec<Gaussian> = self.terms.iter().map(|&t| graph.message_at(t, self.factor_id)).collect();
        self.update(graph, self.sum, &self.terms, &msgs, &self.weights)
    }

    pub(crate) fn pass_message_up(&self, graph: &mut FactorGraph, index: usize) -> f64 {
        let weight = self.weights[index];
        let weights: Vec<f64> = self
            .weights
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                if weight == 0.0 {
                    0.0
                } else if i == index {
                    1.0 / weight
                } else {
                    -w / weight
                }
            })
            .collect();

        let mut values = self.terms.clone();
        values[index] = self.sum;
        let msgs: Vec<Gaussian> = values.iter().map(|&v| graph.message_at(v, self.factor_id)).collect();
        self.update(graph, self.terms[index], &values, &msgs, &weights)
    }

    fn update(
        &self,
        graph: &mut FactorGraph,
        target: usize,
        values: &[usize],
        msgs: &[Gaussian],
        weights: &[f64],
    ) -> f64 {
        let mut pi_inv = 0.0_f64;
        let mut mu = 0.0_f64;

        for ((&value, &msg), &weight) in values.iter().zip(msgs).zip(weights) {
            let div = graph.marginal(value).div(msg);
            mu += weight * div.mu();
            if pi_inv.is_infinite() {
                continue;
            }
            pi_inv += if div.pi == 0.0 { f64::INFINITY } else { weight * weight / div.pi };
        }

        let pi = 1.0 / pi_inv;
        let tau = pi * mu;
        graph.update_message(target, self.factor_id, pi, tau)
    }
}

/// Folds the observed win/draw outcome into a team-difference variable
/// by truncating its Gaussian marginal against a draw margin.
pub(crate) struct TruncateFactor {
    variable: usize,
    factor_id: usize,
    draw_margin: f64,
    is_draw: bool,
}

impl TruncateFactor {
    pub(crate) fn new(graph: &mut FactorGraph, variable: usize, draw_margin: f64, is_draw: bool) -> Self {
        TruncateFactor {
            variable,
            factor_id: graph.new_factor_id(),
            draw_margin,
            is_draw,
        }
    }

    pub(crate) fn pass_message_up(&self, graph: &mut FactorGraph) -> f64 {
        let div = graph.marginal(self.variable).div(graph.message(self.variable, self.factor_id));
        let sqrt_pi = div.pi.sqrt();
        let diff = div.tau / sqrt_pi;
        let draw_margin = self.draw_margin * sqrt_pi;

        let (v, w) = if self.is_draw {
            (v_draw(diff, draw_margin), w_draw(diff, draw_margin))
        } else {
            (v_win(diff, draw_margin), w_win(diff, draw_margin))
        };

        let denom = 1.0 - w;
        let pi = div.pi / denom;
        let tau = (div.tau + sqrt_pi * v) / denom;
        graph.update_value(self.variable, self.factor_id, Gaussian::from_pi_tau(pi, tau))
    }
}

fn v_win(diff: f64, draw_margin: f64) -> f64 {
    let x = diff - draw_margin;
    let denom = normal_cdf(x);
    if denom > 0.0 {
        normal_pdf(x) / denom
    } else {
        -x
    }
}

fn v_draw(diff: f64, draw_margin: f64) -> f64 {
    let abs_diff = diff.abs();
    let a = draw_margin - abs_diff;
    let b = -draw_margin - abs_diff;
    let denom = normal_cdf(a) - normal_cdf(b);
    let numer = normal_pdf(b) - normal_pdf(a);
    let value = if denom > 0.0 { numer / denom } else { a };
    if diff < 0.0 {
        -value
    } else {
        value
    }
}

fn w_win(diff: f64, draw_margin: f64) -> f64 {
    let x = diff - draw_margin;
    let v = v_win(diff, draw_margin);
    v * (v + x)
}

fn w_draw(diff: f64, draw_margin: f64) -> f64 {
    let abs_diff = diff.abs();
    let a = draw_margin - abs_diff;
    let b = -draw_margin - abs_diff;
    let denom = normal_cdf(a) - normal_cdf(b);
    let v = v_draw(abs_diff, draw_margin);
    v * v + (a * normal_pdf(a) - b * normal_pdf(b)) / denom
}
