//! Small numerical primitives shared across algorithms: the logistic
//! sigmoid, and the standard normal CDF/PDF used by Glicko-2's draw
//! margin and TrueSkill's truncation kernels.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// The logistic function `1 / (1 + e^-x)`, computed in a form that stays
/// numerically stable for large `|x|`.
#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// The standard normal cumulative distribution function, `Phi(x)`.
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    standard_normal().cdf(x)
}

/// The standard normal probability density function, `phi(x)`.
#[must_use]
pub fn normal_pdf(x: f64) -> f64 {
    standard_normal().pdf(x)
}

/// The inverse standard normal CDF (the quantile function), `Phi^-1(p)`.
/// Used to turn a draw probability into the draw margin TrueSkill's
/// truncation factors compare team-performance differences against.
#[must_use]
pub fn normal_inverse_cdf(p: f64) -> f64 {
    standard_normal().inverse_cdf(p)
}

fn standard_normal() -> Normal {
    Normal::new(0.0, 1.0).expect("standard normal parameters are always valid")
}
