//! Rating representations shared across algorithms.
//!
//! Every algorithm in this crate has its own rating type, because each
//! algorithm carries its own notion of "uncertainty" (a rating deviation,
//! a volatility, a covariance-free Gaussian). The [`Rate`] trait is the
//! common capability every one of them exposes: a point estimate (`mu`)
//! and a measure of spread (`std`). Algorithms that need more than that
//! (Elo's logarithmic base and spread, TrueSkill's performance variance)
//! layer additional traits or fields on top.

/// A rating's point estimate and uncertainty, common to every
/// specialization in this crate.
pub trait Rate {
    /// The point estimate of skill.
    fn mu(&self) -> f64;
    /// The uncertainty (standard deviation) of the estimate.
    fn std(&self) -> f64;
}

/// A generic, algorithm-agnostic rating: just a mean and a standard
/// deviation. Used as the lowest common denominator when a caller wants
/// to compare ratings produced by different algorithms, or as a seed that
/// `with_defaults` specializes into a concrete rating type.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenericRate {
    mu: f64,
    std: f64,
}

impl GenericRate {
    /// Creates a new generic rating.
    #[must_use]
    pub fn new(mu: f64, std: f64) -> Self {
        GenericRate { mu, std }
    }
}

impl Rate for GenericRate {
    fn mu(&self) -> f64 {
        self.mu
    }

    fn std(&self) -> f64 {
        self.std
    }
}

/// Extra capability of ratings on an Elo-style logarithmic scale: a base
/// and a spread, together defining how a rating difference maps onto
/// expected score.
pub trait EloLike: Rate {
    /// The logarithmic base of the scale (`10` for the classical FIDE
    /// scale).
    fn base(&self) -> f64;
    /// The rating-point difference corresponding to one order of
    /// magnitude of odds under [`base`](Self::base).
    fn spread(&self) -> f64;

    /// The probability this rating is expected to beat `opponent`,
    /// ignoring draws.
    #[must_use]
    fn expected_outcome(&self, opponent: &impl EloLike) -> f64 {
        let exponent = (opponent.mu() - self.mu()) / self.spread();
        1.0 / (1.0 + self.base().powf(exponent))
    }
}

/// An Elo rating: a scalar strength estimate on a logarithmic scale.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EloRate {
    rating: f64,
    base: f64,
    spread: f64,
}

impl EloRate {
    /// Creates a new Elo rating with an explicit base and spread.
    #[must_use]
    pub fn new(rating: f64, base: f64, spread: f64) -> Self {
        EloRate { rating, base, spread }
    }

    /// Creates a new Elo rating using the crate's default base (`10`) and
    /// spread (`400`).
    #[must_use]
    pub fn with_defaults(rating: f64) -> Self {
        EloRate::new(rating, crate::constants::ELO_BASE, crate::constants::ELO_SPREAD)
    }
}

impl Rate for EloRate {
    fn mu(&self) -> f64 {
        self.rating
    }

    /// Elo carries no explicit uncertainty; this is always zero.
    fn std(&self) -> f64 {
        0.0
    }
}

impl EloLike for EloRate {
    fn base(&self) -> f64 {
        self.base
    }

    fn spread(&self) -> f64 {
        self.spread
    }
}

impl From<GenericRate> for EloRate {
    /// Coerces a generic rating into an [`EloRate`] using the crate's
    /// default base and spread. This conversion is always explicit
    /// (`EloRate::from(rate)` or `rate.into()`); a generic rating never
    /// implicitly decays into an Elo rating at a call site that expects
    /// one.
    fn from(generic: GenericRate) -> Self {
        EloRate::with_defaults(generic.mu())
    }
}

/// A Glicko rating on the original (public) scale: a rating and a rating
/// deviation.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlickoRate {
    rating: f64,
    deviation: f64,
}

impl GlickoRate {
    /// Creates a new Glicko rating.
    ///
    /// # Panics
    ///
    /// Panics if `deviation` is not positive.
    #[must_use]
    pub fn new(rating: f64, deviation: f64) -> Self {
        assert!(deviation > 0.0, "deviation <= 0: {deviation}");
        GlickoRate { rating, deviation }
    }

    /// The rating deviation on the original scale.
    #[must_use]
    pub fn deviation(&self) -> f64 {
        self.deviation
    }
}

impl Default for GlickoRate {
    fn default() -> Self {
        GlickoRate::new(
            crate::constants::GLICKO_DEFAULT_RATING,
            crate::constants::GLICKO_DEFAULT_DEVIATION,
        )
    }
}

impl Rate for GlickoRate {
    fn mu(&self) -> f64 {
        self.rating
    }

    fn std(&self) -> f64 {
        self.deviation
    }
}

/// A Glicko-2 rating on the internal scale: a rating, a rating deviation
/// and a volatility.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glicko2Rate {
    rating: f64,
    deviation: f64,
    volatility: f64,
}

impl Glicko2Rate {
    /// Creates a new Glicko-2 rating.
    ///
    /// # Panics
    ///
    /// Panics if `deviation` or `volatility` is not positive.
    #[must_use]
    pub fn new(rating: f64, deviation: f64, volatility: f64) -> Self {
        assert!(deviation > 0.0, "deviation <= 0: {deviation}");
        assert!(volatility > 0.0, "volatility <= 0: {volatility}");
        Glicko2Rate {
            rating,
            deviation,
            volatility,
        }
    }

    /// The rating deviation on the internal Glicko-2 scale.
    #[must_use]
    pub fn deviation(&self) -> f64 {
        self.deviation
    }

    /// The volatility: how erratic the player's performance is expected
    /// to be from one rating period to the next.
    #[must_use]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Converts a public-scale [`GlickoRate`] to the internal Glicko-2
    /// scale, anchored at [`GLICKO2_ANCHOR_MU`](crate::constants::GLICKO2_ANCHOR_MU).
    #[must_use]
    pub fn from_glicko(glicko: GlickoRate, volatility: f64) -> Self {
        let ratio = crate::constants::GLICKO2_RATING_SCALING_RATIO;
        let anchor = crate::constants::GLICKO2_ANCHOR_MU;
        Glicko2Rate::new(
            (glicko.mu() - anchor) / ratio,
            glicko.deviation() / ratio,
            volatility,
        )
    }

    /// Converts this internal-scale rating back to the public Glicko
    /// scale.
    #[must_use]
    pub fn to_glicko(self) -> GlickoRate {
        let ratio = crate::constants::GLICKO2_RATING_SCALING_RATIO;
        let anchor = crate::constants::GLICKO2_ANCHOR_MU;
        GlickoRate::new(self.rating * ratio + anchor, self.deviation * ratio)
    }
}

impl Default for Glicko2Rate {
    fn default() -> Self {
        Glicko2Rate::from_glicko(GlickoRate::default(), crate::constants::GLICKO2_DEFAULT_VOLATILITY)
    }
}

impl Rate for Glicko2Rate {
    fn mu(&self) -> f64 {
        self.rating
    }

    fn std(&self) -> f64 {
        self.deviation
    }
}

/// A TrueSkill rating: a Gaussian belief over a player's skill.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrueSkillRate {
    mu: f64,
    sigma: f64,
}

impl TrueSkillRate {
    /// Creates a new TrueSkill rating.
    ///
    /// # Panics
    ///
    /// Panics if `sigma` is not positive.
    #[must_use]
    pub fn new(mu: f64, sigma: f64) -> Self {
        assert!(sigma > 0.0, "sigma <= 0: {sigma}");
        TrueSkillRate { mu, sigma }
    }

    /// A conservative, single-number skill estimate: `mu - 3 * sigma`,
    /// the value TrueSkill's leaderboard ranking conventionally sorts on.
    #[must_use]
    pub fn conservative_rating(&self) -> f64 {
        self.mu - 3.0 * self.sigma
    }
}

impl Default for TrueSkillRate {
    fn default() -> Self {
        TrueSkillRate::new(crate::constants::TRUESKILL_MU, crate::constants::TRUESKILL_SIGMA)
    }
}

impl Rate for TrueSkillRate {
    fn mu(&self) -> f64 {
        self.mu
    }

    fn std(&self) -> f64 {
        self.sigma
    }
}

/// A multidimensional Elo (mElo) rating: a scalar Elo-like component plus
/// a small number of orthogonal "non-transitive" dimensions used in pairs
/// to capture rock-paper-scissors-style cyclic dominance.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultidimEloRate {
    rating: f64,
    dims: Vec<f64>,
}

impl MultidimEloRate {
    /// Creates a new mElo rating with `k` orthogonal dimensions,
    /// initialized to zero.
    #[must_use]
    pub fn new(rating: f64, k: usize) -> Self {
        MultidimEloRate {
            rating,
            dims: vec![0.0; k],
        }
    }

    /// The non-transitive rating dimensions.
    #[must_use]
    pub fn dims(&self) -> &[f64] {
        &self.dims
    }

    /// Mutable access to the non-transitive rating dimensions, used by
    /// [`crate::melo`]'s update rule.
    pub(crate) fn dims_mut(&mut self) -> &mut [f64] {
        &mut self.dims
    }
}

impl Default for MultidimEloRate {
    fn default() -> Self {
        MultidimEloRate::new(crate::constants::ELO_DEFAULT_RATING, crate::constants::MELO_K_DIMENSIONS)
    }
}

impl Rate for MultidimEloRate {
    fn mu(&self) -> f64 {
        self.rating
    }

    fn std(&self) -> f64 {
        0.0
    }
}
