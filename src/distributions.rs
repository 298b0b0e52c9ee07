//! The distribution catalog used by the diagnostics.
//!
//! Seven continuous families, each with log-density, CDF and a
//! maximum-likelihood `fit`.
//!
//! # Supported Distributions
//!
//! | Family | Parameters | Support | Estimator |
//! |---|---|---|---|
//! | [`Normal`] | μ, σ | ℝ | closed form |
//! | [`LogNormal`] | μ, σ, loc | x > loc | closed form on ln(x − loc), profiled loc |
//! | [`Exponential`] | loc, scale | x ≥ loc | closed form |
//! | [`Gamma`] | shape, loc, scale | x > loc | Newton on the shape, profiled loc |
//! | [`Weibull`] | shape, loc, scale | x > loc | safeguarded Newton on the shape, profiled loc |
//! | [`Laplace`] | loc, scale | ℝ | closed form (median, mean abs. dev.) |
//! | [`StudentT`] | df, loc, scale | ℝ | EM for loc/scale, golden section on df |
//!
//! The three shifted families estimate their location below `min(x)`, so
//! zeros and negative values do not exclude them. Each also exposes
//! `fit_with_location` for a fixed, known location.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{DistributionError, FitError};
use crate::special;
use crate::stats;

const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_8;

// ============================================================================
// Catalog
// ============================================================================

/// A family in the fixed fitting catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionKind {
    Normal,
    Lognormal,
    Exponential,
    Gamma,
    Weibull,
    Laplace,
    StudentT,
}

impl DistributionKind {
    /// Catalog in fitting order.
    pub const CATALOG: [DistributionKind; 7] = [
        DistributionKind::Normal,
        DistributionKind::Lognormal,
        DistributionKind::Exponential,
        DistributionKind::Gamma,
        DistributionKind::Weibull,
        DistributionKind::Laplace,
        DistributionKind::StudentT,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DistributionKind::Normal => "Normal",
            DistributionKind::Lognormal => "Lognormal",
            DistributionKind::Exponential => "Exponential",
            DistributionKind::Gamma => "Gamma",
            DistributionKind::Weibull => "Weibull",
            DistributionKind::Laplace => "Laplace",
            DistributionKind::StudentT => "StudentT",
        }
    }

    /// Whether the candidate is fitted on the positive subset of a sample.
    pub fn requires_positive_subset(self) -> bool {
        matches!(self, DistributionKind::Lognormal)
    }

    /// Number of fitted parameters (the `k` of AIC).
    pub fn parameter_count(self) -> usize {
        match self {
            DistributionKind::Normal | DistributionKind::Exponential | DistributionKind::Laplace => 2,
            DistributionKind::Lognormal
            | DistributionKind::Gamma
            | DistributionKind::Weibull
            | DistributionKind::StudentT => 3,
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for DistributionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A catalog distribution with fitted parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum FittedDistribution {
    Normal(Normal),
    LogNormal(LogNormal),
    Exponential(Exponential),
    Gamma(Gamma),
    Weibull(Weibull),
    Laplace(Laplace),
    StudentT(StudentT),
}

impl FittedDistribution {
    /// Fits `kind` to `data` by maximum likelihood.
    ///
    /// `data` must be free of NaN; the positive-subset restriction for
    /// Lognormal is the caller's responsibility.
    pub fn fit(kind: DistributionKind, data: &[f64]) -> Result<Self, FitError> {
        Ok(match kind {
            DistributionKind::Normal => Self::Normal(Normal::fit(data)?),
            DistributionKind::Lognormal => Self::LogNormal(LogNormal::fit(data)?),
            DistributionKind::Exponential => Self::Exponential(Exponential::fit(data)?),
            DistributionKind::Gamma => Self::Gamma(Gamma::fit(data)?),
            DistributionKind::Weibull => Self::Weibull(Weibull::fit(data)?),
            DistributionKind::Laplace => Self::Laplace(Laplace::fit(data)?),
            DistributionKind::StudentT => Self::StudentT(StudentT::fit(data)?),
        })
    }

    pub fn kind(&self) -> DistributionKind {
        match self {
            Self::Normal(_) => DistributionKind::Normal,
            Self::LogNormal(_) => DistributionKind::Lognormal,
            Self::Exponential(_) => DistributionKind::Exponential,
            Self::Gamma(_) => DistributionKind::Gamma,
            Self::Weibull(_) => DistributionKind::Weibull,
            Self::Laplace(_) => DistributionKind::Laplace,
            Self::StudentT(_) => DistributionKind::StudentT,
        }
    }

    /// Fitted parameter tuple, in the order listed in the module table.
    pub fn params(&self) -> Vec<f64> {
        match self {
            Self::Normal(d) => vec![d.mu, d.sigma],
            Self::LogNormal(d) => vec![d.mu, d.sigma, d.loc],
            Self::Exponential(d) => vec![d.loc, d.scale],
            Self::Gamma(d) => vec![d.shape, d.loc, d.scale],
            Self::Weibull(d) => vec![d.shape, d.loc, d.scale],
            Self::Laplace(d) => vec![d.loc, d.scale],
            Self::StudentT(d) => vec![d.df, d.loc, d.scale],
        }
    }

    pub fn ln_pdf(&self, x: f64) -> f64 {
        match self {
            Self::Normal(d) => d.ln_pdf(x),
            Self::LogNormal(d) => d.ln_pdf(x),
            Self::Exponential(d) => d.ln_pdf(x),
            Self::Gamma(d) => d.ln_pdf(x),
            Self::Weibull(d) => d.ln_pdf(x),
            Self::Laplace(d) => d.ln_pdf(x),
            Self::StudentT(d) => d.ln_pdf(x),
        }
    }

    pub fn pdf(&self, x: f64) -> f64 {
        self.ln_pdf(x).exp()
    }

    pub fn cdf(&self, x: f64) -> f64 {
        match self {
            Self::Normal(d) => d.cdf(x),
            Self::LogNormal(d) => d.cdf(x),
            Self::Exponential(d) => d.cdf(x),
            Self::Gamma(d) => d.cdf(x),
            Self::Weibull(d) => d.cdf(x),
            Self::Laplace(d) => d.cdf(x),
            Self::StudentT(d) => d.cdf(x),
        }
    }

    /// Sum of log-densities over `data`.
    ///
    /// # Errors
    /// [`FitError::NonFiniteLikelihood`] if any point has zero density.
    pub fn log_likelihood(&self, data: &[f64]) -> Result<f64, FitError> {
        let ll: f64 = data.iter().map(|&x| self.ln_pdf(x)).sum();
        if ll.is_finite() {
            Ok(ll)
        } else {
            Err(FitError::NonFiniteLikelihood {
                family: self.kind().name(),
            })
        }
    }
}

fn require_len(data: &[f64], required: usize) -> Result<(), FitError> {
    if data.len() < required {
        return Err(FitError::InsufficientData {
            required,
            available: data.len(),
        });
    }
    Ok(())
}

/// Requires every value to lie strictly above `loc`.
fn require_above(data: &[f64], loc: f64, family: &'static str) -> Result<(), FitError> {
    if data.iter().any(|&x| x <= loc) {
        return Err(FitError::NonPositiveSample { family });
    }
    Ok(())
}

fn require_scale(name: &str, scale: f64) -> Result<(), DistributionError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(DistributionError::InvalidParameters(format!(
            "{name} requires finite scale > 0, got {scale}"
        )));
    }
    Ok(())
}

fn require_finite(name: &str, value: f64) -> Result<(), DistributionError> {
    if !value.is_finite() {
        return Err(DistributionError::InvalidParameters(format!(
            "{name} requires finite location, got {value}"
        )));
    }
    Ok(())
}

// ============================================================================
// Location profiling
// ============================================================================

/// Search range for the location offset `δ = min(x) − loc`, as multiples of
/// the sample range.
const LOC_OFFSET_SPAN: (f64, f64) = (1e-3, 1e3);
const LOC_GRID_POINTS: usize = 25;
const LOC_GOLDEN_ITER: usize = 40;

type Profiled<T> = Option<(f64, T)>;

fn better<T>(a: Profiled<T>, b: Profiled<T>) -> Profiled<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.0 > a.0 { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

fn profiled_ll<T>(a: &Profiled<T>) -> f64 {
    a.as_ref().map_or(f64::NEG_INFINITY, |(ll, _)| *ll)
}

/// Maximizes the profile log-likelihood of a shifted family over its
/// location.
///
/// # Algorithm
/// `fit_at(loc)` fits the remaining parameters at a fixed location and
/// returns the fit with its log-likelihood. The offset `δ = min(x) − loc`
/// is scanned on a log-spaced grid over `range · [1e-3, 1e3]`, and the best
/// grid point is refined by golden-section search between its neighbours.
/// For a positive sample `loc = 0` is always a candidate too, so the result
/// is never worse than the unshifted fit.
///
/// The likelihood of these families can grow without bound as `loc`
/// approaches `min(x)`; the lower end of the offset range keeps the
/// search away from that degenerate edge.
fn profile_location<T, F>(data: &[f64], family: &'static str, fit_at: F) -> Result<T, FitError>
where
    F: Fn(f64) -> Result<(T, f64), FitError>,
{
    let non_finite = FitError::DegenerateSample {
        family,
        reason: "non-finite values",
    };
    let x_min = stats::min(data).ok_or_else(|| non_finite.clone())?;
    let x_max = stats::max(data).ok_or(non_finite)?;
    let range = x_max - x_min;
    if range <= 0.0 || !range.is_finite() {
        return Err(FitError::DegenerateSample {
            family,
            reason: "zero spread",
        });
    }

    let eval = |loc: f64| -> Profiled<T> {
        match fit_at(loc) {
            Ok((fitted, ll)) if ll.is_finite() => Some((ll, fitted)),
            _ => None,
        }
    };
    let at_offset = |ln_delta: f64| eval(x_min - ln_delta.exp());

    let lo = (range * LOC_OFFSET_SPAN.0).ln();
    let hi = (range * LOC_OFFSET_SPAN.1).ln();
    let step = (hi - lo) / (LOC_GRID_POINTS - 1) as f64;

    let mut best: Profiled<T> = None;
    let mut best_t = lo;
    for i in 0..LOC_GRID_POINTS {
        let t = lo + step * i as f64;
        let candidate = at_offset(t);
        if profiled_ll(&candidate) > profiled_ll(&best) {
            best = candidate;
            best_t = t;
        }
    }
    if best.is_none() {
        return Err(FitError::NoConvergence {
            family,
            iterations: LOC_GRID_POINTS,
        });
    }

    let inv_phi = (5.0_f64.sqrt() - 1.0) / 2.0;
    let mut a = (best_t - step).max(lo);
    let mut b = (best_t + step).min(hi);
    let mut c = b - inv_phi * (b - a);
    let mut d = a + inv_phi * (b - a);
    let mut fc = at_offset(c);
    let mut fd = at_offset(d);
    for _ in 0..LOC_GOLDEN_ITER {
        if profiled_ll(&fc) >= profiled_ll(&fd) {
            b = d;
            d = c;
            fd = fc;
            c = b - inv_phi * (b - a);
            fc = at_offset(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + inv_phi * (b - a);
            fd = at_offset(d);
        }
    }
    best = better(best, better(fc, fd));
    if x_min > 0.0 {
        best = better(best, eval(0.0));
    }
    best.map(|(_, fitted)| fitted).ok_or(FitError::NoConvergence {
        family,
        iterations: LOC_GOLDEN_ITER,
    })
}

// ============================================================================
// Normal Distribution
// ============================================================================

/// Normal (Gaussian) distribution N(μ, σ²).
///
/// MLE: μ̂ = sample mean, σ̂ = population standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// # Errors
    /// Returns `Err` if `sigma ≤ 0` or parameters are not finite.
    pub fn new(mu: f64, sigma: f64) -> Result<Self, DistributionError> {
        require_finite("Normal", mu)?;
        require_scale("Normal", sigma)?;
        Ok(Self { mu, sigma })
    }

    pub fn fit(data: &[f64]) -> Result<Self, FitError> {
        require_len(data, 2)?;
        let (mu, sigma) = mean_and_std(data, "Normal")?;
        Ok(Self::new(mu, sigma)?)
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn ln_pdf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        -0.5 * z * z - self.sigma.ln() - LN_SQRT_2PI
    }

    /// CDF: Φ((x−μ)/σ).
    pub fn cdf(&self, x: f64) -> f64 {
        special::standard_normal_cdf((x - self.mu) / self.sigma)
    }
}

fn mean_and_std(data: &[f64], family: &'static str) -> Result<(f64, f64), FitError> {
    let mu = stats::mean(data).ok_or(FitError::DegenerateSample {
        family,
        reason: "non-finite values",
    })?;
    let sigma = stats::population_std_dev(data).unwrap_or(0.0);
    if sigma <= 0.0 {
        return Err(FitError::DegenerateSample {
            family,
            reason: "zero variance",
        });
    }
    Ok((mu, sigma))
}

// ============================================================================
// LogNormal Distribution
// ============================================================================

/// Shifted log-normal distribution: ln(X − loc) ~ N(μ, σ²).
///
/// MLE at a fixed location: μ̂, σ̂ are the mean and population standard
/// deviation of ln(x − loc). [`LogNormal::fit`] profiles the location.
#[derive(Debug, Clone, PartialEq)]
pub struct LogNormal {
    mu: f64,
    sigma: f64,
    loc: f64,
}

impl LogNormal {
    /// Unshifted log-normal (`loc = 0`).
    ///
    /// # Errors
    /// Returns `Err` if `sigma ≤ 0` or parameters are not finite.
    pub fn new(mu: f64, sigma: f64) -> Result<Self, DistributionError> {
        Self::shifted(mu, sigma, 0.0)
    }

    pub fn shifted(mu: f64, sigma: f64, loc: f64) -> Result<Self, DistributionError> {
        require_finite("LogNormal", mu)?;
        require_scale("LogNormal", sigma)?;
        require_finite("LogNormal", loc)?;
        Ok(Self { mu, sigma, loc })
    }

    /// Fits μ, σ and the location.
    pub fn fit(data: &[f64]) -> Result<Self, FitError> {
        require_len(data, 3)?;
        profile_location(data, "Lognormal", |loc| {
            let d = Self::fit_with_location(data, loc)?;
            let ll: f64 = data.iter().map(|&x| d.ln_pdf(x)).sum();
            Ok((d, ll))
        })
    }

    /// Fits μ and σ with the location held at `loc`.
    ///
    /// # Errors
    /// [`FitError::NonPositiveSample`] unless every value exceeds `loc`.
    pub fn fit_with_location(data: &[f64], loc: f64) -> Result<Self, FitError> {
        require_len(data, 2)?;
        require_above(data, loc, "Lognormal")?;
        let logs: Vec<f64> = data.iter().map(|x| (x - loc).ln()).collect();
        let (mu, sigma) = mean_and_std(&logs, "Lognormal")?;
        Ok(Self::shifted(mu, sigma, loc)?)
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn ln_pdf(&self, x: f64) -> f64 {
        let y = x - self.loc;
        if y <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let ln_y = y.ln();
        let z = (ln_y - self.mu) / self.sigma;
        -0.5 * z * z - ln_y - self.sigma.ln() - LN_SQRT_2PI
    }

    /// CDF: Φ((ln(x − loc) − μ)/σ) for x > loc.
    pub fn cdf(&self, x: f64) -> f64 {
        let y = x - self.loc;
        if y <= 0.0 {
            return 0.0;
        }
        special::standard_normal_cdf((y.ln() - self.mu) / self.sigma)
    }
}

// ============================================================================
// Exponential Distribution
// ============================================================================

/// Shifted exponential distribution with density `e^{−(x−loc)/scale} / scale`
/// for `x ≥ loc`.
///
/// MLE: loĉ = min(x), scalê = mean(x) − min(x).
#[derive(Debug, Clone, PartialEq)]
pub struct Exponential {
    loc: f64,
    scale: f64,
}

impl Exponential {
    pub fn new(loc: f64, scale: f64) -> Result<Self, DistributionError> {
        require_finite("Exponential", loc)?;
        require_scale("Exponential", scale)?;
        Ok(Self { loc, scale })
    }

    pub fn fit(data: &[f64]) -> Result<Self, FitError> {
        require_len(data, 2)?;
        let degenerate = FitError::DegenerateSample {
            family: "Exponential",
            reason: "zero spread",
        };
        let loc = stats::min(data).ok_or_else(|| degenerate.clone())?;
        let mean = stats::mean(data).ok_or_else(|| degenerate.clone())?;
        let scale = mean - loc;
        if scale <= 0.0 {
            return Err(degenerate);
        }
        Ok(Self::new(loc, scale)?)
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn ln_pdf(&self, x: f64) -> f64 {
        if x < self.loc {
            return f64::NEG_INFINITY;
        }
        -(x - self.loc) / self.scale - self.scale.ln()
    }

    pub fn cdf(&self, x: f64) -> f64 {
        if x <= self.loc {
            return 0.0;
        }
        -(-(x - self.loc) / self.scale).exp_m1()
    }
}

// ============================================================================
// Gamma Distribution
// ============================================================================

/// Shifted gamma distribution with shape `k`, location `loc` and scale `θ`.
///
/// # Estimation
/// At a fixed location, with `yᵢ = xᵢ − loc` and
/// `s = ln(ȳ) − mean(ln y)`, the shape solves `ln k − ψ(k) = s`.
/// Newton's method starts from Thom's (1958) approximation
/// `k₀ = (3 − s + √((s − 3)² + 24s)) / (12s)`; then `θ̂ = ȳ / k̂`.
/// [`Gamma::fit`] profiles the location.
///
/// Reference: Minka (2002), "Estimating a Gamma distribution".
#[derive(Debug, Clone, PartialEq)]
pub struct Gamma {
    shape: f64,
    loc: f64,
    scale: f64,
}

impl Gamma {
    const MAX_ITER: usize = 100;

    /// Unshifted gamma (`loc = 0`).
    pub fn new(shape: f64, scale: f64) -> Result<Self, DistributionError> {
        Self::shifted(shape, 0.0, scale)
    }

    pub fn shifted(shape: f64, loc: f64, scale: f64) -> Result<Self, DistributionError> {
        require_scale("Gamma shape", shape)?;
        require_finite("Gamma", loc)?;
        require_scale("Gamma", scale)?;
        Ok(Self { shape, loc, scale })
    }

    /// Fits shape, location and scale.
    pub fn fit(data: &[f64]) -> Result<Self, FitError> {
        require_len(data, 3)?;
        profile_location(data, "Gamma", |loc| {
            let d = Self::fit_with_location(data, loc)?;
            let ll: f64 = data.iter().map(|&x| d.ln_pdf(x)).sum();
            Ok((d, ll))
        })
    }

    /// Fits shape and scale with the location held at `loc`.
    ///
    /// # Errors
    /// [`FitError::NonPositiveSample`] unless every value exceeds `loc`.
    pub fn fit_with_location(data: &[f64], loc: f64) -> Result<Self, FitError> {
        require_len(data, 2)?;
        require_above(data, loc, "Gamma")?;
        let y: Vec<f64> = data.iter().map(|&x| x - loc).collect();
        let nf = y.len() as f64;
        let mean = stats::kahan_sum(&y) / nf;
        let mean_ln = y.iter().map(|v| v.ln()).sum::<f64>() / nf;
        let s = mean.ln() - mean_ln;
        if !s.is_finite() || s <= 1e-12 {
            return Err(FitError::DegenerateSample {
                family: "Gamma",
                reason: "zero spread",
            });
        }

        let mut k = (3.0 - s + ((s - 3.0).powi(2) + 24.0 * s).sqrt()) / (12.0 * s);
        let mut converged = false;
        for _ in 0..Self::MAX_ITER {
            let f = k.ln() - special::digamma(k) - s;
            // rounding floor of ln k − ψ(k)
            if f.abs() <= 4.0 * f64::EPSILON * k.ln().abs().max(1.0) {
                converged = true;
                break;
            }
            let df = 1.0 / k - special::trigamma(k);
            let mut next = k - f / df;
            if !next.is_finite() || next <= 0.0 {
                next = k / 2.0;
            }
            let done = (next - k).abs() <= 1e-10 * k;
            k = next;
            if done {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(FitError::NoConvergence {
                family: "Gamma",
                iterations: Self::MAX_ITER,
            });
        }
        Ok(Self::shifted(k, loc, mean / k)?)
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn ln_pdf(&self, x: f64) -> f64 {
        let y = x - self.loc;
        if y <= 0.0 {
            return f64::NEG_INFINITY;
        }
        (self.shape - 1.0) * y.ln()
            - y / self.scale
            - special::ln_gamma(self.shape)
            - self.shape * self.scale.ln()
    }

    /// CDF: P(k, (x − loc)/θ), the regularized lower incomplete gamma.
    pub fn cdf(&self, x: f64) -> f64 {
        special::regularized_lower_gamma(self.shape, (x - self.loc) / self.scale)
    }
}

// ============================================================================
// Weibull Distribution
// ============================================================================

/// Shifted Weibull (minimum) distribution with shape `k`, location `loc`
/// and scale `λ`.
///
/// # Estimation
/// At a fixed location the shape solves the profile equation
/// ```text
/// g(k) = Σ yᵢᵏ ln yᵢ / Σ yᵢᵏ − 1/k − mean(ln yᵢ) = 0
/// ```
/// with `yᵢ = (xᵢ − loc) / max(x − loc)` for overflow safety. `g` is
/// increasing in `k`, so Newton steps are kept inside a shrinking bracket
/// and replaced by bisection when they leave it. Then
/// `λ̂ = (mean((x − loc)ᵏ))^{1/k}`. [`Weibull::fit`] profiles the location.
#[derive(Debug, Clone, PartialEq)]
pub struct Weibull {
    shape: f64,
    loc: f64,
    scale: f64,
}

impl Weibull {
    const MAX_ITER: usize = 200;

    /// Unshifted Weibull (`loc = 0`).
    pub fn new(shape: f64, scale: f64) -> Result<Self, DistributionError> {
        Self::shifted(shape, 0.0, scale)
    }

    pub fn shifted(shape: f64, loc: f64, scale: f64) -> Result<Self, DistributionError> {
        require_scale("Weibull shape", shape)?;
        require_finite("Weibull", loc)?;
        require_scale("Weibull", scale)?;
        Ok(Self { shape, loc, scale })
    }

    /// Fits shape, location and scale.
    pub fn fit(data: &[f64]) -> Result<Self, FitError> {
        require_len(data, 3)?;
        profile_location(data, "Weibull", |loc| {
            let d = Self::fit_with_location(data, loc)?;
            let ll: f64 = data.iter().map(|&x| d.ln_pdf(x)).sum();
            Ok((d, ll))
        })
    }

    /// Fits shape and scale with the location held at `loc`.
    ///
    /// # Errors
    /// [`FitError::NonPositiveSample`] unless every value exceeds `loc`.
    pub fn fit_with_location(data: &[f64], loc: f64) -> Result<Self, FitError> {
        require_len(data, 2)?;
        require_above(data, loc, "Weibull")?;
        let y_max = stats::max(data).ok_or(FitError::DegenerateSample {
            family: "Weibull",
            reason: "non-finite values",
        })? - loc;
        let ln_y: Vec<f64> = data.iter().map(|&x| ((x - loc) / y_max).ln()).collect();
        let nf = data.len() as f64;
        let mean_ln = ln_y.iter().sum::<f64>() / nf;
        let sd_ln = stats::population_std_dev(&ln_y).unwrap_or(0.0);
        if sd_ln <= 0.0 {
            return Err(FitError::DegenerateSample {
                family: "Weibull",
                reason: "zero spread",
            });
        }

        // g(k) and g'(k)
        let profile = |k: f64| -> (f64, f64) {
            let mut s0 = 0.0;
            let mut s1 = 0.0;
            let mut s2 = 0.0;
            for &l in &ln_y {
                let w = (k * l).exp();
                s0 += w;
                s1 += w * l;
                s2 += w * l * l;
            }
            let g = s1 / s0 - 1.0 / k - mean_ln;
            let dg = (s2 * s0 - s1 * s1) / (s0 * s0) + 1.0 / (k * k);
            (g, dg)
        };

        // std(ln X) = π / (k√6) for a Weibull variable
        let mut k = std::f64::consts::PI / (6.0_f64.sqrt() * sd_ln);
        let mut lo = 0.0_f64;
        let mut hi = f64::INFINITY;
        let mut converged = false;
        for _ in 0..Self::MAX_ITER {
            let (g, dg) = profile(k);
            if g > 0.0 {
                hi = hi.min(k);
            } else {
                lo = lo.max(k);
            }
            let mut next = k - g / dg;
            if !next.is_finite() || next <= lo || next >= hi {
                next = if hi.is_finite() { 0.5 * (lo + hi) } else { 2.0 * k };
            }
            let done = (next - k).abs() <= 1e-10 * k || hi - lo <= 1e-12 * hi;
            k = next;
            if done {
                converged = true;
                break;
            }
        }
        if !converged || !k.is_finite() {
            return Err(FitError::NoConvergence {
                family: "Weibull",
                iterations: Self::MAX_ITER,
            });
        }
        let mean_yk = ln_y.iter().map(|&l| (k * l).exp()).sum::<f64>() / nf;
        let scale = y_max * mean_yk.powf(1.0 / k);
        Ok(Self::shifted(k, loc, scale)?)
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn ln_pdf(&self, x: f64) -> f64 {
        let y = x - self.loc;
        if y <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let ln_ratio = y.ln() - self.scale.ln();
        self.shape.ln() - self.scale.ln() + (self.shape - 1.0) * ln_ratio
            - (self.shape * ln_ratio).exp()
    }

    pub fn cdf(&self, x: f64) -> f64 {
        let y = x - self.loc;
        if y <= 0.0 {
            return 0.0;
        }
        -(-(y / self.scale).powf(self.shape)).exp_m1()
    }
}

// ============================================================================
// Laplace Distribution
// ============================================================================

/// Laplace (double exponential) distribution.
///
/// MLE: loĉ = median, scalê = mean |x − median|.
#[derive(Debug, Clone, PartialEq)]
pub struct Laplace {
    loc: f64,
    scale: f64,
}

impl Laplace {
    pub fn new(loc: f64, scale: f64) -> Result<Self, DistributionError> {
        require_finite("Laplace", loc)?;
        require_scale("Laplace", scale)?;
        Ok(Self { loc, scale })
    }

    pub fn fit(data: &[f64]) -> Result<Self, FitError> {
        require_len(data, 2)?;
        let loc = stats::median(data).ok_or(FitError::DegenerateSample {
            family: "Laplace",
            reason: "non-finite values",
        })?;
        let deviations: Vec<f64> = data.iter().map(|&x| (x - loc).abs()).collect();
        let scale = stats::mean(&deviations).unwrap_or(0.0);
        if scale <= 0.0 {
            return Err(FitError::DegenerateSample {
                family: "Laplace",
                reason: "zero spread",
            });
        }
        Ok(Self::new(loc, scale)?)
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn ln_pdf(&self, x: f64) -> f64 {
        -(x - self.loc).abs() / self.scale - (2.0 * self.scale).ln()
    }

    pub fn cdf(&self, x: f64) -> f64 {
        let z = (x - self.loc) / self.scale;
        if z < 0.0 {
            0.5 * z.exp()
        } else {
            1.0 - 0.5 * (-z).exp()
        }
    }
}

// ============================================================================
// Student's t Distribution
// ============================================================================

/// Location-scale Student's t distribution.
///
/// # Estimation
/// For a fixed `ν`, loc/scale come from the EM iteration of Liu & Rubin
/// (1995): weights `wᵢ = (ν + 1) / (ν + zᵢ²)`, then weighted mean and
/// weighted variance. `ν` maximizes the resulting profile likelihood by
/// golden-section search over `ln ν ∈ [ln 0.5, ln 200]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentT {
    df: f64,
    loc: f64,
    scale: f64,
}

impl StudentT {
    const EM_ITER: usize = 200;
    const GOLDEN_ITER: usize = 60;
    const MIN_DF: f64 = 0.5;
    const MAX_DF: f64 = 200.0;

    pub fn new(df: f64, loc: f64, scale: f64) -> Result<Self, DistributionError> {
        require_scale("StudentT df", df)?;
        require_finite("StudentT", loc)?;
        require_scale("StudentT", scale)?;
        Ok(Self { df, loc, scale })
    }

    pub fn fit(data: &[f64]) -> Result<Self, FitError> {
        require_len(data, 3)?;
        let (_, sd) = mean_and_std(data, "StudentT")?;
        let start_loc = stats::median(data).unwrap_or(0.0);

        let profile = |ln_df: f64| -> Option<(f64, Self)> {
            let df = ln_df.exp();
            let (loc, scale) = Self::em_location_scale(data, df, start_loc, sd)?;
            let candidate = Self::new(df, loc, scale).ok()?;
            let ll: f64 = data.iter().map(|&x| candidate.ln_pdf(x)).sum();
            ll.is_finite().then_some((ll, candidate))
        };

        let inv_phi = (5.0_f64.sqrt() - 1.0) / 2.0;
        let mut a = Self::MIN_DF.ln();
        let mut b = Self::MAX_DF.ln();
        let mut c = b - inv_phi * (b - a);
        let mut d = a + inv_phi * (b - a);
        let mut fc = profile(c);
        let mut fd = profile(d);
        for _ in 0..Self::GOLDEN_ITER {
            let c_better = match (&fc, &fd) {
                (Some((lc, _)), Some((ld, _))) => lc >= ld,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => {
                    return Err(FitError::NoConvergence {
                        family: "StudentT",
                        iterations: Self::EM_ITER,
                    })
                }
            };
            if c_better {
                b = d;
                d = c;
                fd = fc;
                c = b - inv_phi * (b - a);
                fc = profile(c);
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + inv_phi * (b - a);
                fd = profile(d);
            }
        }

        let best = match (fc, fd) {
            (Some((lc, tc)), Some((ld, td))) => {
                if lc >= ld {
                    tc
                } else {
                    td
                }
            }
            (Some((_, t)), None) | (None, Some((_, t))) => t,
            (None, None) => {
                return Err(FitError::NoConvergence {
                    family: "StudentT",
                    iterations: Self::EM_ITER,
                })
            }
        };
        Ok(best)
    }

    /// EM iterations for location and scale at fixed `df`.
    fn em_location_scale(data: &[f64], df: f64, loc0: f64, scale0: f64) -> Option<(f64, f64)> {
        let nf = data.len() as f64;
        let mut loc = loc0;
        let mut scale = scale0;
        for _ in 0..Self::EM_ITER {
            let mut sw = 0.0;
            let mut swx = 0.0;
            for &x in data {
                let z = (x - loc) / scale;
                let w = (df + 1.0) / (df + z * z);
                sw += w;
                swx += w * x;
            }
            let next_loc = swx / sw;
            let mut swr = 0.0;
            for &x in data {
                let z = (x - loc) / scale;
                let w = (df + 1.0) / (df + z * z);
                let r = x - next_loc;
                swr += w * r * r;
            }
            let next_scale = (swr / nf).sqrt();
            if !next_loc.is_finite() || !next_scale.is_finite() || next_scale <= 0.0 {
                return None;
            }
            let done = (next_loc - loc).abs() <= 1e-10 * scale
                && (next_scale - scale).abs() <= 1e-10 * scale;
            loc = next_loc;
            scale = next_scale;
            if done {
                break;
            }
        }
        Some((loc, scale))
    }

    pub fn df(&self) -> f64 {
        self.df
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn ln_pdf(&self, x: f64) -> f64 {
        let z = (x - self.loc) / self.scale;
        let half = self.df / 2.0;
        special::ln_gamma(half + 0.5)
            - special::ln_gamma(half)
            - 0.5 * (self.df * std::f64::consts::PI).ln()
            - self.scale.ln()
            - (half + 0.5) * (z * z / self.df).ln_1p()
    }

    pub fn cdf(&self, x: f64) -> f64 {
        special::t_distribution_cdf((x - self.loc) / self.scale, self.df)
    }
}
