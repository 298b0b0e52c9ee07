//! Distribution diagnostics: fit the catalog, rank, recommend a method.
//!
//! Every family in [`DistributionKind::CATALOG`] is fitted by maximum
//! likelihood, scored with AIC and checked with a one-sample KS test.
//! Candidates that fail to fit are skipped, never reported as errors.
//!
//! Whether fitting runs at all is decided once, from configuration, by
//! [`fitter_for`]: callers hold a `dyn DistributionFitter` and never branch
//! on availability themselves.

use std::borrow::Cow;
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::coerce::numeric_values;
use crate::column::Column;
use crate::config::DiagnosticsConfig;
use crate::distributions::{DistributionKind, FittedDistribution};
use crate::error::FitError;
use crate::outlier::{OutlierMethod, AUTO_LOG_SKEW_THRESHOLD};
use crate::stats;

/// Sample size below which diagnostics are flagged as unstable.
pub const SMALL_SAMPLE_THRESHOLD: usize = 30;

/// Minimum positive-subset size for positive-support candidates; the
/// effective minimum is `max(this, ⌊0.2·n⌋)`.
pub const MIN_POSITIVE_SUBSET: usize = 30;

/// |skewness| below which a Normal/Laplace fit counts as symmetric.
const SYMMETRIC_SKEW_LIMIT: f64 = 0.5;

/// One fitted candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    pub distribution: DistributionKind,
    pub params: Vec<f64>,
    pub log_likelihood: f64,
    /// `2k − 2 ln L`, k = number of fitted parameters.
    pub aic: f64,
    pub ks_statistic: f64,
    pub ks_pvalue: f64,
    /// Values the candidate was fitted on.
    pub n: usize,
}

/// Fits the distribution catalog to a numeric sample.
pub trait DistributionFitter: Send + Sync {
    fn is_available(&self) -> bool;

    /// Ranked fits, best first. Missing and non-finite values are ignored.
    fn fit(&self, sample: &[f64]) -> Vec<FitResult>;
}

/// Maximum-likelihood fitter over the full catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct MleFitter;

impl DistributionFitter for MleFitter {
    fn is_available(&self) -> bool {
        true
    }

    fn fit(&self, sample: &[f64]) -> Vec<FitResult> {
        let x: Vec<f64> = sample.iter().copied().filter(|v| v.is_finite()).collect();
        if x.is_empty() {
            return Vec::new();
        }
        let catalog: &[DistributionKind] = &DistributionKind::CATALOG;
        let mut results: Vec<FitResult> = catalog
            .par_iter()
            .filter_map(|&kind| match fit_candidate(kind, &x) {
                Ok(r) => Some(r),
                Err(e) => {
                    debug!(distribution = %kind, error = %e, "skipping candidate");
                    None
                }
            })
            .collect();
        rank(&mut results);
        results
    }
}

/// Stand-in used when diagnostics are disabled: never fits anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableFitter;

impl DistributionFitter for UnavailableFitter {
    fn is_available(&self) -> bool {
        false
    }

    fn fit(&self, _sample: &[f64]) -> Vec<FitResult> {
        Vec::new()
    }
}

/// Picks the fitter once from configuration.
pub fn fitter_for(config: &DiagnosticsConfig) -> Box<dyn DistributionFitter> {
    if config.enabled {
        Box::new(MleFitter)
    } else {
        Box::new(UnavailableFitter)
    }
}

fn fit_candidate(kind: DistributionKind, x: &[f64]) -> Result<FitResult, FitError> {
    let subset: Cow<'_, [f64]> = if kind.requires_positive_subset() {
        let pos: Vec<f64> = x.iter().copied().filter(|&v| v > 0.0).collect();
        let required = MIN_POSITIVE_SUBSET.max(x.len() / 5);
        if pos.len() < required {
            return Err(FitError::InsufficientData {
                required,
                available: pos.len(),
            });
        }
        Cow::Owned(pos)
    } else {
        Cow::Borrowed(x)
    };

    let fitted = FittedDistribution::fit(kind, &subset)?;
    let log_likelihood = fitted.log_likelihood(&subset)?;
    let k = fitted.params().len() as f64;
    let ks = stats::ks_test(&subset, |v| fitted.cdf(v)).ok_or(FitError::DegenerateSample {
        family: kind.name(),
        reason: "KS statistic undefined",
    })?;

    Ok(FitResult {
        distribution: kind,
        params: fitted.params(),
        log_likelihood,
        aic: 2.0 * k - 2.0 * log_likelihood,
        ks_statistic: ks.statistic,
        ks_pvalue: ks.p_value,
        n: subset.len(),
    })
}

/// AIC ascending, ties broken by KS p-value descending.
fn rank(results: &mut [FitResult]) {
    results.sort_by(|a, b| {
        a.aic
            .total_cmp(&b.aic)
            .then_with(|| b.ks_pvalue.total_cmp(&a.ks_pvalue))
    });
}

// ============================================================================
// Recommendation
// ============================================================================

/// Suggested outlier handling for a diagnosed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodRecommendation {
    /// Nothing could be fitted.
    GeneralIqr,
    LogIqr,
    ZScoreOrIqr,
    QuantileOrIqrWinsorize,
    IqrOrQuantile,
    Iqr,
}

impl MethodRecommendation {
    /// The method to preselect for this recommendation.
    pub fn suggested_method(self) -> OutlierMethod {
        match self {
            MethodRecommendation::LogIqr => OutlierMethod::LogIqr,
            MethodRecommendation::ZScoreOrIqr => OutlierMethod::ZScore,
            MethodRecommendation::QuantileOrIqrWinsorize => OutlierMethod::Quantile,
            MethodRecommendation::GeneralIqr
            | MethodRecommendation::IqrOrQuantile
            | MethodRecommendation::Iqr => OutlierMethod::Iqr,
        }
    }
}

impl fmt::Display for MethodRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            MethodRecommendation::GeneralIqr => {
                "IQR (general). If the data is strongly skewed, try log-IQR."
            }
            MethodRecommendation::LogIqr => "log-IQR (data looks lognormal / right-skewed).",
            MethodRecommendation::ZScoreOrIqr => "z-score or IQR.",
            MethodRecommendation::QuantileOrIqrWinsorize => {
                "Quantile/IQR (heavy tail). Consider winsorizing."
            }
            MethodRecommendation::IqrOrQuantile => "IQR or quantile (heavy tail).",
            MethodRecommendation::Iqr => "IQR (safe).",
        };
        f.write_str(msg)
    }
}

/// Maps sample skewness and the best-fitting family to a recommendation.
///
/// Rules are checked in order:
///
/// 1. no fit → [`GeneralIqr`](MethodRecommendation::GeneralIqr)
/// 2. Lognormal, or skew > 1 → [`LogIqr`](MethodRecommendation::LogIqr)
/// 3. Normal/Laplace with |skew| < 0.5 → [`ZScoreOrIqr`](MethodRecommendation::ZScoreOrIqr)
/// 4. Gamma/Weibull/Exponential → [`QuantileOrIqrWinsorize`](MethodRecommendation::QuantileOrIqrWinsorize)
/// 5. Student-t → [`IqrOrQuantile`](MethodRecommendation::IqrOrQuantile)
/// 6. otherwise → [`Iqr`](MethodRecommendation::Iqr)
///
/// A NaN skew matches neither skew condition.
pub fn recommend_outlier_method(skew: f64, best: Option<DistributionKind>) -> MethodRecommendation {
    use DistributionKind as K;

    let Some(best) = best else {
        return MethodRecommendation::GeneralIqr;
    };
    if best == K::Lognormal || skew > AUTO_LOG_SKEW_THRESHOLD {
        return MethodRecommendation::LogIqr;
    }
    match best {
        K::Normal | K::Laplace if skew.abs() < SYMMETRIC_SKEW_LIMIT => {
            MethodRecommendation::ZScoreOrIqr
        }
        K::Gamma | K::Weibull | K::Exponential => MethodRecommendation::QuantileOrIqrWinsorize,
        K::StudentT => MethodRecommendation::IqrOrQuantile,
        _ => MethodRecommendation::Iqr,
    }
}

// ============================================================================
// Diagnosis
// ============================================================================

/// Shape diagnostics for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    /// Non-missing, finite values in the numeric view.
    pub n_valid: usize,
    pub skewness: Option<f64>,
    pub excess_kurtosis: Option<f64>,
    /// `n_valid < 30`: fits may be unstable.
    pub small_sample: bool,
    /// Ranked fits, best first. Empty if the fitter is unavailable.
    pub fits: Vec<FitResult>,
    pub recommendation: MethodRecommendation,
}

impl Diagnosis {
    pub fn best_fit(&self) -> Option<&FitResult> {
        self.fits.first()
    }
}

/// Diagnoses the numeric view of `column`.
pub fn diagnose(column: &Column, fitter: &dyn DistributionFitter) -> Diagnosis {
    let x: Vec<f64> = numeric_values(column)
        .into_iter()
        .filter(|v| v.is_finite())
        .collect();
    let skewness = stats::skewness(&x);
    let excess_kurtosis = stats::kurtosis(&x);
    let fits = fitter.fit(&x);
    let best = fits.first().map(|r| r.distribution);
    let recommendation = recommend_outlier_method(skewness.unwrap_or(f64::NAN), best);

    info!(
        n = x.len(),
        skewness = skewness.unwrap_or(f64::NAN),
        best = best.map_or("none", DistributionKind::name),
        %recommendation,
        "diagnosed column"
    );
    Diagnosis {
        n_valid: x.len(),
        skewness,
        excess_kurtosis,
        small_sample: x.len() < SMALL_SAMPLE_THRESHOLD,
        fits,
        recommendation,
    }
}
