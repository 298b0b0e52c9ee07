//! Outlier bounds and masks.
//!
//! Five methods compute a `[lower, upper]` interval from the non-missing
//! values of a column. A value is an outlier when it lies strictly outside
//! the interval; missing values are never flagged.
//!
//! | Method | Bounds |
//! |---|---|
//! | `iqr` | `[Q1 − k·IQR, Q3 + k·IQR]` |
//! | `zscore` | `[μ − z·σ, μ + z·σ]` (population σ) |
//! | `log_iqr` | IQR bounds of `log10(x)`, mapped back with `10^b` |
//! | `quantile` | `[Q(q_low), Q(q_high)]` |
//! | `auto` | `log_iqr` if skewness > [`AUTO_LOG_SKEW_THRESHOLD`], else `iqr` |
//!
//! Percentiles use R-7 linear interpolation ([`stats::quantile`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coerce::numeric_values;
use crate::column::Column;
use crate::stats;

/// Skewness above which `auto` switches from `iqr` to `log_iqr`.
pub const AUTO_LOG_SKEW_THRESHOLD: f64 = 1.0;

/// Floor for `log_iqr` clipping, relative to the smallest positive value.
const LOG_CLIP_FRACTION: f64 = 0.1;
const LOG_CLIP_MIN: f64 = 1e-9;

/// Outlier detection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    #[default]
    Auto,
    Iqr,
    #[serde(rename = "zscore")]
    ZScore,
    LogIqr,
    Quantile,
}

impl OutlierMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            OutlierMethod::Auto => "auto",
            OutlierMethod::Iqr => "iqr",
            OutlierMethod::ZScore => "zscore",
            OutlierMethod::LogIqr => "log_iqr",
            OutlierMethod::Quantile => "quantile",
        }
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized method name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown outlier method {0:?} (expected auto, iqr, zscore, log_iqr or quantile)")]
pub struct UnknownMethod(pub String);

impl FromStr for OutlierMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(OutlierMethod::Auto),
            "iqr" => Ok(OutlierMethod::Iqr),
            "zscore" => Ok(OutlierMethod::ZScore),
            "log_iqr" => Ok(OutlierMethod::LogIqr),
            "quantile" => Ok(OutlierMethod::Quantile),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// Method plus its tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierParams {
    pub method: OutlierMethod,
    /// IQR multiplier for `iqr` and `log_iqr`.
    pub iqr_k: f64,
    /// Standard-deviation multiplier for `zscore`.
    pub z_k: f64,
    pub q_low: f64,
    pub q_high: f64,
}

impl Default for OutlierParams {
    fn default() -> Self {
        Self {
            method: OutlierMethod::Auto,
            iqr_k: 1.5,
            z_k: 3.0,
            q_low: 0.01,
            q_high: 0.99,
        }
    }
}

impl OutlierParams {
    pub fn with_method(method: OutlierMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }
}

/// A computed outlier interval and the method that produced it.
///
/// For `auto`, `method` is the delegated method (`iqr` or `log_iqr`).
/// Either bound may be NaN when the sample gives no information.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
    pub method: OutlierMethod,
}

impl Bounds {
    pub fn is_finite(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    /// Strictly outside `[lower, upper]`. NaN never counts.
    pub fn is_outlier(&self, x: f64) -> bool {
        x < self.lower || x > self.upper
    }
}

/// Row mask aligned to the input plus the bounds used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierDetection {
    pub mask: Vec<bool>,
    pub bounds: Bounds,
}

impl OutlierDetection {
    pub fn outlier_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }
}

// ============================================================================
// Bound functions (clean samples)
// ============================================================================

/// IQR fence `[Q1 − k·IQR, Q3 + k·IQR]`.
///
/// `x` must not contain NaN; an empty sample gives `(NaN, NaN)`.
///
/// # Examples
/// ```
/// use landprep::outlier::iqr_bounds;
/// // Q1 = 11, Q3 = 13 under R-7
/// assert_eq!(iqr_bounds(&[10.0, 12.0, 11.0, 13.0, 1000.0], 1.5), (8.0, 16.0));
/// ```
pub fn iqr_bounds(x: &[f64], k: f64) -> (f64, f64) {
    let Some(sorted) = stats::sorted_copy(x) else {
        return (f64::NAN, f64::NAN);
    };
    match (
        stats::quantile_sorted(&sorted, 0.25),
        stats::quantile_sorted(&sorted, 0.75),
    ) {
        (Some(q1), Some(q3)) => {
            let iqr = q3 - q1;
            (q1 - k * iqr, q3 + k * iqr)
        }
        _ => (f64::NAN, f64::NAN),
    }
}

/// Z-score fence `[μ − z·σ, μ + z·σ]` with the population σ.
///
/// A zero or undefined σ collapses the fence to `[min, max]`, so nothing
/// is flagged.
pub fn zscore_bounds(x: &[f64], z: f64) -> (f64, f64) {
    let sd = stats::population_std_dev(x).unwrap_or(f64::NAN);
    if sd == 0.0 || sd.is_nan() {
        return (
            stats::min(x).unwrap_or(f64::NAN),
            stats::max(x).unwrap_or(f64::NAN),
        );
    }
    let mu = stats::mean(x).unwrap_or(f64::NAN);
    (mu - z * sd, mu + z * sd)
}

/// IQR fence in log10 space, mapped back to the original scale.
///
/// Values are clipped from below at `max(0.1 · min_positive, 1e-9)` before
/// taking logs, so zero and negative entries land at the floor. Without any
/// positive value this is plain [`iqr_bounds`].
pub fn log_iqr_bounds(x: &[f64], k: f64) -> (f64, f64) {
    let min_pos = x
        .iter()
        .copied()
        .filter(|&v| v > 0.0)
        .min_by(f64::total_cmp);
    let Some(min_pos) = min_pos else {
        return iqr_bounds(x, k);
    };
    let floor = (min_pos * LOG_CLIP_FRACTION).max(LOG_CLIP_MIN);
    let logs: Vec<f64> = x.iter().map(|&v| v.max(floor).log10()).collect();
    let (lo, hi) = iqr_bounds(&logs, k);
    (10f64.powf(lo), 10f64.powf(hi))
}

/// Percentile fence `[Q(q_low), Q(q_high)]`; a `q` outside `[0, 1]`
/// gives NaN for that side.
pub fn quantile_bounds(x: &[f64], q_low: f64, q_high: f64) -> (f64, f64) {
    let Some(sorted) = stats::sorted_copy(x) else {
        return (f64::NAN, f64::NAN);
    };
    (
        stats::quantile_sorted(&sorted, q_low).unwrap_or(f64::NAN),
        stats::quantile_sorted(&sorted, q_high).unwrap_or(f64::NAN),
    )
}

/// Resolves `auto` against a clean sample. Other methods pass through.
pub fn resolve_method(method: OutlierMethod, x: &[f64]) -> OutlierMethod {
    match method {
        OutlierMethod::Auto => match stats::skewness(x) {
            Some(skew) if skew > AUTO_LOG_SKEW_THRESHOLD => OutlierMethod::LogIqr,
            _ => OutlierMethod::Iqr,
        },
        other => other,
    }
}

/// Bounds for a clean, non-empty sample.
pub fn compute_bounds(x: &[f64], params: &OutlierParams) -> Bounds {
    let method = resolve_method(params.method, x);
    let (lower, upper) = match method {
        OutlierMethod::Iqr | OutlierMethod::Auto => iqr_bounds(x, params.iqr_k),
        OutlierMethod::ZScore => zscore_bounds(x, params.z_k),
        OutlierMethod::LogIqr => log_iqr_bounds(x, params.iqr_k),
        OutlierMethod::Quantile => quantile_bounds(x, params.q_low, params.q_high),
    };
    Bounds {
        lower,
        upper,
        method,
    }
}

// ============================================================================
// Detection
// ============================================================================

/// Detects outliers in a column through its numeric view
/// ([`numeric_values`]).
///
/// # Examples
/// ```
/// use landprep::column::Column;
/// use landprep::outlier::{detect_outliers, OutlierMethod, OutlierParams};
///
/// let prices = Column::text(["10 juta", "12 juta", "11 juta", "13 juta", "1 miliar"]);
/// let d = detect_outliers(&prices, &OutlierParams::with_method(OutlierMethod::Iqr));
/// assert_eq!(d.mask, [false, false, false, false, true]);
/// ```
pub fn detect_outliers(column: &Column, params: &OutlierParams) -> OutlierDetection {
    detect_outliers_in_sample(&numeric_values(column), params)
}

/// Detects outliers in values that are already numeric (`NaN` = missing).
///
/// With no non-missing value the bounds are `(NaN, NaN)`, the method is the
/// requested one (`iqr` for `auto`) and nothing is flagged.
pub fn detect_outliers_in_sample(values: &[f64], params: &OutlierParams) -> OutlierDetection {
    let sample = stats::drop_missing(values);
    let bounds = if sample.is_empty() {
        let method = match params.method {
            OutlierMethod::Auto => OutlierMethod::Iqr,
            other => other,
        };
        Bounds {
            lower: f64::NAN,
            upper: f64::NAN,
            method,
        }
    } else {
        compute_bounds(&sample, params)
    };

    let mask: Vec<bool> = values.iter().map(|&v| bounds.is_outlier(v)).collect();
    debug!(
        requested = %params.method,
        method = %bounds.method,
        lower = bounds.lower,
        upper = bounds.upper,
        n = sample.len(),
        "computed outlier bounds"
    );
    OutlierDetection { mask, bounds }
}
