//! Descriptive statistics over numeric samples.
//!
//! Every function here expects a *clean* sample: missing values (NaN) are
//! removed with [`drop_missing`] before any statistic is computed, so a
//! missing entry never contributes to a percentile, mean or deviation.
//!
//! # Algorithms
//!
//! - **Mean**: Neumaier compensated summation.
//! - **Variance**: Welford's online update.
//!   Reference: Welford (1962), "Note on a Method for Calculating
//!   Corrected Sums of Squares and Products", *Technometrics* 4(3).
//! - **Quantile**: R-7 linear interpolation (Hyndman & Fan type 7).
//!   Reference: Hyndman & Fan (1996), "Sample Quantiles in Statistical
//!   Packages", *The American Statistician* 50(4).
//! - **Skewness / kurtosis**: bias-corrected G₁ / G₂ (Joanes & Gill).
//! - **KS test**: one-sample Kolmogorov–Smirnov with Stephens' correction.

use serde::Serialize;

use crate::special;

/// Returns the non-missing values of `data`, preserving order.
///
/// # Examples
/// ```
/// use landprep::stats::drop_missing;
/// assert_eq!(drop_missing(&[1.0, f64::NAN, 3.0]), vec![1.0, 3.0]);
/// ```
pub fn drop_missing(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|x| !x.is_nan()).collect()
}

/// Computes the arithmetic mean using compensated summation.
///
/// # Returns
/// - `None` if `data` is empty or contains any NaN/Inf.
///
/// # Examples
/// ```
/// use landprep::stats::mean;
/// assert!((mean(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap() - 3.0).abs() < 1e-15);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    if !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Computes the population variance (denominator `n`, ddof = 0).
///
/// # Algorithm
/// Welford's method keeps a running mean and sum of squared deviations,
/// avoiding the cancellation of `E[X²] − (E[X])²`.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN/Inf.
///
/// # Examples
/// ```
/// use landprep::stats::population_variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((population_variance(&v).unwrap() - 4.0).abs() < 1e-10);
/// ```
pub fn population_variance(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    if !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    let mut running_mean = 0.0;
    let mut m2 = 0.0;
    for (i, &x) in data.iter().enumerate() {
        let n = (i + 1) as f64;
        let delta = x - running_mean;
        running_mean += delta / n;
        m2 += delta * (x - running_mean);
    }
    Some(m2 / data.len() as f64)
}

/// Population standard deviation, `sqrt(population_variance(data))`.
pub fn population_std_dev(data: &[f64]) -> Option<f64> {
    population_variance(data).map(f64::sqrt)
}

/// Returns the minimum value in the slice.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN.
pub fn min(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    data.iter().copied().try_fold(f64::INFINITY, |acc, x| {
        if x.is_nan() {
            None
        } else {
            Some(acc.min(x))
        }
    })
}

/// Returns the maximum value in the slice.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN.
pub fn max(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    data.iter().copied().try_fold(f64::NEG_INFINITY, |acc, x| {
        if x.is_nan() {
            None
        } else {
            Some(acc.max(x))
        }
    })
}

/// Median without mutating the input (R-7 quantile at 0.5).
///
/// # Examples
/// ```
/// use landprep::stats::median;
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
/// ```
pub fn median(data: &[f64]) -> Option<f64> {
    quantile(data, 0.5)
}

/// Returns a sorted copy of `data`, or `None` if it contains NaN.
pub fn sorted_copy(data: &[f64]) -> Option<Vec<f64>> {
    if data.iter().any(|x| x.is_nan()) {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    Some(sorted)
}

/// Computes the `p`-th quantile using the R-7 linear interpolation method.
///
/// # Algorithm
/// For sorted data `x[0..n]` and `p ∈ [0, 1]`:
/// 1. `h = (n − 1) × p`
/// 2. `j = ⌊h⌋`, `g = h − j`
/// 3. return `(1 − g) × x[j] + g × x[j+1]`
///
/// # Returns
/// - `None` if `data` is empty, `p` is outside `[0, 1]`, or data contains NaN.
///
/// # Examples
/// ```
/// use landprep::stats::quantile;
/// let data = [10.0, 12.0, 11.0, 13.0, 1000.0];
/// assert_eq!(quantile(&data, 0.25), Some(11.0));
/// assert_eq!(quantile(&data, 0.75), Some(13.0));
/// ```
pub fn quantile(data: &[f64], p: f64) -> Option<f64> {
    if data.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let sorted = sorted_copy(data)?;
    quantile_sorted(&sorted, p)
}

/// Computes the `p`-th quantile on **pre-sorted** data (R-7 method).
///
/// The caller must guarantee that `sorted_data` is sorted in
/// non-decreasing order.
///
/// # Returns
/// - `None` if `sorted_data` is empty or `p` is outside `[0, 1]`.
pub fn quantile_sorted(sorted_data: &[f64], p: f64) -> Option<f64> {
    let n = sorted_data.len();
    if n == 0 || !(0.0..=1.0).contains(&p) {
        return None;
    }
    if n == 1 {
        return Some(sorted_data[0]);
    }

    let h = (n - 1) as f64 * p;
    let j = h.floor() as usize;
    let g = h - h.floor();

    if j + 1 >= n {
        Some(sorted_data[n - 1])
    } else {
        Some((1.0 - g) * sorted_data[j] + g * sorted_data[j + 1])
    }
}

/// Computes the bias-corrected sample skewness (G₁).
///
/// # Formula
/// ```text
/// G₁ = [√(n(n−1)) / (n−2)] × (m₃ / m₂^{3/2})
/// ```
/// where `m₂`, `m₃` are the biased second and third central moments.
///
/// Reference: Joanes & Gill (1998), "Comparing measures of sample skewness
/// and kurtosis", *The Statistician* 47(1), pp. 183–189.
///
/// # Returns
/// - `None` if `data.len() < 3`, data contains NaN/Inf, or variance is zero.
///
/// # Examples
/// ```
/// use landprep::stats::skewness;
/// assert!(skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap().abs() < 1e-14);
/// assert!(skewness(&[1.0, 2.0, 3.0, 4.0, 50.0]).unwrap() > 1.0);
/// ```
pub fn skewness(data: &[f64]) -> Option<f64> {
    let n = data.len();
    if n < 3 {
        return None;
    }
    if !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    let nf = n as f64;
    let m = kahan_sum(data) / nf;
    let mut sum2 = 0.0;
    let mut sum3 = 0.0;
    for &x in data {
        let d = x - m;
        let d2 = d * d;
        sum2 += d2;
        sum3 += d2 * d;
    }
    let m2 = sum2 / nf;
    if m2 == 0.0 {
        return None;
    }
    let m3 = sum3 / nf;
    let g1 = m3 / m2.powf(1.5);
    let correction = (nf * (nf - 1.0)).sqrt() / (nf - 2.0);
    Some(correction * g1)
}

/// Computes the bias-corrected excess kurtosis (G₂).
///
/// Returns 0 for a normal distribution, positive for heavy tails.
///
/// # Returns
/// - `None` if `data.len() < 4`, data contains NaN/Inf, or variance is zero.
pub fn kurtosis(data: &[f64]) -> Option<f64> {
    let n = data.len();
    if n < 4 {
        return None;
    }
    if !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    let nf = n as f64;
    let m = kahan_sum(data) / nf;
    let mut sum2 = 0.0;
    let mut sum4 = 0.0;
    for &x in data {
        let d = x - m;
        let d2 = d * d;
        sum2 += d2;
        sum4 += d2 * d2;
    }
    let s2 = sum2 / (nf - 1.0);
    if s2 == 0.0 {
        return None;
    }
    let sum_z4 = sum4 / (s2 * s2);
    let a = nf * (nf + 1.0) / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0));
    let b = 3.0 * (nf - 1.0) * (nf - 1.0) / ((nf - 2.0) * (nf - 3.0));
    Some(a * sum_z4 - b)
}

/// Neumaier compensated summation for O(ε) error independent of `n`.
///
/// Reference: Neumaier (1974), *Zeitschrift für Angewandte Mathematik
/// und Mechanik* 54(1), pp. 39–51.
pub fn kahan_sum(data: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for &x in data {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

// ---------------------------------------------------------------------------
// Kolmogorov–Smirnov
// ---------------------------------------------------------------------------

/// Largest sample size for which [`ks_test`] evaluates the exact
/// finite-`n` distribution; larger samples use the limiting form.
pub const EXACT_KS_MAX_N: usize = 1000;

/// Outcome of a one-sample Kolmogorov–Smirnov test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KsTest {
    /// Two-sided statistic `Dₙ = sup |Fₙ(x) − F(x)|`.
    pub statistic: f64,
    /// `P(Dₙ ≥ statistic)` under the null.
    pub p_value: f64,
}

/// One-sample, two-sided Kolmogorov–Smirnov test of `data` against `cdf`.
///
/// # Algorithm
/// `Dₙ = maxᵢ max(F(x₍ᵢ₎) − (i−1)/n, i/n − F(x₍ᵢ₎))` over the sorted sample.
///
/// For `n ≤` [`EXACT_KS_MAX_N`] the p-value is `1 − P(Dₙ < d)` from the
/// exact distribution ([`special::kolmogorov_cdf`]). Above that it is
/// `Q_KS((√n + 0.12 + 0.11/√n) · Dₙ)`, Stephens' (1970) correction of the
/// Kolmogorov limiting distribution, whose error is far below 1e-3 there.
///
/// # Returns
/// - `None` if `data` is empty, contains NaN, or the CDF is non-finite
///   anywhere on the sample.
pub fn ks_test<F>(data: &[f64], cdf: F) -> Option<KsTest>
where
    F: Fn(f64) -> f64,
{
    if data.is_empty() {
        return None;
    }
    let sorted = sorted_copy(data)?;
    let nf = sorted.len() as f64;
    let mut d = 0.0_f64;
    for (i, &x) in sorted.iter().enumerate() {
        let f = cdf(x);
        if !f.is_finite() {
            return None;
        }
        let lower = f - i as f64 / nf;
        let upper = (i + 1) as f64 / nf - f;
        d = d.max(lower).max(upper);
    }
    let p_value = if sorted.len() <= EXACT_KS_MAX_N {
        (1.0 - special::kolmogorov_cdf(sorted.len(), d)).clamp(0.0, 1.0)
    } else {
        let sqrt_n = nf.sqrt();
        special::kolmogorov_survival((sqrt_n + 0.12 + 0.11 / sqrt_n) * d)
    };
    Some(KsTest {
        statistic: d,
        p_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_missing_preserves_order() {
        let v = [f64::NAN, 3.0, f64::NAN, 1.0, 2.0];
        assert_eq!(drop_missing(&v), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(3.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, f64::INFINITY]), None);
    }

    #[test]
    fn test_population_variance_basic() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_variance(&v).unwrap() - 4.0).abs() < 1e-12);
        assert!((population_std_dev(&v).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_population_variance_constant() {
        assert_eq!(population_variance(&[7.5; 20]), Some(0.0));
    }

    #[test]
    fn test_min_max() {
        let v = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        assert_eq!(min(&v), Some(1.0));
        assert_eq!(max(&v), Some(9.0));
        assert_eq!(min(&[]), None);
        assert_eq!(max(&[1.0, f64::NAN]), None);
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let v = [10.0, 12.0, 11.0, 13.0, 1000.0];
        // sorted: 10 11 12 13 1000; h = 4p
        assert_eq!(quantile(&v, 0.25), Some(11.0));
        assert_eq!(quantile(&v, 0.5), Some(12.0));
        assert_eq!(quantile(&v, 0.75), Some(13.0));
        let q = quantile(&[1.0, 2.0, 3.0, 4.0], 0.1).unwrap();
        assert!((q - 1.3).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_invalid() {
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[1.0], 1.5), None);
        assert_eq!(quantile(&[1.0, f64::NAN], 0.5), None);
        assert_eq!(quantile(&[4.0], 0.9), Some(4.0));
    }

    #[test]
    fn test_skewness_known() {
        // G₁ of [1, 2, 3, 4, 50] ≈ 2.2206
        let s = skewness(&[1.0, 2.0, 3.0, 4.0, 50.0]).unwrap();
        assert!((s - 2.2206).abs() < 1e-3, "skewness = {s}");
    }

    #[test]
    fn test_skewness_degenerate() {
        assert_eq!(skewness(&[1.0, 2.0]), None);
        assert_eq!(skewness(&[3.0, 3.0, 3.0]), None);
    }

    #[test]
    fn test_kurtosis_uniform_grid_negative() {
        let data: Vec<f64> = (1..=10).map(f64::from).collect();
        // uniform grid: G₂ = -1.2
        assert!((kurtosis(&data).unwrap() + 1.2).abs() < 1e-10);
    }

    #[test]
    fn test_ks_exact_fit_small_statistic() {
        // Uniform(0,1) quantile grid against its own CDF.
        let n = 200;
        let data: Vec<f64> = (0..n).map(|i| (i as f64 + 0.5) / n as f64).collect();
        let ks = ks_test(&data, |x| x.clamp(0.0, 1.0)).unwrap();
        assert!((ks.statistic - 0.5 / n as f64).abs() < 1e-12);
        assert!(ks.p_value > 0.99);
    }

    #[test]
    fn test_ks_rejects_shifted_sample() {
        let data: Vec<f64> = (0..100).map(|i| 0.5 + i as f64 / 200.0).collect();
        let ks = ks_test(&data, |x| x.clamp(0.0, 1.0)).unwrap();
        assert!(ks.statistic >= 0.5 - 1e-12);
        assert!(ks.p_value < 1e-6);
    }

    #[test]
    fn test_ks_small_sample_uses_exact_distribution() {
        let data = [0.3, 0.4, 0.5, 0.6, 0.7];
        let ks = ks_test(&data, |x| x.clamp(0.0, 1.0)).unwrap();
        assert!((ks.statistic - 0.3).abs() < 1e-12);
        // P(D₅ < 0.3) = 0.336; the limiting form would give about 0.675
        assert!((ks.p_value - 0.664).abs() < 1e-9, "p = {}", ks.p_value);
    }

    #[test]
    fn test_ks_invalid_input() {
        assert!(ks_test(&[], |x| x).is_none());
        assert!(ks_test(&[1.0, f64::NAN], |x| x).is_none());
        assert!(ks_test(&[1.0, 2.0], |_| f64::NAN).is_none());
    }
}
