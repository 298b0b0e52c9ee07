//! Seeded random sampling for synthetic test samples.
//!
//! Builds reference samples with a known shape (symmetric, right-skewed,
//! heavy-tailed) for exercising the fitter, the diagnostics and the `auto`
//! outlier method.
//!
//! # Reproducibility
//!
//! [`create_rng`] returns `SmallRng`, deterministic for a given seed on the
//! same platform.

use rand::Rng;

/// Creates a fast, seeded random number generator.
pub fn create_rng(seed: u64) -> rand::rngs::SmallRng {
    use rand::SeedableRng;
    rand::rngs::SmallRng::seed_from_u64(seed)
}

/// Draws one standard normal variate with the Box–Muller transform.
///
/// Reference: Box & Muller (1958), "A Note on the Generation of Random
/// Normal Deviates", *Annals of Mathematical Statistics* 29(2).
pub fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    // u1 ∈ (0, 1] so ln(u1) is finite
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Draws `n` variates from N(μ, σ²).
pub fn normal_sample<R: Rng>(n: usize, mu: f64, sigma: f64, rng: &mut R) -> Vec<f64> {
    (0..n).map(|_| mu + sigma * standard_normal(rng)).collect()
}

/// Draws `n` variates whose logarithm is N(μ, σ²).
pub fn lognormal_sample<R: Rng>(n: usize, mu: f64, sigma: f64, rng: &mut R) -> Vec<f64> {
    (0..n)
        .map(|_| (mu + sigma * standard_normal(rng)).exp())
        .collect()
}

/// Draws `n` exponential variates with the given scale (mean), by inversion.
pub fn exponential_sample<R: Rng>(n: usize, scale: f64, rng: &mut R) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let u: f64 = 1.0 - rng.random::<f64>();
            -scale * u.ln()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats;

    #[test]
    fn test_same_seed_same_sequence() {
        let a = normal_sample(20, 0.0, 1.0, &mut create_rng(11));
        let b = normal_sample(20, 0.0, 1.0, &mut create_rng(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_normal_sample_moments() {
        let mut rng = create_rng(42);
        let v = normal_sample(20_000, 5.0, 2.0, &mut rng);
        let m = stats::mean(&v).unwrap();
        let sd = stats::population_std_dev(&v).unwrap();
        assert!((m - 5.0).abs() < 0.05, "mean = {m}");
        assert!((sd - 2.0).abs() < 0.05, "sd = {sd}");
    }

    #[test]
    fn test_lognormal_sample_is_right_skewed() {
        let mut rng = create_rng(3);
        let v = lognormal_sample(5_000, 0.0, 1.0, &mut rng);
        assert!(v.iter().all(|&x| x > 0.0));
        assert!(stats::skewness(&v).unwrap() > 1.0);
    }

    #[test]
    fn test_exponential_sample_mean() {
        let mut rng = create_rng(9);
        let v = exponential_sample(20_000, 3.0, &mut rng);
        assert!(v.iter().all(|&x| x >= 0.0));
        assert!((stats::mean(&v).unwrap() - 3.0).abs() < 0.1);
    }
}
