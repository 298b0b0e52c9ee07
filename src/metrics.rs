//! Regression error metrics for evaluating price models on prepared data.
//!
//! All functions take aligned `(truth, prediction)` slices and return
//! `None` when the slices are empty or differ in length.

use crate::stats;

fn aligned(y_true: &[f64], y_pred: &[f64]) -> bool {
    !y_true.is_empty() && y_true.len() == y_pred.len()
}

/// Root mean squared error.
///
/// # Examples
/// ```
/// use landprep::metrics::rmse;
/// assert_eq!(rmse(&[1.0, 2.0, 3.0], &[1.0, 2.0, 5.0]), Some((4.0f64 / 3.0).sqrt()));
/// assert_eq!(rmse(&[1.0], &[]), None);
/// ```
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    if !aligned(y_true, y_pred) {
        return None;
    }
    let sq: Vec<f64> = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .collect();
    Some((stats::kahan_sum(&sq) / sq.len() as f64).sqrt())
}

/// Mean absolute error.
pub fn mae(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    if !aligned(y_true, y_pred) {
        return None;
    }
    let abs: Vec<f64> = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).collect();
    Some(stats::kahan_sum(&abs) / abs.len() as f64)
}

/// Coefficient of determination `1 − SS_res / SS_tot`.
///
/// `None` also when the truth is constant (`SS_tot = 0`).
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    if !aligned(y_true, y_pred) {
        return None;
    }
    let mean = stats::mean(y_true)?;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return None;
    }
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    Some(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() {
        let y = [3.0, 5.0, 9.0];
        assert_eq!(rmse(&y, &y), Some(0.0));
        assert_eq!(mae(&y, &y), Some(0.0));
        assert_eq!(r2_score(&y, &y), Some(1.0));
    }

    #[test]
    fn test_mean_prediction_has_zero_r2() {
        let y = [1.0, 2.0, 3.0, 4.0];
        let r2 = r2_score(&y, &[2.5; 4]).unwrap();
        assert!(r2.abs() < 1e-15);
    }

    #[test]
    fn test_mae_value() {
        assert_eq!(mae(&[1.0, 2.0, 3.0], &[2.0, 2.0, 1.0]), Some(1.0));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(rmse(&[], &[]), None);
        assert_eq!(mae(&[1.0, 2.0], &[1.0]), None);
        assert_eq!(r2_score(&[4.0, 4.0], &[4.0, 5.0]), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn rmse_at_least_mae(pairs in proptest::collection::vec((-1e6_f64..1e6, -1e6_f64..1e6), 1..50)) {
            let (t, p): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            let r = rmse(&t, &p).unwrap();
            let m = mae(&t, &p).unwrap();
            prop_assert!(r + 1e-9 * r.max(1.0) >= m);
        }
    }
}
