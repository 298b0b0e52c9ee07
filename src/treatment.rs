//! Applying outlier bounds to a dataset: drop rows or winsorize columns.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::coerce::{coerce_column, numeric_values};
use crate::column::{Column, Dataset};
use crate::error::TreatmentError;
use crate::outlier::{detect_outliers, Bounds, OutlierMethod, OutlierParams};

/// What to do with detected outliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierAction {
    /// Remove every row flagged by any selected column.
    #[default]
    Drop,
    /// Clamp each selected column to its own bounds; keep all rows.
    Winsorize,
}

/// A column selected for outlier detection and the parameters to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub column: String,
    #[serde(default)]
    pub params: OutlierParams,
}

impl ColumnRule {
    pub fn new(column: impl Into<String>, params: OutlierParams) -> Self {
        Self {
            column: column.into(),
            params,
        }
    }
}

/// Audit row for one treated column. Bounds are on the original scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundsSummary {
    pub column: String,
    pub lower: f64,
    pub upper: f64,
    pub method: OutlierMethod,
    pub n_outliers: usize,
}

/// Result of [`apply_outlier_treatment`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Treatment {
    pub dataset: Dataset,
    /// Target values aligned with `dataset`.
    pub target: Vec<f64>,
    /// One entry per rule, in rule order.
    pub summaries: Vec<BoundsSummary>,
    /// Row-level OR of the per-column masks, over the input rows.
    pub combined_mask: Vec<bool>,
    pub action: OutlierAction,
}

impl Treatment {
    pub fn flagged_rows(&self) -> usize {
        self.combined_mask.iter().filter(|&&m| m).count()
    }
}

/// Detects outliers in every rule's column and applies `action`.
///
/// Each selected column is first replaced by its currency-forced coerced
/// form. With [`OutlierAction::Drop`] rows flagged by any column are removed
/// from the dataset and the target together; with
/// [`OutlierAction::Winsorize`] each column is clamped to its own bounds and
/// columns with a non-finite bound are left as coerced.
///
/// # Errors
/// - [`TreatmentError::TargetLength`] if `target` is not row-aligned.
/// - [`TreatmentError::Dataset`] if a rule names an unknown column.
///
/// # Examples
/// ```
/// use landprep::column::{Column, Dataset};
/// use landprep::outlier::{OutlierMethod, OutlierParams};
/// use landprep::treatment::{apply_outlier_treatment, ColumnRule, OutlierAction};
///
/// let ds = Dataset::from_columns([(
///     "harga",
///     Column::Numeric(vec![10.0, 12.0, 11.0, 13.0, 1000.0]),
/// )]).unwrap();
/// let target = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let rules = [ColumnRule::new("harga", OutlierParams::with_method(OutlierMethod::Iqr))];
///
/// let t = apply_outlier_treatment(&ds, &target, &rules, OutlierAction::Drop).unwrap();
/// assert_eq!(t.dataset.n_rows(), 4);
/// assert_eq!(t.target, [1.0, 2.0, 3.0, 4.0]);
/// assert_eq!(t.summaries[0].n_outliers, 1);
/// ```
pub fn apply_outlier_treatment(
    dataset: &Dataset,
    target: &[f64],
    rules: &[ColumnRule],
    action: OutlierAction,
) -> Result<Treatment, TreatmentError> {
    if target.len() != dataset.n_rows() {
        return Err(TreatmentError::TargetLength {
            expected: dataset.n_rows(),
            found: target.len(),
        });
    }
    for rule in rules {
        dataset.require(&rule.column)?;
    }

    let mut working = dataset.clone();
    let mut combined = vec![false; dataset.n_rows()];
    let mut bounds: Vec<Bounds> = Vec::with_capacity(rules.len());
    let mut summaries = Vec::with_capacity(rules.len());

    for rule in rules {
        let coerced = coerce_column(working.require(&rule.column)?, true);
        let detection = detect_outliers(&coerced, &rule.params);
        working.replace_column(&rule.column, coerced)?;

        for (acc, &m) in combined.iter_mut().zip(&detection.mask) {
            *acc |= m;
        }
        summaries.push(BoundsSummary {
            column: rule.column.clone(),
            lower: detection.bounds.lower,
            upper: detection.bounds.upper,
            method: detection.bounds.method,
            n_outliers: detection.outlier_count(),
        });
        bounds.push(detection.bounds);
    }

    let (dataset, target) = match action {
        OutlierAction::Drop => {
            let keep: Vec<bool> = combined.iter().map(|&m| !m).collect();
            let target: Vec<f64> = target
                .iter()
                .zip(&keep)
                .filter(|(_, &k)| k)
                .map(|(&y, _)| y)
                .collect();
            (working.filter_rows(&keep), target)
        }
        OutlierAction::Winsorize => {
            for (rule, b) in rules.iter().zip(&bounds) {
                if !b.is_finite() {
                    debug!(column = %rule.column, "bounds not finite, column left as coerced");
                    continue;
                }
                let clipped = winsorize(&numeric_values(working.require(&rule.column)?), b);
                working.replace_column(&rule.column, Column::Numeric(clipped))?;
            }
            (working, target.to_vec())
        }
    };

    let treatment = Treatment {
        dataset,
        target,
        summaries,
        combined_mask: combined,
        action,
    };
    info!(
        ?action,
        columns = rules.len(),
        flagged = treatment.flagged_rows(),
        rows = treatment.dataset.n_rows(),
        "applied outlier treatment"
    );
    Ok(treatment)
}

/// Clamps values to `[lower, upper]`; `NaN` stays missing.
pub fn winsorize(values: &[f64], bounds: &Bounds) -> Vec<f64> {
    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                v
            } else {
                v.max(bounds.lower).min(bounds.upper)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatasetError;

    fn iqr() -> OutlierParams {
        OutlierParams::with_method(OutlierMethod::Iqr)
    }

    fn listings() -> Dataset {
        Dataset::from_columns([
            (
                "harga",
                Column::text([
                    "10 juta", "12 juta", "11 juta", "13 juta", "1 miliar", "12 juta",
                ]),
            ),
            ("luas", Column::Numeric(vec![100.0, 110.0, 5000.0, 105.0, 95.0, 102.0])),
            ("lokasi", Column::text(["A", "B", "C", "D", "E", "F"])),
        ])
        .unwrap()
    }

    const TARGET: [f64; 6] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

    #[test]
    fn test_drop_or_combines_masks() {
        let rules = [ColumnRule::new("harga", iqr()), ColumnRule::new("luas", iqr())];
        let t = apply_outlier_treatment(&listings(), &TARGET, &rules, OutlierAction::Drop).unwrap();
        assert_eq!(t.combined_mask, [false, false, true, false, true, false]);
        assert_eq!(t.dataset.n_rows(), 4);
        assert_eq!(t.target, [1.0, 2.0, 4.0, 6.0]);
        assert_eq!(
            t.dataset.column("lokasi").unwrap(),
            &Column::text(["A", "B", "D", "F"])
        );
        // selected columns are replaced by their coerced form
        assert_eq!(
            t.dataset.column("harga").unwrap().as_numeric().unwrap(),
            &[10e6, 12e6, 13e6, 12e6]
        );
    }

    #[test]
    fn test_summary_counts_match_masks() {
        let rules = [ColumnRule::new("luas", iqr()), ColumnRule::new("harga", iqr())];
        let t = apply_outlier_treatment(&listings(), &TARGET, &rules, OutlierAction::Drop).unwrap();
        let names: Vec<&str> = t.summaries.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names, ["luas", "harga"]);
        assert_eq!(t.summaries[0].n_outliers, 1);
        assert_eq!(t.summaries[1].n_outliers, 1);
        assert_eq!(t.flagged_rows(), 2);
    }

    #[test]
    fn test_winsorize_keeps_rows_and_clamps() {
        let rules = [ColumnRule::new("luas", iqr())];
        let t = apply_outlier_treatment(&listings(), &TARGET, &rules, OutlierAction::Winsorize)
            .unwrap();
        assert_eq!(t.dataset.n_rows(), 6);
        assert_eq!(t.target, TARGET);
        let s = &t.summaries[0];
        let luas = t.dataset.column("luas").unwrap().as_numeric().unwrap();
        assert!(luas.iter().all(|&v| v >= s.lower && v <= s.upper));
        assert_eq!(luas[2], s.upper);
        // inliers untouched
        assert_eq!(luas[0], 100.0);
        assert_eq!(luas[5], 102.0);
        // unselected columns untouched
        assert_eq!(t.dataset.column("harga"), listings().column("harga"));
        assert_eq!(t.dataset.column("lokasi"), listings().column("lokasi"));
    }

    #[test]
    fn test_winsorize_skips_non_finite_bounds() {
        let ds = Dataset::from_columns([("catatan", Column::text(["dekat tol", "SHM"]))]).unwrap();
        let rules = [ColumnRule::new("catatan", iqr())];
        let t = apply_outlier_treatment(&ds, &[1.0, 2.0], &rules, OutlierAction::Winsorize).unwrap();
        assert!(t.summaries[0].lower.is_nan());
        assert_eq!(t.dataset, ds);
    }

    #[test]
    fn test_no_rules_is_identity() {
        for action in [OutlierAction::Drop, OutlierAction::Winsorize] {
            let t = apply_outlier_treatment(&listings(), &TARGET, &[], action).unwrap();
            assert_eq!(t.dataset, listings());
            assert_eq!(t.target, TARGET);
            assert!(t.summaries.is_empty());
        }
    }

    #[test]
    fn test_no_outliers_round_trip() {
        let ds = Dataset::from_columns([("luas", Column::Numeric(vec![1.0, 2.0, 3.0, 4.0]))]).unwrap();
        let rules = [ColumnRule::new("luas", iqr())];
        for action in [OutlierAction::Drop, OutlierAction::Winsorize] {
            let t = apply_outlier_treatment(&ds, &[0.0; 4], &rules, action).unwrap();
            assert_eq!(t.dataset, ds);
        }
    }

    #[test]
    fn test_contract_errors() {
        let err = apply_outlier_treatment(&listings(), &[1.0], &[], OutlierAction::Drop).unwrap_err();
        assert_eq!(err, TreatmentError::TargetLength { expected: 6, found: 1 });

        let rules = [ColumnRule::new("harga_m2", iqr())];
        let err = apply_outlier_treatment(&listings(), &TARGET, &rules, OutlierAction::Drop).unwrap_err();
        assert_eq!(
            err,
            TreatmentError::Dataset(DatasetError::UnknownColumn("harga_m2".into()))
        );
    }

    #[test]
    fn test_rule_deserialize_defaults() {
        let rule: ColumnRule = serde_json::from_str(r#"{"column":"harga"}"#).unwrap();
        assert_eq!(rule.params, OutlierParams::default());
        let action: OutlierAction = serde_json::from_str("\"winsorize\"").unwrap();
        assert_eq!(action, OutlierAction::Winsorize);
    }
}
