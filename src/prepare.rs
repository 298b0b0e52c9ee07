//! End-to-end preparation of a listing table for price regression.
//!
//! 1. Rows without a readable target are removed.
//! 2. Known categorical columns are canonicalized
//!    ([`standardize_categories`]).
//! 3. Numeric feature columns are coerced (currency parsing where asked).
//! 4. Configured outlier treatment runs over the selected columns.
//! 5. Too few surviving rows is an error.
//! 6. Every feature is assigned an encoder ([`EncodingPlan`]).

use serde::Serialize;
use tracing::{debug, info};

use crate::coerce::{coerce_column, numeric_like_columns, numeric_values};
use crate::column::{Column, Dataset};
use crate::config::{EncodingConfig, PrepConfig};
use crate::encode::{plan_encoding, standardize_categories, EncodingPlan, FeatureEncoder};
use crate::error::DatasetError;
use crate::error::PrepError;
use crate::fitting::{diagnose, fitter_for, Diagnosis};
use crate::treatment::{apply_outlier_treatment, BoundsSummary, OutlierAction};

/// Column names tried, in order, when guessing the price column.
pub const DEFAULT_TARGET_CANDIDATES: &[&str] = &[
    "harga_total_num",
    "harga total",
    "Harga Total",
    "harga",
    "Harga",
    "price",
    "Price",
    "Nilai Tanah",
    "nilai_tanah",
];

/// Lowercase substrings marking identifier, media and contact columns that
/// are not useful as features.
pub const EXCLUDED_FEATURE_KEYWORDS: &[&str] = &[
    "url", "link", "foto", "image", "gambar", "whatsapp", "telepon", "phone", "kontak", "agent",
    "agen", "refurl", "photo", "id",
];

/// First numeric column among [`DEFAULT_TARGET_CANDIDATES`], else the first
/// numeric column.
pub fn guess_target_column(dataset: &Dataset) -> Option<String> {
    let is_numeric = |name: &str| dataset.column(name).is_some_and(Column::is_numeric);
    DEFAULT_TARGET_CANDIDATES
        .iter()
        .copied()
        .find(|name| is_numeric(name))
        .or_else(|| dataset.columns().find(|(_, c)| c.is_numeric()).map(|(n, _)| n))
        .map(str::to_string)
}

/// Every non-target column whose lowercase name contains none of
/// [`EXCLUDED_FEATURE_KEYWORDS`].
///
/// # Examples
/// ```
/// use landprep::column::{Column, Dataset};
/// use landprep::prepare::default_feature_columns;
///
/// let ds = Dataset::from_columns([
///     ("harga", Column::Numeric(vec![1.0])),
///     ("luas_tanah", Column::Numeric(vec![120.0])),
///     ("Foto_URL", Column::text(["https://…"])),
///     ("listing_id", Column::Numeric(vec![7.0])),
/// ]).unwrap();
/// assert_eq!(default_feature_columns(&ds, "harga"), ["luas_tanah"]);
/// ```
pub fn default_feature_columns(dataset: &Dataset, target: &str) -> Vec<String> {
    dataset
        .column_names()
        .filter(|&name| name != target)
        .filter(|name| {
            let lower = name.to_lowercase();
            !EXCLUDED_FEATURE_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(str::to_string)
        .collect()
}

/// What to prepare: the target and the feature selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PrepRequest {
    pub target: String,
    /// Feature columns; empty means [`default_feature_columns`].
    pub features: Vec<String>,
    /// Features to treat as numeric. Empty means the features that are
    /// already numeric; currency columns from the config are always added.
    pub numeric_features: Vec<String>,
}

impl PrepRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_numeric_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_features = features.into_iter().map(Into::into).collect();
        self
    }
}

/// Cleaned training data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedData {
    /// Target column (numeric) followed by the feature columns.
    pub dataset: Dataset,
    pub target_column: String,
    pub feature_columns: Vec<String>,
    /// Target values aligned with `dataset`.
    pub target: Vec<f64>,
    /// Outlier bounds per treated column; empty without treatment.
    pub summaries: Vec<BoundsSummary>,
    pub rows_in: usize,
    pub rows_missing_target: usize,
    /// Encoder assignment of the feature columns.
    pub encoding: EncodingPlan,
}

impl PreparedData {
    pub fn n_rows(&self) -> usize {
        self.dataset.n_rows()
    }

    /// Fits the planned encoders on the prepared rows.
    pub fn fit_encoder(&self, config: &EncodingConfig) -> Result<FeatureEncoder, DatasetError> {
        FeatureEncoder::fit(&self.dataset, &self.encoding, config)
    }
}

/// Runs the full preparation pipeline.
///
/// When the target column itself is winsorized, the returned target follows
/// the clamped column.
///
/// # Errors
/// - [`PrepError::Config`] for an invalid configuration.
/// - [`PrepError::Dataset`] for unknown target, feature or outlier columns.
/// - [`PrepError::TooFewRows`] when fewer than `config.min_rows` rows remain.
pub fn prepare_training_data(
    dataset: &Dataset,
    request: &PrepRequest,
    config: &PrepConfig,
) -> Result<PreparedData, PrepError> {
    config.validate()?;
    let rows_in = dataset.n_rows();

    let y = numeric_values(dataset.require(&request.target)?);
    let keep: Vec<bool> = y.iter().map(|v| !v.is_nan()).collect();
    let target: Vec<f64> = y.iter().copied().filter(|v| !v.is_nan()).collect();
    let rows_missing_target = rows_in - target.len();
    debug!(rows_missing_target, "removed rows without target");

    let features = if request.features.is_empty() {
        default_feature_columns(dataset, &request.target)
    } else {
        let mut seen: Vec<String> = Vec::new();
        for f in &request.features {
            if f != &request.target && !seen.contains(f) {
                seen.push(f.clone());
            }
        }
        seen
    };

    let filtered = dataset.filter_rows(&keep);
    let filtered = if config.encoding.standardize_categories {
        standardize_categories(&filtered)?
    } else {
        filtered
    };
    let mut working = Dataset::new();
    working.push_column(request.target.clone(), Column::Numeric(target.clone()))?;
    for name in &features {
        working.push_column(name.clone(), filtered.require(name)?.clone())?;
    }

    let force = &config.coercion.force_currency_columns;
    let numeric_features: Vec<String> = features
        .iter()
        .filter(|name| {
            force.contains(name)
                || if request.numeric_features.is_empty() {
                    working.column(name).is_some_and(Column::is_numeric)
                } else {
                    request.numeric_features.contains(name)
                }
        })
        .cloned()
        .collect();
    for name in &numeric_features {
        let forced = force.contains(name);
        if config.coercion.auto_convert || forced {
            let coerced = coerce_column(working.require(name)?, forced);
            debug!(column = %name, forced, numeric = coerced.is_numeric(), "coerced feature");
            working.replace_column(name, coerced)?;
        }
    }

    let rules = config.outlier.rules();
    let (working, target, summaries) = if rules.is_empty() {
        (working, target, Vec::new())
    } else {
        let treated = apply_outlier_treatment(&working, &target, &rules, config.outlier.action)?;
        let target_winsorized = treated.action == OutlierAction::Winsorize
            && rules.iter().any(|r| r.column == request.target);
        let target = if target_winsorized {
            numeric_values(treated.dataset.require(&request.target)?)
        } else {
            treated.target
        };
        (treated.dataset, target, treated.summaries)
    };

    if working.n_rows() < config.min_rows {
        return Err(PrepError::TooFewRows {
            rows: working.n_rows(),
            min_rows: config.min_rows,
        });
    }

    let encoding = plan_encoding(
        &working,
        &features,
        &numeric_features,
        config.encoding.one_hot_max_cardinality,
    );
    info!(
        rows_in,
        rows_out = working.n_rows(),
        rows_missing_target,
        features = features.len(),
        one_hot = encoding.one_hot.len(),
        frequency = encoding.frequency.len(),
        address = encoding.address.len(),
        "prepared training data"
    );
    Ok(PreparedData {
        dataset: working,
        target_column: request.target.clone(),
        feature_columns: features,
        target,
        summaries,
        rows_in,
        rows_missing_target,
        encoding,
    })
}

/// Diagnosis of one numeric-like column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDiagnosis {
    pub column: String,
    pub diagnosis: Diagnosis,
}

/// Diagnoses every numeric-like column among `names`, in order.
///
/// Distribution fitting runs only when `config.diagnostics.enabled`.
pub fn diagnose_columns<S: AsRef<str>>(
    dataset: &Dataset,
    names: &[S],
    config: &PrepConfig,
) -> Vec<ColumnDiagnosis> {
    let fitter = fitter_for(&config.diagnostics);
    numeric_like_columns(dataset, names)
        .into_iter()
        .filter_map(|column| {
            let diagnosis = diagnose(dataset.column(&column)?, fitter.as_ref());
            Some(ColumnDiagnosis { column, diagnosis })
        })
        .collect()
}
