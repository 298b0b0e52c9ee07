//! Error types, one enum per subsystem.
//!
//! Per-value parse failures and per-candidate fit failures never reach the
//! caller as errors: they degrade to a missing value or a skipped candidate.
//! The enums here cover contract violations (unknown columns, misaligned
//! targets, invalid configuration) and the internal fit failures that the
//! fitter absorbs.

/// Invalid parameters passed to a distribution constructor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistributionError {
    #[error("invalid distribution parameters: {0}")]
    InvalidParameters(String),
}

/// Why a single catalog candidate could not be fitted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("insufficient data: need at least {required} values, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("{family} requires strictly positive values")]
    NonPositiveSample { family: &'static str },

    #[error("degenerate sample for {family}: {reason}")]
    DegenerateSample {
        family: &'static str,
        reason: &'static str,
    },

    #[error("{family} estimator did not converge after {iterations} iterations")]
    NoConvergence {
        family: &'static str,
        iterations: usize,
    },

    #[error("non-finite log-likelihood for {family}")]
    NonFiniteLikelihood { family: &'static str },

    #[error(transparent)]
    Parameters(#[from] DistributionError),
}

/// Structural errors in a [`Dataset`](crate::column::Dataset).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("column {column} has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

/// Contract violations when applying outlier treatment.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreatmentError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("target has {found} values but the dataset has {expected} rows")]
    TargetLength { expected: usize, found: usize },
}

/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to read config {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("failed to parse config {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("invalid config value for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}

/// Errors from end-to-end training data preparation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PrepError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Treatment error: {0}")]
    Treatment(#[from] TreatmentError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("only {rows} rows remain after cleaning, at least {min_rows} required")]
    TooFewRows { rows: usize, min_rows: usize },
}
