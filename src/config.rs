//! Preparation settings, loaded from TOML.
//!
//! Resolution order (highest priority first):
//! 1. Environment variables (`LANDPREP_*`)
//! 2. Config file
//! 3. Compiled defaults
//!
//! ```toml
//! min_rows = 10
//!
//! [outlier]
//! method = "log_iqr"
//! iqr_k = 2.0
//! action = "winsorize"
//! columns = ["harga", "luas_tanah"]
//!
//! [coercion]
//! auto_convert = true
//! force_currency_columns = ["harga"]
//!
//! [diagnostics]
//! enabled = true
//!
//! [encoding]
//! one_hot_max_cardinality = 50
//! address_top_n = 40
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encode::{DEFAULT_ADDRESS_TOP_N, DEFAULT_MIN_TOKEN_LEN, ONE_HOT_MAX_CARDINALITY};
use crate::error::ConfigError;
use crate::outlier::{OutlierMethod, OutlierParams};
use crate::treatment::{ColumnRule, OutlierAction};

/// Default minimum number of rows left after cleaning.
pub const DEFAULT_MIN_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    pub outlier: OutlierConfig,
    pub coercion: CoercionConfig,
    pub diagnostics: DiagnosticsConfig,
    pub encoding: EncodingConfig,
    pub min_rows: usize,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            outlier: OutlierConfig::default(),
            coercion: CoercionConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
            encoding: EncodingConfig::default(),
            min_rows: DEFAULT_MIN_ROWS,
        }
    }
}

/// Outlier treatment applied during preparation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    #[serde(flatten)]
    pub params: OutlierParams,
    pub action: OutlierAction,
    /// Columns to check. Empty disables treatment.
    pub columns: Vec<String>,
}

impl OutlierConfig {
    /// One rule per configured column, all sharing `params`.
    pub fn rules(&self) -> Vec<ColumnRule> {
        self.columns
            .iter()
            .map(|c| ColumnRule::new(c.clone(), self.params))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoercionConfig {
    /// Try to convert text feature columns to numbers.
    pub auto_convert: bool,
    /// Columns parsed as rupiah amounts ("2,5 juta").
    pub force_currency_columns: Vec<String>,
}

impl Default for CoercionConfig {
    fn default() -> Self {
        Self {
            auto_convert: true,
            force_currency_columns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Run distribution fitting. When off, diagnostics report moments only.
    pub enabled: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Categorical cleanup and encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Canonicalize elevation, contour and road/document columns first.
    pub standardize_categories: bool,
    pub one_hot_max_cardinality: usize,
    /// Address tokens kept per address column (10 to 120).
    pub address_top_n: usize,
    pub min_token_len: usize,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            standardize_categories: true,
            one_hot_max_cardinality: ONE_HOT_MAX_CARDINALITY,
            address_top_n: DEFAULT_ADDRESS_TOP_N,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
        }
    }
}

impl PrepConfig {
    /// Loads `path` over the defaults, applies `LANDPREP_*` overrides and
    /// validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::ReadError {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Parses configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.outlier.params;
        if !(p.iqr_k.is_finite() && p.iqr_k > 0.0) {
            return Err(invalid("outlier.iqr_k", "must be a positive number"));
        }
        if !(p.z_k.is_finite() && p.z_k > 0.0) {
            return Err(invalid("outlier.z_k", "must be a positive number"));
        }
        if !(0.0..=1.0).contains(&p.q_low) || !(0.0..=1.0).contains(&p.q_high) {
            return Err(invalid("outlier.q_low", "quantiles must be between 0.0 and 1.0"));
        }
        if p.q_low >= p.q_high {
            return Err(invalid("outlier.q_high", "must be greater than q_low"));
        }
        if self.min_rows == 0 {
            return Err(invalid("min_rows", "must be at least 1"));
        }
        if !(10..=120).contains(&self.encoding.address_top_n) {
            return Err(invalid("encoding.address_top_n", "must be between 10 and 120"));
        }
        if self.encoding.min_token_len == 0 {
            return Err(invalid("encoding.min_token_len", "must be at least 1"));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `LANDPREP_*` overrides from `lookup`. Unparseable values are
    /// ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LANDPREP_OUTLIER_METHOD").and_then(|s| s.parse::<OutlierMethod>().ok()) {
            self.outlier.params.method = v;
        }
        if let Some(v) = lookup("LANDPREP_OUTLIER_ACTION") {
            match v.trim().to_ascii_lowercase().as_str() {
                "drop" => self.outlier.action = OutlierAction::Drop,
                "winsorize" => self.outlier.action = OutlierAction::Winsorize,
                _ => {}
            }
        }
        if let Some(v) = lookup("LANDPREP_MIN_ROWS").and_then(|s| s.parse::<usize>().ok()) {
            self.min_rows = v;
        }
        if let Some(v) = lookup("LANDPREP_AUTO_CONVERT").and_then(|s| s.parse::<bool>().ok()) {
            self.coercion.auto_convert = v;
        }
        if let Some(v) = lookup("LANDPREP_DIAGNOSTICS_ENABLED").and_then(|s| s.parse::<bool>().ok()) {
            self.diagnostics.enabled = v;
        }
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = PrepConfig::default();
        assert_eq!(c.min_rows, 10);
        assert_eq!(c.outlier.params, OutlierParams::default());
        assert_eq!(c.outlier.action, OutlierAction::Drop);
        assert!(c.coercion.auto_convert);
        assert!(c.diagnostics.enabled);
        assert!(c.encoding.standardize_categories);
        assert_eq!(c.encoding.one_hot_max_cardinality, 50);
        assert_eq!(c.encoding.address_top_n, 40);
        assert_eq!(c.encoding.min_token_len, 3);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(PrepConfig::from_toml("").unwrap(), PrepConfig::default());
    }

    #[test]
    fn test_full_toml() {
        let c = PrepConfig::from_toml(
            r#"
            min_rows = 25

            [outlier]
            method = "zscore"
            z_k = 2.5
            action = "winsorize"
            columns = ["harga", "luas"]

            [coercion]
            auto_convert = false
            force_currency_columns = ["harga"]

            [diagnostics]
            enabled = false

            [encoding]
            standardize_categories = false
            address_top_n = 80
            "#,
        )
        .unwrap();
        assert_eq!(c.min_rows, 25);
        assert_eq!(c.outlier.params.method, OutlierMethod::ZScore);
        assert_eq!(c.outlier.params.z_k, 2.5);
        assert_eq!(c.outlier.params.iqr_k, 1.5);
        assert_eq!(c.outlier.action, OutlierAction::Winsorize);
        assert_eq!(c.coercion.force_currency_columns, ["harga"]);
        assert!(!c.coercion.auto_convert);
        assert!(!c.diagnostics.enabled);
        assert!(!c.encoding.standardize_categories);
        assert_eq!(c.encoding.address_top_n, 80);
        assert_eq!(c.encoding.one_hot_max_cardinality, 50);

        let rules = c.outlier.rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].column, "luas");
        assert_eq!(rules[1].params.method, OutlierMethod::ZScore);
    }

    #[test]
    fn test_unknown_method_rejected() {
        let err = PrepConfig::from_toml("[outlier]\nmethod = \"median\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_validation() {
        let mut c = PrepConfig::default();
        c.outlier.params.q_low = 0.9;
        c.outlier.params.q_high = 0.1;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::ValidationFailed { ref field, .. }) if field == "outlier.q_high"
        ));

        let mut c = PrepConfig::default();
        c.outlier.params.iqr_k = 0.0;
        assert!(c.validate().is_err());

        let mut c = PrepConfig::default();
        c.min_rows = 0;
        assert!(c.validate().is_err());

        let mut c = PrepConfig::default();
        c.encoding.address_top_n = 5;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::ValidationFailed { ref field, .. }) if field == "encoding.address_top_n"
        ));

        let mut c = PrepConfig::default();
        c.encoding.min_token_len = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut c = PrepConfig::default();
        c.apply_overrides(|key| match key {
            "LANDPREP_OUTLIER_METHOD" => Some("quantile".into()),
            "LANDPREP_OUTLIER_ACTION" => Some("Winsorize".into()),
            "LANDPREP_MIN_ROWS" => Some("not a number".into()),
            "LANDPREP_DIAGNOSTICS_ENABLED" => Some("false".into()),
            _ => None,
        });
        assert_eq!(c.outlier.params.method, OutlierMethod::Quantile);
        assert_eq!(c.outlier.action, OutlierAction::Winsorize);
        assert_eq!(c.min_rows, DEFAULT_MIN_ROWS);
        assert!(!c.diagnostics.enabled);
    }

    #[test]
    fn test_missing_file() {
        let err = PrepConfig::load(Some(Path::new("/nonexistent/landprep.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_unreadable_file_is_not_reported_missing() {
        let dir = std::env::temp_dir();
        let err = PrepConfig::from_file(&dir).unwrap_err();
        match err {
            ConfigError::ReadError { path, message } => {
                assert_eq!(path, dir.display().to_string());
                assert!(!message.is_empty());
            }
            other => panic!("expected ReadError, got {other:?}"),
        }

        let file = dir.join(format!("landprep-invalid-utf8-{}.toml", std::process::id()));
        std::fs::write(&file, [0x6d, 0x69, 0x6e, 0xff, 0xfe]).unwrap();
        let err = PrepConfig::from_file(&file).unwrap_err();
        let _ = std::fs::remove_file(&file);
        assert!(matches!(err, ConfigError::ReadError { .. }), "{err:?}");
    }
}
