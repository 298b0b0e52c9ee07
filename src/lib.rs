//! # landprep
//!
//! Cleaning and outlier handling for land-price listing data.
//!
//! Listing tables arrive with prices and areas as free text (`"1,5 miliar"`,
//! `"2.500.000"`, `"120 m2"`). This crate turns them into numeric columns,
//! diagnoses their distribution, and removes or clamps outliers before the
//! data is handed to a price regression model.
//!
//! ## Modules
//!
//! - [`parse`]: locale-aware number and rupiah phrase parsing
//! - [`column`]: `Column` / `Dataset` table model
//! - [`coerce`]: column-level numeric coercion with success-rate thresholds
//! - [`encode`]: category cleanup, one-hot, frequency and address-token encoding
//! - [`outlier`]: IQR, z-score, log-IQR and quantile bounds; masks
//! - [`distributions`]: the seven-family catalog with MLE fitting
//! - [`fitting`]: ranked fits, KS tests and method recommendation
//! - [`treatment`]: row drop or winsorization over a dataset
//! - [`prepare`]: end-to-end training data preparation
//! - [`metrics`]: regression error metrics
//! - [`stats`], [`special`]: numerical building blocks
//! - [`config`], [`error`]: configuration and error types
//!
//! ## Design Philosophy
//!
//! - **Unparseable is missing**: a bad cell becomes `NaN`/`None`, never an
//!   error; missing values never enter a statistic
//! - **Numerical stability first**: compensated summation, Welford
//!   variance, Lentz continued fractions
//! - **Property-based testing**: invariants verified via proptest

pub mod coerce;
pub mod column;
pub mod config;
pub mod distributions;
pub mod encode;
pub mod error;
pub mod fitting;
pub mod metrics;
pub mod outlier;
pub mod parse;
pub mod prepare;
#[cfg(test)]
pub(crate) mod random;
pub mod special;
pub mod stats;
pub mod treatment;
