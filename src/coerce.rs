//! Column-level numeric coercion with success-rate thresholds.
//!
//! A text column is converted only when enough of its cells parse. Currency
//! phrases are noisier than plain numbers, so they qualify at a lower rate.
//! Missing cells count in the denominator.

use tracing::debug;

use crate::column::{Column, Dataset};
use crate::parse::{parse_currency_phrase, parse_local_number};

/// Minimum parsed fraction for adopting a currency-parsed column.
pub const CURRENCY_MIN_SUCCESS_RATE: f64 = 0.5;

/// Minimum parsed fraction for adopting a locally-parsed column.
pub const GENERIC_MIN_SUCCESS_RATE: f64 = 0.7;

/// Fraction of cells that `parser` reads successfully.
///
/// Numeric columns report their non-missing fraction. Returns `None` for
/// an empty column.
pub fn success_rate<F>(column: &Column, parser: F) -> Option<f64>
where
    F: Fn(&str) -> Option<f64>,
{
    if column.is_empty() {
        return None;
    }
    let ok = match column {
        Column::Numeric(v) => v.iter().filter(|x| !x.is_nan()).count(),
        Column::Text(cells) => cells
            .iter()
            .filter(|c| c.as_deref().and_then(&parser).is_some())
            .count(),
    };
    Some(ok as f64 / column.len() as f64)
}

/// Converts a text column to numeric when enough cells parse.
///
/// 1. A numeric column is returned unchanged.
/// 2. With `force_currency`, every cell goes through
///    [`parse_currency_phrase`]; the result is adopted at a success rate of
///    at least [`CURRENCY_MIN_SUCCESS_RATE`].
/// 3. Otherwise every cell goes through [`parse_local_number`]; adopted at
///    [`GENERIC_MIN_SUCCESS_RATE`].
/// 4. If neither qualifies the original text column comes back.
///
/// Cells that fail to parse in an adopted column become `NaN`.
///
/// # Examples
/// ```
/// use landprep::column::Column;
/// use landprep::coerce::coerce_column;
///
/// let prices = Column::text(["2,5 juta", "750 ribu", "hubungi kami"]);
/// let Column::Numeric(v) = coerce_column(&prices, true) else { panic!() };
/// assert_eq!(v[..2], [2_500_000.0, 750_000.0]);
/// assert!(v[2].is_nan());
///
/// let notes = Column::text(["dekat tol", "SHM", "12"]);
/// assert!(!coerce_column(&notes, false).is_numeric());
/// ```
pub fn coerce_column(column: &Column, force_currency: bool) -> Column {
    let cells = match column {
        Column::Numeric(_) => return column.clone(),
        Column::Text(cells) => cells,
    };
    if cells.is_empty() {
        return column.clone();
    }

    if force_currency {
        if let Some(values) = try_parse(cells, parse_currency_phrase, CURRENCY_MIN_SUCCESS_RATE) {
            return Column::Numeric(values);
        }
    }
    if let Some(values) = try_parse(cells, parse_local_number, GENERIC_MIN_SUCCESS_RATE) {
        return Column::Numeric(values);
    }
    column.clone()
}

fn try_parse<F>(cells: &[Option<String>], parser: F, min_rate: f64) -> Option<Vec<f64>>
where
    F: Fn(&str) -> Option<f64>,
{
    let values: Vec<f64> = cells
        .iter()
        .map(|c| c.as_deref().and_then(&parser).unwrap_or(f64::NAN))
        .collect();
    let parsed = values.iter().filter(|x| !x.is_nan()).count();
    let rate = parsed as f64 / cells.len() as f64;
    if rate >= min_rate {
        debug!(rate, min_rate, "adopting coerced column");
        Some(values)
    } else {
        debug!(rate, min_rate, "coercion below threshold");
        None
    }
}

/// The numeric view of a column used for outlier bounds and diagnostics.
///
/// Text is coerced with currency forced; if it stays text, each trimmed
/// cell is read as a plain float. Anything unreadable or non-finite is
/// `NaN`.
pub fn numeric_values(column: &Column) -> Vec<f64> {
    match coerce_column(column, true) {
        Column::Numeric(v) => v,
        Column::Text(cells) => cells
            .iter()
            .map(|c| {
                c.as_deref()
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .filter(|x| x.is_finite())
                    .unwrap_or(f64::NAN)
            })
            .collect(),
    }
}

/// Whether at least [`GENERIC_MIN_SUCCESS_RATE`] of the column is numeric
/// after currency coercion.
pub fn is_numeric_like(column: &Column) -> bool {
    if column.is_empty() {
        return false;
    }
    let values = numeric_values(column);
    let present = values.iter().filter(|x| !x.is_nan()).count();
    present as f64 / values.len() as f64 >= GENERIC_MIN_SUCCESS_RATE
}

/// Filters `names` down to existing numeric-like columns, dropping
/// duplicates and keeping first-seen order.
pub fn numeric_like_columns<S: AsRef<str>>(dataset: &Dataset, names: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names.iter().map(AsRef::as_ref) {
        if out.iter().any(|n| n == name) {
            continue;
        }
        match dataset.column(name) {
            Some(column) if is_numeric_like(column) => out.push(name.to_string()),
            Some(_) => {}
            None => debug!(column = name, "skipping unknown column"),
        }
    }
    out
}
