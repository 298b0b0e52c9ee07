//! Locale-aware parsing of free-form numeric and currency text.
//!
//! Listing data mixes conventions: `"1.250.000,50"` (period thousands,
//! comma decimal), `"2,5"` (comma decimal), `"Rp 1,5 miliar"` (magnitude
//! words). Both parsers are total: a cell that cannot be read yields `None`
//! and never an error.
//!
//! # Separator heuristic
//!
//! After stripping everything except ASCII digits, `-`, `,` and `.`:
//!
//! | Separators present | Interpretation |
//! |---|---|
//! | `,` and `.` | `.` is a thousands separator, `,` the decimal point |
//! | only `,` | `,` is the decimal point |
//! | only `.` or none | parsed as is |
//!
//! A lone period is therefore always a decimal point: `"1.234"` reads as
//! 1.234, not 1234.

/// Magnitude words scanned top to bottom; the first substring match wins
/// and suffixes never combine.
pub const MAGNITUDE_WORDS: &[(&str, f64)] = &[
    ("triliun", 1e12),
    ("milyar", 1e9),
    ("miliar", 1e9),
    ("juta", 1e6),
    ("ribu", 1e3),
];

/// Parses a number written with Indonesian/European separators.
///
/// Returns `None` when nothing parseable remains after stripping
/// (empty input, a lone `-`, several decimal points, a misplaced sign).
///
/// # Examples
/// ```
/// use landprep::parse::parse_local_number;
/// assert_eq!(parse_local_number("1.250.000,50"), Some(1_250_000.5));
/// assert_eq!(parse_local_number("2,5"), Some(2.5));
/// assert_eq!(parse_local_number("Rp 750"), Some(750.0));
/// assert_eq!(parse_local_number("1.234"), Some(1.234));
/// assert_eq!(parse_local_number("n/a"), None);
/// ```
pub fn parse_local_number(s: &str) -> Option<f64> {
    let kept: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | ',' | '.'))
        .collect();

    let normalized = match (kept.contains(','), kept.contains('.')) {
        (true, true) => kept.replace('.', "").replace(',', "."),
        (true, false) => kept.replace(',', "."),
        _ => kept,
    };
    normalized.parse::<f64>().ok()
}

/// Parses a rupiah amount such as `"Rp 2,5 juta"` or `"1 miliar"`.
///
/// # Algorithm
/// 1. Lowercase the text.
/// 2. Take the first maximal run of `[0-9.,]` and read it with
///    [`parse_local_number`].
/// 3. Scale by the first entry of [`MAGNITUDE_WORDS`] found anywhere in
///    the text.
///
/// Only the first run is considered, so a leading stray period
/// (`"Rp. 5 juta"`) yields `None`.
///
/// # Examples
/// ```
/// use landprep::parse::parse_currency_phrase;
/// assert_eq!(parse_currency_phrase("2.5 juta"), Some(2_500_000.0));
/// assert_eq!(parse_currency_phrase("Rp 1,5 Miliar"), Some(1_500_000_000.0));
/// assert_eq!(parse_currency_phrase("abc"), None);
/// ```
pub fn parse_currency_phrase(s: &str) -> Option<f64> {
    let lower = s.to_lowercase();
    let value = parse_local_number(first_number_run(&lower)?)?;
    let multiplier = MAGNITUDE_WORDS
        .iter()
        .find(|(word, _)| lower.contains(word))
        .map_or(1.0, |&(_, m)| m);
    Some(value * multiplier)
}

fn first_number_run(s: &str) -> Option<&str> {
    let is_run_char = |c: char| c.is_ascii_digit() || c == '.' || c == ',';
    let start = s.find(is_run_char)?;
    let len = s[start..]
        .find(|c: char| !is_run_char(c))
        .unwrap_or(s.len() - start);
    Some(&s[start..start + len])
}
