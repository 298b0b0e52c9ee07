//! Categorical cleanup and feature encoding.
//!
//! Listing tables carry free-form categorical columns (terrain contour,
//! elevation relative to the road, ownership document, address). This
//! module canonicalizes the known ones and turns the remaining text
//! features into numbers:
//!
//! | Encoder | Used for | Output columns |
//! |---|---|---|
//! | [`OneHotEncoder`] | ≤ [`ONE_HOT_MAX_CARDINALITY`] distinct values | `<col>_<category>` |
//! | [`FrequencyEncoder`] | high-cardinality columns, addresses | `<col>__freq` |
//! | [`AddressTopTokens`] | address-like columns | `<col>__TOK_<token>` |
//!
//! [`plan_encoding`] assigns columns to encoders; [`FeatureEncoder`] fits
//! them all and produces a purely numeric [`Dataset`].

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::coerce::numeric_values;
use crate::column::{Column, Dataset};
use crate::config::EncodingConfig;
use crate::error::DatasetError;
use crate::stats;

/// Text columns with at most this many distinct values are one-hot encoded.
pub const ONE_HOT_MAX_CARDINALITY: usize = 50;

/// Lowercase name fragments marking an address column.
pub const ADDRESS_KEYWORDS: &[&str] = &["alamat", "address", "lokasi", "jalan"];

pub const DEFAULT_ADDRESS_TOP_N: usize = 40;
pub const DEFAULT_MIN_TOKEN_LEN: usize = 3;

/// Elevation-relative-to-road column.
pub const ELEVATION_COLUMN: &str = "elavasi";
pub const CONTOUR_COLUMN: &str = "kontur";

/// Columns normalized to title case.
pub const TITLE_CASE_COLUMNS: &[&str] = &[
    "kondisi_jalan",
    "kontruksi_jalan",
    "pemanfaatan_sekitar",
    "dokumen_kepemilikan",
];

const ELEVATION_VALUES: &[(&str, &str)] = &[
    ("sama dengan jalan", "Sama Dengan Jalan"),
    ("Sama dengan jalan", "Sama Dengan Jalan"),
    ("Sama Dengan Jalan", "Sama Dengan Jalan"),
    ("lebih tinggi dari jalan", "Lebih Tinggi"),
    ("lebih tinggi", "Lebih Tinggi"),
    ("Lebih tinggi", "Lebih Tinggi"),
    ("Lebih Tinggi", "Lebih Tinggi"),
    ("lebih rendah dari jalan", "Lebih Rendah"),
    ("lebih rendah", "Lebih Rendah"),
    ("Lebih rendah", "Lebih Rendah"),
    ("Lebih Rendah", "Lebih Rendah"),
];
const ELEVATION_FALLBACK: &str = "Datar";

const CONTOUR_VALUES: &[(&str, &str)] = &[
    ("datar", "Datar"),
    ("Datar", "Datar"),
    ("1 datar", "Datar"),
    ("2 datar", "Datar"),
    ("datar dan butuh uruk", "Datar"),
    ("bergelombang", "Bergelombang"),
    ("Bergelombang", "Bergelombang"),
    ("miring", "Miring"),
    ("Miring", "Miring"),
    ("Miring-Mendaki", "Miring"),
    ("terasering", "Terasering"),
    ("Terasering", "Terasering"),
];
const CONTOUR_FALLBACK: &str = "Rata";

/// Street prefixes, house numbers and RT/RW neighbourhood codes.
static ADDRESS_NOISE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(JALAN|JLN|JL|JL\.|GG|GANG|NO\.?\s*\d+|RT\s*\d+/?\d*|RW\s*\d+)\b").ok()
});
static NON_ALNUM: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[^A-Z0-9 ]+").ok());

// ============================================================================
// Category cleanup
// ============================================================================

/// Cells of `column` as category labels; numbers are rendered as text.
fn category_cells(column: &Column) -> Vec<Option<String>> {
    match column {
        Column::Text(cells) => cells.clone(),
        Column::Numeric(values) => values
            .iter()
            .map(|v| (!v.is_nan()).then(|| v.to_string()))
            .collect(),
    }
}

/// Capitalizes the first letter of every alphabetic run and lowercases the
/// rest: `"jalan ASPAL"` → `"Jalan Aspal"`, `"cor-beton"` → `"Cor-Beton"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn map_values(column: &Column, table: &[(&str, &str)], fallback: &str) -> Column {
    let cells = category_cells(column)
        .into_iter()
        .map(|cell| {
            let key = cell.as_deref().map(str::trim).unwrap_or_default();
            let mapped = table
                .iter()
                .find(|(raw, _)| *raw == key)
                .map_or(fallback, |&(_, canonical)| canonical);
            Some(mapped.to_string())
        })
        .collect();
    Column::Text(cells)
}

/// Canonicalizes the known categorical columns of a listing table.
///
/// - [`ELEVATION_COLUMN`]: mapped onto `Sama Dengan Jalan`, `Lebih Tinggi`,
///   `Lebih Rendah`; anything else, including missing, becomes `Datar`.
/// - [`CONTOUR_COLUMN`]: mapped onto `Datar`, `Bergelombang`, `Miring`,
///   `Terasering`; anything else becomes `Rata`.
/// - [`TITLE_CASE_COLUMNS`]: trimmed and title-cased; missing stays missing.
///
/// Absent columns are skipped.
///
/// # Examples
/// ```
/// use landprep::column::{Column, Dataset};
/// use landprep::encode::standardize_categories;
///
/// let ds = Dataset::from_columns([
///     ("kontur", Column::text([" datar ", "Miring-Mendaki", "curam"])),
///     ("kondisi_jalan", Column::text(["jalan ASPAL", "cor beton", "tanah"])),
/// ]).unwrap();
/// let clean = standardize_categories(&ds).unwrap();
/// assert_eq!(clean.column("kontur").unwrap(), &Column::text(["Datar", "Miring", "Rata"]));
/// assert_eq!(
///     clean.column("kondisi_jalan").unwrap(),
///     &Column::text(["Jalan Aspal", "Cor Beton", "Tanah"]),
/// );
/// ```
pub fn standardize_categories(dataset: &Dataset) -> Result<Dataset, DatasetError> {
    let mut out = dataset.clone();
    if let Some(column) = dataset.column(ELEVATION_COLUMN) {
        out.replace_column(
            ELEVATION_COLUMN,
            map_values(column, ELEVATION_VALUES, ELEVATION_FALLBACK),
        )?;
    }
    if let Some(column) = dataset.column(CONTOUR_COLUMN) {
        out.replace_column(
            CONTOUR_COLUMN,
            map_values(column, CONTOUR_VALUES, CONTOUR_FALLBACK),
        )?;
    }
    for &name in TITLE_CASE_COLUMNS {
        if let Some(column) = dataset.column(name) {
            let cells = category_cells(column)
                .into_iter()
                .map(|cell| cell.map(|s| title_case(s.trim())))
                .collect();
            out.replace_column(name, Column::Text(cells))?;
        }
    }
    Ok(out)
}

// ============================================================================
// Frequency encoding
// ============================================================================

/// Replaces each category with the number of training rows that carried it.
///
/// Missing cells count as the category `"NA"`. Categories never seen during
/// fitting encode as `1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyEncoder {
    column: String,
    counts: BTreeMap<String, usize>,
}

impl FrequencyEncoder {
    const MISSING: &'static str = "NA";

    pub fn fit(name: impl Into<String>, column: &Column) -> Self {
        let mut counts = BTreeMap::new();
        for cell in category_cells(column) {
            *counts
                .entry(cell.unwrap_or_else(|| Self::MISSING.to_string()))
                .or_insert(0) += 1;
        }
        Self {
            column: name.into(),
            counts,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn output_name(&self) -> String {
        format!("{}__freq", self.column)
    }

    /// Encoded value of one category.
    pub fn frequency(&self, category: Option<&str>) -> f64 {
        let key = category.unwrap_or(Self::MISSING);
        self.counts.get(key).map_or(1.0, |&c| c as f64)
    }

    pub fn transform(&self, column: &Column) -> Vec<f64> {
        category_cells(column)
            .iter()
            .map(|cell| self.frequency(cell.as_deref()))
            .collect()
    }
}

// ============================================================================
// One-hot encoding
// ============================================================================

/// One indicator column per category seen during fitting.
///
/// Missing cells are imputed with the most frequent category (ties go to
/// the smallest label). Categories are sorted; an unseen category encodes as
/// all zeros.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneHotEncoder {
    column: String,
    categories: Vec<String>,
    fill: Option<String>,
}

impl OneHotEncoder {
    pub fn fit(name: impl Into<String>, column: &Column) -> Self {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for cell in category_cells(column).into_iter().flatten() {
            *counts.entry(cell).or_insert(0) += 1;
        }
        // BTreeMap iterates in label order, so the first maximum is the smallest label
        let mut fill: Option<(&String, usize)> = None;
        for (label, &count) in &counts {
            if fill.map_or(true, |(_, best)| count > best) {
                fill = Some((label, count));
            }
        }
        let fill = fill.map(|(label, _)| label.clone());
        Self {
            column: name.into(),
            categories: counts.into_keys().collect(),
            fill,
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn output_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.column, c))
            .collect()
    }

    /// One indicator vector per category, in [`categories`](Self::categories) order.
    pub fn transform(&self, column: &Column) -> Vec<Vec<f64>> {
        let cells = category_cells(column);
        self.categories
            .iter()
            .map(|category| {
                cells
                    .iter()
                    .map(|cell| {
                        let value = cell.as_deref().or(self.fill.as_deref());
                        if value == Some(category.as_str()) {
                            1.0
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

// ============================================================================
// Address tokens
// ============================================================================

/// Uppercases an address and strips street prefixes (`JL`, `GANG`, …),
/// house numbers and RT/RW codes, leaving single-space separated tokens.
///
/// # Examples
/// ```
/// use landprep::encode::clean_address;
/// assert_eq!(clean_address("Jl. Margonda Raya No. 12, RT 03/05 Depok"), "MARGONDA RAYA DEPOK");
/// ```
pub fn clean_address(address: &str) -> String {
    let mut s = address.to_uppercase();
    if let Some(re) = ADDRESS_NOISE.as_ref() {
        s = re.replace_all(&s, " ").into_owned();
    }
    if let Some(re) = NON_ALNUM.as_ref() {
        s = re.replace_all(&s, " ").into_owned();
    }
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Binary indicators for the most frequent tokens of an address column.
///
/// Tokens shorter than `min_len` characters are ignored. Ranking is by
/// count, ties in order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressTopTokens {
    column: String,
    tokens: Vec<String>,
}

impl AddressTopTokens {
    pub fn fit(name: impl Into<String>, column: &Column, top_n: usize, min_len: usize) -> Self {
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let mut next_seen = 0;
        for cell in category_cells(column) {
            let cleaned = clean_address(cell.as_deref().unwrap_or_default());
            for token in cleaned.split(' ').filter(|t| t.chars().count() >= min_len) {
                let entry = counts.entry(token.to_string()).or_insert_with(|| {
                    next_seen += 1;
                    (0, next_seen)
                });
                entry.0 += 1;
            }
        }
        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        let tokens: Vec<String> = ranked.into_iter().take(top_n).map(|(t, _)| t).collect();
        let column = name.into();
        debug!(column = %column, tokens = tokens.len(), "fitted address tokens");
        Self { column, tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// `<col>__TOK_<token>` per token, or a single `<col>__TOK_NONE`
    /// placeholder when nothing was learned.
    pub fn output_names(&self) -> Vec<String> {
        if self.tokens.is_empty() {
            return vec![format!("{}__TOK_NONE", self.column)];
        }
        self.tokens
            .iter()
            .map(|t| format!("{}__TOK_{}", self.column, t))
            .collect()
    }

    /// One indicator vector per output name.
    pub fn transform(&self, column: &Column) -> Vec<Vec<f64>> {
        let cleaned: Vec<String> = category_cells(column)
            .iter()
            .map(|cell| clean_address(cell.as_deref().unwrap_or_default()))
            .collect();
        if self.tokens.is_empty() {
            return vec![vec![0.0; cleaned.len()]];
        }
        self.tokens
            .iter()
            .map(|token| {
                cleaned
                    .iter()
                    .map(|s| {
                        if s.split(' ').any(|w| w == token) {
                            1.0
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

// ============================================================================
// Planning and the combined encoder
// ============================================================================

/// How each feature column is turned into numbers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EncodingPlan {
    /// Used as-is, missing values replaced by the column median.
    pub numeric: Vec<String>,
    pub one_hot: Vec<String>,
    pub frequency: Vec<String>,
    /// Address tokens plus frequency encoding.
    pub address: Vec<String>,
}

/// Whether the lowercase column name contains one of [`ADDRESS_KEYWORDS`].
pub fn is_address_column(name: &str) -> bool {
    let lower = name.to_lowercase();
    ADDRESS_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Number of distinct present categories.
pub fn cardinality(column: &Column) -> usize {
    let mut seen: Vec<String> = category_cells(column).into_iter().flatten().collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

/// Splits `features` between the encoders.
///
/// Features listed in `numeric` whose column is numeric stay numeric.
/// Every other feature is categorical: address-named columns go to
/// [`EncodingPlan::address`], the rest to one-hot when their
/// [`cardinality`] is at most `max_one_hot`, otherwise to frequency
/// encoding. Unknown columns are skipped.
pub fn plan_encoding<S: AsRef<str>>(
    dataset: &Dataset,
    features: &[S],
    numeric: &[S],
    max_one_hot: usize,
) -> EncodingPlan {
    let mut plan = EncodingPlan::default();
    for name in features.iter().map(AsRef::as_ref) {
        let Some(column) = dataset.column(name) else {
            continue;
        };
        let listed_numeric = numeric.iter().any(|n| n.as_ref() == name);
        let bucket = if listed_numeric && column.is_numeric() {
            &mut plan.numeric
        } else if is_address_column(name) {
            &mut plan.address
        } else if cardinality(column) <= max_one_hot {
            &mut plan.one_hot
        } else {
            &mut plan.frequency
        };
        if !bucket.iter().any(|n| n == name) {
            bucket.push(name.to_string());
        }
    }
    plan
}

/// Fitted encoders for an [`EncodingPlan`].
///
/// Output columns come in plan order: numeric, one-hot, frequency, then
/// tokens and frequency for each address column. A numeric column with no
/// observed value has no median and is left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureEncoder {
    medians: Vec<(String, f64)>,
    one_hot: Vec<OneHotEncoder>,
    frequency: Vec<FrequencyEncoder>,
    address: Vec<(AddressTopTokens, FrequencyEncoder)>,
}

impl FeatureEncoder {
    /// # Errors
    /// [`DatasetError::UnknownColumn`] for a planned column missing from `dataset`.
    pub fn fit(
        dataset: &Dataset,
        plan: &EncodingPlan,
        config: &EncodingConfig,
    ) -> Result<Self, DatasetError> {
        let mut medians = Vec::new();
        for name in &plan.numeric {
            let observed: Vec<f64> = stats::drop_missing(&numeric_values(dataset.require(name)?));
            match stats::median(&observed) {
                Some(m) => medians.push((name.clone(), m)),
                None => debug!(column = %name, "numeric feature has no observed values"),
            }
        }
        let one_hot = plan
            .one_hot
            .iter()
            .map(|name| Ok(OneHotEncoder::fit(name.clone(), dataset.require(name)?)))
            .collect::<Result<_, DatasetError>>()?;
        let frequency = plan
            .frequency
            .iter()
            .map(|name| Ok(FrequencyEncoder::fit(name.clone(), dataset.require(name)?)))
            .collect::<Result<_, DatasetError>>()?;
        let address = plan
            .address
            .iter()
            .map(|name| {
                let column = dataset.require(name)?;
                Ok((
                    AddressTopTokens::fit(
                        name.clone(),
                        column,
                        config.address_top_n,
                        config.min_token_len,
                    ),
                    FrequencyEncoder::fit(name.clone(), column),
                ))
            })
            .collect::<Result<_, DatasetError>>()?;
        Ok(Self {
            medians,
            one_hot,
            frequency,
            address,
        })
    }

    /// Output column names, in [`transform`](Self::transform) order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.medians.iter().map(|(n, _)| n.clone()).collect();
        for enc in &self.one_hot {
            names.extend(enc.output_names());
        }
        for enc in &self.frequency {
            names.push(enc.output_name());
        }
        for (tokens, freq) in &self.address {
            names.extend(tokens.output_names());
            names.push(freq.output_name());
        }
        names
    }

    /// Encodes `dataset` into a purely numeric table.
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`] if a fitted column is missing, or
    /// [`DatasetError::DuplicateColumn`] if two outputs share a name.
    pub fn transform(&self, dataset: &Dataset) -> Result<Dataset, DatasetError> {
        let mut out = Dataset::new();
        for (name, median) in &self.medians {
            let values = numeric_values(dataset.require(name)?)
                .into_iter()
                .map(|v| if v.is_nan() { *median } else { v })
                .collect();
            out.push_column(name.clone(), Column::Numeric(values))?;
        }
        for enc in &self.one_hot {
            let column = dataset.require(&enc.column)?;
            for (name, values) in enc.output_names().into_iter().zip(enc.transform(column)) {
                out.push_column(name, Column::Numeric(values))?;
            }
        }
        for enc in &self.frequency {
            let column = dataset.require(enc.column())?;
            out.push_column(enc.output_name(), Column::Numeric(enc.transform(column)))?;
        }
        for (tokens, freq) in &self.address {
            let column = dataset.require(freq.column())?;
            for (name, values) in tokens.output_names().into_iter().zip(tokens.transform(column)) {
                out.push_column(name, Column::Numeric(values))?;
            }
            out.push_column(freq.output_name(), Column::Numeric(freq.transform(column)))?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[Option<&str>]) -> Column {
        Column::Text(values.iter().map(|v| v.map(str::to_string)).collect())
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("jalan ASPAL"), "Jalan Aspal");
        assert_eq!(title_case("cor-beton"), "Cor-Beton");
        assert_eq!(title_case("shm 2lajur"), "Shm 2Lajur");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_standardize_elevation_and_contour() {
        let ds = Dataset::from_columns([
            (
                "elavasi",
                cells(&[Some(" lebih tinggi dari jalan"), Some("Sama dengan jalan"), None, Some("??")]),
            ),
            (
                "kontur",
                cells(&[Some("2 datar"), Some("terasering"), Some("curam"), None]),
            ),
            ("dokumen_kepemilikan", cells(&[Some(" shm "), Some("AJB"), None, Some("girik")])),
            ("luas", Column::Numeric(vec![1.0, 2.0, 3.0, 4.0])),
        ])
        .unwrap();
        let clean = standardize_categories(&ds).unwrap();
        assert_eq!(
            clean.column("elavasi").unwrap(),
            &Column::text(["Lebih Tinggi", "Sama Dengan Jalan", "Datar", "Datar"])
        );
        assert_eq!(
            clean.column("kontur").unwrap(),
            &Column::text(["Datar", "Terasering", "Rata", "Rata"])
        );
        assert_eq!(
            clean.column("dokumen_kepemilikan").unwrap(),
            &cells(&[Some("Shm"), Some("Ajb"), None, Some("Girik")])
        );
        assert_eq!(clean.column("luas"), ds.column("luas"));
        assert_eq!(
            clean.column_names().collect::<Vec<_>>(),
            ds.column_names().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_standardize_without_known_columns_is_identity() {
        let ds = Dataset::from_columns([("kota", Column::text(["bogor"]))]).unwrap();
        assert_eq!(standardize_categories(&ds).unwrap(), ds);
    }

    #[test]
    fn test_frequency_encoder() {
        let train = cells(&[Some("Bogor"), Some("Depok"), Some("Bogor"), None, None, None]);
        let enc = FrequencyEncoder::fit("kota", &train);
        assert_eq!(enc.output_name(), "kota__freq");
        assert_eq!(enc.transform(&train), [2.0, 1.0, 2.0, 3.0, 3.0, 3.0]);

        let test = cells(&[Some("Bekasi"), Some("Depok"), None]);
        assert_eq!(enc.transform(&test), [1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_one_hot_encoder() {
        let train = cells(&[Some("SHM"), Some("AJB"), None, Some("SHM")]);
        let enc = OneHotEncoder::fit("dokumen", &train);
        assert_eq!(enc.categories(), ["AJB", "SHM"]);
        assert_eq!(enc.output_names(), ["dokumen_AJB", "dokumen_SHM"]);
        // missing imputed with the most frequent label
        assert_eq!(
            enc.transform(&train),
            [vec![0.0, 1.0, 0.0, 0.0], vec![1.0, 0.0, 1.0, 1.0]]
        );
        // unseen category encodes as all zeros
        assert_eq!(
            enc.transform(&cells(&[Some("Girik")])),
            [vec![0.0], vec![0.0]]
        );
    }

    #[test]
    fn test_one_hot_fill_tie_goes_to_smallest_label() {
        let enc = OneHotEncoder::fit("k", &cells(&[Some("b"), Some("a"), None]));
        assert_eq!(enc.transform(&cells(&[None])), [vec![1.0], vec![0.0]]);
    }

    #[test]
    fn test_clean_address() {
        assert_eq!(
            clean_address("Jl. Margonda Raya No. 12, RT 03/05 Depok"),
            "MARGONDA RAYA DEPOK"
        );
        assert_eq!(clean_address("Gang Mawar RW 7 Cibubur"), "MAWAR CIBUBUR");
        assert_eq!(clean_address("jalan raya bogor km.30"), "RAYA BOGOR KM 30");
        assert_eq!(clean_address(""), "");
    }

    #[test]
    fn test_address_top_tokens() {
        let addresses = cells(&[
            Some("Jl. Raya Bogor, Cibinong"),
            Some("Jalan Raya Parung, Bogor"),
            Some("Gg. Melati Cibinong"),
            None,
            Some("Jl Raya Bogor No 5"),
        ]);
        let enc = AddressTopTokens::fit("alamat", &addresses, 3, 3);
        // RAYA 3, BOGOR 3, CIBINONG 2, PARUNG 1, MELATI 1
        assert_eq!(enc.tokens(), ["RAYA", "BOGOR", "CIBINONG"]);
        assert_eq!(
            enc.output_names(),
            ["alamat__TOK_RAYA", "alamat__TOK_BOGOR", "alamat__TOK_CIBINONG"]
        );
        let encoded = enc.transform(&addresses);
        assert_eq!(encoded[0], [1.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(encoded[2], [1.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_address_tokens_min_len_and_empty() {
        let enc = AddressTopTokens::fit("alamat", &cells(&[Some("Jl. AB CD"), None]), 10, 3);
        assert!(enc.tokens().is_empty());
        assert_eq!(enc.output_names(), ["alamat__TOK_NONE"]);
        assert_eq!(enc.transform(&cells(&[Some("x"), None])), [vec![0.0, 0.0]]);
    }

    #[test]
    fn test_plan_splits_by_cardinality() {
        let many: Vec<String> = (0..60).map(|i| format!("desa {i}")).collect();
        let few: Vec<&str> = (0..60).map(|i| if i % 2 == 0 { "SHM" } else { "AJB" }).collect();
        let ds = Dataset::from_columns([
            ("luas", Column::Numeric((0..60).map(f64::from).collect())),
            ("desa", Column::text(many)),
            ("dokumen", Column::text(few)),
            ("alamat_lengkap", Column::text(["Jl. Raya"; 60])),
            ("kamar", Column::text(["3"; 60])),
        ])
        .unwrap();
        let features = ["luas", "desa", "dokumen", "alamat_lengkap", "kamar", "missing"];
        let plan = plan_encoding(&ds, &features, &["luas", "kamar"], ONE_HOT_MAX_CARDINALITY);
        assert_eq!(plan.numeric, ["luas"]);
        assert_eq!(plan.one_hot, ["dokumen", "kamar"]);
        assert_eq!(plan.frequency, ["desa"]);
        assert_eq!(plan.address, ["alamat_lengkap"]);
        assert_eq!(cardinality(ds.column("desa").unwrap()), 60);
    }

    #[test]
    fn test_feature_encoder_end_to_end() {
        let ds = Dataset::from_columns([
            ("luas", Column::Numeric(vec![100.0, f64::NAN, 300.0, 200.0])),
            ("dokumen", cells(&[Some("SHM"), Some("AJB"), Some("SHM"), None])),
            ("kota", Column::text(["Bogor", "Depok", "Bogor", "Bogor"])),
            (
                "alamat",
                Column::text(["Jl. Raya Bogor", "Jl. Raya Depok", "Gg. Mawar", "Jl. Raya Bogor"]),
            ),
        ])
        .unwrap();
        let plan = EncodingPlan {
            numeric: vec!["luas".into()],
            one_hot: vec!["dokumen".into()],
            frequency: vec!["kota".into()],
            address: vec!["alamat".into()],
        };
        let config = EncodingConfig {
            address_top_n: 2,
            ..EncodingConfig::default()
        };
        let encoder = FeatureEncoder::fit(&ds, &plan, &config).unwrap();
        let out = encoder.transform(&ds).unwrap();
        assert_eq!(
            encoder.feature_names(),
            [
                "luas",
                "dokumen_AJB",
                "dokumen_SHM",
                "kota__freq",
                "alamat__TOK_RAYA",
                "alamat__TOK_BOGOR",
                "alamat__freq",
            ]
        );
        assert_eq!(
            out.column_names().collect::<Vec<_>>(),
            encoder.feature_names()
        );
        assert!(out.columns().all(|(_, c)| c.is_numeric()));
        assert_eq!(out.column("luas").unwrap().as_numeric().unwrap(), &[100.0, 200.0, 300.0, 200.0]);
        assert_eq!(out.column("kota__freq").unwrap().as_numeric().unwrap(), &[3.0, 1.0, 3.0, 3.0]);
        assert_eq!(
            out.column("alamat__freq").unwrap().as_numeric().unwrap(),
            &[2.0, 1.0, 1.0, 2.0]
        );
        assert_eq!(
            out.column("dokumen_SHM").unwrap().as_numeric().unwrap(),
            &[1.0, 0.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_feature_encoder_unknown_column() {
        let ds = Dataset::from_columns([("luas", Column::Numeric(vec![1.0]))]).unwrap();
        let plan = EncodingPlan {
            frequency: vec!["kota".into()],
            ..EncodingPlan::default()
        };
        assert_eq!(
            FeatureEncoder::fit(&ds, &plan, &EncodingConfig::default()).unwrap_err(),
            DatasetError::UnknownColumn("kota".into())
        );
    }
}
