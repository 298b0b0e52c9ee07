//! Columnar data model for listing tables.
//!
//! A [`Column`] is either already numeric (`NaN` marks a missing value) or
//! raw text (`None` marks a missing cell). A [`Dataset`] is an ordered set
//! of uniquely named columns of equal length.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::DatasetError;

/// A single column of a listing table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum Column {
    /// Purely numeric values; `NaN` is missing.
    Numeric(Vec<f64>),
    /// Raw cells as read from the source; `None` is missing.
    Text(Vec<Option<String>>),
}

impl Column {
    /// Builds a text column where every cell is present.
    ///
    /// # Examples
    /// ```
    /// use landprep::column::Column;
    /// let c = Column::text(["2,5 juta", "750 ribu"]);
    /// assert_eq!(c.len(), 2);
    /// assert!(!c.is_numeric());
    /// ```
    pub fn text<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Column::Text(cells.into_iter().map(|s| Some(s.into())).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    /// Number of missing entries (`NaN` or `None`).
    pub fn missing_count(&self) -> usize {
        match self {
            Column::Numeric(v) => v.iter().filter(|x| x.is_nan()).count(),
            Column::Text(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Keeps the rows where `keep` is true, preserving order.
    ///
    /// `keep` must have the column's length.
    pub fn filter_rows(&self, keep: &[bool]) -> Column {
        debug_assert_eq!(keep.len(), self.len());
        match self {
            Column::Numeric(v) => Column::Numeric(select(v, keep)),
            Column::Text(v) => Column::Text(select(v, keep)),
        }
    }
}

fn select<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter(|(_, &k)| k)
        .map(|(v, _)| v.clone())
        .collect()
}

/// An ordered collection of uniquely named, equal-length columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset from `(name, column)` pairs in order.
    ///
    /// # Errors
    /// [`DatasetError::DuplicateColumn`] or [`DatasetError::LengthMismatch`].
    ///
    /// # Examples
    /// ```
    /// use landprep::column::{Column, Dataset};
    /// let ds = Dataset::from_columns([
    ///     ("luas", Column::Numeric(vec![120.0, 90.0])),
    ///     ("harga", Column::text(["1,2 miliar", "850 juta"])),
    /// ]).unwrap();
    /// assert_eq!(ds.n_rows(), 2);
    /// assert_eq!(ds.column_names().collect::<Vec<_>>(), ["luas", "harga"]);
    /// ```
    pub fn from_columns<I, S>(columns: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut ds = Self::new();
        for (name, column) in columns {
            ds.push_column(name, column)?;
        }
        Ok(ds)
    }

    /// Appends a column. The first column fixes the row count.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<(), DatasetError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(DatasetError::DuplicateColumn(name));
        }
        if self.columns.is_empty() {
            self.rows = column.len();
        } else if column.len() != self.rows {
            return Err(DatasetError::LengthMismatch {
                column: name,
                expected: self.rows,
                found: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(&self.columns)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Like [`column`](Self::column) but unknown names are an error.
    pub fn require(&self, name: &str) -> Result<&Column, DatasetError> {
        self.column(name)
            .ok_or_else(|| DatasetError::UnknownColumn(name.to_string()))
    }

    /// Replaces a column in place, returning the previous one.
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<Column, DatasetError> {
        let idx = self
            .position(name)
            .ok_or_else(|| DatasetError::UnknownColumn(name.to_string()))?;
        if column.len() != self.rows {
            return Err(DatasetError::LengthMismatch {
                column: name.to_string(),
                expected: self.rows,
                found: column.len(),
            });
        }
        Ok(std::mem::replace(&mut self.columns[idx], column))
    }

    /// Keeps the rows where `keep` is true in every column; remaining rows
    /// are contiguous and in their original order.
    pub fn filter_rows(&self, keep: &[bool]) -> Dataset {
        debug_assert_eq!(keep.len(), self.rows);
        Dataset {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.filter_rows(keep)).collect(),
            rows: keep.iter().filter(|&&k| k).count(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, column) in self.columns() {
            map.serialize_entry(name, column)?;
        }
        map.end()
    }
}
