use serde::Serialize;
use std::collections::BTreeMap;

/// A single decoded CSV cell.
///
/// Cells are plain text unless the falsify rule turned a `false` literal into
/// a boolean, or the row was shorter than the header and had to be padded.
/// Serialized untagged, so a row reads as `["Alice", false, null]` in JSON.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Flag(bool),
    /// Padding for a row that has fewer cells than the header.
    Missing,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// True for padded cells and for text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Text(value) => value.trim().is_empty(),
            Cell::Flag(_) => false,
            Cell::Missing => true,
        }
    }
}

/// One data row keyed by the header row.
pub type RowMap = BTreeMap<String, Cell>;

/// The decoded content of an uploaded CSV file.
///
/// `Raw` keeps the header row as its first element; `Keyed` drops it and uses
/// its values as the keys of every following row.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum CsvRows {
    Raw(Vec<Vec<Cell>>),
    Keyed(Vec<RowMap>),
}

impl CsvRows {
    /// Number of data rows, header excluded in both representations.
    pub fn data_len(&self) -> usize {
        match self {
            CsvRows::Raw(rows) => rows.len().saturating_sub(1),
            CsvRows::Keyed(rows) => rows.len(),
        }
    }
}

/// Per-request settings for decoding the uploaded CSV file.
///
/// Built before the body is parsed and handed to the parser explicitly; the
/// parser never looks anything up on the request itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvOptions {
    /// Produce header-keyed rows instead of raw rows.
    pub with_keys: bool,
    /// Keep only these columns, in this order.
    pub columns: Option<Vec<String>>,
    /// Trim data cells and turn a case-insensitive `false` into `Cell::Flag(false)`.
    pub strip_and_falsify: bool,
    /// Lower-case header names (and the `columns` filter along with them).
    pub lower_case_columns: bool,
    /// Drop data rows whose selected cells are all blank.
    pub skip_blank_rows: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            with_keys: false,
            columns: None,
            strip_and_falsify: true,
            lower_case_columns: false,
            skip_blank_rows: true,
        }
    }
}

impl CsvOptions {
    pub fn keyed() -> Self {
        Self {
            with_keys: true,
            ..Self::default()
        }
    }
}
