//! Decodes the bytes of an uploaded CSV file into `CsvRows`.
//!
//! The first record is always the header row. Header names are trimmed (and
//! lower-cased on request) before they are used as keys or as the first raw
//! row. Data rows wider than the header are rejected; shorter rows are padded
//! with `Cell::Missing` so that every row lines up with the header.
//!
//! Quoting is checked before parsing: a quote may only open a field, a
//! closing quote must end the field, and every opened quote must be closed.

use common::model::csv::{Cell, CsvOptions, CsvRows, RowMap};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum CsvReadError {
    #[error("CSV file is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed CSV: {0}")]
    Malformed(#[from] csv::Error),

    #[error("unterminated quote opened at line {line}")]
    UnterminatedQuote { line: u64 },

    #[error("stray quote at line {line}")]
    StrayQuote { line: u64 },

    #[error("CSV file has no header row")]
    Empty,

    #[error("row at line {line} has {found} cells but the header has {expected}")]
    RowTooWide {
        line: u64,
        found: usize,
        expected: usize,
    },

    #[error("duplicate header `{0}`")]
    DuplicateHeader(String),

    #[error("unknown column `{0}`")]
    UnknownColumn(String),
}

/// Reads a whole CSV document according to `options`.
pub fn read(bytes: &[u8], options: &CsvOptions) -> Result<CsvRows, CsvReadError> {
    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    check_quoting(text)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header_record = match records.next() {
        Some(record) => record?,
        None => return Err(CsvReadError::Empty),
    };
    let headers: Vec<String> = header_record
        .iter()
        .map(|h| normalize_header(h, options.lower_case_columns))
        .collect();
    let selection = select_columns(&headers, options)?;

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for record in records {
        let record = record?;
        if record.len() > headers.len() {
            return Err(CsvReadError::RowTooWide {
                line: line_of(&record),
                found: record.len(),
                expected: headers.len(),
            });
        }

        let cells: Vec<Cell> = selection
            .iter()
            .map(|&idx| match record.get(idx) {
                Some(raw) => to_cell(raw, options.strip_and_falsify),
                None => Cell::Missing,
            })
            .collect();

        if options.skip_blank_rows && cells.iter().all(Cell::is_blank) {
            continue;
        }
        rows.push(cells);
    }

    let headers: Vec<String> = selection.iter().map(|&idx| headers[idx].clone()).collect();
    log::debug!(
        "decoded CSV with {} columns and {} data rows",
        headers.len(),
        rows.len()
    );

    if options.with_keys {
        Ok(CsvRows::Keyed(key_rows(headers, rows)?))
    } else {
        let mut raw = Vec::with_capacity(rows.len() + 1);
        raw.push(headers.into_iter().map(Cell::Text).collect());
        raw.extend(rows);
        Ok(CsvRows::Raw(raw))
    }
}

/// Walks the text once, tracking quote state. A quote opens a field only at
/// its start, and a closing quote is followed by a delimiter, a line break
/// or the end of input.
fn check_quoting(text: &str) -> Result<(), CsvReadError> {
    let mut line = 1u64;
    let mut opened_at: Option<u64> = None;
    let mut field_start = true;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if opened_at.is_some() {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => {
                    opened_at = None;
                    if !matches!(chars.peek(), None | Some(',' | '\r' | '\n')) {
                        return Err(CsvReadError::StrayQuote { line });
                    }
                }
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' if field_start => {
                opened_at = Some(line);
                field_start = false;
            }
            '"' => return Err(CsvReadError::StrayQuote { line }),
            ',' | '\r' => field_start = true,
            '\n' => {
                line += 1;
                field_start = true;
            }
            _ => field_start = false,
        }
    }

    match opened_at {
        Some(line) => Err(CsvReadError::UnterminatedQuote { line }),
        None => Ok(()),
    }
}

fn normalize_header(header: &str, lower_case: bool) -> String {
    let header = header.trim();
    if lower_case {
        header.to_lowercase()
    } else {
        header.to_string()
    }
}

/// Indices of the columns to keep, in output order.
fn select_columns(headers: &[String], options: &CsvOptions) -> Result<Vec<usize>, CsvReadError> {
    let Some(columns) = options.columns.as_ref() else {
        return Ok((0..headers.len()).collect());
    };

    columns
        .iter()
        .map(|column| {
            let wanted = normalize_header(column, options.lower_case_columns);
            headers
                .iter()
                .position(|h| *h == wanted)
                .ok_or(CsvReadError::UnknownColumn(wanted))
        })
        .collect()
}

fn to_cell(raw: &str, strip_and_falsify: bool) -> Cell {
    if !strip_and_falsify {
        return Cell::text(raw);
    }
    let value = raw.trim();
    if value.eq_ignore_ascii_case("false") {
        Cell::Flag(false)
    } else {
        Cell::text(value)
    }
}

fn key_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Vec<RowMap>, CsvReadError> {
    let mut seen = HashSet::with_capacity(headers.len());
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(CsvReadError::DuplicateHeader(header.clone()));
        }
    }

    Ok(rows
        .into_iter()
        .map(|cells| headers.iter().cloned().zip(cells).collect())
        .collect())
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}
