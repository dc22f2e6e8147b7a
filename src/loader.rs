//! Reads a source file into a [`Table`] and infers each column's kind.
//!
//! Inference runs once per column, in this order:
//!
//! 1. a header containing `date` (any case) makes a `DateTime` column; values
//!    that do not parse as a calendar value become missing,
//! 2. a column with no values at all stays `Unclassified`,
//! 3. a column whose values all parse as finite floats (exponent notation
//!    included) is `Numeric`,
//! 4. any ASCII letter among the non-missing values makes a `Text` column,
//! 5. anything else becomes `Numeric`, values that do not parse as floats
//!    become missing.
//!
//! Rows shorter than the header are padded with missing cells; longer rows
//! are rejected.
//!
//! A numeric cast that fails for the column as a whole keeps the original
//! text and logs a warning instead of aborting the load.

use std::path::Path;

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;
use log::{debug, warn};
use thiserror::Error;

use crate::{
    data::{Value, contains_ascii_alpha, parse_calendar_value, parse_float, read_cell},
    io_utils,
    table::{Column, ColumnKind, Table},
};

#[derive(Debug, Error, PartialEq)]
pub enum CastError {
    #[error("value '{value}' at row {row} does not fit in a finite float")]
    NonFinite { row: usize, value: String },
}

pub fn is_date_column(name: &str) -> bool {
    name.to_lowercase().contains("date")
}

pub fn load_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Table> {
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers from {path:?}"))?;
    let mut raw_columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} in {path:?}", idx + 2))?;
        let values = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {} in {path:?}", idx + 2))?;
        if values.len() > headers.len() {
            bail!(
                "Row {} in {path:?} has {} field(s), but the header has {}",
                idx + 2,
                values.len(),
                headers.len()
            );
        }
        for (pos, column) in raw_columns.iter_mut().enumerate() {
            column.push(values.get(pos).and_then(|value| read_cell(value)));
        }
    }
    debug!(
        "Read {} row(s) across {} column(s) from {path:?}",
        raw_columns.first().map(Vec::len).unwrap_or(0),
        headers.len()
    );

    Ok(infer_table(headers, raw_columns))
}

pub fn infer_table(headers: Vec<String>, raw_columns: Vec<Vec<Option<String>>>) -> Table {
    let columns = headers
        .into_iter()
        .zip(raw_columns)
        .map(|(name, raw)| infer_column(name, raw))
        .collect();
    Table::new(columns)
}

pub fn infer_column(name: String, raw: Vec<Option<String>>) -> Column {
    if is_date_column(&name) {
        let cells = raw
            .iter()
            .map(|cell| {
                cell.as_deref()
                    .and_then(parse_calendar_value)
                    .map(Value::DateTime)
            })
            .collect();
        return Column::new(name, ColumnKind::DateTime, cells);
    }

    if raw.iter().all(Option::is_none) {
        return Column::new(name, ColumnKind::Unclassified, vec![None; raw.len()]);
    }

    if raw
        .iter()
        .flatten()
        .all(|value| parse_float(value).is_some_and(f64::is_finite))
    {
        let cells = raw
            .iter()
            .map(|cell| cell.as_deref().and_then(parse_float).map(Value::Float))
            .collect();
        return Column::new(name, ColumnKind::Numeric, cells);
    }

    if raw.iter().flatten().any(|value| contains_ascii_alpha(value)) {
        return Column::new(name, ColumnKind::Text, text_cells(raw));
    }

    match cast_numeric(&raw) {
        Ok(cells) => Column::new(name, ColumnKind::Numeric, cells),
        Err(err) => {
            warn!("Keeping column '{name}' as text: {err}");
            Column::new(name, ColumnKind::Text, text_cells(raw))
        }
    }
}

fn text_cells(raw: Vec<Option<String>>) -> Vec<Option<Value>> {
    raw.into_iter().map(|cell| cell.map(Value::Text)).collect()
}

pub fn cast_numeric(raw: &[Option<String>]) -> Result<Vec<Option<Value>>, CastError> {
    raw.iter()
        .enumerate()
        .map(|(row, cell)| {
            let Some(value) = cell else {
                return Ok(None);
            };
            match parse_float(value) {
                Some(parsed) if !parsed.is_finite() => Err(CastError::NonFinite {
                    row,
                    value: value.clone(),
                }),
                parsed => Ok(parsed.map(Value::Float)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| read_cell(v)).collect()
    }

    #[test]
    fn alpha_presence_forces_text_without_dropping_cells() {
        let column = infer_column("code".into(), raw(&["10", "20", "abc"]));
        assert_eq!(column.kind, ColumnKind::Text);
        assert_eq!(
            column.cells,
            vec![
                Some(Value::Text("10".into())),
                Some(Value::Text("20".into())),
                Some(Value::Text("abc".into())),
            ]
        );
    }

    #[test]
    fn numeric_column_drops_unparseable_cells() {
        let column = infer_column("fee".into(), raw(&["1.5", "", "3", "1/2"]));
        assert_eq!(column.kind, ColumnKind::Numeric);
        assert_eq!(
            column.cells,
            vec![
                Some(Value::Float(1.5)),
                None,
                Some(Value::Float(3.0)),
                None
            ]
        );
    }

    #[test]
    fn exponent_notation_stays_numeric() {
        let column = infer_column("fee".into(), raw(&["1e5", "", "2.5E3"]));
        assert_eq!(column.kind, ColumnKind::Numeric);
        assert_eq!(
            column.cells,
            vec![Some(Value::Float(100_000.0)), None, Some(Value::Float(2_500.0))]
        );
    }

    #[test]
    fn date_header_match_is_case_insensitive() {
        assert!(is_date_column("Signup_DATE"));
        assert!(is_date_column("date"));
        assert!(!is_date_column("season"));
        let column = infer_column("LastDate".into(), raw(&["2021-07-01", "soon"]));
        assert_eq!(column.kind, ColumnKind::DateTime);
        assert!(matches!(column.cells[0], Some(Value::DateTime(_))));
        assert_eq!(column.cells[1], None);
    }

    #[test]
    fn empty_column_stays_unclassified() {
        let column = infer_column("agent".into(), raw(&["", "NA", ""]));
        assert_eq!(column.kind, ColumnKind::Unclassified);
        assert_eq!(column.cells, vec![None, None, None]);
    }

    #[test]
    fn overflowing_numeric_column_keeps_original_text() {
        let huge = format!("1{}", "0".repeat(400));
        let cells = raw(&["1", huge.as_str()]);
        assert_eq!(
            cast_numeric(&cells),
            Err(CastError::NonFinite {
                row: 1,
                value: huge.clone()
            })
        );
        let column = infer_column("market_value".into(), cells);
        assert_eq!(column.kind, ColumnKind::Text);
        assert_eq!(column.cells[1], Some(Value::Text(huge)));
    }
}
