use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use thiserror::Error;

use crate::{
    data::{Value, parse_calendar_value},
    table::{Column, ColumnKind, Table},
};

pub const NUMERIC_FILL: f64 = 0.0;
pub const TEXT_FILL: &str = "don't exist";

pub fn date_fill() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1990, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

#[derive(Debug, Error, PartialEq)]
pub enum ReinterpretError {
    #[error("numeric value {value} at row {row} cannot be read as a date")]
    Numeric { row: usize, value: f64 },
}

/// Replaces every missing cell with the sentinel for its column kind.
///
/// Numeric and unclassified (entirely missing) columns take `0.0` and end up
/// numeric, text columns take `"don't exist"`; date columns are reinterpreted
/// as dates and filled with `1990-01-01`. A column that cannot be
/// reinterpreted is logged and left as it was.
pub fn fill_missing(table: &mut Table) {
    for column in table.columns.iter_mut() {
        match column.kind {
            ColumnKind::Numeric | ColumnKind::Unclassified => {
                column.kind = ColumnKind::Numeric;
                fill_with(column, Value::Float(NUMERIC_FILL));
            }
            ColumnKind::Text => fill_with(column, Value::Text(TEXT_FILL.to_string())),
            ColumnKind::DateTime => match reinterpret_as_dates(column) {
                Ok(cells) => {
                    column.cells = cells;
                    fill_with(column, Value::DateTime(date_fill()));
                }
                Err(err) => warn!("Error converting {}: {err}", column.name),
            },
        }
    }
}

fn fill_with(column: &mut Column, sentinel: Value) {
    for cell in column.cells.iter_mut().filter(|cell| cell.is_none()) {
        *cell = Some(sentinel.clone());
    }
}

/// Text cells that do not parse as a calendar value become missing.
pub fn reinterpret_as_dates(column: &Column) -> Result<Vec<Option<Value>>, ReinterpretError> {
    column
        .cells
        .iter()
        .enumerate()
        .map(|(row, cell)| match cell {
            None => Ok(None),
            Some(Value::DateTime(dt)) => Ok(Some(Value::DateTime(*dt))),
            Some(Value::Text(text)) => Ok(parse_calendar_value(text).map(Value::DateTime)),
            Some(Value::Float(value)) => Err(ReinterpretError::Numeric { row, value: *value }),
        })
        .collect()
}
