//! In-memory table model shared by every pipeline stage.
//!
//! A [`Table`] is column-major: each [`Column`] owns its cells, and all
//! columns of a table hold the same number of cells. A cell is an
//! `Option<Value>` where `None` is the missing marker.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::Value;

/// Semantic kind of a column, decided once while loading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    DateTime,
    Numeric,
    Text,
    /// No non-missing value was seen, so no kind could be inferred.
    Unclassified,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnKind::DateTime => "datetime",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::Unclassified => "unclassified",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Option<Value>>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, cells: Vec<Option<Value>>) -> Self {
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.cells.len()).unwrap_or(0)
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Cells of row `idx`, in column order.
    pub fn row(&self, idx: usize) -> Vec<Option<&Value>> {
        self.columns
            .iter()
            .map(|c| c.cells.get(idx).and_then(|cell| cell.as_ref()))
            .collect()
    }

    pub fn has_missing(&self) -> bool {
        self.columns.iter().any(|c| c.missing_count() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_reads_across_columns() {
        let table = Table::new(vec![
            Column::new(
                "id",
                ColumnKind::Numeric,
                vec![Some(Value::Float(1.0)), None],
            ),
            Column::new(
                "name",
                ColumnKind::Text,
                vec![Some(Value::Text("Ana".into())), Some(Value::Text("Rui".into()))],
            ),
        ]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row(1), vec![None, Some(&Value::Text("Rui".into()))]);
        assert!(table.has_missing());
        assert_eq!(table.column("id").map(Column::missing_count), Some(1));
    }
}
