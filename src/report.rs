use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::table::{ColumnKind, Table};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnReport {
    pub name: String,
    pub kind: ColumnKind,
    pub missing: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableReport {
    pub source: String,
    pub destination: String,
    pub rows: usize,
    pub columns: Vec<ColumnReport>,
}

impl TableReport {
    pub fn from_table(source: &str, destination: &str, table: &Table) -> Self {
        let columns = table
            .columns
            .iter()
            .map(|c| ColumnReport {
                name: c.name.clone(),
                kind: c.kind,
                missing: c.missing_count(),
            })
            .collect();
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
            rows: table.row_count(),
            columns,
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).with_context(|| format!("Creating report directory {dir:?}"))?;
        let path = dir.join(format!("{}.columns.json", self.destination));
        let file = File::create(&path).with_context(|| format!("Creating report file {path:?}"))?;
        serde_json::to_writer_pretty(file, self).context("Writing column report JSON")
    }
}
