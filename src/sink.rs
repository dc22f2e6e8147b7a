//! Destinations that receive cleaned tables.
//!
//! Every sink has replace semantics: writing a table under a name discards
//! whatever was stored under that name before.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::{debug, info};
use postgres::{Client, NoTls, types::ToSql};

use crate::{
    config::DbSettings,
    data::Value,
    io_utils,
    table::{ColumnKind, Table},
};

/// Upper bound on bind parameters in one PostgreSQL statement.
const MAX_BIND_PARAMS: usize = 65_535;
const MAX_ROWS_PER_INSERT: usize = 1_000;

pub trait TableSink {
    /// Replaces the object called `name` with the contents of `table`.
    fn replace_table(&mut self, name: &str, table: &Table) -> Result<()>;
}

pub struct PostgresSink {
    client: Client,
    schema: String,
}

impl PostgresSink {
    pub fn connect(settings: &DbSettings, schema: &str) -> Result<Self> {
        let client = settings.to_pg_config().connect(NoTls).with_context(|| {
            format!(
                "Connecting to PostgreSQL at {}:{}/{}",
                settings.host, settings.port, settings.database
            )
        })?;
        info!(
            "Connected to PostgreSQL at {}:{}/{}",
            settings.host, settings.port, settings.database
        );
        Ok(Self::with_client(client, schema))
    }

    pub fn with_client(client: Client, schema: &str) -> Self {
        Self {
            client,
            schema: schema.to_string(),
        }
    }
}

impl TableSink for PostgresSink {
    fn replace_table(&mut self, name: &str, table: &Table) -> Result<()> {
        let target = qualified_name(&self.schema, name);
        let mut tx = self
            .client
            .transaction()
            .context("Starting transaction")?;
        tx.batch_execute(&drop_table_sql(&target))
            .with_context(|| format!("Dropping {target}"))?;
        tx.batch_execute(&create_table_sql(&target, table))
            .with_context(|| format!("Creating {target}"))?;

        let column_count = table.columns.len();
        if column_count > 0 {
            let rows_per_batch = (MAX_BIND_PARAMS / column_count).clamp(1, MAX_ROWS_PER_INSERT);
            let mut start = 0usize;
            while start < table.row_count() {
                let end = (start + rows_per_batch).min(table.row_count());
                let statement = insert_sql(&target, table, end - start);
                let params = bind_params(table, start..end);
                let refs = params
                    .iter()
                    .map(|p| p.as_ref() as &(dyn ToSql + Sync))
                    .collect::<Vec<_>>();
                tx.execute(statement.as_str(), &refs)
                    .with_context(|| format!("Inserting rows {start}..{end} into {target}"))?;
                debug!("Inserted rows {start}..{end} into {target}");
                start = end;
            }
        }
        tx.commit()
            .with_context(|| format!("Committing {target}"))?;
        info!("Data loaded into {name} table in PostgreSQL");
        Ok(())
    }
}

/// Writes `{name}.csv` files into a directory; used for dry runs and exports.
pub struct CsvDirSink {
    dir: PathBuf,
    delimiter: u8,
}

impl CsvDirSink {
    pub fn new(dir: &Path, delimiter: u8) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("Creating export directory {dir:?}"))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            delimiter,
        })
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }
}

impl TableSink for CsvDirSink {
    fn replace_table(&mut self, name: &str, table: &Table) -> Result<()> {
        let path = self.path_for(name);
        let mut writer = io_utils::open_csv_writer(&path, self.delimiter)?;
        writer
            .write_record(table.headers())
            .context("Writing output headers")?;
        for idx in 0..table.row_count() {
            let row = table
                .row(idx)
                .into_iter()
                .map(|cell| cell.map(Value::as_display).unwrap_or_default());
            writer
                .write_record(row)
                .with_context(|| format!("Writing output row {}", idx + 2))?;
        }
        writer.flush().context("Flushing output writer")?;
        info!("Data loaded into {name} table at {path:?}");
        Ok(())
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn qualified_name(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}

pub fn sql_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::DateTime => "TIMESTAMP",
        ColumnKind::Numeric | ColumnKind::Unclassified => "DOUBLE PRECISION",
        ColumnKind::Text => "TEXT",
    }
}

pub fn drop_table_sql(target: &str) -> String {
    format!("DROP TABLE IF EXISTS {target}")
}

pub fn create_table_sql(target: &str, table: &Table) -> String {
    let columns = table
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), sql_type(c.kind)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {target} ({columns})")
}

pub fn insert_sql(target: &str, table: &Table, rows: usize) -> String {
    let names = table
        .columns
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let width = table.columns.len();
    let tuples = (0..rows)
        .map(|row| {
            let placeholders = (1..=width)
                .map(|col| format!("${}", row * width + col))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({placeholders})")
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {target} ({names}) VALUES {tuples}")
}

fn bind_params(table: &Table, rows: std::ops::Range<usize>) -> Vec<Box<dyn ToSql + Sync>> {
    let mut params: Vec<Box<dyn ToSql + Sync>> =
        Vec::with_capacity(rows.len() * table.columns.len());
    for idx in rows {
        for column in &table.columns {
            let cell = column.cells.get(idx).and_then(Option::as_ref);
            params.push(bind_cell(column.kind, cell));
        }
    }
    params
}

fn bind_cell(kind: ColumnKind, cell: Option<&Value>) -> Box<dyn ToSql + Sync> {
    match kind {
        ColumnKind::Numeric | ColumnKind::Unclassified => Box::new(match cell {
            Some(Value::Float(f)) => Some(*f),
            _ => None::<f64>,
        }),
        ColumnKind::DateTime => Box::new(match cell {
            Some(Value::DateTime(dt)) => Some(*dt),
            _ => None::<NaiveDateTime>,
        }),
        ColumnKind::Text => Box::new(cell.map(Value::as_display)),
    }
}
