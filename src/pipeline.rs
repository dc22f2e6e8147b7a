//! Per-table driver: load, normalize, fill, write.
//!
//! Tables run one after another. The first error that escapes a table stops
//! the batch; tables after it are not attempted.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{
    io_utils, loader,
    report::TableReport,
    sink::TableSink,
    table::Table,
    transform::{fill, normalize},
};

pub const DEFAULT_ENTITIES: [&str; 10] = [
    "appearances",
    "club_games",
    "clubs",
    "competitions",
    "game_events",
    "game_lineups",
    "games",
    "player_valuations",
    "players",
    "transfers",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableJob {
    /// File name under the data directory.
    pub source: String,
    /// Name of the object replaced in the sink.
    pub destination: String,
}

impl TableJob {
    pub fn for_entity(entity: &str) -> Self {
        let entity = entity.trim();
        let entity = entity.strip_suffix(".csv").unwrap_or(entity);
        Self {
            source: format!("{entity}.csv"),
            destination: format!("{entity}_t"),
        }
    }
}

pub fn default_jobs() -> Vec<TableJob> {
    DEFAULT_ENTITIES
        .iter()
        .map(|entity| TableJob::for_entity(entity))
        .collect()
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub data_dir: PathBuf,
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub report_dir: Option<PathBuf>,
}

/// Loads one file and runs it through normalization and missing-value filling.
pub fn clean_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Table> {
    let mut table = loader::load_table(path, delimiter, encoding)
        .with_context(|| format!("Loading {path:?}"))?;
    debug!(
        "Loaded {path:?}: {}",
        table
            .columns
            .iter()
            .map(|c| format!("{}={}", c.name, c.kind))
            .collect::<Vec<_>>()
            .join(", ")
    );
    normalize::normalize_table(&mut table);
    fill::fill_missing(&mut table);
    Ok(table)
}

pub fn run_job(
    job: &TableJob,
    options: &PipelineOptions,
    sink: &mut dyn TableSink,
) -> Result<()> {
    let path = options.data_dir.join(&job.source);
    let delimiter = io_utils::resolve_input_delimiter(&path, options.delimiter);
    let table = clean_table(&path, delimiter, options.encoding)?;
    if let Some(dir) = &options.report_dir {
        TableReport::from_table(&job.source, &job.destination, &table).save(dir)?;
    }
    sink.replace_table(&job.destination, &table)
        .with_context(|| format!("Writing {} to {}", job.source, job.destination))?;
    info!(
        "{} was transformed and loaded into {} ({} row(s))",
        job.source,
        job.destination,
        table.row_count()
    );
    Ok(())
}

/// Runs every job in order and returns how many completed.
pub fn run_all(
    jobs: &[TableJob],
    options: &PipelineOptions,
    sink: &mut dyn TableSink,
) -> Result<usize> {
    for (idx, job) in jobs.iter().enumerate() {
        run_job(job, options, sink)
            .with_context(|| format!("Table {} of {} ({})", idx + 1, jobs.len(), job.source))?;
    }
    Ok(jobs.len())
}
