pub mod cli;
pub mod config;
pub mod data;
pub mod io_utils;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod sink;
pub mod table;
pub mod transform;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::Cli,
    config::DbSettings,
    pipeline::{PipelineOptions, TableJob},
    sink::{CsvDirSink, PostgresSink, TableSink},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_cleanse", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    execute(&cli)
}

pub fn execute(cli: &Cli) -> Result<()> {
    let jobs = if cli.tables.is_empty() {
        pipeline::default_jobs()
    } else {
        cli.tables
            .iter()
            .map(|entity| TableJob::for_entity(entity))
            .collect()
    };
    let options = PipelineOptions {
        data_dir: cli.data_dir.clone(),
        delimiter: cli.delimiter,
        encoding: io_utils::resolve_encoding(cli.input_encoding.as_deref())?,
        report_dir: cli.report_dir.clone(),
    };
    debug!("Table jobs: {:?}", jobs);

    let mut sink: Box<dyn TableSink> = match &cli.export_dir {
        Some(dir) => {
            info!("Exporting cleaned tables to {dir:?}");
            Box::new(CsvDirSink::new(dir, io_utils::DEFAULT_CSV_DELIMITER)?)
        }
        None => {
            config::load_env_file(cli.env_file.as_deref())?;
            let settings =
                DbSettings::from_env().context("Reading destination database settings")?;
            Box::new(PostgresSink::connect(&settings, &cli.schema)?)
        }
    };

    let completed = pipeline::run_all(&jobs, &options, sink.as_mut())?;
    info!(
        "Loaded {} table(s) from {:?}",
        completed,
        options.data_dir
    );
    Ok(())
}
