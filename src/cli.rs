use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_DATA_DIR: &str = "Data/Score_csv";
pub const DEFAULT_SCHEMA: &str = "raw";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Type, clean and load CSV tables into PostgreSQL",
    long_about = None
)]
pub struct Cli {
    /// Directory holding one `{entity}.csv` file per table
    #[arg(long = "data-dir", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,
    /// Env file with destination coordinates (defaults to ./.env when present)
    #[arg(long = "env-file")]
    pub env_file: Option<PathBuf>,
    /// PostgreSQL schema that receives the tables
    #[arg(long, default_value = DEFAULT_SCHEMA)]
    pub schema: String,
    /// Entity to process; repeat to build a custom list (defaults to all ten)
    #[arg(long = "table", action = clap::ArgAction::Append)]
    pub tables: Vec<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Write cleaned tables as CSV files into this directory instead of PostgreSQL
    #[arg(long = "export-dir")]
    pub export_dir: Option<PathBuf>,
    /// Write a JSON column report per table into this directory
    #[arg(long = "report-dir")]
    pub report_dir: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
