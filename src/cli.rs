use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::sanitize::{self, MAX_BYTES_PER_COLUMN_NAME};

#[derive(Debug, Parser)]
#[command(author, version, about = "Sanitize and de-duplicate table column names", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean one or more candidate names and show what changed
    Clean(CleanArgs),
    /// Repair a CSV header row: sanitize, de-duplicate, optionally rewrite the file
    Headers(HeadersArgs),
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Candidate column names to sanitize
    #[arg(required = true)]
    pub names: Vec<String>,
    /// Maximum UTF-8 byte length per name
    #[arg(long = "max-bytes", default_value_t = MAX_BYTES_PER_COLUMN_NAME, value_parser = parse_max_bytes)]
    pub max_bytes: usize,
    /// Emit results as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct HeadersArgs {
    /// Input CSV file ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Rewrite the file with the repaired header row (stdout if '-')
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Column names already taken in the target table
    #[arg(long = "existing", value_delimiter = ',')]
    pub existing: Vec<String>,
    /// Maximum UTF-8 byte length per name
    #[arg(long = "max-bytes", default_value_t = MAX_BYTES_PER_COLUMN_NAME, value_parser = parse_max_bytes)]
    pub max_bytes: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding for the output file/stdout (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Emit the allocation as JSON instead of a table
    #[arg(long)]
    pub json: bool,
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

pub fn parse_max_bytes(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|_| format!("'{value}' is not a valid byte count"))?;
    sanitize::validate_max_bytes(parsed).map_err(|err| err.to_string())?;
    Ok(parsed)
}
