pub mod allocate;
pub mod cli;
pub mod io_utils;
pub mod report;
pub mod sanitize;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use encoding_rs::UTF_8;
use itertools::Itertools;
use log::{LevelFilter, info};

use crate::{
    allocate::UniqueName,
    cli::{Cli, CleanArgs, Commands, HeadersArgs},
    report::WarningSummary,
    sanitize::CleanedName,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("colnames", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Clean(args) => handle_clean(&args),
        Commands::Headers(args) => handle_headers(&args),
    }
}

fn handle_clean(args: &CleanArgs) -> Result<()> {
    let results = args
        .names
        .iter()
        .map(|name| sanitize::clean(name, args.max_bytes))
        .collect::<Vec<_>>();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).context("Serializing cleaned names")?
        );
        return Ok(());
    }

    let headers = vec![
        "#".to_string(),
        "input".to_string(),
        "cleaned".to_string(),
        "flags".to_string(),
    ];
    let rows = results
        .iter()
        .zip(args.names.iter())
        .enumerate()
        .map(|(idx, (result, input))| {
            vec![
                (idx + 1).to_string(),
                input.clone(),
                result.name.clone(),
                cleaned_flags(result),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);

    let changed = results
        .iter()
        .zip(args.names.iter())
        .filter(|(result, input)| result.name != **input)
        .count();
    info!("Cleaned {} name(s), {} changed", results.len(), changed);
    Ok(())
}

fn handle_headers(args: &HeadersArgs) -> Result<()> {
    let input_delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let input_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;

    let mut reader = io_utils::open_csv_reader_from_path(&args.input, input_delimiter)?;
    let header = reader
        .byte_headers()
        .with_context(|| format!("Reading header row from {:?}", args.input))?
        .clone();
    ensure!(
        !header.is_empty(),
        "Input {:?} has no header row",
        args.input
    );

    // UTF-8 input keeps the raw bytes so corrupted headers reach the
    // repair path; other encodings must decode cleanly first.
    let results = if input_encoding == UTF_8 {
        let fields = header.iter().collect::<Vec<_>>();
        allocate::allocate_bytes(&fields, &args.existing, args.max_bytes)
    } else {
        let decoded = header
            .iter()
            .map(|field| io_utils::decode_bytes(field, input_encoding))
            .collect::<Result<Vec<_>>>()
            .context("Decoding header row")?;
        allocate::allocate(&decoded, &args.existing, args.max_bytes)
    };

    let mut summary = WarningSummary::default();
    for result in &results {
        summary.record(result);
    }
    summary.log();

    match &args.output {
        Some(output) => write_repaired(
            args,
            &mut reader,
            &results,
            input_encoding,
            output_encoding,
        )
        .with_context(|| format!("Writing repaired CSV to {output:?}"))?,
        None => {
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&results).context("Serializing allocation")?
                );
            } else {
                print_allocation(&header, &results, input_encoding);
            }
        }
    }

    let repaired = results
        .iter()
        .filter(|r| {
            r.is_ascii_cleaned || r.is_unicode_fixed || r.is_truncated || r.is_default || r.is_numbered
        })
        .count();
    info!(
        "Allocated {} unique column name(s), {} repaired",
        results.len(),
        repaired
    );
    Ok(())
}

fn write_repaired(
    args: &HeadersArgs,
    reader: &mut csv::Reader<Box<dyn std::io::Read>>,
    results: &[UniqueName],
    input_encoding: &'static encoding_rs::Encoding,
    output_encoding: &'static encoding_rs::Encoding,
) -> Result<()> {
    let output_delimiter = io_utils::resolve_output_delimiter(
        args.output.as_deref(),
        args.output_delimiter,
        io_utils::resolve_input_delimiter(&args.input, args.delimiter),
    );
    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), output_delimiter)?;

    let header_fields = results
        .iter()
        .map(|result| io_utils::encode_text(&result.name, output_encoding))
        .collect::<Result<Vec<_>>>()
        .context("Encoding repaired header row")?;
    writer
        .write_record(header_fields.iter())
        .context("Writing repaired header row")?;

    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        let fields = record
            .iter()
            .map(|field| io_utils::transcode_field(field, input_encoding, output_encoding))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Transcoding row {}", idx + 2))?;
        writer
            .write_record(fields.iter())
            .with_context(|| format!("Writing row {}", idx + 2))?;
    }
    writer.flush().context("Flushing output writer")?;
    Ok(())
}

fn print_allocation(
    header: &csv::ByteRecord,
    results: &[UniqueName],
    input_encoding: &'static encoding_rs::Encoding,
) {
    let headers = vec![
        "#".to_string(),
        "original".to_string(),
        "final".to_string(),
        "flags".to_string(),
    ];
    let rows = results
        .iter()
        .zip(header.iter())
        .enumerate()
        .map(|(idx, (result, original))| {
            let (original, _, _) = input_encoding.decode(original);
            vec![
                (idx + 1).to_string(),
                original.into_owned(),
                result.name.clone(),
                unique_flags(result),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
}

fn cleaned_flags(result: &CleanedName) -> String {
    let labels = [
        ("ascii", result.is_ascii_cleaned),
        ("unicode", result.is_unicode_fixed),
        ("truncated", result.is_truncated),
    ];
    labels
        .iter()
        .filter(|(_, flagged)| *flagged)
        .map(|(label, _)| *label)
        .join(", ")
}

fn unique_flags(result: &UniqueName) -> String {
    let labels = [
        ("ascii", result.is_ascii_cleaned),
        ("unicode", result.is_unicode_fixed),
        ("truncated", result.is_truncated),
        ("default", result.is_default),
        ("numbered", result.is_numbered),
    ];
    labels
        .iter()
        .filter(|(_, flagged)| *flagged)
        .map(|(label, _)| *label)
        .join(", ")
}
